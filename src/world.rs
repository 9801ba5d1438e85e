use log::debug;

use crate::error::{EngineError, Result};
use crate::texture::Texture;

/// Tile value. `0` is empty, any other value is a 1-based wall texture id.
pub type TileId = u32;

pub const EMPTY: TileId = 0;

/// Texture variant requested for a wall face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shade {
    Lit,
    Dim,
}

/// Read-only view of the level the caster walks.
///
/// `tile` is only called for cells where `contains` holds, and `texture` only
/// for non-zero ids a world handed out. Anything else is a data error and
/// implementations panic on it.
pub trait TileWorld {
    /// Whether `(x, y)` lies inside the traversable area. Rays stop when
    /// this turns false, so it should describe a finite region; an unbounded
    /// world relies on the caster's step limit to end rays that never hit.
    fn contains(&self, x: i64, y: i64) -> bool;

    fn tile(&self, x: i64, y: i64) -> TileId;

    fn texture(&self, id: TileId, shade: Shade) -> &Texture;

    /// Solid cell test that is safe to call anywhere.
    fn is_solid(&self, x: i64, y: i64) -> bool {
        self.contains(x, y) && self.tile(x, y) != EMPTY
    }
}

/// Dense tile map indexed `[x][y]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    // Column-major: x * height + y
    cells: Vec<TileId>,
}

impl TileGrid {
    /// Empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![EMPTY; width * height],
        }
    }

    /// Build from `columns[x][y]`.
    pub fn from_columns(columns: Vec<Vec<TileId>>) -> Result<Self> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        if let Some(x) = columns.iter().position(|c| c.len() != height) {
            return Err(EngineError::Grid(format!(
                "column {x} has {} cells, expected {height}",
                columns[x].len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells: columns.into_iter().flatten().collect(),
        })
    }

    /// Parse a text map: one line per row (`y`), one character per column
    /// (`x`). Digits are tile ids; `.`, `0` and space are empty. Leading and
    /// trailing blank lines are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .skip_while(|l| l.trim().is_empty())
            .collect();
        let rows = match rows.iter().rposition(|l| !l.trim().is_empty()) {
            Some(last) => &rows[..=last],
            None => return Ok(Self::new(0, 0)),
        };

        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let height = rows.len();
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let id = match ch {
                    '.' | ' ' => EMPTY,
                    c => c.to_digit(10).ok_or_else(|| {
                        EngineError::Grid(format!("unexpected {c:?} at ({x}, {y})"))
                    })?,
                };
                grid.set(x, y, id);
            }
        }
        Ok(grid)
    }

    /// Copy with the outermost ring set to `id`.
    pub fn with_border(mut self, id: TileId) -> Self {
        for x in 0..self.width {
            for y in 0..self.height {
                if x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height {
                    self.set(x, y, id);
                }
            }
        }
        self
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<TileId> {
        if x < self.width && y < self.height {
            Some(self.cells[x * self.height + y])
        } else {
            None
        }
    }

    /// Overwrite a cell. Out-of-range writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, id: TileId) {
        if x < self.width && y < self.height {
            self.cells[x * self.height + y] = id;
        }
    }

    /// Non-empty cells with their coordinates.
    pub fn walls(&self) -> impl Iterator<Item = (usize, usize, TileId)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &id)| id != EMPTY)
            .map(|(i, &id)| (i / self.height, i % self.height, id))
    }
}

/// Tile grid plus the textures its ids refer to.
#[derive(Clone, Debug)]
pub struct GridWorld {
    grid: TileGrid,
    textures: Vec<Texture>,
    // Parallel to `textures` when face shading is on
    dimmed: Vec<Texture>,
}

impl GridWorld {
    /// Tile id `n` maps to `textures[n - 1]`; every id used by the grid must
    /// have a texture.
    pub fn new(grid: TileGrid, textures: Vec<Texture>) -> Result<Self> {
        if let Some((x, y, id)) = grid
            .walls()
            .find(|&(_, _, id)| id as usize > textures.len())
        {
            return Err(EngineError::MissingTexture {
                id,
                x,
                y,
                available: textures.len(),
            });
        }
        debug!(
            "world: {}x{} grid, {} textures",
            grid.width(),
            grid.height(),
            textures.len()
        );
        Ok(Self {
            grid,
            textures,
            dimmed: Vec::new(),
        })
    }

    /// Serve darker variants for [`Shade::Dim`] requests. When off the
    /// shade is ignored.
    pub fn with_face_shading(mut self, enabled: bool) -> Self {
        self.dimmed = if enabled {
            self.textures.iter().map(Texture::dimmed).collect()
        } else {
            Vec::new()
        };
        self
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }
}

impl TileWorld for GridWorld {
    #[inline]
    fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.grid.width && (y as usize) < self.grid.height
    }

    #[inline]
    fn tile(&self, x: i64, y: i64) -> TileId {
        assert!(self.contains(x, y), "tile ({x}, {y}) is outside the grid");
        self.grid.cells[x as usize * self.grid.height + y as usize]
    }

    #[inline]
    fn texture(&self, id: TileId, shade: Shade) -> &Texture {
        let index = (id as usize)
            .checked_sub(1)
            .filter(|&i| i < self.textures.len())
            .unwrap_or_else(|| panic!("no texture for tile id {id}"));
        match shade {
            Shade::Dim if !self.dimmed.is_empty() => &self.dimmed[index],
            _ => &self.textures[index],
        }
    }
}
