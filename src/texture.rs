use crate::error::{EngineError, Result};

/// Pack an RGB triple as `0x00RRGGBB`, the layout softbuffer presents.
#[inline]
pub const fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    (b as u32) | ((g as u32) << 8) | ((r as u32) << 16)
}

/// Halve every channel of a packed color.
#[inline]
pub const fn dim_rgb(color: u32) -> u32 {
    (color >> 1) & 0x007F_7F7F
}

/// Fixed-size image sampled with nearest-neighbour lookups.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
    transparent: Option<u32>,
}

impl Texture {
    /// Build a texture from row-major pixels.
    pub fn new(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self> {
        let expected = width * height;
        if expected == 0 || pixels.len() != expected {
            return Err(EngineError::TextureSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            transparent: None,
        })
    }

    /// Single-color texture. Zero dimensions are bumped to 1.
    pub fn solid(width: usize, height: usize, color: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            pixels: vec![color; width * height],
            transparent: None,
        }
    }

    /// Mark `color` as the key skipped when drawing sprites.
    pub fn with_transparent(mut self, color: u32) -> Self {
        self.transparent = Some(color);
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
    pub fn transparent(&self) -> Option<u32> {
        self.transparent
    }

    #[inline]
    pub fn is_transparent(&self, color: u32) -> bool {
        self.transparent == Some(color)
    }

    /// Width over height.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Integer lookup, clamped to the image.
    #[inline]
    pub fn texel(&self, tx: usize, ty: usize) -> u32 {
        let tx = tx.min(self.width - 1);
        let ty = ty.min(self.height - 1);
        self.pixels[ty * self.width + tx]
    }

    /// Texture column for a normalized horizontal coordinate.
    #[inline]
    pub fn column(&self, u: f32) -> usize {
        to_index(u, self.width)
    }

    /// Texture row for a normalized vertical coordinate.
    #[inline]
    pub fn row(&self, v: f32) -> usize {
        to_index(v, self.height)
    }

    /// Nearest sample at normalized `(u, v)`.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        self.texel(self.column(u), self.row(v))
    }

    /// Copy with every channel halved. Keyed pixels and the key itself are
    /// left as is; an opaque pixel that would dim onto the key is nudged off
    /// it so it stays opaque.
    pub fn dimmed(&self) -> Self {
        let key = self.transparent;
        let dim = |c: u32| {
            if Some(c) == key {
                return c;
            }
            let d = dim_rgb(c);
            if Some(d) == key { d ^ 1 } else { d }
        };
        Self {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().copied().map(dim).collect(),
            transparent: key,
        }
    }
}

#[inline]
fn to_index(t: f32, size: usize) -> usize {
    // NaN casts to 0
    ((t * size as f32) as isize).clamp(0, size as isize - 1) as usize
}
