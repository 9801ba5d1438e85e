//! Grid traversal for a single ray (DDA).
//!
//! The ray advances boundary by boundary, always to whichever x- or
//! y-boundary is nearer, until it enters a solid cell or leaves the world.
//! Distances are measured along the camera's facing axis, which is what the
//! unnormalized `ray_dir = dir + plane * camera_x` gives for free.

use glam::{I64Vec2, Vec2};

use crate::world::{EMPTY, Shade, TileId, TileWorld};

/// Distances below this are clamped so projected heights stay finite.
pub const MIN_WALL_DISTANCE: f32 = 1e-4;

/// Boundaries a ray may cross before it is treated as leaving the world.
/// Bounds the walk for worlds whose `contains` never turns false.
pub const MAX_RAY_STEPS: usize = 1 << 16;

/// Axis of the grid boundary a ray crossed last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// An x-constant (vertical) boundary.
    NorthSouth,
    /// A y-constant (horizontal) boundary.
    EastWest,
}

/// Wall face a ray struck. +Y points south.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    West,
    East,
    North,
    South,
}

impl Face {
    fn from_step(side: Side, step: I64Vec2) -> Self {
        match side {
            Side::NorthSouth if step.x > 0 => Face::West,
            Side::NorthSouth => Face::East,
            Side::EastWest if step.y > 0 => Face::North,
            Side::EastWest => Face::South,
        }
    }

    #[inline]
    pub fn side(self) -> Side {
        match self {
            Face::West | Face::East => Side::NorthSouth,
            Face::North | Face::South => Side::EastWest,
        }
    }

    /// Texture variant for this face: x-boundaries lit, y-boundaries dim.
    #[inline]
    pub fn shade(self) -> Shade {
        match self.side() {
            Side::NorthSouth => Shade::Lit,
            Side::EastWest => Shade::Dim,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallHit {
    pub cell: I64Vec2,
    pub tile: TileId,
    /// Perpendicular distance, at least [`MIN_WALL_DISTANCE`].
    pub distance: f32,
    pub face: Face,
    /// Horizontal texture coordinate in `[0, 1]`, mirrored so every face
    /// reads left to right.
    pub wall_u: f32,
}

impl WallHit {
    #[inline]
    pub fn side(&self) -> Side {
        self.face.side()
    }
}

/// Walk `ray_dir` from `origin` to the first solid cell.
///
/// Returns `None` when the ray leaves the world first, crosses
/// [`MAX_RAY_STEPS`] boundaries without a hit, or when `ray_dir` is zero.
/// The cell containing `origin` is never tested.
pub fn cast_ray<W>(world: &W, origin: Vec2, ray_dir: Vec2) -> Option<WallHit>
where
    W: TileWorld + ?Sized,
{
    if ray_dir == Vec2::ZERO || !ray_dir.is_finite() || !origin.is_finite() {
        return None;
    }

    let mut cell = origin.floor().as_i64vec2();
    let delta = Vec2::new(step_len(ray_dir.x), step_len(ray_dir.y));
    let step = I64Vec2::new(step_sign(ray_dir.x), step_sign(ray_dir.y));

    let frac = origin - cell.as_vec2();
    let mut side_dist = Vec2::new(
        first_boundary(ray_dir.x, frac.x, delta.x),
        first_boundary(ray_dir.y, frac.y, delta.y),
    );

    let mut hit_side = None;
    for _ in 0..MAX_RAY_STEPS {
        let side = if side_dist.x < side_dist.y {
            side_dist.x += delta.x;
            cell.x += step.x;
            Side::NorthSouth
        } else {
            side_dist.y += delta.y;
            cell.y += step.y;
            Side::EastWest
        };

        if !world.contains(cell.x, cell.y) {
            return None;
        }
        if world.tile(cell.x, cell.y) != EMPTY {
            hit_side = Some(side);
            break;
        }
    }
    let side = hit_side?;

    let raw = match side {
        Side::NorthSouth => side_dist.x - delta.x,
        Side::EastWest => side_dist.y - delta.y,
    };
    let distance = raw.max(MIN_WALL_DISTANCE);

    let along = match side {
        Side::NorthSouth => origin.y + raw * ray_dir.y,
        Side::EastWest => origin.x + raw * ray_dir.x,
    };
    let mut wall_u = along - along.floor();
    let flip = match side {
        Side::NorthSouth => ray_dir.x > 0.0,
        Side::EastWest => ray_dir.y < 0.0,
    };
    if flip {
        wall_u = 1.0 - wall_u;
    }

    Some(WallHit {
        cell,
        tile: world.tile(cell.x, cell.y),
        distance,
        face: Face::from_step(side, step),
        wall_u,
    })
}

/// Ray length between consecutive boundaries on one axis.
#[inline]
fn step_len(component: f32) -> f32 {
    if component == 0.0 {
        f32::INFINITY
    } else {
        (1.0 / component).abs()
    }
}

#[inline]
fn step_sign(component: f32) -> i64 {
    if component < 0.0 { -1 } else { 1 }
}

/// Ray length from the origin to the first boundary on one axis.
#[inline]
fn first_boundary(component: f32, frac: f32, delta: f32) -> f32 {
    if delta.is_infinite() {
        // Avoid 0 * inf when the origin sits on a boundary
        f32::INFINITY
    } else if component < 0.0 {
        frac * delta
    } else {
        (1.0 - frac) * delta
    }
}
