//! Grid-based 2.5-D raycasting renderer.
//!
//! A [`Raycaster`] owns a [`Camera`], borrows a read-only [`TileWorld`] and
//! draws into any [`RenderTarget`]: one DDA ray per screen column for walls,
//! then billboard sprites painted farthest first, occluded by the per-column
//! wall depth.

pub mod camera;
pub mod cast;
pub mod config;
pub mod error;
pub mod raycaster;
pub mod sprite;
pub mod target;
pub mod texture;
pub mod world;

pub use camera::Camera;
pub use cast::{Face, Side, WallHit, cast_ray};
pub use config::{ControlsConfig, EngineConfig, RenderConfig};
pub use error::{EngineError, Result};
pub use raycaster::{NO_HIT, Raycaster};
pub use sprite::SpriteInstance;
pub use target::{Framebuffer, Rect, RenderTarget};
pub use texture::{Texture, dim_rgb, pack_rgb};
pub use world::{GridWorld, Shade, TileGrid, TileId, TileWorld};

pub use glam::Vec2;
