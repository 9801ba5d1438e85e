//! Frame renderer: one DDA ray per screen column, then billboard sprites
//! composited back to front against the per-column wall depth.

use glam::Vec2;
use log::{debug, trace};
use rayon::prelude::*;

use crate::camera::Camera;
use crate::cast::{WallHit, cast_ray};
use crate::config::RenderConfig;
use crate::sprite::{self, ProjectedSprite, SpriteInstance};
use crate::target::{Rect, RenderTarget};
use crate::world::TileWorld;

/// Depth written for columns that see no wall.
pub const NO_HIT: f32 = f32::INFINITY;

pub struct Raycaster<'w, W: TileWorld> {
    camera: Camera,
    world: &'w W,
    sprites: Vec<SpriteInstance>,
    config: RenderConfig,

    // Per-frame scratch, reused across frames
    hits: Vec<Option<WallHit>>,
    depth: Vec<f32>,
    projected: Vec<ProjectedSprite>,
}

impl<'w, W: TileWorld + Sync> Raycaster<'w, W> {
    pub fn new(world: &'w W, camera: Camera, config: RenderConfig) -> Self {
        debug!(
            "raycaster at {} facing {}, fov {:.1} deg",
            camera.position(),
            camera.dir(),
            camera.fov().to_degrees()
        );
        Self {
            camera,
            world,
            sprites: Vec::new(),
            config,
            hits: Vec::new(),
            depth: Vec::new(),
            projected: Vec::new(),
        }
    }

    pub fn with_sprites(mut self, sprites: Vec<SpriteInstance>) -> Self {
        self.sprites = sprites;
        self
    }

    pub fn add_sprite(&mut self, sprite: SpriteInstance) {
        self.sprites.push(sprite);
    }

    pub fn sprites(&self) -> &[SpriteInstance] {
        &self.sprites
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn world(&self) -> &'w W {
        self.world
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Translate the camera. Walls do not block movement.
    pub fn move_by(&mut self, delta: Vec2) {
        self.camera.move_by(delta);
    }

    /// Turn the camera counter-clockwise by `angle` radians.
    pub fn rotate(&mut self, angle: f32) {
        self.camera.rotate(angle);
    }

    pub fn dir(&self) -> Vec2 {
        self.camera.dir()
    }

    /// Wall depth per column from the last frame, [`NO_HIT`] for void.
    pub fn column_depths(&self) -> &[f32] {
        &self.depth
    }

    /// Wall hit per column from the last frame.
    pub fn last_hits(&self) -> &[Option<WallHit>] {
        &self.hits
    }

    /// Draw a full frame into `target`.
    pub fn render<T: RenderTarget + ?Sized>(&mut self, target: &mut T) {
        let bounds = target.bounds();
        if bounds.is_empty() {
            return;
        }

        self.cast_columns(bounds.width);
        for x in 0..bounds.width {
            self.draw_column(target, x, bounds.height);
        }
        self.draw_sprites(target, bounds);
    }

    fn cast_columns(&mut self, width: usize) {
        let camera = self.camera;
        let world = self.world;

        // Columns are independent; only the drawing order of sprites matters
        self.hits.resize(width, None);
        self.hits
            .par_iter_mut()
            .enumerate()
            .for_each(|(x, hit)| {
                *hit = cast_ray(world, camera.position(), camera.ray_dir(x, width));
            });

        self.depth.clear();
        self.depth
            .extend(self.hits.iter().map(|h| h.map_or(NO_HIT, |h| h.distance)));
    }

    fn draw_column<T: RenderTarget + ?Sized>(&self, target: &mut T, x: usize, height: usize) {
        let Some(hit) = self.hits[x] else {
            for y in 0..height {
                target.set_pixel(x, y, self.config.void_color);
            }
            target.set_depth(x, NO_HIT);
            return;
        };

        let screen_h = height as f32;
        let line_h = screen_h / hit.distance;
        let top = 0.5 * (screen_h - line_h);
        let y0 = (top.max(0.0).round() as usize).min(height);
        let y1 = ((top + line_h).min(screen_h).round() as usize).max(y0);

        let texture = self.world.texture(hit.tile, hit.face.shade());
        let tx = texture.column(hit.wall_u);

        for y in 0..y0 {
            target.set_pixel(x, y, self.config.ceiling_color);
        }
        for y in y0..y1 {
            let v = (y as f32 + 0.5 - top) / line_h;
            target.set_pixel(x, y, texture.texel(tx, texture.row(v)));
        }
        for y in y1..height {
            target.set_pixel(x, y, self.config.floor_color);
        }
        target.set_depth(x, hit.distance);
    }

    fn draw_sprites<T: RenderTarget + ?Sized>(&mut self, target: &mut T, bounds: Rect) {
        let camera = self.camera;
        self.projected.clear();
        self.projected.extend(
            self.sprites
                .iter()
                .enumerate()
                .filter_map(|(i, s)| sprite::project(&camera, i, s, bounds)),
        );
        sprite::sort_back_to_front(&mut self.projected);
        trace!(
            "{} of {} sprites visible",
            self.projected.len(),
            self.sprites.len()
        );

        for projected in &self.projected {
            let texture = &self.sprites[projected.index].texture;
            sprite::draw(target, projected, texture, &self.depth);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::target::Framebuffer;
    use crate::texture::Texture;
    use crate::world::{GridWorld, Shade, TileGrid};

    fn config() -> RenderConfig {
        RenderConfig {
            ceiling_color: 0xAA,
            floor_color: 0xBB,
            void_color: 0xCC,
            ..RenderConfig::default()
        }
    }

    fn room() -> GridWorld {
        let grid = TileGrid::new(8, 8).with_border(1);
        GridWorld::new(grid, vec![Texture::solid(8, 8, 0x11)]).unwrap()
    }

    #[test]
    fn zero_area_target_is_ignored() {
        let world = room();
        let mut rc = Raycaster::new(&world, Camera::new(Vec2::new(4.0, 4.0)), config());
        let mut fb = Framebuffer::new(0, 10);
        rc.render(&mut fb);
        assert!(rc.column_depths().is_empty());
    }

    #[test]
    fn detached_target_renders_without_writes() {
        let world = room();
        let mut rc = Raycaster::new(&world, Camera::new(Vec2::new(4.0, 4.0)), config());
        let mut fb = Framebuffer::detached(32, 24);
        rc.render(&mut fb);
        assert_eq!(rc.column_depths().len(), 32);
        assert!(fb.pixels().is_empty());
    }

    #[test]
    fn columns_split_into_ceiling_wall_floor() {
        let world = room();
        let mut rc = Raycaster::new(&world, Camera::new(Vec2::new(4.5, 4.5)), config());
        let mut fb = Framebuffer::new(32, 40);
        rc.render(&mut fb);

        // Wall at x = 1 boundary: 3.5 units ahead
        let center = 16;
        assert!((fb.depth(center).unwrap() - 3.5).abs() < 1e-5);
        assert_eq!(fb.pixel(center, 0), Some(0xAA));
        assert_eq!(fb.pixel(center, 20), Some(0x11));
        assert_eq!(fb.pixel(center, 39), Some(0xBB));
    }

    #[test]
    fn face_shade_reaches_the_world() {
        let grid = TileGrid::new(8, 8).with_border(1);
        let world = GridWorld::new(grid, vec![Texture::solid(8, 8, 0xC8C8C8)])
            .unwrap()
            .with_face_shading(true);
        let mut rc = Raycaster::new(&world, Camera::new(Vec2::new(4.5, 4.5)), config());
        let mut fb = Framebuffer::new(32, 40);

        // Facing -X: the center ray crosses an x-boundary
        rc.render(&mut fb);
        assert_eq!(rc.last_hits()[16].unwrap().face.shade(), Shade::Lit);
        assert_eq!(fb.pixel(16, 20), Some(0xC8C8C8));

        // A quarter turn faces a y-boundary
        rc.rotate(std::f32::consts::FRAC_PI_2);
        rc.render(&mut fb);
        assert_eq!(rc.last_hits()[16].unwrap().face.shade(), Shade::Dim);
        assert_eq!(fb.pixel(16, 20), Some(0x646464));
    }

    #[test]
    fn open_map_edge_renders_void() {
        let grid = TileGrid::parse("....\n....").unwrap();
        let world = GridWorld::new(grid, Vec::new()).unwrap();
        let mut rc = Raycaster::new(&world, Camera::new(Vec2::new(2.5, 1.0)), config());
        let mut fb = Framebuffer::new(16, 8);
        rc.render(&mut fb);
        assert!(fb.pixels().iter().all(|&p| p == 0xCC));
        assert!(fb.depths().iter().all(|&d| d == NO_HIT));
        assert!(rc.last_hits().iter().all(Option::is_none));
    }

    #[test]
    fn sprites_survive_across_frames_and_rotation() {
        let world = room();
        let mut rc = Raycaster::new(&world, Camera::new(Vec2::new(5.5, 4.5)), config())
            .with_sprites(vec![SpriteInstance::new(
                Vec2::new(2.5, 4.5),
                Arc::new(Texture::solid(4, 4, 0x77)),
            )]);
        let mut fb = Framebuffer::new(32, 32);

        rc.render(&mut fb);
        assert_eq!(fb.pixel(16, 16), Some(0x77));

        rc.rotate(std::f32::consts::PI);
        rc.render(&mut fb);
        assert_ne!(fb.pixel(16, 16), Some(0x77));
        assert_eq!(rc.sprites().len(), 1);
    }
}
