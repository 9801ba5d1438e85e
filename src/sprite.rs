//! Billboard sprites: camera-space projection, back-to-front ordering and
//! column-occluded drawing.

use std::sync::Arc;

use glam::Vec2;

use crate::camera::Camera;
use crate::target::{Rect, RenderTarget};
use crate::texture::Texture;

/// Sprites nearer than this along the facing axis are dropped. Keeps
/// projected sizes bounded.
pub const NEAR: f32 = 0.1;

#[derive(Clone, Debug)]
pub struct SpriteInstance {
    pub position: Vec2,
    pub texture: Arc<Texture>,
    /// Multiplier on the projected size; 1.0 is one wall height.
    pub scale: f32,
}

impl SpriteInstance {
    pub fn new(position: Vec2, texture: Arc<Texture>) -> Self {
        Self {
            position,
            texture,
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// A sprite placed on screen for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedSprite {
    /// Index into the scene's sprite list.
    pub index: usize,
    /// `x` lateral offset, `y` depth along the facing axis.
    pub transform: Vec2,
    /// Screen column of the sprite's center.
    pub screen_x: f32,
    pub width: f32,
    pub height: f32,
    /// Height of a scale 1.0 sprite at the same depth. Its bottom edge is
    /// the floor line every sprite stands on.
    pub unit_height: f32,
}

impl ProjectedSprite {
    #[inline]
    pub fn depth(&self) -> f32 {
        self.transform.y
    }

    /// Unclipped left edge in screen space.
    #[inline]
    pub fn left(&self) -> f32 {
        self.screen_x - 0.5 * self.width
    }

    /// Unclipped top edge for a target of height `screen_h`. The bottom edge
    /// sits on the floor line whatever the scale.
    #[inline]
    pub fn top(&self, screen_h: f32) -> f32 {
        0.5 * (screen_h + self.unit_height) - self.height
    }
}

/// Place `sprite` on a `bounds` sized target, or `None` when it sits behind
/// the near plane or entirely off screen.
pub fn project(
    camera: &Camera,
    index: usize,
    sprite: &SpriteInstance,
    bounds: Rect,
) -> Option<ProjectedSprite> {
    let transform = camera.to_camera_space(sprite.position);
    if !(transform.y > NEAR) {
        return None;
    }

    let screen_w = bounds.width as f32;
    let unit_height = bounds.height as f32 / transform.y;
    let height = unit_height * sprite.scale;
    let width = height * sprite.texture.aspect();
    let projected = ProjectedSprite {
        index,
        transform,
        screen_x: camera.project_x(transform, screen_w),
        width,
        height,
        unit_height,
    };

    let left = projected.left();
    if !(width > 0.0) || left + width < 0.0 || left >= screen_w {
        return None;
    }
    Some(projected)
}

/// Farthest first. Equal depths keep their scene order.
pub fn sort_back_to_front(sprites: &mut [ProjectedSprite]) {
    sprites.sort_by(|a, b| {
        b.depth()
            .partial_cmp(&a.depth())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Draw one projected sprite. Columns whose wall depth is nearer than the
/// sprite are skipped; transparent texels are left untouched. Depth is never
/// written.
pub fn draw<T: RenderTarget + ?Sized>(
    target: &mut T,
    sprite: &ProjectedSprite,
    texture: &Texture,
    depth: &[f32],
) {
    let bounds = target.bounds();
    let (screen_w, screen_h) = (bounds.width as f32, bounds.height as f32);

    let left = sprite.left();
    let top = sprite.top(screen_h);
    let x0 = left.max(0.0).floor() as usize;
    let x1 = (left + sprite.width).min(screen_w).ceil() as usize;
    let y0 = top.max(0.0).floor() as usize;
    let y1 = (top + sprite.height).min(screen_h).ceil() as usize;

    for x in x0..x1.min(bounds.width) {
        let wall = depth.get(x).copied().unwrap_or(f32::INFINITY);
        if wall < sprite.depth() {
            continue;
        }
        // Sample at the pixel center
        let u = (x as f32 + 0.5 - left) / sprite.width;
        if !(0.0..1.0).contains(&u) {
            continue;
        }
        let tx = texture.column(u);

        for y in y0..y1.min(bounds.height) {
            let v = (y as f32 + 0.5 - top) / sprite.height;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            let color = texture.texel(tx, texture.row(v));
            if texture.is_transparent(color) {
                continue;
            }
            target.set_pixel(x, y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Framebuffer;

    fn sprite_at(x: f32, y: f32, color: u32) -> SpriteInstance {
        SpriteInstance::new(Vec2::new(x, y), Arc::new(Texture::solid(8, 8, color)))
    }

    #[test]
    fn sprite_on_camera_is_discarded() {
        let cam = Camera::new(Vec2::new(4.0, 4.0));
        let bounds = Rect::new(64, 48);
        assert!(project(&cam, 0, &sprite_at(4.0, 4.0, 1), bounds).is_none());
        assert!(project(&cam, 0, &sprite_at(4.0 - 1e-4, 4.0, 1), bounds).is_none());
        // Behind
        assert!(project(&cam, 0, &sprite_at(6.0, 4.0, 1), bounds).is_none());
    }

    #[test]
    fn projection_scales_with_depth() {
        let cam = Camera::new(Vec2::new(10.0, 4.0));
        let bounds = Rect::new(64, 48);
        let near = project(&cam, 0, &sprite_at(8.0, 4.0, 1), bounds).unwrap();
        let far = project(&cam, 1, &sprite_at(6.0, 4.0, 1), bounds).unwrap();
        assert!((near.depth() - 2.0).abs() < 1e-5);
        assert!((near.height - 24.0).abs() < 1e-3);
        assert!((far.height - 12.0).abs() < 1e-3);
        assert!((near.screen_x - 32.0).abs() < 1e-3);
        assert_eq!(near.width, near.height);
    }

    #[test]
    fn off_screen_sprites_are_culled() {
        let cam = Camera::new(Vec2::new(10.0, 4.0));
        // Far to the side of a narrow view
        let side = sprite_at(9.0, 40.0, 1);
        assert!(project(&cam, 0, &side, Rect::new(64, 48)).is_none());
    }

    #[test]
    fn sort_is_farthest_first_and_stable() {
        let mk = |index, depth| ProjectedSprite {
            index,
            transform: Vec2::new(0.0, depth),
            screen_x: 0.0,
            width: 1.0,
            height: 1.0,
            unit_height: 1.0,
        };
        let mut list = vec![mk(0, 2.0), mk(1, 9.0), mk(2, 2.0), mk(3, 5.0)];
        sort_back_to_front(&mut list);
        let order: Vec<usize> = list.iter().map(|s| s.index).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn draw_respects_depth_and_transparency() {
        let mut fb = Framebuffer::new(16, 16);
        let key = 0xFF00FF;
        let pixels: Vec<u32> = (0..16).map(|i| if i % 2 == 0 { 7 } else { key }).collect();
        let tex = Texture::new(4, 4, pixels).unwrap().with_transparent(key);
        let sprite = ProjectedSprite {
            index: 0,
            transform: Vec2::new(0.0, 3.0),
            screen_x: 8.0,
            width: 16.0,
            height: 16.0,
            unit_height: 16.0,
        };
        // Left half occluded by a wall at depth 2
        let depth: Vec<f32> = (0..16).map(|x| if x < 8 { 2.0 } else { 3.0 }).collect();
        draw(&mut fb, &sprite, &tex, &depth);

        for y in 0..16 {
            for x in 0..8 {
                assert_eq!(fb.pixel(x, y), Some(0));
            }
        }
        // Texel column 2 (even) at x = 8..12 is opaque, column 3 keyed out
        assert_eq!(fb.pixel(9, 5), Some(7));
        assert_eq!(fb.pixel(13, 5), Some(0));
        assert!(fb.depths().iter().all(|d| d.is_infinite()));
    }

    #[test]
    fn scaled_sprite_stands_on_the_floor_line() {
        let cam = Camera::new(Vec2::new(10.0, 4.0));
        let bounds = Rect::new(40, 40);
        let half = sprite_at(8.0, 4.0, 0x55).with_scale(0.5);
        let projected = project(&cam, 0, &half, bounds).unwrap();
        assert!((projected.height - 10.0).abs() < 1e-3);

        let mut fb = Framebuffer::new(40, 40);
        draw(&mut fb, &projected, &half.texture, &[f32::INFINITY; 40]);
        let rows: Vec<usize> = (0..40).filter(|&y| fb.pixel(20, y) == Some(0x55)).collect();

        // A wall 2 units away spans rows 10..30, so the floor starts at 30
        let wall_h = 40.0 / projected.depth();
        let floor_line = (0.5 * (40.0 + wall_h)).round() as usize;
        assert_eq!(floor_line, 30);
        assert_eq!(rows.last(), Some(&(floor_line - 1)));
        assert_eq!(rows.first(), Some(&20));
        assert_eq!(rows.len(), 10);
    }
}
