use glam::Vec2;

/// Default plane length, about a 66 degree horizontal field of view.
pub const DEFAULT_PLANE: f32 = 0.66;

/// Range accepted by [`Camera::looking`], one to 179 degrees.
const MIN_FOV: f32 = std::f32::consts::PI / 180.0;
const MAX_FOV: f32 = std::f32::consts::PI - MIN_FOV;

/// Viewer pose on the tile grid.
///
/// `plane` is kept perpendicular to `direction`; its length is
/// `tan(fov / 2)` for a unit `direction`. Both vectors only change through
/// [`Camera::rotate`], which turns them together.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    position: Vec2, // world space, one unit per tile
    direction: Vec2,
    plane: Vec2,
}

impl Camera {
    /// Camera at `position` facing -X.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            direction: Vec2::new(-1.0, 0.0),
            plane: Vec2::new(0.0, DEFAULT_PLANE),
        }
    }

    /// Camera at `position` facing `direction` with a horizontal field of
    /// view of `fov` radians. A zero `direction` falls back to -X. `fov` is
    /// clamped to one to 179 degrees; NaN gives the default plane.
    pub fn looking(position: Vec2, direction: Vec2, fov: f32) -> Self {
        let direction = direction.try_normalize().unwrap_or(Vec2::NEG_X);
        let half_width = if fov.is_nan() {
            DEFAULT_PLANE
        } else {
            (0.5 * fov.clamp(MIN_FOV, MAX_FOV)).tan()
        };
        // Screen right is the clockwise perpendicular of the facing vector
        let right = Vec2::new(direction.y, -direction.x);
        Self {
            position,
            direction,
            plane: right * half_width,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Facing vector, unit length.
    #[inline]
    pub fn dir(&self) -> Vec2 {
        self.direction
    }

    #[inline]
    pub fn plane(&self) -> Vec2 {
        self.plane
    }

    /// Horizontal field of view in radians.
    pub fn fov(&self) -> f32 {
        2.0 * (self.plane.length() / self.direction.length()).atan()
    }

    /// Translate by a caller-scaled delta. No collision is applied.
    #[inline]
    pub fn move_by(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Turn counter-clockwise by `angle` radians.
    pub fn rotate(&mut self, angle: f32) {
        let rot = Vec2::from_angle(angle);
        self.direction = rot.rotate(self.direction);
        self.plane = rot.rotate(self.plane);
    }

    /// Ray through screen column `x` of a `width` wide target.
    #[inline]
    pub fn ray_dir(&self, x: usize, width: usize) -> Vec2 {
        let camera_x = 2.0 * x as f32 / width as f32 - 1.0;
        self.direction + self.plane * camera_x
    }

    /// Express a world point in the `[plane; direction]` basis.
    ///
    /// `x` is the lateral offset in plane units, `y` the depth along the
    /// facing axis.
    #[inline]
    pub fn to_camera_space(&self, p: Vec2) -> Vec2 {
        let rel = p - self.position;
        let (dir, plane) = (self.direction, self.plane);
        let inv_det = 1.0 / (plane.x * dir.y - dir.x * plane.y);
        Vec2::new(
            inv_det * (dir.y * rel.x - dir.x * rel.y),
            inv_det * (-plane.y * rel.x + plane.x * rel.y),
        )
    }

    /// Screen column of a camera-space point. `cam.y` must be positive.
    #[inline]
    pub fn project_x(&self, cam: Vec2, screen_width: f32) -> f32 {
        0.5 * screen_width * (1.0 + cam.x / cam.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn rotate_back_restores_orientation() {
        let mut cam = Camera::new(Vec2::new(3.0, 4.0));
        let (dir, plane) = (cam.dir(), cam.plane());
        cam.rotate(0.7);
        assert!(!close(cam.dir(), dir));
        cam.rotate(-0.7);
        assert!(close(cam.dir(), dir));
        assert!(close(cam.plane(), plane));
        assert_eq!(cam.position(), Vec2::new(3.0, 4.0));
    }

    #[test]
    fn many_small_rotations_stay_orthogonal() {
        let mut cam = Camera::new(Vec2::ZERO);
        let plane_len = cam.plane().length();
        for _ in 0..1000 {
            cam.rotate(0.013);
        }
        assert!(cam.dir().dot(cam.plane()).abs() < EPS);
        assert!((cam.dir().length() - 1.0).abs() < 1e-3);
        assert!((cam.plane().length() - plane_len).abs() < 1e-3);
    }

    #[test]
    fn positive_angle_turns_counter_clockwise() {
        let mut cam = Camera::looking(Vec2::ZERO, Vec2::X, 1.0);
        cam.rotate(std::f32::consts::FRAC_PI_2);
        assert!(close(cam.dir(), Vec2::Y));
    }

    #[test]
    fn looking_derives_plane_from_fov() {
        let fov = 90f32.to_radians();
        let cam = Camera::looking(Vec2::ZERO, Vec2::new(0.0, 2.0), fov);
        assert!(close(cam.dir(), Vec2::Y));
        assert!(close(cam.plane(), Vec2::new(1.0, 0.0)));
        assert!((cam.fov() - fov).abs() < EPS);
        assert!(cam.dir().dot(cam.plane()).abs() < EPS);
    }

    #[test]
    fn looking_clamps_out_of_range_fov() {
        for fov in [std::f32::consts::PI, 4.0, -1.0, 0.0] {
            let cam = Camera::looking(Vec2::ZERO, Vec2::X, fov);
            let plane = cam.plane();
            assert!(plane.is_finite(), "{fov}");
            // Screen right stays on the clockwise side of the facing vector
            assert!(plane.y < 0.0, "{fov}");
            assert!(cam.fov() > 0.0 && cam.fov() < std::f32::consts::PI);
        }
        let cam = Camera::looking(Vec2::ZERO, Vec2::X, f32::NAN);
        assert!((cam.plane().length() - DEFAULT_PLANE).abs() < EPS);
    }

    #[test]
    fn move_by_ignores_orientation() {
        let mut cam = Camera::new(Vec2::new(1.0, 1.0));
        cam.move_by(cam.dir() * 2.0);
        assert!(close(cam.position(), Vec2::new(-1.0, 1.0)));
    }

    #[test]
    fn center_column_follows_facing_axis() {
        let cam = Camera::new(Vec2::ZERO);
        assert!(close(cam.ray_dir(160, 320), cam.dir()));
        assert!(close(cam.ray_dir(0, 320), cam.dir() - cam.plane()));
    }

    #[test]
    fn camera_space_splits_depth_and_offset() {
        let cam = Camera::new(Vec2::new(5.0, 5.0));
        let ahead = cam.to_camera_space(Vec2::new(2.0, 5.0));
        assert!(close(ahead, Vec2::new(0.0, 3.0)));
        assert!((cam.project_x(ahead, 320.0) - 160.0).abs() < EPS);

        // Points along +plane land right of center
        let right = cam.to_camera_space(Vec2::new(2.0, 6.0));
        assert!(right.x > 0.0);
        assert!(cam.project_x(right, 320.0) > 160.0);
    }
}
