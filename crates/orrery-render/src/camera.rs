//! Free-look fly camera driven by yaw and pitch.

use glam::{Mat3, Mat4, Vec3};

/// Pitch limit in degrees. Beyond this the look-at basis flips.
pub const PITCH_LIMIT_DEG: f32 = 89.0;

/// Planar movement directions relative to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Perspective camera oriented by yaw/pitch Euler angles in degrees.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    pub world_up: Vec3,
    yaw_deg: f32,
    pitch_deg: f32,
    /// World units per second.
    pub movement_speed: f32,
    /// Degrees per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    zoom_deg: f32,
    zoom_range: (f32, f32),
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::Y, -90.0, 0.0)
    }
}

impl Camera {
    /// A camera at `position`, looking along the direction given by `yaw_deg`
    /// and `pitch_deg`. Yaw -90 looks down -Z.
    pub fn new(position: Vec3, world_up: Vec3, yaw_deg: f32, pitch_deg: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw_deg,
            pitch_deg: pitch_deg.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG),
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            zoom_deg: 45.0,
            zoom_range: (1.0, 45.0),
            near: 0.1,
            far: 100.0,
        };
        camera.update_vectors();
        camera
    }

    /// Set the allowed field-of-view range and re-clamp the current zoom.
    pub fn set_zoom_range(&mut self, min_deg: f32, max_deg: f32) {
        let (lo, hi) = if min_deg <= max_deg {
            (min_deg, max_deg)
        } else {
            (max_deg, min_deg)
        };
        self.zoom_range = (lo, hi);
        self.zoom_deg = self.zoom_deg.clamp(lo, hi);
    }

    pub fn set_zoom(&mut self, zoom_deg: f32) {
        self.zoom_deg = zoom_deg.clamp(self.zoom_range.0, self.zoom_range.1);
    }

    /// Move along the view-derived front or right vector by `speed * dt`.
    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.movement_speed * dt;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Apply a look delta. Positive `dy` pitches up.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw_deg += dx * self.mouse_sensitivity;
        self.pitch_deg += dy * self.mouse_sensitivity;
        if constrain_pitch {
            self.pitch_deg = self.pitch_deg.clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG);
        }
        self.update_vectors();
    }

    /// Narrow (positive `dy`) or widen the field of view.
    pub fn process_mouse_scroll(&mut self, dy: f32) {
        self.set_zoom(self.zoom_deg - dy);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection with fov = zoom, depth mapped to [0, 1].
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom_deg.to_radians(), aspect, self.near, self.far)
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw_deg(&self) -> f32 {
        self.yaw_deg
    }

    pub fn pitch_deg(&self) -> f32 {
        self.pitch_deg
    }

    pub fn zoom_deg(&self) -> f32 {
        self.zoom_deg
    }

    pub fn zoom_range(&self) -> (f32, f32) {
        self.zoom_range
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw_deg.to_radians(), self.pitch_deg.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

/// The rotation part of `view`, so the skybox stays centred on the eye.
pub fn skybox_view(view: Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = Camera::default();
        assert!(camera.front().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-6));
        assert!(camera.up().abs_diff_eq(Vec3::Y, 1e-6));
        assert_eq!(camera.zoom_deg(), 45.0);
    }

    #[test]
    fn test_pitch_clamped_for_large_input() {
        let mut camera = Camera::default();
        for _ in 0..1000 {
            camera.process_mouse_movement(0.0, 10_000.0, true);
        }
        assert_eq!(camera.pitch_deg(), PITCH_LIMIT_DEG);

        camera.process_mouse_movement(0.0, -1.0e9, true);
        assert_eq!(camera.pitch_deg(), -PITCH_LIMIT_DEG);
        assert!(camera.up().y > 0.0);
    }

    #[test]
    fn test_unconstrained_pitch_is_not_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(0.0, 1000.0, false);
        assert!((camera.pitch_deg() - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_yaw_turns_right() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(900.0, 0.0, true);
        // yaw -90 + 90 = 0 looks down +X.
        assert!(camera.front().abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.zoom_deg(), 45.0);
        camera.process_mouse_scroll(1000.0);
        assert_eq!(camera.zoom_deg(), 1.0);
        camera.process_mouse_scroll(-2.5);
        assert!((camera.zoom_deg() - 3.5).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_range_reclamps() {
        let mut camera = Camera::default();
        camera.set_zoom_range(60.0, 10.0);
        assert_eq!(camera.zoom_range(), (10.0, 60.0));
        assert_eq!(camera.zoom_deg(), 45.0);
        camera.set_zoom_range(5.0, 30.0);
        assert_eq!(camera.zoom_deg(), 30.0);
    }

    #[test]
    fn test_keyboard_moves_along_view_not_world_y() {
        let mut camera = Camera::default();
        camera.movement_speed = 2.0;
        camera.process_mouse_movement(0.0, 450.0, true); // pitch 45 up
        camera.process_keyboard(CameraMovement::Forward, 0.5);
        let expected = camera.front() * 1.0;
        assert!(camera.position.abs_diff_eq(expected, 1e-5));

        let before = camera.position;
        camera.process_keyboard(CameraMovement::Right, 1.0);
        let step = camera.position - before;
        assert!((step.length() - 2.0).abs() < 1e-5);
        assert!(step.y.abs() < 1e-5);
    }

    #[test]
    fn test_backward_undoes_forward() {
        let mut camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::Y, 30.0, 10.0);
        let start = camera.position;
        camera.process_keyboard(CameraMovement::Forward, 0.25);
        camera.process_keyboard(CameraMovement::Backward, 0.25);
        camera.process_keyboard(CameraMovement::Left, 0.5);
        camera.process_keyboard(CameraMovement::Right, 0.5);
        assert!(camera.position.abs_diff_eq(start, 1e-5));
    }

    #[test]
    fn test_view_matrix_is_pure() {
        let camera = Camera::new(Vec3::new(0.0, 2.0, 30.0), Vec3::Y, -90.0, 0.0);
        let a = camera.view_matrix();
        let b = camera.view_matrix();
        assert_eq!(a, b);
        // The eye maps to the view-space origin.
        let eye = a * Vec4::new(0.0, 2.0, 30.0, 1.0);
        assert!(eye.truncate().abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn test_projection_depth_range_zero_to_one() {
        let camera = Camera::default();
        let proj = camera.projection_matrix(16.0 / 9.0);
        let near = proj * Vec4::new(0.0, 0.0, -camera.near, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -camera.far, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_skybox_view_drops_translation() {
        let camera = Camera::new(Vec3::new(5.0, -3.0, 12.0), Vec3::Y, -60.0, 20.0);
        let view = skybox_view(camera.view_matrix());
        assert_eq!(view.w_axis, Vec4::W);
        assert_eq!(view.x_axis.w, 0.0);
        let rotated = view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(rotated.truncate().abs_diff_eq(Vec3::ZERO, 1e-6));
    }
}
