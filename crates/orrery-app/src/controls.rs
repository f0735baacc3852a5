//! Fly-camera controls: keys move, the mouse looks, the wheel zooms.

use glam::Vec3;
use orrery_config::{CameraConfig, InputConfig};
use orrery_input::{KeyboardState, MouseState};
use orrery_render::{Camera, CameraMovement};
use winit::keyboard::KeyCode;

/// Keys bound to each movement direction.
pub const MOVEMENT_BINDINGS: [(CameraMovement, [KeyCode; 2]); 4] = [
    (CameraMovement::Forward, [KeyCode::KeyW, KeyCode::ArrowUp]),
    (CameraMovement::Backward, [KeyCode::KeyS, KeyCode::ArrowDown]),
    (CameraMovement::Left, [KeyCode::KeyA, KeyCode::ArrowLeft]),
    (CameraMovement::Right, [KeyCode::KeyD, KeyCode::ArrowRight]),
];

/// Build the start camera from its config section.
pub fn camera_from_config(config: &CameraConfig) -> Camera {
    let mut camera = Camera::new(Vec3::from(config.position), Vec3::Y, config.yaw, config.pitch);
    camera.movement_speed = config.speed;
    camera.mouse_sensitivity = config.sensitivity;
    camera.near = config.near;
    camera.far = config.far;
    camera.set_zoom_range(config.zoom_min, config.zoom_max);
    camera.set_zoom(config.zoom);
    camera
}

/// Applies one frame of drained input to a [`Camera`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraControls {
    /// Mouse up looks down.
    pub invert_y: bool,
}

impl CameraControls {
    pub fn from_config(config: &InputConfig) -> Self {
        Self {
            invert_y: config.invert_y,
        }
    }

    /// Move, look and zoom. Returns `true` if any input touched the camera.
    pub fn apply(
        &self,
        camera: &mut Camera,
        keyboard: &KeyboardState,
        mouse: &MouseState,
        dt: f32,
    ) -> bool {
        let mut changed = false;

        for (direction, keys) in MOVEMENT_BINDINGS {
            if keyboard.any_pressed(&keys) {
                camera.process_keyboard(direction, dt);
                changed = true;
            }
        }

        let delta = mouse.delta();
        if delta.x != 0.0 || delta.y != 0.0 {
            // Screen y grows downward; camera pitch grows upward.
            let dy = if self.invert_y { delta.y } else { -delta.y };
            camera.process_mouse_movement(delta.x, dy, true);
            changed = true;
        }

        let scroll = mouse.scroll();
        if scroll != 0.0 {
            camera.process_mouse_scroll(scroll);
            changed = true;
        }

        changed
    }
}
