//! The per-frame simulation step, independent of any window.
//!
//! Drain input, handle Escape, move the camera, advance self-rotation by the
//! frame delta, place bodies at the absolute elapsed time, then draw.

use orrery_config::Config;
use orrery_input::{InputQueue, KeyboardState, MouseState};
use orrery_render::{
    BodyDraw, Camera, FrameRenderer, FrameStats, GraphicsBackend, RenderError, TextureHandle,
};
use orrery_scene::{BodyInstance, SolarSystem};
use winit::event::{DeviceEvent, WindowEvent};
use winit::keyboard::KeyCode;
use winit::window::Window;

use crate::controls::{CameraControls, camera_from_config};
use crate::frame_clock::FrameTime;

/// Pair each instance with the texture loaded for its body.
///
/// `textures` is indexed like [`SolarSystem::bodies`]; missing entries draw
/// untextured.
pub fn body_draws(instances: &[BodyInstance<'_>], textures: &[TextureHandle]) -> Vec<BodyDraw> {
    instances
        .iter()
        .enumerate()
        .map(|(i, instance)| BodyDraw {
            texture: textures.get(i).copied().unwrap_or(TextureHandle::NONE),
            model: instance.model,
        })
        .collect()
}

/// Scene, camera and input state advanced once per frame.
pub struct Viewer {
    system: SolarSystem,
    camera: Camera,
    controls: CameraControls,
    renderer: FrameRenderer,
    input: InputQueue,
    keyboard: KeyboardState,
    mouse: MouseState,
    close_requested: bool,
}

impl Viewer {
    pub fn new(config: &Config, system: SolarSystem) -> Self {
        Self {
            system,
            camera: camera_from_config(&config.camera),
            controls: CameraControls::from_config(&config.input),
            renderer: FrameRenderer::new(config.render.clear_color),
            input: InputQueue::new(),
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(),
            close_requested: false,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn system(&self) -> &SolarSystem {
        &self.system
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    /// Queue a window event for the next step. Returns whether it was input.
    pub fn push_window_event(&mut self, event: &WindowEvent) -> bool {
        self.input.push_window_event(event)
    }

    pub fn push_device_event(&mut self, event: &DeviceEvent) -> bool {
        self.input.push_device_event(event)
    }

    pub fn set_cursor_captured(&mut self, window: &Window, captured: bool) {
        self.mouse.set_captured(window, captured);
    }

    /// Run one frame against `backend`.
    ///
    /// Per-frame input transients are cleared whether or not the draw
    /// succeeds.
    pub fn step<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        aspect: f32,
        textures: &[TextureHandle],
        time: FrameTime,
    ) -> Result<FrameStats, RenderError> {
        self.input.drain_into(&mut self.keyboard, &mut self.mouse);
        // A tap shorter than one frame is released again by the time we look.
        if self.keyboard.is_pressed(KeyCode::Escape) || self.keyboard.just_pressed(KeyCode::Escape)
        {
            self.close_requested = true;
        }

        self.controls
            .apply(&mut self.camera, &self.keyboard, &self.mouse, time.delta as f32);
        self.system.advance(time.delta);
        let draws = body_draws(&self.system.instances(time.elapsed), textures);

        let result = self.renderer.render(backend, &self.camera, aspect, &draws);
        self.keyboard.clear_transients();
        self.mouse.clear_transients();
        result
    }
}
