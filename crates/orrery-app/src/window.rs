//! Window creation and the per-frame loop via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]. Everything GPU-side
//! is created in `resumed`; each `RedrawRequested` runs one full frame.

use std::sync::Arc;

use orrery_config::Config;
use orrery_mesh::{SphereParams, generate_sphere};
use orrery_render::{
    Camera, RenderError, ShaderLibrary, SurfaceError, TextureHandle, WgpuBackend,
    init_render_context_blocking, load_cube_faces,
};
use orrery_scene::SolarSystem;
use tracing::{debug, info, instrument, trace, warn};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::error::AppError;
use crate::frame_clock::FrameClock;
use crate::viewer::Viewer;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attributes = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attributes
    }
}

/// Resources that exist only once the window does.
struct Gpu {
    window: Arc<Window>,
    backend: WgpuBackend,
    /// One handle per body, in draw order.
    textures: Vec<TextureHandle>,
}

/// The [`Viewer`] plus, once resumed, the window and GPU.
pub struct AppState {
    config: Config,
    viewer: Viewer,
    clock: FrameClock,
    gpu: Option<Gpu>,
    fatal: Option<AppError>,
}

impl AppState {
    pub fn new(config: Config, system: SolarSystem) -> Self {
        Self {
            viewer: Viewer::new(&config, system),
            config,
            clock: FrameClock::new(),
            gpu: None,
            fatal: None,
        }
    }

    pub fn camera(&self) -> &Camera {
        self.viewer.camera()
    }

    pub fn system(&self) -> &SolarSystem {
        self.viewer.system()
    }

    pub fn close_requested(&self) -> bool {
        self.viewer.close_requested()
    }

    /// Take the error that stopped the event loop, if any.
    pub fn take_fatal(&mut self) -> Option<AppError> {
        self.fatal.take()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu, AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);
        let context = init_render_context_blocking(window.clone(), self.config.window.vsync)?;
        info!(
            adapter = %context.adapter.get_info().name,
            format = ?context.surface_format,
            "GPU initialized"
        );

        let assets = &self.config.assets;
        let mut shaders = ShaderLibrary::new().with_shader_dir(assets.shader_path());
        let sphere = generate_sphere(SphereParams::new(
            self.config.render.sphere_sectors,
            self.config.render.sphere_stacks,
        ))?;
        let max_texture_size = context.device.limits().max_texture_dimension_2d;
        let cube = load_cube_faces(
            &assets.skybox_path(),
            &assets.skybox_extension,
            max_texture_size,
        );
        let mut backend = WgpuBackend::new(context, &mut shaders, &sphere, &cube)?;

        let textures: Vec<TextureHandle> = self
            .viewer
            .system()
            .bodies()
            .iter()
            .map(|body| backend.load_texture(&assets.resolve(&body.texture)))
            .collect();
        let missing = textures.iter().filter(|handle| handle.is_none()).count();
        info!(
            bodies = textures.len(),
            missing,
            skybox_faces = cube.loaded,
            "Scene resources loaded"
        );

        if self.config.input.capture_cursor {
            self.viewer.set_cursor_captured(&window, true);
        }
        window.request_redraw();

        Ok(Gpu {
            window,
            backend,
            textures,
        })
    }

    /// Run one frame against the window's backend.
    fn redraw(&mut self) -> Result<(), AppError> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };

        let time = self.clock.tick();
        let aspect = gpu.backend.aspect_ratio();
        match self.viewer.step(&mut gpu.backend, aspect, &gpu.textures, time) {
            Ok(stats) => trace!(?stats, elapsed = time.elapsed, "Frame rendered"),
            Err(RenderError::Surface(SurfaceError::Lost)) => {
                warn!("Surface lost, reconfiguring");
                let size = gpu.window.inner_size();
                gpu.backend.resize(size.width, size.height);
            }
            Err(e) => return Err(e.into()),
        }

        gpu.window.request_redraw();
        Ok(())
    }

    /// Record a fatal error and stop the loop. The caller of [`run`] logs it.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        debug!("Stopping event loop after fatal error");
        self.fatal = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.initialize(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.viewer.push_window_event(&event) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested");
                self.viewer.request_close();
            }
            WindowEvent::Resized(size) => {
                debug!(width = size.width, height = size.height, "Window resized");
                if let Some(gpu) = &mut self.gpu {
                    gpu.backend.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        self.viewer.push_device_event(&event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.close_requested() {
            event_loop.exit();
        }
    }
}

/// Run the event loop until the window closes or a fatal error occurs.
#[instrument(skip_all)]
pub fn run(config: Config, system: SolarSystem) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, system);
    event_loop.run_app(&mut app)?;
    match app.take_fatal() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
