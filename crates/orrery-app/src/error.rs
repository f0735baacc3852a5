use orrery_config::ConfigError;
use orrery_mesh::MeshError;
use orrery_render::{RenderContextError, RenderError};
use orrery_scene::SceneError;

use crate::platform::PlatformError;

/// Errors that end the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("sphere mesh error: {0}")]
    Mesh(#[from] MeshError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] RenderContextError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}
