//! The fixed per-frame draw sequence and the backend seam it drives.
//!
//! Every frame is: clear, skybox at max depth with depth writes off, each
//! body in declared order with depth writes on, present. [`FrameRenderer`]
//! owns that ordering; a [`GraphicsBackend`] only executes it.

use glam::Mat4;

use crate::camera::{Camera, skybox_view};
use crate::gpu::SurfaceError;
use crate::shader::ShaderError;

/// Vertex count of the non-indexed skybox cube.
pub const SKYBOX_VERTEX_COUNT: u32 = 36;

/// Depth comparison used by a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthCompare {
    Less,
    LessEqual,
}

impl DepthCompare {
    pub fn to_wgpu(self) -> wgpu::CompareFunction {
        match self {
            Self::Less => wgpu::CompareFunction::Less,
            Self::LessEqual => wgpu::CompareFunction::LessEqual,
        }
    }
}

/// Depth write and compare state baked into a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthState {
    pub write_enabled: bool,
    pub compare: DepthCompare,
}

impl DepthState {
    /// Default state: scene geometry writes depth and uses a strict test.
    pub const OPAQUE: Self = Self {
        write_enabled: true,
        compare: DepthCompare::Less,
    };

    /// The skybox sits exactly at the far plane, so it needs `<=` and must
    /// not write depth.
    pub const SKYBOX: Self = Self {
        write_enabled: false,
        compare: DepthCompare::LessEqual,
    };
}

impl Default for DepthState {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// Index of a texture in the registry. Zero means "no texture".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    pub const NONE: Self = Self(0);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// One body's textured draw over the shared sphere mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshDraw {
    pub texture: TextureHandle,
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

/// What the frame renderer needs to know about a body this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDraw {
    pub texture: TextureHandle,
    pub model: Mat4,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("shader error: {0}")]
    Shader(#[from] ShaderError),

    #[error("draw issued before the frame was cleared")]
    FrameNotStarted,

    #[error("no pipeline for depth state {0:?}")]
    MissingPipeline(DepthState),
}

/// The graphics primitives the frame sequence is expressed in.
pub trait GraphicsBackend {
    /// Start a frame by clearing color and depth.
    fn clear(&mut self, color: [f32; 4]) -> Result<(), RenderError>;

    /// Depth state for subsequent draws.
    fn set_depth_state(&mut self, state: DepthState) -> Result<(), RenderError>;

    /// Non-indexed cube draw sampling the skybox cubemap.
    fn draw_skybox(
        &mut self,
        view: Mat4,
        projection: Mat4,
        vertex_count: u32,
    ) -> Result<(), RenderError>;

    /// Indexed draw of the shared sphere mesh.
    fn draw_mesh(&mut self, draw: &MeshDraw) -> Result<(), RenderError>;

    /// Finish the frame. Returns `false` if the frame was dropped without
    /// being shown.
    fn present(&mut self) -> Result<bool, RenderError>;
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub body_draws: usize,
    pub presented: bool,
}

/// Issues the per-frame draw sequence.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    pub clear_color: [f32; 4],
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl FrameRenderer {
    pub fn new(clear_color: [f32; 4]) -> Self {
        Self { clear_color }
    }

    /// Render one frame. `bodies` must already be in draw order.
    pub fn render<B: GraphicsBackend + ?Sized>(
        &self,
        backend: &mut B,
        camera: &Camera,
        aspect: f32,
        bodies: &[BodyDraw],
    ) -> Result<FrameStats, RenderError> {
        backend.clear(self.clear_color)?;

        let projection = camera.projection_matrix(aspect);
        let view = camera.view_matrix();

        backend.set_depth_state(DepthState::SKYBOX)?;
        backend.draw_skybox(skybox_view(view), projection, SKYBOX_VERTEX_COUNT)?;
        backend.set_depth_state(DepthState::OPAQUE)?;

        for body in bodies {
            backend.draw_mesh(&MeshDraw {
                texture: body.texture,
                model: body.model,
                view,
                projection,
            })?;
        }

        let presented = backend.present()?;
        Ok(FrameStats {
            body_draws: bodies.len(),
            presented,
        })
    }
}
