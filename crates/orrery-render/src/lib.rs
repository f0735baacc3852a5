//! wgpu rendering for orrery: surface management, the skybox and body
//! pipelines, named shader loading, and the fixed per-frame draw sequence.

pub mod backend;
pub mod body_pipeline;
pub mod buffer;
pub mod camera;
pub mod depth;
pub mod frame;
pub mod gpu;
pub mod pass;
pub mod shader;
pub mod skybox;
pub mod texture;

pub use backend::WgpuBackend;
pub use body_pipeline::{BodyPipeline, BodyUniform, DrawUniforms};
pub use buffer::{BufferAllocator, MeshBuffer, sphere_vertex_layout, upload_sphere};
pub use camera::{Camera, CameraMovement, skybox_view};
pub use depth::DepthBuffer;
pub use frame::{
    BodyDraw, DepthCompare, DepthState, FrameRenderer, FrameStats, GraphicsBackend, MeshDraw,
    RenderError, SKYBOX_VERTEX_COUNT, TextureHandle,
};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use shader::{ShaderError, ShaderLibrary};
pub use skybox::{CubeFaces, SKYBOX_FACES, SkyboxRenderer, load_cube_faces};
pub use texture::{DecodedImage, TextureError, TextureRegistry, check_texture_limit, load_image};
