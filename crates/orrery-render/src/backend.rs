//! [`GraphicsBackend`] on wgpu.
//!
//! Commands are recorded as they arrive and encoded into a single render
//! pass on [`present`](GraphicsBackend::present). Depth state changes select
//! between pipelines created per [`DepthState`].

use std::path::Path;

use glam::Mat4;
use orrery_mesh::SphereMesh;

use crate::body_pipeline::{BodyPipeline, BodyUniform, DrawUniforms};
use crate::buffer::{BufferAllocator, MeshBuffer, upload_sphere};
use crate::depth::DepthBuffer;
use crate::frame::{DepthState, GraphicsBackend, MeshDraw, RenderError, TextureHandle};
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::{FrameEncoder, RenderPassBuilder};
use crate::shader::{BODY_SHADER, SKYBOX_SHADER, ShaderLibrary};
use crate::skybox::{CubeFaces, SkyboxRenderer};
use crate::texture::TextureRegistry;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    SetDepth(DepthState),
    Skybox { vertex_count: u32 },
    Mesh { texture: TextureHandle, slot: u32 },
}

/// Everything recorded since the last `clear`.
#[derive(Debug, Default)]
struct FrameRecording {
    clear_color: [f32; 4],
    commands: Vec<Command>,
    uniforms: Vec<BodyUniform>,
    skybox: Option<(Mat4, Mat4)>,
}

impl FrameRecording {
    fn new(clear_color: [f32; 4]) -> Self {
        Self {
            clear_color,
            ..Default::default()
        }
    }

    fn record_skybox(&mut self, view: Mat4, projection: Mat4, vertex_count: u32) {
        self.skybox = Some((view, projection));
        self.commands.push(Command::Skybox { vertex_count });
    }

    /// Each mesh gets its own uniform slot, in draw order.
    fn record_mesh(&mut self, draw: &MeshDraw) {
        let slot = self.uniforms.len() as u32;
        self.uniforms.push(BodyUniform::from(draw));
        self.commands.push(Command::Mesh {
            texture: draw.texture,
            slot,
        });
    }

    fn depth_states(&self) -> impl Iterator<Item = DepthState> + '_ {
        self.commands.iter().filter_map(|command| match command {
            Command::SetDepth(state) => Some(*state),
            _ => None,
        })
    }
}

/// Renders the scene to the window surface.
pub struct WgpuBackend {
    context: RenderContext,
    depth: DepthBuffer,
    textures: TextureRegistry,
    skybox: SkyboxRenderer,
    bodies: BodyPipeline,
    uniforms: DrawUniforms,
    sphere: MeshBuffer,
    frame: Option<FrameRecording>,
}

impl WgpuBackend {
    /// Compile the named shaders and upload the sphere mesh and skybox.
    ///
    /// Shader errors are returned, not logged; the caller decides fatality.
    pub fn new(
        context: RenderContext,
        shaders: &mut ShaderLibrary,
        sphere: &SphereMesh,
        cube: &CubeFaces,
    ) -> Result<Self, RenderError> {
        let device = &context.device;
        let body_shader = shaders.load_named(device, BODY_SHADER)?;
        let skybox_shader = shaders.load_named(device, SKYBOX_SHADER)?;

        let textures = TextureRegistry::new(device, &context.queue);
        let mut skybox = SkyboxRenderer::new(
            device,
            &context.queue,
            skybox_shader,
            context.surface_format,
            cube,
        );
        let mut bodies = BodyPipeline::new(
            device,
            body_shader,
            context.surface_format,
            textures.bind_group_layout(),
        );
        for state in [DepthState::OPAQUE, DepthState::SKYBOX] {
            skybox.ensure_pipeline(device, state);
            bodies.ensure_pipeline(device, state);
        }

        let uniforms = DrawUniforms::new(device, bodies.uniform_layout());
        let sphere = upload_sphere(&BufferAllocator::new(device), sphere);
        let (width, height) = context.size();
        let depth = DepthBuffer::new(device, width, height);

        Ok(Self {
            context,
            depth,
            textures,
            skybox,
            bodies,
            uniforms,
            sphere,
            frame: None,
        })
    }

    /// Load a body texture; failures degrade to [`TextureHandle::NONE`].
    pub fn load_texture(&mut self, path: &Path) -> TextureHandle {
        self.textures
            .load_or_fallback(&self.context.device, &self.context.queue, path)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
        let (width, height) = self.context.size();
        self.depth.resize(&self.context.device, width, height);
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.context.aspect_ratio()
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    fn recording(&mut self) -> Result<&mut FrameRecording, RenderError> {
        self.frame.as_mut().ok_or(RenderError::FrameNotStarted)
    }

    fn encode(&mut self, frame: &FrameRecording) -> Result<bool, RenderError> {
        let surface_texture = match self.context.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Timeout) => {
                log::warn!("Surface acquire timed out; skipping frame");
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let device = &self.context.device;
        let queue = &self.context.queue;

        for state in frame.depth_states() {
            self.skybox.ensure_pipeline(device, state);
            self.bodies.ensure_pipeline(device, state);
        }
        self.uniforms
            .write(device, queue, self.bodies.uniform_layout(), &frame.uniforms);
        if let Some((view, projection)) = frame.skybox {
            self.skybox.update(queue, view, projection);
        }

        let builder = RenderPassBuilder::new()
            .clear_rgba(frame.clear_color)
            .depth(self.depth.view.clone(), DepthBuffer::CLEAR_VALUE)
            .label("orrery-frame");
        let mut encoder = FrameEncoder::new(device, queue, surface_texture);
        {
            let Some(mut pass) = encoder.begin_render_pass(&builder) else {
                return Ok(false);
            };
            let mut depth = DepthState::OPAQUE;
            for command in &frame.commands {
                match *command {
                    Command::SetDepth(state) => depth = state,
                    Command::Skybox { vertex_count } => {
                        self.skybox.render(&mut pass, depth, vertex_count)?;
                    }
                    Command::Mesh { texture, slot } => {
                        let pipeline = self
                            .bodies
                            .pipeline(depth)
                            .ok_or(RenderError::MissingPipeline(depth))?;
                        pass.set_pipeline(pipeline);
                        pass.set_bind_group(
                            0,
                            self.uniforms.bind_group(),
                            &[self.uniforms.offset(slot)],
                        );
                        pass.set_bind_group(1, self.textures.bind_group(texture), &[]);
                        self.sphere.bind(&mut pass);
                        self.sphere.draw(&mut pass);
                    }
                }
            }
        }
        encoder.submit();
        Ok(true)
    }
}

impl GraphicsBackend for WgpuBackend {
    fn clear(&mut self, color: [f32; 4]) -> Result<(), RenderError> {
        if self.frame.is_some() {
            log::debug!("Frame restarted before present; discarding recorded commands");
        }
        self.frame = Some(FrameRecording::new(color));
        Ok(())
    }

    fn set_depth_state(&mut self, state: DepthState) -> Result<(), RenderError> {
        self.recording()?.commands.push(Command::SetDepth(state));
        Ok(())
    }

    fn draw_skybox(
        &mut self,
        view: Mat4,
        projection: Mat4,
        vertex_count: u32,
    ) -> Result<(), RenderError> {
        self.recording()?.record_skybox(view, projection, vertex_count);
        Ok(())
    }

    fn draw_mesh(&mut self, draw: &MeshDraw) -> Result<(), RenderError> {
        self.recording()?.record_mesh(draw);
        Ok(())
    }

    fn present(&mut self) -> Result<bool, RenderError> {
        let frame = self.frame.take().ok_or(RenderError::FrameNotStarted)?;
        self.encode(&frame)
    }
}
