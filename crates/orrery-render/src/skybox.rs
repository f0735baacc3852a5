//! Cubemap skybox drawn as a 36-vertex unit cube at the far plane.

use std::num::NonZeroU64;
use std::path::Path;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::buffer::BufferAllocator;
use crate::depth::DepthBuffer;
use crate::frame::{DepthState, RenderError};
use crate::texture::{DecodedImage, TEXTURE_FORMAT, check_texture_limit, load_image};

/// Face file stems in cube layer order: +X, -X, +Y, -Y, +Z, -Z.
pub const SKYBOX_FACES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

/// Two triangles per face. Drawn without culling.
#[rustfmt::skip]
const CUBE_VERTICES: [[f32; 3]; 36] = [
    [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],

    [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],

    [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
];

/// Six square RGBA8 faces of equal size, in [`SKYBOX_FACES`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeFaces {
    pub size: u32,
    pub faces: [Vec<u8>; 6],
    /// How many faces came from files rather than black fill.
    pub loaded: usize,
}

impl CubeFaces {
    /// An all-black cube with `size`×`size` faces.
    pub fn black(size: u32) -> Self {
        Self {
            size,
            faces: std::array::from_fn(|_| black_face(size)),
            loaded: 0,
        }
    }
}

fn black_face(size: u32) -> Vec<u8> {
    DecodedImage::solid(size, size, [0, 0, 0, 255]).pixels
}

/// Load `<dir>/<face>.<extension>` for each of the six faces.
///
/// The first square face that decodes fixes the face size. Faces that are
/// missing, undecodable, larger than `max_size`, or a different size are
/// logged and filled black. If no face is usable the result is a 1×1 black
/// cube.
pub fn load_cube_faces(dir: &Path, extension: &str, max_size: u32) -> CubeFaces {
    let decoded: Vec<Option<DecodedImage>> = SKYBOX_FACES
        .iter()
        .map(|face| {
            let path = dir.join(format!("{face}.{extension}"));
            load_image(&path)
                .and_then(|image| {
                    check_texture_limit(image.width, image.height, max_size)?;
                    Ok(image)
                })
                .map_err(|e| log::warn!("Skybox face '{face}' unavailable: {e}"))
                .ok()
        })
        .collect();

    let Some(size) = decoded
        .iter()
        .flatten()
        .find(|image| image.width == image.height)
        .map(|image| image.width)
    else {
        log::warn!(
            "No usable skybox faces in {}; background will be black",
            dir.display()
        );
        return CubeFaces::black(1);
    };

    let mut loaded = 0;
    let mut faces: [Vec<u8>; 6] = Default::default();
    for ((slot, image), face) in faces.iter_mut().zip(decoded).zip(SKYBOX_FACES) {
        *slot = match image {
            Some(image) if image.width == size && image.height == size => {
                loaded += 1;
                image.pixels
            }
            Some(image) => {
                log::warn!(
                    "Skybox face '{face}' is {}x{}, expected {size}x{size}; using black",
                    image.width,
                    image.height
                );
                black_face(size)
            }
            None => black_face(size),
        };
    }

    log::info!("Skybox loaded: {loaded}/6 faces at {size}x{size}");
    CubeFaces {
        size,
        faces,
        loaded,
    }
}

/// View and projection for the skybox pass. The view has no translation.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SkyboxUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

/// GPU skybox renderer.
pub struct SkyboxRenderer {
    shader: Arc<wgpu::ShaderModule>,
    pipeline_layout: wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    pipelines: FxHashMap<DepthState, wgpu::RenderPipeline>,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cubemap_bind_group: wgpu::BindGroup,
}

impl SkyboxRenderer {
    /// Upload the cubemap and cube geometry. Pipelines are built on demand
    /// per depth state.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shader: Arc<wgpu::ShaderModule>,
        surface_format: wgpu::TextureFormat,
        cube: &CubeFaces,
    ) -> Self {
        let uniform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(size_of::<SkyboxUniform>() as u64),
                },
                count: None,
            }],
        });

        let cubemap_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox-cubemap-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox-pipeline-layout"),
            bind_group_layouts: &[&uniform_bgl, &cubemap_bgl],
            immediate_size: 0,
        });

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("skybox-cubemap"),
            size: wgpu::Extent3d {
                width: cube.size,
                height: cube.size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, face) in cube.faces.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                face,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(cube.size * 4),
                    rows_per_image: Some(cube.size),
                },
                wgpu::Extent3d {
                    width: cube.size,
                    height: cube.size,
                    depth_or_array_layers: 1,
                },
            );
        }

        let cubemap_view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("skybox-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let cubemap_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox-cubemap-bg"),
            layout: &cubemap_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&cubemap_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let allocator = BufferAllocator::new(device);
        let vertex_buffer =
            allocator.create_vertex_buffer("skybox-vertices", bytemuck::cast_slice(&CUBE_VERTICES));
        let uniform_buffer =
            allocator.create_uniform_buffer("skybox-uniform", size_of::<SkyboxUniform>() as u64);

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox-uniform-bg"),
            layout: &uniform_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        log::info!(
            "Skybox renderer initialized: {}x{} cubemap, {} faces from disk",
            cube.size,
            cube.size,
            cube.loaded
        );

        Self {
            shader,
            pipeline_layout,
            surface_format,
            pipelines: FxHashMap::default(),
            vertex_buffer,
            uniform_buffer,
            uniform_bind_group,
            cubemap_bind_group,
        }
    }

    /// Build the pipeline for `state` if it does not exist yet.
    pub fn ensure_pipeline(&mut self, device: &wgpu::Device, state: DepthState) {
        if self.pipelines.contains_key(&state) {
            return;
        }
        log::debug!("Creating skybox pipeline for {state:?}");
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("skybox-pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::stencil_state(state)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });
        self.pipelines.insert(state, pipeline);
    }

    pub fn update(&self, queue: &wgpu::Queue, view: Mat4, projection: Mat4) {
        let uniform = SkyboxUniform {
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Draw `vertex_count` cube vertices with the pipeline for `state`.
    pub fn render(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        state: DepthState,
        vertex_count: u32,
    ) -> Result<(), RenderError> {
        let pipeline = self
            .pipelines
            .get(&state)
            .ok_or(RenderError::MissingPipeline(state))?;
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_bind_group(1, &self.cubemap_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..vertex_count.min(CUBE_VERTICES.len() as u32), 0..1);
        Ok(())
    }
}
