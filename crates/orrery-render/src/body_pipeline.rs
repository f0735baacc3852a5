//! Pipeline and per-draw uniforms for the textured sphere bodies.

use std::num::NonZeroU64;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use rustc_hash::FxHashMap;

use crate::buffer::{BufferAllocator, sphere_vertex_layout};
use crate::depth::DepthBuffer;
use crate::frame::{DepthState, MeshDraw};

/// Model, view and projection for one body draw (column-major).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BodyUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl From<&MeshDraw> for BodyUniform {
    fn from(draw: &MeshDraw) -> Self {
        Self {
            model: draw.model.to_cols_array_2d(),
            view: draw.view.to_cols_array_2d(),
            projection: draw.projection.to_cols_array_2d(),
        }
    }
}

const BODY_UNIFORM_SIZE: u64 = size_of::<BodyUniform>() as u64;

/// Round `size` up to a multiple of `alignment`.
fn aligned_stride(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment.max(1)) * alignment.max(1)
}

/// One uniform slot per body draw, addressed by dynamic offset.
pub struct DrawUniforms {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: u32,
    stride: u64,
}

impl DrawUniforms {
    const INITIAL_CAPACITY: u32 = 16;

    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let stride = aligned_stride(
            BODY_UNIFORM_SIZE,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        Self::with_capacity(device, layout, stride, Self::INITIAL_CAPACITY)
    }

    fn with_capacity(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: u32,
    ) -> Self {
        let buffer = BufferAllocator::new(device)
            .create_uniform_buffer("body-uniforms", stride * u64::from(capacity));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("body-uniforms-bg"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(BODY_UNIFORM_SIZE),
                }),
            }],
        });
        Self {
            buffer,
            bind_group,
            capacity,
            stride,
        }
    }

    /// Write `uniforms` into consecutive slots, growing the buffer if needed.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        uniforms: &[BodyUniform],
    ) {
        let needed = uniforms.len() as u32;
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            log::debug!("Growing body uniform buffer to {capacity} slots");
            *self = Self::with_capacity(device, layout, self.stride, capacity);
        }
        for (slot, uniform) in uniforms.iter().enumerate() {
            queue.write_buffer(
                &self.buffer,
                slot as u64 * self.stride,
                bytemuck::bytes_of(uniform),
            );
        }
    }

    /// Dynamic offset of `slot`.
    pub fn offset(&self, slot: u32) -> u32 {
        (u64::from(slot) * self.stride) as u32
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

/// Sphere pipelines keyed by depth state.
pub struct BodyPipeline {
    shader: Arc<wgpu::ShaderModule>,
    layout: wgpu::PipelineLayout,
    uniform_layout: wgpu::BindGroupLayout,
    surface_format: wgpu::TextureFormat,
    pipelines: FxHashMap<DepthState, wgpu::RenderPipeline>,
}

impl BodyPipeline {
    /// `texture_layout` is group 1 (texture + sampler) from the texture registry.
    pub fn new(
        device: &wgpu::Device,
        shader: Arc<wgpu::ShaderModule>,
        surface_format: wgpu::TextureFormat,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("body-uniform-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(BODY_UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("body-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout, texture_layout],
            immediate_size: 0,
        });

        Self {
            shader,
            layout,
            uniform_layout,
            surface_format,
            pipelines: FxHashMap::default(),
        }
    }

    pub fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_layout
    }

    pub fn ensure_pipeline(&mut self, device: &wgpu::Device, state: DepthState) {
        if self.pipelines.contains_key(&state) {
            return;
        }
        log::debug!("Creating body pipeline for {state:?}");
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("body-pipeline"),
            layout: Some(&self.layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                buffers: &[sphere_vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(DepthBuffer::stencil_state(state)),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
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

    pub fn pipeline(&self, state: DepthState) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&state)
    }
}
