//! wgpu backend for composited volume slices.
//!
//! [`GpuStripSink`] collects quad strips on the CPU as triangle lists, split
//! into batches wherever the blend mode changes. After [`GpuStripSink::upload`]
//! the batches are replayed into a render pass with one pipeline per blend
//! mode, preserving submission order.

use crate::buffer::{create_uniform_buffer, StreamBuffer};
use crate::camera::ViewTransform;
use crate::compositor::{strip_to_triangles, BlendMode, StripSink, StripVertex};
use crate::error::{RenderError, RenderResult};

/// Camera uniforms for the slice shader.
/// Layout must match WGSL `Camera` exactly.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SliceCameraUniforms {
    /// World to clip transform.
    pub view_proj: [[f32; 4]; 4],
}

impl Default for SliceCameraUniforms {
    fn default() -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

impl From<&ViewTransform> for SliceCameraUniforms {
    fn from(view: &ViewTransform) -> Self {
        Self {
            view_proj: view.combined().to_cols_array_2d(),
        }
    }
}

/// Consecutive vertices drawn with one blend mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    pub blend: BlendMode,
    pub first: u32,
    pub count: u32,
}

/// Triangle-list staging of a frame's strips, batched by blend mode.
#[derive(Debug, Default)]
pub struct SliceBatches {
    vertices: Vec<StripVertex>,
    batches: Vec<Batch>,
}

impl SliceBatches {
    /// Appends a quad strip drawn with `blend`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_strip(&mut self, blend: BlendMode, strip: &[StripVertex]) {
        let start = self.vertices.len();
        strip_to_triangles(strip, &mut self.vertices);
        let added = (self.vertices.len() - start) as u32;
        if added == 0 {
            return;
        }
        match self.batches.last_mut() {
            Some(batch) if batch.blend == blend => batch.count += added,
            _ => self.batches.push(Batch {
                blend,
                first: start as u32,
                count: added,
            }),
        }
    }

    /// Triangle vertices in draw order.
    pub fn vertices(&self) -> &[StripVertex] {
        &self.vertices
    }

    /// Batches in draw order.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.batches.clear();
    }
}

/// Strip sink drawing through wgpu.
pub struct GpuStripSink {
    replace_pipeline: wgpu::RenderPipeline,
    alpha_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: StreamBuffer,

    blend: BlendMode,
    staged: SliceBatches,
}

impl GpuStripSink {
    /// Builds the slice pipelines for a color target and optional depth target.
    ///
    /// Slices test against depth but never write it, so opaque geometry
    /// occludes them while they stay blended with one another.
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
    ) -> RenderResult<Self> {
        if color_format.is_depth_stencil_format() {
            return Err(RenderError::UnsupportedFormat(color_format));
        }

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Volume Slice Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/volume_slice.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Volume Slice Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Volume Slice Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let create_pipeline = |label: &str, blend: wgpu::BlendState| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<StripVertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[
                            // position (vec3)
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x3,
                                offset: 0,
                                shader_location: 0,
                            },
                            // color (rgba8, normalized)
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Unorm8x4,
                                offset: 12,
                                shader_location: 1,
                            },
                        ],
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                    format,
                    depth_write_enabled: false,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let replace_pipeline =
            create_pipeline("Volume Slice Pipeline (replace)", wgpu::BlendState::REPLACE);
        let alpha_pipeline = create_pipeline(
            "Volume Slice Pipeline (alpha)",
            wgpu::BlendState::ALPHA_BLENDING,
        );

        let camera_buffer = create_uniform_buffer(
            device,
            &SliceCameraUniforms::default(),
            Some("Volume Slice Camera"),
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Volume Slice Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            replace_pipeline,
            alpha_pipeline,
            camera_buffer,
            bind_group,
            vertex_buffer: StreamBuffer::new("Volume Slice Vertices"),
            blend: BlendMode::Replace,
            staged: SliceBatches::default(),
        })
    }

    /// Sets the camera used by subsequent draws.
    pub fn set_view(&self, queue: &wgpu::Queue, view: &ViewTransform) {
        let uniforms = SliceCameraUniforms::from(view);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Uploads the collected triangles to the GPU.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> RenderResult<()> {
        let limit = u32::MAX as usize;
        let vertices = self.staged.vertices();
        if vertices.len() > limit {
            return Err(RenderError::BatchTooLarge {
                vertices: vertices.len(),
                limit,
            });
        }
        self.vertex_buffer.write(device, queue, vertices);
        Ok(())
    }

    /// Replays the uploaded batches into a render pass.
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        let Some(vertices) = self.vertex_buffer.slice() else {
            return;
        };
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, vertices);
        for batch in self.staged.batches() {
            render_pass.set_pipeline(match batch.blend {
                BlendMode::Replace => &self.replace_pipeline,
                BlendMode::AlphaOver => &self.alpha_pipeline,
            });
            render_pass.draw(batch.first..batch.first + batch.count, 0..1);
        }
    }

    /// Drops the collected strips so the next frame starts empty.
    pub fn clear(&mut self) {
        self.staged.clear();
    }
}

impl StripSink for GpuStripSink {
    fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn draw_quad_strip(&mut self, vertices: &[StripVertex]) {
        self.staged.push_strip(self.blend, vertices);
    }
}
