//! GPU mesh rendering with ambient plus directional flat shading

use crate::GpuContext;
use bytemuck::{Pod, Zeroable};
use meshview_core::{Color, Error, Model, NodeId, Result};
use nalgebra::{Matrix4, Point3};
use std::sync::Arc;
use tracing::{debug, warn};
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Maps nalgebra's OpenGL clip space (z in [-1, 1]) to wgpu's (z in [0, 1])
#[rustfmt::skip]
fn opengl_to_wgpu() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Vertex data for mesh rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Camera uniform data for mesh rendering
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct MeshCameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub _padding: f32,
}

/// Lighting parameters, laid out to match the WGSL `Lighting` struct
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshLightingParams {
    pub direction: [f32; 3],
    pub ambient: f32,
    pub color: [f32; 3],
    pub directional: f32,
}

impl Default for MeshLightingParams {
    fn default() -> Self {
        Self {
            direction: [1.0, 1.0, 1.0],
            ambient: 0.5,
            color: [1.0, 1.0, 1.0],
            directional: 0.8,
        }
    }
}

/// Colors used when turning a model into vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshStyle {
    pub base_color: Color,
    pub selection_tint: Color,
}

impl Default for MeshStyle {
    fn default() -> Self {
        Self {
            base_color: [0.8, 0.8, 0.8],
            selection_tint: [1.0, 0.6, 0.2],
        }
    }
}

/// Mesh rendering configuration
#[derive(Debug, Clone)]
pub struct MeshRenderConfig {
    pub lighting_params: MeshLightingParams,
    pub background_color: [f64; 4],
    pub style: MeshStyle,
}

impl Default for MeshRenderConfig {
    fn default() -> Self {
        Self {
            lighting_params: MeshLightingParams::default(),
            // #333333
            background_color: [0.2, 0.2, 0.2, 1.0],
            style: MeshStyle::default(),
        }
    }
}

/// Flatten the rendered part of a model into world-space triangle vertices
///
/// Nodes that are hidden, or have a hidden ancestor, are skipped. Every
/// triangle gets its own three vertices carrying its face normal (the stored
/// one when the mesh has normals), and the
/// `highlight` node is drawn in the selection tint.
pub fn scene_vertices(model: &Model, highlight: Option<NodeId>, style: &MeshStyle) -> Vec<MeshVertex> {
    let mut vertices = Vec::with_capacity(model.face_count() * 3);

    for (id, mesh, world) in model.mesh_nodes() {
        if !model.is_rendered(id) {
            continue;
        }
        let color = if highlight == Some(id) {
            style.selection_tint
        } else {
            style.base_color
        };

        for (face, triangle) in mesh.triangles().enumerate() {
            let normal = world
                .transform_vector(&mesh.face_normal(face))
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(nalgebra::Vector3::zeros);
            for p in triangle.map(|p| world.transform_point(&p)) {
                vertices.push(MeshVertex {
                    position: [p.x, p.y, p.z],
                    normal: [normal.x, normal.y, normal.z],
                    color,
                });
            }
        }
    }

    vertices
}

/// Vertex buffer currently on the GPU
struct GpuBatch {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

/// Window renderer drawing one batch of mesh vertices per frame
pub struct MeshRenderer {
    pub gpu_context: GpuContext,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    camera_uniform: MeshCameraUniform,
    camera_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    depth_view: wgpu::TextureView,
    config: MeshRenderConfig,
    batch: Option<GpuBatch>,
}

impl MeshRenderer {
    /// Create a renderer presenting to `window`
    pub async fn new(window: Arc<Window>, config: MeshRenderConfig) -> Result<Self> {
        let size = window.inner_size();
        let (gpu_context, surface) = GpuContext::for_window(window).await?;

        let surface_caps = surface.get_capabilities(&gpu_context.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface reports no texture formats".to_string()))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu_context.device, &surface_config);

        let camera_uniform = MeshCameraUniform {
            view_proj: Matrix4::identity().into(),
            view_pos: [0.0, 0.0, 0.0],
            _padding: 0.0,
        };
        let camera_buffer = gpu_context.create_buffer_init(
            "Camera Buffer",
            &[camera_uniform],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let lighting_buffer = gpu_context.create_buffer_init(
            "Lighting Buffer",
            &[config.lighting_params],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = gpu_context
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[uniform_entry(0), uniform_entry(1)],
                label: Some("mesh_bind_group_layout"),
            });

        let bind_group = gpu_context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lighting_buffer.as_entire_binding(),
                },
            ],
            label: Some("mesh_bind_group"),
        });

        let shader = gpu_context
            .create_shader_module("Flat Mesh Shader", include_str!("shaders/mesh_flat.wgsl"));
        let pipeline =
            Self::create_render_pipeline(&gpu_context.device, &bind_group_layout, &shader, surface_format);

        let depth_view = Self::create_depth_view(&gpu_context.device, &surface_config);

        Ok(Self {
            gpu_context,
            surface,
            surface_config,
            pipeline,
            camera_uniform,
            camera_buffer,
            bind_group,
            depth_view,
            config,
            batch: None,
        })
    }

    fn create_render_pipeline(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Render Pipeline Layout"),
            bind_group_layouts: &[bind_group_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Render Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[MeshVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // OBJ winding is often inconsistent; both sides are lit
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    fn create_depth_view(
        device: &wgpu::Device,
        surface_config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: surface_config.width,
                height: surface_config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Update camera matrices and position
    ///
    /// `proj_matrix` uses OpenGL depth conventions, as nalgebra produces.
    pub fn update_camera(&mut self, view_matrix: Matrix4<f32>, proj_matrix: Matrix4<f32>, eye: Point3<f32>) {
        self.camera_uniform.view_proj = (opengl_to_wgpu() * proj_matrix * view_matrix).into();
        self.camera_uniform.view_pos = [eye.x, eye.y, eye.z];
        self.gpu_context.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&self.camera_uniform),
        );
    }

    pub fn style(&self) -> &MeshStyle {
        &self.config.style
    }

    /// Replace the vertex batch drawn every frame
    pub fn upload(&mut self, vertices: &[MeshVertex]) {
        if vertices.is_empty() {
            self.batch = None;
            return;
        }
        debug!(vertices = vertices.len(), "uploading mesh batch");
        let buffer = self
            .gpu_context
            .create_buffer_init("Mesh Vertex Buffer", vertices, wgpu::BufferUsages::VERTEX);
        self.batch = Some(GpuBatch {
            buffer,
            vertex_count: vertices.len() as u32,
        });
    }

    /// Resize renderer
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.gpu_context.device, &self.surface_config);
            self.depth_view = Self::create_depth_view(&self.gpu_context.device, &self.surface_config);
        }
    }

    /// Draw one frame
    pub fn render(&self) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                self.surface.configure(&self.gpu_context.device, &self.surface_config);
                return Ok(());
            }
            Err(e) => return Err(Error::Gpu(format!("Failed to get surface texture: {:?}", e))),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu_context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Mesh Render Encoder"),
            });

        {
            let [r, g, b, a] = self.config.background_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Mesh Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(batch) = &self.batch {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_bind_group(0, &self.bind_group, &[]);
                render_pass.set_vertex_buffer(0, batch.buffer.slice(..));
                render_pass.draw(0..batch.vertex_count, 0..1);
            }
        }

        self.gpu_context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
