//! GPU rendering for the shape viewer.
//!
//! This module handles all graphics rendering using wgpu: GPU buffers for
//! every predefined shape, the filled and wireframe pipelines, and per-frame
//! drawing of the active shape inside the viewport bounds.

use iced::widget::shader::wgpu::{self, CommandEncoder, Device, TextureFormat, TextureView};
use iced::{Rectangle, Size};
use nalgebra::Matrix4;
use wgpu::util::DeviceExt;

use crate::camera::{Camera, Projection, view_projection};
use crate::config::ViewerConfig;
use crate::shapes::{ShapeKind, Vertex};

/// Maps nalgebra's OpenGL clip space (z in -1..1) onto wgpu's (z in 0..1).
#[rustfmt::skip]
fn opengl_to_wgpu() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Ambient term added to the point light contribution
const AMBIENT: f32 = 0.15;

/// Everything the shader needs for one frame.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Uniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
    /// xyz position, w range
    light_position: [f32; 4],
    /// x intensity, y ambient
    light: [f32; 4],
    background: [f32; 4],
}

impl Uniforms {
    pub(crate) fn new(config: &ViewerConfig) -> Self {
        let [r, g, b] = config.shape_color;
        let [lx, ly, lz] = config.light_position;
        let [br, bg, bb] = config.background;
        Self {
            view_proj: Matrix4::identity().into(),
            model: Matrix4::identity().into(),
            normal_matrix: Matrix4::identity().into(),
            color: [r, g, b, 1.0],
            light_position: [lx, ly, lz, config.light_range],
            light: [config.light_intensity, AMBIENT, 0.0, 0.0],
            background: [br, bg, bb, 1.0],
        }
    }

    pub(crate) fn update(
        &mut self,
        camera: &Camera,
        projection: &Projection,
        model: &Matrix4<f32>,
        normal_matrix: &Matrix4<f32>,
    ) {
        self.view_proj = (opengl_to_wgpu() * view_projection(camera, projection)).into();
        self.model = (*model).into();
        self.normal_matrix = (*normal_matrix).into();
    }
}

/// GPU buffers for one shape
#[derive(Debug)]
struct GpuMesh {
    kind: ShapeKind,
    vertex_buffer: wgpu::Buffer,
    /// Triangle list indices
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    /// Line list indices over the unique triangle edges
    edge_buffer: wgpu::Buffer,
    num_edge_indices: u32,
}

impl GpuMesh {
    fn new(device: &Device, kind: ShapeKind) -> Self {
        let mesh = kind.mesh();
        let edges = mesh.edge_indices();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shape Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shape Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let edge_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shape Edge Buffer"),
            contents: bytemuck::cast_slice(&edges),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            kind,
            vertex_buffer,
            index_buffer,
            num_indices: mesh.indices.len() as u32,
            edge_buffer,
            num_edge_indices: edges.len() as u32,
        }
    }
}

/// GPU renderer for the active shape.
///
/// Manages all graphics resources including buffers, textures and pipelines.
/// Buffers for every shape are built once; a frame draws only the active one.
#[derive(Debug)]
pub(crate) struct Renderer {
    /// Viewport rectangle in physical pixels
    viewport: Rectangle<f32>,
    /// Filled triangle pipeline
    fill_pipeline: wgpu::RenderPipeline,
    /// Line pipeline used in wireframe mode
    wireframe_pipeline: wgpu::RenderPipeline,
    /// Paints the viewport background
    background_pipeline: wgpu::RenderPipeline,
    meshes: Vec<GpuMesh>,
    uniforms: Uniforms,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    /// Shape drawn by the next `render`
    active: ShapeKind,
    wireframe: bool,
}

impl Renderer {
    /// Creates a new renderer with initialized GPU resources.
    ///
    /// # Arguments
    /// * `format` - Color format of the target iced renders into
    /// * `viewport` - Widget bounds in physical pixels
    /// * `target_size` - Size of the whole render target in physical pixels
    pub(crate) async fn new(
        device: &Device,
        format: TextureFormat,
        viewport: Rectangle<f32>,
        target_size: Size<u32>,
        config: &ViewerConfig,
    ) -> Self {
        let uniforms = Uniforms::new(config);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("Uniform Bind Group Layout"),
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("Uniform Bind Group"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let shape_pipeline = |label: &str, topology: wgpu::PrimitiveTopology| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs_main",
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                    }],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs_main",
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Shapes are double-sided
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
            })
        };

        let fill_pipeline = shape_pipeline("Fill Pipeline", wgpu::PrimitiveTopology::TriangleList);
        let wireframe_pipeline =
            shape_pipeline("Wireframe Pipeline", wgpu::PrimitiveTopology::LineList);

        let background_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Background Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_background",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_background",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let meshes = ShapeKind::ALL
            .iter()
            .map(|&kind| GpuMesh::new(device, kind))
            .collect();

        let (depth_texture, depth_view) = create_depth_texture(device, target_size);

        log::info!("renderer ready: {} shapes uploaded", ShapeKind::ALL.len());

        Self {
            viewport,
            fill_pipeline,
            wireframe_pipeline,
            background_pipeline,
            meshes,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
            depth_texture,
            depth_view,
            active: ShapeKind::ALL[0],
            wireframe: false,
        }
    }

    /// Tracks viewport moves and recreates the depth buffer when the target size changes.
    pub(crate) fn resize(&mut self, device: &Device, viewport: Rectangle<f32>, target_size: Size<u32>) {
        if viewport.width > 0.0 && viewport.height > 0.0 {
            self.viewport = viewport;
        }

        if target_size.width > 0
            && target_size.height > 0
            && (self.depth_texture.size().width != target_size.width
                || self.depth_texture.size().height != target_size.height)
        {
            let (depth_texture, depth_view) = create_depth_texture(device, target_size);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;
        }
    }

    /// Upload the camera and the active shape's transform.
    pub(crate) fn update_shape(
        &mut self,
        queue: &wgpu::Queue,
        camera: &Camera,
        projection: &Projection,
        active: ShapeKind,
        model: &Matrix4<f32>,
        normal_matrix: &Matrix4<f32>,
        wireframe: bool,
    ) {
        self.active = active;
        self.wireframe = wireframe;
        self.uniforms.update(camera, projection, model, normal_matrix);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[self.uniforms]));
    }

    /// Renders a single frame: background first, then the active shape.
    pub(crate) fn render(&self, encoder: &mut CommandEncoder, target: &TextureView) {
        {
            let mut background_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Background Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // Keep the rest of the iced UI
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.set_viewport(&mut background_pass);
            background_pass.set_pipeline(&self.background_pipeline);
            background_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            background_pass.draw(0..3, 0..1);
        }

        let Some(mesh) = self.meshes.iter().find(|mesh| mesh.kind == self.active) else {
            return;
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
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

        self.set_viewport(&mut render_pass);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        if self.wireframe {
            render_pass.set_pipeline(&self.wireframe_pipeline);
            render_pass.set_index_buffer(mesh.edge_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.num_edge_indices, 0, 0..1);
        } else {
            render_pass.set_pipeline(&self.fill_pipeline);
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
        }
    }

    fn set_viewport(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_viewport(
            self.viewport.x,
            self.viewport.y,
            self.viewport.width,
            self.viewport.height,
            0.0,
            1.0,
        );
    }
}

fn create_depth_texture(device: &Device, size: Size<u32>) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });

    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector4};

    #[test]
    fn uniforms_match_the_shader_layout() {
        // 3 mat4x4 + 4 vec4
        assert_eq!(std::mem::size_of::<Uniforms>(), 3 * 64 + 4 * 16);
    }

    #[test]
    fn depth_of_visible_points_lands_in_wgpu_range() {
        let config = ViewerConfig::default();
        let camera = Camera::looking_at_origin(config.camera_distance);
        let projection = Projection::new(&config, 800.0, 600.0);
        let clip_space = opengl_to_wgpu() * view_projection(&camera, &projection);

        for z in [1.5, 0.0, -1.5] {
            let clip = clip_space * Vector4::new(0.0, 0.0, z, 1.0);
            let depth = clip.z / clip.w;
            assert!((0.0..=1.0).contains(&depth), "depth {depth} at z = {z}");
        }

        let near = clip_space.transform_point(&Point3::new(0.0, 0.0, camera.eye.z - config.znear));
        assert!(near.z.abs() < 1e-4);
    }
}
