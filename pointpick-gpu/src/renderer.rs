//! Window renderer for point clouds and solid helper geometry
//!
//! Points are drawn as instanced quads, four strip vertices per point, fed
//! from three per-instance buffers (position, color, size) so the color
//! buffer can be rewritten on its own after a selection change. Solid
//! meshes and line segments share a simpler unlit pipeline and are drawn
//! before the points.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use nalgebra::Matrix4;
use pointpick_core::{Error, PerspectiveCamera, PointDataset, Result, Transform3D};
use winit::window::Window;

use crate::device::GpuContext;
use crate::solid::{SolidMesh, SolidTopology, SolidVertex};
use crate::strategy::PointRenderingStrategy;

/// Maps OpenGL clip depth `[-1, 1]` to the `[0, 1]` range wgpu expects
#[rustfmt::skip]
pub const OPENGL_TO_WGPU: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Camera uniform data
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        let view_proj = OPENGL_TO_WGPU * camera.view_projection();
        Self {
            view_proj: view_proj.into(),
            position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
        }
    }
}

/// Per-frame parameters of the point shaders
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct PointStyleUniform {
    /// Viewport width and height in pixels, device pixel ratio, unused
    pub viewport: [f32; 4],
    /// Strategy-specific parameters
    pub params: [f32; 4],
}

/// Renderer settings
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub background_color: [f64; 4],
    /// Physical pixels per logical pixel, applied to point sizes
    pub pixel_ratio: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background_color: [0.0, 0.0, 0.0, 1.0],
            pixel_ratio: 1.0,
        }
    }
}

struct GpuPointCloud {
    positions: wgpu::Buffer,
    colors: wgpu::Buffer,
    sizes: wgpu::Buffer,
    count: u32,
}

struct GpuSolidPart {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
    topology: SolidTopology,
}

/// Renders uploaded objects into a window surface
pub struct PointCloudRenderer {
    pub gpu_context: GpuContext,
    surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    camera_buffer: wgpu::Buffer,
    style_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    point_pipeline: wgpu::RenderPipeline,
    triangle_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    strategy: Box<dyn PointRenderingStrategy>,
    clouds: HashMap<u64, GpuPointCloud>,
    solids: HashMap<u64, Vec<GpuSolidPart>>,
    pub config: RenderConfig,
}

impl PointCloudRenderer {
    /// Create a renderer presenting to `window`
    pub async fn new(
        window: Arc<Window>,
        strategy: Box<dyn PointRenderingStrategy>,
        config: RenderConfig,
    ) -> Result<Self> {
        let size = window.inner_size();
        let instance = GpuContext::create_instance();
        let surface = instance
            .create_surface(window)
            .map_err(|e| Error::Gpu(format!("Failed to create surface: {}", e)))?;
        let gpu_context = GpuContext::for_surface(instance, &surface).await?;

        let surface_caps = surface.get_capabilities(&gpu_context.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface reports no supported formats".to_string()))?;

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

        let depth_view = create_depth_view(&gpu_context.device, &surface_config);

        let camera_buffer = gpu_context.create_buffer_init(
            "Camera Buffer",
            &[CameraUniform {
                view_proj: Matrix4::identity().into(),
                position: [0.0; 4],
            }],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let style_buffer = gpu_context.create_buffer_init(
            "Point Style Buffer",
            &[PointStyleUniform {
                viewport: [surface_config.width as f32, surface_config.height as f32, config.pixel_ratio, 0.0],
                params: strategy.shader_params(),
            }],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let uniform_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout =
            gpu_context.create_bind_group_layout("frame_bind_group_layout", &[uniform_entry(0), uniform_entry(1)]);
        let bind_group = gpu_context.create_bind_group(
            "frame_bind_group",
            &bind_group_layout,
            &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: style_buffer.as_entire_binding(),
                },
            ],
        );

        let layout = gpu_context.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pointpick pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let point_pipeline = create_point_pipeline(&gpu_context, &layout, surface_format, strategy.as_ref());
        let solid_shader = gpu_context.create_shader_module("Solid Shader", include_str!("shaders/solid.wgsl"));
        let triangle_pipeline = create_solid_pipeline(
            &gpu_context,
            &layout,
            &solid_shader,
            surface_format,
            wgpu::PrimitiveTopology::TriangleList,
        );
        let line_pipeline = create_solid_pipeline(
            &gpu_context,
            &layout,
            &solid_shader,
            surface_format,
            wgpu::PrimitiveTopology::LineList,
        );

        log::info!(
            "Renderer ready: {}x{} {:?}, {} points",
            surface_config.width,
            surface_config.height,
            surface_format,
            strategy.kind()
        );

        Ok(Self {
            gpu_context,
            surface,
            surface_config,
            depth_view,
            camera_buffer,
            style_buffer,
            bind_group,
            point_pipeline,
            triangle_pipeline,
            line_pipeline,
            strategy,
            clouds: HashMap::new(),
            solids: HashMap::new(),
            config,
        })
    }

    pub fn strategy(&self) -> &dyn PointRenderingStrategy {
        self.strategy.as_ref()
    }

    /// Upload every attribute buffer of `dataset` under `id`, replacing any
    /// previous upload. Positions are baked through `transform`.
    pub fn upload_points(&mut self, id: u64, dataset: &PointDataset, transform: &Transform3D) {
        if dataset.is_empty() {
            self.clouds.remove(&id);
            return;
        }

        let positions: Cow<'_, [f32]> = if *transform == Transform3D::identity() {
            Cow::Borrowed(dataset.positions())
        } else {
            Cow::Owned(
                dataset
                    .points()
                    .flat_map(|p| {
                        let p = transform.transform_point(&p);
                        [p.x, p.y, p.z]
                    })
                    .collect(),
            )
        };

        let usage = wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST;
        let cloud = GpuPointCloud {
            positions: self.gpu_context.create_buffer_init("Point Positions", &positions, usage),
            colors: self.gpu_context.create_buffer_init("Point Colors", dataset.color_buffer(), usage),
            sizes: self.gpu_context.create_buffer_init("Point Sizes", dataset.size_buffer(), usage),
            count: dataset.len() as u32,
        };
        self.clouds.insert(id, cloud);
    }

    /// Rewrite the color buffer of an uploaded cloud
    pub fn update_colors(&mut self, id: u64, colors: &[f32]) -> Result<()> {
        // Empty clouds are never resident
        if colors.is_empty() {
            return Ok(());
        }
        let cloud = self
            .clouds
            .get(&id)
            .ok_or_else(|| Error::Gpu(format!("No point cloud uploaded under id {}", id)))?;
        if colors.len() != cloud.count as usize * 3 {
            return Err(Error::Gpu(format!(
                "Color buffer holds {} values, expected {}",
                colors.len(),
                cloud.count * 3
            )));
        }

        self.gpu_context
            .queue
            .write_buffer(&cloud.colors, 0, bytemuck::cast_slice(colors));
        Ok(())
    }

    /// Upload solid geometry under `id`, replacing any previous upload
    pub fn upload_solid(&mut self, id: u64, parts: &[SolidMesh]) {
        let parts = parts
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| GpuSolidPart {
                vertices: self
                    .gpu_context
                    .create_buffer_init("Solid Vertices", &part.vertices, wgpu::BufferUsages::VERTEX),
                indices: self
                    .gpu_context
                    .create_buffer_init("Solid Indices", &part.indices, wgpu::BufferUsages::INDEX),
                index_count: part.indices.len() as u32,
                topology: part.topology,
            })
            .collect();
        self.solids.insert(id, parts);
    }

    /// Drop the GPU buffers of object `id`
    pub fn release(&mut self, id: u64) -> bool {
        let released = self.clouds.remove(&id).is_some() | self.solids.remove(&id).is_some();
        if released {
            log::debug!("Released GPU buffers of object {}", id);
        }
        released
    }

    /// Number of objects with buffers on the GPU
    pub fn resident_objects(&self) -> usize {
        self.clouds.len() + self.solids.len()
    }

    /// Resize renderer surface
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface.configure(&self.gpu_context.device, &self.surface_config);
            self.depth_view = create_depth_view(&self.gpu_context.device, &self.surface_config);
        }
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        if pixel_ratio > 0.0 {
            self.config.pixel_ratio = pixel_ratio;
        }
    }

    /// Draw one frame seen through `camera`
    pub fn render(&mut self, camera: &PerspectiveCamera) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.gpu_context.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out waiting for the surface, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(Error::Gpu(format!("Failed to get surface texture: {}", e))),
        };

        self.write_uniforms(camera);

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu_context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pointpick frame encoder"),
            });

        {
            let [r, g, b, a] = self.config.background_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("pointpick frame pass"),
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

            render_pass.set_bind_group(0, &self.bind_group, &[]);

            for part in self.solids.values().flatten() {
                let pipeline = match part.topology {
                    SolidTopology::Triangles => &self.triangle_pipeline,
                    SolidTopology::Lines => &self.line_pipeline,
                };
                render_pass.set_pipeline(pipeline);
                render_pass.set_vertex_buffer(0, part.vertices.slice(..));
                render_pass.set_index_buffer(part.indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..part.index_count, 0, 0..1);
            }

            render_pass.set_pipeline(&self.point_pipeline);
            for cloud in self.clouds.values() {
                render_pass.set_vertex_buffer(0, cloud.positions.slice(..));
                render_pass.set_vertex_buffer(1, cloud.colors.slice(..));
                render_pass.set_vertex_buffer(2, cloud.sizes.slice(..));
                render_pass.draw(0..4, 0..cloud.count);
            }
        }

        self.gpu_context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn write_uniforms(&self, camera: &PerspectiveCamera) {
        let queue = &self.gpu_context.queue;
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&CameraUniform::from_camera(camera)));

        let style = PointStyleUniform {
            viewport: [
                self.surface_config.width as f32,
                self.surface_config.height as f32,
                self.config.pixel_ratio,
                0.0,
            ],
            params: self.strategy.shader_params(),
        };
        queue.write_buffer(&self.style_buffer, 0, bytemuck::bytes_of(&style));
    }
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
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

fn instance_layout(location: u32, format: wgpu::VertexFormat) -> [wgpu::VertexAttribute; 1] {
    [wgpu::VertexAttribute {
        offset: 0,
        shader_location: location,
        format,
    }]
}

fn create_point_pipeline(
    gpu_context: &GpuContext,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    strategy: &dyn PointRenderingStrategy,
) -> wgpu::RenderPipeline {
    let shader = gpu_context.create_shader_module("Point Shader", strategy.shader_source());

    let position = instance_layout(0, wgpu::VertexFormat::Float32x3);
    let color = instance_layout(1, wgpu::VertexFormat::Float32x3);
    let size = instance_layout(2, wgpu::VertexFormat::Float32);
    let buffers = [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &position,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &color,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<f32>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &size,
        },
    ];

    gpu_context.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Point Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(strategy.blend_state()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: strategy.depth_write_enabled(),
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    })
}

fn create_solid_pipeline(
    gpu_context: &GpuContext,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    gpu_context.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Solid Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[SolidVertex::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;
    use pointpick_core::Point3f;

    #[test]
    fn test_depth_correction() {
        let near = OPENGL_TO_WGPU * Vector4::new(0.0, 0.0, -1.0, 1.0);
        let far = OPENGL_TO_WGPU * Vector4::new(0.0, 0.0, 1.0, 1.0);
        assert_relative_eq!(near.z, 0.0);
        assert_relative_eq!(far.z, 1.0);
    }

    #[test]
    fn test_camera_uniform_depth_range() {
        let mut camera = PerspectiveCamera::default();
        camera.position = Point3f::new(0.0, 0.0, 10.0);
        let uniform = CameraUniform::from_camera(&camera);
        let m = Matrix4::from(uniform.view_proj);

        // A point in front of the camera lands inside wgpu's depth range
        let clip = m * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
        assert_relative_eq!(clip.w, 10.0, epsilon = 1e-4);
        assert_eq!(uniform.position, [0.0, 0.0, 10.0, 1.0]);
    }

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<PointStyleUniform>(), 32);
    }
}
