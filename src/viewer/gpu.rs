//! wgpu backend: one instanced draw per group plus the emblem.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::camera::Camera;
use super::mesh::{Mesh, Vertex};
use crate::animate::{InstanceBatch, InstanceRaw};
use crate::error::ViewerError;
use crate::group::{GroupKind, Material};
use crate::morph::MorphState;
use crate::palette::{gold, Rgb};
use crate::scene::{RenderSink, Scene};
use crate::time::FrameTime;
use crate::{Mat4, Vec3};

/// Instanced mesh shader.
pub const SHADER_SOURCE: &str = include_str!("shader.wgsl");

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// `#010a08` in linear space.
const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 0.0003,
    g: 0.003,
    b: 0.0024,
    a: 1.0,
};

const AMBIENT: f32 = 0.35;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    light: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct DrawParams {
    emissive: [f32; 4],
    options: [f32; 4],
}

impl DrawParams {
    fn from_material(material: &Material) -> Self {
        Self {
            emissive: material.emissive.extend(material.emissive_intensity).to_array(),
            options: [0.0; 4],
        }
    }

    /// Glow in each instance's own color.
    fn instance_glow(intensity: f32) -> Self {
        Self {
            emissive: [1.0, 1.0, 1.0, intensity],
            options: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Instances to draw for a batch of `len` written into a buffer of `capacity` slots.
fn drawable_count(len: usize, capacity: usize) -> Option<u32> {
    if len != capacity {
        return None;
    }
    u32::try_from(len).ok()
}

/// GPU resources for one instanced draw.
struct DrawBatch {
    kind: Option<GroupKind>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    instance_count: u32,
    params: DrawParams,
    params_buffer: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
}

impl DrawBatch {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        kind: Option<GroupKind>,
        mesh: &Mesh,
        capacity: usize,
        params: DrawParams,
    ) -> Self {
        let name = kind.map(GroupKind::name).unwrap_or("emblem");

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", name)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        // Sized once; every frame overwrites the whole range.
        let instance_size = std::mem::size_of::<InstanceRaw>() as u64;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} Instance Buffer", name)),
            size: instance_size * capacity.max(1) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Params Buffer", name)),
            contents: bytemuck::cast_slice(&[params]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let params_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Params Bind Group", name)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
        });

        Self {
            kind,
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            instance_buffer,
            capacity,
            instance_count: 0,
            params,
            params_buffer,
            params_bind_group,
        }
    }

    fn set_params(&mut self, queue: &wgpu::Queue, params: DrawParams) {
        if self.params != params {
            self.params = params;
            queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));
        }
    }

    fn glows_in_instance_color(&self) -> bool {
        self.kind == Some(GroupKind::Lights)
    }
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::TextureView,
    groups: Vec<DrawBatch>,
    emblem: DrawBatch,
    emblem_color: Vec3,
    minimized: bool,
    pub camera: Camera,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, scene: &Scene) -> Result<Self, ViewerError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ViewerError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let camera = Camera::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform(&camera, &config)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[uniform_entry(wgpu::ShaderStages::VERTEX_FRAGMENT)],
            });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let params_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Draw Params Bind Group Layout"),
                entries: &[uniform_entry(wgpu::ShaderStages::FRAGMENT)],
            });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Instanced Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &params_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4
                        ],
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
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
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let groups = scene
            .groups()
            .iter()
            .map(|group| {
                let params = if group.kind() == GroupKind::Lights {
                    DrawParams::instance_glow(scene.twinkle().base)
                } else {
                    DrawParams::from_material(group.material())
                };
                DrawBatch::new(
                    &device,
                    &params_bind_group_layout,
                    Some(group.kind()),
                    &Mesh::for_group(group.kind()),
                    group.count(),
                    params,
                )
            })
            .collect();

        let star = scene.emblem();
        let star_glow = Material {
            base_color: gold().vec3(),
            emissive: Rgb::from_u8(0xff, 0xaa, 0x00).vec3(),
            emissive_intensity: star.glow.base,
        };
        let emblem = DrawBatch::new(
            &device,
            &params_bind_group_layout,
            None,
            &Mesh::star_prism(&star.outline(), star.depth),
            1,
            DrawParams::from_material(&star_glow),
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            camera_buffer,
            camera_bind_group,
            depth_texture,
            groups,
            emblem,
            emblem_color: star_glow.base_color,
            minimized: false,
            camera,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.minimized = new_size.width == 0 || new_size.height == 0;
        if !self.minimized {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Reconfigure the surface at its current size.
    pub fn reconfigure(&mut self) {
        let size = winit::dpi::PhysicalSize::new(self.config.width, self.config.height);
        self.resize(size);
    }

    /// Advance `scene` by one frame and draw it.
    ///
    /// Returns `Ok(false)` when the window is minimized; the scene is then
    /// left untouched. Surface errors also leave the scene untouched.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        state: MorphState,
        time: FrameTime,
    ) -> Result<bool, wgpu::SurfaceError> {
        if !self.is_ready() {
            return Ok(false);
        }

        let output = self.surface.get_current_texture()?;

        if !scene.render_frame(state, time, self) {
            return Ok(false);
        }

        if state == MorphState::Formed {
            self.camera.auto_rotate(time.delta);
        }
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera_uniform(&self.camera, &self.config)]),
        );

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

            for draw in self.groups.iter().chain(std::iter::once(&self.emblem)) {
                if draw.instance_count == 0 {
                    continue;
                }
                render_pass.set_bind_group(1, &draw.params_bind_group, &[]);
                render_pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
                render_pass.set_vertex_buffer(1, draw.instance_buffer.slice(..));
                render_pass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..draw.index_count, 0, 0..draw.instance_count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(true)
    }
}

impl RenderSink for GpuState {
    fn is_ready(&self) -> bool {
        !self.minimized && !self.groups.is_empty()
    }

    fn submit_group(&mut self, kind: GroupKind, batch: &InstanceBatch, material: &Material) {
        let queue = &self.queue;
        let Some(draw) = self.groups.iter_mut().find(|d| d.kind == Some(kind)) else {
            log::warn!("no GPU buffer for group {}", kind.name());
            return;
        };
        let Some(count) = drawable_count(batch.len(), draw.capacity) else {
            log::warn!(
                "{} batch has {} instances, buffer holds {}; skipping",
                kind.name(),
                batch.len(),
                draw.capacity
            );
            return;
        };

        if !batch.is_empty() {
            queue.write_buffer(&draw.instance_buffer, 0, batch.as_bytes());
        }
        draw.instance_count = count;
        if !draw.glows_in_instance_color() {
            draw.set_params(queue, DrawParams::from_material(material));
        }
    }

    fn submit_emblem(&mut self, transform: Mat4, brightness: f32) {
        let raw = InstanceRaw {
            model: transform.to_cols_array_2d(),
            color: self.emblem_color.extend(1.0).to_array(),
        };
        self.queue
            .write_buffer(&self.emblem.instance_buffer, 0, bytemuck::cast_slice(&[raw]));
        self.emblem.instance_count = 1;

        let mut params = self.emblem.params;
        params.emissive[3] = brightness;
        self.emblem.set_params(&self.queue, params);
    }

    fn submit_twinkle(&mut self, intensity: f32) {
        let queue = &self.queue;
        for draw in self.groups.iter_mut().filter(|d| d.glows_in_instance_color()) {
            draw.set_params(queue, DrawParams::instance_glow(intensity));
        }
    }
}

fn camera_uniform(camera: &Camera, config: &wgpu::SurfaceConfiguration) -> CameraUniform {
    let aspect = config.width as f32 / config.height.max(1) as f32;
    let light_dir = Vec3::new(0.4, 1.0, 0.6).normalize();
    CameraUniform {
        view_proj: camera.view_proj(aspect).to_cols_array_2d(),
        eye: camera.position().extend(1.0).to_array(),
        light: light_dir.extend(AMBIENT).to_array(),
    }
}

fn uniform_entry(visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_aligned() {
        assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<DrawParams>(), 32);
    }

    #[test]
    fn test_material_params() {
        let material = Material {
            base_color: Vec3::ONE,
            emissive: Vec3::new(0.2, 0.1, 0.0),
            emissive_intensity: 0.5,
        };
        let params = DrawParams::from_material(&material);
        assert_eq!(params.emissive, [0.2, 0.1, 0.0, 0.5]);
        assert_eq!(params.options[0], 0.0);
        assert_eq!(DrawParams::instance_glow(12.0).options[0], 1.0);
    }

    #[test]
    fn test_drawable_count() {
        assert_eq!(drawable_count(480, 480), Some(480));
        assert_eq!(drawable_count(0, 0), Some(0));
        assert_eq!(drawable_count(479, 480), None);
        if let Ok(big) = usize::try_from(u64::from(u32::MAX) + 1) {
            assert_eq!(drawable_count(big, big), None);
        }
    }
}
