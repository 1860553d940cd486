//! GPU side of the progressive tracer
//!
//! The tracing shader is loaded from a WGSL file at startup. It supplies a
//! fragment entry point `fs_main` taking `@location(0) uv: vec2<f32>`; the
//! vertex stage is the crate's fullscreen triangle. Bind group 0:
//!
//! | binding | resource                                   |
//! |---------|--------------------------------------------|
//! | 0       | `TracingParams` uniform                    |
//! | 1       | `SkyUniform` uniform                       |
//! | 2       | `array<Sphere>` read-only storage          |
//! | 3       | `array<Triangle>` read-only storage        |
//! | 4       | `array<Mesh>` read-only storage            |
//! | 5       | previous frame, `texture_2d<f32>`          |
//! | 6       | sampler for the previous frame             |
//!
//! Valid element counts are in `TracingParams::num_*`; the storage buffers are
//! always allocated at full capacity.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use wgpu::{BindGroup, BindGroupLayout, Buffer, RenderPipeline, Sampler, Surface, SurfaceConfiguration};
use winit::window::Window;

use super::accumulation::Accumulator;
use super::display::{create_target_sampler, DisplayPipeline, TARGET_FORMAT};
use super::gpu_context::GpuContext;
use super::overlay::{DebugOverlay, OverlayFrame};
use super::render_flags::RenderFlags;
use crate::camera::Camera;
use crate::scene::Scene;
use crate::types::{
    MeshData, SkyUniform, SphereData, TracingParams, TriangleData, MAX_MESHES, MAX_SPHERES,
    MAX_TRIANGLES,
};

/// Where the tracing shader is looked up when none is given; nothing ships here
pub const DEFAULT_SHADER_PATH: &str = "resources/shaders/raytracer.wgsl";

/// One of the two ping-pong accumulation targets
struct RenderTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Scene buffers consumed by the tracing shader
struct SceneBuffers {
    params: Buffer,
    sky: Buffer,
    spheres: Buffer,
    triangles: Buffer,
    meshes: Buffer,
}

impl SceneBuffers {
    fn new(device: &wgpu::Device) -> Self {
        let uniform = |label: &str, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let storage = |label: &str, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as u64,
                usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };

        Self {
            params: uniform("Tracing Params Buffer", std::mem::size_of::<TracingParams>()),
            sky: uniform("Sky Buffer", std::mem::size_of::<SkyUniform>()),
            spheres: storage("Sphere Buffer", MAX_SPHERES * std::mem::size_of::<SphereData>()),
            triangles: storage(
                "Triangle Buffer",
                MAX_TRIANGLES * std::mem::size_of::<TriangleData>(),
            ),
            meshes: storage("Mesh Buffer", MAX_MESHES * std::mem::size_of::<MeshData>()),
        }
    }
}

/// Owns the surface, shaders and buffers; drives one frame per `render` call
///
/// Everything is released together when the engine is dropped.
pub struct TracingEngine {
    gpu: GpuContext,
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    display: DisplayPipeline,
    tracing_pipeline: RenderPipeline,
    tracing_layout: BindGroupLayout,
    sampler: Sampler,
    buffers: SceneBuffers,
    targets: [RenderTarget; 2],
    tracing_bind_groups: [BindGroup; 2],
    display_bind_groups: [BindGroup; 2],
    accumulator: Accumulator,
    params: TracingParams,
}

impl TracingEngine {
    /// Creates the surface, both accumulation targets and the tracing pipeline
    pub async fn new(window: Arc<Window>, shader_path: &Path) -> Result<Self> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create window surface")?;
        let gpu = GpuContext::new_with_surface(&instance, &surface).await?;

        let surface_config = Self::create_surface_config(&surface, &gpu, width, height)?;
        surface.configure(gpu.device(), &surface_config);

        let device = gpu.device();
        let display = DisplayPipeline::new(device, surface_config.format);
        let tracing_layout = Self::create_tracing_layout(device);
        let tracing_pipeline =
            Self::create_tracing_pipeline(device, &display, &tracing_layout, shader_path).await?;

        let sampler = create_target_sampler(device);
        let buffers = SceneBuffers::new(device);
        let targets = Self::create_targets(device, width, height);
        let tracing_bind_groups =
            Self::create_tracing_bind_groups(device, &tracing_layout, &buffers, &targets, &sampler);
        let display_bind_groups = [
            display.create_bind_group(device, &targets[0].view),
            display.create_bind_group(device, &targets[1].view),
        ];

        let params = TracingParams::new(width, height);
        gpu.queue()
            .write_buffer(&buffers.params, 0, bytemuck::cast_slice(&[params]));

        log::info!(
            "Tracing engine initialized: {}x{}, surface {:?}, shader {}",
            width,
            height,
            surface_config.format,
            shader_path.display()
        );

        Ok(Self {
            gpu,
            surface,
            surface_config,
            display,
            tracing_pipeline,
            tracing_layout,
            sampler,
            buffers,
            targets,
            tracing_bind_groups,
            display_bind_groups,
            accumulator: Accumulator::new(),
            params,
        })
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn num_rendered_frames(&self) -> u32 {
        self.accumulator.num_rendered_frames()
    }

    /// Discards accumulated history, e.g. after the camera moved
    pub fn reset_accumulation(&mut self) {
        self.accumulator.reset();
    }

    /// Uploads triangles and mesh records; called once per scene
    pub fn upload_static_data(&mut self, scene: &Scene) {
        let queue = self.gpu.queue();
        write_slice(queue, &self.buffers.triangles, scene.triangles());
        write_slice(queue, &self.buffers.meshes, scene.meshes());

        let stats = scene.stats();
        self.params.num_triangles = stats.triangles as u32;
        self.params.num_meshes = stats.meshes as u32;
        self.accumulator.reset();

        log::info!(
            "Uploaded static geometry: {} meshes, {} triangles",
            stats.meshes,
            stats.triangles
        );
    }

    /// Per-frame upload of spheres and sky; camera and flags are staged for `render`
    pub fn upload_data(&mut self, camera: &Camera, scene: &Scene, flags: RenderFlags) {
        self.params.update(camera, scene, flags);

        let queue = self.gpu.queue();
        write_slice(queue, &self.buffers.spheres, scene.spheres());
        queue.write_buffer(&self.buffers.sky, 0, bytemuck::cast_slice(&[scene.sky.to_uniform()]));
    }

    /// Traces into the current target, presents it, then swaps targets
    ///
    /// The accumulation counter only advances once a surface texture has been
    /// acquired, so a lost or outdated surface leaves it untouched.
    pub fn render(
        &mut self,
        overlay: Option<(&mut DebugOverlay, &Window, &OverlayFrame)>,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;

        self.params.advance_frame(&mut self.accumulator);
        self.gpu
            .queue()
            .write_buffer(&self.buffers.params, 0, bytemuck::cast_slice(&[self.params]));
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let current = self.accumulator.current();
        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Tracing Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets[current].view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.tracing_pipeline);
            render_pass.set_bind_group(0, &self.tracing_bind_groups[current], &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.display
            .draw(&mut encoder, &surface_view, &self.display_bind_groups[current]);

        let extra_commands = match overlay {
            Some((overlay, window, frame)) => overlay.paint(
                &self.gpu,
                &mut encoder,
                &surface_view,
                window,
                self.resolution(),
                frame,
            ),
            None => Vec::new(),
        };

        self.gpu
            .queue()
            .submit(extra_commands.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        self.accumulator.swap();
        Ok(())
    }

    /// Recreates the surface and both targets at the new size
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.surface_config.width = width;
        self.surface_config.height = height;
        self.reconfigure();

        let device = self.gpu.device();
        self.targets = Self::create_targets(device, width, height);
        self.tracing_bind_groups = Self::create_tracing_bind_groups(
            device,
            &self.tracing_layout,
            &self.buffers,
            &self.targets,
            &self.sampler,
        );
        self.display_bind_groups = [
            self.display.create_bind_group(device, &self.targets[0].view),
            self.display.create_bind_group(device, &self.targets[1].view),
        ];

        let fresh = TracingParams::new(width, height);
        self.params.resolution = fresh.resolution;
        self.params.screen_center = fresh.screen_center;
        self.accumulator.reset();

        log::info!("Resized render targets to {}x{}", width, height);
    }

    /// Reapplies the current surface configuration after `Lost` / `Outdated`
    pub fn reconfigure(&self) {
        self.surface.configure(self.gpu.device(), &self.surface_config);
    }

    fn create_surface_config(
        surface: &Surface,
        gpu: &GpuContext,
        width: u32,
        height: u32,
    ) -> Result<SurfaceConfiguration> {
        let surface_caps = surface.get_capabilities(gpu.adapter());
        let Some(&fallback) = surface_caps.formats.first() else {
            bail!("Surface reports no supported formats");
        };
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(fallback);

        Ok(SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    fn create_targets(device: &wgpu::Device, width: u32, height: u32) -> [RenderTarget; 2] {
        [
            RenderTarget::new(device, width, height, "Accumulation Target A"),
            RenderTarget::new(device, width, height, "Accumulation Target B"),
        ]
    }

    fn create_tracing_layout(device: &wgpu::Device) -> BindGroupLayout {
        let buffer_entry = |binding: u32, ty: wgpu::BufferBindingType| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let read_only = wgpu::BufferBindingType::Storage { read_only: true };

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tracing_bind_group_layout"),
            entries: &[
                buffer_entry(0, wgpu::BufferBindingType::Uniform),
                buffer_entry(1, wgpu::BufferBindingType::Uniform),
                buffer_entry(2, read_only),
                buffer_entry(3, read_only),
                buffer_entry(4, read_only),
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 6,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    /// Group `i` writes target `i` and samples target `1 - i`
    fn create_tracing_bind_groups(
        device: &wgpu::Device,
        layout: &BindGroupLayout,
        buffers: &SceneBuffers,
        targets: &[RenderTarget; 2],
        sampler: &Sampler,
    ) -> [BindGroup; 2] {
        let create = |previous: &RenderTarget, label: &str| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffers.params.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffers.sky.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffers.spheres.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: buffers.triangles.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 4,
                        resource: buffers.meshes.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 5,
                        resource: wgpu::BindingResource::TextureView(&previous.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 6,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        };

        [
            create(&targets[1], "tracing_bind_group_a"),
            create(&targets[0], "tracing_bind_group_b"),
        ]
    }

    async fn create_tracing_pipeline(
        device: &wgpu::Device,
        display: &DisplayPipeline,
        layout: &BindGroupLayout,
        shader_path: &Path,
    ) -> Result<RenderPipeline> {
        let source = load_shader_source(shader_path)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Raytracing Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Tracing Pipeline Layout"),
            bind_group_layouts: &[layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Tracing Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: display.vertex_module(),
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: TARGET_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(error) = device.pop_error_scope().await {
            bail!(
                "Raytracing shader {} is incompatible with the tracing pipeline: {}",
                shader_path.display(),
                error
            );
        }

        Ok(pipeline)
    }
}

/// Reads the WGSL source of the tracing shader
pub fn load_shader_source(path: &Path) -> Result<String> {
    let source = std::fs::read_to_string(path)
        .with_context(|| {
            format!(
                "Failed to read raytracing shader {} (the shader is not bundled; pass one with --shader)",
                path.display()
            )
        })?;
    if !source.contains("fs_main") {
        bail!(
            "Raytracing shader {} has no `fs_main` fragment entry point",
            path.display()
        );
    }
    Ok(source)
}

fn write_slice<T: bytemuck::Pod>(queue: &wgpu::Queue, buffer: &Buffer, data: &[T]) {
    if !data.is_empty() {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
    }
}
