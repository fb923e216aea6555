//! WebGPU render pipeline
//!
//! The whole scene is drawn by one fullscreen-triangle pass whose fragment
//! shader evaluates signed distance fields: the target shape, the optional
//! hint circle, the traced ring and the verdict flash.

use bytemuck::{Pod, Zeroable};

use crate::consts::REVEAL_SECS;
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, ShapeKind};

/// Uniform block consumed by `sdf_shader.wgsl`; layouts must agree.
/// vec2f members sit at 8-byte offsets, total size 64.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],
    time: f32,
    shape_kind: u32, // 0 disc, 1 rect, 2 line
    shape_half: [f32; 2],
    shape_rot: f32, // radians
    bounding_radius: f32,
    ring_center: [f32; 2],
    ring_radius: f32,
    ring_active: u32,
    outcome: u32, // 0 none, 1 covered, 2 missed
    flash: f32,
    show_hint: u32,
    _pad: u32,
}

impl Globals {
    /// Snapshot the game state for one frame
    fn for_frame(state: &GameState, settings: &Settings, size: (u32, u32), elapsed: f32) -> Self {
        let (half_w, half_h) = state.shape.half_extents();

        let (ring_center, ring_radius, ring_active) = match state.ring {
            Some(ring) => ([ring.center.x, ring.center.y], ring.diameter / 2.0, 1),
            None => ([0.0, 0.0], 0.0, 0),
        };

        // The verdict tint decays with the reveal timer
        let (outcome, flash) = match (state.phase, state.last_outcome) {
            (GamePhase::Reveal, Some(result)) => {
                let intensity = if settings.effective_flash() {
                    (state.reveal_timer / REVEAL_SECS).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                (if result.covered { 1 } else { 2 }, intensity)
            }
            _ => (0, 0.0),
        };

        Self {
            resolution: [size.0 as f32, size.1 as f32],
            time: elapsed,
            shape_kind: match state.shape.kind {
                ShapeKind::Disc => 0,
                ShapeKind::Rect => 1,
                ShapeKind::Line => 2,
            },
            shape_half: [half_w, half_h],
            shape_rot: state.shape.rotation_deg.to_radians(),
            bounding_radius: state.shape.bounding_span() / 2.0,
            ring_center,
            ring_radius,
            ring_active,
            outcome,
            flash,
            show_hint: settings.show_hint as u32,
            _pad: 0,
        }
    }
}

pub struct SdfRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
}

impl SdfRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("encircle-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        log::info!("Surface: {}x{} {:?}", width, height, surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sdf_shader.wgsl").into()),
        });

        // Written fresh every frame, so no initial contents needed
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // fullscreen triangle, no vertex data
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
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
            multiview_mask: None,
            cache: None,
        });

        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            bind_group,
            size: (width, height),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.size = (width, height);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload this frame's uniforms and draw the scene
    ///
    /// `time` is milliseconds since page load, as handed out by
    /// requestAnimationFrame.
    pub fn render(
        &mut self,
        state: &GameState,
        settings: &Settings,
        time: f64,
    ) -> Result<(), wgpu::SurfaceError> {
        let globals = Globals::for_frame(state, settings, self.size, (time / 1000.0) as f32);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
