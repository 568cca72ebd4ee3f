use wgpu::*;
use wgpu::util::DeviceExt;

use crate::error::{ContextError, RenderError};
use crate::ui::{self, PerfStats};
use crate::view::gpu_init::GpuContext;
use crate::view::uniforms::{SceneUniforms, UniformSet};

/// Where frames go. The frame loop only talks to this; the GPU backed
/// implementation is `SceneRenderer`.
pub trait RenderTarget {
    /// Resize the backing store to `width` x `height` render pixels, immediately.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Draw one frame with the given parameters and overlay statistics.
    fn draw(&mut self, uniforms: &UniformSet, stats: &PerfStats) -> Result<(), RenderError>;
}

/// Two clip-space triangles covering the screen.
pub const FULLSCREEN_QUAD: [[f32; 2]; 6] = [
    // First triangle:
    [1.0, 1.0],
    [-1.0, 1.0],
    [-1.0, -1.0],
    // Second triangle:
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
];

/// The scene program with its quad and uniform buffer.
pub struct ScenePass {
    pipeline: RenderPipeline,
    quad_buffer: Buffer,
    uniform_buffer: Buffer,
    bind_group: BindGroup,
}

impl ScenePass {
    /// Build the pipeline. Shader validation errors are captured and
    /// returned instead of hitting the device's uncaptured error handler.
    pub async fn new(device: &Device, format: TextureFormat) -> Result<Self, ContextError> {
        device.push_error_scope(ErrorFilter::Validation);

        let shader = device.create_shader_module(ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let quad_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("fullscreen_quad"),
            contents: bytemuck::cast_slice(&FULLSCREEN_QUAD),
            usage: BufferUsages::VERTEX,
        });

        let uniform_buffer = device.create_buffer(&BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as BufferAddress,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("scene_bind_group_layout"),
            entries: &[BindGroupLayoutEntry {
                binding: 0,
                visibility: ShaderStages::FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &bind_group_layout,
            entries: &[BindGroupEntry { binding: 0, resource: uniform_buffer.as_entire_binding() }],
        });

        let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("scene_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 2]>() as BufferAddress,
                    step_mode: VertexStepMode::Vertex,
                    attributes: &[VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x2 }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(ColorTargetState { format, blend: Some(BlendState::REPLACE), write_mask: ColorWrites::ALL })],
                compilation_options: Default::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
            multiview: None,
            cache: None,
        });

        if let Some(err) = device.pop_error_scope().await {
            return Err(ContextError::Shader(err.to_string()));
        }

        Ok(Self { pipeline, quad_buffer, uniform_buffer, bind_group })
    }

    pub fn write_uniforms(&self, queue: &Queue, uniforms: &UniformSet) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&SceneUniforms::from(uniforms)));
    }

    pub fn record(&self, rp: &mut RenderPass<'_>) {
        rp.set_pipeline(&self.pipeline);
        rp.set_bind_group(0, &self.bind_group, &[]);
        rp.set_vertex_buffer(0, self.quad_buffer.slice(..));
        rp.draw(0..FULLSCREEN_QUAD.len() as u32, 0..1);
    }
}

///////////////////////////////////////////////////////////////////////////////

/// GPU-backed render target: the scene pass plus the stats overlay.
pub struct SceneRenderer {
    gpu: GpuContext,
    scene: ScenePass,
    egui_ctx: egui::Context,
    egui_renderer: egui_wgpu::Renderer,
    /// Overlay points per render pixel at quality 1.0.
    base_pixels_per_point: f32,
    overlay_clock_ms: f64,
}

impl SceneRenderer {
    pub async fn new(gpu: GpuContext, base_pixels_per_point: f32) -> Result<Self, ContextError> {
        let scene = ScenePass::new(gpu.device.as_ref(), gpu.format).await?;
        let egui_renderer = egui_wgpu::Renderer::new(
            gpu.device.as_ref(),
            gpu.format,
            egui_wgpu::RendererOptions::default(),
        );
        Ok(Self {
            gpu,
            scene,
            egui_ctx: egui::Context::default(),
            egui_renderer,
            base_pixels_per_point,
            overlay_clock_ms: 0.0,
        })
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn set_base_pixels_per_point(&mut self, ppp: f32) {
        self.base_pixels_per_point = ppp;
    }

    /// `None` means the frame is skipped and the loop carries on.
    fn acquire_frame(&self) -> Result<Option<SurfaceTexture>, RenderError> {
        let err = match self.gpu.surface.get_current_texture() {
            Ok(frame) => return Ok(Some(frame)),
            Err(e) => e,
        };
        match recovery_for(&err) {
            SurfaceRecovery::Reconfigure => {
                tracing::warn!(%err, "surface lost, reconfiguring");
                self.gpu.reconfigure();
                match self.gpu.surface.get_current_texture() {
                    Ok(frame) => Ok(Some(frame)),
                    Err(e) if recovery_for(&e) == SurfaceRecovery::SkipFrame => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
            SurfaceRecovery::SkipFrame => {
                tracing::warn!(%err, "no surface texture this frame, skipping");
                Ok(None)
            }
            SurfaceRecovery::Fatal => Err(err.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRecovery {
    Reconfigure,
    SkipFrame,
    Fatal,
}

// A timeout usually means the window is hidden or occluded.
fn recovery_for(err: &SurfaceError) -> SurfaceRecovery {
    match err {
        SurfaceError::Lost | SurfaceError::Outdated => SurfaceRecovery::Reconfigure,
        SurfaceError::Timeout => SurfaceRecovery::SkipFrame,
        _ => SurfaceRecovery::Fatal,
    }
}

impl RenderTarget for SceneRenderer {
    fn set_viewport(&mut self, width: u32, height: u32) {
        tracing::debug!(width, height, "configuring render target");
        self.gpu.resize(width, height);
    }

    fn draw(&mut self, uniforms: &UniformSet, stats: &PerfStats) -> Result<(), RenderError> {
        let Some(frame) = self.acquire_frame()? else {
            return Ok(());
        };
        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let device = self.gpu.device.as_ref();
        let queue = self.gpu.queue.as_ref();
        let (width, height) = self.gpu.size();

        self.scene.write_uniforms(queue, uniforms);

        // Overlay keeps its on-screen size when the backing store shrinks.
        let ppp = (self.base_pixels_per_point * stats.quality as f32).max(0.05);
        self.overlay_clock_ms += stats.frame_ms as f64;
        let full_output = ui::build_overlay(&self.egui_ctx, stats, width, height, ppp, self.overlay_clock_ms);
        let primitives = self.egui_ctx.tessellate(full_output.shapes, ppp);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: ppp,
        };

        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let overlay_commands = self
            .egui_renderer
            .update_buffers(device, queue, &mut encoder, &primitives, &screen_descriptor);

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::BLACK),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.scene.record(&mut rp);
        }

        {
            let overlay_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("overlay_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut overlay_pass.forget_lifetime(), &primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(overlay_commands.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_covers_clip_space_with_two_triangles() {
        assert_eq!(FULLSCREEN_QUAD.len(), 6);
        for corner in [[1.0, 1.0], [-1.0, 1.0], [-1.0, -1.0], [1.0, -1.0]] {
            assert!(FULLSCREEN_QUAD.contains(&corner));
        }
        assert_eq!(bytemuck::cast_slice::<[f32; 2], u8>(&FULLSCREEN_QUAD).len(), 48);
    }

    #[test]
    fn only_exhausted_surfaces_are_fatal() {
        assert_eq!(recovery_for(&SurfaceError::Timeout), SurfaceRecovery::SkipFrame);
        assert_eq!(recovery_for(&SurfaceError::Lost), SurfaceRecovery::Reconfigure);
        assert_eq!(recovery_for(&SurfaceError::Outdated), SurfaceRecovery::Reconfigure);
        assert_eq!(recovery_for(&SurfaceError::OutOfMemory), SurfaceRecovery::Fatal);
    }

    #[test]
    fn shader_declares_entry_points_and_uniforms() {
        let src = include_str!("shaders/scene.wgsl");
        assert!(src.contains("fn vs_main"));
        assert!(src.contains("fn fs_main"));
        for field in ["resolution", "cam_position", "cam_up", "cam_dir", "minimum_distance", "normal_distance", "space_folding"] {
            assert!(src.contains(field), "missing uniform {field}");
        }
    }
}
