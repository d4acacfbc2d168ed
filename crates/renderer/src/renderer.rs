//! Main renderer managing wgpu state and rendering.

use crate::{
    error::RendererError,
    mesh::Mesh,
    pipeline::{
        build_pipeline, create_texture_bind_group, create_texture_bind_group_layout,
        PipelineConfig,
    },
    texture::Texture,
    vertex::DrawInstance,
};
use std::sync::Arc;
use winit::window::Window;

/// Which pipeline a draw goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassKind {
    Textured,
    Flat,
    Points,
    Lines,
}

impl PassKind {
    fn label(self) -> &'static str {
        match self {
            PassKind::Textured => "Textured Pass",
            PassKind::Flat => "Flat Pass",
            PassKind::Points => "Point Pass",
            PassKind::Lines => "Line Pass",
        }
    }
}

/// Startup options for [`Renderer::new`].
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Wait for vblank when presenting.
    pub vsync: bool,
    /// Background color, linear RGBA.
    pub clear_color: [f64; 4],
    /// Capacity of the per-frame instance buffer.
    pub max_instances: u32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            vsync: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            max_instances: 4096,
        }
    }
}

/// Main renderer state.
pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    // Pipelines
    textured_pipeline: wgpu::RenderPipeline,
    flat_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,

    texture_bind_group_layout: wgpu::BindGroupLayout,
    globe_texture_bind_group: wgpu::BindGroup,
    clear_color: wgpu::Color,

    // Depth buffer
    depth_texture: Texture,

    // Instance buffer for batched rendering
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    /// Tracks current write offset into instance_buffer per frame.
    /// Each draw writes to a unique region so `queue.write_buffer` calls
    /// don't overwrite each other (all writes execute before command buffer).
    frame_instance_offset: u32,
}

impl Renderer {
    /// Create a new renderer for the given window.
    pub async fn new(window: Arc<Window>, settings: RendererSettings) -> Result<Self, RendererError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RendererError::NoAdapter)?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = choose_surface_format(&surface_caps.formats)?;

        let present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let texture_bind_group_layout = create_texture_bind_group_layout(&device);

        let textured_pipeline = build_pipeline(
            &device,
            config.format,
            &PipelineConfig::textured_mesh(),
            &texture_bind_group_layout,
        )?;
        let flat_pipeline = build_pipeline(
            &device,
            config.format,
            &PipelineConfig::flat_mesh(),
            &texture_bind_group_layout,
        )?;
        let point_pipeline = build_pipeline(
            &device,
            config.format,
            &PipelineConfig::points(),
            &texture_bind_group_layout,
        )?;
        let line_pipeline = build_pipeline(
            &device,
            config.format,
            &PipelineConfig::lines(),
            &texture_bind_group_layout,
        )?;

        let white = Texture::white_pixel(&device, &queue);
        let globe_texture_bind_group =
            create_texture_bind_group(&device, &texture_bind_group_layout, &white);

        let depth_texture =
            Texture::create_depth_texture(&device, config.width, config.height, "Depth Texture");

        let max_instances = settings.max_instances.max(1);
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (std::mem::size_of::<DrawInstance>() * max_instances as usize) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let [r, g, b, a] = settings.clear_color;

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            textured_pipeline,
            flat_pipeline,
            point_pipeline,
            line_pipeline,
            texture_bind_group_layout,
            globe_texture_bind_group,
            clear_color: wgpu::Color { r, g, b, a },
            depth_texture,
            instance_buffer,
            max_instances,
            frame_instance_offset: 0,
        })
    }

    /// Bind `texture` for every subsequent textured draw.
    pub fn set_globe_texture(&mut self, texture: &Texture) {
        self.globe_texture_bind_group =
            create_texture_bind_group(&self.device, &self.texture_bind_group_layout, texture);
    }

    /// Handle window resize. Zero-sized (minimized) windows are ignored.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = Texture::create_depth_texture(
                &self.device,
                self.config.width,
                self.config.height,
                "Depth Texture",
            );
        }
    }

    /// Begin a new frame, returns the surface texture and a command encoder.
    pub fn begin_frame(
        &mut self,
    ) -> Result<(wgpu::SurfaceTexture, wgpu::CommandEncoder), RendererError> {
        self.frame_instance_offset = 0;
        let output = self.surface.get_current_texture()?;
        let encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        Ok((output, encoder))
    }

    /// Clear color and depth. Run once per frame before any draw.
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    /// Draw `mesh` once per instance, sampling the globe texture.
    pub fn render_textured(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        mesh: &Mesh,
        instances: &[DrawInstance],
    ) {
        self.render_pass(PassKind::Textured, encoder, view, mesh, instances);
    }

    /// Draw `mesh` filled with each instance's color.
    pub fn render_flat(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        mesh: &Mesh,
        instances: &[DrawInstance],
    ) {
        self.render_pass(PassKind::Flat, encoder, view, mesh, instances);
    }

    /// Draw `mesh`'s vertices as points.
    pub fn render_points(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        mesh: &Mesh,
        instances: &[DrawInstance],
    ) {
        self.render_pass(PassKind::Points, encoder, view, mesh, instances);
    }

    /// Draw `mesh`'s vertices as one connected line strip.
    pub fn render_lines(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        mesh: &Mesh,
        instances: &[DrawInstance],
    ) {
        self.render_pass(PassKind::Lines, encoder, view, mesh, instances);
    }

    fn render_pass(
        &mut self,
        kind: PassKind,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        mesh: &Mesh,
        instances: &[DrawInstance],
    ) {
        if instances.is_empty() {
            return;
        }

        // Allocate a unique region in the instance buffer for this draw call
        let offset = self.frame_instance_offset;
        let remaining = self.max_instances.saturating_sub(offset) as usize;
        let instance_count = instances.len().min(remaining);
        if instance_count == 0 {
            log::warn!("Instance buffer full, skipping {} draw", kind.label());
            return;
        }

        let byte_offset = (offset as usize * std::mem::size_of::<DrawInstance>()) as u64;
        self.queue.write_buffer(
            &self.instance_buffer,
            byte_offset,
            bytemuck::cast_slice(&instances[..instance_count]),
        );
        self.frame_instance_offset = offset + instance_count as u32;

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(kind.label()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let pipeline = match kind {
            PassKind::Textured => &self.textured_pipeline,
            PassKind::Flat => &self.flat_pipeline,
            PassKind::Points => &self.point_pipeline,
            PassKind::Lines => &self.line_pipeline,
        };
        render_pass.set_pipeline(pipeline);
        if kind == PassKind::Textured {
            render_pass.set_bind_group(0, &self.globe_texture_bind_group, &[]);
        }
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        mesh.draw(&mut render_pass, offset..(offset + instance_count as u32));
    }

    /// End frame and present.
    pub fn end_frame(&self, output: wgpu::SurfaceTexture, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    /// Get window dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Access the device for mesh creation.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Instances written so far this frame.
    pub fn frame_instance_count(&self) -> u32 {
        self.frame_instance_offset
    }
}

/// Prefer an sRGB format; otherwise take whatever the surface lists first.
pub fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
) -> Result<wgpu::TextureFormat, RendererError> {
    formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| formats.first())
        .copied()
        .ok_or(RendererError::UnsupportedSurface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_format_prefers_srgb() {
        let formats = [
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Bgra8UnormSrgb,
        ];
        assert_eq!(
            choose_surface_format(&formats).unwrap(),
            wgpu::TextureFormat::Bgra8UnormSrgb
        );
        assert_eq!(
            choose_surface_format(&[wgpu::TextureFormat::Rgba16Float]).unwrap(),
            wgpu::TextureFormat::Rgba16Float
        );
    }

    #[test]
    fn empty_format_list_is_unsupported_surface() {
        assert!(matches!(
            choose_surface_format(&[]),
            Err(RendererError::UnsupportedSurface)
        ));
    }
}
