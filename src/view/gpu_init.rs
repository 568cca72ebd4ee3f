use wgpu::Device;
use std::sync::Arc;

use crate::error::ContextError;

/// GPU context - unified for both WASM and native
pub struct GpuContext {
    pub device: Arc<Device>,
    pub queue: Arc<wgpu::Queue>,
    pub surface: wgpu::Surface<'static>,
    pub format: wgpu::TextureFormat,
    pub config: wgpu::SurfaceConfiguration,
    #[cfg(target_arch = "wasm32")]
    pub canvas: web_sys::HtmlCanvasElement,
}

/// Shared GPU initialization helper
/// Returns (device, queue) for both platforms
async fn init_device_and_queue(
    adapter: &wgpu::Adapter,
) -> Result<(Arc<Device>, Arc<wgpu::Queue>), ContextError> {
    let adapter_limits = adapter.limits();
    #[cfg(target_arch = "wasm32")]
    let limits = wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter_limits);
    #[cfg(not(target_arch = "wasm32"))]
    let limits = wgpu::Limits::downlevel_defaults().using_resolution(adapter_limits);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits,
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::default(),
            },
        )
        .await
        .map_err(|e| ContextError::ContextUnavailable(format!("device request failed: {e}")))?;

    Ok((Arc::new(device), Arc::new(queue)))
}

/// Shared surface configuration helper
fn configure_surface(
    device: &Device,
    adapter: &wgpu::Adapter,
    surface: &wgpu::Surface,
    width: u32,
    height: u32,
) -> Result<(wgpu::TextureFormat, wgpu::SurfaceConfiguration), ContextError> {
    let caps = surface.get_capabilities(adapter);
    let format = caps
        .formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .or_else(|| caps.formats.first().copied())
        .ok_or_else(|| {
            ContextError::ContextUnavailable("surface is incompatible with the adapter".into())
        })?;
    let alpha_mode = caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(device, &config);

    Ok((format, config))
}

async fn request_adapter(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
) -> Result<wgpu::Adapter, ContextError> {
    instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(surface),
        })
        .await
        .map_err(|e| ContextError::ContextUnavailable(format!("no suitable GPU adapter: {e}")))
}

impl GpuContext {
    /// Reconfigure the surface to a new pixel size. Takes effect immediately.
    /// Sizes past the device's texture limit are clamped, so `size()` is what
    /// actually got configured.
    pub fn resize(&mut self, width: u32, height: u32) {
        let max_dim = self.device.limits().max_texture_dimension_2d;
        let (w, h) = surface_extent(width, height, max_dim);
        if (w, h) != (width, height) {
            tracing::warn!(width, height, max_dim, "render size clamped to device limits");
        }
        self.config.width = w;
        self.config.height = h;
        #[cfg(target_arch = "wasm32")]
        {
            self.canvas.set_width(self.config.width);
            self.canvas.set_height(self.config.height);
        }
        self.surface.configure(&self.device, &self.config);
    }

    /// Reapply the current configuration, e.g. after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

#[cfg(target_arch = "wasm32")]
impl GpuContext {
    /// Initialize GPU for a given canvas surface (WASM)
    pub async fn new(
        canvas: &web_sys::HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<Self, ContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = request_adapter(&instance, &surface).await?;
        tracing::info!(adapter = ?adapter.get_info(), "GPU adapter selected");

        let (device, queue) = init_device_and_queue(&adapter).await?;
        canvas.set_width(width.max(1));
        canvas.set_height(height.max(1));
        let (format, config) = configure_surface(&device, &adapter, &surface, width, height)?;

        Ok(GpuContext {
            device,
            queue,
            surface,
            format,
            config,
            canvas: canvas.clone(),
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl GpuContext {
    /// Initialize GPU for a given window (Native)
    pub async fn new_native(
        window: Arc<winit::window::Window>,
        width: u32,
        height: u32,
    ) -> Result<Self, ContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = request_adapter(&instance, &surface).await?;
        tracing::info!(adapter = ?adapter.get_info(), "GPU adapter selected");

        let (device, queue) = init_device_and_queue(&adapter).await?;
        let (format, config) = configure_surface(&device, &adapter, &surface, width, height)?;

        Ok(GpuContext {
            device,
            queue,
            surface,
            format,
            config,
        })
    }
}

fn surface_extent(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    let max_dim = max_dim.max(1);
    (width.clamp(1, max_dim), height.clamp(1, max_dim))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_extent_stays_within_device_limits() {
        assert_eq!(surface_extent(1280, 720, 8192), (1280, 720));
        assert_eq!(surface_extent(0, 0, 8192), (1, 1));
        // Supersampling past the limit on a 4K window.
        assert_eq!(surface_extent(9600, 5400, 8192), (8192, 5400));
    }
}
