//! The device/back-buffer provider.
//!
//! [`GpuContext`] bundles the wgpu surface, device, queue, and surface
//! configuration. It is created once at startup from a winit window and
//! borrowed by every pass; the renderer issues bind/clear/viewport/present
//! through it and nothing else touches the swap chain.

use std::sync::Arc;
use winit::window::Window;

/// Depth format shared by the window depth buffer, the portal depth buffer,
/// and the spotlight shadow atlas.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// The wgpu resource bundle the whole renderer draws through.
///
/// Fields are public so callers can reach the raw wgpu APIs directly.
pub struct GpuContext {
    /// Presentation surface for the window.
    pub surface: wgpu::Surface<'static>,
    /// Logical device; creates buffers, textures, and pipelines.
    pub device: wgpu::Device,
    /// Submission queue.
    pub queue: wgpu::Queue,
    /// Active surface configuration: format, size, present mode.
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Initializes the GPU for a window: instance, adapter, device/queue,
    /// and a surface configured with an sRGB format (when available) and
    /// Fifo presentation.
    ///
    /// # Panics
    ///
    /// Panics when no suitable adapter exists or device creation fails;
    /// there is no renderer to fall back to without one.
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window).unwrap();

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("Failed to find a suitable GPU adapter");

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Portico Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))
        .expect("Failed to create device");

        let config = Self::surface_config(&surface, &adapter, size.width, size.height);
        surface.configure(&device, &config);

        log::info!(
            "surface configured: {}x{} {:?}",
            config.width,
            config.height,
            config.format
        );

        Self {
            surface,
            device,
            queue,
            config,
        }
    }

    fn surface_config(
        surface: &wgpu::Surface<'_>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> wgpu::SurfaceConfiguration {
        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    /// Reconfigures the surface for a new window size. Zero-sized requests
    /// (window minimized) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Width over height of the current surface.
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }
}
