//! GPU surface textures: file loading and procedural generation.
//!
//! The scene's texture catalog is procedural so the demo runs without asset
//! files; [`Texture::from_file`] remains the loading path for external
//! images. Shadow maps and portal surfaces are not ordinary textures and
//! live in the render-target module.

use crate::gpu::GpuContext;

/// A GPU texture plus the sampler it is bound with.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from raw RGBA data.
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            anisotropy_clamp: 4,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    /// Load a texture from an image file.
    pub fn from_file(gpu: &GpuContext, path: &str) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(gpu, &img, width, height, path))
    }

    /// Load a texture from embedded bytes.
    pub fn from_bytes(
        gpu: &GpuContext,
        bytes: &[u8],
        label: &str,
    ) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba(gpu, &img, width, height, label))
    }

    /// Generate a hash-noise texture from a small color palette.
    pub fn noise(gpu: &GpuContext, size: u32, seed: u32, palette: &[[u8; 3]], label: &str) -> Self {
        let mut data = vec![0u8; (size * size * 4) as usize];

        for y in 0..size {
            for x in 0..size {
                let idx = ((y * size + x) * 4) as usize;
                let h = hash(x, y, seed);

                let base = palette[(h % palette.len() as u32) as usize];
                let variation = ((hash(x + 1000, y + 1000, seed) % 24) as i32) - 12;

                data[idx] = (base[0] as i32 + variation).clamp(0, 255) as u8;
                data[idx + 1] = (base[1] as i32 + variation).clamp(0, 255) as u8;
                data[idx + 2] = (base[2] as i32 + variation).clamp(0, 255) as u8;
                data[idx + 3] = 255;
            }
        }

        Self::from_rgba(gpu, &data, size, size, label)
    }

    /// Generate a two-color checkerboard with `cells` squares per side.
    pub fn checkerboard(
        gpu: &GpuContext,
        size: u32,
        cells: u32,
        a: [u8; 3],
        b: [u8; 3],
        label: &str,
    ) -> Self {
        let mut data = vec![0u8; (size * size * 4) as usize];
        let cell = (size / cells).max(1);

        for y in 0..size {
            for x in 0..size {
                let idx = ((y * size + x) * 4) as usize;
                let even = ((x / cell) + (y / cell)) % 2 == 0;
                let base = if even { a } else { b };
                data[idx] = base[0];
                data[idx + 1] = base[1];
                data[idx + 2] = base[2];
                data[idx + 3] = 255;
            }
        }

        Self::from_rgba(gpu, &data, size, size, label)
    }

    /// Generate a soft radial flare, used for light markers.
    pub fn flare(gpu: &GpuContext, size: u32) -> Self {
        let mut data = vec![0u8; (size * size * 4) as usize];
        let center = (size as f32 - 1.0) / 2.0;

        for y in 0..size {
            for x in 0..size {
                let idx = ((y * size + x) * 4) as usize;
                let dx = (x as f32 - center) / center;
                let dy = (y as f32 - center) / center;
                let dist = (dx * dx + dy * dy).sqrt().min(1.0);
                let glow = ((1.0 - dist).powi(2) * 255.0) as u8;
                data[idx] = glow;
                data[idx + 1] = glow;
                data[idx + 2] = glow;
                data[idx + 3] = 255;
            }
        }

        Self::from_rgba(gpu, &data, size, size, "Flare Texture")
    }

    /// Generate a tangent-space normal map of gentle sine bumps.
    ///
    /// Stored in a non-sRGB format so the shader reads the raw vectors.
    pub fn bump_normals(gpu: &GpuContext, size: u32, bumps: f32) -> Self {
        use wgpu::util::DeviceExt;

        let mut data = vec![0u8; (size * size * 4) as usize];

        for y in 0..size {
            for x in 0..size {
                let idx = ((y * size + x) * 4) as usize;
                let u = x as f32 / size as f32 * std::f32::consts::TAU * bumps;
                let v = y as f32 / size as f32 * std::f32::consts::TAU * bumps;

                // Gradient of a sine height field, packed into [0, 255].
                let nx = -u.cos() * 0.4;
                let ny = -v.cos() * 0.4;
                let nz = (1.0 - nx * nx - ny * ny).max(0.0).sqrt();
                data[idx] = ((nx * 0.5 + 0.5) * 255.0) as u8;
                data[idx + 1] = ((ny * 0.5 + 0.5) * 255.0) as u8;
                data[idx + 2] = ((nz * 0.5 + 0.5) * 255.0) as u8;
                data[idx + 3] = 255;
            }
        }

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some("Bump Normal Map"),
                size: wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bump Normal Map Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width: size,
            height: size,
        }
    }
}

/// Simple hash for procedural generation.
fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}
