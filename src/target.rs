//! Render targets the renderer allocates directly: the spotlight shadow
//! atlas, portal color surfaces, and depth buffers.
//!
//! Unlike surface textures these are written every frame and then sampled
//! within the same frame, so they carry both `RENDER_ATTACHMENT` and (where
//! shaders read them) `TEXTURE_BINDING` usage. wgpu treats a malformed
//! descriptor as a validation panic, so extents are checked up front and
//! rejected with a descriptive error instead.

use thiserror::Error;

use crate::gpu::{DEPTH_FORMAT, GpuContext};

/// Fixed edge length of portal color surfaces and their shared depth
/// buffer.
pub const PORTAL_SURFACE_SIZE: u32 = 1024;

/// Errors raised while allocating render targets.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("{label}: invalid extent {width}x{height} (device limit {limit})")]
    InvalidExtent {
        label: &'static str,
        width: u32,
        height: u32,
        limit: u32,
    },
}

fn validate_extent(
    label: &'static str,
    width: u32,
    height: u32,
    limit: u32,
) -> Result<(), TargetError> {
    if width == 0 || height == 0 || width > limit || height > limit {
        return Err(TargetError::InvalidExtent {
            label,
            width,
            height,
            limit,
        });
    }
    Ok(())
}

/// Descriptor for a portal color surface.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceDesc {
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
}

impl SurfaceDesc {
    /// The standard portal surface: a fixed square resolution in the
    /// swap-chain format, so one pipeline set serves portal and main
    /// passes alike.
    pub fn portal(gpu: &GpuContext) -> Self {
        Self {
            width: PORTAL_SURFACE_SIZE,
            height: PORTAL_SURFACE_SIZE,
            format: gpu.config.format,
        }
    }

    /// Checks the extent against a device texture-dimension limit.
    pub fn validate(&self, limit: u32) -> Result<(), TargetError> {
        validate_extent("portal surface", self.width, self.height, limit)
    }
}

/// A portal's color target: the texture plus its render-target and
/// shader-visible views, allocated together as one atomic step.
pub struct PortalSurface {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    /// View bound as the portal pass color attachment.
    pub(crate) target_view: wgpu::TextureView,
    /// View sampled by the main pass on the portal body.
    pub(crate) shader_view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl PortalSurface {
    /// Allocates the texture and both views, failing without partial state
    /// if the descriptor is invalid.
    pub fn create(gpu: &GpuContext, desc: &SurfaceDesc) -> Result<Self, TargetError> {
        desc.validate(gpu.device.limits().max_texture_dimension_2d)?;

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Portal Surface"),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let target_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let shader_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            target_view,
            shader_view,
            width: desc.width,
            height: desc.height,
        })
    }
}

/// The spotlight shadow maps: one `Depth32Float` layer per spotlight slot,
/// with a per-layer view for the shadow pass depth attachment and a single
/// array view for sampling in the lit passes.
pub struct ShadowAtlas {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    /// Depth-attachment views, one per spotlight slot.
    pub(crate) layer_views: Vec<wgpu::TextureView>,
    /// Array view bound to the lit-pass shader.
    pub(crate) array_view: wgpu::TextureView,
    pub size: u32,
}

impl ShadowAtlas {
    pub fn new(gpu: &GpuContext, size: u32, layers: u32) -> Result<Self, TargetError> {
        validate_extent(
            "shadow atlas",
            size,
            size,
            gpu.device.limits().max_texture_dimension_2d,
        )?;

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Atlas"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let layer_views = (0..layers)
            .map(|layer| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("Shadow Atlas Layer"),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shadow Atlas Array"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        Ok(Self {
            texture,
            layer_views,
            array_view,
            size,
        })
    }
}

/// A plain depth buffer: the window depth target and the depth target
/// shared by every portal pass.
pub struct DepthTarget {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthTarget {
    pub fn new(gpu: &GpuContext, width: u32, height: u32) -> Result<Self, TargetError> {
        validate_extent(
            "depth target",
            width,
            height,
            gpu.device.limits().max_texture_dimension_2d,
        )?;

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            width,
            height,
        })
    }

    /// Recreates the target if the surface has been resized since the last
    /// frame.
    pub fn ensure_size(&mut self, gpu: &GpuContext) {
        if self.width != gpu.width() || self.height != gpu.height() {
            match Self::new(gpu, gpu.width(), gpu.height()) {
                Ok(target) => *self = target,
                Err(err) => log::error!("failed to resize depth target: {err}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_width_descriptor_fails_validation() {
        let desc = SurfaceDesc {
            width: 0,
            height: 1024,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
        };
        let err = desc.validate(8192).unwrap_err();
        assert!(err.to_string().contains("0x1024"));
    }

    #[test]
    fn oversized_descriptor_fails_validation() {
        let desc = SurfaceDesc {
            width: 1024,
            height: 16384,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
        };
        assert!(desc.validate(8192).is_err());
    }

    #[test]
    fn standard_extent_passes_validation() {
        let desc = SurfaceDesc {
            width: 1024,
            height: 1024,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
        };
        assert!(desc.validate(8192).is_ok());
    }
}
