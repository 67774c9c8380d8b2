//! Per-frame GPU data: the shading-data block shared by every pass, the
//! dynamically-offset uniform rings it is uploaded through, and the pass
//! planner that fixes the frame's render order.

use crate::gpu::GpuContext;
use crate::light::{MAX_POINT_LIGHTS, MAX_SPOTLIGHTS};

/// Uniform buffer offset alignment required for dynamic offsets.
const UNIFORM_ALIGN: u32 = 256;

/// GPU-side point light entry. Colour is premultiplied by strength.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightData {
    pub colour: [f32; 4],
    pub position: [f32; 4],
}

/// GPU-side spotlight entry, including the camera-equivalent matrices the
/// shadow test re-projects with. These are the same matrices the shadow
/// pass rendered with, so both passes project identically.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightData {
    pub colour: [f32; 4],
    pub position: [f32; 4],
    /// xyz = facing direction, w = cosine of the half cone angle.
    pub facing: [f32; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightData {
    pub colour: [f32; 4],
    pub direction: [f32; 4],
}

/// The per-frame shading-data block.
///
/// One instance is written per pass: the light data is identical across a
/// frame, while the camera matrices carry the pass's point of view.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_projection: [[f32; 4]; 4],
    pub point_lights: [PointLightData; MAX_POINT_LIGHTS],
    pub spot_lights: [SpotLightData; MAX_SPOTLIGHTS],
    pub directional_light: DirectionalLightData,
    pub ambient_colour: [f32; 4],
    /// xyz = camera position, w = specular power.
    pub camera_position: [f32; 4],
    /// x = point count, y = spot count, z = directional count.
    pub counts: [u32; 4],
    /// x = wiggle timer.
    pub timing: [f32; 4],
}

/// Per-draw model data.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub world: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub colour: [f32; 4],
    /// x = wiggle strength.
    pub params: [f32; 4],
}

/// A grow-on-demand uniform buffer carved into 256-aligned slots, bound
/// once per frame with dynamic offsets.
///
/// Writing each pass/draw into its own slot keeps every value live for the
/// whole submission; rewriting a single buffer between draws would leave
/// all of them seeing the final write.
pub struct UniformRing {
    buffer: wgpu::Buffer,
    item_size: u32,
    stride: u32,
    capacity: u32,
    cursor: u32,
    label: &'static str,
}

impl UniformRing {
    pub fn new(gpu: &GpuContext, label: &'static str, item_size: u32, capacity: u32) -> Self {
        let stride = item_size.div_ceil(UNIFORM_ALIGN) * UNIFORM_ALIGN;
        let buffer = Self::make_buffer(gpu, label, stride, capacity);
        Self {
            buffer,
            item_size,
            stride,
            capacity,
            cursor: 0,
            label,
        }
    }

    fn make_buffer(gpu: &GpuContext, label: &str, stride: u32, capacity: u32) -> wgpu::Buffer {
        gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride as u64 * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Grows the ring if this frame needs more slots than allocated.
    /// Returns true when the buffer was recreated, invalidating bind groups
    /// built over the old one.
    pub fn ensure_capacity(&mut self, gpu: &GpuContext, slots: u32) -> bool {
        if slots <= self.capacity {
            return false;
        }
        let capacity = slots.next_power_of_two();
        log::debug!("{}: growing to {capacity} slots", self.label);
        self.buffer = Self::make_buffer(gpu, self.label, self.stride, capacity);
        self.capacity = capacity;
        true
    }

    /// Rewinds the ring for a new frame.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Writes one value into the next slot and returns its byte offset for
    /// `set_bind_group`.
    pub fn push<T: bytemuck::Pod>(&mut self, gpu: &GpuContext, value: &T) -> u32 {
        debug_assert!(self.cursor < self.capacity, "uniform ring overflow");
        let offset = self.cursor * self.stride;
        gpu.queue
            .write_buffer(&self.buffer, offset as u64, bytemuck::bytes_of(value));
        self.cursor += 1;
        offset
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// The per-slot binding size (the item size, not the aligned stride).
    pub fn binding_size(&self) -> wgpu::BufferSize {
        wgpu::BufferSize::new(self.item_size as u64).expect("uniform item size must be non-zero")
    }
}

/// One step of the frame's render sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    /// Depth-only render into the shadow atlas layer of spotlight `light`.
    Shadow { light: usize },
    /// Full lit-scene render into portal `portal`'s surface.
    Portal { portal: usize },
    /// Full lit-scene render into the back buffer.
    Main,
}

/// The ordered pass list for one frame.
///
/// Shadow passes come first (every later pass samples the atlas), then the
/// portal passes in registration order (the main pass samples their
/// surfaces), then the main pass. Portals without a usable surface are
/// skipped.
#[derive(Debug)]
pub struct FramePlan {
    passes: Vec<Pass>,
}

impl FramePlan {
    pub fn build(spotlights: usize, portals_renderable: &[bool]) -> Self {
        let mut passes = Vec::with_capacity(spotlights + portals_renderable.len() + 1);
        for light in 0..spotlights {
            passes.push(Pass::Shadow { light });
        }
        for (portal, renderable) in portals_renderable.iter().enumerate() {
            if *renderable {
                passes.push(Pass::Portal { portal });
            }
        }
        passes.push(Pass::Main);
        Self { passes }
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Number of per-pass uniform slots this plan consumes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_spotlight_one_portal_orders_shadow_portal_main() {
        let plan = FramePlan::build(1, &[true]);
        assert_eq!(
            plan.passes(),
            &[
                Pass::Shadow { light: 0 },
                Pass::Portal { portal: 0 },
                Pass::Main,
            ]
        );
    }

    #[test]
    fn all_shadow_passes_precede_all_portal_passes() {
        let plan = FramePlan::build(3, &[true, true]);
        let first_portal = plan
            .passes()
            .iter()
            .position(|p| matches!(p, Pass::Portal { .. }))
            .unwrap();
        let last_shadow = plan
            .passes()
            .iter()
            .rposition(|p| matches!(p, Pass::Shadow { .. }))
            .unwrap();
        assert!(last_shadow < first_portal);
        assert_eq!(plan.passes().last(), Some(&Pass::Main));
    }

    #[test]
    fn unusable_portals_are_skipped() {
        let plan = FramePlan::build(1, &[true, false, true]);
        assert_eq!(
            plan.passes(),
            &[
                Pass::Shadow { light: 0 },
                Pass::Portal { portal: 0 },
                Pass::Portal { portal: 2 },
                Pass::Main,
            ]
        );
    }

    #[test]
    fn empty_scene_still_renders_the_main_pass() {
        let plan = FramePlan::build(0, &[]);
        assert_eq!(plan.passes(), &[Pass::Main]);
    }
}
