//! Portal viewports: a renderable panel showing a live render of the scene
//! from a secondary camera.

use glam::Vec3;

use crate::assets::{MeshKind, TextureKind};
use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::input::{CameraKeys, Input};
use crate::model::Model;
use crate::target::{PortalSurface, SurfaceDesc, TargetError};
use crate::transform::Transform;

/// World-space size of the portal panel.
const PORTAL_PANEL_SIZE: f32 = 20.0;

/// A portal: a panel body, an independently controllable secondary camera,
/// and (once [`create_surface`](Portal::create_surface) succeeds) the color
/// surface that camera renders into each frame.
///
/// A portal whose surface allocation failed stays registered but is
/// excluded from rendering.
pub struct Portal {
    body: Model,
    camera: Camera,
    surface: Option<PortalSurface>,
}

impl Portal {
    /// Places a portal panel and derives the initial secondary-camera pose:
    /// a few units behind the panel along its facing, angled slightly back
    /// toward it.
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        let body = Model::new(
            MeshKind::Portal,
            vec![TextureKind::Bezel],
            Transform::from_position(position)
                .rotation(rotation)
                .uniform_scale(PORTAL_PANEL_SIZE),
        );

        let camera_position = position - body.facing() * 5.0;
        let camera_rotation =
            rotation + Vec3::new(20f32.to_radians(), 345f32.to_radians(), 0.0);
        let camera = Camera::new(camera_position, camera_rotation);

        Self {
            body,
            camera,
            surface: None,
        }
    }

    /// Allocates the portal's color texture and its render-target and
    /// shader views as one atomic step.
    ///
    /// On failure the portal holds no partial state and stays unusable;
    /// callers must check before registering it for rendering.
    pub fn create_surface(&mut self, gpu: &GpuContext, desc: &SurfaceDesc) -> Result<(), TargetError> {
        self.surface = Some(PortalSurface::create(gpu, desc)?);
        Ok(())
    }

    /// Whether the portal can take part in the render sequence.
    pub fn is_renderable(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&PortalSurface> {
        self.surface.as_ref()
    }

    pub fn body(&self) -> &Model {
        &self.body
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.body.set_position(position);
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.body.transform.rotation = rotation;
    }

    /// Drives the secondary camera with the same control surface as the
    /// primary camera.
    pub fn control_camera(&mut self, input: &Input, frame_time: f32, keys: &CameraKeys) {
        self.camera.control(input, frame_time, keys);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn portal_without_surface_is_not_renderable() {
        let portal = Portal::new(Vec3::new(10.0, 15.0, 50.0), Vec3::ZERO);
        assert!(!portal.is_renderable());
        assert!(portal.surface().is_none());
    }

    #[test]
    fn secondary_camera_starts_behind_the_panel() {
        let position = Vec3::new(10.0, 15.0, 50.0);
        let portal = Portal::new(position, Vec3::ZERO);
        let expected = position - portal.body().facing() * 5.0;
        assert_relative_eq!(portal.camera().position.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(portal.camera().position.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(portal.camera().position.z, expected.z, epsilon = 1e-5);
    }
}
