//! First-person camera with key-driven look and movement.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::input::{CameraKeys, Input};
use crate::transform::{MOVEMENT_SPEED, ROTATION_SPEED};

/// A camera described by position and Euler rotation.
///
/// The view matrix is the inverse of the camera's world matrix, recomputed
/// on demand; the projection is left-handed with zero-to-one depth to match
/// wgpu clip space.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// World-space position.
    pub position: Vec3,
    /// Euler rotation in radians (pitch, yaw, roll).
    pub rotation: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            fov: std::f32::consts::FRAC_PI_4,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    fn world_matrix(&self) -> Mat4 {
        let orientation = Quat::from_euler(
            EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        );
        Mat4::from_rotation_translation(orientation, self.position)
    }

    /// World-to-view matrix: the inverse of the camera's world matrix.
    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    /// Left-handed perspective projection with zero-to-one depth.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_lh(self.fov, aspect, self.near, self.far)
    }

    /// Combined view-projection matrix for the given aspect ratio.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Key-driven look (pitch/yaw) and movement (forward/backward/strafe),
    /// scaled by frame time.
    pub fn control(&mut self, input: &Input, frame_time: f32, keys: &CameraKeys) {
        if input.key_down(keys.turn_down) {
            self.rotation.x += ROTATION_SPEED * frame_time;
        }
        if input.key_down(keys.turn_up) {
            self.rotation.x -= ROTATION_SPEED * frame_time;
        }
        if input.key_down(keys.turn_right) {
            self.rotation.y += ROTATION_SPEED * frame_time;
        }
        if input.key_down(keys.turn_left) {
            self.rotation.y -= ROTATION_SPEED * frame_time;
        }

        let world = self.world_matrix();
        let forward = world.transform_vector3(Vec3::Z).normalize_or_zero();
        let right = world.transform_vector3(Vec3::X).normalize_or_zero();
        if input.key_down(keys.move_forward) {
            self.position += forward * MOVEMENT_SPEED * frame_time;
        }
        if input.key_down(keys.move_backward) {
            self.position -= forward * MOVEMENT_SPEED * frame_time;
        }
        if input.key_down(keys.strafe_right) {
            self.position += right * MOVEMENT_SPEED * frame_time;
        }
        if input.key_down(keys.strafe_left) {
            self.position -= right * MOVEMENT_SPEED * frame_time;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn view_matrix_maps_camera_position_to_origin() {
        let camera = Camera::new(Vec3::new(15.0, 30.0, -70.0), Vec3::new(0.23, 0.0, 0.0));
        let origin = camera.view_matrix().transform_point3(camera.position);
        assert_relative_eq!(origin.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(origin.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn points_ahead_of_camera_land_inside_the_frustum() {
        let camera = Camera::new(Vec3::ZERO, Vec3::ZERO);
        let clip = camera.view_projection(1.0) * Vec3::new(0.0, 0.0, 10.0).extend(1.0);
        let ndc = clip / clip.w;
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
