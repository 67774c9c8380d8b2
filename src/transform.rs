//! Position, Euler rotation, and scale for placing objects in the world.
//!
//! The renderer's objects face local +Z, and all projections are left-handed
//! with zero-to-one depth, so the +Z-forward convention composes directly
//! with wgpu clip space.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3};

use crate::input::{Input, ModelKeys};

/// Rotation rate for key-driven controls, in radians per second.
pub const ROTATION_SPEED: f32 = 2.0;
/// Movement rate for key-driven controls, in world units per second.
pub const MOVEMENT_SPEED: f32 = 50.0;

/// A world-space placement: position, Euler rotation, and non-uniform scale.
///
/// The world matrix is rebuilt from these fields on every call rather than
/// cached, so arbitrary external mutation between calls is always reflected.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    /// World-space position.
    pub position: Vec3,
    /// Euler rotation in radians. Applied in Z, then X, then Y order.
    pub rotation: Vec3,
    /// Per-axis scale factors.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Creates an identity transform (origin, no rotation, unit scale).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transform positioned at the given location.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Sets the position component.
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the Euler rotation component, in radians.
    pub fn rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets uniform scale on all axes.
    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// The rotation as a quaternion (Z, then X, then Y application order).
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        )
    }

    /// Builds the world matrix: scale, then Z/X/Y rotation, then translation.
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }

    /// The object's forward axis in world space, renormalized to cancel any
    /// scale carried by the world matrix.
    pub fn facing(&self) -> Vec3 {
        self.world_matrix()
            .transform_vector3(Vec3::Z)
            .normalize_or_zero()
    }

    /// Re-derives the Euler rotation so the object's forward axis points at
    /// `target`. A target coincident with the position leaves the rotation
    /// unchanged.
    pub fn face_target(&mut self, target: Vec3) {
        let forward = target - self.position;
        if forward.length_squared() <= f32::EPSILON {
            return;
        }
        let forward = forward.normalize();

        // Reference up flips to +Z when the look direction is vertical.
        let up_ref = if forward.y.abs() > 0.999 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let right = up_ref.cross(forward).normalize();
        let up = forward.cross(right);

        let orientation = Quat::from_mat3(&Mat3::from_cols(right, up, forward));
        let (yaw, pitch, roll) = orientation.to_euler(EulerRot::YXZ);
        self.rotation = Vec3::new(pitch, yaw, roll);
    }

    /// Key-driven rotation and local-forward movement, scaled by frame time.
    ///
    /// This is the only time-driven mutation path; it is polled once per
    /// update, not event-driven.
    pub fn control(&mut self, input: &Input, frame_time: f32, keys: &ModelKeys) {
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
        if input.key_down(keys.roll_cw) {
            self.rotation.z += ROTATION_SPEED * frame_time;
        }
        if input.key_down(keys.roll_ccw) {
            self.rotation.z -= ROTATION_SPEED * frame_time;
        }

        let forward = self.facing();
        if input.key_down(keys.move_forward) {
            self.position += forward * MOVEMENT_SPEED * frame_time;
        }
        if input.key_down(keys.move_backward) {
            self.position -= forward * MOVEMENT_SPEED * frame_time;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_world_matrix_is_identity() {
        let transform = Transform::new();
        assert_eq!(transform.world_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn world_matrix_is_idempotent_without_mutation() {
        let transform = Transform::from_position(Vec3::new(3.0, -1.0, 8.0))
            .rotation(Vec3::new(0.4, 1.2, -0.7))
            .uniform_scale(2.5);
        let first = transform.world_matrix();
        let second = transform.world_matrix();
        assert_eq!(first.to_cols_array(), second.to_cols_array());
    }

    #[test]
    fn yaw_quarter_turn_faces_positive_x() {
        let transform =
            Transform::new().rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let facing = transform.facing();
        assert_relative_eq!(facing.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(facing.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(facing.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn world_matrix_applies_scale_before_rotation_and_translation() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0))
            .rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0))
            .uniform_scale(2.0);
        let moved = transform.world_matrix().transform_point3(Vec3::Z);
        assert_relative_eq!(moved.x, 3.0, epsilon = 1e-5);
        assert_relative_eq!(moved.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(moved.z, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn face_target_points_forward_axis_at_target() {
        let mut transform = Transform::from_position(Vec3::new(10.0, 5.0, -4.0));
        let target = Vec3::new(-3.0, 12.0, 20.0);
        transform.face_target(target);

        let expected = (target - transform.position).normalize();
        let facing = transform.facing();
        assert_relative_eq!(facing.x, expected.x, epsilon = 1e-4);
        assert_relative_eq!(facing.y, expected.y, epsilon = 1e-4);
        assert_relative_eq!(facing.z, expected.z, epsilon = 1e-4);
    }

    #[test]
    fn face_target_at_own_position_keeps_rotation() {
        let mut transform =
            Transform::from_position(Vec3::new(1.0, 1.0, 1.0)).rotation(Vec3::new(0.3, 0.6, 0.0));
        transform.face_target(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(transform.rotation, Vec3::new(0.3, 0.6, 0.0));
    }
}
