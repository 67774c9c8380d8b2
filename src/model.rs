//! A placed instance of a catalog mesh.

use glam::{Mat4, Vec3};

use crate::assets::{MeshKind, TextureKind};
use crate::input::{Input, ModelKeys};
use crate::transform::Transform;

/// A renderable object: a catalog mesh reference, a transform, the surface
/// textures to bind, and the per-object wiggle strength consumed by the
/// wiggle shader variant.
///
/// Models are plain data; mesh and texture handles resolve through the
/// asset catalog at draw time.
#[derive(Clone, Debug)]
pub struct Model {
    pub mesh: MeshKind,
    pub textures: Vec<TextureKind>,
    pub transform: Transform,
    pub wiggle_strength: f32,
}

impl Model {
    pub fn new(mesh: MeshKind, textures: Vec<TextureKind>, transform: Transform) -> Self {
        Self {
            mesh,
            textures,
            transform,
            wiggle_strength: 0.0,
        }
    }

    /// World matrix, rebuilt from the transform on every call.
    pub fn world_matrix(&self) -> Mat4 {
        self.transform.world_matrix()
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    /// Normalized world-space forward axis.
    pub fn facing(&self) -> Vec3 {
        self.transform.facing()
    }

    /// Points the model's forward axis at `target`.
    pub fn face_target(&mut self, target: Vec3) {
        self.transform.face_target(target);
    }

    /// Key-driven rotation and movement; see [`Transform::control`].
    pub fn control(&mut self, input: &Input, frame_time: f32, keys: &ModelKeys) {
        self.transform.control(input, frame_time, keys);
    }

    /// The texture bound to the given material slot, if any.
    pub fn texture(&self, slot: usize) -> Option<TextureKind> {
        self.textures.get(slot).copied()
    }
}
