//! Dynamic lights and the bounded per-kind light bank.

use glam::{Mat4, Vec3};

use crate::assets::{MeshKind, TextureKind};
use crate::model::Model;
use crate::transform::Transform;

/// Fixed capacity for point lights.
pub const MAX_POINT_LIGHTS: usize = 3;
/// Fixed capacity for spotlights; also the shadow atlas layer count.
pub const MAX_SPOTLIGHTS: usize = 4;
/// Fixed capacity for directional lights.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 1;

/// Near and far planes shared by the spotlight shadow frustum and the scene
/// cameras, so the shadow pass and the lighting pass project identically.
const SHADOW_NEAR: f32 = 0.1;
const SHADOW_FAR: f32 = 1000.0;

/// Classifies a light and carries the variant-specific payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    Point,
    /// A shadow-casting cone light. `cone_angle` is the full field of view
    /// in radians.
    Spot { cone_angle: f32 },
    Directional,
}

/// Camera-equivalent shadow parameters, available only for spotlights.
#[derive(Clone, Copy, Debug)]
pub struct SpotShadow {
    /// World-to-light-space matrix: the inverse affine of the body's world
    /// matrix.
    pub view: Mat4,
    /// Perspective projection with aspect 1.0 and the cone angle as fov.
    pub projection: Mat4,
    /// Cosine of half the cone angle, for falloff at the silhouette edge.
    pub cos_half_angle: f32,
}

/// A dynamic light wrapping a renderable marker body.
///
/// The body carries the light's entire spatial state; every spatial query
/// delegates to it, so light orientation and body orientation can never
/// diverge.
#[derive(Clone, Debug)]
pub struct Light {
    kind: LightKind,
    body: Model,
    colour: Vec3,
    strength: f32,
}

impl Light {
    /// Creates a light at `position` facing `face_toward`. The marker body
    /// is scaled by `strength^0.7` so brighter lights read larger.
    pub fn new(
        kind: LightKind,
        colour: Vec3,
        position: Vec3,
        strength: f32,
        face_toward: Vec3,
    ) -> Self {
        let transform = Transform::from_position(position).uniform_scale(strength.powf(0.7));
        let mut body = Model::new(MeshKind::Marker, vec![TextureKind::Flare], transform);
        body.face_target(face_toward);
        Self {
            kind,
            body,
            colour,
            strength,
        }
    }

    pub fn kind(&self) -> LightKind {
        self.kind
    }

    pub fn colour(&self) -> Vec3 {
        self.colour
    }

    pub fn strength(&self) -> f32 {
        self.strength
    }

    pub fn position(&self) -> Vec3 {
        self.body.position()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.body.set_position(position);
    }

    /// Normalized forward axis of the body; the spotlight direction.
    pub fn facing(&self) -> Vec3 {
        self.body.facing()
    }

    pub fn face_target(&mut self, target: Vec3) {
        self.body.face_target(target);
    }

    /// The renderable marker body.
    pub fn body(&self) -> &Model {
        &self.body
    }

    /// Shadow-casting parameters; `None` for anything but a spotlight.
    pub fn spot_shadow(&self) -> Option<SpotShadow> {
        match self.kind {
            LightKind::Spot { cone_angle } => Some(SpotShadow {
                view: self.body.world_matrix().inverse(),
                projection: Mat4::perspective_lh(cone_angle, 1.0, SHADOW_NEAR, SHADOW_FAR),
                cos_half_angle: (cone_angle / 2.0).cos(),
            }),
            _ => None,
        }
    }
}

/// Fixed-capacity light storage, one pool per kind.
///
/// Adding a light beyond its kind's capacity does not disturb existing
/// slots; it returns `None` and logs a warning.
#[derive(Default)]
pub struct LightBank {
    point: Vec<Light>,
    spot: Vec<Light>,
    directional: Vec<Light>,
}

impl LightBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the light in its kind's pool. Returns the stored light, or
    /// `None` when that pool is full.
    pub fn add(&mut self, light: Light) -> Option<&mut Light> {
        let (pool, capacity) = match light.kind() {
            LightKind::Point => (&mut self.point, MAX_POINT_LIGHTS),
            LightKind::Spot { .. } => (&mut self.spot, MAX_SPOTLIGHTS),
            LightKind::Directional => (&mut self.directional, MAX_DIRECTIONAL_LIGHTS),
        };
        if pool.len() >= capacity {
            log::warn!(
                "light pool full ({capacity} of kind {:?}); light not created",
                light.kind()
            );
            return None;
        }
        pool.push(light);
        pool.last_mut()
    }

    pub fn points(&self) -> &[Light] {
        &self.point
    }

    pub fn spots(&self) -> &[Light] {
        &self.spot
    }

    pub fn spots_mut(&mut self) -> &mut [Light] {
        &mut self.spot
    }

    pub fn directionals(&self) -> &[Light] {
        &self.directional
    }

    /// All lights in marker-draw order: point, spot, then directional.
    pub fn iter(&self) -> impl Iterator<Item = &Light> {
        self.point
            .iter()
            .chain(self.spot.iter())
            .chain(self.directional.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spot(position: Vec3) -> Light {
        Light::new(
            LightKind::Spot {
                cone_angle: 90f32.to_radians(),
            },
            Vec3::new(0.8, 0.8, 1.0),
            position,
            10.0,
            Vec3::ZERO,
        )
    }

    #[test]
    fn point_light_reports_exact_colour_and_strength() {
        let light = Light::new(
            LightKind::Point,
            Vec3::new(1.0, 0.8, 0.2),
            Vec3::new(-5.0, 30.0, -20.0),
            50.0,
            Vec3::ZERO,
        );
        assert_eq!(light.strength(), 50.0);
        assert_eq!(light.colour(), Vec3::new(1.0, 0.8, 0.2));
        assert_eq!(light.position(), Vec3::new(-5.0, 30.0, -20.0));
    }

    #[test]
    fn marker_body_scales_with_strength() {
        let light = spot(Vec3::ZERO);
        let expected = 10f32.powf(0.7);
        assert_relative_eq!(light.body().transform.scale.x, expected, epsilon = 1e-6);
    }

    #[test]
    fn ninety_degree_cone_has_cos_forty_five_half_angle() {
        let shadow = spot(Vec3::new(30.0, 20.0, 0.0)).spot_shadow().unwrap();
        assert_relative_eq!(shadow.cos_half_angle, 0.70710678, epsilon = 1e-6);
    }

    #[test]
    fn spot_view_maps_own_position_to_origin() {
        let light = spot(Vec3::new(30.0, 20.0, 0.0));
        let shadow = light.spot_shadow().unwrap();
        let origin = shadow.view.transform_point3(light.position());
        assert_relative_eq!(origin.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(origin.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(origin.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn point_lights_have_no_shadow_parameters() {
        let light = Light::new(LightKind::Point, Vec3::ONE, Vec3::ZERO, 1.0, Vec3::Z);
        assert!(light.spot_shadow().is_none());
    }

    #[test]
    fn spotlight_pool_rejects_fifth_light_without_disturbing_slots() {
        let mut bank = LightBank::new();
        for i in 0..MAX_SPOTLIGHTS {
            assert!(bank.add(spot(Vec3::new(i as f32, 0.0, 0.0))).is_some());
        }
        assert!(bank.add(spot(Vec3::new(99.0, 0.0, 0.0))).is_none());

        assert_eq!(bank.spots().len(), MAX_SPOTLIGHTS);
        for (i, light) in bank.spots().iter().enumerate() {
            assert_eq!(light.position().x, i as f32);
        }
    }

    #[test]
    fn directional_pool_holds_exactly_one() {
        let mut bank = LightBank::new();
        let dir = |x: f32| {
            Light::new(
                LightKind::Directional,
                Vec3::ONE,
                Vec3::new(x, 50.0, 0.0),
                20.0,
                Vec3::ZERO,
            )
        };
        assert!(bank.add(dir(0.0)).is_some());
        assert!(bank.add(dir(1.0)).is_none());
        assert_eq!(bank.directionals().len(), 1);
    }
}
