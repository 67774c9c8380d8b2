//! The scene manager: owns every scene collection and GPU resource the
//! render sequence touches, and drives the per-frame update.

use glam::Vec3;
use winit::keyboard::KeyCode;

use crate::assets::{Assets, MeshKind, TextureKind};
use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::input::{CameraKeys, Input, ModelKeys};
use crate::light::{Light, LightBank, LightKind, MAX_SPOTLIGHTS};
use crate::mesh::Mesh;
use crate::model::Model;
use crate::pipeline::{Pipelines, ShaderAssignment, ShaderKind};
use crate::portal::Portal;
use crate::scene::SceneError;
use crate::scene::frame::{FrameUniforms, ModelUniforms, UniformRing};
use crate::target::{DepthTarget, PORTAL_SURFACE_SIZE, ShadowAtlas, SurfaceDesc};
use crate::transform::Transform;

/// Edge length of each spotlight shadow map.
pub const SHADOW_MAP_SIZE: u32 = 1024;
/// Fixed portal capacity; portals share one depth buffer.
pub const MAX_PORTALS: usize = 4;

/// Orbit radius of the first spotlight around the featured model.
const LIGHT_ORBIT_RADIUS: f32 = 20.0;
/// Orbit rate in radians per second.
const LIGHT_ORBIT_SPEED: f32 = 0.7;

/// Owns the scene content (model buckets, light bank, portals, cameras) and
/// the per-frame GPU state (shadow atlas, depth targets, uniform rings,
/// pipelines), and sequences the render passes each frame.
///
/// Single-threaded: one render sequence runs to completion before the next
/// update begins, and nothing outside the manager mutates its state.
pub struct SceneManager {
    pub(crate) assets: Assets,
    pub(crate) pipelines: Pipelines,

    /// Generic models, back-face culled, bucketed by shader kind.
    pub(crate) models: [Vec<Model>; ShaderKind::COUNT],
    /// The featured (controllable) models, rendered without culling.
    pub(crate) featured: [Vec<Model>; ShaderKind::COUNT],
    /// Alpha-blended models, drawn last in insertion order.
    pub(crate) transparent: Vec<Model>,
    pub(crate) portals: Vec<Portal>,
    pub(crate) lights: LightBank,

    pub(crate) camera: Camera,
    pub(crate) ambient_colour: Vec3,
    pub(crate) specular_power: f32,
    pub(crate) background: wgpu::Color,

    pub(crate) shadow_atlas: ShadowAtlas,
    pub(crate) portal_depth: DepthTarget,
    pub(crate) window_depth: DepthTarget,

    pub(crate) frame_ring: UniformRing,
    pub(crate) model_ring: UniformRing,

    pub(crate) wiggle_timer: f32,
    orbit_angle: f32,
    orbit_paused: bool,
}

impl SceneManager {
    /// Allocates every long-lived GPU resource the scene needs. Any
    /// allocation failure aborts initialization.
    pub fn new(gpu: &GpuContext) -> Result<Self, SceneError> {
        let assets = Assets::load(gpu);
        let pipelines = Pipelines::new(gpu);

        let shadow_atlas = ShadowAtlas::new(gpu, SHADOW_MAP_SIZE, MAX_SPOTLIGHTS as u32)?;
        let portal_depth = DepthTarget::new(gpu, PORTAL_SURFACE_SIZE, PORTAL_SURFACE_SIZE)?;
        let window_depth = DepthTarget::new(gpu, gpu.width(), gpu.height())?;

        let frame_ring = UniformRing::new(
            gpu,
            "Frame Uniform Ring",
            std::mem::size_of::<FrameUniforms>() as u32,
            16,
        );
        let model_ring = UniformRing::new(
            gpu,
            "Model Uniform Ring",
            std::mem::size_of::<ModelUniforms>() as u32,
            256,
        );

        Ok(Self {
            assets,
            pipelines,
            models: std::array::from_fn(|_| Vec::new()),
            featured: std::array::from_fn(|_| Vec::new()),
            transparent: Vec::new(),
            portals: Vec::new(),
            lights: LightBank::new(),
            camera: Camera::default(),
            ambient_colour: Vec3::new(0.2, 0.2, 0.3),
            specular_power: 256.0,
            background: wgpu::Color {
                r: 0.2,
                g: 0.2,
                b: 0.3,
                a: 1.0,
            },
            shadow_atlas,
            portal_depth,
            window_depth,
            frame_ring,
            model_ring,
            wiggle_timer: 0.0,
            orbit_angle: 0.0,
            orbit_paused: false,
        })
    }

    /// Places a new model in the bucket matching its shader assignment: the
    /// transparent bucket, the featured no-cull bucket when the mesh is the
    /// featured kind, or the generic bucket otherwise.
    #[allow(clippy::too_many_arguments)]
    pub fn new_model(
        &mut self,
        mesh: MeshKind,
        textures: Vec<TextureKind>,
        position: Vec3,
        scale: f32,
        rotation: Vec3,
        wiggle_strength: f32,
        assignment: ShaderAssignment,
    ) {
        let transform = Transform::from_position(position)
            .rotation(rotation)
            .uniform_scale(scale);
        let mut model = Model::new(mesh, textures, transform);
        model.wiggle_strength = wiggle_strength;

        match assignment.lit_kind() {
            None => self.transparent.push(model),
            Some(kind) => {
                if mesh == MeshKind::Torus {
                    self.featured[kind.index()].push(model);
                } else {
                    self.models[kind.index()].push(model);
                }
            }
        }
    }

    /// Creates a light in the bounded bank. Returns `None` (and leaves
    /// existing lights untouched) when that kind's capacity is exhausted.
    pub fn new_light(
        &mut self,
        kind: LightKind,
        colour: Vec3,
        position: Vec3,
        strength: f32,
        face_toward: Vec3,
    ) -> Option<&mut Light> {
        self.lights
            .add(Light::new(kind, colour, position, strength, face_toward))
    }

    /// Places a portal and immediately allocates its render surface. A
    /// failed allocation leaves the portal registered but unusable; the
    /// failure is visible only through the portal's own status.
    pub fn new_portal(&mut self, gpu: &GpuContext, position: Vec3, rotation: Vec3) {
        if self.portals.len() >= MAX_PORTALS {
            log::warn!("portal capacity ({MAX_PORTALS}) reached; portal not created");
            return;
        }

        let mut portal = Portal::new(position, rotation);
        if let Err(err) = portal.create_surface(gpu, &SurfaceDesc::portal(gpu)) {
            log::error!("portal surface allocation failed: {err}");
        }
        self.portals.push(portal);
    }

    /// Registers an externally loaded mesh with the asset catalog.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshKind {
        self.assets.add_mesh(mesh)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn lights(&self) -> &LightBank {
        &self.lights
    }

    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    /// Per-frame update: featured-model control, the orbiting spotlight,
    /// camera and portal-camera control, and the wiggle timer.
    pub fn update(&mut self, input: &Input, frame_time: f32) {
        let mut orbit_target = Vec3::ZERO;
        for bucket in &mut self.featured {
            if let Some(model) = bucket.first_mut() {
                model.control(input, frame_time, &ModelKeys::ijkl());
                orbit_target = model.position();
                break;
            }
        }

        // The first spotlight circles the featured model and keeps facing it.
        if let Some(spot) = self.lights.spots_mut().first_mut() {
            let offset = Vec3::new(
                self.orbit_angle.cos() * LIGHT_ORBIT_RADIUS,
                10.0,
                self.orbit_angle.sin() * LIGHT_ORBIT_RADIUS,
            );
            spot.set_position(orbit_target + offset);
            spot.face_target(orbit_target);
        }
        if !self.orbit_paused {
            self.orbit_angle -= LIGHT_ORBIT_SPEED * frame_time;
        }
        if input.key_pressed(KeyCode::Digit1) {
            self.orbit_paused = !self.orbit_paused;
        }

        self.camera.control(input, frame_time, &CameraKeys::arrows_wasd());

        if let Some(portal) = self.portals.first_mut() {
            portal.control_camera(input, frame_time, &CameraKeys::tfgh());
        }

        self.wiggle_timer += frame_time;
    }

    /// Total draws one lit-scene render can issue; used to size the model
    /// uniform ring.
    pub(crate) fn drawables_per_pass(&self) -> usize {
        let bucketed: usize = self
            .models
            .iter()
            .chain(self.featured.iter())
            .map(Vec::len)
            .sum();
        let lights = self.lights.iter().count();
        bucketed + self.transparent.len() + self.portals.len() + lights
    }
}
