//! # Portico
//!
//! A small multi-pass 3D scene renderer: shadow-mapped spotlights, live
//! portal viewports, and a batched main pass, driven by a single-threaded
//! scene manager.
//!
//! Each frame renders in a strict sequence: a depth-only shadow pass per
//! spotlight, a full lit-scene pass per portal (through the portal's own
//! camera, into the portal's own texture), and finally the main pass, which
//! samples the portal textures on their panels and the shadow maps for
//! lighting. Scene content lives in fixed-capacity pools and shader-keyed
//! buckets; GPU resources are allocated once at startup and reused every
//! frame.
//!
//! The demo binary lays out a showcase scene; see [`scene::SceneManager`]
//! for the factories (`new_model`, `new_light`, `new_portal`) to build your
//! own.

mod app;
mod assets;
mod camera;
mod geometry;
mod gpu;
mod input;
mod light;
mod mesh;
mod model;
mod pipeline;
mod portal;
pub mod scene;
mod target;
mod texture;
mod transform;

pub use app::run;
pub use assets::{Assets, MeshKind, TextureKind};
pub use camera::Camera;
pub use geometry::{GeometryError, RawGeometry};
pub use gpu::{DEPTH_FORMAT, GpuContext};
pub use input::{CameraKeys, Input, ModelKeys};
pub use light::{
    Light, LightBank, LightKind, MAX_DIRECTIONAL_LIGHTS, MAX_POINT_LIGHTS, MAX_SPOTLIGHTS,
    SpotShadow,
};
pub use mesh::{Mesh, Vertex3d};
pub use model::Model;
pub use pipeline::{CullMode, Pipelines, ShaderAssignment, ShaderKind};
pub use portal::Portal;
pub use scene::{SceneError, SceneManager, populate_demo_scene};
pub use target::{DepthTarget, PortalSurface, ShadowAtlas, SurfaceDesc, TargetError};
pub use texture::Texture;
pub use transform::Transform;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

// Re-export commonly used winit types for convenience
pub use winit::keyboard::KeyCode;
