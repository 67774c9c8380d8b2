//! Scene ownership and per-frame render orchestration.

mod frame;
mod manager;
mod render;
mod setup;

pub use frame::{FramePlan, FrameUniforms, ModelUniforms, Pass, UniformRing};
pub use manager::{MAX_PORTALS, SHADOW_MAP_SIZE, SceneManager};
pub use setup::populate_demo_scene;

use thiserror::Error;

use crate::geometry::GeometryError;
use crate::target::TargetError;

/// Fatal scene-initialization failures. Setup aborts on the first one and
/// reports it upward; there is no retry.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("render target allocation failed: {0}")]
    Target(#[from] TargetError),
    #[error("geometry load failed: {0}")]
    Geometry(#[from] GeometryError),
}
