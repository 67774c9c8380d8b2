//! The built-in showcase scene.

use glam::Vec3;

use crate::assets::{MeshKind, TextureKind};
use crate::gpu::GpuContext;
use crate::light::LightKind;
use crate::pipeline::ShaderAssignment;
use crate::scene::SceneManager;

/// Lays out the demo: a ground plane, a cluster of cubes exercising each
/// shader assignment, the controllable torus, two lights, and one portal.
pub fn populate_demo_scene(scene: &mut SceneManager, gpu: &GpuContext) {
    scene.new_model(
        MeshKind::Ground,
        vec![TextureKind::Grass],
        Vec3::ZERO,
        1.0,
        Vec3::ZERO,
        0.0,
        ShaderAssignment::PixelLighting,
    );
    // The featured model: controllable, rendered without culling.
    scene.new_model(
        MeshKind::Torus,
        vec![TextureKind::Metal],
        Vec3::new(15.0, 8.0, 0.0),
        1.0,
        Vec3::new(0.0, 215f32.to_radians(), 0.0),
        0.0,
        ShaderAssignment::PixelLighting,
    );
    scene.new_model(
        MeshKind::Cube,
        vec![TextureKind::Wood],
        Vec3::new(40.0, 3.0, 30.0),
        6.0,
        Vec3::new(0.0, -20f32.to_radians(), 0.0),
        0.0,
        ShaderAssignment::PixelLighting,
    );
    scene.new_model(
        MeshKind::Sphere,
        vec![TextureKind::Wood],
        Vec3::new(-20.0, 12.0, 20.0),
        4.0,
        Vec3::ZERO,
        6.0,
        ShaderAssignment::Wiggle,
    );
    scene.new_model(
        MeshKind::Cube,
        vec![TextureKind::Stone, TextureKind::BumpNormal],
        Vec3::new(40.0, 5.5, -10.0),
        5.0,
        Vec3::new(0.0, 45f32.to_radians(), 0.0),
        0.0,
        ShaderAssignment::NormalMap,
    );
    scene.new_model(
        MeshKind::Cube,
        vec![TextureKind::Stone, TextureKind::Checker],
        Vec3::new(40.0, 5.5, -30.0),
        5.0,
        Vec3::ZERO,
        0.0,
        ShaderAssignment::Fade,
    );
    scene.new_model(
        MeshKind::Cube,
        vec![TextureKind::Glass],
        Vec3::new(5.0, 10.0, 30.0),
        5.0,
        Vec3::new(0.0, 180f32.to_radians(), 0.0),
        0.0,
        ShaderAssignment::Transparent,
    );

    // The orbiting spotlight starts aimed at the featured torus; update()
    // keeps it circling.
    let _ = scene.new_light(
        LightKind::Spot {
            cone_angle: 90f32.to_radians(),
        },
        Vec3::new(0.8, 0.8, 1.0),
        Vec3::new(30.0, 20.0, 0.0),
        10.0,
        Vec3::new(15.0, 8.0, 0.0),
    );
    let _ = scene.new_light(
        LightKind::Point,
        Vec3::new(1.0, 0.8, 0.2),
        Vec3::new(-5.0, 30.0, -20.0),
        50.0,
        Vec3::ZERO,
    );

    scene.new_portal(
        gpu,
        Vec3::new(10.0, 15.0, 50.0),
        Vec3::new(0.0, 180f32.to_radians(), 0.0),
    );

    let camera = scene.camera_mut();
    camera.position = Vec3::new(15.0, 30.0, -70.0);
    camera.rotation = Vec3::new(13f32.to_radians(), 0.0, 0.0);
}
