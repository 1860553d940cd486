use glam::{Mat4, Quat, Vec3};

use super::SceneSetup;
use crate::camera::Camera;
use crate::math::Rgba8;
use crate::mesh::Model;
use crate::scene::{Scene, SceneError, Sky};
use crate::types::MaterialData;

/// Procedural meshes only: floor, tilted cubes and a tessellated sphere
pub fn create_mesh_scene() -> Result<SceneSetup, SceneError> {
    let mut scene = Scene::new();
    scene.set_sky(Sky::default());

    scene.add_model(&Model::plane(30.0, 30.0), MaterialData::diffuse(Rgba8::WHITE))?;

    let cubes = [
        (Vec3::new(-4.0, 1.0, 0.0), 0.0, Rgba8::RED),
        (Vec3::new(0.0, 1.0, 0.0), 30.0, Rgba8::GREEN),
        (Vec3::new(4.0, 1.0, 0.0), 60.0, Rgba8::BLUE),
    ];
    for (position, degrees, color) in cubes {
        let transform = Mat4::from_rotation_translation(
            Quat::from_rotation_y(f32::to_radians(degrees)),
            position,
        );
        scene.add_model(
            &Model::cube(2.0).with_transform(transform),
            MaterialData::diffuse(color),
        )?;
    }

    let ball = Model::uv_sphere(1.5, 16, 32)
        .with_transform(Mat4::from_translation(Vec3::new(0.0, 1.5, -5.0)));
    scene.add_model(&ball, MaterialData::glossy(Rgba8::WHITE, 0.95))?;

    let lamp = Model::uv_sphere(1.0, 8, 16)
        .with_transform(Mat4::from_translation(Vec3::new(0.0, 8.0, 0.0)));
    scene.add_model(&lamp, MaterialData::emissive(Rgba8::ORANGE, 6.0))?;

    let camera = Camera::new(Vec3::new(10.0, 6.0, 12.0), Vec3::new(0.0, 1.0, -1.0));

    Ok(SceneSetup { scene, camera })
}
