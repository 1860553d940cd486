use glam::Vec3;

use super::SceneSetup;
use crate::camera::Camera;
use crate::math::Rgba8;
use crate::scene::{Scene, SceneError, Sky};
use crate::types::{MaterialData, SphereData};

/// Three unit spheres in a row; the leftmost one is the light source
pub fn create_spheres_scene() -> Result<SceneSetup, SceneError> {
    let mut scene = Scene::new();
    scene.set_sky(Sky::default());

    scene.add_sphere(SphereData::new(
        Vec3::new(-6.0, 1.0, 0.0),
        1.0,
        MaterialData::emissive(Rgba8::WHITE, 1.0),
    ))?;
    scene.add_sphere(SphereData::new(
        Vec3::new(-3.0, 1.0, 0.0),
        1.0,
        MaterialData::diffuse(Rgba8::WHITE),
    ))?;
    scene.add_sphere(SphereData::new(
        Vec3::new(0.0, 1.0, 0.0),
        1.0,
        MaterialData::diffuse(Rgba8::WHITE),
    ))?;

    Ok(SceneSetup {
        scene,
        camera: Camera::default(),
    })
}
