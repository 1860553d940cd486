use glam::{Mat4, Quat, Vec3};

use super::SceneSetup;
use crate::camera::Camera;
use crate::math::{hsv_to_rgb, Rgba8};
use crate::mesh::Model;
use crate::scene::{Scene, SceneError, Sky};
use crate::types::{MaterialData, SphereData};

const SPHERE_COUNT: usize = 7;

/// Smoothness ramp of coloured spheres on a floor, a cube and an overhead light
pub fn create_showcase_scene() -> Result<SceneSetup, SceneError> {
    let mut scene = Scene::new();
    scene.set_sky(Sky::default());

    let floor = Model::plane(40.0, 40.0);
    scene.add_model(&floor, MaterialData::diffuse(Rgba8::GRAY))?;

    for i in 0..SPHERE_COUNT {
        let t = i as f32 / (SPHERE_COUNT - 1) as f32;
        let color = Rgba8::from_floats(hsv_to_rgb(t * 0.8, 0.7, 0.9));
        let x = (i as f32 - (SPHERE_COUNT - 1) as f32 * 0.5) * 2.5;
        scene.add_sphere(SphereData::new(
            Vec3::new(x, 1.0, 0.0),
            1.0,
            MaterialData::glossy(color, t),
        ))?;
    }

    scene.add_sphere(SphereData::new(
        Vec3::new(0.0, 12.0, -6.0),
        4.0,
        MaterialData::emissive(Rgba8::WHITE, 4.0),
    ))?;

    let cube = Model::cube(2.5).with_transform(Mat4::from_rotation_translation(
        Quat::from_rotation_y(35f32.to_radians()),
        Vec3::new(0.0, 1.25, -5.0),
    ));
    scene.add_model(&cube, MaterialData::glossy(Rgba8::GOLD, 0.9).with_metallic(1.0))?;

    let camera = Camera::new(Vec3::new(0.0, 4.0, 16.0), Vec3::new(0.0, 1.0, 0.0));

    Ok(SceneSetup { scene, camera })
}
