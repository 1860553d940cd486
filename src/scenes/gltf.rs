use anyhow::Result;
use glam::Vec3;
use std::path::Path;

use super::SceneSetup;
use crate::camera::Camera;
use crate::loaders::load_gltf_model;
use crate::math::{Aabb, Rgba8};
use crate::mesh::Model;
use crate::scene::{Scene, Sky};
use crate::types::MaterialData;

/// A glTF model on a floor plane, framed by a camera fitted to its bounds
pub fn create_gltf_scene(path: &Path) -> Result<SceneSetup> {
    let model = load_gltf_model(path)?;

    let mut scene = Scene::new();
    scene.set_sky(Sky::default());
    let meshes = scene.add_model(&model, MaterialData::diffuse(Rgba8::WHITE))?;

    let bounds = scene.meshes()[meshes]
        .iter()
        .fold(Aabb::empty(), |acc, mesh| {
            acc.union(&Aabb::new(
                Vec3::from_array(mesh.bounds_min),
                Vec3::from_array(mesh.bounds_max),
            ))
        });

    let extent = (bounds.max - bounds.min).max_element().max(1.0);
    let floor = Model::plane(extent * 10.0, extent * 10.0).with_transform(
        glam::Mat4::from_translation(Vec3::new(bounds.center().x, bounds.min.y, bounds.center().z)),
    );
    scene.add_model(&floor, MaterialData::diffuse(Rgba8::GRAY))?;

    let center = bounds.center();
    let camera = Camera::new(center + Vec3::new(1.0, 0.6, 1.0) * extent * 1.5, center);

    Ok(SceneSetup { scene, camera })
}
