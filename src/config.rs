//! JSON scene files
//!
//! ```json
//! {
//!   "camera": { "position": [15, 8, 15], "target": [0, 0.5, 0], "fovy": 45 },
//!   "sky": { "sun_direction": [-0.5, -1, -0.5], "sun_intensity": 0.5 },
//!   "spheres": [
//!     { "position": [-6, 1, 0], "radius": 1,
//!       "material": { "emission_color": [255, 255, 255, 255], "emission_strength": 1 } }
//!   ],
//!   "models": [
//!     { "shape": { "kind": "cube", "size": 2 }, "translation": [0, 1, -4],
//!       "rotation_degrees": [0, 45, 0] }
//!   ]
//! }
//! ```
//!
//! Every section is optional; unknown fields are rejected.

use anyhow::{bail, Context, Result};
use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::camera::Camera;
use crate::loaders::load_gltf_model;
use crate::math::Rgba8;
use crate::mesh::Model;
use crate::scene::{Scene, SceneError, Sky};
use crate::scenes::SceneSetup;
use crate::types::{MaterialData, SphereData, MAX_TRIANGLES};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFile {
    #[serde(default)]
    pub camera: Option<Camera>,
    #[serde(default)]
    pub sky: Sky,
    #[serde(default)]
    pub spheres: Vec<SphereConfig>,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MaterialConfig {
    pub color: Rgba8,
    pub emission_color: Rgba8,
    pub emission_strength: f32,
    pub smoothness: f32,
    pub metallic: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            color: Rgba8::WHITE,
            emission_color: Rgba8::BLACK,
            emission_strength: 0.0,
            smoothness: 0.0,
            metallic: 0.0,
        }
    }
}

impl MaterialConfig {
    pub fn to_material(&self) -> MaterialData {
        MaterialData::new(
            self.color,
            self.emission_color,
            self.emission_strength,
            self.smoothness,
        )
        .with_metallic(self.metallic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SphereConfig {
    pub position: Vec3,
    pub radius: f32,
    #[serde(default)]
    pub material: MaterialConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ShapeConfig {
    Cube {
        size: f32,
    },
    Plane {
        width: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        #[serde(default = "default_rings")]
        rings: u32,
        #[serde(default = "default_segments")]
        segments: u32,
    },
    /// Path is resolved relative to the scene file
    Gltf {
        path: PathBuf,
    },
}

fn default_rings() -> u32 {
    16
}

fn default_segments() -> u32 {
    32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub shape: ShapeConfig,
    #[serde(default)]
    pub translation: Vec3,
    /// Euler angles applied in Y, X, Z order
    #[serde(default)]
    pub rotation_degrees: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub material: MaterialConfig,
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl ModelConfig {
    pub fn transform(&self) -> Mat4 {
        let r = self.rotation_degrees;
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            r.y.to_radians(),
            r.x.to_radians(),
            r.z.to_radians(),
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }

    fn build_model(&self, base_dir: &Path) -> Result<Model> {
        let model = match &self.shape {
            ShapeConfig::Cube { size } => Model::cube(*size),
            ShapeConfig::Plane { width, depth } => Model::plane(*width, *depth),
            ShapeConfig::Sphere {
                radius,
                rings,
                segments,
            } => {
                let requested = Model::uv_sphere_triangle_count(*rings, *segments).unwrap_or(usize::MAX);
                if requested > MAX_TRIANGLES {
                    return Err(SceneError::CapacityExceeded {
                        kind: "triangle",
                        requested,
                        capacity: MAX_TRIANGLES,
                    }
                    .into());
                }
                Model::uv_sphere(*radius, *rings, *segments)
            }
            ShapeConfig::Gltf { path } => load_gltf_model(base_dir.join(path))?,
        };
        Ok(model.with_transform(self.transform()))
    }
}

impl SceneFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid scene file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let file: SceneFile = serde_json::from_str(text)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<()> {
        if let Some(bad) = self.spheres.iter().find(|s| !(s.radius > 0.0)) {
            bail!("Sphere at {:?} has non-positive radius {}", bad.position, bad.radius);
        }
        if let Some(camera) = &self.camera {
            if !(camera.fovy > 0.0 && camera.fovy < 180.0) {
                bail!("Camera fovy must be between 0 and 180 degrees, got {}", camera.fovy);
            }
        }
        Ok(())
    }

    /// Populates a scene; `base_dir` anchors relative model paths
    pub fn build(&self, base_dir: &Path) -> Result<SceneSetup> {
        let mut scene = Scene::new();
        scene.set_sky(self.sky);

        for sphere in &self.spheres {
            scene.add_sphere(SphereData::new(
                sphere.position,
                sphere.radius,
                sphere.material.to_material(),
            ))?;
        }

        for (i, model) in self.models.iter().enumerate() {
            let mesh = model
                .build_model(base_dir)
                .with_context(|| format!("Failed to build model #{}", i))?;
            scene
                .add_model(&mesh, model.material.to_material())
                .with_context(|| format!("Model #{} does not fit in the scene", i))?;
        }

        let stats = scene.stats();
        log::info!(
            "Scene file built: {} spheres, {} meshes, {} triangles",
            stats.spheres,
            stats.meshes,
            stats.triangles
        );

        Ok(SceneSetup {
            scene,
            camera: self.camera.unwrap_or_default(),
        })
    }
}

/// Loads and builds a scene file in one step
pub fn load_scene_file(path: impl AsRef<Path>) -> Result<SceneSetup> {
    let path = path.as_ref();
    let file = SceneFile::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    file.build(base_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_valid() {
        let file = SceneFile::from_json("{}").unwrap();
        assert_eq!(file, SceneFile::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(SceneFile::from_json(r#"{ "lights": [] }"#).is_err());
        assert!(SceneFile::from_json(
            r#"{ "spheres": [{ "position": [0, 0, 0], "radius": 1, "mass": 3 }] }"#
        )
        .is_err());
    }

    #[test]
    fn test_model_transform_applies_scale_rotation_translation() {
        let model = ModelConfig {
            shape: ShapeConfig::Cube { size: 1.0 },
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation_degrees: Vec3::new(0.0, 90.0, 0.0),
            scale: Vec3::splat(2.0),
            material: MaterialConfig::default(),
        };
        let p = model.transform().transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_nonpositive_radius_rejected() {
        let err = SceneFile::from_json(r#"{ "spheres": [{ "position": [0, 0, 0], "radius": 0 }] }"#)
            .unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn test_zero_scale_model_rejected() {
        let file = SceneFile::from_json(
            r#"{ "models": [{ "shape": { "kind": "plane", "width": 2, "depth": 2 }, "scale": [1, 0, 1] }] }"#,
        )
        .unwrap();
        let err = file.build(Path::new(".")).unwrap_err();
        assert!(matches!(
            err.root_cause().downcast_ref::<SceneError>(),
            Some(SceneError::MalformedMesh { .. })
        ));
    }

    #[test]
    fn test_oversized_sphere_rejected_before_tessellation() {
        let file = SceneFile::from_json(
            r#"{ "models": [{ "shape": { "kind": "sphere", "radius": 1, "rings": 70000, "segments": 70000 } }] }"#,
        )
        .unwrap();
        let err = file.build(Path::new(".")).unwrap_err();
        assert!(matches!(
            err.root_cause().downcast_ref::<SceneError>(),
            Some(SceneError::CapacityExceeded { kind: "triangle", .. })
        ));
    }
}
