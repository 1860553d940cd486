use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

use crate::math::{Aabb, Rgba8};
use crate::mesh::Model;
use crate::types::{
    MaterialData, MeshData, SkyUniform, SphereData, TriangleData, MAX_MESHES, MAX_SPHERES,
    MAX_TRIANGLES,
};

/// Errors raised while assembling a scene
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Adding the requested items would overflow a fixed GPU buffer
    #[error("{kind} capacity exceeded: {requested} requested, capacity is {capacity}")]
    CapacityExceeded {
        kind: &'static str,
        requested: usize,
        capacity: usize,
    },

    /// Mesh vertex data is inconsistent
    #[error("Malformed mesh: {reason}")]
    MalformedMesh { reason: String },
}

/// Sky gradient and sun parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Sky {
    pub zenith: Rgba8,
    pub horizon: Rgba8,
    pub ground: Rgba8,
    pub sun_color: Rgba8,
    pub sun_direction: [f32; 3],
    pub sun_focus: f32,
    pub sun_intensity: f32,
}

impl Default for Sky {
    fn default() -> Self {
        Self {
            zenith: Rgba8::SKYBLUE,
            horizon: Rgba8::SKYBLUE,
            ground: Rgba8::BROWN,
            sun_color: Rgba8::ORANGE,
            sun_direction: [-0.5, -1.0, -0.5],
            sun_focus: 1.0,
            sun_intensity: 0.5,
        }
    }
}

impl Sky {
    pub fn to_uniform(&self) -> SkyUniform {
        SkyUniform {
            sky_color_zenith: self.zenith.to_vec4(),
            sky_color_horizon: self.horizon.to_vec4(),
            ground_color: self.ground.to_vec4(),
            sun_color: self.sun_color.to_vec4(),
            sun_direction: Vec3::from_array(self.sun_direction)
                .normalize_or(Vec3::NEG_Y)
                .to_array(),
            sun_focus: self.sun_focus,
            sun_intensity: self.sun_intensity,
            _pad: [0.0; 3],
        }
    }
}

/// Counts reported in logs and the debug overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub spheres: usize,
    pub meshes: usize,
    pub triangles: usize,
}

/// Flat, capacity-bounded scene tables mirrored into GPU buffers
#[derive(Debug, Clone, Default)]
pub struct Scene {
    spheres: Vec<SphereData>,
    triangles: Vec<TriangleData>,
    meshes: Vec<MeshData>,
    pub sky: Sky,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spheres(&self) -> &[SphereData] {
        &self.spheres
    }

    pub fn triangles(&self) -> &[TriangleData] {
        &self.triangles
    }

    pub fn meshes(&self) -> &[MeshData] {
        &self.meshes
    }

    pub fn stats(&self) -> SceneStats {
        SceneStats {
            spheres: self.spheres.len(),
            meshes: self.meshes.len(),
            triangles: self.triangles.len(),
        }
    }

    pub fn set_sky(&mut self, sky: Sky) {
        self.sky = sky;
    }

    /// Adds a sphere and returns its slot
    pub fn add_sphere(&mut self, sphere: SphereData) -> Result<usize, SceneError> {
        check_capacity("sphere", self.spheres.len() + 1, MAX_SPHERES)?;
        self.spheres.push(sphere);
        Ok(self.spheres.len() - 1)
    }

    /// Flattens every mesh of `model` into world-space triangles
    ///
    /// Positions go through the full model transform; normals are only rotated,
    /// using the rotation part of the decomposed transform. One `MeshData`
    /// record is appended per mesh. Nothing is added unless the whole model fits
    /// and its transform is invertible.
    /// Returns the range of mesh slots that were filled.
    pub fn add_model(
        &mut self,
        model: &Model,
        material: MaterialData,
    ) -> Result<Range<usize>, SceneError> {
        for mesh in &model.meshes {
            mesh.validate()?;
        }
        check_capacity(
            "triangle",
            self.triangles.len() + model.triangle_count(),
            MAX_TRIANGLES,
        )?;
        check_capacity("mesh", self.meshes.len() + model.meshes.len(), MAX_MESHES)?;

        let determinant = model.transform.determinant();
        if determinant == 0.0 || !determinant.is_finite() {
            return Err(SceneError::MalformedMesh {
                reason: format!("model transform is not invertible (determinant {})", determinant),
            });
        }

        let (_, rotation, _) = model.transform.to_scale_rotation_translation();
        let first_mesh = self.meshes.len();

        for mesh in &model.meshes {
            let first_triangle = self.triangles.len();
            let mut bounds = Aabb::empty();

            for i in 0..mesh.triangle_count() {
                let (positions, normals) = mesh.triangle(i);
                let positions = positions.map(|p| model.transform.transform_point3(p));
                let normals = normals.map(|n| rotation * n);

                bounds = positions.iter().fold(bounds, |b, p| b.grow(*p));
                self.triangles.push(TriangleData::new(positions, normals));
            }

            let num_triangles = self.triangles.len() - first_triangle;
            let (bounds_min, bounds_max) = if bounds.is_empty() {
                (Vec3::ZERO, Vec3::ZERO)
            } else {
                (bounds.min, bounds.max)
            };

            self.meshes.push(MeshData::new(
                model.transform,
                first_triangle as u32,
                num_triangles as u32,
                bounds_min,
                bounds_max,
                material,
            ));
        }

        log::debug!(
            "Flattened model: {} meshes, {} triangles (scene total {})",
            model.meshes.len(),
            model.triangle_count(),
            self.triangles.len()
        );

        Ok(first_mesh..self.meshes.len())
    }

    pub fn clear(&mut self) {
        self.spheres.clear();
        self.triangles.clear();
        self.meshes.clear();
    }
}

fn check_capacity(kind: &'static str, requested: usize, capacity: usize) -> Result<(), SceneError> {
    if requested > capacity {
        Err(SceneError::CapacityExceeded {
            kind,
            requested,
            capacity,
        })
    } else {
        Ok(())
    }
}
