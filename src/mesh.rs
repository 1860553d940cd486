use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};

use crate::scene::SceneError;

/// Vertex data of one mesh in model space
///
/// `indices` of `None` means the positions form a plain triangle list.
/// An empty `normals` vector means flat face normals are generated on demand.
#[derive(Debug, Clone, Default)]
pub struct MeshGeometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Option<Vec<u32>>,
}

impl MeshGeometry {
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, indices: Option<Vec<u32>>) -> Self {
        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Vertex indices of triangle `i`
    pub fn triangle_indices(&self, i: usize) -> [usize; 3] {
        match &self.indices {
            Some(indices) => [
                indices[i * 3] as usize,
                indices[i * 3 + 1] as usize,
                indices[i * 3 + 2] as usize,
            ],
            None => [i * 3, i * 3 + 1, i * 3 + 2],
        }
    }

    /// Checks index bounds and normal count before the mesh is flattened
    pub fn validate(&self) -> Result<(), SceneError> {
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(SceneError::MalformedMesh {
                reason: format!(
                    "{} normals for {} positions",
                    self.normals.len(),
                    self.positions.len()
                ),
            });
        }

        if let Some(indices) = &self.indices {
            if indices.len() % 3 != 0 {
                return Err(SceneError::MalformedMesh {
                    reason: format!("index count {} is not a multiple of 3", indices.len()),
                });
            }
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= self.positions.len()) {
                return Err(SceneError::MalformedMesh {
                    reason: format!("index {} out of range for {} vertices", bad, self.positions.len()),
                });
            }
        } else if self.positions.len() % 3 != 0 {
            return Err(SceneError::MalformedMesh {
                reason: format!("vertex count {} is not a multiple of 3", self.positions.len()),
            });
        }

        Ok(())
    }

    /// Positions and normals of triangle `i` in model space
    pub fn triangle(&self, i: usize) -> ([Vec3; 3], [Vec3; 3]) {
        let [a, b, c] = self.triangle_indices(i);
        let positions = [self.positions[a], self.positions[b], self.positions[c]];

        let normals = if self.normals.is_empty() {
            let face = (positions[1] - positions[0])
                .cross(positions[2] - positions[0])
                .normalize_or_zero();
            [face; 3]
        } else {
            [self.normals[a], self.normals[b], self.normals[c]]
        };

        (positions, normals)
    }
}

/// One or more meshes placed in the world by a shared transform
#[derive(Debug, Clone)]
pub struct Model {
    pub meshes: Vec<MeshGeometry>,
    pub transform: Mat4,
}

impl Model {
    pub fn new(meshes: Vec<MeshGeometry>) -> Self {
        Self {
            meshes,
            transform: Mat4::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshGeometry::triangle_count).sum()
    }

    /// Axis-aligned cube centred on the origin, four vertices per face
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in faces {
            let base = positions.len() as u32;
            let center = normal * h;
            positions.extend([
                center - u * h - v * h,
                center + u * h - v * h,
                center + u * h + v * h,
                center - u * h + v * h,
            ]);
            normals.extend([normal; 4]);
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(vec![MeshGeometry::new(positions, normals, Some(indices))])
    }

    /// Flat rectangle on the XZ plane facing +Y
    pub fn plane(width: f32, depth: f32) -> Self {
        let (hw, hd) = (width * 0.5, depth * 0.5);
        let positions = vec![
            Vec3::new(-hw, 0.0, -hd),
            Vec3::new(-hw, 0.0, hd),
            Vec3::new(hw, 0.0, hd),
            Vec3::new(hw, 0.0, -hd),
        ];
        let normals = vec![Vec3::Y; 4];
        let indices = vec![0, 1, 2, 0, 2, 3];

        Self::new(vec![MeshGeometry::new(positions, normals, Some(indices))])
    }

    /// Triangles `uv_sphere` would generate, or `None` if the count overflows
    pub fn uv_sphere_triangle_count(rings: u32, segments: u32) -> Option<usize> {
        let rings = rings.max(2) as usize;
        let segments = segments.max(3) as usize;
        rings.checked_mul(segments)?.checked_mul(2)
    }

    /// Latitude/longitude sphere with smooth normals
    ///
    /// Callers taking `rings`/`segments` from untrusted input should bound
    /// them with `uv_sphere_triangle_count` first.
    pub fn uv_sphere(radius: f32, rings: u32, segments: u32) -> Self {
        let rings = rings.max(2);
        let segments = segments.max(3);

        let mut positions = Vec::with_capacity((rings as usize + 1) * (segments as usize + 1));
        let mut normals = Vec::with_capacity(positions.capacity());

        for ring in 0..=rings {
            let theta = ring as f32 / rings as f32 * PI;
            for seg in 0..=segments {
                let phi = seg as f32 / segments as f32 * TAU;
                let normal = Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
                positions.push(normal * radius);
                normals.push(normal);
            }
        }

        let stride = segments + 1;
        let indices = (0..rings)
            .flat_map(|ring| {
                (0..segments).flat_map(move |seg| {
                    let a = ring * stride + seg;
                    let b = a + stride;
                    [a, b, a + 1, a + 1, b, b + 1]
                })
            })
            .collect();

        Self::new(vec![MeshGeometry::new(positions, normals, Some(indices))])
    }
}
