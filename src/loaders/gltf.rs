use anyhow::{bail, Context, Result};
use glam::{Mat3, Mat4, Vec3};
use std::path::Path;

use crate::mesh::{MeshGeometry, Model};

/// Loads every triangle primitive of a glTF file as one `Model`
///
/// Node transforms are baked into the vertex data, so the returned model has
/// an identity transform and can be placed freely afterwards.
pub fn load_gltf_model(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {}", path.display());

    let (gltf, buffers, _images) = gltf::import(path)
        .with_context(|| format!("Failed to load glTF file: {}", path.display()))?;

    log::debug!(
        "glTF loaded: {} scenes, {} nodes, {} meshes",
        gltf.scenes().count(),
        gltf.nodes().count(),
        gltf.meshes().count()
    );

    let mut meshes = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            process_node(&node, &buffers, Mat4::IDENTITY, &mut meshes)?;
        }
    }

    if meshes.is_empty() {
        bail!("glTF file {} contains no triangle geometry", path.display());
    }

    let model = Model::new(meshes);
    log::info!(
        "Extracted {} meshes / {} triangles from {}",
        model.meshes.len(),
        model.triangle_count(),
        path.display()
    );
    Ok(model)
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: Mat4,
    meshes: &mut Vec<MeshGeometry>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, global_transform, meshes)?;
    }

    for child in node.children() {
        process_node(&child, buffers, global_transform, meshes)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: Mat4,
    meshes: &mut Vec<MeshGeometry>,
) -> Result<()> {
    let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping {:?} primitive in mesh {:?}",
                primitive.mode(),
                mesh.name()
            );
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(|p| transform.transform_point3(Vec3::from_array(p)))
            .collect();

        let normals: Vec<Vec3> = match reader.read_normals() {
            Some(normals) => normals
                .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero())
                .collect(),
            None => Vec::new(),
        };

        let indices = reader.read_indices().map(|i| i.into_u32().collect());

        meshes.push(MeshGeometry::new(positions, normals, indices));
    }

    Ok(())
}
