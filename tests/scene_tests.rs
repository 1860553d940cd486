use glam::{Mat4, Quat, Vec3};
use path_tracer::math::Rgba8;
use path_tracer::mesh::{MeshGeometry, Model};
use path_tracer::scene::{Scene, SceneError};
use path_tracer::types::{MaterialData, SphereData, MAX_MESHES, MAX_SPHERES, MAX_TRIANGLES};

fn single_triangle() -> MeshGeometry {
    MeshGeometry::new(
        vec![Vec3::ZERO, Vec3::X, Vec3::Z],
        vec![Vec3::Y; 3],
        Some(vec![0, 1, 2]),
    )
}

#[cfg(test)]
mod scene_tests {
    use super::*;

    #[test]
    fn test_meshes_get_consecutive_triangle_ranges() {
        let mut scene = Scene::new();
        let model = Model::new(vec![single_triangle(), single_triangle(), single_triangle()]);
        scene.add_model(&Model::cube(1.0), MaterialData::default()).unwrap();
        let slots = scene.add_model(&model, MaterialData::default()).unwrap();

        assert_eq!(slots, 1..4);
        let meshes = scene.meshes();
        assert_eq!(meshes[0].first_triangle_index, 0);
        assert_eq!(meshes[0].num_triangles, 12);
        for (i, mesh) in meshes[1..].iter().enumerate() {
            assert_eq!(mesh.first_triangle_index, 12 + i as u32);
            assert_eq!(mesh.num_triangles, 1);
        }
        assert_eq!(scene.stats().triangles, 15);
    }

    #[test]
    fn test_positions_transformed_and_normals_only_rotated() {
        let mut scene = Scene::new();
        let transform = Mat4::from_scale_rotation_translation(
            Vec3::splat(3.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::new(10.0, 0.0, 0.0),
        );
        let model = Model::new(vec![single_triangle()]).with_transform(transform);
        scene.add_model(&model, MaterialData::default()).unwrap();

        let tri = scene.triangles()[0];
        let [a, b, _] = tri.positions();
        assert!((a - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-4);
        assert!((b - Vec3::new(10.0, 3.0, 0.0)).length() < 1e-4);

        // +Y rotated 90 degrees about Z points to -X, still unit length
        for n in tri.normals() {
            assert!((n - Vec3::NEG_X).length() < 1e-4);
        }
    }

    #[test]
    fn test_bounds_cover_world_space_triangles() {
        let mut scene = Scene::new();
        let model = Model::cube(2.0).with_transform(Mat4::from_translation(Vec3::new(5.0, 1.0, -2.0)));
        scene.add_model(&model, MaterialData::default()).unwrap();

        let mesh = scene.meshes()[0];
        assert_eq!(Vec3::from_array(mesh.bounds_min), Vec3::new(4.0, 0.0, -3.0));
        assert_eq!(Vec3::from_array(mesh.bounds_max), Vec3::new(6.0, 2.0, -1.0));
    }

    #[test]
    fn test_missing_normals_fall_back_to_face_normal() {
        let mut scene = Scene::new();
        let mesh = MeshGeometry::new(vec![Vec3::ZERO, Vec3::Z, Vec3::X], Vec::new(), None);
        scene.add_model(&Model::new(vec![mesh]), MaterialData::default()).unwrap();

        for n in scene.triangles()[0].normals() {
            assert!((n - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn test_sphere_capacity_enforced() {
        let mut scene = Scene::new();
        for _ in 0..MAX_SPHERES {
            scene
                .add_sphere(SphereData::new(Vec3::ZERO, 1.0, MaterialData::default()))
                .unwrap();
        }
        let err = scene
            .add_sphere(SphereData::new(Vec3::ZERO, 1.0, MaterialData::default()))
            .unwrap_err();
        assert_eq!(
            err,
            SceneError::CapacityExceeded {
                kind: "sphere",
                requested: MAX_SPHERES + 1,
                capacity: MAX_SPHERES,
            }
        );
        assert_eq!(scene.spheres().len(), MAX_SPHERES);
    }

    #[test]
    fn test_mesh_capacity_enforced_all_or_nothing() {
        let mut scene = Scene::new();
        let many = Model::new(vec![single_triangle(); MAX_MESHES - 1]);
        scene.add_model(&many, MaterialData::default()).unwrap();

        let two = Model::new(vec![single_triangle(); 2]);
        let err = scene.add_model(&two, MaterialData::default()).unwrap_err();
        assert!(matches!(err, SceneError::CapacityExceeded { kind: "mesh", .. }));
        assert_eq!(scene.meshes().len(), MAX_MESHES - 1);
        assert_eq!(scene.triangles().len(), MAX_MESHES - 1);
    }

    #[test]
    fn test_triangle_capacity_enforced() {
        let mut scene = Scene::new();
        // 2 * rings * segments triangles
        let too_big = Model::uv_sphere(1.0, 64, 129);
        assert!(too_big.triangle_count() > MAX_TRIANGLES);

        let err = scene.add_model(&too_big, MaterialData::default()).unwrap_err();
        assert!(matches!(err, SceneError::CapacityExceeded { kind: "triangle", .. }));
        assert!(scene.triangles().is_empty());
        assert!(scene.meshes().is_empty());
    }

    #[test]
    fn test_malformed_mesh_rejected() {
        let mut scene = Scene::new();
        let bad = MeshGeometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], Vec::new(), Some(vec![0, 1, 7]));
        let err = scene.add_model(&Model::new(vec![bad]), MaterialData::default()).unwrap_err();
        assert!(matches!(err, SceneError::MalformedMesh { .. }));
    }

    #[test]
    fn test_flattened_plane_transform_rejected() {
        let mut scene = Scene::new();
        let flat = Model::plane(2.0, 2.0).with_transform(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)));
        let err = scene.add_model(&flat, MaterialData::default()).unwrap_err();
        assert!(matches!(err, SceneError::MalformedMesh { .. }));
        assert!(scene.triangles().is_empty());
        assert!(scene.meshes().is_empty());
    }

    #[test]
    fn test_non_finite_transform_rejected() {
        let mut scene = Scene::new();
        let broken = Model::cube(1.0).with_transform(Mat4::from_translation(Vec3::new(f32::NAN, 0.0, 0.0)));
        assert!(scene.add_model(&broken, MaterialData::default()).is_err());
    }

    #[test]
    fn test_mesh_material_recorded() {
        let mut scene = Scene::new();
        let material = MaterialData::glossy(Rgba8::RED, 0.5);
        scene.add_model(&Model::plane(1.0, 1.0), material).unwrap();
        assert_eq!(scene.meshes()[0].material, material);
        assert_eq!(scene.meshes()[0].material.color, [230.0 / 255.0, 41.0 / 255.0, 55.0 / 255.0, 1.0]);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut scene = Scene::new();
        scene.add_model(&Model::cube(1.0), MaterialData::default()).unwrap();
        scene
            .add_sphere(SphereData::new(Vec3::ZERO, 1.0, MaterialData::default()))
            .unwrap();
        scene.clear();
        assert_eq!(scene.stats().spheres + scene.stats().meshes + scene.stats().triangles, 0);
    }
}
