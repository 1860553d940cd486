use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Mat4, Quat, Vec3};
use path_tracer::mesh::Model;
use path_tracer::scene::Scene;
use path_tracer::types::MaterialData;

fn bench_flatten_uv_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten_uv_sphere");

    for (rings, segments) in [(8, 16), (32, 64), (64, 128)] {
        let model = Model::uv_sphere(1.0, rings, segments).with_transform(
            Mat4::from_scale_rotation_translation(
                Vec3::splat(2.0),
                Quat::from_rotation_y(0.7),
                Vec3::new(1.0, 2.0, 3.0),
            ),
        );

        group.bench_with_input(
            BenchmarkId::from_parameter(model.triangle_count()),
            &model,
            |b, model| {
                b.iter(|| {
                    let mut scene = Scene::new();
                    scene
                        .add_model(black_box(model), MaterialData::default())
                        .unwrap();
                    black_box(scene.stats())
                })
            },
        );
    }

    group.finish();
}

fn bench_many_cubes(c: &mut Criterion) {
    let cubes: Vec<Model> = (0..60)
        .map(|i| {
            Model::cube(1.0).with_transform(Mat4::from_translation(Vec3::new(i as f32 * 1.5, 0.5, 0.0)))
        })
        .collect();

    c.bench_function("flatten_60_cubes", |b| {
        b.iter(|| {
            let mut scene = Scene::new();
            for cube in &cubes {
                scene.add_model(black_box(cube), MaterialData::default()).unwrap();
            }
            black_box(scene.triangles().len())
        })
    });
}

fn bench_sky_upload_prep(c: &mut Criterion) {
    let scene = Scene::new();
    c.bench_function("sky_to_uniform", |b| b.iter(|| black_box(scene.sky.to_uniform())));
}

criterion_group!(benches, bench_flatten_uv_sphere, bench_many_cubes, bench_sky_upload_prep);
criterion_main!(benches);
