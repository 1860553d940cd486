use glam::{Mat4, Vec2, Vec3};

use crate::camera::Camera;
use crate::core::{Accumulator, RenderFlags};
use crate::math::Rgba8;
use crate::scene::Scene;

pub const MAX_SPHERES: usize = 64;
pub const MAX_MESHES: usize = 64;
pub const MAX_TRIANGLES: usize = 16384;

/// Surface material shared by spheres and meshes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialData {
    pub color: [f32; 4],
    pub emission_color: [f32; 4],
    pub emission_strength: f32,
    pub smoothness: f32,
    pub metallic: f32,
    pub _pad: f32,
}

impl MaterialData {
    pub fn new(color: Rgba8, emission_color: Rgba8, emission_strength: f32, smoothness: f32) -> Self {
        Self {
            color: color.to_vec4(),
            emission_color: emission_color.to_vec4(),
            emission_strength,
            smoothness: smoothness.clamp(0.0, 1.0),
            metallic: 0.0,
            _pad: 0.0,
        }
    }

    /// Matte, non-emissive surface
    pub fn diffuse(color: Rgba8) -> Self {
        Self::new(color, Rgba8::BLACK, 0.0, 0.0)
    }

    /// Light source; base colour is white so bounces pick up the emission tint
    pub fn emissive(emission_color: Rgba8, strength: f32) -> Self {
        Self::new(Rgba8::WHITE, emission_color, strength, 0.0)
    }

    pub fn glossy(color: Rgba8, smoothness: f32) -> Self {
        Self::new(color, Rgba8::BLACK, 0.0, smoothness)
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic.clamp(0.0, 1.0);
        self
    }

    pub fn is_emissive(&self) -> bool {
        self.emission_strength > 0.0
    }
}

impl Default for MaterialData {
    fn default() -> Self {
        Self::diffuse(Rgba8::WHITE)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereData {
    pub position: [f32; 3],
    pub radius: f32,
    pub material: MaterialData,
}

impl SphereData {
    pub fn new(position: Vec3, radius: f32, material: MaterialData) -> Self {
        Self {
            position: position.to_array(),
            radius,
            material,
        }
    }
}

/// World-space triangle with per-vertex normals, vec3s padded to 16 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TriangleData {
    pub pos_a: [f32; 3],
    pub _pad0: f32,
    pub pos_b: [f32; 3],
    pub _pad1: f32,
    pub pos_c: [f32; 3],
    pub _pad2: f32,
    pub normal_a: [f32; 3],
    pub _pad3: f32,
    pub normal_b: [f32; 3],
    pub _pad4: f32,
    pub normal_c: [f32; 3],
    pub _pad5: f32,
}

impl TriangleData {
    pub fn new(positions: [Vec3; 3], normals: [Vec3; 3]) -> Self {
        Self {
            pos_a: positions[0].to_array(),
            _pad0: 0.0,
            pos_b: positions[1].to_array(),
            _pad1: 0.0,
            pos_c: positions[2].to_array(),
            _pad2: 0.0,
            normal_a: normals[0].to_array(),
            _pad3: 0.0,
            normal_b: normals[1].to_array(),
            _pad4: 0.0,
            normal_c: normals[2].to_array(),
            _pad5: 0.0,
        }
    }

    pub fn positions(&self) -> [Vec3; 3] {
        [
            Vec3::from_array(self.pos_a),
            Vec3::from_array(self.pos_b),
            Vec3::from_array(self.pos_c),
        ]
    }

    pub fn normals(&self) -> [Vec3; 3] {
        [
            Vec3::from_array(self.normal_a),
            Vec3::from_array(self.normal_b),
            Vec3::from_array(self.normal_c),
        ]
    }
}

/// A contiguous run of triangles sharing one material and transform
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshData {
    pub transform: [[f32; 4]; 4],
    pub first_triangle_index: u32,
    pub num_triangles: u32,
    pub _pad0: [u32; 2],
    pub bounds_min: [f32; 3],
    pub _pad1: f32,
    pub bounds_max: [f32; 3],
    pub _pad2: f32,
    pub material: MaterialData,
}

impl MeshData {
    pub fn new(
        transform: Mat4,
        first_triangle_index: u32,
        num_triangles: u32,
        bounds_min: Vec3,
        bounds_max: Vec3,
        material: MaterialData,
    ) -> Self {
        Self {
            transform: transform.to_cols_array_2d(),
            first_triangle_index,
            num_triangles,
            _pad0: [0; 2],
            bounds_min: bounds_min.to_array(),
            _pad1: 0.0,
            bounds_max: bounds_max.to_array(),
            _pad2: 0.0,
            material,
        }
    }

    pub fn triangle_range(&self) -> std::ops::Range<usize> {
        let first = self.first_triangle_index as usize;
        first..first + self.num_triangles as usize
    }
}

/// Sky and sun lighting, uploaded as a uniform
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyUniform {
    pub sky_color_zenith: [f32; 4],
    pub sky_color_horizon: [f32; 4],
    pub ground_color: [f32; 4],
    pub sun_color: [f32; 4],
    pub sun_direction: [f32; 3],
    pub sun_focus: f32,
    pub sun_intensity: f32,
    pub _pad: [f32; 3],
}

/// Per-frame parameters read by the raytracing shader
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TracingParams {
    pub camera_position: [f32; 3],
    pub num_rendered_frames: u32,
    pub camera_direction: [f32; 3],
    pub denoise: u32,
    pub view_params: [f32; 3],
    pub pause: u32,
    pub screen_center: [f32; 2],
    pub resolution: [f32; 2],
    pub num_spheres: u32,
    pub num_meshes: u32,
    pub num_triangles: u32,
    pub _pad: u32,
}

impl TracingParams {
    pub fn new(width: u32, height: u32) -> Self {
        let resolution = [width as f32, height as f32];
        Self {
            camera_position: [0.0; 3],
            num_rendered_frames: 0,
            camera_direction: [0.0, 0.0, -1.0],
            denoise: 0,
            view_params: [0.0; 3],
            pause: 0,
            screen_center: [resolution[0] / 2.0, resolution[1] / 2.0],
            resolution,
            num_spheres: 0,
            num_meshes: 0,
            num_triangles: 0,
            _pad: 0,
        }
    }

    /// Refreshes the per-frame camera, toggle and sphere-count fields
    ///
    /// The accumulation counter is left alone; see `advance_frame`.
    pub fn update(&mut self, camera: &Camera, scene: &Scene, flags: RenderFlags) {
        let resolution = Vec2::from_array(self.resolution);
        self.view_params = camera.view_params(resolution).to_array();
        self.camera_position = camera.position.to_array();
        self.camera_direction = camera.shader_direction().to_array();
        self.denoise = flags.denoise as u32;
        self.pause = flags.pause as u32;
        self.num_spheres = scene.spheres().len() as u32;
    }

    /// Advances accumulation for a frame that is about to be drawn
    pub fn advance_frame(&mut self, accumulator: &mut Accumulator) -> u32 {
        self.num_rendered_frames = accumulator.advance(self.denoise != 0);
        self.num_rendered_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_struct_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<MaterialData>(), 48);
        assert_eq!(std::mem::size_of::<SphereData>(), 64);
        assert_eq!(std::mem::size_of::<TriangleData>(), 96);
        assert_eq!(std::mem::size_of::<MeshData>(), 160);
        assert_eq!(std::mem::size_of::<SkyUniform>(), 96);
        assert_eq!(std::mem::size_of::<TracingParams>(), 80);
    }

    #[test]
    fn test_material_smoothness_clamped() {
        let m = MaterialData::glossy(Rgba8::WHITE, 3.0);
        assert_eq!(m.smoothness, 1.0);
    }

    #[test]
    fn test_tracing_params_screen_center() {
        let params = TracingParams::new(2048, 1024);
        assert_eq!(params.screen_center, [1024.0, 512.0]);
        assert_eq!(params.resolution, [2048.0, 1024.0]);
    }

    #[test]
    fn test_update_fills_per_frame_fields() {
        let mut scene = Scene::new();
        for x in [-2.0, 2.0] {
            scene
                .add_sphere(SphereData::new(Vec3::new(x, 0.0, 0.0), 1.0, MaterialData::default()))
                .unwrap();
        }
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO).with_fovy(90.0);
        let flags = RenderFlags {
            debug: true,
            denoise: true,
            pause: true,
        };

        let mut params = TracingParams::new(2048, 1024);
        params.update(&camera, &scene, flags);

        let plane_height = crate::camera::NEAR_PLANE * 2.0;
        assert!((params.view_params[1] - plane_height).abs() < 1e-6);
        assert!((params.view_params[0] - plane_height * 2.0).abs() < 1e-6);
        assert_eq!(params.view_params[2], crate::camera::NEAR_PLANE);
        assert_eq!(params.camera_position, [0.0, 0.0, 5.0]);
        let direction = Vec3::from_array(params.camera_direction);
        assert!((direction - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!((params.denoise, params.pause), (1, 1));
        assert_eq!(params.num_spheres, 2);
        assert_eq!(params.num_rendered_frames, 0);
        assert_eq!(params.screen_center, [1024.0, 512.0]);
    }

    #[test]
    fn test_direction_scaled_by_focal_length() {
        let camera = Camera::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -3.0));
        let mut params = TracingParams::new(800, 600);
        params.update(&camera, &Scene::new(), RenderFlags::default());
        let focal = 1.0 / (45.0f32.to_radians() * 0.5).tan();
        assert!((params.camera_direction[2] + focal).abs() < 1e-5);
        assert_eq!((params.denoise, params.pause), (0, 0));
    }

    #[test]
    fn test_advance_frame_follows_denoise_flag() {
        let mut params = TracingParams::new(64, 64);
        let mut accumulator = Accumulator::new();
        let mut flags = RenderFlags {
            denoise: true,
            ..RenderFlags::default()
        };
        params.update(&Camera::default(), &Scene::new(), flags);
        params.update(&Camera::default(), &Scene::new(), flags);
        assert_eq!(params.num_rendered_frames, 0);

        assert_eq!(params.advance_frame(&mut accumulator), 1);
        assert_eq!(params.advance_frame(&mut accumulator), 2);
        assert_eq!(params.num_rendered_frames, 2);

        flags.denoise = false;
        params.update(&Camera::default(), &Scene::new(), flags);
        assert_eq!(params.advance_frame(&mut accumulator), 0);
    }

    #[test]
    fn test_mesh_triangle_range() {
        let mesh = MeshData::new(Mat4::IDENTITY, 12, 4, Vec3::ZERO, Vec3::ONE, MaterialData::default());
        assert_eq!(mesh.triangle_range(), 12..16);
    }
}
