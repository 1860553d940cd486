use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::controller::{Button, Controller};

/// Distance from the eye to the virtual image plane
pub const NEAR_PLANE: f32 = 0.01;
pub const FAR_PLANE: f32 = 1000.0;
pub const CAMERA_MOVE_SPEED: f32 = 5.4;
pub const CAMERA_MOUSE_SENSITIVITY: f32 = 0.003;

/// Keeps the view direction from flipping over the up axis
const PITCH_LIMIT: f32 = 0.01;

/// Perspective camera described by eye, look-at target and vertical FOV
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    #[serde(default = "default_up")]
    pub up: Vec3,
    /// Vertical field of view in degrees
    #[serde(default = "default_fovy")]
    pub fovy: f32,
}

fn default_up() -> Vec3 {
    Vec3::Y
}

fn default_fovy() -> f32 {
    45.0
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(15.0, 8.0, 15.0), Vec3::new(0.0, 0.5, 0.0))
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fovy: default_fovy(),
        }
    }

    pub fn with_fovy(mut self, fovy: f32) -> Self {
        self.fovy = fovy;
        self
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or(Vec3::X)
    }

    fn half_fovy_tan(&self) -> f32 {
        (self.fovy.to_radians() * 0.5).tan()
    }

    /// Image plane size at the near distance: `(width, height, near)`
    pub fn view_params(&self, resolution: Vec2) -> Vec3 {
        let plane_height = NEAR_PLANE * self.half_fovy_tan() * 2.0;
        let plane_width = plane_height * (resolution.x / resolution.y);
        Vec3::new(plane_width, plane_height, NEAR_PLANE)
    }

    /// View direction scaled by the focal length `1 / tan(fovy / 2)`
    pub fn shader_direction(&self) -> Vec3 {
        self.forward() * (1.0 / self.half_fovy_tan())
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let projection = Mat4::perspective_rh(self.fovy.to_radians(), aspect, NEAR_PLANE, FAR_PLANE);
        let view = Mat4::look_at_rh(self.position, self.target, self.up);
        projection * view
    }

    /// Free-fly update: mouse look plus WASD / Space / Shift movement
    ///
    /// Returns true when the camera moved or turned, which invalidates any
    /// accumulated frames.
    pub fn update_free(&mut self, delta: f32, controller: &dyn Controller) -> bool {
        let before = *self;
        let distance = (self.target - self.position).length().max(NEAR_PLANE);

        let (dx, dy) = controller.mouse_delta();
        let moving = [
            Button::KeyW,
            Button::KeyA,
            Button::KeyS,
            Button::KeyD,
            Button::Space,
            Button::Shift,
        ]
        .into_iter()
        .any(|b| controller.is_down(b));
        if dx == 0.0 && dy == 0.0 && !moving {
            return false;
        }

        let mut forward = self.forward();

        if dx != 0.0 {
            forward = Quat::from_axis_angle(self.up, -dx * CAMERA_MOUSE_SENSITIVITY) * forward;
        }
        if dy != 0.0 {
            let right = forward.cross(self.up).normalize_or(Vec3::X);
            let pitched = Quat::from_axis_angle(right, -dy * CAMERA_MOUSE_SENSITIVITY) * forward;
            let angle_to_up = pitched.angle_between(self.up);
            if angle_to_up > PITCH_LIMIT && angle_to_up < std::f32::consts::PI - PITCH_LIMIT {
                forward = pitched;
            }
        }

        let axis = |positive: Button, negative: Button| -> f32 {
            match (controller.is_down(positive), controller.is_down(negative)) {
                (true, false) => 1.0,
                (false, true) => -1.0,
                _ => 0.0,
            }
        };

        let right = forward.cross(self.up).normalize_or(Vec3::X);
        let displacement = forward * axis(Button::KeyW, Button::KeyS)
            + right * axis(Button::KeyD, Button::KeyA)
            + self.up * axis(Button::Space, Button::Shift);

        self.position += displacement * CAMERA_MOVE_SPEED * delta;
        self.target = self.position + forward * distance;

        *self != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_looks_at_origin() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::new(15.0, 8.0, 15.0));
        assert_eq!(camera.fovy, 45.0);
        assert!(camera.forward().x < 0.0 && camera.forward().z < 0.0);
    }

    #[test]
    fn test_view_projection_centres_target() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let clip = camera.view_projection(2.0) * Vec3::ZERO.extend(1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
    }
}
