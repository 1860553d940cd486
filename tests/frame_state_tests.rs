use glam::{Vec2, Vec3};
use path_tracer::camera::Camera;
use path_tracer::core::overlay::{
    grid_lines, project_segment, project_to_screen, GRID_SLICES, GRID_SPACING,
};
use path_tracer::core::{Accumulator, Button, RenderFlags, WinitController};

#[cfg(test)]
mod frame_state_tests {
    use super::*;

    #[test]
    fn test_denoise_toggle_drives_accumulation() {
        let mut controller = WinitController::new();
        let mut flags = RenderFlags::default();
        let mut acc = Accumulator::new();

        assert_eq!(acc.advance(flags.denoise), 0);

        controller.press(Button::KeyR);
        flags.apply_input(&controller);
        controller.end_frame();
        assert_eq!(acc.advance(flags.denoise), 1);
        assert_eq!(acc.advance(flags.denoise), 2);

        controller.release(Button::KeyR);
        controller.press(Button::KeyR);
        flags.apply_input(&controller);
        assert_eq!(acc.advance(flags.denoise), 0);
    }

    #[test]
    fn test_ping_pong_alternates_each_frame() {
        let mut acc = Accumulator::new();
        let mut written = Vec::new();
        for _ in 0..4 {
            acc.advance(true);
            written.push((acc.current(), acc.previous()));
            acc.swap();
        }
        assert_eq!(written, vec![(0, 1), (1, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_default_grid_visible_from_default_camera() {
        let camera = Camera::default();
        let viewport = Vec2::new(2048.0, 1024.0);
        let vp = camera.view_projection(viewport.x / viewport.y);

        let lines = grid_lines(GRID_SLICES, GRID_SPACING);
        assert_eq!(lines.len(), 22);

        let visible = lines
            .iter()
            .filter(|l| project_segment(vp, l.start, l.end, viewport).is_some())
            .count();
        assert_eq!(visible, lines.len());

        let origin = project_to_screen(vp, Vec3::ZERO, viewport).unwrap();
        assert!(origin.x > 0.0 && origin.x < viewport.x);
        assert!(origin.y > 0.0 && origin.y < viewport.y);
    }
}
