use glam::{Mat4, Vec2, Vec3, Vec4};
use winit::event::WindowEvent;
use winit::window::Window;

use super::gpu_context::GpuContext;
use super::render_flags::RenderFlags;
use crate::camera::Camera;
use crate::scene::SceneStats;

/// Number of grid cells along each axis of the reference grid
pub const GRID_SLICES: i32 = 10;
/// World units between grid lines
pub const GRID_SPACING: f32 = 1.0;

/// Values shown by the debug overlay for one frame
#[derive(Debug, Clone, Copy)]
pub struct OverlayFrame<'a> {
    pub camera: &'a Camera,
    pub scene: SceneStats,
    pub flags: RenderFlags,
    pub fps: f32,
    pub num_rendered_frames: u32,
}

/// One line of the ground-plane reference grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub start: Vec3,
    pub end: Vec3,
    /// Passes through the origin
    pub is_axis: bool,
}

/// Lines of a `slices` x `slices` grid on the XZ plane centered at the origin
pub fn grid_lines(slices: i32, spacing: f32) -> Vec<GridLine> {
    let half = slices / 2;
    let extent = half as f32 * spacing;

    (-half..=half)
        .flat_map(|i| {
            let offset = i as f32 * spacing;
            let is_axis = i == 0;
            [
                GridLine {
                    start: Vec3::new(offset, 0.0, -extent),
                    end: Vec3::new(offset, 0.0, extent),
                    is_axis,
                },
                GridLine {
                    start: Vec3::new(-extent, 0.0, offset),
                    end: Vec3::new(extent, 0.0, offset),
                    is_axis,
                },
            ]
        })
        .collect()
}

/// Projects a world point to pixel coordinates (origin top-left)
///
/// Returns `None` for points behind the camera or outside the clip volume depth.
pub fn project_to_screen(view_projection: Mat4, point: Vec3, viewport: Vec2) -> Option<Vec2> {
    let clip = view_projection * point.extend(1.0);
    if !(0.0..=clip.w).contains(&clip.z) {
        return None;
    }
    clip_to_screen(clip, viewport)
}

/// Projects a world segment to pixel coordinates, clipped to the near and far planes
///
/// Returns `None` only when no part of the segment lies within the depth range.
pub fn project_segment(
    view_projection: Mat4,
    start: Vec3,
    end: Vec3,
    viewport: Vec2,
) -> Option<(Vec2, Vec2)> {
    let mut a = view_projection * start.extend(1.0);
    let mut b = view_projection * end.extend(1.0);

    // Signed distances inside `0 <= z <= w`
    let planes: [fn(Vec4) -> f32; 2] = [|c| c.z, |c| c.w - c.z];
    for distance in planes {
        let (da, db) = (distance(a), distance(b));
        if da < 0.0 && db < 0.0 {
            return None;
        }
        if da < 0.0 {
            a += (b - a) * (da / (da - db));
        } else if db < 0.0 {
            b += (a - b) * (db / (db - da));
        }
    }

    Some((clip_to_screen(a, viewport)?, clip_to_screen(b, viewport)?))
}

fn clip_to_screen(clip: Vec4, viewport: Vec2) -> Option<Vec2> {
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    Some(Vec2::new(
        (ndc.x * 0.5 + 0.5) * viewport.x,
        (0.5 - ndc.y * 0.5) * viewport.y,
    ))
}

/// egui layer drawn over the presented image while debug mode is on
pub struct DebugOverlay {
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    grid: Vec<GridLine>,
}

impl DebugOverlay {
    pub fn new(window: &Window, gpu: &GpuContext, surface_format: wgpu::TextureFormat) -> Self {
        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            gpu.device(),
            surface_format,
            egui_wgpu::RendererOptions::default(),
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            grid: grid_lines(GRID_SLICES, GRID_SPACING),
        }
    }

    /// Returns true if egui consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }

    /// Records the overlay pass on top of `view`
    ///
    /// Returns command buffers produced by egui paint callbacks; they must be
    /// submitted before the encoder.
    pub fn paint(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        window: &Window,
        resolution: (u32, u32),
        frame: &OverlayFrame,
    ) -> Vec<wgpu::CommandBuffer> {
        let raw_input = self.egui_state.take_egui_input(window);
        let pixels_per_point = window.scale_factor() as f32;
        let viewport = Vec2::new(resolution.0 as f32, resolution.1 as f32);
        let view_projection = frame.camera.view_projection(viewport.x / viewport.y.max(1.0));
        let grid = &self.grid;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            draw_grid(ctx, grid, view_projection, viewport, pixels_per_point);
            draw_stats(ctx, frame, resolution);
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(gpu.device(), gpu.queue(), *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [resolution.0, resolution.1],
            pixels_per_point: full_output.pixels_per_point,
        };

        let callback_commands = self.egui_renderer.update_buffers(
            gpu.device(),
            gpu.queue(),
            encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Overlay Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        callback_commands
    }
}

fn draw_grid(
    ctx: &egui::Context,
    grid: &[GridLine],
    view_projection: Mat4,
    viewport: Vec2,
    pixels_per_point: f32,
) {
    let painter = ctx.layer_painter(egui::LayerId::background());
    let to_points = |p: Vec2| egui::pos2(p.x / pixels_per_point, p.y / pixels_per_point);

    for line in grid {
        let Some((a, b)) = project_segment(view_projection, line.start, line.end, viewport) else {
            continue;
        };

        let color = if line.is_axis {
            egui::Color32::from_rgb(192, 192, 192)
        } else {
            egui::Color32::from_rgb(96, 96, 96)
        };
        painter.line_segment([to_points(a), to_points(b)], egui::Stroke::new(1.0, color));
    }
}

fn draw_stats(ctx: &egui::Context, frame: &OverlayFrame, resolution: (u32, u32)) {
    egui::Window::new("Debug")
        .title_bar(false)
        .resizable(false)
        .fixed_pos(egui::pos2(10.0, 10.0))
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading(
                egui::RichText::new(format!("{:.0} FPS", frame.fps))
                    .size(24.0)
                    .color(egui::Color32::from_rgb(0, 228, 48)),
            );
            let frame_time_ms = if frame.fps > 0.0 { 1000.0 / frame.fps } else { 0.0 };
            ui.label(
                egui::RichText::new(format!("{:.2} ms", frame_time_ms))
                    .size(14.0)
                    .color(egui::Color32::GRAY),
            );

            ui.separator();

            let camera = frame.camera;
            ui.monospace(format!(
                "Pos:    ({:.2}, {:.2}, {:.2})",
                camera.position.x, camera.position.y, camera.position.z
            ));
            ui.monospace(format!(
                "Target: ({:.2}, {:.2}, {:.2})",
                camera.target.x, camera.target.y, camera.target.z
            ));
            ui.monospace(format!("FOV Y:  {:.1}°", camera.fovy));

            ui.separator();

            ui.monospace(format!(
                "Spheres {} / Meshes {} / Tris {}",
                frame.scene.spheres, frame.scene.meshes, frame.scene.triangles
            ));
            ui.monospace(format!("Resolution: {}x{}", resolution.0, resolution.1));
            ui.monospace(format!("Accumulated: {}", frame.num_rendered_frames));
            ui.monospace(format!(
                "Denoise [R]: {}  Pause [P]: {}",
                on_off(frame.flags.denoise),
                on_off(frame.flags.pause)
            ));
        });
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_line_count() {
        assert_eq!(grid_lines(10, 1.0).len(), 22);
        assert_eq!(grid_lines(4, 2.0).len(), 10);
    }

    #[test]
    fn test_grid_extent_and_axes() {
        let lines = grid_lines(10, 1.0);
        let axes: Vec<_> = lines.iter().filter(|l| l.is_axis).collect();
        assert_eq!(axes.len(), 2);
        for line in &lines {
            assert_eq!(line.start.y, 0.0);
            assert!(line.start.abs().max_element() <= 5.0);
            assert!(line.end.abs().max_element() <= 5.0);
        }
    }

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = Camera::default();
        let viewport = Vec2::new(2048.0, 1024.0);
        let vp = camera.view_projection(viewport.x / viewport.y);
        let p = project_to_screen(vp, camera.target, viewport).unwrap();
        assert!((p - viewport / 2.0).length() < 1e-2);
    }

    #[test]
    fn test_point_behind_camera_not_projected() {
        let camera = Camera::default();
        let vp = camera.view_projection(2.0);
        let behind = camera.position - camera.forward() * 5.0;
        assert!(project_to_screen(vp, behind, Vec2::new(800.0, 400.0)).is_none());
    }

    #[test]
    fn test_grid_lines_crossing_camera_are_clipped_not_dropped() {
        let camera = Camera::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, -5.0));
        let viewport = Vec2::new(800.0, 400.0);
        let vp = camera.view_projection(viewport.x / viewport.y);

        let mut drawn = 0;
        for line in grid_lines(GRID_SLICES, GRID_SPACING) {
            let projected = project_segment(vp, line.start, line.end, viewport);
            let runs_along_z = line.start.x == line.end.x;
            if runs_along_z || line.start.z <= 0.0 {
                let (a, b) = projected.expect("segment with a visible part was dropped");
                assert!(a.is_finite() && b.is_finite());
                drawn += 1;
            } else {
                assert!(projected.is_none());
            }
        }
        assert_eq!(drawn, 17);
    }

    #[test]
    fn test_segment_in_front_matches_point_projection() {
        let camera = Camera::default();
        let viewport = Vec2::new(800.0, 400.0);
        let vp = camera.view_projection(2.0);
        let (start, end) = (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let (a, b) = project_segment(vp, start, end, viewport).unwrap();
        assert!((a - project_to_screen(vp, start, viewport).unwrap()).length() < 1e-3);
        assert!((b - project_to_screen(vp, end, viewport).unwrap()).length() < 1e-3);
    }

    #[test]
    fn test_segment_clipped_at_near_plane() {
        let camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z);
        let vp = camera.view_projection(1.0);
        let viewport = Vec2::new(400.0, 400.0);
        let (a, b) = project_segment(vp, Vec3::new(0.0, -1.0, 5.0), Vec3::new(0.0, -1.0, -5.0), viewport).unwrap();
        assert!((b - project_to_screen(vp, Vec3::new(0.0, -1.0, -5.0), viewport).unwrap()).length() < 1e-3);
        // The clipped end lands on the near plane, far below the screen
        assert!(a.y > viewport.y);
        assert!(project_segment(vp, Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 2.0), viewport).is_none());
    }
}
