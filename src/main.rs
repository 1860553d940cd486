use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

use path_tracer::cli::Cli;
use path_tracer::config::load_scene_file;
use path_tracer::core::{
    Button, Clock, Controller, DebugOverlay, FpsCounter, FramePacer, OverlayFrame, RenderFlags,
    TracingEngine, WinitController,
};
use path_tracer::scenes::{self, SceneSetup};

struct App {
    cli: Cli,
    setup: SceneSetup,
    controller: WinitController,
    flags: RenderFlags,
    clock: Clock,
    fps: FpsCounter,
    pacer: FramePacer,
    window: Option<Arc<Window>>,
    engine: Option<TracingEngine>,
    overlay: Option<DebugOverlay>,
    init_error: Option<anyhow::Error>,
}

impl App {
    fn new(cli: Cli, setup: SceneSetup) -> Self {
        let flags = RenderFlags {
            debug: cli.debug,
            denoise: cli.denoise,
            pause: false,
        };
        let pacer = FramePacer::new(cli.fps);

        Self {
            cli,
            setup,
            controller: WinitController::new(),
            flags,
            clock: Clock::new(),
            fps: FpsCounter::new(),
            pacer,
            window: None,
            engine: None,
            overlay: None,
            init_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title("path tracer")
            .with_inner_size(PhysicalSize::new(self.cli.width, self.cli.height));
        let window = Arc::new(event_loop.create_window(attributes)?);

        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(e) = grabbed {
            log::warn!("Cursor grab unavailable: {}", e);
        }
        window.set_cursor_visible(false);

        let mut engine = pollster::block_on(TracingEngine::new(window.clone(), &self.cli.shader))?;
        engine.upload_static_data(&self.setup.scene);
        let overlay = DebugOverlay::new(&window, engine.gpu(), engine.surface_format());

        self.clock.reset();
        self.window = Some(window);
        self.engine = Some(engine);
        self.overlay = Some(overlay);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(engine), Some(overlay), Some(window)) =
            (self.engine.as_mut(), self.overlay.as_mut(), self.window.as_ref())
        else {
            return;
        };

        self.pacer.frame_started(Instant::now());
        let delta = self.clock.tick();
        if let Some(fps) = self.fps.record(delta) {
            log::debug!(
                "{:.0} FPS, {} accumulated frames",
                fps,
                engine.num_rendered_frames()
            );
        }

        if self.controller.just_pressed(Button::Escape) {
            event_loop.exit();
            return;
        }

        self.flags.apply_input(&self.controller);
        if self.setup.camera.update_free(delta, &self.controller) {
            engine.reset_accumulation();
        }

        engine.upload_data(&self.setup.camera, &self.setup.scene, self.flags);

        let result = if self.flags.debug {
            let frame = OverlayFrame {
                camera: &self.setup.camera,
                scene: self.setup.scene.stats(),
                flags: self.flags,
                fps: self.fps.fps(),
                num_rendered_frames: engine.num_rendered_frames(),
            };
            engine.render(Some((overlay, &**window, &frame)))
        } else {
            engine.render(None)
        };

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => engine.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Dropped frame: {}", e),
        }

        self.controller.end_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("Failed to initialize: {:#}", e);
            self.init_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.flags.debug {
            if let (Some(overlay), Some(window)) = (&mut self.overlay, &self.window) {
                if overlay.handle_event(window, &event) {
                    return;
                }
            }
        }

        self.controller.process_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        self.controller.process_device_event(&event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(window) = &self.window else {
            return;
        };

        if self.pacer.is_due(Instant::now()) {
            window.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.pacer.next_frame()));
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let setup = match &cli.scene_file {
        Some(path) => load_scene_file(path)?,
        None => scenes::by_name(&cli.scene, cli.gltf.as_deref())?,
    };

    let stats = setup.scene.stats();
    log::info!(
        "Scene ready: {} spheres, {} meshes, {} triangles",
        stats.spheres,
        stats.meshes,
        stats.triangles
    );
    log::info!("Controls: WASD + mouse, Space/Shift up/down, 1 debug, R denoise, P pause, Escape quit");

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli, setup);
    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
