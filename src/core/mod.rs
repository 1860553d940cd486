pub mod accumulation;
pub mod clock;
pub mod controller;
pub mod display;
pub mod gpu_context;
pub mod input_adapter;
pub mod overlay;
pub mod render_flags;
pub mod tracer;

pub use accumulation::Accumulator;
pub use clock::{Clock, FpsCounter, FramePacer};
pub use controller::{Button, Controller};
pub use gpu_context::GpuContext;
pub use input_adapter::WinitController;
pub use overlay::{DebugOverlay, OverlayFrame};
pub use render_flags::RenderFlags;
pub use tracer::{TracingEngine, DEFAULT_SHADER_PATH};
