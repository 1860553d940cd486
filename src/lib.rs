pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod loaders;
pub mod math;
pub mod mesh;
pub mod scene;
pub mod scenes;
pub mod types;

pub use camera::Camera;
pub use scene::{Scene, SceneError, SceneStats, Sky};
pub use scenes::SceneSetup;
