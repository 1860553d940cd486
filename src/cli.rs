// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::core::DEFAULT_SHADER_PATH;

#[derive(Parser, Debug, Clone)]
#[command(name = "path-tracer")]
#[command(about = "Progressive GPU path tracer", long_about = None)]
pub struct Cli {
    /// Window width in pixels
    #[arg(long, default_value_t = 2048)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 1024)]
    pub height: u32,

    /// Target frame rate, 0 for unpaced
    #[arg(long, default_value_t = 80)]
    pub fps: u32,

    /// WGSL file providing the tracing fragment stage (`fs_main`). The shader is not bundled with this crate; supply your own here or place it at the default path
    #[arg(long, default_value = DEFAULT_SHADER_PATH)]
    pub shader: PathBuf,

    /// Built-in scene: spheres, showcase, mesh or gltf
    #[arg(long, default_value = "spheres")]
    pub scene: String,

    /// JSON scene description; overrides --scene
    #[arg(long = "scene-file")]
    pub scene_file: Option<PathBuf>,

    /// glTF model for the gltf scene
    #[arg(long)]
    pub gltf: Option<PathBuf>,

    /// Start with the debug overlay visible
    #[arg(long)]
    pub debug: bool,

    /// Start with progressive accumulation enabled
    #[arg(long)]
    pub denoise: bool,
}
