mod gltf;
mod meshes;
mod showcase;
mod spheres;

use anyhow::{bail, Result};
use std::path::Path;

use crate::camera::Camera;
use crate::scene::Scene;

pub use gltf::create_gltf_scene;
pub use meshes::create_mesh_scene;
pub use showcase::create_showcase_scene;
pub use spheres::create_spheres_scene;

/// Names accepted by `--scene`
pub const NAMES: [&str; 4] = ["spheres", "showcase", "mesh", "gltf"];

/// A populated scene together with the camera it is meant to be viewed from
#[derive(Debug, Clone)]
pub struct SceneSetup {
    pub scene: Scene,
    pub camera: Camera,
}

/// Builds a built-in scene by name; `gltf` needs a model path
pub fn by_name(name: &str, gltf_path: Option<&Path>) -> Result<SceneSetup> {
    match name {
        "spheres" => Ok(create_spheres_scene()?),
        "showcase" => Ok(create_showcase_scene()?),
        "mesh" => Ok(create_mesh_scene()?),
        "gltf" => match gltf_path {
            Some(path) => create_gltf_scene(path),
            None => bail!("The gltf scene needs a model file (--gltf <path>)"),
        },
        other => bail!(
            "Unknown scene '{}', expected one of: {}",
            other,
            NAMES.join(", ")
        ),
    }
}
