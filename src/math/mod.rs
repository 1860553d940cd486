mod aabb;
mod color;

pub use aabb::Aabb;
pub use color::{hsv_to_rgb, Rgba8};
