use serde::{Deserialize, Serialize};

/// 8-bit RGBA colour as authored in scenes
///
/// Serialized as a plain `[r, g, b, a]` array so scene files stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const BLANK: Rgba8 = Rgba8::new(0, 0, 0, 0);
    pub const GRAY: Rgba8 = Rgba8::new(130, 130, 130, 255);
    pub const RED: Rgba8 = Rgba8::new(230, 41, 55, 255);
    pub const GREEN: Rgba8 = Rgba8::new(0, 228, 48, 255);
    pub const BLUE: Rgba8 = Rgba8::new(0, 121, 241, 255);
    pub const GOLD: Rgba8 = Rgba8::new(255, 203, 0, 255);
    pub const ORANGE: Rgba8 = Rgba8::new(255, 161, 0, 255);
    pub const BROWN: Rgba8 = Rgba8::new(127, 106, 79, 255);
    pub const SKYBLUE: Rgba8 = Rgba8::new(102, 191, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from normalized float channels, clamped to [0, 1]
    pub fn from_floats(rgb: [f32; 3]) -> Self {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]), 255)
    }

    /// Normalized float channels, each component divided by 255
    pub fn to_vec4(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Rgba8> for [u8; 4] {
    fn from(c: Rgba8) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    let c = v * s;
    let h_prime = (h * 6.0) % 6.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_vec4_divides_by_255() {
        let v = Rgba8::new(255, 0, 51, 102).to_vec4();
        assert_eq!(v[0], 1.0);
        assert_eq!(v[1], 0.0);
        assert!((v[2] - 0.2).abs() < 1e-6);
        assert!((v[3] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_from_floats_clamps() {
        let c = Rgba8::from_floats([1.5, -0.2, 0.5]);
        assert_eq!(c, Rgba8::new(255, 0, 128, 255));
    }

    #[test]
    fn test_array_conversion() {
        let c: Rgba8 = [1, 2, 3, 4].into();
        let back: [u8; 4] = c.into();
        assert_eq!(back, [1, 2, 3, 4]);
    }

    #[test]
    fn test_hsv_to_rgb_red() {
        let rgb = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((rgb[0] - 1.0).abs() < 0.01);
        assert!(rgb[1].abs() < 0.01);
        assert!(rgb[2].abs() < 0.01);
    }

    #[test]
    fn test_hsv_to_rgb_white() {
        let rgb = hsv_to_rgb(0.0, 0.0, 1.0);
        assert!((rgb[0] - 1.0).abs() < 0.01);
        assert!((rgb[1] - 1.0).abs() < 0.01);
        assert!((rgb[2] - 1.0).abs() < 0.01);
    }
}
