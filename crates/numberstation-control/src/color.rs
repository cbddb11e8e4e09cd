//! RGB color values handed from animations to fixtures

use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};

/// An 8-bit RGB triple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert from HSV with every component in `0.0..=1.0`.
    ///
    /// The hue wraps, so `1.25` is the same as `0.25`.
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let hsv = Hsv::new(hue.rem_euclid(1.0) * 360.0, saturation, value);
        let rgb: Srgb = Srgb::from_color(hsv);

        Self {
            r: (rgb.red * 255.0).clamp(0.0, 255.0) as u8,
            g: (rgb.green * 255.0).clamp(0.0, 255.0) as u8,
            b: (rgb.blue * 255.0).clamp(0.0, 255.0) as u8,
        }
    }

    /// A random fully saturated color
    pub fn random_hue() -> Self {
        Self::from_hsv(rand::random::<f32>(), 1.0, 1.0)
    }

    /// Channel-wise inversion
    pub fn complement(self) -> Self {
        Self::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    /// Linear interpolation towards `other`, `t` clamped to `0.0..=1.0`
    pub fn lerp(self, other: Rgb, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}
