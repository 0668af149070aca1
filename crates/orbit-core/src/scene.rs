//! Stage lighting and output color pipeline descriptions

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::{LightingConfig, OutputConfig};

/// Output color space of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Display-referred sRGB encoding
    #[default]
    Srgb,
    /// Linear values written as-is
    Linear,
}

/// Tone mapping operator applied before output encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToneMapping {
    None,
    /// ACES filmic curve
    #[default]
    AcesFilmic,
}

/// Color pipeline settings of the renderer surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputSettings {
    /// Transparent clear color so the page shows through
    pub alpha: bool,
    pub color_space: ColorSpace,
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
}

impl From<&OutputConfig> for OutputSettings {
    fn from(config: &OutputConfig) -> Self {
        Self {
            alpha: config.alpha,
            color_space: config.color_space,
            tone_mapping: config.tone_mapping,
            exposure: config.exposure,
        }
    }
}

/// Directional light pointing from `position` toward the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    /// Linear RGB
    pub color: Vec3,
    pub intensity: f32,
}

impl DirectionalLight {
    /// Unit vector from the light toward the origin
    pub fn direction(&self) -> Vec3 {
        (-self.position).normalize_or(Vec3::NEG_Z)
    }

    /// Two equal lights at mirrored X offsets, for rim light on both sides
    pub fn rim_pair(config: &LightingConfig) -> [Self; 2] {
        let color = srgb_hex_to_linear(config.color);
        let make = |x: f32| Self {
            position: Vec3::new(x, 0.0, 0.0),
            color,
            intensity: config.intensity,
        };
        [make(config.offset), make(-config.offset)]
    }
}

/// Decode a `0xRRGGBB` sRGB color into linear RGB
pub fn srgb_hex_to_linear(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    Vec3::new(channel(16), channel(8), channel(0))
}

/// sRGB transfer function inverse
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
