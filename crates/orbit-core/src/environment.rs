//! Equirectangular environment maps
//!
//! Radiance HDR files decode to linear RGB directly. LDR images (PNG/JPEG)
//! are accepted as a fallback and linearized from sRGB.

use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;

use crate::asset::AssetError;
use crate::scene::srgb_to_linear;

/// Linear RGBA float texture in equirectangular projection, row 0 at the top
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` floats
    pub data: Vec<f32>,
    /// Reflection strength multiplier
    pub intensity: f32,
}

impl EnvironmentMap {
    /// Create a map from raw RGBA float texels
    pub fn from_rgba(width: u32, height: u32, data: Vec<f32>) -> Result<Self, AssetError> {
        if width == 0 || height == 0 || data.len() != (width * height * 4) as usize {
            return Err(AssetError::Parse {
                path: "environment".to_string(),
                reason: format!(
                    "{} floats do not fill a {}x{} RGBA texture",
                    data.len(),
                    width,
                    height
                ),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            intensity: 1.0,
        })
    }

    /// Decode an environment map, detecting the format from `name`
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        let clean = name.split(['?', '#']).next().unwrap_or(name);
        let format = ImageFormat::from_path(clean)
            .or_else(|_| image::guess_format(bytes))
            .map_err(|e| AssetError::Parse {
                path: name.to_string(),
                reason: e.to_string(),
            })?;

        let image = image::load(Cursor::new(bytes), format).map_err(|e| AssetError::Parse {
            path: name.to_string(),
            reason: e.to_string(),
        })?;

        let linear_source = matches!(format, ImageFormat::Hdr | ImageFormat::OpenExr);
        let rgba = image.into_rgba32f();
        let (width, height) = rgba.dimensions();
        let mut data = rgba.into_raw();
        if !linear_source {
            for texel in data.chunks_exact_mut(4) {
                for channel in &mut texel[..3] {
                    *channel = srgb_to_linear(*channel);
                }
            }
        }

        tracing::debug!("Decoded environment '{}' ({}x{})", name, width, height);
        Self::from_rgba(width, height, data)
    }

    /// Load an environment map from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let display = path.to_string_lossy();
        let bytes =
            std::fs::read(path).map_err(|e| AssetError::Io(format!("{}: {}", display, e)))?;
        Self::from_bytes(&display, &bytes)
    }
}
