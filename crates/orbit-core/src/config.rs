//! Viewer configuration structures
//!
//! Every section can be serialized to and loaded from RON files. Missing
//! fields take their defaults, so a file only needs the values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, EASING_FACTOR, POLISHED_METALNESS,
    POLISHED_ROUGHNESS, RIM_LIGHT_COLOR, RIM_LIGHT_INTENSITY, RIM_LIGHT_OFFSET, TV_BODY_COLOR,
    TV_SCREEN_MESH,
};
use crate::scene::{ColorSpace, ToneMapping};

/// Errors that can occur while reading or writing configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near_plane: f32,
    /// Far clipping plane distance
    pub far_plane: f32,
    /// Camera position; the camera looks down -Z
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: CAMERA_FOV_DEGREES,
            near_plane: CAMERA_NEAR,
            far_plane: CAMERA_FAR,
            position: [0.0, 0.5, 5.0],
        }
    }
}

/// Output surface color pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Clear to transparent instead of opaque black
    pub alpha: bool,
    pub color_space: ColorSpace,
    pub tone_mapping: ToneMapping,
    /// Exposure multiplier applied before tone mapping
    pub exposure: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            alpha: true,
            color_space: ColorSpace::Srgb,
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 1.0,
        }
    }
}

/// Rim lighting configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightingConfig {
    /// Light color (sRGB hex, 0xRRGGBB)
    pub color: u32,
    /// Light intensity multiplier
    pub intensity: f32,
    /// Distance of each light from the origin along X
    pub offset: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            color: RIM_LIGHT_COLOR,
            intensity: RIM_LIGHT_INTENSITY,
            offset: RIM_LIGHT_OFFSET,
        }
    }
}

/// Model asset configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Path or URL of the model file (.glb, .gltf or .obj)
    pub path: String,
    /// Uniform scale applied after load
    pub scale: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "assets/toucan.glb".to_string(),
            scale: 1.25,
        }
    }
}

/// Environment map configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Path or URL of an equirectangular Radiance HDR file; `None` disables it
    pub path: Option<String>,
    /// Reflection strength multiplier
    pub intensity: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            path: Some("assets/environment.hdr".to_string()),
            intensity: 1.0,
        }
    }
}

/// Material treatment applied once when the model loads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MaterialProfile {
    /// Every mesh becomes polished metal
    PolishedMetal { metalness: f32, roughness: f32 },
    /// One named mesh shows the live video; the rest get a flat metal body
    VideoSubject {
        mesh_name: String,
        /// Body color (sRGB hex, 0xRRGGBB)
        body_color: u32,
        metalness: f32,
        roughness: f32,
    },
}

impl Default for MaterialProfile {
    fn default() -> Self {
        Self::PolishedMetal {
            metalness: POLISHED_METALNESS,
            roughness: POLISHED_ROUGHNESS,
        }
    }
}

impl MaterialProfile {
    /// Profile of the TV variant
    pub fn tv_screen() -> Self {
        Self::VideoSubject {
            mesh_name: TV_SCREEN_MESH.to_string(),
            body_color: TV_BODY_COLOR,
            metalness: POLISHED_METALNESS,
            roughness: POLISHED_ROUGHNESS,
        }
    }

    /// Whether this profile binds a mesh to the video source
    pub fn uses_video(&self) -> bool {
        matches!(self, Self::VideoSubject { .. })
    }
}

/// Video source configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoConfig {
    /// Video URL (web) or directory of numbered frames (native)
    pub source: String,
    /// Playback rate for frame sequences
    pub fps: f32,
    pub looped: bool,
    pub muted: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            source: "assets/video".to_string(),
            fps: 30.0,
            looped: true,
            muted: true,
        }
    }
}

/// Complete configuration of one viewer instance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewerConfig {
    /// Display name, used in logs
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub material: MaterialProfile,
    #[serde(default)]
    pub video: Option<VideoConfig>,
    /// Register a scroll listener and snap the page to whole sections
    #[serde(default)]
    pub scroll_snap: bool,
    /// Per-frame smoothing factor
    #[serde(default = "default_easing_factor")]
    pub easing_factor: f32,
}

fn default_easing_factor() -> f32 {
    EASING_FACTOR
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::toucan()
    }
}

impl ViewerConfig {
    /// Static-lit toucan with scroll snapping
    pub fn toucan() -> Self {
        Self {
            name: "toucan".to_string(),
            camera: CameraConfig::default(),
            output: OutputConfig::default(),
            lighting: LightingConfig::default(),
            model: ModelConfig::default(),
            environment: EnvironmentConfig::default(),
            material: MaterialProfile::default(),
            video: None,
            scroll_snap: true,
            easing_factor: EASING_FACTOR,
        }
    }

    /// TV with a video-textured screen
    pub fn tv() -> Self {
        Self {
            name: "tv".to_string(),
            camera: CameraConfig {
                position: [0.0, 0.0, 7.0],
                ..Default::default()
            },
            model: ModelConfig {
                path: "assets/tv.glb".to_string(),
                scale: 0.01,
            },
            material: MaterialProfile::tv_screen(),
            video: Some(VideoConfig::default()),
            scroll_snap: false,
            ..Self::toucan()
        }
    }

    /// Parse a configuration from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Serialize to pretty RON text
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    /// Write a configuration file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}
