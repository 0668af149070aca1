//! Global constants for orbit-core

use std::f32::consts::PI;

/// Yaw reached at the horizontal viewport edge (normalized x = ±1)
pub const POINTER_YAW_SCALE: f32 = PI / 4.0;

/// Pitch reached at the vertical viewport edge (normalized y = ±1)
pub const POINTER_PITCH_SCALE: f32 = PI / 8.0;

/// Per-frame smoothing factor of the easing integrator
pub const EASING_FACTOR: f32 = 0.05;

/// Default vertical field of view in degrees
pub const CAMERA_FOV_DEGREES: f32 = 75.0;

/// Default near clipping plane
pub const CAMERA_NEAR: f32 = 0.1;

/// Default far clipping plane
pub const CAMERA_FAR: f32 = 1000.0;

/// Rim light color (sRGB hex)
pub const RIM_LIGHT_COLOR: u32 = 0xf18f0f;

/// Rim light intensity
pub const RIM_LIGHT_INTENSITY: f32 = 10.0;

/// Rim light offset along the X axis (lights sit at +offset and -offset)
pub const RIM_LIGHT_OFFSET: f32 = 2.0;

/// Metalness forced onto every mesh by the polished-metal profile
pub const POLISHED_METALNESS: f32 = 1.0;

/// Roughness forced onto every mesh by the polished-metal profile
pub const POLISHED_ROUGHNESS: f32 = 0.1;

/// Mesh that shows the video in the TV asset
pub const TV_SCREEN_MESH: &str = "defaultMaterial002";

/// Flat body color of the TV asset (sRGB hex)
pub const TV_BODY_COLOR: u32 = 0x839baa;
