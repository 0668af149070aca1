//! Renderer constants

/// MSAA sample count of the stage pass
pub const SAMPLE_COUNT: u32 = 4;

/// Depth buffer format
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Environment maps are stored unfiltered as 32-bit floats
pub const ENVIRONMENT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Video frames are sRGB-encoded RGBA8
pub const VIDEO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Base color textures decoded from model files
pub const BASE_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Directional lights the shader evaluates
pub const MAX_LIGHTS: usize = 2;

/// Fully transparent clear color
pub const CLEAR_TRANSPARENT: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.0,
};
