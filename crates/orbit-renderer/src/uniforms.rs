//! Uniform buffer layouts shared with `shaders/mesh.wgsl`

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use orbit_core::{
    ColorMap, ColorSpace, DirectionalLight, Material, OutputSettings, PerspectiveCamera,
    ToneMapping,
};

use crate::constants::MAX_LIGHTS;

/// One directional light as the shader sees it
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable, PartialEq)]
pub struct GpuLight {
    /// Direction the light travels (xyz), w unused
    pub direction: [f32; 4],
    /// Linear color premultiplied by intensity (rgb), w unused
    pub color: [f32; 4],
}

impl From<&DirectionalLight> for GpuLight {
    fn from(light: &DirectionalLight) -> Self {
        let d = light.direction();
        let c = light.color * light.intensity;
        Self {
            direction: [d.x, d.y, d.z, 0.0],
            color: [c.x, c.y, c.z, 0.0],
        }
    }
}

/// Per-frame scene uniform (group 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable, PartialEq)]
pub struct SceneUniform {
    /// Projection * view
    pub view_proj: [[f32; 4]; 4],
    /// Camera position (xyz), w = 1
    pub camera_pos: [f32; 4],
    /// Directional lights, the first `light_count` are used
    pub lights: [GpuLight; MAX_LIGHTS],
    /// Number of valid entries in `lights`
    pub light_count: u32,
    /// Exposure multiplier before tone mapping
    pub exposure: f32,
    /// 0 = none, 1 = ACES filmic
    pub tone_mapping: u32,
    /// 0 = sRGB output, 1 = linear passthrough
    pub output_mode: u32,
    /// Environment reflection strength
    pub env_intensity: f32,
    /// 1 once an environment map is installed
    pub has_env: u32,
    /// Padding to 16 bytes
    pub _pad: [u32; 2],
}

impl Default for SceneUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: [0.0, 0.0, 0.0, 1.0],
            lights: [GpuLight::zeroed(); MAX_LIGHTS],
            light_count: 0,
            exposure: 1.0,
            tone_mapping: 1,
            output_mode: 0,
            env_intensity: 1.0,
            has_env: 0,
            _pad: [0; 2],
        }
    }
}

impl SceneUniform {
    /// Update camera fields
    pub fn set_camera(&mut self, camera: &PerspectiveCamera) {
        self.view_proj = camera.view_projection().to_cols_array_2d();
        let p = camera.position;
        self.camera_pos = [p.x, p.y, p.z, 1.0];
    }

    /// Update the color pipeline fields
    pub fn set_output(&mut self, settings: &OutputSettings) {
        self.exposure = settings.exposure;
        self.tone_mapping = match settings.tone_mapping {
            ToneMapping::None => 0,
            ToneMapping::AcesFilmic => 1,
        };
        self.output_mode = match settings.color_space {
            ColorSpace::Srgb => 0,
            ColorSpace::Linear => 1,
        };
    }

    /// Append a light. Returns false when all slots are taken.
    pub fn push_light(&mut self, light: &DirectionalLight) -> bool {
        let index = self.light_count as usize;
        if index >= MAX_LIGHTS {
            return false;
        }
        self.lights[index] = GpuLight::from(light);
        self.light_count += 1;
        true
    }
}

/// Per-mesh uniform (group 1)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable, PartialEq)]
pub struct MeshUniform {
    /// Model matrix
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix
    pub normal: [[f32; 4]; 4],
    /// Linear base color (rgb), a = 1
    pub base_color: [f32; 4],
    /// Metalness factor
    pub metalness: f32,
    /// Roughness factor
    pub roughness: f32,
    /// Base color source: 0 = flat, 1 = video texture, 2 = mesh texture
    pub color_map: u32,
    /// Padding to 16 bytes
    pub _pad: u32,
}

impl MeshUniform {
    /// Uniform for a material at the given transform
    pub fn new(material: &Material, transform: Mat4) -> Self {
        let [r, g, b] = material.base_color;
        let mut uniform = Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            normal: Mat4::IDENTITY.to_cols_array_2d(),
            base_color: [r, g, b, 1.0],
            metalness: material.metalness,
            roughness: material.roughness,
            color_map: match material.map {
                ColorMap::None => 0,
                ColorMap::Video => 1,
                ColorMap::Texture(_) => 2,
            },
            _pad: 0,
        };
        uniform.set_transform(transform);
        uniform
    }

    /// Update the model and normal matrices
    pub fn set_transform(&mut self, transform: Mat4) {
        self.model = transform.to_cols_array_2d();
        let normal = if transform.determinant() != 0.0 {
            transform.inverse().transpose()
        } else {
            transform
        };
        self.normal = normal.to_cols_array_2d();
    }
}
