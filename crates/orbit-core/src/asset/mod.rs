//! Loaded model assets (glTF/GLB and OBJ)
//!
//! A [`LoadedAsset`] is the decoded subject: a flat list of named meshes with
//! world-baked geometry and a per-mesh material, plus the uniform scale the
//! viewer applies. The renderer only ever sees this representation.

mod glb;
mod normals;
mod obj;

use std::path::Path;

pub use glb::{load_gltf, load_gltf_from_bytes};
pub use normals::calculate_vertex_normals;
pub use obj::{load_obj, load_obj_from_bytes};

/// Errors that can occur while loading a model or texture
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to parse '{path}': {reason}")]
    Parse { path: String, reason: String },

    #[error("Empty model: no triangle geometry in '{0}'")]
    EmptyModel(String),

    #[error("Unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("Load cancelled")]
    Cancelled,
}

/// Model file format, detected from the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Glb,
    Gltf,
    Obj,
    Unknown,
}

impl ModelFormat {
    /// Detect format from a path or URL
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        match Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .as_deref()
        {
            Some("glb") => ModelFormat::Glb,
            Some("gltf") => ModelFormat::Gltf,
            Some("obj") => ModelFormat::Obj,
            _ => ModelFormat::Unknown,
        }
    }
}

/// Where a mesh takes its base color from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMap {
    /// Flat `base_color`
    #[default]
    None,
    /// Latest frame of the session's live video source
    Video,
    /// Index into [`LoadedAsset::textures`], modulated by `base_color`
    Texture(usize),
}

/// sRGB-encoded RGBA8 image decoded from a model file
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTexture {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes, rows top to bottom
    pub rgba: Vec<u8>,
}

impl ColorTexture {
    /// `None` when `rgba` does not fill the image
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        (width > 0 && height > 0 && rgba.len() == (width * height * 4) as usize).then_some(Self {
            width,
            height,
            rgba,
        })
    }
}

/// Physically based material factors of one mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Linear RGB
    pub base_color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub map: ColorMap,
    /// Set when the factors changed after decoding and must be re-uploaded
    pub needs_update: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0],
            metalness: 0.0,
            roughness: 1.0,
            map: ColorMap::None,
            needs_update: false,
        }
    }
}

/// Indexed triangle geometry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    /// Build geometry, dropping triangles with out-of-range indices and
    /// filling in normals and UVs when missing.
    pub fn new(
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        uvs: Vec<[f32; 2]>,
        indices: Vec<u32>,
    ) -> Self {
        let vertex_count = positions.len() as u32;
        let indices: Vec<u32> = indices
            .chunks_exact(3)
            .filter(|tri| tri.iter().all(|&i| i < vertex_count))
            .flatten()
            .copied()
            .collect();

        let normals = if normals.len() == positions.len() {
            normals
        } else {
            calculate_vertex_normals(&positions, &indices)
        };
        let uvs = if uvs.len() == positions.len() {
            uvs
        } else {
            vec![[0.0, 0.0]; positions.len()]
        };

        Self {
            positions,
            normals,
            uvs,
            indices,
        }
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if there is anything to draw
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// One named mesh of the subject
#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode {
    pub name: String,
    pub geometry: MeshGeometry,
    pub material: Material,
}

/// Decoded model ready for the material pass and upload
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAsset {
    pub name: String,
    pub meshes: Vec<MeshNode>,
    /// Base color images referenced by [`ColorMap::Texture`]
    pub textures: Vec<ColorTexture>,
    /// Uniform scale applied by the model matrix
    pub scale: f32,
}

impl LoadedAsset {
    /// Create an asset from meshes, discarding empty ones
    pub fn new(name: impl Into<String>, meshes: Vec<MeshNode>) -> Result<Self, AssetError> {
        let name = name.into();
        let meshes: Vec<MeshNode> = meshes
            .into_iter()
            .filter(|m| !m.geometry.is_empty())
            .collect();
        if meshes.is_empty() {
            return Err(AssetError::EmptyModel(name));
        }
        Ok(Self {
            name,
            meshes,
            textures: Vec::new(),
            scale: 1.0,
        })
    }

    /// Attach the images that mesh materials index into
    pub fn with_textures(mut self, textures: Vec<ColorTexture>) -> Self {
        self.textures = textures;
        self
    }

    /// Get the number of meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Total triangle count over all meshes
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.geometry.triangle_count()).sum()
    }

    /// Find a mesh by exact name
    pub fn mesh(&self, name: &str) -> Option<&MeshNode> {
        self.meshes.iter().find(|m| m.name == name)
    }
}

/// Load a model from a file path
pub fn load_model(path: impl AsRef<Path>) -> Result<LoadedAsset, AssetError> {
    let path = path.as_ref();
    let display = path.to_string_lossy();
    match ModelFormat::from_path(&display) {
        ModelFormat::Glb | ModelFormat::Gltf => load_gltf(path),
        ModelFormat::Obj => load_obj(path),
        ModelFormat::Unknown => Err(AssetError::UnsupportedFormat(display.into_owned())),
    }
}

/// Load a model from bytes, using `name` (a file name or URL) for format detection
pub fn load_model_from_bytes(name: &str, data: &[u8]) -> Result<LoadedAsset, AssetError> {
    match ModelFormat::from_path(name) {
        ModelFormat::Glb | ModelFormat::Gltf => load_gltf_from_bytes(name, data),
        ModelFormat::Obj => load_obj_from_bytes(name, data),
        ModelFormat::Unknown => Err(AssetError::UnsupportedFormat(name.to_string())),
    }
}

/// Extract a display name from a path or URL (file stem)
pub(crate) fn asset_name(path: &str) -> String {
    Path::new(path.split(['?', '#']).next().unwrap_or(path))
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string()
}
