//! Orbit Viewer Renderer
//!
//! wgpu implementation of [`orbit_core::RenderBackend`]. The stage is drawn
//! offscreen into a texture the host composites; the clear color is fully
//! transparent so the page shows around the subject.
//!
//! # Module Structure
//!
//! ```text
//! orbit-renderer/
//! ├── constants.rs     # Formats and limits
//! ├── uniforms.rs      # Scene and per-mesh uniform layouts
//! ├── target.rs        # Offscreen color/MSAA/depth targets
//! ├── textures.rs      # Environment and video textures
//! ├── mesh.rs          # Vertex format, GPU meshes and the mesh pipeline
//! ├── backend.rs       # WgpuBackend (RenderBackend implementation)
//! └── shaders/mesh.wgsl
//! ```

pub mod backend;
pub mod constants;
pub mod mesh;
pub mod target;
pub mod textures;
pub mod uniforms;

pub use backend::{RenderSurface, WgpuBackend};
pub use mesh::MeshVertex;
pub use uniforms::{MeshUniform, SceneUniform};
