//! Orbit Viewer core
//!
//! Platform-independent logic for a single-subject 3D viewer that rotates a
//! loaded model toward a pointer-driven target angle.
//!
//! # Module Structure
//!
//! ```text
//! orbit-core/
//! ├── pointer.rs      # Pointer Tracker (mouse/touch -> target rotation)
//! ├── easing.rs       # Easing Integrator (first-order lag)
//! ├── camera.rs       # Perspective camera parameters and matrices
//! ├── scene.rs        # Lights and output color pipeline settings
//! ├── asset/          # LoadedAsset model + glTF/OBJ decoding
//! ├── environment.rs  # Equirectangular HDR environment maps
//! ├── material.rs     # Material Binder
//! ├── video.rs        # Live video frame sources
//! ├── scroll.rs       # Section scroll snapping
//! ├── event.rs        # Session event queue, load requests, cancellation
//! ├── backend.rs      # RenderBackend / Host / AssetLoader seams
//! ├── config.rs       # Serializable viewer configuration
//! └── session.rs      # ViewerSession (bootstrap, render loop, lifecycle)
//! ```

pub mod asset;
pub mod backend;
pub mod camera;
pub mod config;
pub mod constants;
pub mod easing;
pub mod environment;
pub mod event;
pub mod material;
pub mod pointer;
pub mod rotation;
pub mod scene;
pub mod scroll;
pub mod session;
pub mod video;

#[cfg(test)]
mod testing;

pub use asset::{
    AssetError, ColorMap, ColorTexture, LoadedAsset, Material, MeshGeometry, MeshNode, ModelFormat,
};
pub use backend::{
    AssetLoader, FrameHandle, Host, ListenerId, ListenerKind, ModelId, RenderBackend, RenderError,
};
pub use camera::PerspectiveCamera;
pub use config::{ConfigError, MaterialProfile, ViewerConfig};
pub use easing::Easing;
pub use environment::EnvironmentMap;
pub use event::{CancelToken, EventQueue, EventSender, LoadOutcome, LoadRequest, ViewerEvent};
pub use material::{BindReport, MaterialBinder};
pub use pointer::{PointerTracker, TouchPoint, Viewport};
pub use rotation::Rotation;
pub use scene::{ColorSpace, DirectionalLight, OutputSettings, ToneMapping};
pub use scroll::SectionSnapper;
pub use session::{SessionState, ViewerSession};
pub use video::{ImageSequence, VideoFrame, VideoFrameSource};
