//! Orbit Viewer Frontend
//!
//! eframe application stacking one orbit viewer per page section. Each
//! section owns a [`orbit_core::ViewerSession`] driving a
//! [`orbit_renderer::WgpuBackend`] through an [`host::EguiHost`].
//!
//! # Module Structure
//!
//! ```text
//! orbit-frontend/
//! ├── app.rs      # OrbitViewerApp: sections, input routing, frame delivery
//! ├── config.rs   # PageConfig (RON)
//! ├── host.rs     # EguiHost (Host implementation)
//! ├── input.rs    # egui input -> window events
//! ├── loader.rs   # ThreadLoader (native), FetchLoader (wasm)
//! ├── video.rs    # Image sequences (native), <video> readback (wasm)
//! └── main.rs     # Native and wasm entry points
//! ```

pub mod app;
pub mod config;
pub mod host;
pub mod input;
pub mod loader;
pub mod video;

pub use app::OrbitViewerApp;
pub use config::PageConfig;
pub use host::{EguiHost, HostState, SharedHost};
