//! Seams between a session and its platform
//!
//! A [`ViewerSession`](crate::session::ViewerSession) drives three
//! collaborators: a [`RenderBackend`] that owns GPU state, a [`Host`] that
//! owns the window/page side (listeners, frame scheduling, the mount point)
//! and an [`AssetLoader`] that resolves files asynchronously.

use glam::Mat4;

use crate::asset::LoadedAsset;
use crate::camera::PerspectiveCamera;
use crate::environment::EnvironmentMap;
use crate::event::LoadRequest;
use crate::pointer::Viewport;
use crate::scene::{DirectionalLight, OutputSettings};
use crate::video::VideoFrame;

/// Handle of a model attached to a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelId(pub u64);

/// Handle of a registered host listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Handle of a requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Window-level events a session can listen to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Resize,
    PointerMove,
    TouchMove,
    Scroll,
}

/// Errors that can occur while rendering
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("Render surface unavailable: {0}")]
    SurfaceUnavailable(String),

    #[error("GPU upload failed: {0}")]
    Upload(String),

    #[error("Renderer already disposed")]
    Disposed,
}

/// GPU side of a viewer
pub trait RenderBackend {
    /// What the host mounts to show the rendered image
    type Surface;

    /// Configure clear alpha, tone mapping and output encoding
    fn set_output(&mut self, settings: OutputSettings);

    /// Resize the drawing surface to physical pixels
    fn resize(&mut self, width: u32, height: u32);

    fn set_camera(&mut self, camera: &PerspectiveCamera);

    fn add_light(&mut self, light: DirectionalLight);

    /// Install an environment map as the reflection source
    fn set_environment(&mut self, map: &EnvironmentMap);

    /// Upload a model and attach it to the stage
    fn add_model(&mut self, asset: &LoadedAsset) -> Result<ModelId, RenderError>;

    fn set_model_transform(&mut self, id: ModelId, transform: Mat4);

    /// Replace the texture sampled by video-bound meshes
    fn upload_video_frame(&mut self, frame: &VideoFrame);

    /// Render one frame to the surface
    fn draw(&mut self) -> Result<(), RenderError>;

    /// Current drawing surface. Changes after a resize.
    fn surface(&self) -> Self::Surface;

    /// Release every GPU resource. Called exactly once.
    fn dispose(&mut self);
}

/// Window/page side of a viewer
pub trait Host {
    /// Mountable drawing surface, matching [`RenderBackend::Surface`]
    type Surface;

    /// Current viewport in logical pixels
    fn viewport(&self) -> Viewport;

    /// Physical pixels per logical pixel
    fn pixels_per_point(&self) -> f32 {
        1.0
    }

    /// Start forwarding events of `kind` to the session queue
    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);

    /// Schedule one [`ViewerEvent::Frame`](crate::event::ViewerEvent::Frame)
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Attach (or replace) the drawing surface at the mount point
    fn mount_surface(&mut self, surface: Self::Surface);

    fn detach_surface(&mut self);

    /// Current vertical page offset
    fn scroll_offset(&self) -> f32;

    fn scroll_to(&mut self, offset: f32);
}

/// Asynchronous asset resolution
///
/// Implementations must not block the session thread for long; they complete
/// each request exactly once, from any thread.
pub trait AssetLoader {
    fn load_model(&self, request: LoadRequest<LoadedAsset>);

    fn load_environment(&self, request: LoadRequest<EnvironmentMap>);
}
