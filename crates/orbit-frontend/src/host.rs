//! egui side of a viewer session
//!
//! [`EguiHost`] is moved into its session; the app keeps a [`SharedHost`]
//! handle to the same state so it can forward window events for registered
//! listeners, deliver requested frames and show the mounted surface.

use std::sync::Arc;

use parking_lot::Mutex;

use orbit_core::{FrameHandle, Host, ListenerId, ListenerKind, Viewport};
use orbit_renderer::RenderSurface;

/// State shared between a session's host and the app
#[derive(Debug)]
pub struct HostState {
    viewport: Viewport,
    pixels_per_point: f32,
    listeners: Vec<(ListenerId, ListenerKind)>,
    next_listener: u64,
    pending_frame: Option<FrameHandle>,
    next_frame: u64,
    surface: Option<RenderSurface>,
    texture_id: Option<egui::TextureId>,
    mounted: bool,
    scroll_offset: f32,
    scroll_request: Option<f32>,
}

pub type SharedHost = Arc<Mutex<HostState>>;

impl HostState {
    pub fn new(viewport: Viewport, pixels_per_point: f32) -> Self {
        Self {
            viewport,
            pixels_per_point,
            listeners: Vec::new(),
            next_listener: 1,
            pending_frame: None,
            next_frame: 1,
            surface: None,
            texture_id: None,
            mounted: false,
            scroll_offset: 0.0,
            scroll_request: None,
        }
    }

    pub fn shared(viewport: Viewport, pixels_per_point: f32) -> SharedHost {
        Arc::new(Mutex::new(Self::new(viewport, pixels_per_point)))
    }

    /// Whether a listener of `kind` is registered
    pub fn listens(&self, kind: ListenerKind) -> bool {
        self.listeners.iter().any(|(_, k)| *k == kind)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Record the window size. The session learns about it through a resize
    /// event.
    pub fn set_viewport(&mut self, viewport: Viewport, pixels_per_point: f32) {
        self.viewport = viewport;
        self.pixels_per_point = pixels_per_point;
    }

    pub fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll_offset = offset;
    }

    /// Take the requested frame, if any, to deliver it
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        self.pending_frame.take()
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Take the offset the session asked the page to scroll to
    pub fn take_scroll_request(&mut self) -> Option<f32> {
        self.scroll_request.take()
    }

    /// egui texture of the mounted surface
    pub fn texture_id(&self) -> Option<egui::TextureId> {
        self.texture_id
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

/// [`Host`] over egui, registering surfaces as native egui textures
pub struct EguiHost {
    state: SharedHost,
    render_state: Option<egui_wgpu::RenderState>,
}

impl EguiHost {
    /// `render_state` is `None` only where no GPU exists; surfaces are then
    /// tracked but never shown.
    pub fn new(state: SharedHost, render_state: Option<egui_wgpu::RenderState>) -> Self {
        Self {
            state,
            render_state,
        }
    }

    pub fn state(&self) -> &SharedHost {
        &self.state
    }

    fn free_texture(&self, state: &mut HostState) {
        if let Some(id) = state.texture_id.take()
            && let Some(render_state) = &self.render_state
        {
            render_state.renderer.write().free_texture(&id);
        }
    }
}

impl Host for EguiHost {
    type Surface = Option<RenderSurface>;

    fn viewport(&self) -> Viewport {
        self.state.lock().viewport
    }

    fn pixels_per_point(&self) -> f32 {
        self.state.lock().pixels_per_point
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let mut state = self.state.lock();
        let id = ListenerId(state.next_listener);
        state.next_listener += 1;
        state.listeners.push((id, kind));
        tracing::debug!("Listener {:?} added for {:?}", id, kind);
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        let mut state = self.state.lock();
        let before = state.listeners.len();
        state.listeners.retain(|(listener, _)| *listener != id);
        if state.listeners.len() == before {
            tracing::warn!("Removing unknown listener {:?}", id);
        }
    }

    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.lock();
        let handle = FrameHandle(state.next_frame);
        state.next_frame += 1;
        state.pending_frame = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.lock();
        if state.pending_frame == Some(handle) {
            state.pending_frame = None;
        }
    }

    fn mount_surface(&mut self, surface: Option<RenderSurface>) {
        let mut state = self.state.lock();
        let Some(surface) = surface else {
            tracing::warn!("No surface to mount");
            return;
        };

        let unchanged = state
            .surface
            .as_ref()
            .is_some_and(|current| current.generation == surface.generation);
        if unchanged && state.mounted {
            return;
        }

        self.free_texture(&mut state);
        if let Some(render_state) = &self.render_state {
            let id = render_state.renderer.write().register_native_texture(
                &render_state.device,
                &surface.view,
                wgpu::FilterMode::Linear,
            );
            state.texture_id = Some(id);
        }
        tracing::debug!(
            "Surface mounted ({}x{}, generation {})",
            surface.width,
            surface.height,
            surface.generation
        );
        state.surface = Some(surface);
        state.mounted = true;
    }

    fn detach_surface(&mut self) {
        let mut state = self.state.lock();
        self.free_texture(&mut state);
        state.surface = None;
        state.mounted = false;
    }

    fn scroll_offset(&self) -> f32 {
        self.state.lock().scroll_offset
    }

    fn scroll_to(&mut self, offset: f32) {
        let mut state = self.state.lock();
        state.scroll_request = Some(offset);
        state.scroll_offset = offset;
    }
}
