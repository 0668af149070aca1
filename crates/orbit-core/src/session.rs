//! Viewer session: scene bootstrap, render loop and lifecycle
//!
//! A session is created by [`ViewerSession::mount`] and lives until
//! [`ViewerSession::unmount`] (or drop). In between, the owner calls
//! [`ViewerSession::pump`] whenever events may have been queued; each event is
//! handled to completion before the next one.
//!
//! ```text
//! Mounting ──mount done──▶ Active ──unmount──▶ Unmounting ──teardown──▶ Disposed
//! ```

use glam::{Mat4, Vec3};

use crate::asset::LoadedAsset;
use crate::backend::{AssetLoader, FrameHandle, Host, ListenerId, ListenerKind, ModelId, RenderBackend};
use crate::camera::PerspectiveCamera;
use crate::config::ViewerConfig;
use crate::easing::Easing;
use crate::environment::EnvironmentMap;
use crate::event::{CancelToken, EventQueue, LoadOutcome, LoadRequest, ViewerEvent};
use crate::material::MaterialBinder;
use crate::pointer::{PointerTracker, TouchPoint, Viewport};
use crate::rotation::Rotation;
use crate::scene::{DirectionalLight, OutputSettings};
use crate::scroll::SectionSnapper;
use crate::video::VideoFrameSource;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Mounting,
    Active,
    Unmounting,
    Disposed,
}

#[derive(Debug, Clone, Copy)]
struct AttachedModel {
    id: ModelId,
    scale: f32,
    video_bound: bool,
}

impl AttachedModel {
    fn transform(&self, rotation: Rotation) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation.to_quat(), Vec3::ZERO)
    }
}

/// One mounted viewer
pub struct ViewerSession<R, H>
where
    R: RenderBackend,
    H: Host<Surface = R::Surface>,
{
    config: ViewerConfig,
    state: SessionState,
    renderer: Option<R>,
    host: H,
    queue: EventQueue,
    token: CancelToken,

    camera: PerspectiveCamera,
    viewport: Viewport,
    tracker: PointerTracker,
    easing: Easing,
    current: Rotation,
    target: Rotation,

    model: Option<AttachedModel>,
    video: Option<Box<dyn VideoFrameSource>>,
    snapper: Option<SectionSnapper>,

    listeners: Vec<ListenerId>,
    pending_frame: Option<FrameHandle>,
    frames_drawn: u64,
}

impl<R, H> ViewerSession<R, H>
where
    R: RenderBackend,
    H: Host<Surface = R::Surface>,
{
    /// Bootstrap the scene, mount the surface, register listeners and request
    /// the first frame.
    ///
    /// Model and environment loads are issued through `loader`; their
    /// results arrive on `queue` and are applied by [`pump`](Self::pump).
    pub fn mount(
        config: ViewerConfig,
        renderer: R,
        host: H,
        loader: &dyn AssetLoader,
        queue: EventQueue,
        video: Option<Box<dyn VideoFrameSource>>,
    ) -> Self {
        let viewport = host.viewport();
        let camera = PerspectiveCamera::new(&config.camera, viewport);
        let snapper = config
            .scroll_snap
            .then(|| SectionSnapper::with_offset(host.scroll_offset()));

        let mut session = Self {
            easing: Easing::new(config.easing_factor),
            state: SessionState::Mounting,
            renderer: Some(renderer),
            host,
            queue,
            token: CancelToken::new(),
            camera,
            viewport,
            tracker: PointerTracker::new(),
            current: Rotation::ZERO,
            target: Rotation::ZERO,
            model: None,
            video,
            snapper,
            listeners: Vec::new(),
            pending_frame: None,
            frames_drawn: 0,
            config,
        };

        tracing::info!("Mounting viewer '{}'", session.config.name);
        session.bootstrap(loader);

        if let Some(renderer) = &session.renderer {
            session.host.mount_surface(renderer.surface());
        }

        let mut kinds = vec![
            ListenerKind::Resize,
            ListenerKind::PointerMove,
            ListenerKind::TouchMove,
        ];
        if session.snapper.is_some() {
            kinds.push(ListenerKind::Scroll);
        }
        for kind in kinds {
            let id = session.host.add_listener(kind);
            session.listeners.push(id);
        }
        tracing::debug!(
            "Viewer '{}' registered {} listener(s)",
            session.config.name,
            session.listeners.len()
        );

        session.pending_frame = Some(session.host.request_frame());
        session.state = SessionState::Active;
        session
    }

    fn bootstrap(&mut self, loader: &dyn AssetLoader) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        renderer.set_output(OutputSettings::from(&self.config.output));
        let (width, height) = self.viewport.pixel_size(self.host.pixels_per_point());
        renderer.resize(width, height);
        renderer.set_camera(&self.camera);
        for light in DirectionalLight::rim_pair(&self.config.lighting) {
            renderer.add_light(light);
        }

        let sender = self.queue.sender();
        match &self.config.environment.path {
            Some(path) => loader.load_environment(LoadRequest::environment(
                path.clone(),
                self.token.clone(),
                sender.clone(),
            )),
            None => tracing::info!("Viewer '{}' has no environment map", self.config.name),
        }
        loader.load_model(LoadRequest::model(
            self.config.model.path.clone(),
            self.token.clone(),
            sender,
        ));

        if let Some(video) = self.video.as_mut() {
            video.play();
        }
    }

    /// Handle every queued event. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let events = self.queue.drain();
        let count = events.len();
        for event in events {
            self.handle(event);
        }
        count
    }

    /// Handle one event
    pub fn handle(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::Resize(viewport) => self.on_resize(viewport),
            ViewerEvent::PointerMove { x, y } => self.on_pointer(x, y),
            ViewerEvent::TouchMove { touches } => self.on_touch(&touches),
            ViewerEvent::Scroll { offset } => {
                if let Some(snapper) = self.snapper.as_mut() {
                    snapper.record(offset);
                }
            }
            ViewerEvent::Frame { handle, time } => self.on_frame(handle, time),
            ViewerEvent::ModelLoaded(outcome) => self.on_model_loaded(outcome),
            ViewerEvent::EnvironmentLoaded(outcome) => self.on_environment_loaded(outcome),
        }
    }

    fn on_pointer(&mut self, x: f32, y: f32) {
        if self.state == SessionState::Active {
            self.tracker.track_mouse(self.viewport, x, y, &mut self.target);
        }
    }

    fn on_touch(&mut self, touches: &[TouchPoint]) {
        if self.state == SessionState::Active {
            self.tracker.track_touch(self.viewport, touches, &mut self.target);
        }
    }

    fn on_resize(&mut self, viewport: Viewport) {
        if self.state != SessionState::Active {
            return;
        }
        if !self.camera.update_aspect(viewport) {
            tracing::debug!(
                "Ignoring degenerate viewport {}x{}",
                viewport.width,
                viewport.height
            );
            return;
        }
        self.viewport = viewport;

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let (width, height) = viewport.pixel_size(self.host.pixels_per_point());
        renderer.resize(width, height);
        renderer.set_camera(&self.camera);
        self.host.mount_surface(renderer.surface());
        tracing::debug!(
            "Viewer '{}' resized to {}x{} px",
            self.config.name,
            width,
            height
        );
    }

    fn on_frame(&mut self, handle: FrameHandle, time: f64) {
        if self.state != SessionState::Active {
            return;
        }
        if self.pending_frame != Some(handle) {
            tracing::warn!("Ignoring stale frame {:?}", handle);
            return;
        }
        self.pending_frame = Some(self.host.request_frame());

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        let target = self.target;
        if let Some(model) = self.model {
            self.easing.apply(&mut self.current, target);
            renderer.set_model_transform(model.id, model.transform(self.current));

            if model.video_bound
                && let Some(video) = self.video.as_mut()
                && let Some(frame) = video.next_frame(time)
            {
                renderer.upload_video_frame(&frame);
            }
        }

        if let Some(snapper) = self.snapper.as_mut()
            && let Some(offset) = snapper.evaluate(self.viewport.height)
        {
            self.host.scroll_to(offset);
        }

        match renderer.draw() {
            Ok(()) => self.frames_drawn += 1,
            Err(e) => tracing::error!("Viewer '{}' draw failed: {}", self.config.name, e),
        }
    }

    /// Load results are applied only while active and only for this
    /// session's token
    fn accepts(&self, token: &CancelToken) -> bool {
        self.state == SessionState::Active && token.same_as(&self.token) && !token.is_cancelled()
    }

    fn on_model_loaded(&mut self, outcome: LoadOutcome<LoadedAsset>) {
        if !self.accepts(&outcome.token) {
            tracing::debug!("Discarding late model '{}'", outcome.path);
            return;
        }
        if self.model.is_some() {
            tracing::warn!("Model already attached, ignoring '{}'", outcome.path);
            return;
        }

        let mut asset = match outcome.result {
            Ok(asset) => asset,
            Err(e) => {
                tracing::error!("Failed to load model '{}': {}", outcome.path, e);
                return;
            }
        };

        asset.scale = self.config.model.scale;
        let report = MaterialBinder::new(self.config.material.clone()).bind(&mut asset);
        let video_bound = report.video_bound > 0;

        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        match renderer.add_model(&asset) {
            Ok(id) => {
                let model = AttachedModel {
                    id,
                    scale: asset.scale,
                    video_bound,
                };
                renderer.set_model_transform(id, model.transform(self.current));
                self.model = Some(model);
                tracing::info!(
                    "Viewer '{}' loaded '{}': {} mesh(es), {} triangle(s)",
                    self.config.name,
                    asset.name,
                    asset.mesh_count(),
                    asset.triangle_count()
                );
            }
            Err(e) => tracing::error!("Failed to upload model '{}': {}", outcome.path, e),
        }
    }

    fn on_environment_loaded(&mut self, outcome: LoadOutcome<EnvironmentMap>) {
        if !self.accepts(&outcome.token) {
            tracing::debug!("Discarding late environment '{}'", outcome.path);
            return;
        }
        match outcome.result {
            Ok(mut map) => {
                map.intensity = self.config.environment.intensity;
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.set_environment(&map);
                }
                tracing::info!(
                    "Viewer '{}' environment '{}' installed ({}x{})",
                    self.config.name,
                    outcome.path,
                    map.width,
                    map.height
                );
            }
            Err(e) => tracing::error!(
                "Failed to load environment '{}': {}; rendering without reflections",
                outcome.path,
                e
            ),
        }
    }

    /// Tear the session down. Safe to call any number of times.
    ///
    /// Order: cancel outstanding loads and the pending frame, remove
    /// listeners in reverse registration order, detach the surface, release
    /// GPU resources, stop the video.
    pub fn unmount(&mut self) {
        if matches!(self.state, SessionState::Unmounting | SessionState::Disposed) {
            return;
        }
        self.state = SessionState::Unmounting;
        tracing::info!("Unmounting viewer '{}'", self.config.name);

        self.token.cancel();
        if let Some(handle) = self.pending_frame.take() {
            self.host.cancel_frame(handle);
        }
        while let Some(id) = self.listeners.pop() {
            self.host.remove_listener(id);
        }
        self.host.detach_surface();
        if let Some(mut renderer) = self.renderer.take() {
            renderer.dispose();
        }
        if let Some(mut video) = self.video.take() {
            video.stop();
        }
        self.model = None;

        let dropped = self.queue.drain().len();
        if dropped > 0 {
            tracing::debug!("Dropped {} queued event(s) on unmount", dropped);
        }
        self.state = SessionState::Disposed;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn current_rotation(&self) -> Rotation {
        self.current
    }

    pub fn target_rotation(&self) -> Rotation {
        self.target
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Handle of the frame the session waits for
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Renderer, until the session is torn down
    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }
}

impl<R, H> Drop for ViewerSession<R, H>
where
    R: RenderBackend,
    H: Host<Surface = R::Surface>,
{
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetError;
    use crate::constants::TV_SCREEN_MESH;
    use crate::event::EventSender;
    use crate::testing::{
        Call, CallLog, ManualLoader, RecordingBackend, RecordingHost, RecordingVideo, asset_with,
        calls, count, environment,
    };
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    type TestSession = ViewerSession<RecordingBackend, RecordingHost>;

    struct Fixture {
        session: TestSession,
        log: CallLog,
        sender: EventSender,
        loader: ManualLoader,
    }

    const VIEWPORT: Viewport = Viewport::new(1000.0, 500.0);

    fn mount(config: ViewerConfig) -> Fixture {
        let log = CallLog::default();
        let loader = ManualLoader::default();
        let queue = EventQueue::new();
        let sender = queue.sender();
        let video: Option<Box<dyn VideoFrameSource>> = config
            .video
            .as_ref()
            .map(|_| Box::new(RecordingVideo::new(log.clone())) as Box<dyn VideoFrameSource>);
        let session = ViewerSession::mount(
            config,
            RecordingBackend::new(log.clone()),
            RecordingHost::new(log.clone(), VIEWPORT),
            &loader,
            queue,
            video,
        );
        Fixture {
            session,
            log,
            sender,
            loader,
        }
    }

    impl Fixture {
        fn tick(&mut self, time: f64) {
            let handle = self.session.pending_frame().unwrap();
            self.sender.send(ViewerEvent::Frame { handle, time });
            self.session.pump();
        }

        fn load_model(&mut self, names: &[&str]) {
            self.loader.take_model().complete(Ok(asset_with(names)));
            self.session.pump();
        }
    }

    #[test]
    fn test_mount_bootstraps_then_goes_active() {
        let f = mount(ViewerConfig::toucan());
        assert_eq!(f.session.state(), SessionState::Active);

        let log = calls(&f.log);
        assert!(matches!(log[0], Call::SetOutput(_)));
        assert_eq!(log[1], Call::Resize(1000, 500));
        assert_eq!(log[2], Call::SetCamera { aspect: 2.0 });
        assert_eq!(count(&f.log, |c| matches!(c, Call::AddLight(_))), 2);

        // Surface mounted before listeners, first frame requested last
        let mount_at = log.iter().position(|c| matches!(c, Call::MountSurface(_))).unwrap();
        let first_listener = log
            .iter()
            .position(|c| matches!(c, Call::AddListener(..)))
            .unwrap();
        assert!(mount_at < first_listener);
        assert!(matches!(log.last(), Some(Call::RequestFrame(_))));

        assert_eq!(f.loader.models.borrow().len(), 1);
        assert_eq!(f.loader.environments.borrow().len(), 1);
        assert_eq!(f.loader.models.borrow()[0].path(), "assets/toucan.glb");
    }

    #[test]
    fn test_camera_matches_variant() {
        let toucan = mount(ViewerConfig::toucan());
        assert_eq!(toucan.session.camera().position, Vec3::new(0.0, 0.5, 5.0));
        assert_eq!(toucan.session.camera().fov_degrees, 75.0);
        let tv = mount(ViewerConfig::tv());
        assert_eq!(tv.session.camera().position, Vec3::new(0.0, 0.0, 7.0));
    }

    #[test]
    fn test_scroll_listener_only_when_snapping() {
        let toucan = mount(ViewerConfig::toucan());
        let kinds = |log: &CallLog| -> Vec<ListenerKind> {
            calls(log)
                .into_iter()
                .filter_map(|c| match c {
                    Call::AddListener(kind, _) => Some(kind),
                    _ => None,
                })
                .collect()
        };
        assert_eq!(
            kinds(&toucan.log),
            vec![
                ListenerKind::Resize,
                ListenerKind::PointerMove,
                ListenerKind::TouchMove,
                ListenerKind::Scroll
            ]
        );
        let tv = mount(ViewerConfig::tv());
        assert!(!kinds(&tv.log).contains(&ListenerKind::Scroll));
    }

    #[test]
    fn test_no_environment_path_skips_request() {
        let mut config = ViewerConfig::toucan();
        config.environment.path = None;
        let f = mount(config);
        assert!(f.loader.environments.borrow().is_empty());
    }

    #[test]
    fn test_frame_reschedules_before_drawing() {
        let mut f = mount(ViewerConfig::toucan());
        f.log.borrow_mut().clear();
        f.tick(0.0);
        let log = calls(&f.log);
        assert!(matches!(log[0], Call::RequestFrame(_)));
        assert_eq!(log.last(), Some(&Call::Draw));
        assert_eq!(f.session.frames_drawn(), 1);
    }

    #[test]
    fn test_stale_frame_is_ignored() {
        let mut f = mount(ViewerConfig::toucan());
        let first = f.session.pending_frame().unwrap();
        f.tick(0.0);
        f.sender.send(ViewerEvent::Frame {
            handle: first,
            time: 0.1,
        });
        f.session.pump();
        assert_eq!(count(&f.log, |c| *c == Call::Draw), 1);
    }

    #[test]
    fn test_ten_ticks_ease_toward_target() {
        let mut f = mount(ViewerConfig::toucan());
        f.load_model(&["beak"]);
        // Target (1.0, 0.5) directly, the tracker range cannot reach yaw 1.0
        f.session.target = Rotation::new(1.0, 0.5);
        for i in 0..10 {
            f.tick(i as f64 / 60.0);
        }
        let current = f.session.current_rotation();
        assert_relative_eq!(current.yaw, 0.401, epsilon = 1e-3);
        assert_relative_eq!(current.pitch, 0.200, epsilon = 1e-3);
    }

    #[test]
    fn test_no_easing_without_model() {
        let mut f = mount(ViewerConfig::toucan());
        f.sender.send(ViewerEvent::PointerMove { x: 1000.0, y: 0.0 });
        f.tick(0.0);
        assert_eq!(f.session.current_rotation(), Rotation::ZERO);
        assert_eq!(count(&f.log, |c| *c == Call::Draw), 1);
    }

    #[test]
    fn test_pointer_at_corner_sets_target() {
        let mut f = mount(ViewerConfig::toucan());
        f.sender.send(ViewerEvent::PointerMove { x: 1000.0, y: 0.0 });
        f.session.pump();
        let target = f.session.target_rotation();
        assert_relative_eq!(target.yaw, PI / 4.0, epsilon = 1e-6);
        assert_relative_eq!(target.pitch, -PI / 8.0, epsilon = 1e-6);

        f.sender.send(ViewerEvent::PointerMove { x: 500.0, y: 250.0 });
        f.session.pump();
        assert_eq!(f.session.target_rotation(), Rotation::ZERO);
    }

    #[test]
    fn test_multi_touch_is_ignored() {
        let mut f = mount(ViewerConfig::toucan());
        f.sender.send(ViewerEvent::TouchMove {
            touches: vec![TouchPoint { x: 0.0, y: 0.0 }, TouchPoint { x: 10.0, y: 10.0 }],
        });
        f.session.pump();
        assert_eq!(f.session.target_rotation(), Rotation::ZERO);

        f.sender.send(ViewerEvent::TouchMove {
            touches: vec![TouchPoint { x: 0.0, y: 500.0 }],
        });
        f.session.pump();
        assert_relative_eq!(f.session.target_rotation().yaw, -PI / 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_resize_updates_aspect_once() {
        let mut f = mount(ViewerConfig::toucan());
        f.log.borrow_mut().clear();
        f.sender.send(ViewerEvent::Resize(Viewport::new(800.0, 600.0)));
        f.session.pump();

        assert_relative_eq!(f.session.camera().aspect, 800.0 / 600.0);
        assert_eq!(
            calls(&f.log),
            vec![
                Call::Resize(800, 600),
                Call::SetCamera {
                    aspect: 800.0 / 600.0
                },
                Call::MountSurface(2),
            ]
        );
    }

    #[test]
    fn test_degenerate_resize_is_skipped() {
        let mut f = mount(ViewerConfig::toucan());
        f.log.borrow_mut().clear();
        f.sender.send(ViewerEvent::Resize(Viewport::new(0.0, 600.0)));
        f.session.pump();
        assert!(calls(&f.log).is_empty());
        assert_relative_eq!(f.session.camera().aspect, 2.0);
    }

    #[test]
    fn test_model_load_scales_binds_and_attaches() {
        let mut f = mount(ViewerConfig::toucan());
        f.load_model(&["beak", "body"]);
        assert!(f.session.has_model());
        assert!(calls(&f.log).contains(&Call::AddModel {
            meshes: 2,
            scale: 1.25
        }));
        match calls(&f.log).last() {
            Some(Call::SetTransform(_, transform)) => {
                let p = transform.transform_point3(Vec3::X);
                assert!(p.abs_diff_eq(Vec3::new(1.25, 0.0, 0.0), 1e-6));
            }
            other => panic!("expected transform, got {:?}", other),
        }
    }

    #[test]
    fn test_model_failure_leaves_stage_empty() {
        let mut f = mount(ViewerConfig::toucan());
        f.loader
            .take_model()
            .complete(Err(AssetError::Io("not found".into())));
        f.session.pump();
        assert!(!f.session.has_model());
        assert_eq!(count(&f.log, |c| matches!(c, Call::AddModel { .. })), 0);

        // Loop keeps drawing the empty stage
        f.tick(0.0);
        assert_eq!(count(&f.log, |c| *c == Call::Draw), 1);
        assert_eq!(f.session.state(), SessionState::Active);
    }

    #[test]
    fn test_environment_arrival_in_any_order() {
        let mut f = mount(ViewerConfig::toucan());
        f.load_model(&["beak"]);
        f.loader.take_environment().complete(Ok(environment()));
        f.session.pump();
        assert!(calls(&f.log).contains(&Call::SetEnvironment {
            width: 2,
            intensity: 1.0
        }));
    }

    #[test]
    fn test_environment_failure_is_not_fatal() {
        let mut f = mount(ViewerConfig::toucan());
        f.loader
            .take_environment()
            .complete(Err(AssetError::Io("offline".into())));
        f.session.pump();
        f.load_model(&["beak"]);
        assert!(f.session.has_model());
        assert_eq!(count(&f.log, |c| matches!(c, Call::SetEnvironment { .. })), 0);
    }

    #[test]
    fn test_unmount_order() {
        let mut f = mount(ViewerConfig::toucan());
        let registered: Vec<ListenerId> = calls(&f.log)
            .into_iter()
            .filter_map(|c| match c {
                Call::AddListener(_, id) => Some(id),
                _ => None,
            })
            .collect();
        let pending = f.session.pending_frame().unwrap();
        f.log.borrow_mut().clear();

        f.session.unmount();
        assert_eq!(f.session.state(), SessionState::Disposed);

        let mut expected = vec![Call::CancelFrame(pending)];
        expected.extend(registered.iter().rev().map(|id| Call::RemoveListener(*id)));
        expected.push(Call::DetachSurface);
        expected.push(Call::Dispose);
        assert_eq!(calls(&f.log), expected);
    }

    #[test]
    fn test_unmount_is_idempotent() {
        let mut f = mount(ViewerConfig::tv());
        f.session.unmount();
        f.session.unmount();
        assert_eq!(count(&f.log, |c| *c == Call::Dispose), 1);
        assert_eq!(count(&f.log, |c| *c == Call::DetachSurface), 1);
        assert_eq!(count(&f.log, |c| *c == Call::VideoStop), 1);
    }

    #[test]
    fn test_drop_unmounts_once() {
        let f = mount(ViewerConfig::toucan());
        let log = f.log.clone();
        drop(f);
        assert_eq!(count(&log, |c| *c == Call::Dispose), 1);
    }

    #[test]
    fn test_drop_after_unmount_does_not_release_twice() {
        let mut f = mount(ViewerConfig::toucan());
        f.session.unmount();
        let log = f.log.clone();
        drop(f);
        assert_eq!(count(&log, |c| *c == Call::Dispose), 1);
    }

    #[test]
    fn test_late_load_after_unmount_is_noop() {
        let mut f = mount(ViewerConfig::toucan());
        let model = f.loader.take_model();
        let env = f.loader.take_environment();
        f.session.unmount();
        f.log.borrow_mut().clear();

        // Cancelled requests do not even reach the queue
        assert!(!model.complete(Ok(asset_with(&["beak"]))));
        assert!(!env.complete(Ok(environment())));
        f.session.pump();
        assert!(calls(&f.log).is_empty());
        assert!(!f.session.has_model());
    }

    #[test]
    fn test_result_queued_before_unmount_is_discarded() {
        let mut f = mount(ViewerConfig::toucan());
        // Lands in the queue, but the session unmounts before pumping it
        f.loader.take_model().complete(Ok(asset_with(&["beak"])));
        f.session.unmount();
        f.log.borrow_mut().clear();
        f.session.pump();
        assert!(calls(&f.log).is_empty());
    }

    #[test]
    fn test_foreign_token_is_rejected() {
        let mut f = mount(ViewerConfig::toucan());
        let request = LoadRequest::model("other.glb", CancelToken::new(), f.sender.clone());
        request.complete(Ok(asset_with(&["beak"])));
        f.session.pump();
        assert!(!f.session.has_model());
    }

    #[test]
    fn test_no_draw_after_dispose() {
        let mut f = mount(ViewerConfig::toucan());
        let pending = f.session.pending_frame().unwrap();
        f.session.unmount();
        f.log.borrow_mut().clear();
        f.session.handle(ViewerEvent::Frame {
            handle: pending,
            time: 1.0,
        });
        f.session.handle(ViewerEvent::PointerMove { x: 0.0, y: 0.0 });
        assert!(calls(&f.log).is_empty());
        assert_eq!(f.session.frames_drawn(), 0);
    }

    #[test]
    fn test_draw_error_keeps_loop_running() {
        let mut f = mount(ViewerConfig::toucan());
        if let Some(renderer) = f.session.renderer.as_mut() {
            renderer.fail_draw = true;
        }
        f.tick(0.0);
        f.tick(0.016);
        assert_eq!(count(&f.log, |c| *c == Call::Draw), 2);
        assert_eq!(f.session.frames_drawn(), 0);
        assert!(f.session.pending_frame().is_some());
    }

    #[test]
    fn test_video_plays_from_mount_and_uploads_once_bound() {
        let mut f = mount(ViewerConfig::tv());
        assert!(calls(&f.log).contains(&Call::VideoPlay));

        f.tick(0.0);
        assert_eq!(count(&f.log, |c| *c == Call::UploadVideo), 0);

        f.load_model(&["frame", TV_SCREEN_MESH]);
        f.tick(0.1);
        assert_eq!(count(&f.log, |c| *c == Call::UploadVideo), 1);
    }

    #[test]
    fn test_video_not_uploaded_without_screen_mesh() {
        let mut f = mount(ViewerConfig::tv());
        f.load_model(&["frame", "stand"]);
        f.tick(0.0);
        f.tick(0.1);
        assert_eq!(count(&f.log, |c| matches!(c, Call::AddModel { .. })), 1);
        assert_eq!(count(&f.log, |c| *c == Call::UploadVideo), 0);
    }

    #[test]
    fn test_scroll_snaps_once_per_frame() {
        let mut f = mount(ViewerConfig::toucan());
        f.sender.send(ViewerEvent::Scroll { offset: 100.0 });
        f.sender.send(ViewerEvent::Scroll { offset: 150.0 });
        f.session.pump();
        assert_eq!(count(&f.log, |c| matches!(c, Call::ScrollTo(_))), 0);

        f.tick(0.0);
        assert!(calls(&f.log).contains(&Call::ScrollTo(500.0)));
        f.tick(0.016);
        assert_eq!(count(&f.log, |c| matches!(c, Call::ScrollTo(_))), 1);
    }

    #[test]
    fn test_scroll_ignored_without_snapping() {
        let mut f = mount(ViewerConfig::tv());
        f.sender.send(ViewerEvent::Scroll { offset: 100.0 });
        f.tick(0.0);
        assert_eq!(count(&f.log, |c| matches!(c, Call::ScrollTo(_))), 0);
    }
}
