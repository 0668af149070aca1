//! Recording collaborators for session tests

use std::cell::RefCell;
use std::rc::Rc;

use glam::Mat4;

use crate::asset::{LoadedAsset, Material, MeshGeometry, MeshNode};
use crate::backend::{
    AssetLoader, FrameHandle, Host, ListenerId, ListenerKind, ModelId, RenderBackend, RenderError,
};
use crate::camera::PerspectiveCamera;
use crate::environment::EnvironmentMap;
use crate::event::LoadRequest;
use crate::pointer::Viewport;
use crate::scene::{DirectionalLight, OutputSettings};
use crate::video::{VideoFrame, VideoFrameSource};

/// Everything the session asked of its collaborators, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetOutput(OutputSettings),
    Resize(u32, u32),
    SetCamera { aspect: f32 },
    AddLight(DirectionalLight),
    SetEnvironment { width: u32, intensity: f32 },
    AddModel { meshes: usize, scale: f32 },
    SetTransform(ModelId, Mat4),
    UploadVideo,
    Draw,
    Dispose,
    AddListener(ListenerKind, ListenerId),
    RemoveListener(ListenerId),
    RequestFrame(FrameHandle),
    CancelFrame(FrameHandle),
    MountSurface(u32),
    DetachSurface,
    ScrollTo(f32),
    VideoPlay,
    VideoStop,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

pub fn calls(log: &CallLog) -> Vec<Call> {
    log.borrow().clone()
}

pub fn count(log: &CallLog, matches: impl Fn(&Call) -> bool) -> usize {
    log.borrow().iter().filter(|c| matches(c)).count()
}

pub struct RecordingBackend {
    log: CallLog,
    generation: u32,
    next_model: u64,
    pub fail_draw: bool,
}

impl RecordingBackend {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            generation: 0,
            next_model: 1,
            fail_draw: false,
        }
    }

    fn push(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl RenderBackend for RecordingBackend {
    type Surface = u32;

    fn set_output(&mut self, settings: OutputSettings) {
        self.push(Call::SetOutput(settings));
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.generation += 1;
        self.push(Call::Resize(width, height));
    }

    fn set_camera(&mut self, camera: &PerspectiveCamera) {
        self.push(Call::SetCamera {
            aspect: camera.aspect,
        });
    }

    fn add_light(&mut self, light: DirectionalLight) {
        self.push(Call::AddLight(light));
    }

    fn set_environment(&mut self, map: &EnvironmentMap) {
        self.push(Call::SetEnvironment {
            width: map.width,
            intensity: map.intensity,
        });
    }

    fn add_model(&mut self, asset: &LoadedAsset) -> Result<ModelId, RenderError> {
        let id = ModelId(self.next_model);
        self.next_model += 1;
        self.push(Call::AddModel {
            meshes: asset.mesh_count(),
            scale: asset.scale,
        });
        Ok(id)
    }

    fn set_model_transform(&mut self, id: ModelId, transform: Mat4) {
        self.push(Call::SetTransform(id, transform));
    }

    fn upload_video_frame(&mut self, _frame: &VideoFrame) {
        self.push(Call::UploadVideo);
    }

    fn draw(&mut self) -> Result<(), RenderError> {
        self.push(Call::Draw);
        if self.fail_draw {
            Err(RenderError::SurfaceUnavailable("lost".into()))
        } else {
            Ok(())
        }
    }

    fn surface(&self) -> u32 {
        self.generation
    }

    fn dispose(&mut self) {
        self.push(Call::Dispose);
    }
}

pub struct RecordingHost {
    log: CallLog,
    pub viewport: Viewport,
    pub scroll: f32,
    next_listener: u64,
    next_frame: u64,
}

impl RecordingHost {
    pub fn new(log: CallLog, viewport: Viewport) -> Self {
        Self {
            log,
            viewport,
            scroll: 0.0,
            next_listener: 1,
            next_frame: 1,
        }
    }

    fn push(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl Host for RecordingHost {
    type Surface = u32;

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.push(Call::AddListener(kind, id));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.push(Call::RemoveListener(id));
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_frame);
        self.next_frame += 1;
        self.push(Call::RequestFrame(handle));
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.push(Call::CancelFrame(handle));
    }

    fn mount_surface(&mut self, surface: u32) {
        self.push(Call::MountSurface(surface));
    }

    fn detach_surface(&mut self) {
        self.push(Call::DetachSurface);
    }

    fn scroll_offset(&self) -> f32 {
        self.scroll
    }

    fn scroll_to(&mut self, offset: f32) {
        self.scroll = offset;
        self.push(Call::ScrollTo(offset));
    }
}

/// Stores requests so tests decide when (and whether) loads complete
#[derive(Default)]
pub struct ManualLoader {
    pub models: RefCell<Vec<LoadRequest<LoadedAsset>>>,
    pub environments: RefCell<Vec<LoadRequest<EnvironmentMap>>>,
}

impl ManualLoader {
    pub fn take_model(&self) -> LoadRequest<LoadedAsset> {
        self.models.borrow_mut().remove(0)
    }

    pub fn take_environment(&self) -> LoadRequest<EnvironmentMap> {
        self.environments.borrow_mut().remove(0)
    }
}

impl AssetLoader for ManualLoader {
    fn load_model(&self, request: LoadRequest<LoadedAsset>) {
        self.models.borrow_mut().push(request);
    }

    fn load_environment(&self, request: LoadRequest<EnvironmentMap>) {
        self.environments.borrow_mut().push(request);
    }
}

/// Video source that yields a new frame on every poll while playing
pub struct RecordingVideo {
    log: CallLog,
    playing: bool,
}

impl RecordingVideo {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            playing: false,
        }
    }
}

impl VideoFrameSource for RecordingVideo {
    fn play(&mut self) {
        self.playing = true;
        self.log.borrow_mut().push(Call::VideoPlay);
    }

    fn stop(&mut self) {
        self.playing = false;
        self.log.borrow_mut().push(Call::VideoStop);
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn next_frame(&mut self, _time: f64) -> Option<VideoFrame> {
        self.playing.then(|| VideoFrame::solid(1, 1, [255, 0, 0, 255]))
    }
}

/// One-triangle mesh
pub fn triangle_mesh(name: &str) -> MeshNode {
    MeshNode {
        name: name.to_string(),
        geometry: MeshGeometry::new(
            vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![],
            vec![],
            vec![0, 1, 2],
        ),
        material: Material::default(),
    }
}

/// Asset made of one triangle per name
pub fn asset_with(names: &[&str]) -> LoadedAsset {
    let meshes = names.iter().map(|name| triangle_mesh(name)).collect();
    LoadedAsset::new("fixture", meshes).unwrap_or_else(|e| panic!("fixture asset: {e}"))
}

pub fn environment() -> EnvironmentMap {
    EnvironmentMap::from_rgba(2, 1, vec![1.0; 8]).unwrap_or_else(|e| panic!("fixture map: {e}"))
}
