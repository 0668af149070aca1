//! Main application: one full-height section per viewer in a scrolling page

use std::path::PathBuf;

use orbit_core::{AssetLoader, EventQueue, EventSender, ViewerEvent, ViewerSession, Viewport};
use orbit_renderer::WgpuBackend;

use crate::config::PageConfig;
use crate::host::{EguiHost, HostState, SharedHost};
use crate::input::{InputTranslator, WindowEvent};
use crate::video::open_video;

/// Viewport sessions mount with, until the window reports its real size
const FALLBACK_VIEWPORT: Viewport = Viewport::new(1280.0, 720.0);

/// One mounted viewer section
struct ViewerSlot {
    session: ViewerSession<WgpuBackend, EguiHost>,
    host: SharedHost,
    sender: EventSender,
}

impl ViewerSlot {
    /// Queue `event` if the session registered a listener for its kind
    fn forward(&self, event: &WindowEvent) {
        if self.host.lock().listens(event.kind()) {
            self.sender.send(event.to_viewer_event());
        }
    }

    fn deliver_frame(&self, time: f64) {
        let handle = self.host.lock().take_frame();
        if let Some(handle) = handle {
            self.sender.send(ViewerEvent::Frame { handle, time });
        }
    }
}

/// Main application
pub struct OrbitViewerApp {
    slots: Vec<ViewerSlot>,
    input: InputTranslator,
    gpu_missing: bool,
}

impl OrbitViewerApp {
    /// Mount every viewer of `page`. Relative asset paths resolve against
    /// `asset_root`.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        page: PageConfig,
        asset_root: Option<PathBuf>,
    ) -> Self {
        let ctx = cc.egui_ctx.clone();
        // The real window size arrives as a resize on the first frame
        let viewport = FALLBACK_VIEWPORT;
        let input = InputTranslator::new(viewport, 0.0);

        let Some(render_state) = cc.wgpu_render_state.clone() else {
            tracing::error!("wgpu is unavailable; no viewer can be mounted");
            return Self {
                slots: Vec::new(),
                input,
                gpu_missing: true,
            };
        };

        let loader = create_loader(asset_root.clone(), &ctx);
        let pixels_per_point = ctx.pixels_per_point();

        let slots = page
            .viewers
            .into_iter()
            .map(|config| {
                let queue = EventQueue::new();
                let sender = queue.sender();
                let host = HostState::shared(viewport, pixels_per_point);

                let renderer = WgpuBackend::new(
                    render_state.device.clone(),
                    render_state.queue.clone(),
                    render_state.target_format,
                );
                let video = config
                    .video
                    .as_ref()
                    .filter(|_| config.material.uses_video())
                    .and_then(|video| open_video(video, asset_root.as_deref()));

                let session = ViewerSession::mount(
                    config,
                    renderer,
                    EguiHost::new(host.clone(), Some(render_state.clone())),
                    loader.as_ref(),
                    queue,
                    video,
                );
                ViewerSlot {
                    session,
                    host,
                    sender,
                }
            })
            .collect::<Vec<_>>();

        tracing::info!("Mounted {} viewer(s)", slots.len());

        Self {
            slots,
            input,
            gpu_missing: false,
        }
    }

    /// Route this frame's window input to listening sessions
    fn forward_input(&mut self, ctx: &egui::Context) {
        let pixels_per_point = ctx.pixels_per_point();
        let mut window_events = Vec::new();

        if let Some(viewport) = window_viewport(ctx) {
            for slot in &self.slots {
                slot.host.lock().set_viewport(viewport, pixels_per_point);
            }
            window_events.extend(self.input.observe_viewport(viewport));
        }
        let events = ctx.input(|i| i.events.clone());
        window_events.extend(self.input.translate(&events));

        for event in &window_events {
            for slot in &self.slots {
                slot.forward(event);
            }
        }
    }

    /// Deliver requested frames and let every session handle its queue
    fn pump_sessions(&mut self, time: f64) {
        for slot in &mut self.slots {
            slot.deliver_frame(time);
            slot.session.pump();
        }
    }

    fn show_page(&mut self, ctx: &egui::Context) {
        let section = self.input.viewport();
        let scroll_request = self
            .slots
            .iter()
            .filter_map(|slot| slot.host.lock().take_scroll_request())
            .last();

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let mut area = egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .scroll_bar_visibility(egui::scroll_area::ScrollBarVisibility::AlwaysHidden);
                if let Some(offset) = scroll_request {
                    area = area.vertical_scroll_offset(offset);
                }

                let output = area.show(ui, |ui| {
                    ui.spacing_mut().item_spacing = egui::Vec2::ZERO;
                    let size = egui::vec2(section.width, section.height);
                    for slot in &self.slots {
                        let texture_id = slot.host.lock().texture_id();
                        match texture_id {
                            Some(id) => {
                                ui.add(egui::Image::new(egui::load::SizedTexture::new(id, size)));
                            }
                            None => {
                                ui.allocate_ui(size, |ui| {
                                    ui.centered_and_justified(|ui| ui.spinner());
                                });
                            }
                        }
                    }
                });

                let offset = output.state.offset.y;
                if let Some(event) = self.input.observe_scroll(offset) {
                    for slot in &self.slots {
                        slot.host.lock().set_scroll_offset(offset);
                        slot.forward(&event);
                    }
                }
            });
    }

    fn unmount_all(&mut self) {
        for slot in &mut self.slots {
            slot.session.unmount();
        }
    }
}

impl eframe::App for OrbitViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.gpu_missing {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| {
                    ui.label("This viewer needs a GPU (wgpu) to render.");
                });
            });
            return;
        }

        let time = ctx.input(|i| i.time);
        self.forward_input(ctx);
        self.pump_sessions(time);
        self.show_page(ctx);

        // Each session keeps requesting frames while it is mounted
        if self.slots.iter().any(|slot| slot.host.lock().has_pending_frame()) {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self) {
        self.unmount_all();
    }
}

fn window_viewport(ctx: &egui::Context) -> Option<Viewport> {
    let size = ctx.screen_rect().size();
    let viewport = Viewport::new(size.x, size.y);
    (!viewport.is_degenerate()).then_some(viewport)
}

#[cfg(not(target_arch = "wasm32"))]
fn create_loader(root: Option<PathBuf>, ctx: &egui::Context) -> Box<dyn AssetLoader> {
    Box::new(crate::loader::ThreadLoader::new(root, Some(ctx.clone())))
}

#[cfg(target_arch = "wasm32")]
fn create_loader(_root: Option<PathBuf>, ctx: &egui::Context) -> Box<dyn AssetLoader> {
    Box::new(crate::loader::FetchLoader::new(Some(ctx.clone())))
}
