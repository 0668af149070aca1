//! Video sources for video-subject viewers

use orbit_core::VideoFrameSource;
use orbit_core::config::VideoConfig;

#[cfg(target_arch = "wasm32")]
pub use web::HtmlVideoSource;

/// Open the source named by `config`, or `None` (logged) when it cannot be
/// opened. Relative sources resolve against `root`.
#[cfg(not(target_arch = "wasm32"))]
pub fn open_video(
    config: &VideoConfig,
    root: Option<&std::path::Path>,
) -> Option<Box<dyn VideoFrameSource>> {
    let source = std::path::Path::new(&config.source);
    let dir = match root {
        Some(root) if source.is_relative() => root.join(source),
        _ => source.to_path_buf(),
    };
    match orbit_core::ImageSequence::from_dir(&dir, config) {
        Ok(sequence) => {
            tracing::info!(
                "Video source {} ({} frames at {} fps)",
                dir.display(),
                sequence.frame_count(),
                config.fps
            );
            Some(Box::new(sequence))
        }
        Err(e) => {
            tracing::error!("Failed to open video source {}: {}", dir.display(), e);
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn open_video(
    config: &VideoConfig,
    _root: Option<&std::path::Path>,
) -> Option<Box<dyn VideoFrameSource>> {
    match HtmlVideoSource::new(config) {
        Ok(source) => Some(Box::new(source)),
        Err(e) => {
            tracing::error!("Failed to create video element for {}: {:?}", config.source, e);
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::{JsCast, JsValue};

    use orbit_core::{VideoFrame, VideoFrameSource};
    use orbit_core::config::VideoConfig;

    /// HAVE_CURRENT_DATA
    const READY_CURRENT_DATA: u16 = 2;

    /// Detached `<video>` element read back through a 2D canvas
    pub struct HtmlVideoSource {
        element: web_sys::HtmlVideoElement,
        canvas: web_sys::HtmlCanvasElement,
        context: web_sys::CanvasRenderingContext2d,
        source: String,
        last_time: Option<f64>,
        playing: bool,
    }

    impl HtmlVideoSource {
        pub fn new(config: &VideoConfig) -> Result<Self, JsValue> {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| JsValue::from_str("no document"))?;

            let element: web_sys::HtmlVideoElement =
                document.create_element("video")?.dyn_into()?;
            element.set_cross_origin(Some("anonymous"));
            element.set_loop(config.looped);
            element.set_muted(config.muted);
            element.set_autoplay(false);
            element.set_attribute("playsinline", "")?;

            let canvas: web_sys::HtmlCanvasElement =
                document.create_element("canvas")?.dyn_into()?;
            let context: web_sys::CanvasRenderingContext2d = canvas
                .get_context("2d")?
                .ok_or_else(|| JsValue::from_str("no 2d context"))?
                .dyn_into()?;

            Ok(Self {
                element,
                canvas,
                context,
                source: config.source.clone(),
                last_time: None,
                playing: false,
            })
        }

        fn read_frame(&self) -> Result<Option<VideoFrame>, JsValue> {
            let width = self.element.video_width();
            let height = self.element.video_height();
            if width == 0 || height == 0 {
                return Ok(None);
            }
            if self.canvas.width() != width || self.canvas.height() != height {
                self.canvas.set_width(width);
                self.canvas.set_height(height);
            }
            self.context
                .draw_image_with_html_video_element(&self.element, 0.0, 0.0)?;
            let image = self
                .context
                .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))?;
            Ok(VideoFrame::new(width, height, image.data().0))
        }
    }

    impl VideoFrameSource for HtmlVideoSource {
        fn play(&mut self) {
            if self.element.src().is_empty() {
                self.element.set_src(&self.source);
            }
            match self.element.play() {
                Ok(_) => self.playing = true,
                Err(e) => tracing::error!("Video play failed: {:?}", e),
            }
        }

        fn stop(&mut self) {
            if let Err(e) = self.element.pause() {
                tracing::warn!("Video pause failed: {:?}", e);
            }
            // Release the media resource
            if let Err(e) = self.element.remove_attribute("src") {
                tracing::warn!("Video src removal failed: {:?}", e);
            }
            self.element.load();
            self.playing = false;
            self.last_time = None;
        }

        fn is_playing(&self) -> bool {
            self.playing
        }

        fn next_frame(&mut self, _time: f64) -> Option<VideoFrame> {
            if !self.playing || self.element.ready_state() < READY_CURRENT_DATA {
                return None;
            }
            let current = self.element.current_time();
            if self.last_time == Some(current) {
                return None;
            }
            match self.read_frame() {
                Ok(frame) => {
                    if frame.is_some() {
                        self.last_time = Some(current);
                    }
                    frame
                }
                Err(e) => {
                    tracing::warn!("Video frame readback failed: {:?}", e);
                    None
                }
            }
        }
    }
}
