//! Live video frame sources
//!
//! A source is started at mount and polled once per frame; it only yields a
//! frame when the picture changed since the previous poll.

use std::path::Path;

use crate::asset::AssetError;
use crate::config::VideoConfig;

/// One RGBA8 video frame, row 0 at the top
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl VideoFrame {
    /// Create a frame, checking the buffer fills `width * height` texels
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        (width > 0 && height > 0 && rgba.len() == (width * height * 4) as usize).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    /// Single-color frame
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            width,
            height,
            rgba: color.repeat((width * height) as usize),
        }
    }
}

/// Source of frames for the video-bound mesh
pub trait VideoFrameSource {
    /// Start (or resume) playback
    fn play(&mut self);

    /// Stop playback and release the underlying media
    fn stop(&mut self);

    fn is_playing(&self) -> bool;

    /// Frame to show at `time` seconds, if it differs from the last one returned
    fn next_frame(&mut self, time: f64) -> Option<VideoFrame>;
}

/// Frames decoded up front and played at a fixed rate
#[derive(Debug, Clone)]
pub struct ImageSequence {
    frames: Vec<VideoFrame>,
    fps: f32,
    looped: bool,
    playing: bool,
    start_time: Option<f64>,
    last_index: Option<usize>,
}

impl ImageSequence {
    /// Create a sequence from already decoded frames
    pub fn from_frames(frames: Vec<VideoFrame>, fps: f32, looped: bool) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 30.0 };
        Self {
            frames,
            fps,
            looped,
            playing: false,
            start_time: None,
            last_index: None,
        }
    }

    /// Decode every PNG/JPEG in `dir`, ordered by file name
    pub fn from_dir(dir: impl AsRef<Path>, config: &VideoConfig) -> Result<Self, AssetError> {
        let dir = dir.as_ref();
        let io_error = |e: std::io::Error| AssetError::Io(format!("{}: {}", dir.display(), e));

        let mut paths: Vec<_> = std::fs::read_dir(dir)
            .map_err(io_error)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| matches!(e.to_lowercase().as_str(), "png" | "jpg" | "jpeg"))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            let image = image::open(path).map_err(|e| AssetError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            let rgba = image.into_rgba8();
            let (width, height) = rgba.dimensions();
            frames.push(VideoFrame {
                width,
                height,
                rgba: rgba.into_raw(),
            });
        }

        if frames.is_empty() {
            return Err(AssetError::Parse {
                path: dir.display().to_string(),
                reason: "no PNG or JPEG frames".to_string(),
            });
        }

        tracing::info!(
            "Loaded {} video frame(s) from {}",
            frames.len(),
            dir.display()
        );
        Ok(Self::from_frames(frames, config.fps, config.looped))
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn index_at(&self, elapsed: f64) -> Option<usize> {
        let len = self.frames.len();
        if len == 0 {
            return None;
        }
        let raw = (elapsed.max(0.0) * self.fps as f64).floor() as usize;
        Some(if self.looped { raw % len } else { raw.min(len - 1) })
    }
}

impl VideoFrameSource for ImageSequence {
    fn play(&mut self) {
        self.playing = true;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.start_time = None;
        self.last_index = None;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn next_frame(&mut self, time: f64) -> Option<VideoFrame> {
        if !self.playing {
            return None;
        }
        let start = *self.start_time.get_or_insert(time);
        let index = self.index_at(time - start)?;
        if self.last_index == Some(index) {
            return None;
        }
        self.last_index = Some(index);
        self.frames.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(looped: bool) -> ImageSequence {
        let frames = (0..3u8)
            .map(|i| VideoFrame::solid(1, 1, [i, i, i, 255]))
            .collect();
        ImageSequence::from_frames(frames, 10.0, looped)
    }

    #[test]
    fn test_nothing_before_play() {
        let mut seq = sequence(true);
        assert!(seq.next_frame(0.0).is_none());
        seq.play();
        assert_eq!(seq.next_frame(0.0).unwrap().rgba[0], 0);
    }

    #[test]
    fn test_frames_advance_with_time_and_loop() {
        let mut seq = sequence(true);
        seq.play();
        assert_eq!(seq.next_frame(5.0).unwrap().rgba[0], 0);
        // Same frame is not yielded twice
        assert!(seq.next_frame(5.05).is_none());
        assert_eq!(seq.next_frame(5.15).unwrap().rgba[0], 1);
        assert_eq!(seq.next_frame(5.25).unwrap().rgba[0], 2);
        assert_eq!(seq.next_frame(5.35).unwrap().rgba[0], 0);
    }

    #[test]
    fn test_unlooped_holds_last_frame() {
        let mut seq = sequence(false);
        seq.play();
        seq.next_frame(0.0);
        assert_eq!(seq.next_frame(10.0).unwrap().rgba[0], 2);
        assert!(seq.next_frame(20.0).is_none());
    }

    #[test]
    fn test_stop_resets_playback() {
        let mut seq = sequence(true);
        seq.play();
        seq.next_frame(1.0);
        seq.stop();
        assert!(!seq.is_playing());
        assert!(seq.next_frame(2.0).is_none());
    }

    #[test]
    fn test_from_dir_orders_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for (name, value) in [("frame_002.png", 20u8), ("frame_001.png", 10u8)] {
            image::RgbaImage::from_pixel(2, 2, image::Rgba([value, 0, 0, 255]))
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut seq = ImageSequence::from_dir(dir.path(), &VideoConfig::default()).unwrap();
        assert_eq!(seq.frame_count(), 2);
        seq.play();
        let first = seq.next_frame(0.0).unwrap();
        assert_eq!((first.width, first.height), (2, 2));
        assert_eq!(first.rgba[0], 10);
    }

    #[test]
    fn test_from_empty_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ImageSequence::from_dir(dir.path(), &VideoConfig::default()).is_err());
    }

    #[test]
    fn test_frame_new_checks_size() {
        assert!(VideoFrame::new(2, 2, vec![0; 15]).is_none());
        assert!(VideoFrame::new(2, 2, vec![0; 16]).is_some());
    }
}
