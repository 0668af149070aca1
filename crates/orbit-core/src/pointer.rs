//! Pointer Tracker
//!
//! Maps raw mouse/touch positions into a target rotation. The mapping is pure
//! and event-driven: each event overwrites the target, nothing is smoothed or
//! queued here.

use serde::{Deserialize, Serialize};

use crate::constants::{POINTER_PITCH_SCALE, POINTER_YAW_SCALE};
use crate::rotation::Rotation;

/// Viewport size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero, negative or not finite
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    /// Width / height, or `None` for a degenerate viewport
    pub fn aspect(&self) -> Option<f32> {
        if self.is_degenerate() {
            None
        } else {
            Some(self.width / self.height)
        }
    }

    /// Normalize a client position into [-1, 1] on both axes, Y pointing up
    pub fn normalize(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        if self.is_degenerate() {
            return None;
        }
        let nx = (x / self.width) * 2.0 - 1.0;
        let ny = -(y / self.height) * 2.0 + 1.0;
        Some((nx, ny))
    }

    /// Surface size in whole pixels, never below 1x1
    pub fn pixel_size(&self, pixels_per_point: f32) -> (u32, u32) {
        let w = (self.width * pixels_per_point).round().max(1.0) as u32;
        let h = (self.height * pixels_per_point).round().max(1.0) as u32;
        (w, h)
    }
}

/// One active touch contact in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

/// Converts pointer positions into target rotations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTracker {
    yaw_scale: f32,
    pitch_scale: f32,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self {
            yaw_scale: POINTER_YAW_SCALE,
            pitch_scale: POINTER_PITCH_SCALE,
        }
    }
}

impl PointerTracker {
    /// Create a tracker with the standard ±π/4 yaw and ±π/8 pitch range
    pub fn new() -> Self {
        Self::default()
    }

    /// Target rotation for a pointer at client position `(x, y)`
    pub fn target_for(&self, viewport: Viewport, x: f32, y: f32) -> Option<Rotation> {
        let (nx, ny) = viewport.normalize(x, y)?;
        Some(Rotation::new(nx * self.yaw_scale, -ny * self.pitch_scale))
    }

    /// Overwrite `target` from a mouse position. Returns false if ignored.
    pub fn track_mouse(&self, viewport: Viewport, x: f32, y: f32, target: &mut Rotation) -> bool {
        match self.target_for(viewport, x, y) {
            Some(rotation) => {
                *target = rotation;
                true
            }
            None => false,
        }
    }

    /// Overwrite `target` from a touch-move event.
    ///
    /// Only single-finger touches count; pinches and multi-finger gestures
    /// leave the target untouched.
    pub fn track_touch(
        &self,
        viewport: Viewport,
        touches: &[TouchPoint],
        target: &mut Rotation,
    ) -> bool {
        match touches {
            [touch] => self.track_mouse(viewport, touch.x, touch.y, target),
            _ => false,
        }
    }
}
