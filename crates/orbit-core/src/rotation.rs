//! Two-axis model rotation

use glam::{EulerRot, Quat};
use serde::{Deserialize, Serialize};

/// Yaw/pitch pair in radians.
///
/// Yaw turns the subject around the vertical (Y) axis, pitch around the
/// horizontal (X) axis. Values are unbounded; nothing wraps them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Rotation {
    /// No rotation
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a rotation from yaw and pitch in radians
    pub const fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Per-axis difference `self - other`
    pub fn delta(self, other: Self) -> Self {
        Self::new(self.yaw - other.yaw, self.pitch - other.pitch)
    }

    /// Euclidean distance between two rotations in (yaw, pitch) space
    pub fn distance(self, other: Self) -> f32 {
        let d = self.delta(other);
        d.yaw.hypot(d.pitch)
    }

    /// Quaternion using X-then-Y Euler order (pitch applied on X, yaw on Y)
    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0)
    }
}
