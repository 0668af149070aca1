//! Easing Integrator
//!
//! First-order lag toward the target: `C' = C + (T - C) * k`, per axis.
//! Converges asymptotically and never overshoots for `k` in (0, 1). There is
//! no arrival state; callers keep stepping every frame.

use crate::constants::EASING_FACTOR;
use crate::rotation::Rotation;

/// Exponential smoothing toward a target rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Easing {
    factor: f32,
}

impl Default for Easing {
    fn default() -> Self {
        Self {
            factor: EASING_FACTOR,
        }
    }
}

impl Easing {
    /// Create an integrator with smoothing factor `k`.
    ///
    /// Factors outside (0, 1] fall back to the default.
    pub fn new(factor: f32) -> Self {
        if factor.is_finite() && factor > 0.0 && factor <= 1.0 {
            Self { factor }
        } else {
            tracing::warn!(
                "Easing factor {} out of range, using {}",
                factor,
                EASING_FACTOR
            );
            Self::default()
        }
    }

    /// Smoothing factor in use
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// One integration step
    pub fn step(&self, current: Rotation, target: Rotation) -> Rotation {
        Rotation::new(
            current.yaw + (target.yaw - current.yaw) * self.factor,
            current.pitch + (target.pitch - current.pitch) * self.factor,
        )
    }

    /// Advance `current` in place by one step
    pub fn apply(&self, current: &mut Rotation, target: Rotation) {
        *current = self.step(*current, target);
    }
}
