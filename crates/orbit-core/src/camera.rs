//! Perspective camera for the viewer stage

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;
use crate::pointer::Viewport;

/// Fixed perspective camera looking down -Z from its position
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    /// Create a camera from configuration and the initial viewport
    pub fn new(config: &CameraConfig, viewport: Viewport) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            fov_degrees: config.fov_degrees.clamp(1.0, 179.0),
            aspect: viewport.aspect().unwrap_or(1.0),
            near: config.near_plane.max(0.001),
            far: config.far_plane.max(config.near_plane + 1.0),
        }
    }

    /// Recompute the aspect ratio for a new viewport.
    ///
    /// Returns false (and keeps the previous aspect) for degenerate viewports.
    pub fn update_aspect(&mut self, viewport: Viewport) -> bool {
        match viewport.aspect() {
            Some(aspect) => {
                self.aspect = aspect;
                true
            }
            None => false,
        }
    }

    /// Get view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    /// Get projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    /// Combined projection * view
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
