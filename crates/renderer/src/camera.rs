//! Fixed perspective camera.

use engine_core::Transform;
use glam::{Mat4, Vec3};

/// Camera looking down -Z from a fixed position, with configurable FOV and clipping planes.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera transform (position and rotation).
    pub transform: Transform,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::from_position(Vec3::new(0.0, 0.0, 5.0)),
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            aspect: 800.0 / 600.0,
        }
    }
}

impl Camera {
    /// Camera `distance` units in front of the origin, looking at it.
    pub fn new(distance: f32) -> Self {
        Self {
            transform: Transform::from_position(Vec3::new(0.0, 0.0, distance)),
            ..Default::default()
        }
    }

    pub fn with_fov(mut self, fov_degrees: f32) -> Self {
        self.fov_degrees = fov_degrees;
        self
    }

    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.transform.position;
        let target = eye + self.transform.forward();
        Mat4::look_at_rh(eye, target, self.transform.up())
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
