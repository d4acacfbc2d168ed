//! Transform used to build per-drawable model matrices.

use glam::{Mat4, Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Uniformly scale this transform.
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Create the model matrix for this transform (scale, then rotate, then translate).
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Spin about world +Y by `angle` radians, on top of the current rotation.
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation = Quat::from_rotation_y(angle) * self.rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity_matrix() {
        assert_eq!(Transform::default().to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_then_scale_matches_manual_product() {
        let t = Transform::from_position(Vec3::new(3.0, -1.0, 2.0)).with_uniform_scale(0.05);
        let expected = Mat4::from_translation(Vec3::new(3.0, -1.0, 2.0))
            * Mat4::from_scale(Vec3::splat(0.05));
        assert!(t.to_matrix().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn rotate_y_quarter_turn_moves_forward_to_minus_x() {
        let mut t = Transform::default();
        t.rotate_y(std::f32::consts::FRAC_PI_2);
        assert!(t.forward().abs_diff_eq(-Vec3::X, 1e-6));
        assert!(t.up().abs_diff_eq(Vec3::Y, 1e-6));
    }
}
