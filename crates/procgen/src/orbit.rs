//! Circular orbits for small bodies circling the globe.

use crate::error::GeometryError;
use glam::{Quat, Vec3};
use std::f32::consts::TAU;

/// A circular orbit around the origin.
///
/// The orbit lies in the XZ plane, tilted about +X by `inclination`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub radius: f32,
    /// Radians per second.
    pub angular_speed: f32,
    /// Tilt of the orbital plane in radians.
    pub inclination: f32,
    /// Angle at `t = 0` in radians.
    pub phase: f32,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            radius: 1.8,
            angular_speed: 0.6,
            inclination: 0.35,
            phase: 0.0,
        }
    }
}

impl Orbit {
    pub fn new(radius: f32, angular_speed: f32, inclination: f32) -> Result<Self, GeometryError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeometryError::invalid(
                "orbit_radius",
                radius,
                "must be finite and greater than zero",
            ));
        }
        Ok(Self {
            radius,
            angular_speed,
            inclination,
            phase: 0.0,
        })
    }

    fn tilt(&self) -> Quat {
        Quat::from_rotation_x(self.inclination)
    }

    fn point_at_angle(&self, angle: f32) -> Vec3 {
        self.tilt() * Vec3::new(self.radius * angle.cos(), 0.0, self.radius * angle.sin())
    }

    /// Angle along the orbit at `time`, wrapped into `[0, 2π)`.
    pub fn angle(&self, time: f32) -> f32 {
        wrap_angle(self.phase + self.angular_speed * time)
    }

    /// Position at `time` seconds.
    pub fn position(&self, time: f32) -> Vec3 {
        self.point_at_angle(self.angle(time))
    }

    /// Closed polyline tracing the orbit: `samples + 1` points, last equals first.
    pub fn path(&self, samples: u32) -> Result<Vec<Vec3>, GeometryError> {
        if samples < 3 {
            return Err(GeometryError::invalid(
                "samples",
                samples,
                "need at least 3 samples to trace a loop",
            ));
        }
        let mut points: Vec<Vec3> = (0..samples)
            .map(|i| self.point_at_angle(i as f32 * TAU / samples as f32))
            .collect();
        points.push(points[0]);
        Ok(points)
    }
}

/// Wrap `angle` into `[0, 2π)`.
///
/// `rem_euclid` rounds tiny negative inputs up to exactly `2π`; those map to 0.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
