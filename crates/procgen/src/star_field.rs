//! Orbiting star ring.
//!
//! Each star gets a random distance and angle at startup. Only the vertical
//! component of that anchor survives: every frame the stars are spread evenly
//! around a shared ring and revolve together.

use crate::{error::GeometryError, orbit::wrap_angle};
use glam::Vec3;
use rand::prelude::*;
use std::f32::consts::TAU;

/// One star of the ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Random distance from the origin, drawn from the field's band.
    pub distance: f32,
    /// Random initial angle in `[0, 2π)`.
    pub initial_angle: f32,
    /// Evenly spaced offset around the ring, `index·2π/N`.
    pub phase_offset: f32,
    /// `(d·cos α, d·sin α, 0)`. The `y` component is kept as the star's height.
    pub anchor: Vec3,
}

/// Distance band the star anchors are drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusBand {
    pub min: f32,
    pub max: f32,
}

impl RadiusBand {
    pub fn new(min: f32, max: f32) -> Result<Self, GeometryError> {
        if !min.is_finite() || min < 0.0 {
            return Err(GeometryError::invalid(
                "min_distance",
                min,
                "must be finite and non-negative",
            ));
        }
        if !max.is_finite() || max < min {
            return Err(GeometryError::invalid(
                "max_distance",
                max,
                "must be finite and at least min_distance",
            ));
        }
        Ok(Self { min, max })
    }

    fn sample(&self, rng: &mut impl Rng) -> f32 {
        self.min + rng.gen::<f32>() * (self.max - self.min)
    }
}

/// Ring parameters shared by every star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingMotion {
    /// Radius of the shared circle in the XZ plane.
    pub orbit_radius: f32,
    /// Revolution rate in radians per second.
    pub rate: f32,
}

impl Default for RingMotion {
    fn default() -> Self {
        Self {
            orbit_radius: 3.0,
            rate: 1.0,
        }
    }
}

/// A fixed set of stars sharing one revolution.
#[derive(Debug, Clone, Default)]
pub struct StarField {
    stars: Vec<Star>,
}

impl StarField {
    /// Scatter `count` stars using the thread-local OS-seeded generator.
    /// Not reproducible between runs.
    pub fn scatter(count: usize, band: RadiusBand) -> Self {
        Self::generate(count, band, &mut rand::thread_rng())
    }

    /// Scatter `count` stars drawing from `rng`.
    pub fn generate(count: usize, band: RadiusBand, rng: &mut impl Rng) -> Self {
        let spacing = phase_spacing(count);
        let stars = (0..count)
            .map(|i| {
                let distance = band.sample(rng);
                let initial_angle = rng.gen::<f32>() * TAU;
                Star {
                    distance,
                    initial_angle,
                    phase_offset: i as f32 * spacing,
                    anchor: Vec3::new(
                        distance * initial_angle.cos(),
                        distance * initial_angle.sin(),
                        0.0,
                    ),
                }
            })
            .collect();

        Self { stars }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Angle of star `index` on the ring at `time` seconds, wrapped into `[0, 2π)`.
    pub fn phase(&self, index: usize, time: f32, motion: &RingMotion) -> f32 {
        ring_phase(index, self.stars.len(), time, motion.rate)
    }

    /// World position of star `index` at `time`.
    pub fn position(&self, index: usize, time: f32, motion: &RingMotion) -> Vec3 {
        let angle = self.phase(index, time, motion);
        Vec3::new(
            motion.orbit_radius * angle.cos(),
            self.stars[index].anchor.y,
            motion.orbit_radius * angle.sin(),
        )
    }

    /// Positions of every star at `time`.
    pub fn positions(&self, time: f32, motion: &RingMotion) -> impl Iterator<Item = Vec3> + '_ {
        let motion = *motion;
        (0..self.stars.len()).map(move |i| self.position(i, time, &motion))
    }
}

fn phase_spacing(count: usize) -> f32 {
    if count == 0 {
        0.0
    } else {
        TAU / count as f32
    }
}

/// `(time·rate + index·2π/count) mod 2π`.
pub fn ring_phase(index: usize, count: usize, time: f32, rate: f32) -> f32 {
    wrap_angle(time * rate + index as f32 * phase_spacing(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(count: usize, seed: u64) -> StarField {
        let band = RadiusBand::new(8.0, 10.0).unwrap();
        StarField::generate(count, band, &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn anchors_respect_band_and_angle_range() {
        let field = seeded(300, 7);
        assert_eq!(field.len(), 300);
        for star in field.stars() {
            assert!((8.0..=10.0).contains(&star.distance));
            assert!((0.0..TAU).contains(&star.initial_angle));
            assert!((star.anchor.truncate().length() - star.distance).abs() < 1e-4);
            assert_eq!(star.anchor.z, 0.0);
        }
    }

    #[test]
    fn phase_matches_even_spacing() {
        let field = seeded(300, 1);
        let motion = RingMotion::default();
        let t = 12.75;
        for i in [0, 1, 150, 299] {
            let expected = (t + i as f32 * TAU / 300.0).rem_euclid(TAU);
            assert!((field.phase(i, t, &motion) - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn phase_is_reproducible_across_fields() {
        // Phase only depends on N and t, not on the random anchors.
        let a = seeded(64, 1);
        let b = seeded(64, 2);
        let motion = RingMotion::default();
        for i in 0..64 {
            assert_eq!(a.phase(i, 3.5, &motion), b.phase(i, 3.5, &motion));
        }
    }

    #[test]
    fn positions_ride_shared_ring_and_keep_height() {
        let field = seeded(32, 3);
        let motion = RingMotion {
            orbit_radius: 3.0,
            rate: 1.0,
        };
        for (star, pos) in field.stars().iter().zip(field.positions(5.0, &motion)) {
            let horizontal = (pos.x * pos.x + pos.z * pos.z).sqrt();
            assert!((horizontal - 3.0).abs() < 1e-4);
            assert_eq!(pos.y, star.anchor.y);
        }
    }

    #[test]
    fn reverse_rate_keeps_phase_in_range() {
        let phase = ring_phase(0, 4, 1.0, -1e-8);
        assert!((0.0..TAU).contains(&phase), "phase {phase} escaped [0, 2π)");

        let field = seeded(8, 5);
        let motion = RingMotion {
            orbit_radius: 3.0,
            rate: -0.5,
        };
        for i in 0..8 {
            assert!((0.0..TAU).contains(&field.phase(i, 7.25, &motion)));
        }
    }

    #[test]
    fn same_seed_same_field() {
        assert_eq!(seeded(10, 42).stars(), seeded(10, 42).stars());
    }

    #[test]
    fn empty_field_is_allowed() {
        let field = seeded(0, 0);
        assert!(field.is_empty());
        assert_eq!(field.positions(1.0, &RingMotion::default()).count(), 0);
    }

    #[test]
    fn invalid_band_rejected() {
        assert_eq!(RadiusBand::new(-1.0, 2.0).unwrap_err().parameter(), "min_distance");
        assert_eq!(RadiusBand::new(5.0, 2.0).unwrap_err().parameter(), "max_distance");
        assert!(RadiusBand::new(2.0, f32::NAN).is_err());
        assert!(RadiusBand::new(3.0, 3.0).is_ok());
    }
}
