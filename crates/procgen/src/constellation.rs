//! Static constellation figures drawn as line strips on a backdrop sphere.

use crate::error::GeometryError;
use glam::Vec3;
use std::f32::consts::TAU;

/// Equatorial sky coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyPoint {
    /// Right ascension in hours, `[0, 24)`.
    pub ra_hours: f32,
    /// Declination in degrees, `[-90, 90]`.
    pub dec_degrees: f32,
}

impl SkyPoint {
    pub const fn new(ra_hours: f32, dec_degrees: f32) -> Self {
        Self {
            ra_hours,
            dec_degrees,
        }
    }

    /// Position on a sphere of `radius`. +Y is the celestial north pole and
    /// RA 0h lies along +X.
    pub fn to_position(self, radius: f32) -> Vec3 {
        let ra = self.ra_hours / 24.0 * TAU;
        let dec = self.dec_degrees.to_radians();
        let horizontal = radius * dec.cos();
        Vec3::new(horizontal * ra.cos(), radius * dec.sin(), horizontal * ra.sin())
    }

    fn validate(self) -> Result<(), GeometryError> {
        if !(0.0..24.0).contains(&self.ra_hours) {
            return Err(GeometryError::invalid(
                "ra_hours",
                self.ra_hours,
                "right ascension must be in [0, 24)",
            ));
        }
        if !(-90.0..=90.0).contains(&self.dec_degrees) {
            return Err(GeometryError::invalid(
                "dec_degrees",
                self.dec_degrees,
                "declination must be in [-90, 90]",
            ));
        }
        Ok(())
    }
}

/// A named figure connecting stars in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Constellation {
    pub name: String,
    points: Vec<SkyPoint>,
}

impl Constellation {
    pub fn new(name: impl Into<String>, points: Vec<SkyPoint>) -> Result<Self, GeometryError> {
        if points.len() < 2 {
            return Err(GeometryError::invalid(
                "points",
                points.len() as u32,
                "a line strip needs at least 2 points",
            ));
        }
        for point in &points {
            point.validate()?;
        }
        Ok(Self {
            name: name.into(),
            points,
        })
    }

    pub fn points(&self) -> &[SkyPoint] {
        &self.points
    }

    /// Strip vertices on a backdrop sphere of `radius`, in drawing order.
    pub fn line_strip(&self, radius: f32) -> Vec<Vec3> {
        self.points.iter().map(|p| p.to_position(radius)).collect()
    }

    /// Built-in figures (J2000 coordinates, rounded).
    pub fn catalog() -> Vec<Constellation> {
        CATALOG
            .iter()
            .map(|(name, points)| Constellation {
                name: (*name).to_string(),
                points: points.to_vec(),
            })
            .collect()
    }
}

const URSA_MAJOR: &[SkyPoint] = &[
    SkyPoint::new(13.79, 49.31), // Alkaid
    SkyPoint::new(13.40, 54.93), // Mizar
    SkyPoint::new(12.90, 55.96), // Alioth
    SkyPoint::new(12.26, 57.03), // Megrez
    SkyPoint::new(11.90, 53.69), // Phecda
    SkyPoint::new(11.03, 56.38), // Merak
    SkyPoint::new(11.06, 61.75), // Dubhe
    SkyPoint::new(12.26, 57.03), // Megrez
];

const CASSIOPEIA: &[SkyPoint] = &[
    SkyPoint::new(0.15, 59.15), // Caph
    SkyPoint::new(0.68, 56.54), // Schedar
    SkyPoint::new(0.95, 60.72), // Navi
    SkyPoint::new(1.43, 60.24), // Ruchbah
    SkyPoint::new(1.91, 63.67), // Segin
];

const ORION: &[SkyPoint] = &[
    SkyPoint::new(5.92, 7.41),  // Betelgeuse
    SkyPoint::new(5.68, -1.94), // Alnitak
    SkyPoint::new(5.60, -1.20), // Alnilam
    SkyPoint::new(5.53, -0.30), // Mintaka
    SkyPoint::new(5.42, 6.35),  // Bellatrix
    SkyPoint::new(5.92, 7.41),  // Betelgeuse
];

const CATALOG: &[(&str, &[SkyPoint])] = &[
    ("Ursa Major", URSA_MAJOR),
    ("Cassiopeia", CASSIOPEIA),
    ("Orion", ORION),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_positions_sit_on_backdrop() {
        for constellation in Constellation::catalog() {
            for p in constellation.line_strip(40.0) {
                assert!((p.length() - 40.0).abs() < 1e-3, "{}", constellation.name);
            }
        }
    }

    #[test]
    fn cardinal_sky_points() {
        assert!(SkyPoint::new(0.0, 0.0).to_position(1.0).abs_diff_eq(Vec3::X, 1e-6));
        assert!(SkyPoint::new(6.0, 0.0).to_position(1.0).abs_diff_eq(Vec3::Z, 1e-6));
        assert!(SkyPoint::new(3.0, 90.0).to_position(2.0).abs_diff_eq(2.0 * Vec3::Y, 1e-5));
    }

    #[test]
    fn catalog_entries_are_valid() {
        let catalog = Constellation::catalog();
        assert_eq!(catalog.len(), 3);
        for c in &catalog {
            let rebuilt = Constellation::new(c.name.clone(), c.points().to_vec()).unwrap();
            assert_eq!(&rebuilt, c);
        }
    }

    #[test]
    fn strip_keeps_drawing_order() {
        let orion = Constellation::catalog()
            .into_iter()
            .find(|c| c.name == "Orion")
            .unwrap();
        let strip = orion.line_strip(10.0);
        assert_eq!(strip.len(), orion.points().len());
        assert_eq!(strip.first(), strip.last());
    }

    #[test]
    fn rejects_short_or_out_of_range_figures() {
        let err = Constellation::new("dot", vec![SkyPoint::new(1.0, 1.0)]).unwrap_err();
        assert_eq!(err.parameter(), "points");
        let err = Constellation::new("bad", vec![SkyPoint::new(24.0, 0.0), SkyPoint::new(1.0, 0.0)])
            .unwrap_err();
        assert_eq!(err.parameter(), "ra_hours");
        let err = Constellation::new("bad", vec![SkyPoint::new(1.0, 91.0), SkyPoint::new(1.0, 0.0)])
            .unwrap_err();
        assert_eq!(err.parameter(), "dec_degrees");
    }
}
