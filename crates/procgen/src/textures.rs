//! Procedural fallback texture for the globe.
//! Used when the Earth image cannot be loaded.

use glam::Vec3;
use noise::{NoiseFn, Perlin};
use rand::prelude::*;
use std::f64::consts::{PI, TAU};

/// RGBA pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb(color: Vec3) -> Self {
        Self {
            r: (color.x.clamp(0.0, 1.0) * 255.0) as u8,
            g: (color.y.clamp(0.0, 1.0) * 255.0) as u8,
            b: (color.z.clamp(0.0, 1.0) * 255.0) as u8,
            a: 255,
        }
    }

    pub fn to_bytes(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Generated RGBA8 texture, row-major from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Pixel>,
}

impl TextureData {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::new(0, 0, 0, 255); (width * height) as usize],
        }
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Pixel) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = pixel;
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(Pixel::to_bytes).collect()
    }

    /// Equirectangular stand-in for an Earth map: noise continents, ocean, polar ice.
    ///
    /// Noise is sampled on the unit sphere rather than in UV space, so the
    /// `u = 0` and `u = 1` columns match and the poles do not pinch.
    pub fn globe_fallback(width: u32, height: u32, seed: u64) -> Self {
        let generator = GlobePainter::new(seed);
        let mut texture = Self::new(width, height);

        for y in 0..height {
            let v = (y as f64 + 0.5) / height as f64;
            for x in 0..width {
                let u = x as f64 / width as f64;
                texture.set_pixel(x, y, generator.paint(u, v));
            }
        }

        texture
    }
}

const OCEAN_DEEP: Vec3 = Vec3::new(0.02, 0.08, 0.25);
const OCEAN_SHALLOW: Vec3 = Vec3::new(0.06, 0.30, 0.55);
const LOWLAND: Vec3 = Vec3::new(0.18, 0.42, 0.14);
const HIGHLAND: Vec3 = Vec3::new(0.45, 0.38, 0.24);
const ICE: Vec3 = Vec3::new(0.92, 0.95, 0.97);

/// Sea level on the `[0, 1]` fbm scale.
const SEA_LEVEL: f64 = 0.52;
/// Latitude (degrees from the equator) where ice caps begin.
const ICE_LATITUDE: f64 = 72.0;

struct GlobePainter {
    perlin: Perlin,
}

impl GlobePainter {
    fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            perlin: Perlin::new(rng.gen()),
        }
    }

    fn fbm(&self, p: [f64; 3], octaves: u32) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 0.5;
        let mut frequency = 1.5;

        for _ in 0..octaves {
            let sample = self
                .perlin
                .get([p[0] * frequency, p[1] * frequency, p[2] * frequency]);
            value += amplitude * (sample * 0.5 + 0.5);
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        value
    }

    fn paint(&self, u: f64, v: f64) -> Pixel {
        // Same parameterization as the sphere mesh so the map lines up.
        let theta = v * PI;
        let phi = u * TAU;
        let point = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];

        let latitude = (90.0 - v * 180.0).abs();
        if latitude > ICE_LATITUDE + self.fbm(point, 2) * 6.0 {
            return Pixel::from_rgb(ICE);
        }

        let height = self.fbm(point, 5);
        let color = if height < SEA_LEVEL {
            let depth = (height / SEA_LEVEL) as f32;
            OCEAN_DEEP.lerp(OCEAN_SHALLOW, depth * depth)
        } else {
            let elevation = ((height - SEA_LEVEL) / (1.0 - SEA_LEVEL)) as f32;
            LOWLAND.lerp(HIGHLAND, (elevation * 2.5).min(1.0))
        };
        Pixel::from_rgb(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel_at(tex: &TextureData, x: u32, y: u32) -> Pixel {
        tex.pixels[(y * tex.width + x) as usize]
    }

    #[test]
    fn fallback_has_requested_size() {
        let tex = TextureData::globe_fallback(64, 32, 1);
        assert_eq!(tex.pixels.len(), 64 * 32);
        assert_eq!(tex.to_bytes().len(), 64 * 32 * 4);
        assert!(tex.pixels.iter().all(|p| p.a == 255));
    }

    #[test]
    fn fallback_is_deterministic_per_seed() {
        let a = TextureData::globe_fallback(48, 24, 7);
        let b = TextureData::globe_fallback(48, 24, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn poles_are_ice() {
        let tex = TextureData::globe_fallback(32, 64, 3);
        for x in 0..32 {
            assert_eq!(pixel_at(&tex, x, 0), Pixel::from_rgb(ICE));
            assert_eq!(pixel_at(&tex, x, 63), Pixel::from_rgb(ICE));
        }
    }

    #[test]
    fn out_of_range_pixels_are_ignored() {
        let mut tex = TextureData::new(2, 2);
        tex.set_pixel(5, 5, Pixel::new(255, 0, 0, 255));
        assert!(tex.pixels.iter().all(|p| *p == Pixel::new(0, 0, 0, 255)));
    }
}
