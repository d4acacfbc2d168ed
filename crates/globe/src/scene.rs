//! Scene contents and per-frame transforms.
//!
//! Everything here is CPU-side: geometry is generated once at startup and the
//! per-frame instance data is a pure function of elapsed time and the camera.

use crate::config::GlobeConfig;
use engine_core::Transform;
use glam::{Mat4, Vec3};
use procgen::{
    Constellation, GeometryError, Orbit, RadiusBand, RingMotion, SphereMesh, SphereOptions,
    SphereTopology, StarField,
};
use rand::Rng;
use renderer::{DrawInstance, MeshData, Vertex};

pub const SATELLITE_RADIUS: f32 = 0.12;
const SATELLITE_SEGMENTS: u32 = 16;
const SATELLITE_RINGS: u32 = 8;
const ORBIT_PATH_SAMPLES: u32 = 128;
/// Backdrop sphere for constellation figures. Inside the far plane.
pub const CONSTELLATION_RADIUS: f32 = 40.0;

const GLOBE_TINT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const STAR_COLOR: [f32; 4] = [1.0, 1.0, 0.9, 1.0];
const SATELLITE_COLOR: [f32; 4] = [0.85, 0.85, 0.9, 1.0];
const ORBIT_PATH_COLOR: [f32; 4] = [0.3, 0.5, 0.8, 1.0];
const CONSTELLATION_COLOR: [f32; 4] = [0.55, 0.6, 0.75, 1.0];

/// Upper bound on `star_count`; keeps the instance buffer well inside wgpu's default limits.
pub const MAX_STARS: usize = 1_000_000;

/// A small body on a circular orbit around the globe.
#[derive(Debug, Clone)]
pub struct Satellite {
    pub orbit: Orbit,
    pub mesh: SphereMesh,
    /// Closed strip tracing the orbit.
    pub path: Vec<Vec3>,
}

/// Everything drawn each frame, generated once.
#[derive(Debug, Clone)]
pub struct Scene {
    pub globe: SphereMesh,
    pub stars: StarField,
    pub motion: RingMotion,
    pub star_scale: f32,
    pub spin_rate: f32,
    pub satellite: Option<Satellite>,
    /// One strip per constellation, already on the backdrop sphere.
    pub constellations: Vec<Vec<Vec3>>,
}

/// Per-frame instance data, reused across frames.
#[derive(Debug, Clone, Default)]
pub struct FrameInstances {
    pub globe: DrawInstance,
    pub stars: Vec<DrawInstance>,
    pub satellite: Option<DrawInstance>,
    pub orbit_path: Option<DrawInstance>,
    /// Shared by every constellation strip (identity model).
    pub backdrop: DrawInstance,
}

impl Scene {
    /// Build the scene with stars scattered by the thread-local generator.
    pub fn new(config: &GlobeConfig) -> Result<Self, GeometryError> {
        Self::with_rng(config, &mut rand::thread_rng())
    }

    pub fn with_rng(config: &GlobeConfig, rng: &mut impl Rng) -> Result<Self, GeometryError> {
        validate_view(config)?;

        let globe = SphereMesh::generate(&SphereOptions::new(
            1.0,
            config.globe_segments,
            config.globe_rings,
        ))?;

        let band = RadiusBand::new(config.star_min_distance, config.star_max_distance)?;
        let stars = StarField::generate(config.star_count, band, rng);

        let satellite = if config.show_satellite {
            let orbit = Orbit::default();
            let mesh = SphereMesh::generate(
                &SphereOptions::new(SATELLITE_RADIUS, SATELLITE_SEGMENTS, SATELLITE_RINGS)
                    .with_topology(SphereTopology::TriangleList)
                    .with_tex_coords(false),
            )?;
            let path = orbit.path(ORBIT_PATH_SAMPLES)?;
            Some(Satellite { orbit, mesh, path })
        } else {
            None
        };

        let constellations = if config.show_constellations {
            Constellation::catalog()
                .iter()
                .map(|c| c.line_strip(CONSTELLATION_RADIUS))
                .collect()
        } else {
            Vec::new()
        };

        log::info!(
            "Scene: globe {} vertices / {} triangles, {} stars, satellite {}, {} constellations",
            globe.vertex_count(),
            globe.triangle_count(),
            stars.len(),
            if satellite.is_some() { "on" } else { "off" },
            constellations.len()
        );

        Ok(Self {
            globe,
            stars,
            motion: RingMotion {
                orbit_radius: config.star_orbit_radius,
                rate: config.revolution_rate,
            },
            star_scale: config.star_scale,
            spin_rate: config.globe_spin_rate,
            satellite,
            constellations,
        })
    }

    /// Instances written by one `fill_frame`: globe, stars, satellite and
    /// orbit path, and one per constellation strip.
    pub fn instances_per_frame(&self) -> u32 {
        let satellite = if self.satellite.is_some() { 2 } else { 0 };
        (1 + self.stars.len() + satellite + self.constellations.len()) as u32
    }

    /// Globe model matrix: spin about +Y.
    pub fn globe_model(&self, time: f32) -> Mat4 {
        let mut transform = Transform::default();
        transform.rotate_y(time * self.spin_rate);
        transform.to_matrix()
    }

    /// Star model matrix: `translate(position) · scale(star_scale)`.
    pub fn star_model(&self, index: usize, time: f32) -> Mat4 {
        Transform::from_position(self.stars.position(index, time, &self.motion))
            .with_uniform_scale(self.star_scale)
            .to_matrix()
    }

    /// Fill `frame` with every drawable's MVP at `time`.
    pub fn fill_frame(&self, time: f32, view_projection: Mat4, frame: &mut FrameInstances) {
        frame.globe = DrawInstance::new(view_projection * self.globe_model(time), GLOBE_TINT);

        frame.stars.clear();
        frame.stars.extend((0..self.stars.len()).map(|i| {
            DrawInstance::new(view_projection * self.star_model(i, time), STAR_COLOR)
        }));

        match &self.satellite {
            Some(satellite) => {
                let model = Mat4::from_translation(satellite.orbit.position(time));
                frame.satellite = Some(DrawInstance::new(view_projection * model, SATELLITE_COLOR));
                frame.orbit_path = Some(DrawInstance::new(view_projection, ORBIT_PATH_COLOR));
            }
            None => {
                frame.satellite = None;
                frame.orbit_path = None;
            }
        }

        frame.backdrop = DrawInstance::new(view_projection, CONSTELLATION_COLOR);
    }
}

/// Reject camera and star-ring settings that would produce an empty or NaN view.
fn validate_view(config: &GlobeConfig) -> Result<(), GeometryError> {
    let positive = [
        ("camera_distance", config.camera_distance),
        ("star_scale", config.star_scale),
        ("star_orbit_radius", config.star_orbit_radius),
    ];
    for (name, value) in positive {
        if !value.is_finite() || value <= 0.0 {
            return Err(GeometryError::invalid(name, value, "must be finite and greater than zero"));
        }
    }
    if !(config.fov_degrees > 0.0 && config.fov_degrees < 180.0) {
        return Err(GeometryError::invalid(
            "fov_degrees",
            config.fov_degrees,
            "field of view must be between 0 and 180 degrees",
        ));
    }
    for (name, value) in [
        ("revolution_rate", config.revolution_rate),
        ("globe_spin_rate", config.globe_spin_rate),
    ] {
        if !value.is_finite() {
            return Err(GeometryError::invalid(name, value, "must be finite"));
        }
    }
    if config.star_count > MAX_STARS {
        return Err(GeometryError::invalid(
            "star_count",
            config.star_count as f64,
            "too many stars for one instance buffer",
        ));
    }
    Ok(())
}

/// Interleave a generated sphere into renderer vertices.
pub fn sphere_mesh_data(mesh: &SphereMesh) -> MeshData {
    MeshData {
        vertices: mesh.interleaved().map(|(p, uv)| Vertex::new(p, uv)).collect(),
        indices: mesh.indices().map(<[u32]>::to_vec),
    }
}
