//! Latitude/longitude (UV) sphere generation.
//!
//! Grid point `(ring i, segment j)` sits at polar angle `θ = i·π/rings`, measured
//! from the +Y pole, and azimuth `φ = j·2π/segments`:
//!
//! ```text
//! position = (r·sinθ·cosφ, r·cosθ, r·sinθ·sinφ)
//! uv       = (j/segments, i/rings)
//! ```
//!
//! Rings are the outer loop and segments the inner loop, so grid point `(i, j)` is
//! vertex `i·(segments+1) + j`. The seam column (`j == segments`) duplicates
//! `j == 0` with `u = 1` so the equirectangular texture wraps cleanly.
//!
//! Both topologies emit the same triangles with the same winding (clockwise when
//! viewed from outside the sphere).

use crate::error::GeometryError;
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Smallest longitude division count that still encloses volume.
pub const MIN_SEGMENTS: u32 = 3;
/// Smallest latitude band count that still has an equator.
pub const MIN_RINGS: u32 = 2;

/// How the generated triangles are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SphereTopology {
    /// Shared grid vertices plus an index buffer, two triangles per cell.
    #[default]
    Indexed,
    /// Triangle vertices written out directly, no index buffer. The degenerate
    /// triangle of every polar cell is dropped.
    TriangleList,
}

/// Parameters for [`SphereMesh::generate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereOptions {
    pub radius: f32,
    /// Longitude divisions (sectors).
    pub segments: u32,
    /// Latitude bands (stacks).
    pub rings: u32,
    pub topology: SphereTopology,
    /// Emit equirectangular texture coordinates alongside positions.
    pub tex_coords: bool,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            segments: 64,
            rings: 32,
            topology: SphereTopology::Indexed,
            tex_coords: true,
        }
    }
}

impl SphereOptions {
    pub fn new(radius: f32, segments: u32, rings: u32) -> Self {
        Self {
            radius,
            segments,
            rings,
            ..Default::default()
        }
    }

    pub fn with_topology(mut self, topology: SphereTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_tex_coords(mut self, tex_coords: bool) -> Self {
        self.tex_coords = tex_coords;
        self
    }

    /// Check the generator contract.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(GeometryError::invalid(
                "radius",
                self.radius,
                "must be finite and greater than zero",
            ));
        }
        if self.segments < MIN_SEGMENTS {
            return Err(GeometryError::invalid(
                "segments",
                self.segments,
                "need at least 3 longitude segments",
            ));
        }
        if self.rings < MIN_RINGS {
            return Err(GeometryError::invalid(
                "rings",
                self.rings,
                "need at least 2 latitude rings",
            ));
        }
        Ok(())
    }

    /// Number of grid points, `(rings+1)·(segments+1)`.
    pub fn grid_vertex_count(&self) -> usize {
        (self.rings as usize + 1) * (self.segments as usize + 1)
    }
}

/// CPU-side sphere geometry, ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SphereMesh {
    positions: Vec<Vec3>,
    tex_coords: Option<Vec<Vec2>>,
    indices: Option<Vec<u32>>,
}

impl SphereMesh {
    /// Generate a sphere. Pure: the only side effect is allocation.
    pub fn generate(options: &SphereOptions) -> Result<Self, GeometryError> {
        options.validate()?;

        let (grid_positions, grid_uvs) = grid(options);
        let cell_triangles = cell_triangles(options.segments, options.rings);

        let mesh = match options.topology {
            SphereTopology::Indexed => Self {
                positions: grid_positions,
                tex_coords: options.tex_coords.then_some(grid_uvs),
                indices: Some(cell_triangles.flat_map(|(_, _, corners)| corners).collect()),
            },
            SphereTopology::TriangleList => {
                let last_ring = options.rings - 1;
                let corners: Vec<u32> = cell_triangles
                    .filter(|&(ring, upper, _)| {
                        // North cap: first+1 coincides with first at the pole.
                        // South cap: second+1 coincides with second.
                        let collapsed = if upper { ring == 0 } else { ring == last_ring };
                        !collapsed
                    })
                    .flat_map(|(_, _, corners)| corners)
                    .collect();

                Self {
                    positions: corners.iter().map(|&c| grid_positions[c as usize]).collect(),
                    tex_coords: options
                        .tex_coords
                        .then(|| corners.iter().map(|&c| grid_uvs[c as usize]).collect()),
                    indices: None,
                }
            }
        };

        log::debug!(
            "Generated {:?} sphere r={} {}x{}: {} vertices, {} indices",
            options.topology,
            options.radius,
            options.segments,
            options.rings,
            mesh.vertex_count(),
            mesh.index_count()
        );

        Ok(mesh)
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Texture coordinates, one per position, if they were requested.
    pub fn tex_coords(&self) -> Option<&[Vec2]> {
        self.tex_coords.as_deref()
    }

    /// Triangle indices for [`SphereTopology::Indexed`] meshes.
    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    /// Number of triangles drawn, whichever topology was used.
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Iterate `(position, uv)` pairs; uv is zero when texture coordinates were not generated.
    pub fn interleaved(&self) -> impl Iterator<Item = (Vec3, Vec2)> + '_ {
        self.positions.iter().enumerate().map(move |(i, &p)| {
            let uv = self.tex_coords.as_ref().map_or(Vec2::ZERO, |uvs| uvs[i]);
            (p, uv)
        })
    }
}

/// Lay out the `(rings+1)·(segments+1)` grid of positions and texture coordinates.
fn grid(options: &SphereOptions) -> (Vec<Vec3>, Vec<Vec2>) {
    let count = options.grid_vertex_count();
    let mut positions = Vec::with_capacity(count);
    let mut uvs = Vec::with_capacity(count);

    for ring in 0..=options.rings {
        let v = ring as f32 / options.rings as f32;
        let theta = v * PI;
        let y = options.radius * theta.cos();
        let ring_radius = options.radius * theta.sin();

        for segment in 0..=options.segments {
            let u = segment as f32 / options.segments as f32;
            let phi = u * TAU;
            positions.push(Vec3::new(ring_radius * phi.cos(), y, ring_radius * phi.sin()));
            uvs.push(Vec2::new(u, v));
        }
    }

    (positions, uvs)
}

/// Every cell's two triangles as `(ring, is_upper, corners)`.
///
/// The upper triangle `(first, second, first+1)` touches ring `i`'s edge twice and
/// collapses at the north pole; the lower triangle `(second, second+1, first+1)`
/// touches ring `i+1` twice and collapses at the south pole.
fn cell_triangles(segments: u32, rings: u32) -> impl Iterator<Item = (u32, bool, [u32; 3])> {
    (0..rings).flat_map(move |ring| {
        (0..segments).flat_map(move |segment| {
            let first = ring * (segments + 1) + segment;
            let second = first + segments + 1;
            [
                (ring, true, [first, second, first + 1]),
                (ring, false, [second, second + 1, first + 1]),
            ]
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn indexed(radius: f32, segments: u32, rings: u32) -> SphereMesh {
        SphereMesh::generate(&SphereOptions::new(radius, segments, rings)).unwrap()
    }

    #[test]
    fn small_indexed_sphere_counts() {
        let mesh = indexed(1.0, 4, 2);
        assert_eq!(mesh.vertex_count(), 15);
        let indices = mesh.indices().unwrap();
        assert_eq!(indices.len(), 24);
        assert_eq!(indices.iter().copied().max(), Some(14));
        for p in mesh.positions() {
            assert!((p.length() - 1.0).abs() < EPS, "{p:?} is off the unit sphere");
        }
    }

    #[test]
    fn vertices_lie_on_radius() {
        let mesh = indexed(2.5, 64, 32);
        assert_eq!(mesh.vertex_count(), 65 * 33);
        for p in mesh.positions() {
            assert!((p.length() - 2.5).abs() < 1e-4);
        }
    }

    #[test]
    fn index_buffer_covers_every_cell_and_stays_in_range() {
        let (s, r) = (17, 9);
        let mesh = indexed(1.0, s, r);
        let indices = mesh.indices().unwrap();
        assert_eq!(indices.len(), (6 * s * r) as usize);
        let count = mesh.vertex_count() as u32;
        assert!(indices.iter().all(|&i| i < count));
        assert_eq!(mesh.triangle_count(), (2 * s * r) as usize);
    }

    #[test]
    fn first_cell_uses_documented_corner_order() {
        let mesh = indexed(1.0, 4, 2);
        // first = 0, second = 5
        assert_eq!(&mesh.indices().unwrap()[..6], &[0, 5, 1, 5, 6, 1]);
    }

    #[test]
    fn grid_poles_and_seam() {
        let mesh = indexed(1.0, 8, 4);
        let positions = mesh.positions();
        assert!(positions[0].abs_diff_eq(Vec3::Y, EPS));
        assert!(positions.last().unwrap().abs_diff_eq(-Vec3::Y, EPS));
        // Seam column duplicates the first column.
        let equator = 2 * 9;
        assert!(positions[equator].abs_diff_eq(positions[equator + 8], EPS));
        assert!(positions[equator].abs_diff_eq(Vec3::X, EPS));
        // Quarter turn in azimuth heads toward +Z.
        assert!(positions[equator + 2].abs_diff_eq(Vec3::Z, EPS));
    }

    #[test]
    fn tex_coords_are_unit_range_and_monotonic() {
        let (s, r) = (12, 6);
        let mesh = indexed(1.0, s, r);
        let uvs = mesh.tex_coords().unwrap();
        assert_eq!(uvs.len(), mesh.vertex_count());
        assert!(uvs
            .iter()
            .all(|uv| (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)));

        let row = (s + 1) as usize;
        for ring in 0..=r as usize {
            for seg in 1..row {
                let (a, b) = (uvs[ring * row + seg - 1], uvs[ring * row + seg]);
                assert!(b.x > a.x);
                assert_eq!(a.y, b.y);
            }
        }
        for ring in 1..=r as usize {
            assert!(uvs[ring * row].y > uvs[(ring - 1) * row].y);
        }
        assert_eq!(uvs[0], Vec2::ZERO);
        assert_eq!(*uvs.last().unwrap(), Vec2::ONE);
    }

    #[test]
    fn tex_coords_can_be_skipped() {
        let options = SphereOptions::new(1.0, 8, 4).with_tex_coords(false);
        let mesh = SphereMesh::generate(&options).unwrap();
        assert!(mesh.tex_coords().is_none());
        assert!(mesh.interleaved().all(|(_, uv)| uv == Vec2::ZERO));
    }

    #[test]
    fn triangle_list_collapses_pole_caps() {
        for (s, r) in [(4, 2), (10, 5), (64, 32), (3, 2)] {
            let options = SphereOptions::new(1.0, s, r).with_topology(SphereTopology::TriangleList);
            let mesh = SphereMesh::generate(&options).unwrap();
            assert!(mesh.indices().is_none());
            assert_eq!(mesh.vertex_count(), (3 * (2 * s * r - 2 * s)) as usize);
            assert_eq!(mesh.tex_coords().unwrap().len(), mesh.vertex_count());
        }
    }

    #[test]
    fn triangle_list_has_no_degenerate_triangles() {
        let options = SphereOptions::new(1.0, 16, 8).with_topology(SphereTopology::TriangleList);
        let mesh = SphereMesh::generate(&options).unwrap();
        for tri in mesh.positions().chunks_exact(3) {
            let area = (tri[1] - tri[0]).cross(tri[2] - tri[0]).length();
            assert!(area > 1e-6, "degenerate triangle {tri:?}");
        }
    }

    #[test]
    fn both_topologies_share_winding() {
        // Face normals point inward (clockwise seen from outside) in both layouts.
        let options = SphereOptions::new(1.0, 16, 8);
        let indexed = SphereMesh::generate(&options).unwrap();
        let listed =
            SphereMesh::generate(&options.with_topology(SphereTopology::TriangleList)).unwrap();

        let positions = indexed.positions();
        let indexed_tris = indexed
            .indices()
            .unwrap()
            .chunks_exact(3)
            .map(|t| [positions[t[0] as usize], positions[t[1] as usize], positions[t[2] as usize]]);
        let listed_tris = listed.positions().chunks_exact(3).map(|t| [t[0], t[1], t[2]]);

        for tri in indexed_tris.chain(listed_tris) {
            let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
            if normal.length() < 1e-6 {
                continue;
            }
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            assert!(normal.dot(centroid) < 0.0);
        }
    }

    #[test]
    fn rejects_zero_segments_and_rings() {
        let err = SphereMesh::generate(&SphereOptions::new(1.0, 0, 8)).unwrap_err();
        assert_eq!(err.parameter(), "segments");
        let err = SphereMesh::generate(&SphereOptions::new(1.0, 8, 0)).unwrap_err();
        assert_eq!(err.parameter(), "rings");
    }

    #[test]
    fn rejects_below_minimums_and_bad_radius() {
        assert!(SphereMesh::generate(&SphereOptions::new(1.0, 2, 8)).is_err());
        assert!(SphereMesh::generate(&SphereOptions::new(1.0, 8, 1)).is_err());
        for radius in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = SphereMesh::generate(&SphereOptions::new(radius, 8, 4)).unwrap_err();
            assert_eq!(err.parameter(), "radius");
        }
    }
}
