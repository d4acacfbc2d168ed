//! GPU meshes for the scene and the per-frame pass sequence.

use crate::scene::{sphere_mesh_data, Scene};
use crate::GlobeState;
use renderer::{Mesh, RendererError};

/// Scene geometry uploaded once at startup.
pub struct SceneMeshes {
    pub globe: Mesh,
    /// Single vertex at the origin, placed per star by its instance matrix.
    pub star: Mesh,
    pub satellite: Option<Mesh>,
    pub orbit_path: Option<Mesh>,
    pub constellations: Vec<Mesh>,
}

impl SceneMeshes {
    pub fn upload(device: &wgpu::Device, scene: &Scene) -> Self {
        let (satellite, orbit_path) = match &scene.satellite {
            Some(satellite) => (
                Some(sphere_mesh_data(&satellite.mesh).upload(device)),
                Some(Mesh::line_strip(device, &satellite.path)),
            ),
            None => (None, None),
        };

        Self {
            globe: sphere_mesh_data(&scene.globe).upload(device),
            star: Mesh::point(device),
            satellite,
            orbit_path,
            constellations: scene
                .constellations
                .iter()
                .map(|strip| Mesh::line_strip(device, strip))
                .collect(),
        }
    }
}

/// Run all render passes for one frame. Called from `GlobeState::render()`.
pub fn run(state: &mut GlobeState) -> Result<(), RendererError> {
    let time = state.time.elapsed_seconds();
    // View and projection are fixed per frame; only model matrices vary.
    let view_projection = state.camera.view_projection_matrix();
    state.scene.fill_frame(time, view_projection, &mut state.frame);

    let (output, mut encoder) = state.renderer.begin_frame()?;
    let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
    let frame = &state.frame;
    let meshes = &state.meshes;

    state.renderer.clear(&mut encoder, &view);

    state.renderer.render_textured(
        &mut encoder,
        &view,
        &meshes.globe,
        std::slice::from_ref(&frame.globe),
    );

    state.renderer.render_points(&mut encoder, &view, &meshes.star, &frame.stars);

    if let (Some(mesh), Some(instance)) = (&meshes.satellite, &frame.satellite) {
        state.renderer.render_flat(&mut encoder, &view, mesh, std::slice::from_ref(instance));
    }
    if let (Some(mesh), Some(instance)) = (&meshes.orbit_path, &frame.orbit_path) {
        state.renderer.render_lines(&mut encoder, &view, mesh, std::slice::from_ref(instance));
    }

    for strip in &meshes.constellations {
        state.renderer.render_lines(
            &mut encoder,
            &view,
            strip,
            std::slice::from_ref(&frame.backdrop),
        );
    }

    state.renderer.end_frame(output, encoder);

    if state.time.every_n_frames(600) {
        log::debug!(
            "frame {}: {:.1} fps, {} instances",
            state.time.frame_count(),
            state.time.fps(),
            state.renderer.frame_instance_count()
        );
    }

    Ok(())
}
