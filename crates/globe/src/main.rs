//! Textured globe with orbiting stars, a satellite and constellation figures.

mod config;
mod events;
mod render;
mod scene;

use anyhow::{Context, Result};
use config::GlobeConfig;
use engine_core::Time;
use procgen::TextureData;
use render::SceneMeshes;
use renderer::{Camera, Renderer, RendererSettings, Texture};
use scene::{FrameInstances, Scene};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Size of the procedural stand-in when the globe image can't be loaded.
const FALLBACK_TEXTURE_WIDTH: u32 = 1024;
const FALLBACK_TEXTURE_HEIGHT: u32 = 512;
const FALLBACK_TEXTURE_SEED: u64 = 0x6c6f_6265;

/// Demo state: renderer, camera, scene and clock.
pub struct GlobeState {
    time: Time,
    renderer: Renderer,
    camera: Camera,
    scene: Scene,
    meshes: SceneMeshes,
    frame: FrameInstances,
    running: bool,
}

impl GlobeState {
    async fn new(window: Arc<Window>, config: &GlobeConfig) -> Result<Self> {
        let scene = Scene::new(config).context("Invalid scene parameters")?;

        let settings = RendererSettings {
            vsync: config.vsync,
            clear_color: config.clear_color,
            max_instances: scene.instances_per_frame(),
        };
        let mut renderer = Renderer::new(window, settings)
            .await
            .context("Failed to initialize renderer")?;

        let globe_texture = load_globe_texture(&renderer, config)?;
        renderer.set_globe_texture(&globe_texture);

        let meshes = SceneMeshes::upload(renderer.device(), &scene);

        let (width, height) = renderer.dimensions();
        let mut camera = Camera::new(config.camera_distance).with_fov(config.fov_degrees);
        camera.set_aspect(width, height);

        Ok(Self {
            time: Time::new(),
            renderer,
            camera,
            scene,
            meshes,
            frame: FrameInstances::default(),
            running: true,
        })
    }

    fn render(&mut self) -> Result<(), renderer::RendererError> {
        render::run(self)
    }
}

/// Load the globe image, or paint a procedural one unless the image is required.
fn load_globe_texture(renderer: &Renderer, config: &GlobeConfig) -> Result<Texture> {
    match Texture::from_path(renderer.device(), renderer.queue(), &config.texture_path) {
        Ok(texture) => Ok(texture),
        Err(e) if config.require_texture => Err(e).context("Globe texture is required"),
        Err(e) => {
            log::warn!("{}; using procedural globe texture", e);
            let data = TextureData::globe_fallback(
                FALLBACK_TEXTURE_WIDTH,
                FALLBACK_TEXTURE_HEIGHT,
                FALLBACK_TEXTURE_SEED,
            );
            Texture::from_rgba(
                renderer.device(),
                renderer.queue(),
                data.width,
                data.height,
                &data.to_bytes(),
                "Procedural Globe",
            )
            .context("Failed to upload procedural globe texture")
        }
    }
}

/// Application handler for winit.
struct App {
    config: GlobeConfig,
    state: Option<GlobeState>,
    init_error: Option<anyhow::Error>,
}

impl App {
    fn new(config: GlobeConfig) -> Self {
        Self {
            config,
            state: None,
            init_error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        self.init_error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("Failed to create window"));
                return;
            }
        };

        match pollster::block_on(GlobeState::new(window.clone(), &self.config)) {
            Ok(s) => {
                self.state = Some(s);
                window.request_redraw();
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }
}

fn run() -> Result<()> {
    let config = GlobeConfig::load();
    log::info!("Starting globe demo ({}x{})", config.window_width, config.window_height);

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.init_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("Exiting: {:#}", e);
        std::process::exit(-1);
    }
}
