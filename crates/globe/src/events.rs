//! Window event handling.

use crate::GlobeState;
use renderer::RendererError;
use winit::{event::WindowEvent, keyboard::KeyCode};

impl GlobeState {
    /// Handle a window event. Returns true when the app should exit.
    pub(crate) fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.running = false;
                true
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(size);
                self.camera.set_aspect(size.width, size.height);
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let winit::keyboard::PhysicalKey::Code(KeyCode::Escape) = event.physical_key {
                    if event.state.is_pressed() {
                        log::info!("Escape pressed, closing");
                        self.running = false;
                        return true;
                    }
                }
                false
            }
            WindowEvent::RedrawRequested => {
                self.time.update();
                if let Err(e) = self.render() {
                    if !self.recover(e) {
                        self.running = false;
                        return true;
                    }
                }
                self.renderer.window.request_redraw();
                false
            }
            _ => false,
        }
    }

    /// Try to recover from a failed frame. Returns false if the app can't continue.
    fn recover(&mut self, error: RendererError) -> bool {
        match error {
            RendererError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.renderer.size;
                self.renderer.resize(size);
                true
            }
            RendererError::Surface(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                false
            }
            RendererError::Surface(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                true
            }
            e => {
                log::error!("Render error: {}", e);
                true
            }
        }
    }
}
