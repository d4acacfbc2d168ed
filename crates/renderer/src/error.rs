//! Renderer errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RendererError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found")]
    NoAdapter,

    #[error("surface reports no supported texture formats for this adapter")]
    UnsupportedSurface,

    #[error("failed to acquire GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface texture unavailable: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("pipeline `{label}` failed to build: {message}")]
    Shader { label: String, message: String },

    #[error("failed to load texture {}: {source}", .path.display())]
    TextureLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture data is {actual} bytes, expected {expected} for {width}x{height} RGBA8")]
    TextureSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}
