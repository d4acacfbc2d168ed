//! Render pipeline construction.
//!
//! Shader source and fixed-function state travel together in a [`PipelineConfig`]
//! so several variants can be built side by side without shared globals.

use crate::{error::RendererError, texture::Texture, vertex::{DrawInstance, Vertex}};

pub const TEXTURED_SHADER: &str = include_str!("shaders/textured.wgsl");
pub const FLAT_SHADER: &str = include_str!("shaders/flat.wgsl");

/// What the fragment stage reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Samples the texture bound at group 0.
    Textured,
    /// Outputs the instance color; no bind groups.
    Flat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub label: &'static str,
    /// WGSL source with `vs_main` and `fs_main` entry points.
    pub shader_source: &'static str,
    pub shading: Shading,
    pub topology: wgpu::PrimitiveTopology,
    pub cull_mode: Option<wgpu::Face>,
    pub depth_write: bool,
}

impl PipelineConfig {
    /// Triangle meshes sampling the globe texture.
    pub fn textured_mesh() -> Self {
        Self {
            label: "Textured Mesh Pipeline",
            shader_source: TEXTURED_SHADER,
            shading: Shading::Textured,
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            depth_write: true,
        }
    }

    /// Solid-color triangle meshes.
    pub fn flat_mesh() -> Self {
        Self {
            label: "Flat Mesh Pipeline",
            shader_source: FLAT_SHADER,
            shading: Shading::Flat,
            ..Self::textured_mesh()
        }
    }

    /// One-pixel points.
    pub fn points() -> Self {
        Self {
            label: "Point Pipeline",
            topology: wgpu::PrimitiveTopology::PointList,
            cull_mode: None,
            ..Self::flat_mesh()
        }
    }

    /// Connected line strips. Lines are depth-tested but don't occlude.
    pub fn lines() -> Self {
        Self {
            label: "Line Strip Pipeline",
            topology: wgpu::PrimitiveTopology::LineStrip,
            cull_mode: None,
            depth_write: false,
            ..Self::flat_mesh()
        }
    }
}

pub fn create_texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Texture Bind Group Layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

pub fn create_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Texture Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}

/// Compile `config`'s shader and link it into a pipeline.
///
/// Shader compile and link problems come back as [`RendererError::Shader`]
/// instead of reaching the device's uncaptured-error handler.
pub fn build_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    config: &PipelineConfig,
    texture_layout: &wgpu::BindGroupLayout,
) -> Result<wgpu::RenderPipeline, RendererError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(config.label),
        source: wgpu::ShaderSource::Wgsl(config.shader_source.into()),
    });

    let textured_layouts = [texture_layout];
    let bind_group_layouts: &[&wgpu::BindGroupLayout] = match config.shading {
        Shading::Textured => &textured_layouts,
        Shading::Flat => &[],
    };
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(config.label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(config.label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout(), DrawInstance::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: config.topology,
            strip_index_format: None,
            // Sphere triangles wind clockwise seen from outside.
            front_face: wgpu::FrontFace::Cw,
            cull_mode: config.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: config.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        return Err(RendererError::Shader {
            label: config.label.to_string(),
            message: error.to_string(),
        });
    }

    log::debug!("Built {}", config.label);
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_pick_matching_shader_and_topology() {
        let textured = PipelineConfig::textured_mesh();
        assert_eq!(textured.shading, Shading::Textured);
        assert_eq!(textured.shader_source, TEXTURED_SHADER);

        let points = PipelineConfig::points();
        assert_eq!(points.topology, wgpu::PrimitiveTopology::PointList);
        assert_eq!(points.shader_source, FLAT_SHADER);
        assert!(points.cull_mode.is_none());

        let lines = PipelineConfig::lines();
        assert_eq!(lines.topology, wgpu::PrimitiveTopology::LineStrip);
        assert!(!lines.depth_write);
    }

    #[test]
    fn embedded_shaders_declare_entry_points() {
        for source in [TEXTURED_SHADER, FLAT_SHADER] {
            assert!(source.contains("fn vs_main"));
            assert!(source.contains("fn fs_main"));
        }
        assert!(TEXTURED_SHADER.contains("@group(0) @binding(0)"));
        assert!(!FLAT_SHADER.contains("@group"));
    }
}
