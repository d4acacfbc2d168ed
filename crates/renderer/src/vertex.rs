//! Vertex and instance layouts shared by every pipeline.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

/// Position plus equirectangular texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position: position.into(),
            tex_coords: tex_coords.into(),
        }
    }

    /// Vertex without a texture coordinate (points, lines, flat meshes).
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Vec2::ZERO)
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // UV/Tex coords
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Per-draw data: the combined model-view-projection matrix and a color.
/// The color tints textured meshes and is the output of flat ones.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawInstance {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl DrawInstance {
    pub fn new(mvp: Mat4, color: [f32; 4]) -> Self {
        Self {
            mvp: mvp.to_cols_array_2d(),
            color,
        }
    }

    pub fn mvp(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.mvp)
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DrawInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // MVP column 0
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // MVP column 1
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // MVP column 2
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // MVP column 3
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // Color
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

impl Default for DrawInstance {
    fn default() -> Self {
        Self {
            mvp: Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_match_struct_sizes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
        assert_eq!(Vertex::layout().array_stride, 20);
        assert_eq!(std::mem::size_of::<DrawInstance>(), 80);
        assert_eq!(DrawInstance::layout().array_stride, 80);
    }

    #[test]
    fn instance_roundtrips_matrix() {
        let mvp = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let instance = DrawInstance::new(mvp, [0.5; 4]);
        assert_eq!(instance.mvp(), mvp);
        // Column-major: translation lives in the last column.
        assert_eq!(instance.mvp[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
