//! GPU meshes: vertex buffer plus an optional index buffer.

use crate::vertex::Vertex;
use glam::Vec3;
use std::ops::Range;
use wgpu::util::DeviceExt;

/// A GPU mesh. Indexed meshes draw with `draw_indexed`, the rest with `draw`.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: Option<wgpu::Buffer>,
    pub num_vertices: u32,
    pub num_indices: u32,
}

impl Mesh {
    /// Create an indexed mesh from vertex and index data.
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32]) -> Self {
        let mut mesh = Self::non_indexed(device, vertices);
        mesh.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
        mesh.num_indices = indices.len() as u32;
        mesh
    }

    /// Create a mesh drawn straight from its vertex order.
    pub fn non_indexed(device: &wgpu::Device, vertices: &[Vertex]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            vertex_buffer,
            index_buffer: None,
            num_vertices: vertices.len() as u32,
            num_indices: 0,
        }
    }

    /// A single vertex at the origin, for point sprites placed by their instance matrix.
    pub fn point(device: &wgpu::Device) -> Self {
        Self::non_indexed(device, &[Vertex::from_position(Vec3::ZERO)])
    }

    /// A polyline for `LineStrip` pipelines.
    pub fn line_strip(device: &wgpu::Device, points: &[Vec3]) -> Self {
        let vertices: Vec<Vertex> = points.iter().copied().map(Vertex::from_position).collect();
        Self::non_indexed(device, &vertices)
    }

    /// Bind this mesh's buffers in slot 0 and issue one draw for `instances`.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, instances: Range<u32>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        match &self.index_buffer {
            Some(index_buffer) => {
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..self.num_indices, 0, instances);
            }
            None => pass.draw(0..self.num_vertices, instances),
        }
    }
}

/// Mesh data before GPU upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    pub fn upload(&self, device: &wgpu::Device) -> Mesh {
        match &self.indices {
            Some(indices) => Mesh::new(device, &self.vertices, indices),
            None => Mesh::non_indexed(device, &self.vertices),
        }
    }
}
