//! GPU mesh geometry and procedural primitives.
//!
//! [`Vertex3d`] is the single vertex format used by every pipeline in the
//! renderer: position, normal, and texture coordinates, 32 bytes per vertex.
//! [`Mesh`] owns the uploaded vertex/index buffers and exposes one draw
//! entry point; nothing else in the renderer inspects geometry.

use glam::Vec3;

use crate::gpu::GpuContext;

/// A vertex with position, normal, and texture coordinates.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    /// The 3D position of this vertex in model space.
    pub position: [f32; 3],
    /// The surface normal vector (normalized).
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout descriptor for this vertex type.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// GPU-resident mesh geometry.
///
/// Immutable after creation; many models may reference the same mesh for the
/// lifetime of the scene.
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl Mesh {
    /// Uploads vertex and index data to the GPU.
    pub fn new(gpu: &GpuContext, vertices: &[Vertex3d], indices: &[u32]) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Binds the mesh buffers and issues the indexed draw.
    ///
    /// Pipelines, bind groups, and uniforms must already be set on the pass.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// A `size` x `size` ground plane on the XZ axes, facing +Y, with the
    /// texture repeated across it.
    pub fn plane(gpu: &GpuContext, size: f32) -> Self {
        let h = size / 2.0;
        let repeat = 8.0;
        let vertices = vec![
            Vertex3d::new([-h, 0.0, -h], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex3d::new([h, 0.0, -h], [0.0, 1.0, 0.0], [repeat, 0.0]),
            Vertex3d::new([h, 0.0, h], [0.0, 1.0, 0.0], [repeat, repeat]),
            Vertex3d::new([-h, 0.0, h], [0.0, 1.0, 0.0], [0.0, repeat]),
        ];
        let indices = vec![0, 2, 1, 0, 3, 2];
        Self::new(gpu, &vertices, &indices)
    }

    /// A unit quad in the XY plane facing +Z, used for portal bodies and
    /// decals.
    pub fn quad(gpu: &GpuContext) -> Self {
        let vertices = vec![
            Vertex3d::new([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
            Vertex3d::new([0.5, -0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex3d::new([0.5, 0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex3d::new([-0.5, 0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
        ];
        let indices = vec![0, 1, 2, 0, 2, 3];
        Self::new(gpu, &vertices, &indices)
    }

    /// A unit cube centered at the origin with per-face normals and UVs.
    pub fn cube(gpu: &GpuContext) -> Self {
        // Each face gets its own four vertices so normals stay hard.
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, tangent, bitangent) in faces {
            let n = Vec3::from(normal);
            let t = Vec3::from(tangent);
            let b = Vec3::from(bitangent);
            let base = vertices.len() as u32;
            for (u, v) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                let corner = n * 0.5 + t * (u - 0.5) + b * (v - 0.5);
                vertices.push(Vertex3d::new(corner.to_array(), normal, [u, v]));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self::new(gpu, &vertices, &indices)
    }

    /// A unit-radius UV sphere with the given segment and ring counts.
    pub fn sphere(gpu: &GpuContext, segments: u32, rings: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let v = ring as f32 / rings as f32;
            let phi = v * std::f32::consts::PI;
            for segment in 0..=segments {
                let u = segment as f32 / segments as f32;
                let theta = u * std::f32::consts::TAU;

                let x = phi.sin() * theta.cos();
                let y = phi.cos();
                let z = phi.sin() * theta.sin();
                vertices.push(Vertex3d::new([x, y, z], [x, y, z], [u, v]));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * (segments + 1) + segment;
                let b = a + segments + 1;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
        Self::new(gpu, &vertices, &indices)
    }

    /// A torus in the XZ plane: `radius` to the tube center, `tube` tube
    /// radius.
    pub fn torus(gpu: &GpuContext, radius: f32, tube: f32, segments: u32, sides: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for segment in 0..=segments {
            let u = segment as f32 / segments as f32;
            let theta = u * std::f32::consts::TAU;
            let (sin_t, cos_t) = theta.sin_cos();
            let ring_center = Vec3::new(cos_t * radius, 0.0, sin_t * radius);

            for side in 0..=sides {
                let v = side as f32 / sides as f32;
                let phi = v * std::f32::consts::TAU;
                let (sin_p, cos_p) = phi.sin_cos();

                let normal = Vec3::new(cos_t * cos_p, sin_p, sin_t * cos_p);
                let position = ring_center + normal * tube;
                vertices.push(Vertex3d::new(
                    position.to_array(),
                    normal.to_array(),
                    [u * 4.0, v],
                ));
            }
        }

        for segment in 0..segments {
            for side in 0..sides {
                let a = segment * (sides + 1) + side;
                let b = a + sides + 1;
                indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
            }
        }
        Self::new(gpu, &vertices, &indices)
    }

    /// The low-poly sphere used as the visual marker for lights.
    pub fn marker(gpu: &GpuContext) -> Self {
        Self::sphere(gpu, 12, 8)
    }
}
