//! CPU-side geometry and STL model loading.
//!
//! [`RawGeometry`] is the intermediate representation between a model file
//! and a GPU [`Mesh`]: it supports the handful of fix-up transformations a
//! loaded model usually needs (recentering, normalizing, smoothing) before
//! upload. Loading is fallible and a failure during scene setup aborts
//! initialization.

use std::path::Path;

use glam::Vec3;
use thiserror::Error;

use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};

/// Errors raised while loading model geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown geometry format: '{0}'")]
    UnknownFormat(String),
    #[error("failed to parse model: {0}")]
    Parse(String),
}

/// Raw geometry data before GPU upload.
#[derive(Clone, Debug)]
pub struct RawGeometry {
    /// Vertex positions, normals, and UVs.
    pub vertices: Vec<Vertex3d>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl RawGeometry {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Loads geometry from a model file, detecting the format from the
    /// extension. Currently STL (binary and ASCII).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GeometryError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "stl" => {
                let file = std::fs::File::open(path)?;
                let mut reader = std::io::BufReader::new(file);
                Self::from_stl(&mut reader)
            }
            _ => Err(GeometryError::UnknownFormat(ext)),
        }
    }

    /// Parses STL geometry from in-memory bytes.
    pub fn from_stl_bytes(bytes: &[u8]) -> Result<Self, GeometryError> {
        let mut cursor = std::io::Cursor::new(bytes);
        Self::from_stl(&mut cursor)
    }

    fn from_stl<R: std::io::Read + std::io::Seek>(reader: &mut R) -> Result<Self, GeometryError> {
        let stl = stl_io::read_stl(reader).map_err(|e| GeometryError::Parse(e.to_string()))?;

        let mut vertices = Vec::with_capacity(stl.faces.len() * 3);
        let mut indices = Vec::with_capacity(stl.faces.len() * 3);

        // Flatten the indexed triangles; STL carries per-face normals and
        // no UVs.
        for (i, face) in stl.faces.iter().enumerate() {
            let normal: [f32; 3] = face.normal.into();
            for &vertex_idx in &face.vertices {
                let position: [f32; 3] = stl.vertices[vertex_idx].into();
                vertices.push(Vertex3d::new(position, normal, [0.0, 0.0]));
            }
            let base = (i * 3) as u32;
            indices.extend_from_slice(&[base, base + 1, base + 2]);
        }

        Ok(Self::new(vertices, indices))
    }

    /// Computes the axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }

    /// The center point of the bounding box.
    pub fn center(&self) -> Vec3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    /// Translates the geometry so its bounding box is centered at the
    /// origin.
    pub fn recenter(&mut self) {
        let center = self.center();
        for v in &mut self.vertices {
            v.position[0] -= center.x;
            v.position[1] -= center.y;
            v.position[2] -= center.z;
        }
    }

    /// Uniformly scales the geometry to fit within a unit cube.
    pub fn normalize(&mut self) {
        let (min, max) = self.bounds();
        let size = max - min;
        let max_dim = size.x.max(size.y).max(size.z);
        if max_dim > 0.0 {
            let factor = 1.0 / max_dim;
            for v in &mut self.vertices {
                v.position[0] *= factor;
                v.position[1] *= factor;
                v.position[2] *= factor;
            }
        }
    }

    /// Replaces the normals with smooth, area-weighted vertex normals.
    pub fn smooth_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = [0.0, 0.0, 0.0];
        }

        for tri in self.indices.chunks(3) {
            if tri.len() < 3 {
                continue;
            }
            let p0 = Vec3::from(self.vertices[tri[0] as usize].position);
            let p1 = Vec3::from(self.vertices[tri[1] as usize].position);
            let p2 = Vec3::from(self.vertices[tri[2] as usize].position);
            let face_normal = (p1 - p0).cross(p2 - p0);

            for &i in tri {
                let n = &mut self.vertices[i as usize].normal;
                n[0] += face_normal.x;
                n[1] += face_normal.y;
                n[2] += face_normal.z;
            }
        }

        for v in &mut self.vertices {
            v.normal = Vec3::from(v.normal).normalize_or_zero().into();
        }
    }

    /// Uploads this geometry to the GPU as a [`Mesh`].
    pub fn upload(&self, gpu: &GpuContext) -> Mesh {
        Mesh::new(gpu, &self.vertices, &self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> RawGeometry {
        let n = [0.0, 1.0, 0.0];
        RawGeometry::new(
            vec![
                Vertex3d::new(a, n, [0.0, 0.0]),
                Vertex3d::new(b, n, [0.0, 0.0]),
                Vertex3d::new(c, n, [0.0, 0.0]),
            ],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn bounds_span_all_vertices() {
        let geom = tri([0.0, 0.0, 0.0], [1.0, 2.0, 3.0], [-1.0, -1.0, -1.0]);
        let (min, max) = geom.bounds();
        assert_eq!(min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn recenter_moves_bounding_box_to_origin() {
        let mut geom = tri([2.0, 2.0, 2.0], [4.0, 4.0, 4.0], [3.0, 2.0, 4.0]);
        geom.recenter();
        let center = geom.center();
        assert!(center.length() < 0.001);
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let result = RawGeometry::from_stl_bytes(&[0x13, 0x37]);
        assert!(matches!(result, Err(GeometryError::Parse(_))));
    }

    #[test]
    fn unknown_extension_is_reported() {
        let result = RawGeometry::from_path("model.glb");
        assert!(matches!(result, Err(GeometryError::UnknownFormat(ext)) if ext == "glb"));
    }
}
