//! The shared mesh and texture catalog.
//!
//! Models reference catalog entries by [`MeshKind`] / [`TextureKind`] id
//! rather than holding GPU resources, so scene content stays plain data and
//! the GPU lookup happens at draw time. Catalog entries live for the whole
//! scene and are shared freely between models.

use crate::gpu::GpuContext;
use crate::mesh::Mesh;
use crate::texture::Texture;

/// Identifies a mesh in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshKind {
    Ground,
    Cube,
    Sphere,
    /// The featured, player-controllable showcase mesh.
    Torus,
    /// Light visual marker.
    Marker,
    /// Portal body panel.
    Portal,
    /// A mesh registered at runtime (e.g. loaded from an STL file).
    Custom(usize),
}

const BUILTIN_MESHES: usize = 6;

impl MeshKind {
    fn index(self) -> usize {
        match self {
            MeshKind::Ground => 0,
            MeshKind::Cube => 1,
            MeshKind::Sphere => 2,
            MeshKind::Torus => 3,
            MeshKind::Marker => 4,
            MeshKind::Portal => 5,
            MeshKind::Custom(i) => BUILTIN_MESHES + i,
        }
    }
}

/// Identifies a texture in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureKind {
    Grass,
    Stone,
    Wood,
    Metal,
    Checker,
    BumpNormal,
    Glass,
    Flare,
    /// The portal body's bezel.
    Bezel,
}

const NUM_TEXTURES: usize = 9;

impl TextureKind {
    fn index(self) -> usize {
        self as usize
    }
}

/// GPU-resident meshes and textures, indexed by kind.
pub struct Assets {
    meshes: Vec<Mesh>,
    textures: Vec<Texture>,
}

impl Assets {
    /// Builds the full built-in catalog: procedural primitives and
    /// procedural surface textures.
    pub fn load(gpu: &GpuContext) -> Self {
        let meshes = vec![
            Mesh::plane(gpu, 200.0),
            Mesh::cube(gpu),
            Mesh::sphere(gpu, 32, 16),
            Mesh::torus(gpu, 6.0, 2.0, 48, 24),
            Mesh::marker(gpu),
            Mesh::quad(gpu),
        ];
        debug_assert_eq!(meshes.len(), BUILTIN_MESHES);

        let textures = vec![
            Texture::noise(
                gpu,
                128,
                7,
                &[[86, 125, 70], [75, 115, 60], [95, 135, 75], [80, 120, 65]],
                "Grass Texture",
            ),
            Texture::noise(
                gpu,
                128,
                23,
                &[
                    [128, 128, 128],
                    [100, 100, 100],
                    [150, 150, 150],
                    [90, 90, 90],
                ],
                "Stone Texture",
            ),
            Texture::noise(
                gpu,
                128,
                41,
                &[[139, 90, 43], [160, 120, 60], [100, 70, 40], [120, 100, 70]],
                "Wood Texture",
            ),
            Texture::noise(
                gpu,
                128,
                59,
                &[
                    [120, 125, 135],
                    [90, 95, 105],
                    [140, 145, 155],
                    [105, 110, 120],
                ],
                "Metal Texture",
            ),
            Texture::checkerboard(gpu, 128, 8, [210, 60, 40], [235, 225, 200], "Checker Texture"),
            Texture::bump_normals(gpu, 128, 4.0),
            Texture::checkerboard(gpu, 64, 4, [170, 210, 230], [140, 190, 220], "Glass Texture"),
            Texture::flare(gpu, 128),
            Texture::noise(
                gpu,
                64,
                83,
                &[[40, 40, 48], [55, 55, 65], [30, 30, 36]],
                "Bezel Texture",
            ),
        ];
        debug_assert_eq!(textures.len(), NUM_TEXTURES);

        Self { meshes, textures }
    }

    /// Registers an externally loaded mesh and returns its catalog id.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshKind {
        self.meshes.push(mesh);
        MeshKind::Custom(self.meshes.len() - 1 - BUILTIN_MESHES)
    }

    pub fn mesh(&self, kind: MeshKind) -> &Mesh {
        &self.meshes[kind.index()]
    }

    pub fn texture(&self, kind: TextureKind) -> &Texture {
        &self.textures[kind.index()]
    }
}
