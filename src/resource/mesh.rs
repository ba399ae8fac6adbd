//! Data structure of a scene node geometry.

use crate::context::Context;
use glamx::{Vec2, Vec3};

/// The type used for vertex indices.
pub type VertexIndex = u32;
/// The wgpu IndexFormat for the vertex index type.
pub const VERTEX_INDEX_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint32;

/// GPU buffers of an uploaded mesh.
pub struct GpuMeshBuffers {
    /// Vertex positions buffer.
    pub coords: wgpu::Buffer,
    /// Texture coordinates buffer.
    pub uvs: wgpu::Buffer,
    /// Vertex normals buffer.
    pub normals: wgpu::Buffer,
    /// Triangle index buffer.
    pub faces: wgpu::Buffer,
}

/// A triangle mesh, kept on the CPU and uploaded lazily on first render.
///
/// Vertex data (coordinates, normals, UVs) and triangle indices stay
/// available on the CPU so the scene model can be inspected without a GPU;
/// [`ensure_on_gpu`](Mesh::ensure_on_gpu) creates the wgpu buffers the first
/// time a renderer asks for them.
pub struct Mesh {
    coords: Vec<Vec3>,
    faces: Vec<[VertexIndex; 3]>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    gpu: Option<GpuMeshBuffers>,
}

impl Mesh {
    /// Creates a new mesh from vertex and face data.
    ///
    /// If normals or UVs are not provided, they are automatically computed
    /// (normals from face geometry, UVs as zero).
    ///
    /// # Arguments
    /// * `coords` - Vertex positions
    /// * `faces` - Triangle faces as indices into the coords array
    /// * `normals` - Optional vertex normals (auto-computed if `None`)
    /// * `uvs` - Optional texture coordinates (set to origin if `None`)
    pub fn new(
        coords: Vec<Vec3>,
        faces: Vec<[VertexIndex; 3]>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
    ) -> Mesh {
        let normals = match normals {
            Some(ns) => ns,
            None => Mesh::compute_normals_array(&coords[..], &faces[..]),
        };

        let uvs = match uvs {
            Some(us) => us,
            None => vec![Vec2::ZERO; coords.len()],
        };

        Mesh {
            coords,
            faces,
            normals,
            uvs,
            gpu: None,
        }
    }

    /// This mesh vertex coordinates.
    pub fn coords(&self) -> &[Vec3] {
        &self.coords
    }

    /// This mesh faces.
    pub fn faces(&self) -> &[[VertexIndex; 3]] {
        &self.faces
    }

    /// This mesh normals.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// This mesh texture coordinates.
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Number of vertices in this mesh.
    pub fn num_vertices(&self) -> usize {
        self.coords.len()
    }

    /// Number of triangles in this mesh.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Number of indices needed to draw this mesh.
    pub fn num_indices(&self) -> u32 {
        (self.faces.len() * 3) as u32
    }

    /// Ensures all mesh buffers are uploaded to the GPU and returns them.
    ///
    /// Requires an initialized [`Context`].
    pub fn ensure_on_gpu(&mut self) -> &GpuMeshBuffers {
        if self.gpu.is_none() {
            let ctxt = Context::get();
            self.gpu = Some(GpuMeshBuffers {
                coords: ctxt.create_buffer_init(
                    Some("mesh_coords"),
                    bytemuck::cast_slice(&self.coords),
                    wgpu::BufferUsages::VERTEX,
                ),
                uvs: ctxt.create_buffer_init(
                    Some("mesh_uvs"),
                    bytemuck::cast_slice(&self.uvs),
                    wgpu::BufferUsages::VERTEX,
                ),
                normals: ctxt.create_buffer_init(
                    Some("mesh_normals"),
                    bytemuck::cast_slice(&self.normals),
                    wgpu::BufferUsages::VERTEX,
                ),
                faces: ctxt.create_buffer_init(
                    Some("mesh_faces"),
                    bytemuck::cast_slice(&self.faces),
                    wgpu::BufferUsages::INDEX,
                ),
            });
        }

        self.gpu.as_ref().unwrap()
    }

    /// Recomputes this mesh normals from its faces.
    pub fn recompute_normals(&mut self) {
        let normals = Mesh::compute_normals_array(&self.coords[..], &self.faces[..]);
        self.normals = normals;
    }

    /// Computes smooth per-vertex normals from a set of faces.
    pub fn compute_normals_array(coordinates: &[Vec3], faces: &[[VertexIndex; 3]]) -> Vec<Vec3> {
        let mut res = Vec::new();

        Mesh::compute_normals(coordinates, faces, &mut res);

        res
    }

    /// Computes smooth per-vertex normals from a set of faces.
    pub fn compute_normals(
        coordinates: &[Vec3],
        faces: &[[VertexIndex; 3]],
        normals: &mut Vec<Vec3>,
    ) {
        let mut divisor: Vec<f32> = vec![0f32; coordinates.len()];

        normals.clear();
        normals.extend(std::iter::repeat(Vec3::ZERO).take(coordinates.len()));

        // Accumulate normals ...
        for f in faces.iter() {
            let edge1 = coordinates[f[1] as usize] - coordinates[f[0] as usize];
            let edge2 = coordinates[f[2] as usize] - coordinates[f[0] as usize];
            let cross = edge1.cross(edge2);

            let normal = if cross != Vec3::ZERO {
                cross.normalize()
            } else {
                cross
            };

            normals[f[0] as usize] += normal;
            normals[f[1] as usize] += normal;
            normals[f[2] as usize] += normal;

            divisor[f[0] as usize] += 1.0;
            divisor[f[1] as usize] += 1.0;
            divisor[f[2] as usize] += 1.0;
        }

        // ... and compute the mean
        for (n, divisor) in normals.iter_mut().zip(divisor.iter()) {
            if *divisor > 0.0 {
                *n /= *divisor
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normals_auto_computed_for_flat_triangle() {
        let coords = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mesh = Mesh::new(coords, vec![[0, 1, 2]], None, None);

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_indices(), 3);
        for n in mesh.normals() {
            assert!((*n - Vec3::Z).length() < 1.0e-6);
        }
        // Missing UVs default to the origin.
        assert!(mesh.uvs().iter().all(|uv| *uv == Vec2::ZERO));
    }
}
