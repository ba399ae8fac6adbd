//! CPU-side mesh and texture resources, uploaded to the GPU on first use.

pub use self::mesh::{GpuMeshBuffers, Mesh, VertexIndex, VERTEX_INDEX_FORMAT};
pub use self::texture::{GpuTexture, ImageTexture, TextureLoader};

mod mesh;
mod texture;
