//! Procedural mesh generation.

use crate::resource::{Mesh, VertexIndex};
use glamx::{Vec2, Vec3};

/// Generates a UV sphere mesh centered at the origin.
///
/// The sphere is tessellated as `ntheta_subdiv` segments around the equator
/// and `nphi_subdiv` segments from pole to pole. The seam column is
/// duplicated so texture coordinates wrap cleanly; `u` runs around the
/// equator and `v` from 1.0 at the top pole to 0.0 at the bottom.
///
/// # Arguments
/// * `radius` - the sphere radius
/// * `ntheta_subdiv` - number of subdivisions around the sphere (longitude)
/// * `nphi_subdiv` - number of subdivisions from top to bottom (latitude)
pub fn sphere(radius: f32, ntheta_subdiv: u32, nphi_subdiv: u32) -> Mesh {
    assert!(
        ntheta_subdiv >= 3 && nphi_subdiv >= 2,
        "A sphere needs at least 3 longitude and 2 latitude subdivisions."
    );

    let mut coords = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();

    for j in 0..=nphi_subdiv {
        let v = j as f32 / nphi_subdiv as f32;
        let phi = std::f32::consts::PI * v;
        let (sin_phi, cos_phi) = (phi.sin(), phi.cos());

        for i in 0..=ntheta_subdiv {
            let u = i as f32 / ntheta_subdiv as f32;
            let theta = std::f32::consts::TAU * u;

            let dir = Vec3::new(sin_phi * theta.cos(), cos_phi, sin_phi * theta.sin());
            coords.push(dir * radius);
            normals.push(dir);
            uvs.push(Vec2::new(u, 1.0 - v));
        }
    }

    let ring = ntheta_subdiv + 1;
    let mut faces = Vec::new();

    for j in 0..nphi_subdiv {
        for i in 0..ntheta_subdiv {
            let a = j * ring + i + 1;
            let b = j * ring + i;
            let c = (j + 1) * ring + i;
            let d = (j + 1) * ring + i + 1;

            // The quad degenerates into a single triangle at each pole.
            if j != 0 {
                faces.push([a as VertexIndex, b as VertexIndex, d as VertexIndex]);
            }
            if j != nphi_subdiv - 1 {
                faces.push([b as VertexIndex, c as VertexIndex, d as VertexIndex]);
            }
        }
    }

    Mesh::new(coords, faces, Some(normals), Some(uvs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_tessellation_counts() {
        let mesh = sphere(80.0, 32, 16);

        // (ntheta + 1) columns (seam duplicated) times (nphi + 1) rings.
        assert_eq!(mesh.num_vertices(), 33 * 17);
        // Two triangles per quad, one per quad on each pole row.
        assert_eq!(mesh.num_faces(), 2 * 32 * 15);
        assert_eq!(mesh.num_indices(), (2 * 32 * 15 * 3) as u32);
    }

    #[test]
    fn test_sphere_vertices_lie_on_the_radius() {
        let mesh = sphere(80.0, 32, 16);

        for p in mesh.coords() {
            assert!((p.length() - 80.0).abs() < 1.0e-3, "|{:?}| != 80", p);
        }
    }

    #[test]
    fn test_sphere_normals_point_outward() {
        let mesh = sphere(80.0, 32, 16);

        for (p, n) in mesh.coords().iter().zip(mesh.normals().iter()) {
            assert!((n.length() - 1.0).abs() < 1.0e-4);
            assert!(n.dot(*p) > 0.0);
        }
    }

    #[test]
    fn test_sphere_uvs_cover_the_unit_square() {
        let mesh = sphere(1.0, 8, 4);

        for uv in mesh.uvs() {
            assert!((0.0..=1.0).contains(&uv.x));
            assert!((0.0..=1.0).contains(&uv.y));
        }

        let max_u = mesh.uvs().iter().map(|uv| uv.x).fold(0.0f32, f32::max);
        let max_v = mesh.uvs().iter().map(|uv| uv.y).fold(0.0f32, f32::max);
        assert_eq!(max_u, 1.0);
        assert_eq!(max_v, 1.0);
    }

    #[test]
    fn test_sphere_indices_are_in_bounds() {
        let mesh = sphere(2.0, 5, 3);
        let n = mesh.num_vertices() as u32;

        for face in mesh.faces() {
            for idx in face {
                assert!(*idx < n);
            }
        }
    }
}
