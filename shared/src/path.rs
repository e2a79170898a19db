//! Path collider construction.
//!
//! The walkable path is authored as an ordinary mesh. Its flat vertex-position buffer
//! (`[x0, y0, z0, x1, ...]`) and flat triangle-index buffer become a static Rapier trimesh
//! on a fixed body at the origin.

use rapier3d::prelude::*;

use crate::error::MeshError;

/// Geometry extracted from the path mesh.
///
/// `indices` is optional because a mesh may be non-indexed; such a mesh cannot become a
/// trimesh collider and is rejected with [`MeshError::MissingIndices`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathMesh {
    pub positions: Vec<f32>,
    pub indices: Option<Vec<u32>>,
}

impl PathMesh {
    pub fn new(positions: Vec<f32>, indices: Option<Vec<u32>>) -> Self {
        Self { positions, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.as_ref().map_or(0, |i| i.len() / 3)
    }

    /// Validate the buffers and convert them into Rapier's vertex/triangle layout.
    pub fn to_trimesh_buffers(&self) -> Result<(Vec<Point<Real>>, Vec<[u32; 3]>), MeshError> {
        let indices = self.indices.as_ref().ok_or(MeshError::MissingIndices)?;

        if self.positions.is_empty() || indices.is_empty() {
            return Err(MeshError::Empty);
        }
        if self.positions.len() % 3 != 0 {
            return Err(MeshError::MalformedPositions(self.positions.len()));
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::MalformedIndices(indices.len()));
        }
        if self.positions.iter().any(|v| !v.is_finite()) {
            return Err(MeshError::NonFinite);
        }

        let vertex_count = self.vertex_count();
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        let vertices = self
            .positions
            .chunks_exact(3)
            .map(|p| point![p[0], p[1], p[2]])
            .collect();
        let triangles = indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        Ok((vertices, triangles))
    }
}

/// Build the static trimesh collider for a path mesh.
pub fn path_collider(mesh: &PathMesh) -> Result<Collider, MeshError> {
    let (vertices, triangles) = mesh.to_trimesh_buffers()?;
    let builder = ColliderBuilder::trimesh(vertices, triangles)
        .map_err(|err| MeshError::Degenerate(format!("{err:?}")))?;
    Ok(builder.build())
}

/// Fixed (mass-zero) body positioned at the origin, the parent of the path collider.
pub fn path_body() -> RigidBody {
    RigidBodyBuilder::fixed()
        .translation(vector![0.0, 0.0, 0.0])
        .build()
}

/// A flat square of two triangles centered on the origin at height `y`.
///
/// Handy for tests and for stages whose path is a simple floor.
pub fn flat_plane(half_extent: f32, y: f32) -> PathMesh {
    let h = half_extent;
    PathMesh::new(
        vec![-h, y, -h, h, y, -h, h, y, h, -h, y, h],
        Some(vec![0, 2, 1, 0, 3, 2]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_plane_builds_a_collider() {
        let mesh = flat_plane(5.0, 0.0);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(path_collider(&mesh).is_ok());
    }

    #[test]
    fn missing_index_buffer_is_a_checked_error() {
        let mesh = PathMesh::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0], None);
        assert_eq!(path_collider(&mesh).unwrap_err(), MeshError::MissingIndices);
    }

    #[test]
    fn malformed_buffers_are_rejected() {
        let positions = PathMesh::new(vec![0.0, 0.0], Some(vec![0, 0, 0]));
        assert_eq!(
            positions.to_trimesh_buffers().unwrap_err(),
            MeshError::MalformedPositions(2)
        );

        let indices = PathMesh::new(vec![0.0; 9], Some(vec![0, 1]));
        assert_eq!(
            indices.to_trimesh_buffers().unwrap_err(),
            MeshError::MalformedIndices(2)
        );

        let empty = PathMesh::new(Vec::new(), Some(Vec::new()));
        assert_eq!(empty.to_trimesh_buffers().unwrap_err(), MeshError::Empty);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mesh = PathMesh::new(vec![0.0; 9], Some(vec![0, 1, 3]));
        assert_eq!(
            mesh.to_trimesh_buffers().unwrap_err(),
            MeshError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn non_finite_vertices_are_rejected() {
        let mut mesh = flat_plane(1.0, 0.0);
        mesh.positions[4] = f32::INFINITY;
        assert_eq!(mesh.to_trimesh_buffers().unwrap_err(), MeshError::NonFinite);
    }
}
