//! Mesh construction from face-vertex lists.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertex positions and triangles.
///
/// Vertex normals are computed from the faces (area weighted). Faces must be
/// consistently wound; a directed edge used twice is rejected.
///
/// # Example
/// ```
/// use meshcast::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        if let Some(&vi) = face.iter().find(|&&vi| vi >= vertices.len()) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());
    let vertex_ids: Vec<VertexId<I>> = vertices.iter().map(|&p| mesh.add_vertex(p)).collect();

    // Directed edge (from, to) -> interior half-edge. Lookup only, never iterated.
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId<I>> =
        HashMap::with_capacity(faces.len() * 3);

    for (fi, face) in faces.iter().enumerate() {
        let face_id = FaceId::<I>::new(fi);
        let base = mesh.num_halfedges();
        let ids = [0, 1, 2].map(|k| HalfEdgeId::<I>::new(base + k));

        for k in 0..3 {
            mesh.halfedges.push(HalfEdge {
                origin: vertex_ids[face[k]],
                twin: HalfEdgeId::invalid(),
                next: ids[(k + 1) % 3],
                prev: ids[(k + 2) % 3],
                face: face_id,
            });
            mesh.vertex_mut(vertex_ids[face[k]]).halfedge = ids[k];

            let key = (face[k], face[(k + 1) % 3]);
            if edge_map.insert(key, ids[k]).is_some() {
                return Err(MeshError::NonManifoldEdge {
                    v0: key.0,
                    v1: key.1,
                });
            }
        }
        mesh.faces.push(Face::new(ids[0]));
    }

    // Link twins in face order so boundary half-edge ids are deterministic.
    for (fi, face) in faces.iter().enumerate() {
        for k in 0..3 {
            let (a, b) = (face[k], face[(k + 1) % 3]);
            let he = HalfEdgeId::<I>::new(fi * 3 + k);
            if mesh.halfedge(he).twin.is_valid() {
                continue;
            }
            match edge_map.get(&(b, a)) {
                Some(&twin) => {
                    mesh.halfedge_mut(he).twin = twin;
                    mesh.halfedge_mut(twin).twin = he;
                }
                None => {
                    let boundary = HalfEdgeId::<I>::new(mesh.num_halfedges());
                    mesh.halfedges.push(HalfEdge {
                        origin: vertex_ids[b],
                        twin: he,
                        ..HalfEdge::new()
                    });
                    mesh.halfedge_mut(he).twin = boundary;
                }
            }
        }
    }

    link_boundary_loops(&mut mesh);
    fix_boundary_vertex_halfedges(&mut mesh);
    mesh.recompute_normals();

    Ok(mesh)
}

/// Link boundary half-edges into loops: each one continues at the boundary
/// half-edge leaving its destination.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let boundary: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&he| mesh.is_boundary_halfedge(he))
        .collect();

    let mut outgoing: HashMap<usize, HalfEdgeId<I>> = HashMap::with_capacity(boundary.len());
    for &he in &boundary {
        outgoing.insert(mesh.origin(he).index(), he);
    }

    for &he in &boundary {
        if let Some(&next) = outgoing.get(&mesh.dest(he).index()) {
            mesh.halfedge_mut(he).next = next;
            mesh.halfedge_mut(next).prev = he;
        }
    }
}

/// Point every boundary vertex at a boundary half-edge.
pub(super) fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    for vid in mesh.vertex_ids().collect::<Vec<_>>() {
        let boundary = mesh
            .vertex_halfedges(vid)
            .find(|&he| mesh.is_boundary_halfedge(he));
        if let Some(he) = boundary {
            mesh.vertex_mut(vid).halfedge = he;
        }
    }
}
