//! Mirror propagation over a source mesh.

use std::collections::VecDeque;
use std::time::Instant;

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::{debug, info};

use super::options::MirrorOptions;
use super::search::{find_closest_tri, plane_distance, tri_intersection, MirrorHit, SearchRecord};
use crate::algo::report::Reporter;
use crate::error::{MeshError, Result, SkipReason};
use crate::mesh::{FaceId, MeshId, MeshProvider, PlacedMesh, VertexId};

/// A mirrored copy of a source mesh.
#[derive(Debug, Clone)]
pub struct MirroredMesh<S: MeshProvider> {
    /// Identity of the source.
    pub id: MeshId,
    /// Mirrored geometry in the source's local space, faces flipped.
    pub mesh: S,
    /// Whether each vertex was mirrored, indexed by vertex.
    pub mirrored: Vec<bool>,
    /// Number of vertices left in place.
    pub unmirrored: usize,
}

struct Propagation<'a, M: MeshProvider, S: MeshProvider> {
    mirror: &'a M,
    source: &'a mut S,
    options: &'a MirrorOptions,
    records: Vec<SearchRecord<M::Index, S::Index>>,
}

impl<'a, M, S> Propagation<'a, M, S>
where
    M: MeshProvider + Sync,
    S: MeshProvider,
{
    fn new(mirror: &'a M, source: &'a mut S, options: &'a MirrorOptions) -> Self {
        let records = vec![SearchRecord::default(); source.num_vertices()];
        Self {
            mirror,
            source,
            options,
            records,
        }
    }

    /// First intersecting face reached by a breadth-first walk over the
    /// mirror from `start`.
    fn find_first_tri(&self, point: &Point3<f64>, start: FaceId<M::Index>) -> Option<MirrorHit<M::Index>> {
        let mut visited = vec![false; self.mirror.num_faces()];
        let mut queue = VecDeque::new();
        visited[start.index()] = true;
        queue.push_back(start);

        while let Some(face) = queue.pop_front() {
            if let Some(hit) = self.intersect(face, point) {
                return Some(hit);
            }
            for next in self.mirror.face_neighbors(face) {
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn intersect(&self, face: FaceId<M::Index>, point: &Point3<f64>) -> Option<MirrorHit<M::Index>> {
        tri_intersection(
            self.mirror,
            face,
            point,
            self.options.bias,
            self.options.cull_backfaces,
        )
        .filter(|hit| hit.intersected)
    }

    fn mirror_vertex(&mut self, v: VertexId<S::Index>, hit: MirrorHit<M::Index>, force_flat: bool) {
        let smooth = self.options.smooth && !force_flat;
        let p = self.source.position(v) + hit.mirror_vector(self.mirror, smooth);
        self.source.set_position(v, p);
        self.records[v.index()].hit = Some(hit);
    }

    /// Queue every unmirrored neighbour of `v`, recording `v` as their
    /// nearest mirrored neighbour when it is closer than the last one.
    fn queue_neighbors(&mut self, v: VertexId<S::Index>, queue: &mut VecDeque<VertexId<S::Index>>) {
        let source = &*self.source;
        let p = source.position(v);
        for n in source.vertex_neighbors(v) {
            let record = &mut self.records[n.index()];
            if !record.is_mirrored() {
                queue.push_back(n);
                record.offer_neighbor(v, (p - source.position(n)).norm());
            }
        }
    }

    /// Spread outward from the mirrored vertex `start`.
    ///
    /// Each reached vertex first looks for an intersecting face near the
    /// face its nearest mirrored neighbour used. Without one, and unless
    /// only intersecting vertices may move, it is reflected flat across
    /// that neighbour's face plane.
    fn propagate(&mut self, start: VertexId<S::Index>, intersection_test: bool) {
        let mut queue = VecDeque::new();
        self.queue_neighbors(start, &mut queue);

        while let Some(v) = queue.pop_front() {
            let record = self.records[v.index()];
            if record.is_mirrored() {
                continue;
            }
            let Some(last_face) = record
                .close_vertex
                .and_then(|close| self.records[close.index()].hit)
                .map(|hit| hit.face)
            else {
                continue;
            };

            let point = self.source.position(v);
            let found = if intersection_test {
                self.find_first_tri(&point, last_face)
            } else {
                None
            };

            if let Some(hit) = found {
                self.mirror_vertex(v, hit, false);
                self.queue_neighbors(v, &mut queue);
            } else if !self.options.only_intersecting {
                let hit = plane_distance(self.mirror, last_face, &point);
                self.mirror_vertex(v, hit, true);
                self.queue_neighbors(v, &mut queue);
            }
        }
    }

    fn find_closest_tri(&self, point: &Point3<f64>) -> Option<MirrorHit<M::Index>> {
        find_closest_tri(self.mirror, point, self.options.bias, self.options.cull_backfaces)
    }

    /// Seed from every vertex that intersects the mirror.
    fn seed(&mut self) {
        let n = self.records.len();
        if self.options.intersect_closest {
            // No vertex depends on another here, so the search can fan out.
            let (mirror, bias, cull) = (self.mirror, self.options.bias, self.options.cull_backfaces);
            let positions: Vec<Point3<f64>> =
                self.source.vertex_ids().map(|v| self.source.position(v)).collect();
            let closest = |p: &Point3<f64>| find_closest_tri(mirror, p, bias, cull);
            let hits: Vec<Option<MirrorHit<M::Index>>> = if self.options.parallel {
                positions.par_iter().map(closest).collect()
            } else {
                positions.iter().map(closest).collect()
            };
            for (i, hit) in hits.into_iter().enumerate() {
                if let Some(hit) = hit {
                    self.mirror_vertex(VertexId::new(i), hit, false);
                }
            }
            return;
        }

        for i in 0..n {
            if self.records[i].is_mirrored() {
                continue;
            }
            let v = VertexId::new(i);
            if let Some(hit) = self.find_closest_tri(&self.source.position(v)) {
                self.mirror_vertex(v, hit, false);
                self.propagate(v, true);
            }
        }
    }

    /// Closest-only mode: reach the vertices that intersect nothing from
    /// their mirrored neighbours.
    fn fill_non_intersecting(&mut self) {
        if self.unmirrored() == 0 {
            return;
        }
        for i in 0..self.records.len() {
            if self.records[i].is_mirrored() {
                self.propagate(VertexId::new(i), false);
            }
        }
    }

    fn unmirrored(&self) -> usize {
        self.records.iter().filter(|r| !r.is_mirrored()).count()
    }

    fn run(mut self) -> Vec<SearchRecord<M::Index, S::Index>> {
        self.seed();
        if self.options.intersect_closest && !self.options.only_intersecting {
            self.fill_non_intersecting();
        }
        self.records
    }
}

/// Mirror the vertices of `source` across `mirror` in place.
///
/// Both meshes must be in the same space. Returns the search record of
/// every source vertex; vertices whose record has no hit were left where
/// they were. Faces are not flipped.
pub fn mirror_vertices<M, S>(
    mirror: &M,
    source: &mut S,
    options: &MirrorOptions,
) -> Vec<SearchRecord<M::Index, S::Index>>
where
    M: MeshProvider + Sync,
    S: MeshProvider,
{
    Propagation::new(mirror, source, options).run()
}

/// Mirror every source across `mirror`.
///
/// Meshes are moved into world space for the search. Each mirrored copy is
/// moved back into its source's local space with its faces flipped. A
/// source sharing the mirror's id is skipped, and a source that intersects
/// nothing is reported and left out.
///
/// # Errors
///
/// - [`MeshError::InvalidParameter`] if `options` do not validate
/// - [`MeshError::EmptyMesh`] if the mirror has no faces
///
/// # Example
///
/// ```
/// use meshcast::algo::mirror::{mirror_meshes, MirrorOptions};
/// use meshcast::algo::report::Reporter;
/// use meshcast::mesh::{build_from_triangles, HalfEdgeMesh, MeshId, PlacedMesh, Placement};
/// use nalgebra::Point3;
///
/// let plane: HalfEdgeMesh = build_from_triangles(
///     &[
///         Point3::new(-1.0, -1.0, 0.0),
///         Point3::new(1.0, -1.0, 0.0),
///         Point3::new(1.0, 1.0, 0.0),
///         Point3::new(-1.0, 1.0, 0.0),
///     ],
///     &[[0, 1, 2], [0, 2, 3]],
/// )
/// .unwrap();
/// let tile: HalfEdgeMesh = build_from_triangles(
///     &[
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(0.5, 0.0, 0.0),
///         Point3::new(0.0, 0.5, 0.0),
///     ],
///     &[[0, 1, 2]],
/// )
/// .unwrap();
///
/// let mirror = PlacedMesh::new(MeshId(0), plane, Placement::identity());
/// let sources = [PlacedMesh::new(MeshId(1), tile, Placement::at(Point3::new(0.0, 0.0, 1.0)))];
/// let mirrored = mirror_meshes(&mirror, &sources, &MirrorOptions::default(), &Reporter::none()).unwrap();
///
/// // One unit above the plane becomes one unit below: local z = -2.
/// let p = mirrored[0].mesh.position(meshcast::mesh::VertexId::new(0));
/// assert!((p.z + 2.0).abs() < 1e-12);
/// ```
pub fn mirror_meshes<M, S>(
    mirror: &PlacedMesh<M>,
    sources: &[PlacedMesh<S>],
    options: &MirrorOptions,
    reporter: &Reporter,
) -> Result<Vec<MirroredMesh<S>>>
where
    M: MeshProvider + Clone + Sync,
    S: MeshProvider + Clone,
{
    if let Err(err) = options.validate() {
        reporter.error(&err.to_string());
        return Err(err);
    }
    if mirror.mesh.num_faces() == 0 {
        reporter.error("Mirror mesh has no faces");
        return Err(MeshError::EmptyMesh);
    }

    let start = Instant::now();
    reporter.info("Executing: mirror_meshes");
    let mirror_world = mirror.world_copy();
    info!(
        mesh = %mirror.id,
        faces = mirror_world.num_faces(),
        sources = sources.len(),
        "mirroring meshes"
    );

    let mut results = Vec::with_capacity(sources.len());
    for source in sources {
        if source.id == mirror.id {
            debug!(source = %source.id, "skipping mirror mesh");
            continue;
        }

        let mut mesh = source.world_copy();
        let records = mirror_vertices(&mirror_world, &mut mesh, options);
        let mirrored: Vec<bool> = records.iter().map(SearchRecord::is_mirrored).collect();
        let unmirrored = mirrored.iter().filter(|m| !**m).count();
        debug!(source = %source.id, vertices = mirrored.len(), unmirrored, "mirrored vertices");

        if unmirrored == mirrored.len() {
            reporter.warning(&format!("Mesh: {} {}", source.id, SkipReason::NoIntersection));
            continue;
        }

        mesh.recompute_normals();
        source.placement.unapply(&mut mesh);
        mesh.flip_normals();

        if unmirrored > 0 {
            reporter.warning(&format!(
                "Mesh: {} has {} vertices that did not intersect the mirror mesh. \
                 Validate that all verts intersect the mirror mesh for better result and faster execution",
                source.id, unmirrored
            ));
        }
        results.push(MirroredMesh {
            id: source.id,
            mesh,
            mirrored,
            unmirrored,
        });
    }

    reporter.info(&format!(
        "Finished, execution time: {:.2} seconds ---",
        start.elapsed().as_secs_f64()
    ));
    Ok(results)
}
