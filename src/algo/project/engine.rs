//! Per-vertex projection of source meshes onto a UV-mapped target.

use std::time::Instant;

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info};

use super::bounds::Bounds;
use super::options::{ProjectOptions, View};
use super::solver::{orientation, SurfaceTracer};
use crate::algo::partition::PartitionGrid;
use crate::algo::report::Reporter;
use crate::error::{MeshError, Result, SkipReason};
use crate::geometry::{bounding_box, Barycentric};
use crate::mesh::{FaceId, MeshId, MeshProvider, PlacedMesh, VertexId};
use crate::raycast::{Bvh, RayCaster};

/// How a single vertex was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexStatus {
    /// Landed inside a target triangle.
    Full,
    /// Snapped to the closest target triangle.
    Partial,
    /// No target triangle at all; the vertex kept its basis position.
    Failed,
}

/// Vertex counts per [`VertexStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionCounts {
    /// Vertices inside a target triangle.
    pub full: usize,
    /// Vertices snapped to the closest triangle.
    pub partial: usize,
    /// Vertices with no target triangle.
    pub failed: usize,
}

impl ProjectionCounts {
    fn tally(status: &[VertexStatus]) -> Self {
        status.iter().fold(Self::default(), |mut counts, s| {
            match s {
                VertexStatus::Full => counts.full += 1,
                VertexStatus::Partial => counts.partial += 1,
                VertexStatus::Failed => counts.failed += 1,
            }
            counts
        })
    }

    /// Vertices that were placed somewhere on the target.
    pub fn placed(&self) -> usize {
        self.full + self.partial
    }

    /// Vertices that did not land inside a triangle.
    pub fn not_full(&self) -> usize {
        self.partial + self.failed
    }
}

/// A source mesh rotated into its projection basis, with its traced
/// footprint.
///
/// Preparing is the expensive half of a projection. A prepared source can be
/// projected again with different runtime options without re-tracing.
#[derive(Debug, Clone)]
pub struct PreparedSource<S> {
    id: MeshId,
    basis: S,
    bounds: Bounds,
}

impl<S: MeshProvider> PreparedSource<S> {
    /// Assemble a prepared source from a basis mesh and its bounds.
    pub fn from_parts(id: MeshId, basis: S, bounds: Bounds) -> Self {
        Self { id, basis, bounds }
    }

    /// Identity of the source.
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// The mesh in its projection basis.
    pub fn basis(&self) -> &S {
        &self.basis
    }

    /// The untransformed footprint.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }
}

/// A projected copy of a source mesh.
#[derive(Debug, Clone)]
pub struct ProjectedMesh<S: MeshProvider> {
    /// Identity of the source.
    pub id: MeshId,
    /// Projected geometry, in world space.
    pub mesh: S,
    /// Placement of each vertex, indexed by vertex.
    pub status: Vec<VertexStatus>,
    /// Totals over `status`.
    pub counts: ProjectionCounts,
}

impl<S: MeshProvider> ProjectedMesh<S> {
    /// Vertices that need attention: everything not fully projected.
    pub fn flagged_vertices(&self) -> impl Iterator<Item = VertexId<S::Index>> + '_ {
        self.status
            .iter()
            .enumerate()
            .filter(|(_, s)| **s != VertexStatus::Full)
            .map(|(i, _)| VertexId::new(i))
    }
}

/// A UV-mapped target surface, ready to receive projections.
///
/// Holds a world-space copy of the target, a partition grid over its UVs and
/// a ray caster over its triangles. All three are immutable once built.
///
/// # Example
///
/// ```
/// use meshcast::algo::project::{ProjectOptions, ProjectionTarget, View};
/// use meshcast::mesh::{build_from_triangles, HalfEdgeMesh, MeshId, PlacedMesh, Placement, UvLayer};
/// use nalgebra::{Point2, Point3};
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.0),
///     Point3::new(2.0, 2.0, 0.0),
///     Point3::new(0.0, 2.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2], [0, 2, 3]];
/// let uvs: Vec<Point2<f64>> = vertices.iter().map(|p| p.xy()).collect();
/// let plane: HalfEdgeMesh = build_from_triangles(&vertices, &faces)
///     .unwrap()
///     .with_uv_layer(UvLayer::from_vertex_uvs(&uvs, &faces));
///
/// let target = PlacedMesh::new(MeshId(0), plane, Placement::identity());
/// let target = ProjectionTarget::new(&target, View::top_down(), ProjectOptions::default()).unwrap();
///
/// let tile: HalfEdgeMesh = build_from_triangles(
///     &[
///         Point3::new(-0.5, -0.5, 0.0),
///         Point3::new(0.5, -0.5, 0.0),
///         Point3::new(0.0, 0.5, 0.0),
///     ],
///     &[[0, 1, 2]],
/// )
/// .unwrap();
/// let source = PlacedMesh::new(MeshId(1), tile, Placement::at(Point3::new(1.0, 1.0, 1.0)));
///
/// let prepared = target.prepare(&source).unwrap();
/// let projected = target.project_prepared(&prepared, target.options()).unwrap();
/// assert_eq!(projected.counts.full, 3);
/// ```
pub struct ProjectionTarget<M: MeshProvider> {
    id: MeshId,
    mesh: M,
    grid: PartitionGrid<M::Index>,
    ray_caster: Box<dyn RayCaster<M::Index>>,
    view: View,
    options: ProjectOptions,
}

impl<M: MeshProvider + Sync> ProjectionTarget<M> {
    /// Build the grid and ray caster for a target.
    ///
    /// # Errors
    ///
    /// - [`MeshError::InvalidParameter`] if `options` do not validate
    /// - [`MeshError::MissingUvLayer`] if the target has no active UV layer
    /// - [`MeshError::UvLayerMismatch`] if the layer does not cover every face
    pub fn new(target: &PlacedMesh<M>, view: View, options: ProjectOptions) -> Result<Self>
    where
        M: Clone,
    {
        options.validate()?;
        let mesh = target.world_copy();

        let found = mesh.uv_face_count().ok_or(MeshError::MissingUvLayer)?;
        if found != mesh.num_faces() {
            return Err(MeshError::UvLayerMismatch {
                expected: mesh.num_faces(),
                found,
            });
        }

        let grid = PartitionGrid::from_mesh_uv(&mesh, options.faces_per_cell(), options.bias)?;
        let ray_caster = Box::new(Bvh::build(&mesh, options.bias));

        let (cols, rows) = grid.dimensions();
        info!(
            mesh = %target.id,
            vertices = mesh.num_vertices(),
            faces = mesh.num_faces(),
            grid_cols = cols,
            grid_rows = rows,
            "prepared projection target"
        );

        Ok(Self {
            id: target.id,
            mesh,
            grid,
            ray_caster,
            view,
            options,
        })
    }

    /// Replace the bundled BVH with another ray caster over the same
    /// world-space triangles.
    pub fn with_ray_caster<R: RayCaster<M::Index> + 'static>(mut self, ray_caster: R) -> Self {
        self.ray_caster = Box::new(ray_caster);
        self
    }

    /// Identity of the target.
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// World-space target geometry.
    pub fn mesh(&self) -> &M {
        &self.mesh
    }

    /// Partition grid over the target UVs.
    pub fn grid(&self) -> &PartitionGrid<M::Index> {
        &self.grid
    }

    /// The view rays are cast along.
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Options the target was built with.
    pub fn options(&self) -> &ProjectOptions {
        &self.options
    }

    fn tracer(&self) -> SurfaceTracer<'_, M> {
        SurfaceTracer {
            mesh: &self.mesh,
            ray_caster: self.ray_caster.as_ref(),
            view: &self.view,
            bias: self.options.bias,
            max_distance: self.options.max_ray_distance,
        }
    }

    /// Rotate a source into its projection basis and trace its footprint.
    ///
    /// The orientation strategy comes from the target's options.
    pub fn prepare<S>(&self, source: &PlacedMesh<S>) -> std::result::Result<PreparedSource<S>, SkipReason>
    where
        S: MeshProvider + Clone,
    {
        let placement = &source.placement;
        let (rotation, axes) = orientation(
            self.options.projection,
            &placement.rotation_matrix(),
            &self.view,
        );

        let mut basis = source.mesh.clone();
        let mut positions = Vec::with_capacity(basis.num_vertices());
        for i in 0..basis.num_vertices() {
            let v = VertexId::new(i);
            let local = basis.position(v);
            let p = Point3::from(rotation * placement.scale.component_mul(&local.coords));
            basis.set_position(v, p);
            positions.push(p);
        }

        let (min, max) = bounding_box(&positions).ok_or(SkipReason::NothingProjected)?;
        let bounds = self
            .tracer()
            .solve_bounds(&min, &max, &axes, &placement.location())?;

        Ok(PreparedSource {
            id: source.id,
            basis,
            bounds,
        })
    }

    /// Project a prepared source with the runtime transforms in `options`.
    ///
    /// Only the bounds transforms (`keep_relative`, `move_xy`, `rotation`,
    /// `scalar`), `depth`, `smooth` and `parallel` are read from `options`.
    ///
    /// # Errors
    ///
    /// - [`MeshError::InvalidParameter`] if `options` do not validate
    /// - [`MeshError::Skipped`] with [`SkipReason::NothingProjected`] if no
    ///   vertex found a target triangle
    pub fn project_prepared<S>(&self, prepared: &PreparedSource<S>, options: &ProjectOptions) -> Result<ProjectedMesh<S>>
    where
        S: MeshProvider + Clone,
    {
        options.validate()?;
        let mut bounds = prepared.bounds;
        if options.keep_relative {
            bounds.ensure_mesh_ratio();
        }
        bounds.translate(&options.move_xy);
        bounds.rotate(options.rotation);
        bounds.scale_by(&options.scalar.xy());

        let basis = &prepared.basis;
        let positions: Vec<Point3<f64>> = basis.vertex_ids().map(|v| basis.position(v)).collect();
        let place = |co: &Point3<f64>| self.place_vertex(co, &bounds, options);
        let placed: Vec<(Point3<f64>, VertexStatus)> = if options.parallel {
            positions.par_iter().map(place).collect()
        } else {
            positions.iter().map(place).collect()
        };

        let status: Vec<VertexStatus> = placed.iter().map(|(_, s)| *s).collect();
        let counts = ProjectionCounts::tally(&status);
        debug!(
            source = %prepared.id,
            full = counts.full,
            partial = counts.partial,
            failed = counts.failed,
            "projected vertices"
        );
        if counts.placed() == 0 {
            return Err(SkipReason::NothingProjected.into());
        }

        let mut mesh = basis.clone();
        for (i, (p, _)) in placed.into_iter().enumerate() {
            mesh.set_position(VertexId::new(i), p);
        }
        mesh.recompute_normals();

        Ok(ProjectedMesh {
            id: prepared.id,
            mesh,
            status,
            counts,
        })
    }

    /// Prepare and project in one go, with the target's own options.
    pub fn project<S>(&self, source: &PlacedMesh<S>) -> Result<ProjectedMesh<S>>
    where
        S: MeshProvider + Clone,
    {
        let prepared = self.prepare(source)?;
        self.project_prepared(&prepared, &self.options)
    }

    fn place_vertex(
        &self,
        co: &Point3<f64>,
        bounds: &Bounds,
        options: &ProjectOptions,
    ) -> (Point3<f64>, VertexStatus) {
        let uv = bounds.uv_point(co);
        let depth = uv.z * options.scalar.z + options.depth;
        let uv = uv.xy();

        if let Some(hit) = self.grid.query_containing(&uv) {
            let p = self.surface_point(hit.face, &hit.weights, depth, options.smooth);
            return (p, VertexStatus::Full);
        }
        match self.grid.query_closest(&uv) {
            Some(hit) => {
                let p = self.surface_point(hit.face, &hit.weights.clamped(), depth, options.smooth);
                (p, VertexStatus::Partial)
            }
            None => (*co, VertexStatus::Failed),
        }
    }

    /// Point on a target triangle lifted `depth` along its normal.
    fn surface_point(
        &self,
        face: FaceId<M::Index>,
        weights: &Barycentric,
        depth: f64,
        smooth: bool,
    ) -> Point3<f64> {
        let base = weights.interpolate_point(&self.mesh.face_positions(face));
        let flat = || self.mesh.face_normal(face);
        let normal: Vector3<f64> = if smooth {
            weights
                .interpolate_vector(&self.mesh.face_normals(face))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(flat)
        } else {
            flat()
        };
        base + normal * depth
    }
}

/// Project every source onto `target`.
///
/// A source sharing the target's id is skipped. A source that cannot be
/// projected is reported and left out; the rest carry on.
pub fn project_meshes<M, S>(
    target: &ProjectionTarget<M>,
    sources: &[PlacedMesh<S>],
    reporter: &Reporter,
) -> Vec<ProjectedMesh<S>>
where
    M: MeshProvider + Sync,
    S: MeshProvider + Clone,
{
    let start = Instant::now();
    reporter.info("Executing: project_meshes");

    let mut projected = Vec::with_capacity(sources.len());
    for source in sources {
        if source.id == target.id() {
            debug!(source = %source.id, "skipping projection target");
            continue;
        }
        match target.project(source) {
            Ok(result) => {
                report_counts(reporter, &result);
                projected.push(result);
            }
            Err(err) => reporter.warning(&format!("Mesh: {} {}", source.id, err)),
        }
    }

    reporter.info(&format!(
        "Finished, execution time: {:.2} seconds ---",
        start.elapsed().as_secs_f64()
    ));
    projected
}

/// Build a target from `target` and project every source onto it.
///
/// Unlike [`ProjectionTarget::new`], a failed precondition is also sent to
/// `reporter` as an error before it is returned.
///
/// # Errors
///
/// The errors of [`ProjectionTarget::new`].
pub fn project_onto<M, S>(
    target: &PlacedMesh<M>,
    view: View,
    options: ProjectOptions,
    sources: &[PlacedMesh<S>],
    reporter: &Reporter,
) -> Result<Vec<ProjectedMesh<S>>>
where
    M: MeshProvider + Clone + Sync,
    S: MeshProvider + Clone,
{
    let target = match ProjectionTarget::new(target, view, options) {
        Ok(target) => target,
        Err(err) => {
            reporter.error(&err.to_string());
            return Err(err);
        }
    };
    Ok(project_meshes(&target, sources, reporter))
}

fn report_counts<S: MeshProvider>(reporter: &Reporter, result: &ProjectedMesh<S>) {
    let counts = &result.counts;
    if counts.not_full() > 0 {
        reporter.warning(&format!(
            "Mesh: {} has {} vertices that did not project successfully and are selected. \
             Verify no holes in UV map or try lowering target mesh density",
            result.id,
            counts.not_full()
        ));
    }
    if counts.failed > 0 {
        reporter.warning(&format!(
            "Mesh: {} has {} vertices that failed to be projected. \
             Validate that the target uv map covers the projection area",
            result.id, counts.failed
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::report::Level;
    use crate::mesh::{build_from_triangles, HalfEdgeMesh, Placement, UvLayer};
    use nalgebra::{Point2, Vector2};

    /// Plane over [0, 2]² at z = 0, eight triangles, uv = xy.
    fn plane_target() -> PlacedMesh<HalfEdgeMesh> {
        let mut vertices = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                vertices.push(Point3::new(x as f64, y as f64, 0.0));
            }
        }
        let mut faces = Vec::new();
        for y in 0..2 {
            for x in 0..2 {
                let i = y * 3 + x;
                faces.push([i, i + 1, i + 4]);
                faces.push([i, i + 4, i + 3]);
            }
        }
        let uvs: Vec<Point2<f64>> = vertices.iter().map(|p| p.xy()).collect();
        let mesh = build_from_triangles(&vertices, &faces)
            .unwrap()
            .with_uv_layer(UvLayer::from_vertex_uvs(&uvs, &faces));
        PlacedMesh::new(MeshId(0), mesh, Placement::identity())
    }

    /// Square of side `2 * half` centred on the origin, `n × n` quads, at height `z`.
    fn square(half: f64, n: usize, z: f64) -> HalfEdgeMesh {
        let step = 2.0 * half / n as f64;
        let mut vertices = Vec::new();
        for y in 0..=n {
            for x in 0..=n {
                vertices.push(Point3::new(-half + x as f64 * step, -half + y as f64 * step, z));
            }
        }
        let mut faces = Vec::new();
        for y in 0..n {
            for x in 0..n {
                let i = y * (n + 1) + x;
                faces.push([i, i + 1, i + n + 2]);
                faces.push([i, i + n + 2, i + n + 1]);
            }
        }
        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn source(id: u32, mesh: HalfEdgeMesh) -> PlacedMesh<HalfEdgeMesh> {
        PlacedMesh::new(MeshId(id), mesh, Placement::at(Point3::new(1.0, 1.0, 1.0)))
    }

    fn target(options: ProjectOptions) -> ProjectionTarget<HalfEdgeMesh> {
        ProjectionTarget::new(&plane_target(), View::top_down(), options).unwrap()
    }

    #[test]
    fn test_identity_projection() {
        let target = target(ProjectOptions::default());
        let src = source(1, square(0.5, 2, 0.0));
        let projected = target.project(&src).unwrap();

        assert_eq!(projected.counts.full, 9);
        assert_eq!(projected.flagged_vertices().count(), 0);
        for v in src.mesh.vertex_ids() {
            let expected = src.mesh.position(v) + Vector3::new(1.0, 1.0, 0.0);
            let got = projected.mesh.position(v);
            assert!((got - expected).norm() < 1e-10, "{got} != {expected}");
            assert!((projected.mesh.normal(v) - Vector3::z()).norm() < 1e-10);
        }
    }

    #[test]
    fn test_depth_and_offsets() {
        let options = ProjectOptions::default()
            .with_depth(0.5)
            .with_scalar(Vector3::new(1.0, 1.0, 2.0))
            .with_move(Vector2::new(0.25, 0.0));
        let target = target(options.clone());
        let src = source(1, square(0.5, 1, 0.25));

        let prepared = target.prepare(&src).unwrap();
        let projected = target.project_prepared(&prepared, &options).unwrap();
        for v in src.mesh.vertex_ids() {
            let local = src.mesh.position(v);
            let expected = Point3::new(local.x + 1.25, local.y + 1.0, 0.25 * 2.0 + 0.5);
            assert!((projected.mesh.position(v) - expected).norm() < 1e-10);
        }

        // Same prepared source, flat normals, no offsets.
        let plain = ProjectOptions::default().with_smooth(false);
        let projected = target.project_prepared(&prepared, &plain).unwrap();
        let v = VertexId::new(0);
        assert!((projected.mesh.position(v) - Point3::new(0.5, 0.5, 0.25)).norm() < 1e-10);
    }

    #[test]
    fn test_overhanging_vertices_are_partial() {
        let target = target(ProjectOptions::default());
        // Corners at ±1.5 miss the plane; the halfway traces hit it.
        let src = source(1, square(1.5, 3, 0.0));
        let projected = target.project(&src).unwrap();

        assert_eq!(projected.counts.full, 4);
        assert_eq!(projected.counts.partial, 12);
        assert_eq!(projected.counts.failed, 0);

        // (-1.5, -1.5) clamps onto the plane corner.
        let corner = projected.mesh.position(VertexId::new(0));
        assert!((corner - Point3::new(0.0, 0.0, 0.0)).norm() < 1e-10);
        assert_eq!(projected.status[0], VertexStatus::Partial);
    }

    #[test]
    fn test_empty_grid_projects_nothing() {
        let empty = PlacedMesh::new(
            MeshId(0),
            HalfEdgeMesh::<u32>::new().with_uv_layer(UvLayer::new(Vec::new())),
            Placement::identity(),
        );
        let target = ProjectionTarget::new(&empty, View::top_down(), ProjectOptions::default()).unwrap();
        assert!(target.grid().is_empty());

        let bounds = Bounds {
            anchor: Point2::new(0.5, 0.5),
            rotation: 0.0,
            scale: Vector2::new(1.0, 1.0),
            mesh_min: Point3::new(-0.5, -0.5, 0.0),
            mesh_max: Point3::new(0.5, 0.5, 0.0),
        };
        let prepared = PreparedSource::from_parts(MeshId(1), square(0.5, 1, 0.0), bounds);
        let result = target.project_prepared(&prepared, target.options());
        assert!(matches!(result, Err(MeshError::Skipped(SkipReason::NothingProjected))));

        let src = source(1, square(0.5, 1, 0.0));
        assert_eq!(target.prepare(&src).unwrap_err(), SkipReason::CenterMissed);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let options = ProjectOptions::default().with_rotation(0.3).with_depth(0.1);
        let target = target(options.clone());
        let prepared = target.prepare(&source(1, square(0.6, 12, 0.05))).unwrap();

        let parallel = target.project_prepared(&prepared, &options).unwrap();
        let sequential = target.project_prepared(&prepared, &options.clone().sequential()).unwrap();
        assert_eq!(parallel.status, sequential.status);
        for v in parallel.mesh.vertex_ids() {
            assert_eq!(parallel.mesh.position(v), sequential.mesh.position(v));
        }
    }

    #[test]
    fn test_target_preconditions() {
        let mut bare = plane_target();
        bare.mesh = square(1.0, 1, 0.0);
        assert!(matches!(
            ProjectionTarget::new(&bare, View::top_down(), ProjectOptions::default()),
            Err(MeshError::MissingUvLayer)
        ));

        bare.mesh = square(1.0, 1, 0.0).with_uv_layer(UvLayer::new(vec![[Point2::origin(); 3]]));
        assert!(matches!(
            ProjectionTarget::new(&bare, View::top_down(), ProjectOptions::default()),
            Err(MeshError::UvLayerMismatch { expected: 2, found: 1 })
        ));

        let bad = ProjectOptions::default().with_max_ray_distance(0.0);
        assert!(matches!(
            ProjectionTarget::new(&plane_target(), View::top_down(), bad),
            Err(MeshError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_project_meshes_reports() {
        let target = target(ProjectOptions::default());
        let sources = vec![
            plane_target(),
            source(1, square(0.5, 1, 0.0)),
            source(2, square(1.5, 3, 0.0)),
            PlacedMesh::new(MeshId(3), square(0.5, 1, 0.0), Placement::at(Point3::new(9.0, 9.0, 1.0))),
        ];
        let (reporter, messages) = Reporter::collecting();
        let projected = project_meshes(&target, &sources, &reporter);

        let ids: Vec<MeshId> = projected.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![MeshId(1), MeshId(2)]);

        let messages = messages.lock().unwrap();
        let warnings: Vec<&str> = messages
            .iter()
            .filter(|(level, _)| *level == Level::Warning)
            .map(|(_, m)| m.as_str())
            .collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Mesh: #2 has 12 vertices that did not project"));
        assert_eq!(warnings[1], "Mesh: #3 center point did not project onto the target");
    }

    #[test]
    fn test_runtime_options_are_validated() {
        let target = target(ProjectOptions::default());
        let prepared = target.prepare(&source(1, square(0.5, 1, 0.0))).unwrap();

        for bad in [
            ProjectOptions::default().with_rotation(f64::NAN),
            ProjectOptions::default().with_move(Vector2::new(f64::INFINITY, 0.0)),
            ProjectOptions::default().with_scalar(Vector3::new(1.0, f64::NAN, 1.0)),
            ProjectOptions::default().with_depth(f64::NEG_INFINITY),
        ] {
            let result = target.project_prepared(&prepared, &bad);
            assert!(matches!(result, Err(MeshError::InvalidParameter { .. })), "{bad:?}");
        }
        assert!(target.project_prepared(&prepared, target.options()).is_ok());
    }

    #[test]
    fn test_project_onto_reports_fatal_errors() {
        let mut bare = plane_target();
        bare.mesh = square(1.0, 1, 0.0);
        let sources = vec![source(1, square(0.5, 1, 0.0))];

        let (reporter, messages) = Reporter::collecting();
        let result = project_onto(&bare, View::top_down(), ProjectOptions::default(), &sources, &reporter);
        assert!(matches!(result, Err(MeshError::MissingUvLayer)));
        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0],
            (Level::Error, "no active UV layer found on the target surface".to_string())
        );
        drop(messages);

        let (reporter, messages) = Reporter::collecting();
        let projected =
            project_onto(&plane_target(), View::top_down(), ProjectOptions::default(), &sources, &reporter).unwrap();
        assert_eq!(projected.len(), 1);
        assert!(messages.lock().unwrap().iter().all(|(level, _)| *level == Level::Info));
    }
}
