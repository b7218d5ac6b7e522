//! Uniform grid over UV space for locating triangles.
//!
//! Each cell lists every triangle whose UV bounding box (padded for the
//! intersection bias) overlaps it. Triangles are registered in index order,
//! so every cell list is sorted, and a scan that stops at the first match
//! finds the lowest-index containing triangle. That makes
//! [`PartitionGrid::query_containing`] agree exactly with
//! [`PartitionGrid::brute_force_containing`].
//!
//! # Example
//!
//! ```
//! use meshcast::algo::partition::PartitionGrid;
//! use nalgebra::Point2;
//!
//! let triangles = vec![
//!     [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)],
//!     [Point2::new(0.0, 0.0), Point2::new(1.0, 1.0), Point2::new(0.0, 1.0)],
//! ];
//! let grid: PartitionGrid = PartitionGrid::new(triangles, 4.0, 1e-5);
//!
//! let hit = grid.query_containing(&Point2::new(0.8, 0.1)).unwrap();
//! assert_eq!(hit.face.index(), 0);
//!
//! let closest = grid.query_closest(&Point2::new(1.5, 0.5)).unwrap();
//! assert!((closest.distance - 0.5).abs() < 1e-12);
//! ```

use std::marker::PhantomData;

use nalgebra::{Point2, Vector2};
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::geometry::{closest_point_in_triangle, point_in_triangle, Barycentric};
use crate::mesh::{FaceId, MeshIndex, MeshProvider};

/// Upper bound on cells per registered triangle.
const MAX_CELLS_PER_TRIANGLE: usize = 16;

/// A triangle containing the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHit<I: MeshIndex = u32> {
    /// The containing triangle.
    pub face: FaceId<I>,
    /// Weights of the query point in that triangle.
    pub weights: Barycentric,
}

/// The triangle closest to the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestHit<I: MeshIndex = u32> {
    /// Distance from the query point to the triangle.
    pub distance: f64,
    /// The closest triangle.
    pub face: FaceId<I>,
    /// Edge the closest point lies on, if any (edge `k` joins corners `k`
    /// and `k + 1`).
    pub edge: Option<usize>,
    /// Clamped weights of the closest point.
    pub weights: Barycentric,
    /// The closest point.
    pub point: Point2<f64>,
}

/// Grid over UV space bucketing triangles by their bounding boxes.
#[derive(Debug, Clone)]
pub struct PartitionGrid<I: MeshIndex = u32> {
    triangles: Vec<[Point2<f64>; 3]>,
    cells: Vec<Vec<usize>>,
    origin: Point2<f64>,
    cell_size: Vector2<f64>,
    cols: usize,
    rows: usize,
    bias: f64,
    _marker: PhantomData<I>,
}

impl<I: MeshIndex> PartitionGrid<I> {
    /// Build a grid from the active UV layer of a mesh.
    ///
    /// `faces_per_cell` sets the density: a cell covers roughly that many
    /// average-sized triangles.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::MissingUvLayer`] if the mesh has no UVs.
    pub fn from_mesh_uv<M: MeshProvider<Index = I>>(
        mesh: &M,
        faces_per_cell: f64,
        bias: f64,
    ) -> Result<Self> {
        if !mesh.has_uvs() {
            return Err(MeshError::MissingUvLayer);
        }
        let triangles = mesh
            .face_ids()
            .map(|f| mesh.face_uvs(f).ok_or(MeshError::MissingUvLayer))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(triangles, faces_per_cell, bias))
    }

    /// Build a grid over explicit UV triangles; face ids follow their order.
    pub fn new(triangles: Vec<[Point2<f64>; 3]>, faces_per_cell: f64, bias: f64) -> Self {
        let boxes: Vec<(Point2<f64>, Point2<f64>)> =
            triangles.iter().map(|t| padded_box(t, bias)).collect();

        let Some((min, max)) = boxes
            .iter()
            .copied()
            .reduce(|(a0, a1), (b0, b1)| (a0.inf(&b0), a1.sup(&b1)))
        else {
            return Self::empty(bias);
        };

        let extent = max - min;
        let area: f64 = triangles
            .iter()
            .map(|[a, b, c]| crate::mesh::uv_triangle_area(a, b, c))
            .sum();
        let average_area = area / triangles.len() as f64;

        let mut side = (average_area * faces_per_cell.max(0.0)).sqrt();
        if !(side.is_finite() && side > 0.0) {
            side = extent.x.max(extent.y);
        }
        if !(side > 0.0) {
            side = 1.0;
        }

        // Sparse layouts (outlier islands, wrapped UVs) would otherwise ask
        // for far more cells than triangles.
        let max_cells = MAX_CELLS_PER_TRIANGLE.saturating_mul(triangles.len());
        let axis_cells = |length: f64, side: f64| ((length / side).ceil() as usize).max(1);
        let (mut cols, mut rows) = (axis_cells(extent.x, side), axis_cells(extent.y, side));
        while cols.saturating_mul(rows) > max_cells {
            side *= 2.0;
            cols = axis_cells(extent.x, side);
            rows = axis_cells(extent.y, side);
        }
        let cell_size = Vector2::new(
            cell_extent(extent.x, cols, side),
            cell_extent(extent.y, rows, side),
        );

        let mut grid = Self {
            triangles,
            cells: vec![Vec::new(); cols * rows],
            origin: min,
            cell_size,
            cols,
            rows,
            bias,
            _marker: PhantomData,
        };

        for (face, (lo, hi)) in boxes.iter().enumerate() {
            let (c0, r0) = grid.clamped_cell(lo);
            let (c1, r1) = grid.clamped_cell(hi);
            for row in r0..=r1 {
                for col in c0..=c1 {
                    grid.cells[row * cols + col].push(face);
                }
            }
        }

        debug!(
            triangles = grid.triangles.len(),
            cols,
            rows,
            cell_width = cell_size.x,
            cell_height = cell_size.y,
            "built UV partition grid"
        );
        grid
    }

    fn empty(bias: f64) -> Self {
        Self {
            triangles: Vec::new(),
            cells: Vec::new(),
            origin: Point2::origin(),
            cell_size: Vector2::repeat(1.0),
            cols: 0,
            rows: 0,
            bias,
            _marker: PhantomData,
        }
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the grid holds no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Grid dimensions as `(columns, rows)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Size of one cell in UV units.
    pub fn cell_size(&self) -> Vector2<f64> {
        self.cell_size
    }

    /// UV corners of a registered triangle.
    pub fn triangle(&self, face: FaceId<I>) -> &[Point2<f64>; 3] {
        &self.triangles[face.index()]
    }

    /// Lowest-index triangle containing `uv` within the bias.
    pub fn query_containing(&self, uv: &Point2<f64>) -> Option<GridHit<I>> {
        let (col, row) = self.cell(uv)?;
        self.cells[row * self.cols + col]
            .iter()
            .find_map(|&face| self.contains(face, uv))
    }

    /// Reference scan of every triangle; same result as
    /// [`query_containing`](Self::query_containing).
    pub fn brute_force_containing(&self, uv: &Point2<f64>) -> Option<GridHit<I>> {
        (0..self.triangles.len()).find_map(|face| self.contains(face, uv))
    }

    /// Triangle closest to `uv`, found by searching rings of cells outward
    /// from the point's cell.
    ///
    /// Equal distances resolve to the lowest face index. Returns `None` only
    /// for an empty grid.
    pub fn query_closest(&self, uv: &Point2<f64>) -> Option<ClosestHit<I>> {
        if self.cells.is_empty() {
            return None;
        }
        let (col, row) = self.clamped_cell(uv);
        let (col, row) = (col as isize, row as isize);
        let (cols, rows) = (self.cols as isize, self.rows as isize);
        let max_ring = col.max(cols - 1 - col).max(row).max(rows - 1 - row);

        let mut best: Option<ClosestHit<I>> = None;
        for ring in 0..=max_ring {
            for (c, r) in ring_cells(col, row, ring) {
                if c < 0 || r < 0 || c >= cols || r >= rows {
                    continue;
                }
                for &face in &self.cells[(r * cols + c) as usize] {
                    let candidate = self.closest_to(face, uv);
                    if is_better(&candidate, best.as_ref()) {
                        best = Some(candidate);
                    }
                }
            }

            // Anything not seen yet lies outside the searched block of cells.
            if let Some(found) = &best {
                let bound = self.unsearched_distance(uv, col, row, ring);
                if found.distance < bound {
                    break;
                }
            }
        }
        best
    }

    /// Reference scan of every triangle; same result as
    /// [`query_closest`](Self::query_closest).
    pub fn brute_force_closest(&self, uv: &Point2<f64>) -> Option<ClosestHit<I>> {
        (0..self.triangles.len()).fold(None, |best, face| {
            let candidate = self.closest_to(face, uv);
            if is_better(&candidate, best.as_ref()) {
                Some(candidate)
            } else {
                best
            }
        })
    }

    fn contains(&self, face: usize, uv: &Point2<f64>) -> Option<GridHit<I>> {
        let [a, b, c] = &self.triangles[face];
        point_in_triangle(uv, a, b, c, self.bias).map(|weights| GridHit {
            face: FaceId::new(face),
            weights,
        })
    }

    fn closest_to(&self, face: usize, uv: &Point2<f64>) -> ClosestHit<I> {
        let [a, b, c] = &self.triangles[face];
        let closest = closest_point_in_triangle(uv, a, b, c);
        ClosestHit {
            distance: (closest.point - uv).norm(),
            face: FaceId::new(face),
            edge: closest.feature.edge(),
            weights: closest.weights,
            point: closest.point,
        }
    }

    /// Cell containing `uv`, or `None` outside the grid. The far edges of the
    /// grid belong to the last row and column.
    fn cell(&self, uv: &Point2<f64>) -> Option<(usize, usize)> {
        let local = (uv - self.origin).component_div(&self.cell_size);
        let inside = !self.cells.is_empty()
            && local.x >= 0.0
            && local.y >= 0.0
            && local.x <= self.cols as f64
            && local.y <= self.rows as f64;
        inside.then(|| self.clamped_cell(uv))
    }

    /// Cell containing `uv`, clamped onto the grid.
    fn clamped_cell(&self, uv: &Point2<f64>) -> (usize, usize) {
        let local = (uv - self.origin).component_div(&self.cell_size);
        let clamp = |x: f64, n: usize| (x.floor().max(0.0) as usize).min(n.saturating_sub(1));
        (clamp(local.x, self.cols), clamp(local.y, self.rows))
    }

    /// Lower bound on the distance from `uv` to any cell outside the block
    /// of `ring` rings around `(col, row)`. Sides already at the grid edge
    /// have no cells beyond them.
    fn unsearched_distance(&self, uv: &Point2<f64>, col: isize, row: isize, ring: isize) -> f64 {
        let x0 = self.origin.x + (col - ring) as f64 * self.cell_size.x;
        let x1 = self.origin.x + (col + ring + 1) as f64 * self.cell_size.x;
        let y0 = self.origin.y + (row - ring) as f64 * self.cell_size.y;
        let y1 = self.origin.y + (row + ring + 1) as f64 * self.cell_size.y;

        let sides = [
            (col - ring > 0, uv.x - x0),
            (col + ring < self.cols as isize - 1, x1 - uv.x),
            (row - ring > 0, uv.y - y0),
            (row + ring < self.rows as isize - 1, y1 - uv.y),
        ];
        sides
            .iter()
            .filter(|(open, _)| *open)
            .map(|&(_, d)| d.max(0.0))
            .fold(f64::INFINITY, f64::min)
    }
}

fn is_better<I: MeshIndex>(candidate: &ClosestHit<I>, best: Option<&ClosestHit<I>>) -> bool {
    match best {
        None => true,
        Some(best) => {
            candidate.distance < best.distance
                || (candidate.distance == best.distance && candidate.face < best.face)
        }
    }
}

/// Cells at Chebyshev distance exactly `ring` from `(col, row)`, row by row.
fn ring_cells(col: isize, row: isize, ring: isize) -> impl Iterator<Item = (isize, isize)> {
    (-ring..=ring).flat_map(move |dy| {
        let step = if dy.abs() == ring { 1 } else { (2 * ring).max(1) as usize };
        (-ring..=ring)
            .step_by(step)
            .map(move |dx| (col + dx, row + dy))
    })
}

/// UV bounding box of a triangle, grown to cover every point whose weights
/// are all at least `-bias`.
fn padded_box(tri: &[Point2<f64>; 3], bias: f64) -> (Point2<f64>, Point2<f64>) {
    let [a, b, c] = tri;
    let lo = a.inf(b).inf(c);
    let hi = a.sup(b).sup(c);
    let extent = hi - lo;
    let pad = Vector2::repeat(3.0 * bias.max(0.0) * extent.x.max(extent.y));
    (lo - pad, hi + pad)
}

/// Cell extent along one axis: `side`, unless the axis was capped.
fn cell_extent(length: f64, cells: usize, side: f64) -> f64 {
    if length > side * cells as f64 {
        length / cells as f64
    } else {
        side
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `n × n` unit squares split into two triangles each, UV = position.
    fn uv_grid(n: usize) -> Vec<[Point2<f64>; 3]> {
        let mut tris = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let (x, y) = (i as f64, j as f64);
                let p00 = Point2::new(x, y);
                let p10 = Point2::new(x + 1.0, y);
                let p11 = Point2::new(x + 1.0, y + 1.0);
                let p01 = Point2::new(x, y + 1.0);
                tris.push([p00, p10, p11]);
                tris.push([p00, p11, p01]);
            }
        }
        tris
    }

    /// Deterministic pseudo-random points in `[lo, hi)²`.
    fn sample_points(count: usize, lo: f64, hi: f64) -> Vec<Point2<f64>> {
        let mut state = 0x2545_f491_u64;
        let mut next = move || {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            lo + (hi - lo) * ((state >> 11) as f64 / (1u64 << 53) as f64)
        };
        (0..count).map(|_| Point2::new(next(), next())).collect()
    }

    #[test]
    fn test_grid_dimensions() {
        let grid: PartitionGrid = PartitionGrid::new(uv_grid(4), 2.0, 1e-5);
        assert_eq!(grid.len(), 32);
        // Average triangle area 0.5, two faces per cell -> unit cells.
        let (cols, rows) = grid.dimensions();
        assert!((4..=5).contains(&cols) && (4..=5).contains(&rows));
    }

    #[test]
    fn test_containing_matches_brute_force() {
        let grid: PartitionGrid = PartitionGrid::new(uv_grid(6), 1.5, 1e-5);
        let mut points = sample_points(500, -1.0, 7.0);
        // Shared edges and vertices, where several triangles qualify.
        points.extend([
            Point2::new(1.0, 1.0),
            Point2::new(2.5, 2.5),
            Point2::new(3.0, 0.5),
            Point2::new(0.0, 0.0),
            Point2::new(6.0, 6.0),
        ]);
        for p in &points {
            assert_eq!(grid.query_containing(p), grid.brute_force_containing(p), "at {p:?}");
        }
    }

    #[test]
    fn test_containing_picks_lowest_index() {
        let grid: PartitionGrid = PartitionGrid::new(uv_grid(2), 1.0, 1e-5);
        // (1, 1) is a corner of every square; square 0 comes first.
        let hit = grid.query_containing(&Point2::new(1.0, 1.0)).unwrap();
        assert_eq!(hit.face, FaceId::new(0));
        assert!((hit.weights.sum() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_closest_matches_brute_force() {
        let grid: PartitionGrid = PartitionGrid::new(uv_grid(5), 0.5, 1e-5);
        for p in sample_points(300, -4.0, 9.0) {
            let fast = grid.query_closest(&p).unwrap();
            let slow = grid.brute_force_closest(&p).unwrap();
            assert!((fast.distance - slow.distance).abs() < 1e-12, "at {p:?}");
            assert_eq!(fast.face, slow.face, "at {p:?}");
        }
    }

    #[test]
    fn test_closest_weights_are_clamped() {
        let grid: PartitionGrid = PartitionGrid::new(uv_grid(3), 1.0, 1e-5);
        let hit = grid.query_closest(&Point2::new(-2.0, 1.5)).unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-12);
        assert!(hit.edge.is_some());
        let w = hit.weights.to_array();
        assert!(w.iter().all(|x| (0.0..=1.0).contains(x)));
        assert!((hit.weights.sum() - 1.0).abs() < 1e-12);
        let uv = hit.weights.interpolate_uv(grid.triangle(hit.face));
        assert!((uv - Point2::new(0.0, 1.5)).norm() < 1e-12);
    }

    #[test]
    fn test_outlier_uvs_keep_cell_count_bounded() {
        let sliver = |x: f64| {
            [
                Point2::new(x, x),
                Point2::new(x + 0.001, x),
                Point2::new(x, x + 0.001),
            ]
        };
        let grid: PartitionGrid = PartitionGrid::new(vec![sliver(0.0), sliver(50.0)], 4.0, 1e-5);
        let (cols, rows) = grid.dimensions();
        assert!(cols * rows <= 2 * MAX_CELLS_PER_TRIANGLE, "{cols} x {rows}");

        let hit = grid.query_containing(&Point2::new(50.0002, 50.0002)).unwrap();
        assert_eq!(hit.face.index(), 1);
        let closest = grid.query_closest(&Point2::new(25.0, 25.0)).unwrap();
        assert_eq!(closest.face.index(), 0);
        assert_eq!(closest, grid.brute_force_closest(&Point2::new(25.0, 25.0)).unwrap());
    }

    #[test]
    fn test_empty_grid() {
        let grid: PartitionGrid = PartitionGrid::new(Vec::new(), 4.0, 1e-5);
        assert!(grid.is_empty());
        assert_eq!(grid.dimensions(), (0, 0));
        assert!(grid.query_containing(&Point2::new(0.5, 0.5)).is_none());
        assert!(grid.query_closest(&Point2::new(0.5, 0.5)).is_none());
    }

    #[test]
    fn test_degenerate_uvs_do_not_panic() {
        let p = Point2::new(0.3, 0.3);
        let grid: PartitionGrid = PartitionGrid::new(vec![[p, p, p]], 4.0, 1e-5);
        assert_eq!(grid.dimensions(), (1, 1));
        assert!(grid.query_containing(&p).is_none());
        let hit = grid.query_closest(&Point2::new(1.3, 0.3)).unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_mesh_requires_uvs() {
        use crate::mesh::{build_from_triangles, HalfEdgeMesh};
        use nalgebra::Point3;

        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
        let err = PartitionGrid::from_mesh_uv(&mesh, 4.0, 1e-5).unwrap_err();
        assert!(matches!(err, MeshError::MissingUvLayer));
    }
}
