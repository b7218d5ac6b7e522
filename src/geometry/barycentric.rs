//! Barycentric coordinates and point/triangle location.

use nalgebra::{Point, Point2, Point3, Vector2, Vector3};

/// Barycentric weights `(u, v, w)` of a point relative to triangle `(a, b, c)`.
///
/// `u` weighs corner `a`, `v` corner `b` and `w` corner `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barycentric {
    /// Weight of corner 0.
    pub u: f64,
    /// Weight of corner 1.
    pub v: f64,
    /// Weight of corner 2.
    pub w: f64,
}

impl Barycentric {
    /// Create weights from raw components.
    #[inline]
    pub const fn new(u: f64, v: f64, w: f64) -> Self {
        Self { u, v, w }
    }

    /// Weights selecting a single corner.
    #[inline]
    pub fn corner(index: usize) -> Self {
        match index {
            0 => Self::new(1.0, 0.0, 0.0),
            1 => Self::new(0.0, 1.0, 0.0),
            _ => Self::new(0.0, 0.0, 1.0),
        }
    }

    /// Weights as an array.
    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.u, self.v, self.w]
    }

    /// Sum of the weights.
    #[inline]
    pub fn sum(&self) -> f64 {
        self.u + self.v + self.w
    }

    /// Whether every weight lies in `[-bias, 1 + bias]`.
    #[inline]
    pub fn is_inside(&self, bias: f64) -> bool {
        self.to_array()
            .iter()
            .all(|&x| x >= -bias && x <= 1.0 + bias)
    }

    /// Clamp every weight to `[0, 1]` and renormalise so they sum to 1.
    ///
    /// Falls back to the centroid if every weight clamps to zero.
    pub fn clamped(&self) -> Self {
        let [u, v, w] = self.to_array().map(clamp01);
        let sum = u + v + w;
        if sum <= f64::EPSILON {
            return Self::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);
        }
        Self::new(u / sum, v / sum, w / sum)
    }

    /// Weighted combination of three points.
    #[inline]
    pub fn interpolate_point(&self, [a, b, c]: &[Point3<f64>; 3]) -> Point3<f64> {
        Point3::from(a.coords * self.u + b.coords * self.v + c.coords * self.w)
    }

    /// Weighted combination of three vectors.
    #[inline]
    pub fn interpolate_vector(&self, [a, b, c]: &[Vector3<f64>; 3]) -> Vector3<f64> {
        a * self.u + b * self.v + c * self.w
    }

    /// Weighted combination of three UV coordinates.
    #[inline]
    pub fn interpolate_uv(&self, [a, b, c]: &[Point2<f64>; 3]) -> Point2<f64> {
        Point2::from(a.coords * self.u + b.coords * self.v + c.coords * self.w)
    }
}

/// Clamp a value to `[0, 1]`.
#[inline]
pub fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Barycentric weights of `p` relative to `(a, b, c)`, if `p` lies inside.
///
/// Works in 2D and 3D; in 3D `p` is first projected onto the triangle's
/// plane. Every weight must lie in `[-bias, 1 + bias]`. Degenerate
/// (zero-area) triangles never contain anything.
pub fn point_in_triangle<const D: usize>(
    p: &Point<f64, D>,
    a: &Point<f64, D>,
    b: &Point<f64, D>,
    c: &Point<f64, D>,
    bias: f64,
) -> Option<Barycentric> {
    let weights = barycentric(p, a, b, c)?;
    weights.is_inside(bias).then_some(weights)
}

/// Unconstrained barycentric weights of `p` relative to `(a, b, c)`.
///
/// Returns `None` for degenerate triangles.
pub fn barycentric<const D: usize>(
    p: &Point<f64, D>,
    a: &Point<f64, D>,
    b: &Point<f64, D>,
    c: &Point<f64, D>,
) -> Option<Barycentric> {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;

    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);

    let denom = d00 * d11 - d01 * d01;
    // Relative test: denom = |v0|²|v1|² sin²θ.
    if !(denom > f64::EPSILON * d00 * d11) {
        return None;
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    Some(Barycentric::new(1.0 - v - w, v, w))
}

/// Which part of a triangle a closest point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleFeature {
    /// Strictly inside the triangle.
    Interior,
    /// On edge `k`, running from corner `k` to corner `k + 1`.
    Edge(usize),
    /// At a corner.
    Vertex(usize),
}

impl TriangleFeature {
    /// Edge index, if the feature is an edge.
    pub fn edge(self) -> Option<usize> {
        match self {
            TriangleFeature::Edge(k) => Some(k),
            _ => None,
        }
    }
}

/// Result of [`closest_point_in_triangle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    /// Closest point on the triangle.
    pub point: Point2<f64>,
    /// Weights of `point`, each in `[0, 1]` and summing to 1.
    pub weights: Barycentric,
    /// Feature the point lies on.
    pub feature: TriangleFeature,
}

/// Closest point on a 2D triangle to `p`.
///
/// Classifies `p` by the Voronoi regions of the triangle's corners and edges
/// (Ericson, *Real-Time Collision Detection* 5.1.5). Degenerate triangles are
/// treated as their three edges.
pub fn closest_point_in_triangle(
    p: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    c: &Point2<f64>,
) -> ClosestPoint {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return at_vertex(*a, 0);
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return at_vertex(*b, 1);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let t = d1 / (d1 - d3);
        return on_edge(a + ab * t, Barycentric::new(1.0 - t, t, 0.0), 0);
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return at_vertex(*c, 2);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let t = d2 / (d2 - d6);
        return on_edge(a + ac * t, Barycentric::new(1.0 - t, 0.0, t), 2);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && d4 - d3 >= 0.0 && d5 - d6 >= 0.0 {
        let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return on_edge(b + (c - b) * t, Barycentric::new(0.0, 1.0 - t, t), 1);
    }

    let total = va + vb + vc;
    if !(total > 0.0) {
        return closest_on_edges(p, [a, b, c]);
    }
    let v = vb / total;
    let w = vc / total;
    ClosestPoint {
        point: a + ab * v + ac * w,
        weights: Barycentric::new(1.0 - v - w, v, w).clamped(),
        feature: TriangleFeature::Interior,
    }
}

fn at_vertex(point: Point2<f64>, k: usize) -> ClosestPoint {
    ClosestPoint {
        point,
        weights: Barycentric::corner(k),
        feature: TriangleFeature::Vertex(k),
    }
}

fn on_edge(point: Point2<f64>, weights: Barycentric, k: usize) -> ClosestPoint {
    ClosestPoint {
        point,
        weights: weights.clamped(),
        feature: TriangleFeature::Edge(k),
    }
}

fn closest_on_edges(p: &Point2<f64>, corners: [&Point2<f64>; 3]) -> ClosestPoint {
    let mut best: Option<(f64, ClosestPoint)> = None;
    for k in 0..3 {
        let (s0, s1) = (corners[k], corners[(k + 1) % 3]);
        let d: Vector2<f64> = s1 - s0;
        let len2 = d.norm_squared();
        let t = if len2 > 0.0 {
            clamp01((p - s0).dot(&d) / len2)
        } else {
            0.0
        };
        let mut weights = [0.0; 3];
        weights[k] = 1.0 - t;
        weights[(k + 1) % 3] += t;
        let candidate = on_edge(
            s0 + d * t,
            Barycentric::new(weights[0], weights[1], weights[2]),
            k,
        );
        let dist = (candidate.point - p).norm_squared();
        if best.as_ref().map_or(true, |(b, _)| dist < *b) {
            best = Some((dist, candidate));
        }
    }
    match best {
        Some((_, closest)) => closest,
        None => at_vertex(*corners[0], 0),
    }
}
