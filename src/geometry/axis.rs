//! Orientation bases for laying a mesh onto a surface seen from a camera.
//!
//! Both functions pick which mesh axes span the "visible" footprint of a
//! mesh. Ties are always broken in axis order X, Y, Z, and the third axis is
//! the cross product of the first two, so results are repeatable.

use nalgebra::{Matrix3, Vector3};

#[inline]
fn sign(x: f64) -> f64 {
    if x >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Signed axis permutation that lines a rotation up with the camera axes.
///
/// `m` holds the mesh axes in camera space as columns. The two mesh axes
/// least aligned with the view axis (camera Z) become the new X and Y: of
/// those, the one pointing more along camera X becomes X. Each is signed to
/// point along the positive camera axis it replaces. Row 2 is `row0 × row1`,
/// so the result is a proper rotation.
///
/// Applied to mesh-local coordinates, the returned matrix reorders them so
/// the mesh lies flat in the camera's XY plane.
pub fn axis_align_rotation_matrix(m: &Matrix3<f64>) -> Matrix3<f64> {
    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| {
        m[(2, a)]
            .abs()
            .total_cmp(&m[(2, b)].abs())
            .then(a.cmp(&b))
    });

    let (first, second) = (order[0], order[1]);
    let (first_x, second_x) = (m[(0, first)].abs(), m[(0, second)].abs());
    let (x_axis, y_axis) = if second_x > first_x {
        (second, first)
    } else if second_x == first_x {
        (first.min(second), first.max(second))
    } else {
        (first, second)
    };

    let mut row0 = Vector3::<f64>::zeros();
    row0[x_axis] = sign(m[(0, x_axis)]);
    let mut row1 = Vector3::<f64>::zeros();
    row1[y_axis] = sign(m[(1, y_axis)]);
    let row2 = row0.cross(&row1);

    Matrix3::from_rows(&[row0.transpose(), row1.transpose(), row2.transpose()])
}

/// Mesh axes standing in for X and Y when the mesh's own Z is kept up.
///
/// Whichever mesh axis faces the camera most (largest `|dot|` with camera Z)
/// is swapped out of the XY pair:
/// - X faces the camera: X is replaced by the mesh Z, signed toward the camera.
/// - Y faces the camera: Y is replaced by the mesh Z, signed likewise.
/// - Z faces the camera: X is flipped when Z points toward the camera.
///
/// Column 2 is always `mesh_x × mesh_y`.
pub fn z_up_find_axis(mesh_axes: &Matrix3<f64>, camera_axes: &Matrix3<f64>) -> Matrix3<f64> {
    let view = camera_axes.column(2);
    let x_dot = mesh_axes.column(0).dot(&view);
    let y_dot = mesh_axes.column(1).dot(&view);
    let z_dot = mesh_axes.column(2).dot(&view);

    let mesh_x: Vector3<f64> = mesh_axes.column(0).into_owned();
    let mesh_y: Vector3<f64> = mesh_axes.column(1).into_owned();
    let mesh_z: Vector3<f64> = mesh_axes.column(2).into_owned();

    let (col0, col1) = if x_dot.abs() > y_dot.abs().max(z_dot.abs()) {
        (mesh_z * sign(x_dot), mesh_y)
    } else if y_dot.abs() > z_dot.abs() {
        (mesh_x, mesh_z * sign(y_dot))
    } else {
        (mesh_x * -sign(z_dot), mesh_y)
    };

    Matrix3::from_columns(&[col0, col1, mesh_x.cross(&mesh_y)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Rotation3;
    use std::f64::consts::FRAC_PI_2;

    fn is_signed_permutation(p: &Matrix3<f64>) -> bool {
        let rows_ok = p.row_iter().all(|r| r.iter().filter(|x| x.abs() == 1.0).count() == 1);
        let cols_ok = p.column_iter().all(|c| c.iter().filter(|x| x.abs() == 1.0).count() == 1);
        rows_ok && cols_ok && (p.determinant() - 1.0).abs() < 1e-12
    }

    #[test]
    fn test_axis_align_identity() {
        let p = axis_align_rotation_matrix(&Matrix3::identity());
        assert_eq!(p, Matrix3::identity());
    }

    #[test]
    fn test_axis_align_lying_mesh() {
        // Mesh rotated 90° about camera X: mesh Y now points at the camera.
        let m = *Rotation3::from_axis_angle(&Vector3::x_axis(), FRAC_PI_2).matrix();
        let p = axis_align_rotation_matrix(&m);
        assert!(is_signed_permutation(&p));

        // Aligned mesh axes land on camera X and Y.
        let aligned = m * p.transpose();
        assert!((aligned.column(0) - Vector3::x()).norm() < 1e-12);
        assert!((aligned.column(1) - Vector3::y()).norm() < 1e-12);
    }

    #[test]
    fn test_axis_align_is_deterministic() {
        let m = *Rotation3::from_euler_angles(0.3, -1.1, 2.0).matrix();
        let p = axis_align_rotation_matrix(&m);
        assert!(is_signed_permutation(&p));
        assert_eq!(p, axis_align_rotation_matrix(&m));
    }

    #[test]
    fn test_z_up_facing_camera() {
        // Camera looks down -Z, its Z axis is world +Z; mesh Z faces it.
        let axes = z_up_find_axis(&Matrix3::identity(), &Matrix3::identity());
        assert_eq!(axes.column(0).into_owned(), -Vector3::x());
        assert_eq!(axes.column(1).into_owned(), Vector3::y());
        assert_eq!(axes.column(2).into_owned(), Vector3::z());
    }

    #[test]
    fn test_z_up_x_facing_camera() {
        let camera = Matrix3::from_columns(&[Vector3::y(), Vector3::z(), Vector3::x()]);
        let axes = z_up_find_axis(&Matrix3::identity(), &camera);
        assert_eq!(axes.column(0).into_owned(), Vector3::z());
        assert_eq!(axes.column(1).into_owned(), Vector3::y());
    }
}
