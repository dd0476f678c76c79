//! Element-level math for the 2-DOF-per-node beam formulation
//!
//! DOF order per element is [v1, th1, v2, th2] with deflection positive
//! downward and rotations in the matching sense, so downward loads and
//! sagging moments come out positive everywhere downstream.

use nalgebra::{DMatrix, DVector, SMatrix, SVector};

pub mod sparse;

pub type Mat = DMatrix<f64>;
pub type ColVec = DVector<f64>;

/// 4x4 element stiffness matrix
pub type Mat4 = SMatrix<f64, 4, 4>;
/// 4-element vector of end forces / equivalent loads
pub type Vec4 = SVector<f64, 4>;

/// Euler-Bernoulli stiffness matrix for a prismatic beam element
///
/// # Arguments
/// * `e` - Modulus of elasticity (kN/m²)
/// * `i` - Moment of inertia (m⁴)
/// * `length` - Element length (m)
pub fn beam_local_stiffness(e: f64, i: f64, length: f64) -> Mat4 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ei_l3 = e * i / l3;
    let ei_l2 = e * i / l2;
    let ei_l = e * i / l;

    #[rustfmt::skip]
    let data = [
        12.0 * ei_l3,   6.0 * ei_l2,  -12.0 * ei_l3,   6.0 * ei_l2,
         6.0 * ei_l2,   4.0 * ei_l,    -6.0 * ei_l2,   2.0 * ei_l,
       -12.0 * ei_l3,  -6.0 * ei_l2,   12.0 * ei_l3,  -6.0 * ei_l2,
         6.0 * ei_l2,   2.0 * ei_l,    -6.0 * ei_l2,   4.0 * ei_l,
    ];

    Mat4::from_row_slice(&data)
}

/// Hermite shape functions evaluated at x (element-local, m)
fn shapes(x: f64, l: f64) -> [f64; 4] {
    let xi = x / l;
    let xi2 = xi * xi;
    let xi3 = xi2 * xi;
    [
        1.0 - 3.0 * xi2 + 2.0 * xi3,
        l * (xi - 2.0 * xi2 + xi3),
        3.0 * xi2 - 2.0 * xi3,
        l * (xi3 - xi2),
    ]
}

/// First derivatives of the Hermite shape functions at x
fn shape_slopes(x: f64, l: f64) -> [f64; 4] {
    let xi = x / l;
    let xi2 = xi * xi;
    [
        6.0 * (xi2 - xi) / l,
        1.0 - 4.0 * xi + 3.0 * xi2,
        6.0 * (xi - xi2) / l,
        3.0 * xi2 - 2.0 * xi,
    ]
}

/// Antiderivatives of the shape functions, for segment loads
fn shape_integrals(x: f64, l: f64) -> [f64; 4] {
    let l2 = l * l;
    let l3 = l2 * l;
    let x2 = x * x;
    let x3 = x2 * x;
    let x4 = x3 * x;
    [
        x - x3 / l2 + x4 / (2.0 * l3),
        x2 / 2.0 - 2.0 * x3 / (3.0 * l) + x4 / (4.0 * l2),
        x3 / l2 - x4 / (2.0 * l3),
        x4 / (4.0 * l2) - x3 / (3.0 * l),
    ]
}

/// Consistent nodal loads for a uniform load w over [start, end]
///
/// Returns the equivalent load vector to ADD to the global load vector.
/// Full-span loads reproduce the classical [wL/2, wL²/12, wL/2, -wL²/12].
///
/// # Arguments
/// * `w` - Intensity (kN/m), downward positive
/// * `start`, `end` - Loaded segment (m from the left node)
/// * `length` - Element length (m)
pub fn consistent_uniform_load(w: f64, start: f64, end: f64, length: f64) -> Vec4 {
    let p0 = shape_integrals(start, length);
    let p1 = shape_integrals(end, length);
    Vec4::new(
        w * (p1[0] - p0[0]),
        w * (p1[1] - p0[1]),
        w * (p1[2] - p0[2]),
        w * (p1[3] - p0[3]),
    )
}

/// Consistent nodal loads for a point load p at position a
pub fn consistent_point_load(p: f64, a: f64, length: f64) -> Vec4 {
    let n = shapes(a, length);
    Vec4::new(p * n[0], p * n[1], p * n[2], p * n[3])
}

/// Consistent nodal loads for a concentrated moment m at position a
pub fn consistent_moment_load(m: f64, a: f64, length: f64) -> Vec4 {
    let dn = shape_slopes(a, length);
    Vec4::new(m * dn[0], m * dn[1], m * dn[2], m * dn[3])
}

/// Solve a dense linear system using LU decomposition
pub fn solve_dense(a: &Mat, b: &ColVec) -> Option<ColVec> {
    a.clone().lu().solve(b)
}

/// Solve a dense symmetric positive definite system via Cholesky
pub fn solve_cholesky(a: &Mat, b: &ColVec) -> Option<ColVec> {
    a.clone().cholesky().map(|chol| chol.solve(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stiffness_symmetry() {
        let k = beam_local_stiffness(23.8e6, 8e-4, 5.0);
        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(k[(i, j)], k[(j, i)], epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_stiffness_terms() {
        let e = 1.0;
        let i = 1.0;
        let l = 2.0;
        let k = beam_local_stiffness(e, i, l);
        assert_relative_eq!(k[(0, 0)], 12.0 / 8.0);
        assert_relative_eq!(k[(1, 1)], 4.0 / 2.0);
        assert_relative_eq!(k[(0, 1)], 6.0 / 4.0);
        assert_relative_eq!(k[(1, 3)], 2.0 / 2.0);
    }

    #[test]
    fn test_full_span_uniform_load() {
        let w = 10.0;
        let l = 4.0;
        let f = consistent_uniform_load(w, 0.0, l, l);
        assert_relative_eq!(f[0], w * l / 2.0, epsilon = 1e-12);
        assert_relative_eq!(f[1], w * l * l / 12.0, epsilon = 1e-12);
        assert_relative_eq!(f[2], w * l / 2.0, epsilon = 1e-12);
        assert_relative_eq!(f[3], -w * l * l / 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_segment_loads_compose() {
        // [0, a] plus [a, L] must equal the full-span vector
        let w = 7.0;
        let l = 6.0;
        let a = 2.3;
        let left = consistent_uniform_load(w, 0.0, a, l);
        let right = consistent_uniform_load(w, a, l, l);
        let full = consistent_uniform_load(w, 0.0, l, l);
        for i in 0..4 {
            assert_relative_eq!(left[i] + right[i], full[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_segment_load_preserves_total_force() {
        // N1 + N3 = 1, so the translational components carry the resultant
        let w = 12.0;
        let l = 5.0;
        let f = consistent_uniform_load(w, 1.0, 3.5, l);
        assert_relative_eq!(f[0] + f[2], w * 2.5, epsilon = 1e-10);
    }

    #[test]
    fn test_midspan_point_load() {
        let p = 20.0;
        let l = 6.0;
        let f = consistent_point_load(p, l / 2.0, l);
        assert_relative_eq!(f[0], p / 2.0, epsilon = 1e-12);
        assert_relative_eq!(f[1], p * l / 8.0, epsilon = 1e-12);
        assert_relative_eq!(f[2], p / 2.0, epsilon = 1e-12);
        assert_relative_eq!(f[3], -p * l / 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_point_load_general_position() {
        let p = 10.0;
        let l = 5.0;
        let a = 1.5;
        let b = l - a;
        let f = consistent_point_load(p, a, l);
        assert_relative_eq!(f[0], p * b * b * (3.0 * a + b) / l.powi(3), epsilon = 1e-10);
        assert_relative_eq!(f[1], p * a * b * b / (l * l), epsilon = 1e-10);
        assert_relative_eq!(f[3], -p * a * a * b / (l * l), epsilon = 1e-10);
    }

    #[test]
    fn test_moment_at_node_maps_to_rotation_dof() {
        let m = 15.0;
        let l = 4.0;
        let f0 = consistent_moment_load(m, 0.0, l);
        assert_relative_eq!(f0[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(f0[1], m, epsilon = 1e-12);
        assert_relative_eq!(f0[2], 0.0, epsilon = 1e-12);

        let fl = consistent_moment_load(m, l, l);
        assert_relative_eq!(fl[3], m, epsilon = 1e-12);
        assert_relative_eq!(fl[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dense_solve() {
        let a = Mat::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let b = ColVec::from_vec(vec![1.0, 2.0]);
        let x = solve_dense(&a, &b).unwrap();
        assert_relative_eq!(4.0 * x[0] + x[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[0] + 3.0 * x[1], 2.0, epsilon = 1e-12);
    }
}
