//! Sparse assembly path for many-span models
//!
//! A continuous beam's reduced stiffness matrix is block-tridiagonal (2 DOFs
//! per node, coupling only to neighbor nodes), so CSR storage plus a
//! preconditioned conjugate gradient solve scales to models with hundreds of
//! spans without the dense O(n³) cost.

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::math::Mat4;

/// Incremental COO assembler, converted to CSR for the solve
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    pub fn new(size: usize) -> Self {
        // Beam connectivity: at most 8 couplings per DOF row
        Self {
            size,
            entries: Vec::with_capacity(size * 8),
        }
    }

    /// Accumulate a value; duplicates sum on conversion
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value.abs() > 1e-15 {
            self.entries.push((row, col, value));
        }
    }

    /// Scatter a 4x4 element matrix through a DOF map.
    ///
    /// `dofs[i]` is the reduced-system index of element DOF `i`, or `None`
    /// when that DOF is restrained and drops out of the free set.
    pub fn add_element_matrix(&mut self, dofs: &[Option<usize>; 4], k_elem: &Mat4) {
        for (i, di) in dofs.iter().enumerate() {
            let Some(row) = di else { continue };
            for (j, dj) in dofs.iter().enumerate() {
                if let Some(col) = dj {
                    self.add(*row, *col, k_elem[(i, j)]);
                }
            }
        }
    }

    /// Convert to CSR, summing duplicate entries
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);
        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }
        CsrMatrix::from(&coo)
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Jacobi-preconditioned conjugate gradient for the SPD reduced system.
///
/// Returns `None` when the iteration cap is hit before the residual drops
/// below `tol * |b|`.
pub fn solve_pcg(
    csr: &CsrMatrix<f64>,
    b: &DVector<f64>,
    tol: f64,
    max_iter: usize,
) -> Option<DVector<f64>> {
    let n = csr.nrows();
    let b_norm = b.norm();
    if b_norm < 1e-300 {
        return Some(DVector::zeros(n));
    }
    let target = tol * b_norm;

    let mut diag = DVector::from_element(n, 1.0);
    for (row, col, &val) in csr.triplet_iter() {
        if row == col && val.abs() > 1e-15 {
            diag[row] = val;
        }
    }

    let mut x = DVector::zeros(n);
    let mut r = b.clone();
    let mut z = r.component_div(&diag);
    let mut p = z.clone();
    let mut r_dot_z = r.dot(&z);

    for _ in 0..max_iter {
        let ap = sparse_matvec(csr, &p);
        let p_dot_ap = p.dot(&ap);
        if p_dot_ap.abs() < 1e-300 {
            return None;
        }

        let alpha = r_dot_z / p_dot_ap;
        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &ap, 1.0);

        if r.norm() < target {
            return Some(x);
        }

        z = r.component_div(&diag);
        let r_dot_z_new = r.dot(&z);
        let beta = r_dot_z_new / r_dot_z;
        r_dot_z = r_dot_z_new;
        p = &z + beta * &p;
    }

    None
}

#[inline]
fn sparse_matvec(csr: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let n = csr.nrows();
    let mut y = DVector::zeros(n);

    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    for row in 0..n {
        let mut sum = 0.0;
        for idx in row_offsets[row]..row_offsets[row + 1] {
            sum += values[idx] * x[col_indices[idx]];
        }
        y[row] = sum;
    }

    y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::beam_local_stiffness;
    use approx::assert_relative_eq;

    #[test]
    fn test_duplicate_entries_accumulate() {
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add(0, 0, 1.5);
        builder.add(0, 0, 2.5);
        builder.add(1, 1, 1.0);
        let csr = builder.to_csr();
        let dense = nalgebra_sparse::convert::serial::convert_csr_dense(&csr);
        assert_relative_eq!(dense[(0, 0)], 4.0);
    }

    #[test]
    fn test_element_scatter_skips_restrained_dofs() {
        let k = beam_local_stiffness(1.0, 1.0, 1.0);
        let mut builder = SparseMatrixBuilder::new(2);
        // v1 and v2 restrained; th1 -> 0, th2 -> 1
        builder.add_element_matrix(&[None, Some(0), None, Some(1)], &k);
        let dense = nalgebra_sparse::convert::serial::convert_csr_dense(&builder.to_csr());
        assert_relative_eq!(dense[(0, 0)], 4.0);
        assert_relative_eq!(dense[(0, 1)], 2.0);
        assert_relative_eq!(dense[(1, 1)], 4.0);
    }

    #[test]
    fn test_pcg_matches_direct_solve() {
        // Two-element clamped-clamped beam, interior node free
        let k = beam_local_stiffness(200.0, 0.5, 2.0);
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add_element_matrix(&[None, None, Some(0), Some(1)], &k);
        builder.add_element_matrix(&[Some(0), Some(1), None, None], &k);
        let csr = builder.to_csr();

        let b = DVector::from_vec(vec![10.0, 0.0]);
        let x = solve_pcg(&csr, &b, 1e-12, 100).unwrap();

        let dense = nalgebra_sparse::convert::serial::convert_csr_dense(&csr);
        let x_direct = dense.lu().solve(&b).unwrap();
        assert_relative_eq!(x[0], x_direct[0], max_relative = 1e-8);
        assert_relative_eq!(x[1], x_direct[1], max_relative = 1e-8);
    }

    #[test]
    fn test_pcg_iteration_cap() {
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add(0, 0, 1.0);
        builder.add(1, 1, 1e9);
        builder.add(0, 1, 0.5);
        builder.add(1, 0, 0.5);
        let csr = builder.to_csr();
        let b = DVector::from_vec(vec![1.0, 1.0]);
        assert!(solve_pcg(&csr, &b, 1e-14, 1).is_none());
    }
}
