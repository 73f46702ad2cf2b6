// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scaled matrix-vector product: `y <- alpha * A * x + beta * y`.

use crate::{Matrix, TensorError};
use rayon::prelude::*;

/// How `alpha * dot + beta * y` collapses for the common scale factors.
#[derive(Debug, Clone, Copy)]
enum Scaling {
    Zero,
    One,
    Other(f64),
}

impl Scaling {
    fn of(value: f64) -> Self {
        if value == 0.0 {
            Scaling::Zero
        } else if value == 1.0 {
            Scaling::One
        } else {
            Scaling::Other(value)
        }
    }
}

/// Computes `y <- alpha * A * x + beta * y`.
///
/// `x` must have `A.num_columns()` elements and `y` must have
/// `A.num_rows()`. Rows are computed in parallel; each row only writes its
/// own `y[i]`.
///
/// # Errors
/// Returns [`TensorError::SizeMismatch`] if a vector has the wrong length.
pub fn gemv(a: &Matrix, x: &[f64], y: &mut [f64], alpha: f64, beta: f64) -> Result<(), TensorError> {
    check_len("gemv (x)", a.num_columns(), x.len())?;
    check_len("gemv (y)", a.num_rows(), y.len())?;
    apply(y, alpha, beta, |i| a.row_dot(i, x));
    Ok(())
}

/// Computes the transposed product `y <- alpha * x * A + beta * y`.
///
/// `x` must have `A.num_rows()` elements and `y` must have
/// `A.num_columns()`.
///
/// # Errors
/// Returns [`TensorError::SizeMismatch`] if a vector has the wrong length.
pub fn gevm(a: &Matrix, x: &[f64], y: &mut [f64], alpha: f64, beta: f64) -> Result<(), TensorError> {
    check_len("gevm (x)", a.num_rows(), x.len())?;
    check_len("gevm (y)", a.num_columns(), y.len())?;
    apply(y, alpha, beta, |j| a.column_dot(j, x));
    Ok(())
}

fn check_len(op: &'static str, expected: usize, actual: usize) -> Result<(), TensorError> {
    if expected != actual {
        return Err(TensorError::SizeMismatch {
            op,
            expected,
            actual,
        });
    }
    Ok(())
}

fn apply<F>(y: &mut [f64], alpha: f64, beta: f64, dot: F)
where
    F: Fn(usize) -> f64 + Sync,
{
    let iter = y.par_iter_mut().enumerate();
    match (Scaling::of(alpha), Scaling::of(beta)) {
        (Scaling::Zero, Scaling::Zero) => iter.for_each(|(_, yi)| *yi = 0.0),
        (Scaling::Zero, Scaling::One) => {}
        (Scaling::Zero, Scaling::Other(b)) => iter.for_each(|(_, yi)| *yi *= b),
        (Scaling::One, Scaling::Zero) => iter.for_each(|(i, yi)| *yi = dot(i)),
        (Scaling::One, Scaling::One) => iter.for_each(|(i, yi)| *yi += dot(i)),
        (Scaling::One, Scaling::Other(b)) => iter.for_each(|(i, yi)| *yi = dot(i) + *yi * b),
        (Scaling::Other(a), Scaling::Zero) => iter.for_each(|(i, yi)| *yi = dot(i) * a),
        (Scaling::Other(a), Scaling::One) => iter.for_each(|(i, yi)| *yi += dot(i) * a),
        (Scaling::Other(a), Scaling::Other(b)) => {
            iter.for_each(|(i, yi)| *yi = dot(i) * a + *yi * b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatrixStructure;

    fn approx_eq(a: &[f64], b: &[f64], tol: f64) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < tol)
    }

    fn dense_3x3() -> Matrix {
        Matrix::from_rows(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]).unwrap()
    }

    #[test]
    fn test_gemv_scaling_grid() {
        let a = dense_3x3();
        let x = [1.0, 2.0, 3.0];
        let y0 = [10.0, 20.0, 30.0];
        // A * x = [14, 32, 50]
        let ax = [14.0, 32.0, 50.0];

        for &alpha in &[0.0, 1.0, 2.5] {
            for &beta in &[0.0, 1.0, 2.5] {
                let mut y = y0;
                gemv(&a, &x, &mut y, alpha, beta).unwrap();
                let expected: Vec<f64> = (0..3).map(|i| alpha * ax[i] + beta * y0[i]).collect();
                assert!(
                    approx_eq(&y, &expected, 1e-12),
                    "alpha={alpha} beta={beta}: {y:?} vs {expected:?}"
                );
            }
        }
    }

    #[test]
    fn test_gevm_is_transposed_product() {
        let a = dense_3x3();
        let x = [1.0, 2.0, 3.0];
        let mut y = [0.0; 3];
        gevm(&a, &x, &mut y, 1.0, 0.0).unwrap();
        // x * A = [30, 36, 42]
        assert!(approx_eq(&y, &[30.0, 36.0, 42.0], 1e-12));
    }

    #[test]
    fn test_gemv_structured_matches_dense() {
        let mut tri = Matrix::square(MatrixStructure::RowSquareUpperTriangular, 3);
        let mut dense = Matrix::new(MatrixStructure::RowMajor, 3, 3).unwrap();
        for i in 0..3 {
            for j in i..3 {
                let v = (i + 2 * j) as f64;
                tri.set(i, j, v).unwrap();
                dense.set(i, j, v).unwrap();
            }
        }
        let x = [1.0, -1.0, 0.5];
        let mut y_tri = [1.0; 3];
        let mut y_dense = [1.0; 3];
        gemv(&tri, &x, &mut y_tri, 2.5, 2.5).unwrap();
        gemv(&dense, &x, &mut y_dense, 2.5, 2.5).unwrap();
        assert!(approx_eq(&y_tri, &y_dense, 1e-12));
    }

    #[test]
    fn test_gemv_size_mismatch() {
        let a = dense_3x3();
        let mut y = [0.0; 3];
        assert!(matches!(
            gemv(&a, &[1.0, 2.0], &mut y, 1.0, 0.0),
            Err(TensorError::SizeMismatch { .. })
        ));
    }
}
