// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dense and structured `f64` matrices.
//!
//! Structured matrices only store their legal region: an upper-triangular
//! matrix keeps `n(n+1)/2` entries, a diagonal matrix keeps `n`. Reading
//! outside the legal region returns a structural zero; writing there is a
//! [`TensorError::ContractViolation`].

use crate::TensorError;
use std::fmt;

/// Storage order and sparsity structure of a [`Matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixStructure {
    ColumnMajor,
    RowMajor,
    ColumnSquare,
    RowSquare,
    RowSquareUpperTriangular,
    Diagonal,
}

impl MatrixStructure {
    /// Returns `true` for structures that require `rows == columns`.
    pub fn is_square(self) -> bool {
        !matches!(self, MatrixStructure::ColumnMajor | MatrixStructure::RowMajor)
    }

    fn storage_len(self, rows: usize, columns: usize) -> usize {
        match self {
            MatrixStructure::RowSquareUpperTriangular => rows * (rows + 1) / 2,
            MatrixStructure::Diagonal => rows,
            _ => rows * columns,
        }
    }
}

/// A matrix of `f64` with a fixed [`MatrixStructure`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Matrix {
    structure: MatrixStructure,
    rows: usize,
    columns: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a zero matrix.
    ///
    /// # Errors
    /// Returns [`TensorError::SizeMismatch`] if a square structure is given
    /// unequal dimensions.
    pub fn new(structure: MatrixStructure, rows: usize, columns: usize) -> Result<Self, TensorError> {
        if structure.is_square() && rows != columns {
            return Err(TensorError::SizeMismatch {
                op: "square matrix",
                expected: rows,
                actual: columns,
            });
        }
        Ok(Self {
            structure,
            rows,
            columns,
            data: vec![0.0; structure.storage_len(rows, columns)],
        })
    }

    /// Creates a `dimension × dimension` zero matrix.
    pub fn square(structure: MatrixStructure, dimension: usize) -> Self {
        Self {
            structure,
            rows: dimension,
            columns: dimension,
            data: vec![0.0; structure.storage_len(dimension, dimension)],
        }
    }

    /// Creates a row-major matrix from values given row by row.
    pub fn from_rows(rows: usize, columns: usize, values: &[f64]) -> Result<Self, TensorError> {
        if values.len() != rows * columns {
            return Err(TensorError::SizeMismatch {
                op: "from_rows",
                expected: rows * columns,
                actual: values.len(),
            });
        }
        Ok(Self {
            structure: MatrixStructure::RowMajor,
            rows,
            columns,
            data: values.to_vec(),
        })
    }

    pub fn structure(&self) -> MatrixStructure {
        self.structure
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns
    }

    /// Index into `data`, or `None` outside the legal region.
    fn storage_index(&self, i: usize, j: usize) -> Option<usize> {
        match self.structure {
            MatrixStructure::ColumnMajor | MatrixStructure::ColumnSquare => Some(j * self.rows + i),
            MatrixStructure::RowMajor | MatrixStructure::RowSquare => Some(i * self.columns + j),
            MatrixStructure::RowSquareUpperTriangular => {
                (i <= j).then(|| i * self.columns - (i + 1) * i / 2 + j)
            }
            MatrixStructure::Diagonal => (i == j).then_some(i),
        }
    }

    /// Reads element `(i, j)`; structural zeros read as `0.0`.
    ///
    /// `i < num_rows()` and `j < num_columns()` is a precondition, checked in
    /// debug builds only.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.rows && j < self.columns, "index ({i}, {j}) out of bounds");
        self.storage_index(i, j).map_or(0.0, |k| self.data[k])
    }

    /// Writes element `(i, j)`.
    ///
    /// # Errors
    /// Returns [`TensorError::ContractViolation`] when `(i, j)` lies outside
    /// the structure's legal region.
    pub fn set(&mut self, i: usize, j: usize, value: f64) -> Result<(), TensorError> {
        debug_assert!(i < self.rows && j < self.columns, "index ({i}, {j}) out of bounds");
        match self.storage_index(i, j) {
            Some(k) => {
                self.data[k] = value;
                Ok(())
            }
            None => Err(TensorError::ContractViolation(match self.structure {
                MatrixStructure::Diagonal => {
                    format!("cannot set off-diagonal element ({i}, {j}) of a diagonal matrix")
                }
                _ => format!(
                    "cannot set element ({i}, {j}) in the lower triangle of an upper triangular matrix"
                ),
            })),
        }
    }

    /// Zeroes every stored element.
    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(|x| *x = 0.0);
    }

    /// Dot product of row `i` with `x`.
    pub(crate) fn row_dot(&self, i: usize, x: &[f64]) -> f64 {
        (0..self.columns).map(|j| self.get(i, j) * x[j]).sum()
    }

    /// Dot product of column `j` with `x`.
    pub(crate) fn column_dot(&self, j: usize, x: &[f64]) -> f64 {
        (0..self.rows).map(|i| self.get(i, j) * x[i]).sum()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            for j in 0..self.columns {
                write!(f, "{}\t", self.get(i, j))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_and_column_major_agree() {
        let mut r = Matrix::new(MatrixStructure::RowMajor, 2, 3).unwrap();
        let mut c = Matrix::new(MatrixStructure::ColumnMajor, 2, 3).unwrap();
        for i in 0..2 {
            for j in 0..3 {
                let v = (i * 3 + j) as f64;
                r.set(i, j, v).unwrap();
                c.set(i, j, v).unwrap();
            }
        }
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(r.get(i, j), c.get(i, j));
            }
        }
    }

    #[test]
    fn test_square_requires_equal_dims() {
        assert!(Matrix::new(MatrixStructure::RowSquare, 2, 3).is_err());
        assert!(Matrix::new(MatrixStructure::RowSquare, 3, 3).is_ok());
    }

    #[test]
    fn test_upper_triangular_guard() {
        let mut m = Matrix::square(MatrixStructure::RowSquareUpperTriangular, 3);
        m.set(0, 2, 4.0).unwrap();
        m.set(2, 2, 9.0).unwrap();
        assert!(matches!(
            m.set(1, 0, 1.0),
            Err(TensorError::ContractViolation(_))
        ));
        assert_eq!(m.get(1, 0), 0.0);
        assert_eq!(m.get(0, 2), 4.0);
        assert_eq!(m.get(2, 2), 9.0);
    }

    #[test]
    fn test_upper_triangular_packing_is_distinct() {
        let mut m = Matrix::square(MatrixStructure::RowSquareUpperTriangular, 3);
        let mut v = 1.0;
        for i in 0..3 {
            for j in i..3 {
                m.set(i, j, v).unwrap();
                v += 1.0;
            }
        }
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(1, 1), 4.0);
        assert_eq!(m.get(1, 2), 5.0);
        assert_eq!(m.get(2, 2), 6.0);
    }

    #[test]
    fn test_diagonal_guard() {
        let mut m = Matrix::square(MatrixStructure::Diagonal, 3);
        m.set(1, 1, 2.0).unwrap();
        assert!(matches!(
            m.set(0, 1, 5.0),
            Err(TensorError::ContractViolation(_))
        ));
        assert_eq!(m.get(0, 1), 0.0);
        assert_eq!(m.get(1, 1), 2.0);
    }

    #[test]
    fn test_reset() {
        let mut m = Matrix::from_rows(1, 2, &[3.0, 4.0]).unwrap();
        m.reset();
        assert_eq!(m.get(0, 1), 0.0);
    }

    #[test]
    fn test_display() {
        let m = Matrix::from_rows(1, 2, &[1.0, 2.0]).unwrap();
        assert_eq!(format!("{m}"), "1\t2\t\n");
    }
}
