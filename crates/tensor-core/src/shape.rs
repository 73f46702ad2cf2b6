// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Logical tensor extents.

use std::fmt;

/// Per-dimension extents of a tensor, outermost dimension first.
///
/// Convolution layouts are 3-D `[rows, columns, channels]`; vectors are 1-D.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct MemoryShape {
    dims: Vec<usize>,
}

impl MemoryShape {
    /// # Examples
    /// ```
    /// use tensor_core::MemoryShape;
    /// let s = MemoryShape::new(vec![5, 5, 2]);
    /// assert_eq!(s.num_dimensions(), 3);
    /// assert_eq!(s.num_elements(), 50);
    /// ```
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    /// A 1-D shape of `len` elements.
    pub fn vector(len: usize) -> Self {
        Self { dims: vec![len] }
    }

    /// A `[rows, columns, channels]` shape.
    pub fn tensor(rows: usize, columns: usize, channels: usize) -> Self {
        Self {
            dims: vec![rows, columns, channels],
        }
    }

    pub fn num_dimensions(&self) -> usize {
        self.dims.len()
    }

    /// Product of all extents; `1` for a zero-dimensional shape.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Extent of dimension `index`, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<usize> {
        self.dims.get(index).copied()
    }

    /// Grows each dimension by `2 * padding[i]`.
    ///
    /// Missing padding entries count as zero.
    pub fn padded(&self, padding: &[usize]) -> MemoryShape {
        let dims = self
            .dims
            .iter()
            .enumerate()
            .map(|(i, &d)| d + 2 * padding.get(i).copied().unwrap_or(0))
            .collect();
        MemoryShape { dims }
    }
}

impl std::ops::Index<usize> for MemoryShape {
    type Output = usize;

    fn index(&self, index: usize) -> &usize {
        &self.dims[index]
    }
}

impl fmt::Display for MemoryShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(|d| d.to_string()).collect();
        write!(f, "[{}]", dims.join(", "))
    }
}

impl From<Vec<usize>> for MemoryShape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl From<&[usize]> for MemoryShape {
    fn from(dims: &[usize]) -> Self {
        Self::new(dims.to_vec())
    }
}
