// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Physical memory layouts.
//!
//! A [`MemoryLayout`] maps a logical tensor (its *active* extent) onto a
//! padded physical buffer. Per dimension it records:
//!
//! ```text
//!   |<- offset ->|<------ active ------>|<- offset ->|...|
//!   |<------------------------ stride ---------------->|
//! ```
//!
//! with the invariant `active + 2 * offset <= stride`. Buffers are row-major
//! over the strides, so the last dimension is the fastest-moving one.

use crate::{MemoryShape, TensorError};

/// Active size, stride and offset per dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MemoryLayout {
    active: MemoryShape,
    stride: MemoryShape,
    offset: MemoryShape,
}

impl MemoryLayout {
    /// Creates a layout, checking ranks and the padding invariant.
    pub fn new(
        active: MemoryShape,
        stride: MemoryShape,
        offset: MemoryShape,
    ) -> Result<Self, TensorError> {
        let layout = Self {
            active,
            stride,
            offset,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// A layout with no padding: stride equals the active extent.
    pub fn dense(active: MemoryShape) -> Self {
        let offset = MemoryShape::new(vec![0; active.num_dimensions()]);
        Self {
            stride: active.clone(),
            active,
            offset,
        }
    }

    /// A layout padded symmetrically by `padding[i]` in dimension `i`.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{MemoryLayout, MemoryShape};
    /// let l = MemoryLayout::padded(MemoryShape::tensor(5, 5, 1), &[1, 1, 0]);
    /// assert_eq!(l.stride().dims(), &[7, 7, 1]);
    /// assert_eq!(l.memory_size(), 49);
    /// ```
    pub fn padded(active: MemoryShape, padding: &[usize]) -> Self {
        let stride = active.padded(padding);
        let offset = (0..active.num_dimensions())
            .map(|i| padding.get(i).copied().unwrap_or(0))
            .collect::<Vec<_>>()
            .into();
        Self {
            active,
            stride,
            offset,
        }
    }

    /// Checks rank agreement and `active + 2 * offset <= stride`.
    pub fn validate(&self) -> Result<(), TensorError> {
        let rank = self.active.num_dimensions();
        if self.stride.num_dimensions() != rank || self.offset.num_dimensions() != rank {
            return Err(TensorError::InvalidLayout(format!(
                "rank mismatch: active {}, stride {}, offset {}",
                self.active, self.stride, self.offset
            )));
        }
        for dim in 0..rank {
            if self.active[dim] + 2 * self.offset[dim] > self.stride[dim] {
                return Err(TensorError::InvalidLayout(format!(
                    "dimension {dim}: active {} + 2 * offset {} exceeds stride {}",
                    self.active[dim], self.offset[dim], self.stride[dim]
                )));
            }
        }
        Ok(())
    }

    pub fn num_dimensions(&self) -> usize {
        self.active.num_dimensions()
    }

    pub fn active_size(&self) -> &MemoryShape {
        &self.active
    }

    pub fn stride(&self) -> &MemoryShape {
        &self.stride
    }

    pub fn offset(&self) -> &MemoryShape {
        &self.offset
    }

    /// Active extent of dimension `dim`.
    pub fn active_dim(&self, dim: usize) -> usize {
        self.active[dim]
    }

    pub fn stride_dim(&self, dim: usize) -> usize {
        self.stride[dim]
    }

    pub fn offset_dim(&self, dim: usize) -> usize {
        self.offset[dim]
    }

    /// Number of logical (active) elements.
    pub fn num_elements(&self) -> usize {
        self.active.num_elements()
    }

    /// Number of physical elements, padding included.
    pub fn memory_size(&self) -> usize {
        self.stride.num_elements()
    }

    /// Elements to skip in the physical buffer to advance one step along
    /// each dimension.
    pub fn cumulative_increments(&self) -> Vec<usize> {
        let rank = self.num_dimensions();
        let mut increments = vec![1usize; rank];
        for dim in (0..rank.saturating_sub(1)).rev() {
            increments[dim] = increments[dim + 1] * self.stride[dim + 1];
        }
        increments
    }

    /// Physical offset of the logical coordinate `coords` (padding applied).
    pub fn entry_offset(&self, coords: &[usize]) -> usize {
        debug_assert_eq!(coords.len(), self.num_dimensions());
        self.cumulative_increments()
            .iter()
            .zip(coords)
            .zip(self.offset.dims())
            .map(|((inc, c), off)| (c + off) * inc)
            .sum()
    }

    /// `true` when the layout carries no padding at all.
    pub fn is_contiguous(&self) -> bool {
        self.active == self.stride
    }

    /// `true` when dimension `dim` has no padding, so consecutive entries of
    /// the next-outer dimension are packed back to back.
    pub fn is_dimension_packed(&self, dim: usize) -> bool {
        self.active[dim] == self.stride[dim]
    }
}
