// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for layouts, buffers and matrix operations.

use crate::ElementType;

/// Errors that can occur in tensor-level operations.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// The caller asked for something the structure forbids, e.g. writing
    /// into the lower triangle of an upper-triangular matrix.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// A vector or buffer had the wrong number of elements.
    #[error("size mismatch in {op}: expected {expected} elements, got {actual}")]
    SizeMismatch {
        op: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A memory layout does not satisfy `active + 2 * offset <= stride`.
    #[error("invalid memory layout: {0}")]
    InvalidLayout(String),

    /// A buffer holds a different element type than requested.
    #[error("type mismatch in {op}: expected {expected}, got {actual}")]
    TypeMismatch {
        op: &'static str,
        expected: ElementType,
        actual: ElementType,
    },

    /// A sub-range reaches past the end of a buffer.
    #[error("range [{offset}, {offset}+{length}) out of bounds for buffer of {len} elements")]
    OutOfRange {
        offset: usize,
        length: usize,
        len: usize,
    },
}
