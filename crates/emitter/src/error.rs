// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for routine emission and execution.

use tensor_core::ElementType;

/// Errors that can occur while emitting or running a routine.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// The caller violated a precondition of the loop nest, e.g. row padding
    /// that is not `filter_size / 2` or a buffer smaller than its layout.
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// Routines are only emitted for floating-point element types.
    #[error("unsupported element type for emission: {0}")]
    UnsupportedType(ElementType),
}
