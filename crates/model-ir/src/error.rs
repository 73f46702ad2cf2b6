// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for graph construction, transformation and evaluation.

use crate::Capability;
use tensor_core::ElementType;

/// Errors that can occur when building, transforming or evaluating a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The caller broke an API contract (e.g. a non-full-port output, a
    /// convolution whose weights do not match its layouts).
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// A node id, port name or index does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// The node does not provide the requested capability.
    #[error("{node} does not support {capability}")]
    Unsupported {
        node: String,
        capability: Capability,
    },

    /// The graph is cyclic or references nodes outside the model.
    #[error("invalid model graph: {0}")]
    InvalidGraph(String),

    /// A port was wired to a port of a different element type.
    #[error("type mismatch in {context}: expected {expected}, got {actual}")]
    TypeMismatch {
        context: String,
        expected: ElementType,
        actual: ElementType,
    },

    #[error(transparent)]
    Tensor(#[from] tensor_core::TensorError),

    #[error(transparent)]
    Emit(#[from] emitter::EmitError),
}
