// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Node variants.
//!
//! | Node | Capabilities | Output |
//! |---|---|---|
//! | [`InputNode`] | compute, copy, archive | caller-bound values |
//! | [`ConstantNode`] | compute, copy, archive | fixed values |
//! | [`ConcatenationNode`] | compute, copy, archive | gathered elements |
//! | [`BinaryOperationNode`] | compute, copy, archive | element-wise arithmetic |
//! | [`OutputNode`] | compute, copy, archive | pass-through graph output |
//! | [`SourceNode`] | compute, copy, archive | externally fed samples |
//! | [`SinkNode`] | compute, copy, archive | pass-through side-effect endpoint |
//! | [`DebugSinkNode`] | compute, copy, archive | pass-through debug tap |
//! | [`ConvolutionNode`] | refine, copy, archive | declarative convolution |
//! | [`ConvolutionComputeNode`] | compile, copy, archive | lowered convolution |

mod binary_operation;
mod concatenation;
mod constant;
mod convolution;
mod input;
mod output;
mod sink;
mod source;

pub use binary_operation::{BinaryOperation, BinaryOperationNode};
pub use concatenation::ConcatenationNode;
pub use constant::ConstantNode;
pub use convolution::{ConvolutionComputeNode, ConvolutionNode};
pub use input::InputNode;
pub use output::OutputNode;
pub use sink::{DebugSinkNode, SinkNode};
pub use source::SourceNode;

use crate::ModelError;
use tensor_core::{Buffer, ElementType, MemoryLayout, MemoryShape};

/// Dense one-dimensional layout of `size` elements.
pub(crate) fn vector_layout(size: usize) -> MemoryLayout {
    MemoryLayout::dense(MemoryShape::vector(size))
}

/// Checks that `values` matches the declared type and element count.
pub(crate) fn check_values(
    context: &str,
    values: &Buffer,
    element_type: ElementType,
    len: usize,
) -> Result<(), ModelError> {
    if values.element_type() != element_type {
        return Err(ModelError::TypeMismatch {
            context: context.to_string(),
            expected: element_type,
            actual: values.element_type(),
        });
    }
    if values.len() != len {
        return Err(ModelError::ContractViolation(format!(
            "{context}: expected {len} values, got {}",
            values.len()
        )));
    }
    Ok(())
}
