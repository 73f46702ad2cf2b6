// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # emitter
//!
//! Lowers compilable model nodes into layout-aware loop nests.
//!
//! A [`ConvolutionRoutine`] is built from [`ConvolutionParameters`]: the
//! physical [`MemoryLayout`](tensor_core::MemoryLayout) of the input and
//! output buffers, a square `k × k` filter size, the stride, and whether the
//! convolution is depthwise-separable. Emission validates the layout
//! preconditions once and picks one of three kernels:
//!
//! | Kernel | When | Inner accumulation |
//! |---|---|---|
//! | [`ConvolutionKernel::CombinedRows`] | channels packed, stride 1 | one `k·depth` dot product per window row |
//! | [`ConvolutionKernel::PerColumn`] | otherwise | `k` dot products of `depth` elements per window row |
//! | [`ConvolutionKernel::Depthwise`] | one filter per input channel | `k × k` window of a single channel |
//!
//! The filter loop is the parallel dimension: every filter reads the shared
//! input and weights and writes its own output channel.
//!
//! A routine can be run directly ([`ConvolutionRoutine::execute`]) or
//! rendered as a C function ([`ConvolutionRoutine::to_c_source`]).
//!
//! # Example
//! ```
//! use emitter::{ConvolutionParameters, ConvolutionRoutine, EmitOptions};
//! use tensor_core::{MemoryLayout, MemoryShape};
//!
//! let params = ConvolutionParameters {
//!     input_layout: MemoryLayout::padded(MemoryShape::tensor(4, 4, 1), &[1, 1, 0]),
//!     output_layout: MemoryLayout::dense(MemoryShape::tensor(4, 4, 1)),
//!     filter_size: 3,
//!     stride: 1,
//!     depthwise: false,
//! };
//! let routine = ConvolutionRoutine::emit(params, EmitOptions::default()).unwrap();
//! let input = vec![1.0f32; routine.params().input_layout.memory_size()];
//! let weights = vec![1.0f32; routine.weights_len()];
//! let mut output = vec![0.0f32; routine.params().output_layout.memory_size()];
//! routine.execute(&input, &weights, &mut output).unwrap();
//! ```

mod c_source;
mod convolution;
mod error;

pub use convolution::{ConvolutionKernel, ConvolutionParameters, ConvolutionRoutine, EmitOptions};
pub use error::EmitError;
