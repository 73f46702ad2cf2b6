// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Convolution loop nests over padded, row-major `rows × columns × channels`
//! buffers.
//!
//! Weight layout is `f × k × k × d` for the standard kernels and `f × k × k`
//! for the depthwise kernel. The input must carry `k / 2` rows of padding so
//! that output row `r` reads physical input rows `r·s .. r·s + k`.

use crate::EmitError;
use num_traits::Float;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tensor_core::MemoryLayout;

/// Loop-nest parameters handed over by a convolution compute node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvolutionParameters {
    pub input_layout: MemoryLayout,
    pub output_layout: MemoryLayout,
    /// Side of the square filter window.
    pub filter_size: usize,
    pub stride: usize,
    /// One filter per input channel, no cross-channel summation.
    pub depthwise: bool,
}

impl ConvolutionParameters {
    /// Number of filters, i.e. output channels.
    pub fn num_filters(&self) -> usize {
        self.output_layout.active_dim(2)
    }

    /// Number of active input channels.
    pub fn input_depth(&self) -> usize {
        self.input_layout.active_dim(2)
    }

    /// Number of weights the routine expects.
    pub fn weights_len(&self) -> usize {
        let window = self.num_filters() * self.filter_size * self.filter_size;
        if self.depthwise {
            window
        } else {
            window * self.input_depth()
        }
    }

    /// Checks the loop-nest preconditions listed on [`ConvolutionRoutine::emit`].
    pub fn validate(&self) -> Result<(), EmitError> {
        validate(self)
    }
}

/// Code-generation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOptions {
    /// Allow [`ConvolutionKernel::CombinedRows`] when the layout permits it.
    pub contiguous_fast_path: bool,
    /// Run (or annotate) the filter loop as parallel.
    pub parallel: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            contiguous_fast_path: true,
            parallel: true,
        }
    }
}

/// The inner-loop specialisation chosen at emission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvolutionKernel {
    /// A whole window row (`k · depth` elements) is contiguous in memory and
    /// is accumulated with a single dot product.
    CombinedRows,
    /// One `depth`-element dot product per window cell.
    PerColumn,
    /// Each filter convolves only its own input channel.
    Depthwise,
}

/// An emitted convolution: validated parameters plus precomputed strides.
#[derive(Debug, Clone)]
pub struct ConvolutionRoutine {
    params: ConvolutionParameters,
    options: EmitOptions,
    kernel: ConvolutionKernel,
    input_increments: Vec<usize>,
    output_increments: Vec<usize>,
}

impl ConvolutionRoutine {
    /// Validates `params` and selects a kernel.
    ///
    /// # Errors
    /// Returns [`EmitError::ContractViolation`] if
    /// - either layout is not rank 3 or is internally inconsistent,
    /// - `filter_size` or `stride` is zero,
    /// - the input row padding is not `filter_size / 2`,
    /// - a depthwise routine has a filter count different from the input
    ///   channel count,
    /// - the output extent would read past the padded input buffer.
    pub fn emit(params: ConvolutionParameters, options: EmitOptions) -> Result<Self, EmitError> {
        params.validate()?;

        let kernel = if params.depthwise {
            ConvolutionKernel::Depthwise
        } else if options.contiguous_fast_path
            && params.stride == 1
            && params.input_layout.is_dimension_packed(2)
        {
            ConvolutionKernel::CombinedRows
        } else {
            ConvolutionKernel::PerColumn
        };

        tracing::debug!(
            ?kernel,
            filters = params.num_filters(),
            filter_size = params.filter_size,
            stride = params.stride,
            "emitted convolution routine"
        );

        Ok(Self {
            input_increments: params.input_layout.cumulative_increments(),
            output_increments: params.output_layout.cumulative_increments(),
            params,
            options,
            kernel,
        })
    }

    pub fn params(&self) -> &ConvolutionParameters {
        &self.params
    }

    pub fn options(&self) -> EmitOptions {
        self.options
    }

    pub fn kernel(&self) -> ConvolutionKernel {
        self.kernel
    }

    pub fn weights_len(&self) -> usize {
        self.params.weights_len()
    }

    pub(crate) fn input_increments(&self) -> &[usize] {
        &self.input_increments
    }

    pub(crate) fn output_increments(&self) -> &[usize] {
        &self.output_increments
    }

    /// Runs the loop nest.
    ///
    /// `input` and `output` are physical buffers of at least
    /// `memory_size()` elements for their layouts; `weights` holds exactly
    /// [`weights_len`](Self::weights_len) values. Only the active region of
    /// `output` is written.
    ///
    /// # Errors
    /// Returns [`EmitError::ContractViolation`] if a buffer is too small.
    pub fn execute<T>(&self, input: &[T], weights: &[T], output: &mut [T]) -> Result<(), EmitError>
    where
        T: Float + Send + Sync,
    {
        check_buffer("input", input.len(), self.params.input_layout.memory_size())?;
        check_buffer("output", output.len(), self.params.output_layout.memory_size())?;
        if weights.len() != self.weights_len() {
            return Err(EmitError::ContractViolation(format!(
                "expected {} filter weights, got {}",
                self.weights_len(),
                weights.len()
            )));
        }

        let num_filters = self.params.num_filters();
        let planes: Vec<Vec<T>> = if self.options.parallel {
            (0..num_filters)
                .into_par_iter()
                .map(|f| self.filter_plane(f, input, weights))
                .collect()
        } else {
            (0..num_filters)
                .map(|f| self.filter_plane(f, input, weights))
                .collect()
        };

        let layout = &self.params.output_layout;
        let columns = layout.active_dim(1);
        let inc = &self.output_increments;
        for (f, plane) in planes.iter().enumerate() {
            for (i, value) in plane.iter().enumerate() {
                let (r, c) = (i / columns, i % columns);
                let index = (r + layout.offset_dim(0)) * inc[0]
                    + (c + layout.offset_dim(1)) * inc[1]
                    + (f + layout.offset_dim(2)) * inc[2];
                output[index] = *value;
            }
        }
        Ok(())
    }

    /// Output values of filter `f`, row-major over the active output region.
    fn filter_plane<T: Float>(&self, f: usize, input: &[T], weights: &[T]) -> Vec<T> {
        let rows = self.params.output_layout.active_dim(0);
        let columns = self.params.output_layout.active_dim(1);
        let mut plane = Vec::with_capacity(rows * columns);
        for r in 0..rows {
            for c in 0..columns {
                plane.push(self.window(f, r, c, input, weights));
            }
        }
        plane
    }

    fn window<T: Float>(&self, f: usize, r: usize, c: usize, input: &[T], weights: &[T]) -> T {
        let k = self.params.filter_size;
        let s = self.params.stride;
        let depth = self.params.input_depth();
        let channel_start = self.params.input_layout.offset_dim(2);
        let (row_inc, col_inc) = (self.input_increments[0], self.input_increments[1]);

        let mut acc = T::zero();
        match self.kernel {
            ConvolutionKernel::CombinedRows => {
                let span = k * depth;
                for wr in 0..k {
                    let start = (r * s + wr) * row_inc + c * s * col_inc;
                    let w = f * k * span + wr * span;
                    acc = acc + dot(&input[start..start + span], &weights[w..w + span]);
                }
            }
            ConvolutionKernel::PerColumn => {
                for wr in 0..k {
                    for wc in 0..k {
                        let start = (r * s + wr) * row_inc + (c * s + wc) * col_inc + channel_start;
                        let w = f * k * k * depth + (wr * k + wc) * depth;
                        acc = acc + dot(&input[start..start + depth], &weights[w..w + depth]);
                    }
                }
            }
            ConvolutionKernel::Depthwise => {
                for wr in 0..k {
                    for wc in 0..k {
                        let i = (r * s + wr) * row_inc + (c * s + wc) * col_inc + channel_start + f;
                        acc = acc + input[i] * weights[f * k * k + wr * k + wc];
                    }
                }
            }
        }
        acc
    }
}

fn dot<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter().zip(b).fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}

fn check_buffer(name: &str, len: usize, required: usize) -> Result<(), EmitError> {
    if len < required {
        return Err(EmitError::ContractViolation(format!(
            "{name} buffer holds {len} elements, layout requires {required}"
        )));
    }
    Ok(())
}

fn validate(params: &ConvolutionParameters) -> Result<(), EmitError> {
    for (name, layout) in [("input", &params.input_layout), ("output", &params.output_layout)] {
        if layout.num_dimensions() != 3 {
            return Err(EmitError::ContractViolation(format!(
                "{name} layout must be rows x columns x channels, got {} dimensions",
                layout.num_dimensions()
            )));
        }
        layout
            .validate()
            .map_err(|e| EmitError::ContractViolation(format!("{name} layout: {e}")))?;
    }
    if params.filter_size == 0 || params.stride == 0 {
        return Err(EmitError::ContractViolation(format!(
            "filter size ({}) and stride ({}) must be positive",
            params.filter_size, params.stride
        )));
    }

    let input = &params.input_layout;
    let k = params.filter_size;
    if input.offset_dim(0) != k / 2 {
        return Err(EmitError::ContractViolation(format!(
            "input row padding must be filter_size / 2 = {}, got {}",
            k / 2,
            input.offset_dim(0)
        )));
    }
    if params.depthwise && params.num_filters() != params.input_depth() {
        return Err(EmitError::ContractViolation(format!(
            "depthwise convolution needs one filter per input channel: {} filters, {} channels",
            params.num_filters(),
            params.input_depth()
        )));
    }

    let output = &params.output_layout;
    for dim in 0..2 {
        let extent = output.active_dim(dim);
        if extent > 0 && (extent - 1) * params.stride + k > input.stride_dim(dim) {
            return Err(EmitError::ContractViolation(format!(
                "{extent} outputs along dimension {dim} read past the padded input extent {}",
                input.stride_dim(dim)
            )));
        }
    }
    Ok(())
}
