// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the convolution kernels.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use emitter::{ConvolutionParameters, ConvolutionRoutine, EmitOptions};
use tensor_core::{MemoryLayout, MemoryShape};

fn params(channels: usize, filters: usize, depthwise: bool) -> ConvolutionParameters {
    ConvolutionParameters {
        input_layout: MemoryLayout::padded(MemoryShape::tensor(32, 32, channels), &[1, 1, 0]),
        output_layout: MemoryLayout::dense(MemoryShape::tensor(32, 32, filters)),
        filter_size: 3,
        stride: 1,
        depthwise,
    }
}

fn run(c: &mut Criterion, label: &str, params: ConvolutionParameters, options: EmitOptions) {
    let routine = ConvolutionRoutine::emit(params, options).unwrap();
    let input = vec![0.5f32; routine.params().input_layout.memory_size()];
    let weights = vec![0.25f32; routine.weights_len()];
    let mut output = vec![0.0f32; routine.params().output_layout.memory_size()];
    c.bench_function(label, |b| {
        b.iter(|| {
            routine
                .execute(black_box(&input), black_box(&weights), &mut output)
                .unwrap()
        })
    });
}

fn bench_convolution(c: &mut Criterion) {
    run(c, "conv_32x32x16_f16_combined_rows", params(16, 16, false), EmitOptions::default());
    run(
        c,
        "conv_32x32x16_f16_per_column",
        params(16, 16, false),
        EmitOptions {
            contiguous_fast_path: false,
            parallel: true,
        },
    );
    run(
        c,
        "conv_32x32x16_f16_sequential",
        params(16, 16, false),
        EmitOptions {
            contiguous_fast_path: true,
            parallel: false,
        },
    );
    run(c, "conv_32x32x16_depthwise", params(16, 16, true), EmitOptions::default());
}

criterion_group!(benches, bench_convolution);
criterion_main!(benches);
