// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for matrix-vector products and loss evaluation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tensor_core::{gemv, LogLoss, Loss, Matrix, MatrixStructure};

fn bench_gemv(c: &mut Criterion) {
    let n = 256;
    let mut a = Matrix::new(MatrixStructure::RowMajor, n, n).unwrap();
    for i in 0..n {
        for j in 0..n {
            a.set(i, j, ((i * 7 + j) % 13) as f64).unwrap();
        }
    }
    let x = vec![1.0; n];
    let mut y = vec![0.0; n];
    c.bench_function("gemv_256_alpha1_beta0", |b| {
        b.iter(|| gemv(&a, black_box(&x), &mut y, 1.0, 0.0).unwrap())
    });
    c.bench_function("gemv_256_general", |b| {
        b.iter(|| gemv(&a, black_box(&x), &mut y, 2.5, 0.5).unwrap())
    });
}

fn bench_log_loss(c: &mut Criterion) {
    let loss = LogLoss::new(1.0);
    c.bench_function("log_loss_evaluate", |b| {
        b.iter(|| loss.evaluate(black_box(0.3), black_box(-1.0)))
    });
}

criterion_group!(benches, bench_gemv, bench_log_loss);
criterion_main!(benches);
