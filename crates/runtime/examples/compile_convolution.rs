// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Example: Compile a small convolutional map and compare kernel choices.
//!
//! Builds a map with a standard and a depthwise convolution, compiles it
//! under a few configurations, checks that every configuration computes the
//! same result, and prints the emitted C source of the last one.
//!
//! ```bash
//! cargo run -p runtime --example compile_convolution
//! ```

use model_ir::nodes::{ConvolutionNode, InputNode, OutputNode};
use model_ir::{Model, DEFAULT_OUTPUT_PORT};
use runtime::{CompilerConfig, Map, MapCompiler};
use tensor_core::{Buffer, ElementType, MemoryLayout, MemoryShape};

const SIZE: usize = 16;
const CHANNELS: usize = 4;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing.
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let map = build_map()?;
    println!("{}\n", map.summary());

    let input = sample_input();
    let configs = [
        ("fast path, parallel", true, true),
        ("per column, parallel", false, true),
        ("per column, serial", false, false),
    ];

    println!(
        "{:<24} {:>8} {:>10} {:>12} {:>12}",
        "Config", "Passes", "Routines", "Compile ms", "Checksum",
    );
    println!("{}", "-".repeat(70));

    let mut reference: Option<Vec<f32>> = None;
    let mut last = None;
    for (label, fast, parallel) in configs {
        let config = CompilerConfig {
            contiguous_fast_path: fast,
            parallel,
            function_prefix: "demo".into(),
            ..Default::default()
        };
        let mut compiled = MapCompiler::new(config).compile(&map)?;
        let output = compiled.compute::<f32>(&[input.clone()])?.remove(0);
        let checksum: f32 = output.iter().sum();

        let report = compiled.report();
        println!(
            "{:<24} {:>8} {:>10} {:>12.3} {:>12.4}",
            label,
            report.refine_passes,
            report.routines,
            report.elapsed.as_secs_f64() * 1000.0,
            checksum,
        );

        match &reference {
            None => reference = Some(output),
            Some(expected) => {
                let max_diff = expected
                    .iter()
                    .zip(&output)
                    .map(|(a, b)| (a - b).abs())
                    .fold(0.0f32, f32::max);
                assert!(max_diff < 1e-3, "{label} differs by {max_diff}");
            }
        }
        last = Some(compiled);
    }

    if let Some(compiled) = last {
        println!("\n{}", compiled.c_source()?);
    }
    Ok(())
}

/// input -> 3x3 standard convolution -> 3x3 depthwise convolution -> output.
fn build_map() -> Result<Map, Box<dyn std::error::Error>> {
    let padded = MemoryLayout::padded(MemoryShape::tensor(SIZE, SIZE, CHANNELS), &[1, 1, 0]);
    let dense = MemoryLayout::dense(MemoryShape::tensor(SIZE, SIZE, CHANNELS));

    let mut model = Model::new();
    let x = model.add_node(InputNode::vector(ElementType::Float32, padded.memory_size()))?;

    let standard = weights(CHANNELS * 9 * CHANNELS, 0.05);
    let conv = model.add_node(ConvolutionNode::new(
        model.full_output(x, DEFAULT_OUTPUT_PORT)?,
        padded.clone(),
        padded.clone(),
        standard,
        3,
        1,
    )?)?;

    let depthwise = weights(CHANNELS * 9, 0.1);
    let dw = model.add_node(ConvolutionNode::new(
        model.full_output(conv, DEFAULT_OUTPUT_PORT)?,
        padded,
        dense,
        depthwise,
        3,
        1,
    )?)?;

    let out = model.add_node(OutputNode::new(
        ElementType::Float32,
        model.full_output(dw, DEFAULT_OUTPUT_PORT)?,
    ))?;
    let out = model.full_output(out, DEFAULT_OUTPUT_PORT)?;

    Ok(Map::from_model(
        model,
        vec![("image".into(), x)],
        vec![("features".into(), out)],
    )?)
}

fn weights(len: usize, scale: f32) -> Buffer {
    Buffer::Float32((0..len).map(|i| ((i % 5) as f32 - 2.0) * scale).collect())
}

/// Padded image with a zero border and a gradient interior.
fn sample_input() -> Buffer {
    let stride = SIZE + 2;
    let mut values = vec![0.0f32; stride * stride * CHANNELS];
    for r in 0..SIZE {
        for c in 0..SIZE {
            for ch in 0..CHANNELS {
                values[((r + 1) * stride + (c + 1)) * CHANNELS + ch] =
                    (r + c) as f32 / SIZE as f32 - ch as f32 * 0.1;
            }
        }
    }
    Buffer::Float32(values)
}
