// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Lowering a [`Map`] to emitted routines.
//!
//! ```text
//! Map ──rename callbacks──▶ refine ──▶ prune ──▶ emit one routine per
//!                                               compilable node
//!                                                   │
//!                                                   ▼
//!                                              CompiledMap
//! ```
//!
//! A [`CompiledMap`] evaluates like a [`Map`], except that every node that
//! only supports compilation is executed through its emitted
//! [`ConvolutionRoutine`].

use crate::{CompilerConfig, Map, RuntimeError};
use emitter::{ConvolutionRoutine, EmitError};
use model_ir::{Capability, ComputeContext, ModelError, Node, NodeId, TransformContext};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tensor_core::{Buffer, Element, ElementType};

/// Counts and timings of one compilation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CompileReport {
    /// Nodes in the map before refinement.
    pub nodes_before: usize,
    /// Nodes after refinement (and the prune that follows it).
    pub nodes_after_refine: usize,
    /// Nodes in the final model.
    pub nodes_after_prune: usize,
    /// Refinement passes performed.
    pub refine_passes: usize,
    /// Emitted routines.
    pub routines: usize,
    /// Wall-clock time spent compiling.
    pub elapsed: Duration,
}

impl CompileReport {
    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Compile: {:.2}ms, {} -> {} -> {} nodes, {} refine passes, {} routines",
            self.elapsed.as_secs_f64() * 1000.0,
            self.nodes_before,
            self.nodes_after_refine,
            self.nodes_after_prune,
            self.refine_passes,
            self.routines,
        )
    }
}

/// Turns maps into [`CompiledMap`]s using one [`CompilerConfig`].
#[derive(Debug, Clone, Default)]
pub struct MapCompiler {
    config: CompilerConfig,
}

impl MapCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        tracing::info!(
            "compiler created: refine budget {}, fast path {}, parallel {}",
            config.max_refine_iterations,
            config.contiguous_fast_path,
            config.parallel
        );
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles a copy of `map`; `map` itself is not modified.
    ///
    /// Steps:
    /// 1. Assign the configured callback names.
    /// 2. Refine with the configured budget.
    /// 3. Prune.
    /// 4. Emit a routine for every node with [`Capability::Compile`].
    pub fn compile(&self, map: &Map) -> Result<CompiledMap, RuntimeError> {
        self.config.validate()?;
        let start = Instant::now();

        let mut map = map.try_clone()?;
        map.rename_callbacks(
            &self.config.source_callback_name,
            &self.config.sink_callback_name,
        );
        let nodes_before = map.model().len();
        let refine_passes = map.refine(&TransformContext::new(), self.config.max_refine_iterations)?;
        let nodes_after_refine = map.model().len();
        map.prune()?;

        let options = self.config.emit_options();
        let mut routines = BTreeMap::new();
        for node in map.model().nodes() {
            if !node.supports(Capability::Compile) {
                continue;
            }
            let compilable = node.compilable()?;
            let routine = compilable.emit_routine(options)?;
            let name = format!("{}_{}", self.config.function_prefix, node.id().index());
            tracing::debug!("emitted {name} for {node}: {:?} kernel", routine.kernel());
            routines.insert(
                node.id(),
                CompiledRoutine {
                    name,
                    element_type: compilable.element_type(),
                    routine,
                },
            );
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.resolve_threads())
            .build()
            .map_err(|e| RuntimeError::ConfigError(format!("cannot build thread pool: {e}")))?;

        let report = CompileReport {
            nodes_before,
            nodes_after_refine,
            nodes_after_prune: map.model().len(),
            refine_passes,
            routines: routines.len(),
            elapsed: start.elapsed(),
        };
        tracing::info!("{}", report.summary());

        Ok(CompiledMap {
            map,
            routines,
            report,
            pool,
        })
    }
}

#[derive(Debug)]
struct CompiledRoutine {
    name: String,
    element_type: ElementType,
    routine: ConvolutionRoutine,
}

impl CompiledRoutine {
    /// Runs the routine on the node's gathered inputs.
    fn run(&self, node: &Node, context: &ComputeContext<'_>) -> Result<Buffer, ModelError> {
        let [input, weights] = node.compilable()?.routine_inputs();
        let input = context.gather(input, self.element_type)?;
        let weights = context.gather(weights, self.element_type)?;
        let output_len = self.routine.params().output_layout.memory_size();

        let output = match (&input, &weights) {
            (Buffer::Float32(input), Buffer::Float32(weights)) => {
                let mut output = vec![0.0f32; output_len];
                self.routine.execute(input, weights, &mut output)?;
                Buffer::Float32(output)
            }
            (Buffer::Float64(input), Buffer::Float64(weights)) => {
                let mut output = vec![0.0f64; output_len];
                self.routine.execute(input, weights, &mut output)?;
                Buffer::Float64(output)
            }
            _ => return Err(EmitError::UnsupportedType(self.element_type).into()),
        };
        Ok(output)
    }
}

/// A refined, pruned map plus the routines emitted for it.
#[derive(Debug)]
pub struct CompiledMap {
    map: Map,
    routines: BTreeMap<NodeId, CompiledRoutine>,
    report: CompileReport,
    pool: rayon::ThreadPool,
}

impl CompiledMap {
    /// The refined map this was compiled from.
    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn report(&self) -> &CompileReport {
        &self.report
    }

    pub fn routine_count(&self) -> usize {
        self.routines.len()
    }

    /// Names of the emitted functions, in node order.
    pub fn routine_names(&self) -> Vec<&str> {
        self.routines.values().map(|r| r.name.as_str()).collect()
    }

    pub fn set_input(&mut self, index: usize, values: Buffer) -> Result<(), RuntimeError> {
        self.map.set_input(index, values)
    }

    pub fn set_source_values(&mut self, index: usize, values: Buffer) -> Result<(), RuntimeError> {
        self.map.set_source_values(index, values)
    }

    /// Evaluates output `index`, running emitted routines for compiled nodes.
    pub fn compute_output(&self, index: usize) -> Result<Buffer, RuntimeError> {
        self.pool.install(|| {
            self.map.compute_output_with(index, |node, context| {
                match self.routines.get(&node.id()) {
                    Some(compiled) => compiled.run(node, context).map(|output| Some(vec![output])),
                    None => Ok(None),
                }
            })
        })
    }

    /// Binds `inputs` positionally and returns every output as `T`.
    pub fn compute<T: Element>(&mut self, inputs: &[Buffer]) -> Result<Vec<Vec<T>>, RuntimeError> {
        if inputs.len() != self.map.num_inputs() {
            return Err(RuntimeError::ContractViolation(format!(
                "map has {} inputs, got {} values",
                self.map.num_inputs(),
                inputs.len()
            )));
        }
        for (index, values) in inputs.iter().enumerate() {
            self.map.set_input(index, values.clone())?;
        }
        (0..self.map.num_outputs())
            .map(|i| self.compute_output(i).map(|b| b.to_vec::<T>()))
            .collect()
    }

    /// C source for every emitted routine, in node order.
    pub fn c_source(&self) -> Result<String, RuntimeError> {
        let mut module = String::new();
        for compiled in self.routines.values() {
            let source = compiled
                .routine
                .to_c_source(&compiled.name, compiled.element_type)
                .map_err(ModelError::from)?;
            module.push_str(&source);
            module.push('\n');
        }
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_ir::nodes::{ConvolutionNode, InputNode, OutputNode};
    use model_ir::{Model, DEFAULT_OUTPUT_PORT};
    use tensor_core::{MemoryLayout, MemoryShape};

    /// One 3x3 averaging-like filter over a padded 4x4 single-channel input.
    fn conv_map(element_type: ElementType) -> Map {
        let input_layout = MemoryLayout::padded(MemoryShape::tensor(4, 4, 1), &[1, 1, 0]);
        let output_layout = MemoryLayout::dense(MemoryShape::tensor(4, 4, 1));
        let mut model = Model::new();
        let x = model
            .add_node(InputNode::vector(element_type, input_layout.memory_size()))
            .unwrap();
        let weights = Buffer::from_f64(element_type, &[1.0; 9]);
        let conv = ConvolutionNode::new(
            model.full_output(x, DEFAULT_OUTPUT_PORT).unwrap(),
            input_layout,
            output_layout,
            weights,
            3,
            1,
        )
        .unwrap();
        let conv = model.add_node(conv).unwrap();
        let ce = model.full_output(conv, DEFAULT_OUTPUT_PORT).unwrap();
        let out = model.add_node(OutputNode::new(element_type, ce)).unwrap();
        let out = model.full_output(out, DEFAULT_OUTPUT_PORT).unwrap();
        Map::from_model(model, vec![("x".into(), x)], vec![("y".into(), out)]).unwrap()
    }

    /// 6x6 padded buffer whose 4x4 interior is all ones.
    fn padded_ones() -> Vec<f64> {
        let mut values = vec![0.0; 36];
        for r in 1..5 {
            for c in 1..5 {
                values[r * 6 + c] = 1.0;
            }
        }
        values
    }

    #[test]
    fn test_compile_report() {
        let map = conv_map(ElementType::Float64);
        let compiled = MapCompiler::default().compile(&map).unwrap();
        let report = compiled.report();
        assert_eq!(report.nodes_before, 3);
        assert_eq!(report.nodes_after_refine, 4);
        assert_eq!(report.nodes_after_prune, 4);
        assert_eq!(report.refine_passes, 2);
        assert_eq!(report.routines, 1);
        assert!(report.summary().contains("1 routines"));
        assert_eq!(compiled.routine_count(), 1);

        // The source map is untouched.
        assert_eq!(map.model().len(), 3);
    }

    #[test]
    fn test_compiled_compute_counts_window() {
        let mut compiled = MapCompiler::default()
            .compile(&conv_map(ElementType::Float64))
            .unwrap();
        let y = compiled
            .compute::<f64>(&[Buffer::Float64(padded_ones())])
            .unwrap();
        // Corners see 4 ones, edges 6, the interior 9.
        let expected = [
            4.0, 6.0, 6.0, 4.0, //
            6.0, 9.0, 9.0, 6.0, //
            6.0, 9.0, 9.0, 6.0, //
            4.0, 6.0, 6.0, 4.0,
        ];
        assert_eq!(y[0].len(), 16);
        for (a, b) in y[0].iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "{a} vs {b}");
        }
    }

    #[test]
    fn test_fast_path_and_serial_agree() {
        let input = Buffer::Float32(padded_ones().iter().map(|&v| v as f32 * 0.5).collect());
        let mut results = Vec::new();
        for (fast, parallel) in [(true, true), (false, false)] {
            let config = CompilerConfig {
                contiguous_fast_path: fast,
                parallel,
                num_threads: Some(2),
                ..Default::default()
            };
            let mut compiled = MapCompiler::new(config)
                .compile(&conv_map(ElementType::Float32))
                .unwrap();
            results.push(compiled.compute::<f32>(&[input.clone()]).unwrap());
        }
        for (a, b) in results[0][0].iter().zip(&results[1][0]) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_zero_budget_leaves_convolution_uncompiled() {
        let config = CompilerConfig {
            max_refine_iterations: 0,
            ..Default::default()
        };
        let compiled = MapCompiler::new(config)
            .compile(&conv_map(ElementType::Float64))
            .unwrap();
        assert_eq!(compiled.routine_count(), 0);
        assert_eq!(compiled.report().refine_passes, 0);
        let err = compiled.compute_output(0).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Unsupported);
    }

    #[test]
    fn test_c_source_names() {
        let config = CompilerConfig {
            function_prefix: "net".into(),
            ..Default::default()
        };
        let compiled = MapCompiler::new(config)
            .compile(&conv_map(ElementType::Float32))
            .unwrap();
        let names = compiled.routine_names();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("net_"));

        let source = compiled.c_source().unwrap();
        assert!(source.contains(names[0]));
        assert!(source.contains("float"));
        assert!(source.contains("#pragma omp parallel for"));
    }
}
