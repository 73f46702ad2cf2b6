// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Dead-node elimination.

use super::Transformation;
use crate::{Model, ModelError, ModelTransformer, Node, PortElements, Submodel, TransformContext};

/// Sink nodes are recognised by type name, not by graph position.
pub fn is_sink_node(node: &Node) -> bool {
    node.type_name().starts_with("SinkNode")
}

pub fn is_debug_sink_node(node: &Node) -> bool {
    node.type_name().starts_with("DebugSinkNode")
}

/// Keeps the dependency closure of the submodel's frontier plus every sink
/// node; everything else is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneTransformation;

impl Transformation for PruneTransformation {
    fn name(&self) -> &str {
        "prune"
    }

    fn transform(
        &self,
        submodel: &Submodel<'_>,
        transformer: &mut ModelTransformer,
        context: &TransformContext,
    ) -> Result<Model, ModelError> {
        let model = submodel.model();
        let mut frontier = submodel.outputs().to_vec();
        for node in model.sink_nodes() {
            for port in node.output_ports() {
                frontier.push(PortElements::full(node.id(), port.name, port.size()));
            }
        }
        let pruned = transformer.copy_submodel(&Submodel::with_outputs(model, frontier), context)?;
        tracing::debug!(before = model.len(), after = pruned.len(), "prune");
        Ok(pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{ConstantNode, DebugSinkNode, InputNode, OutputNode, SinkNode};
    use crate::{NodeId, DEFAULT_OUTPUT_PORT};
    use tensor_core::{Buffer, ElementType};

    /// input -> output, plus an unused constant and a sink hanging off the input.
    fn model_with_dead_node() -> (Model, PortElements, NodeId) {
        let mut model = Model::new();
        let input = model.add_node(InputNode::vector(ElementType::Float32, 2)).unwrap();
        let input_elements = model.full_output(input, DEFAULT_OUTPUT_PORT).unwrap();
        model
            .add_node(ConstantNode::new(Buffer::Float32(vec![1.0])))
            .unwrap();
        let out = model
            .add_node(OutputNode::new(ElementType::Float32, input_elements.clone()))
            .unwrap();
        let sink = model
            .add_node(SinkNode::new(ElementType::Float32, input_elements, "on_sample"))
            .unwrap();
        (model, model_full(out), sink)
    }

    fn model_full(id: NodeId) -> PortElements {
        PortElements::full(id, DEFAULT_OUTPUT_PORT, 2)
    }

    fn prune(model: &Model, outputs: Vec<PortElements>) -> (Model, ModelTransformer) {
        let mut t = ModelTransformer::new();
        let pruned = PruneTransformation
            .transform(
                &Submodel::with_outputs(model, outputs),
                &mut t,
                &TransformContext::new(),
            )
            .unwrap();
        (pruned, t)
    }

    #[test]
    fn test_prune_drops_unreachable_and_keeps_sinks() {
        let (model, out, sink) = model_with_dead_node();
        let (pruned, t) = prune(&model, vec![out.clone()]);
        assert_eq!(pruned.len(), 3);
        assert!(pruned.nodes_by_type::<ConstantNode>().is_empty());
        assert!(t.corresponding_node(sink).is_some());
        assert!(pruned.is_full_port_output(&t.corresponding_outputs(&out).unwrap()));
    }

    #[test]
    fn test_prune_is_idempotent() {
        let (model, out, _) = model_with_dead_node();
        let (once, t1) = prune(&model, vec![out.clone()]);
        let out1 = t1.corresponding_outputs(&out).unwrap();
        let (twice, _) = prune(&once, vec![out1]);

        let names = |m: &Model| -> Vec<String> { m.nodes().map(|n| n.type_name()).collect() };
        assert_eq!(names(&once), names(&twice));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sink_predicates() {
        let mut model = Model::new();
        let input = model.add_node(InputNode::vector(ElementType::Int32, 1)).unwrap();
        let e = model.full_output(input, DEFAULT_OUTPUT_PORT).unwrap();
        let sink = model.add_node(SinkNode::new(ElementType::Int32, e.clone(), "")).unwrap();
        let debug = model.add_node(DebugSinkNode::new(ElementType::Int32, e, "tap")).unwrap();

        let sink = model.node(sink).unwrap();
        let debug = model.node(debug).unwrap();
        assert!(is_sink_node(sink));
        assert!(!is_sink_node(debug));
        assert!(is_debug_sink_node(debug));
        assert!(!is_debug_sink_node(sink));
    }
}
