// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model-to-model rewriting with identity remapping.
//!
//! A [`ModelTransformer`] never mutates its source. It builds a fresh
//! [`Model`] by visiting the source in dependency order and letting each
//! node copy or refine itself into the new model. Along the way it records
//! which new node each old node became and which new elements each old
//! output port maps to; holders of old ids (a `Map`'s inputs and outputs)
//! must translate them through [`corresponding_input_node`] and
//! [`corresponding_outputs`] once the pass is done.
//!
//! A transformer holds per-pass state and is not meant to be shared between
//! concurrent transformations.
//!
//! [`corresponding_input_node`]: ModelTransformer::corresponding_input_node
//! [`corresponding_outputs`]: ModelTransformer::corresponding_outputs

use crate::{Model, ModelError, Node, NodeId, NodeKind, PortElements, Submodel};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type CompilablePredicate = Arc<dyn Fn(&Node) -> bool + Send + Sync>;

/// Settings shared by the passes of one transformation.
#[derive(Clone, Default)]
pub struct TransformContext {
    compilable: Option<CompilablePredicate>,
}

impl TransformContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks nodes for which `predicate` holds as natively compilable;
    /// refinement copies them instead of decomposing them.
    pub fn with_compilable_predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Node) -> bool + Send + Sync + 'static,
    {
        Self {
            compilable: Some(Arc::new(predicate)),
        }
    }

    pub fn is_node_compilable(&self, node: &Node) -> bool {
        self.compilable.as_ref().is_some_and(|p| p(node))
    }
}

impl fmt::Debug for TransformContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformContext")
            .field("compilable_predicate", &self.compilable.is_some())
            .finish()
    }
}

/// Builds a new model from an old one and remembers the correspondence.
#[derive(Debug, Default)]
pub struct ModelTransformer {
    model: Model,
    node_map: HashMap<NodeId, NodeId>,
    output_map: HashMap<(NodeId, String), PortElements>,
    modified: bool,
    refine_passes: usize,
}

impl ModelTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&mut self) {
        self.model = Model::new();
        self.node_map.clear();
        self.output_map.clear();
        self.modified = false;
    }

    /// Runs `f` over the nodes of `order` and returns the finished model.
    fn transform_nodes<F>(&mut self, source: &Model, order: &[NodeId], mut f: F) -> Result<Model, ModelError>
    where
        F: FnMut(&Node, &mut ModelTransformer) -> Result<(), ModelError>,
    {
        self.begin();
        for id in order {
            f(source.node(*id)?, self)?;
        }
        let model = std::mem::take(&mut self.model);
        model.verify()?;
        Ok(model)
    }

    /// Applies an arbitrary per-node rewrite to every node of `model`.
    pub fn transform_model<F>(
        &mut self,
        model: &Model,
        _context: &TransformContext,
        f: F,
    ) -> Result<Model, ModelError>
    where
        F: FnMut(&Node, &mut ModelTransformer) -> Result<(), ModelError>,
    {
        let order = model.topological_order()?;
        self.transform_nodes(model, &order, f)
    }

    /// Copies every node of `model`.
    pub fn copy_model(&mut self, model: &Model, context: &TransformContext) -> Result<Model, ModelError> {
        self.transform_model(model, context, |node, t| node.copy_node(t))
    }

    /// Copies only the nodes of `submodel`.
    pub fn copy_submodel(
        &mut self,
        submodel: &Submodel<'_>,
        _context: &TransformContext,
    ) -> Result<Model, ModelError> {
        let order = submodel.nodes()?;
        self.transform_nodes(submodel.model(), &order, |node, t| node.copy_node(t))
    }

    /// Refines `model` for at most `max_iterations` passes, stopping early
    /// after a pass that changes nothing. A budget of zero returns a plain
    /// copy.
    ///
    /// Different budgets may produce structurally different models; only
    /// the budget bounds the number of decomposition passes.
    pub fn refine_model(
        &mut self,
        model: &Model,
        context: &TransformContext,
        max_iterations: usize,
    ) -> Result<Model, ModelError> {
        self.refine_submodel(&Submodel::new(model), context, max_iterations)
    }

    /// Like [`refine_model`](Self::refine_model), but only the nodes of
    /// `submodel` are copied and refined.
    pub fn refine_submodel(
        &mut self,
        submodel: &Submodel<'_>,
        context: &TransformContext,
        max_iterations: usize,
    ) -> Result<Model, ModelError> {
        let mut current = self.copy_submodel(submodel, context)?;
        let mut modified = false;
        let mut passes = 0;

        while passes < max_iterations {
            let mut pass = ModelTransformer::new();
            let refined = pass.transform_model(&current, context, |node, t| {
                if context.is_node_compilable(node) {
                    node.copy_node(t)
                } else {
                    node.refine(t).map(|_| ())
                }
            })?;
            passes += 1;
            self.compose(&pass)?;
            tracing::debug!(pass = passes, nodes = refined.len(), changed = pass.modified, "refine pass");
            current = refined;
            if !pass.modified {
                break;
            }
            modified = true;
        }

        self.modified = modified;
        self.refine_passes = passes;
        tracing::info!("refine: {} passes, {} nodes", passes, current.len());
        Ok(current)
    }

    /// Folds a later pass into this transformer's maps so they point from
    /// the original model straight into the later pass's output.
    fn compose(&mut self, later: &ModelTransformer) -> Result<(), ModelError> {
        self.node_map = self
            .node_map
            .iter()
            .filter_map(|(old, mid)| later.node_map.get(mid).map(|new| (*old, *new)))
            .collect();
        let mut output_map = HashMap::with_capacity(self.output_map.len());
        for (key, elements) in &self.output_map {
            output_map.insert(key.clone(), later.transform_port_elements(elements)?);
        }
        self.output_map = output_map;
        Ok(())
    }

    /// The model under construction.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Adds a new node to the model under construction.
    pub fn add_node(&mut self, node: impl Into<NodeKind>) -> Result<NodeId, ModelError> {
        self.modified = true;
        self.model.add_node(node)
    }

    /// Adds `node` as the copy of `old`, mapping every output port of `old`
    /// onto the same-named port of the copy.
    pub fn copy_node(&mut self, old: NodeId, node: impl Into<NodeKind>) -> Result<NodeId, ModelError> {
        let new = self.model.add_node(node)?;
        self.node_map.insert(old, new);
        for port in self.model.node(new)?.output_ports() {
            self.output_map.insert(
                (old, port.name.to_string()),
                PortElements::full(new, port.name, port.size()),
            );
        }
        Ok(new)
    }

    /// Declares that `old.port` is now computed by `elements`.
    pub fn map_node_output(&mut self, old: NodeId, port: &str, elements: PortElements) {
        self.output_map.insert((old, port.to_string()), elements);
    }

    /// Full output of a node already in the model under construction.
    pub fn full_output(&self, new: NodeId, port: &str) -> Result<PortElements, ModelError> {
        self.model.full_output(new, port)
    }

    /// Translates elements of the source model into the new model.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidReference`] if a referenced port has not
    /// been copied or mapped.
    pub fn transform_port_elements(&self, elements: &PortElements) -> Result<PortElements, ModelError> {
        let mut result = PortElements::new();
        for range in elements.ranges() {
            let mapped = self
                .output_map
                .get(&(range.node, range.port.clone()))
                .ok_or_else(|| {
                    ModelError::InvalidReference(format!(
                        "{range} has no counterpart in the transformed model"
                    ))
                })?;
            result.append(&mapped.sub_elements(range.offset, range.length)?);
        }
        Ok(result)
    }

    pub fn corresponding_node(&self, old: NodeId) -> Option<NodeId> {
        self.node_map.get(&old).copied()
    }

    /// The copy of input node `old`.
    pub fn corresponding_input_node(&self, old: NodeId) -> Result<NodeId, ModelError> {
        self.corresponding_node(old).ok_or_else(|| {
            ModelError::InvalidReference(format!("input node {old} was not carried into the new model"))
        })
    }

    pub fn corresponding_outputs(&self, elements: &PortElements) -> Result<PortElements, ModelError> {
        self.transform_port_elements(elements)
    }

    /// `true` if the last transformation added anything beyond copies.
    pub fn is_model_modified(&self) -> bool {
        self.modified
    }

    /// Passes performed by the last [`refine_model`](Self::refine_model).
    pub fn refine_passes(&self) -> usize {
        self.refine_passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{ConstantNode, ConvolutionNode, InputNode, OutputNode};
    use crate::transformation::{CopyTransformation, RefineTransformation, Transformation};
    use crate::{Capability, DEFAULT_OUTPUT_PORT};
    use tensor_core::{Buffer, ElementType, MemoryLayout, MemoryShape};

    /// input (padded 4x4x1) -> convolution (one 3x3 filter) -> output
    fn conv_model() -> (Model, NodeId, PortElements) {
        let mut model = Model::new();
        let il = MemoryLayout::padded(MemoryShape::tensor(4, 4, 1), &[1, 1, 0]);
        let ol = MemoryLayout::dense(MemoryShape::tensor(4, 4, 1));
        let input = model
            .add_node(InputNode::vector(ElementType::Float32, il.memory_size()))
            .unwrap();
        let conv = model
            .add_node(
                ConvolutionNode::new(
                    model.full_output(input, DEFAULT_OUTPUT_PORT).unwrap(),
                    il,
                    ol,
                    Buffer::Float32(vec![1.0; 9]),
                    3,
                    1,
                )
                .unwrap(),
            )
            .unwrap();
        let out = model
            .add_node(OutputNode::new(
                ElementType::Float32,
                model.full_output(conv, DEFAULT_OUTPUT_PORT).unwrap(),
            ))
            .unwrap();
        let elements = model.full_output(out, DEFAULT_OUTPUT_PORT).unwrap();
        (model, input, elements)
    }

    #[test]
    fn test_copy_preserves_structure_and_maps_ids() {
        let (model, input, out) = conv_model();
        let mut t = ModelTransformer::new();
        let copy = t.copy_model(&model, &TransformContext::new()).unwrap();
        assert_eq!(copy.len(), model.len());
        assert!(!t.is_model_modified());

        let new_input = t.corresponding_input_node(input).unwrap();
        assert!(copy.node(new_input).unwrap().downcast::<InputNode>().is_some());
        let new_out = t.corresponding_outputs(&out).unwrap();
        assert!(copy.is_full_port_output(&new_out));
    }

    #[test]
    fn test_refine_decomposes_convolution() {
        let (model, input, out) = conv_model();
        let mut t = ModelTransformer::new();
        let refined = t.refine_model(&model, &TransformContext::new(), 10).unwrap();

        // convolution -> constant + compute node
        assert_eq!(refined.len(), model.len() + 1);
        assert!(t.is_model_modified());
        assert_eq!(t.refine_passes(), 2);
        assert_eq!(
            refined
                .nodes_matching(|n| n.supports(Capability::Compile))
                .len(),
            1
        );
        assert!(refined.nodes_matching(|n| n.supports(Capability::Refine)).is_empty());

        let new_out = t.corresponding_outputs(&out).unwrap();
        assert_eq!(new_out.size(), 16);
        assert!(t.corresponding_input_node(input).is_ok());
    }

    #[test]
    fn test_refine_with_zero_budget_is_identity() {
        let (model, _, _) = conv_model();
        let mut t = ModelTransformer::new();
        let refined = t.refine_model(&model, &TransformContext::new(), 0).unwrap();
        assert_eq!(refined, model);
        assert_eq!(t.refine_passes(), 0);
        assert!(!t.is_model_modified());
    }

    #[test]
    fn test_refine_single_pass_budget() {
        let (model, _, _) = conv_model();
        let mut t = ModelTransformer::new();
        let refined = t.refine_model(&model, &TransformContext::new(), 1).unwrap();
        assert_eq!(t.refine_passes(), 1);
        assert_eq!(refined.len(), model.len() + 1);
    }

    #[test]
    fn test_compilable_nodes_are_not_refined() {
        let (model, _, _) = conv_model();
        let context = TransformContext::with_compilable_predicate(|n| {
            n.type_name().starts_with("ConvolutionNode")
        });
        let mut t = ModelTransformer::new();
        let refined = t.refine_model(&model, &context, 10).unwrap();
        assert_eq!(refined.len(), model.len());
        assert_eq!(t.refine_passes(), 1);
    }

    #[test]
    fn test_unmapped_elements_are_rejected() {
        let t = ModelTransformer::new();
        let err = t
            .transform_port_elements(&PortElements::full(NodeId(3), DEFAULT_OUTPUT_PORT, 1))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidReference(_)));
    }

    #[test]
    fn test_copy_and_refine_follow_the_frontier() {
        let (mut model, _, out) = conv_model();
        model
            .add_node(ConstantNode::new(Buffer::Float32(vec![0.5; 4])))
            .unwrap();
        let context = TransformContext::new();
        let constants = |m: &Model| m.nodes_by_type::<ConstantNode>().len();

        let mut t = ModelTransformer::new();
        let whole = CopyTransformation
            .transform(&Submodel::new(&model), &mut t, &context)
            .unwrap();
        assert_eq!(whole.len(), 4);

        let mut t = ModelTransformer::new();
        let needed = CopyTransformation
            .transform(&Submodel::with_outputs(&model, vec![out.clone()]), &mut t, &context)
            .unwrap();
        assert_eq!(needed.len(), 3);
        assert_eq!(constants(&needed), 0);
        assert!(needed.is_full_port_output(&t.corresponding_outputs(&out).unwrap()));

        let refine = RefineTransformation::new(10);
        let mut t = ModelTransformer::new();
        let whole = refine.transform(&Submodel::new(&model), &mut t, &context).unwrap();
        assert_eq!(constants(&whole), 2);

        let mut t = ModelTransformer::new();
        let needed = refine
            .transform(&Submodel::with_outputs(&model, vec![out.clone()]), &mut t, &context)
            .unwrap();
        // Only the filter weights split off the convolution.
        assert_eq!(constants(&needed), 1);
        assert_eq!(needed.len(), 4);
        assert!(needed.is_full_port_output(&t.corresponding_outputs(&out).unwrap()));
    }
}
