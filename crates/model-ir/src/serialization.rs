// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Archive form of a [`Model`] and the id-resolution context used while
//! reading one back.
//!
//! Archived node ids are only meaningful inside the archive they came from.
//! Reading rebuilds the model through [`Model::add_node`], so every node gets
//! a fresh id and every input reference is rewritten through the
//! [`SerializationContext`].

use crate::{Model, ModelError, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Nodes in dependency order, as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArchive {
    pub nodes: Vec<Node>,
}

/// Maps archived node ids to live ones.
///
/// Lookups walk the scope stack from the innermost scope outwards, so a
/// nested model can refer to nodes of the model that encloses it.
#[derive(Debug, Clone)]
pub struct SerializationContext {
    scopes: Vec<HashMap<NodeId, NodeId>>,
}

impl Default for SerializationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SerializationContext {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Runs `f` inside a fresh scope that is discarded afterwards, whether
    /// `f` succeeds or not.
    pub fn with_scope<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        self.scopes.push(HashMap::new());
        let result = f(self);
        self.scopes.pop();
        result
    }

    /// Records that archived `old` was recreated as `new` in the current scope.
    pub fn register(&mut self, old: NodeId, new: NodeId) -> Result<(), ModelError> {
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| ModelError::ContractViolation("no open scope".into()))?;
        if scope.insert(old, new).is_some() {
            return Err(ModelError::ContractViolation(format!(
                "node {old} registered twice in one scope"
            )));
        }
        Ok(())
    }

    pub fn resolve(&self, old: NodeId) -> Result<NodeId, ModelError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&old).copied())
            .ok_or_else(|| ModelError::InvalidReference(format!("archived node {old} was never read")))
    }

    /// Number of open scopes, the root included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Model {
    /// Archives the model with nodes in topological order.
    pub fn to_archive(&self) -> Result<ModelArchive, ModelError> {
        let nodes = self
            .topological_order()?
            .into_iter()
            .map(|id| self.node(id).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ModelArchive { nodes })
    }

    /// Rebuilds a model from `archive`, registering each archived id in the
    /// current scope of `context`.
    ///
    /// # Errors
    /// - [`ModelError::InvalidReference`] if a node reads from a node that
    ///   appears later in the archive or not at all.
    /// - Anything [`Model::add_node`] rejects.
    pub fn from_archive(
        archive: &ModelArchive,
        context: &mut SerializationContext,
    ) -> Result<Model, ModelError> {
        let mut model = Model::new();
        for node in &archive.nodes {
            let mut kind = node.kind.clone();
            for input in kind.inputs_mut() {
                *input = input.remap(|id| context.resolve(id))?;
            }
            let id = model.add_node(kind)?;
            context.register(node.id, id)?;
        }
        tracing::debug!(nodes = model.len(), depth = context.depth(), "model read from archive");
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{BinaryOperation, BinaryOperationNode, InputNode, OutputNode};
    use crate::{PortElements, DEFAULT_OUTPUT_PORT};
    use tensor_core::{Buffer, ElementType};

    fn sample_model() -> (Model, NodeId) {
        let mut model = Model::new();
        let a = model.add_node(InputNode::vector(ElementType::Int32, 2)).unwrap();
        let b = model.add_node(InputNode::vector(ElementType::Int32, 2)).unwrap();
        let ea = model.full_output(a, DEFAULT_OUTPUT_PORT).unwrap();
        let eb = model.full_output(b, DEFAULT_OUTPUT_PORT).unwrap();
        let product = model
            .add_node(BinaryOperationNode::new(ElementType::Int32, BinaryOperation::Multiply, ea, eb).unwrap())
            .unwrap();
        let ep = model.full_output(product, DEFAULT_OUTPUT_PORT).unwrap();
        let out = model.add_node(OutputNode::new(ElementType::Int32, ep)).unwrap();
        (model, out)
    }

    #[test]
    fn test_archive_through_json() {
        let (model, _) = sample_model();
        let json = serde_json::to_string(&model.to_archive().unwrap()).unwrap();
        let archive: ModelArchive = serde_json::from_str(&json).unwrap();

        let mut context = SerializationContext::new();
        let restored = Model::from_archive(&archive, &mut context).unwrap();
        assert_eq!(restored, model);
        assert_eq!(context.depth(), 1);
    }

    #[test]
    fn test_restored_model_computes() {
        let (model, out) = sample_model();
        let mut context = SerializationContext::new();
        let mut restored = Model::from_archive(&model.to_archive().unwrap(), &mut context).unwrap();

        let inputs = restored.nodes_by_type::<InputNode>();
        let (a, b) = (inputs[0].0, inputs[1].0);
        restored.set_input_values(a, Buffer::Int32(vec![2, 3])).unwrap();
        restored.set_input_values(b, Buffer::Int32(vec![4, 5])).unwrap();

        let out = context.resolve(out).unwrap();
        let elements = restored.full_output(out, DEFAULT_OUTPUT_PORT).unwrap();
        assert_eq!(restored.compute_output(&elements).unwrap(), Buffer::Int32(vec![8, 15]));
    }

    #[test]
    fn test_forward_reference_is_rejected() {
        let (model, _) = sample_model();
        let mut archive = model.to_archive().unwrap();
        archive.nodes.reverse();
        let err = Model::from_archive(&archive, &mut SerializationContext::new()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidReference(_)));
    }

    #[test]
    fn test_nested_scope_sees_outer_ids() {
        let mut context = SerializationContext::new();
        context.register(NodeId(7), NodeId(0)).unwrap();

        let inner = context
            .with_scope(|ctx| {
                ctx.register(NodeId(1), NodeId(4))?;
                assert_eq!(ctx.depth(), 2);
                Ok::<_, ModelError>((ctx.resolve(NodeId(7))?, ctx.resolve(NodeId(1))?))
            })
            .unwrap();
        assert_eq!(inner, (NodeId(0), NodeId(4)));

        // The inner scope is gone again.
        assert_eq!(context.depth(), 1);
        assert!(context.resolve(NodeId(1)).is_err());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut context = SerializationContext::new();
        context.register(NodeId(0), NodeId(0)).unwrap();
        assert!(context.register(NodeId(0), NodeId(1)).is_err());
    }

    #[test]
    fn test_overflowing_range_is_rejected() {
        let (model, _) = sample_model();
        let mut archive = model.to_archive().unwrap();
        let product = archive
            .nodes
            .iter_mut()
            .find(|n| n.type_name().starts_with("BinaryOperationNode"))
            .unwrap();
        let mut inputs = product.kind.inputs_mut();
        let mut ranges = inputs[0].ranges().to_vec();
        ranges[0].offset = usize::MAX;
        *inputs[0] = PortElements::from_ranges(ranges);

        let err = Model::from_archive(&archive, &mut SerializationContext::new()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidReference(_)));
    }
}
