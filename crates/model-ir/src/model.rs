// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The node arena.
//!
//! A [`Model`] exclusively owns its nodes. Edges are implicit: they are the
//! [`PortElements`] stored in each node's inputs. Nodes can only be added
//! once everything they read from exists, so a model built through
//! [`Model::add_node`] is acyclic by construction; [`Model::verify`] re-checks
//! the invariants for models that came from elsewhere.

use crate::node::{ComputeContext, NodeVariant};
use crate::nodes::{ConcatenationNode, InputNode, SourceNode};
use crate::{Capability, ModelError, Node, NodeId, NodeKind, OutputPort, PortElements};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tensor_core::{Buffer, ElementType, MemoryLayout, MemoryShape};

/// An owning collection of nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    nodes: BTreeMap<NodeId, Node>,
    next_id: usize,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node whose inputs reference nodes already in the model.
    ///
    /// # Errors
    /// - [`ModelError::InvalidReference`] if an input range names a missing
    ///   node or port, or reaches past the end of the port.
    /// - [`ModelError::TypeMismatch`] if an input is wired to a port of a
    ///   different element type.
    pub fn add_node(&mut self, node: impl Into<NodeKind>) -> Result<NodeId, ModelError> {
        let kind = node.into();
        self.check_inputs(&kind)?;
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node { id, kind });
        Ok(id)
    }

    fn check_inputs(&self, kind: &NodeKind) -> Result<(), ModelError> {
        for port in kind.input_ports() {
            for range in port.elements.ranges() {
                let output = self.output_port(range.node, &range.port)?;
                if range.checked_end().map_or(true, |end| end > output.size()) {
                    return Err(ModelError::InvalidReference(format!(
                        "{range} exceeds port size {}",
                        output.size()
                    )));
                }
                if output.element_type != port.element_type {
                    return Err(ModelError::TypeMismatch {
                        context: format!("{}.{}", kind.type_name(), port.name),
                        expected: port.element_type,
                        actual: output.element_type,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, ModelError> {
        self.nodes
            .get(&id)
            .ok_or_else(|| ModelError::InvalidReference(format!("node {id} is not in the model")))
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn output_port(&self, id: NodeId, name: &str) -> Result<OutputPort, ModelError> {
        let node = self.node(id)?;
        node.output_port(name)
            .ok_or_else(|| ModelError::InvalidReference(format!("{node} has no output port '{name}'")))
    }

    /// Elements spanning the whole of `id.port`.
    pub fn full_output(&self, id: NodeId, port: &str) -> Result<PortElements, ModelError> {
        let output = self.output_port(id, port)?;
        Ok(PortElements::full(id, output.name, output.size()))
    }

    /// `true` if `elements` is exactly one range covering an entire port.
    pub fn is_full_port_output(&self, elements: &PortElements) -> bool {
        match elements.ranges() {
            [range] => {
                range.offset == 0
                    && self
                        .output_port(range.node, &range.port)
                        .map(|port| port.size() == range.length)
                        .unwrap_or(false)
            }
            _ => false,
        }
    }

    /// The common element type of every range in `elements`.
    pub fn element_type(&self, elements: &PortElements) -> Result<ElementType, ModelError> {
        let mut ty = None;
        for range in elements.ranges() {
            let port_type = self.output_port(range.node, &range.port)?.element_type;
            match ty {
                None => ty = Some(port_type),
                Some(expected) if expected != port_type => {
                    return Err(ModelError::TypeMismatch {
                        context: format!("elements {elements}"),
                        expected,
                        actual: port_type,
                    })
                }
                Some(_) => {}
            }
        }
        ty.ok_or_else(|| ModelError::InvalidReference("empty port elements".into()))
    }

    /// Memory layout of `elements`: the port's layout for a full port, a
    /// dense vector otherwise.
    pub fn layout(&self, elements: &PortElements) -> Result<MemoryLayout, ModelError> {
        if let [range] = elements.ranges() {
            let port = self.output_port(range.node, &range.port)?;
            if range.offset == 0 && range.length == port.size() {
                return Ok(port.layout);
            }
        }
        Ok(MemoryLayout::dense(MemoryShape::vector(elements.size())))
    }

    /// Nodes that read from `id`.
    pub fn dependents(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.parents().contains(&id))
            .map(|n| n.id)
            .collect()
    }

    /// Node ids ordered so that every node follows all of its parents.
    ///
    /// Kahn's algorithm, always taking the lowest ready id. Parents are
    /// created before their dependents, so a model built through
    /// [`add_node`](Self::add_node) comes out in creation order and copies
    /// keep the relative order of their ids.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidGraph`] on a dangling reference or a cycle.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, ModelError> {
        let mut in_degree: BTreeMap<NodeId, usize> = BTreeMap::new();
        let mut successors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for node in self.nodes.values() {
            let parents = node.parents();
            for parent in &parents {
                if !self.contains(*parent) {
                    return Err(ModelError::InvalidGraph(format!(
                        "{node} references missing node {parent}"
                    )));
                }
                successors.entry(*parent).or_default().push(node.id);
            }
            in_degree.insert(node.id, parents.len());
        }

        let mut ready: BTreeSet<NodeId> = in_degree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop_first() {
            order.push(id);
            for succ in successors.get(&id).into_iter().flatten() {
                if let Some(d) = in_degree.get_mut(succ) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(*succ);
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            return Err(ModelError::InvalidGraph(format!(
                "cycle detected: {} of {} nodes unreachable in dependency order",
                self.nodes.len() - order.len(),
                self.nodes.len()
            )));
        }
        Ok(order)
    }

    /// Calls `f` on every node in dependency order.
    pub fn visit<F: FnMut(&Node)>(&self, mut f: F) -> Result<(), ModelError> {
        for id in self.topological_order()? {
            f(self.node(id)?);
        }
        Ok(())
    }

    /// All nodes of variant `T`, in creation order.
    pub fn nodes_by_type<T: NodeVariant>(&self) -> Vec<(NodeId, &T)> {
        self.nodes
            .values()
            .filter_map(|n| T::from_kind(&n.kind).map(|v| (n.id, v)))
            .collect()
    }

    pub fn nodes_matching<P: Fn(&Node) -> bool>(&self, predicate: P) -> Vec<&Node> {
        self.nodes.values().filter(|n| predicate(n)).collect()
    }

    fn variant_mut<T: NodeVariant>(&mut self, id: NodeId) -> Result<&mut T, ModelError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| ModelError::InvalidReference(format!("node {id} is not in the model")))?;
        let name = node.type_name();
        T::from_kind_mut(&mut node.kind).ok_or_else(|| {
            ModelError::InvalidReference(format!(
                "node {id} is a {name}, not a {}",
                std::any::type_name::<T>().rsplit("::").next().unwrap_or("node")
            ))
        })
    }

    /// Checks acyclicity and that every input range resolves to a
    /// compatible port of this model.
    pub fn verify(&self) -> Result<(), ModelError> {
        self.topological_order()?;
        for node in self.nodes.values() {
            self.check_inputs(&node.kind).map_err(|e| match e {
                ModelError::InvalidReference(msg) => ModelError::InvalidGraph(msg),
                other => other,
            })?;
        }
        Ok(())
    }

    /// An independent container over the same nodes and ids.
    ///
    /// Nodes are plain values in the arena, so the copy is a container-level
    /// clone; nothing outside the model points into it.
    pub fn shallow_copy(&self) -> Model {
        self.clone()
    }

    /// Every node `frontier` depends on, transitively, including the
    /// frontier's own producers.
    pub fn closure(&self, frontier: &[PortElements]) -> Result<BTreeSet<NodeId>, ModelError> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<NodeId> = frontier.iter().flat_map(|e| e.nodes()).collect();
        while let Some(id) = stack.pop() {
            if seen.insert(id) {
                stack.extend(self.node(id)?.parents());
            }
        }
        Ok(seen)
    }

    /// Returns `elements` unchanged if it already is a full port, otherwise
    /// adds a [`ConcatenationNode`] gathering it and returns that node's
    /// output.
    pub fn simplify_outputs(&mut self, elements: &PortElements) -> Result<PortElements, ModelError> {
        if self.is_full_port_output(elements) {
            return Ok(elements.clone());
        }
        let element_type = self.element_type(elements)?;
        let id = self.add_node(ConcatenationNode::new(element_type, elements.clone()))?;
        self.full_output(id, crate::DEFAULT_OUTPUT_PORT)
    }

    pub fn set_input_values(&mut self, id: NodeId, values: Buffer) -> Result<(), ModelError> {
        self.variant_mut::<InputNode>(id)?.set_values(values)
    }

    pub fn set_source_samples(&mut self, id: NodeId, samples: Buffer) -> Result<(), ModelError> {
        self.variant_mut::<SourceNode>(id)?.set_samples(samples)
    }

    /// Assigns callback names to every source and sink node; empty names
    /// leave the existing ones alone.
    pub fn rename_callbacks(&mut self, source_callback: &str, sink_callback: &str) {
        for node in self.nodes.values_mut() {
            match &mut node.kind {
                NodeKind::Source(source) if !source_callback.is_empty() => {
                    source.set_callback_name(source_callback)
                }
                NodeKind::Sink(sink) if !sink_callback.is_empty() => {
                    sink.set_callback_name(sink_callback)
                }
                _ => {}
            }
        }
    }

    /// Clears all input and source bindings back to zeros.
    pub fn reset(&mut self) {
        for node in self.nodes.values_mut() {
            match &mut node.kind {
                NodeKind::Input(input) => input.reset(),
                NodeKind::Source(source) => source.reset(),
                _ => {}
            }
        }
    }

    /// Evaluates the nodes `elements` depends on and gathers its values.
    pub fn compute_output(&self, elements: &PortElements) -> Result<Buffer, ModelError> {
        self.compute_output_with(elements, |_, _| Ok(None))
    }

    /// Like [`compute_output`](Self::compute_output), but `hook` is offered
    /// every node first; returning `Some(outputs)` replaces the node's own
    /// evaluation. This is how compiled routines stand in for nodes that
    /// only support [`Capability::Compile`].
    pub fn compute_output_with<F>(&self, elements: &PortElements, mut hook: F) -> Result<Buffer, ModelError>
    where
        F: FnMut(&Node, &ComputeContext<'_>) -> Result<Option<Vec<Buffer>>, ModelError>,
    {
        let element_type = self.element_type(elements)?;
        let needed = self.closure(std::slice::from_ref(elements))?;
        let mut values: HashMap<(NodeId, String), Buffer> = HashMap::new();

        for id in self.topological_order()? {
            if !needed.contains(&id) {
                continue;
            }
            let node = self.node(id)?;
            let context = ComputeContext { values: &values };
            let outputs = match hook(node, &context)? {
                Some(outputs) => outputs,
                None => node.compute(&context)?,
            };
            let ports = node.output_ports();
            if outputs.len() != ports.len() {
                return Err(ModelError::ContractViolation(format!(
                    "{node} produced {} buffers for {} output ports",
                    outputs.len(),
                    ports.len()
                )));
            }
            for (port, buffer) in ports.into_iter().zip(outputs) {
                values.insert((id, port.name.to_string()), buffer);
            }
        }

        ComputeContext { values: &values }.gather(elements, element_type)
    }

    /// One-line description for logging.
    pub fn summary(&self) -> String {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for node in self.nodes.values() {
            let name = node.type_name();
            let base = name.split('<').next().unwrap_or(&name).to_string();
            *counts.entry(base).or_default() += 1;
        }
        let compilable = self
            .nodes
            .values()
            .filter(|n| n.supports(Capability::Compile))
            .count();
        let parts: Vec<String> = counts.iter().map(|(k, v)| format!("{k} x{v}")).collect();
        format!(
            "Model: {} nodes ({} compilable): {}",
            self.nodes.len(),
            compilable,
            parts.join(", ")
        )
    }

    /// Sink nodes by the type-name rule, in creation order.
    pub fn sink_nodes(&self) -> Vec<&Node> {
        self.nodes_matching(crate::transformation::is_sink_node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{BinaryOperation, BinaryOperationNode, ConstantNode, OutputNode, SinkNode};
    use crate::{PortRange, DEFAULT_OUTPUT_PORT};

    fn add_graph() -> (Model, NodeId, NodeId, PortElements) {
        let mut model = Model::new();
        let input = model.add_node(InputNode::vector(ElementType::Float64, 3)).unwrap();
        let constant = model
            .add_node(ConstantNode::new(Buffer::Float64(vec![1.0, 2.0, 3.0])))
            .unwrap();
        let sum = model
            .add_node(
                BinaryOperationNode::new(
                    ElementType::Float64,
                    BinaryOperation::Add,
                    model.full_output(input, DEFAULT_OUTPUT_PORT).unwrap(),
                    model.full_output(constant, DEFAULT_OUTPUT_PORT).unwrap(),
                )
                .unwrap(),
            )
            .unwrap();
        let out = model.full_output(sum, DEFAULT_OUTPUT_PORT).unwrap();
        (model, input, sum, out)
    }

    #[test]
    fn test_add_node_rejects_dangling_reference() {
        let mut model = Model::new();
        let err = model
            .add_node(OutputNode::new(
                ElementType::Float32,
                PortElements::full(NodeId(7), DEFAULT_OUTPUT_PORT, 2),
            ))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidReference(_)));
    }

    #[test]
    fn test_add_node_rejects_type_mismatch() {
        let mut model = Model::new();
        let input = model.add_node(InputNode::vector(ElementType::Int32, 2)).unwrap();
        let err = model
            .add_node(OutputNode::new(
                ElementType::Float32,
                model.full_output(input, DEFAULT_OUTPUT_PORT).unwrap(),
            ))
            .unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { .. }));
    }

    #[test]
    fn test_add_node_rejects_out_of_range() {
        let mut model = Model::new();
        let input = model.add_node(InputNode::vector(ElementType::Int32, 2)).unwrap();
        let err = model
            .add_node(OutputNode::new(
                ElementType::Int32,
                PortRange::new(input, DEFAULT_OUTPUT_PORT, 1, 2).into(),
            ))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidReference(_)));
    }

    #[test]
    fn test_compute_output() {
        let (mut model, input, _, out) = add_graph();
        model
            .set_input_values(input, Buffer::Float64(vec![10.0, 20.0, 30.0]))
            .unwrap();
        let result = model.compute_output(&out).unwrap();
        assert_eq!(result, Buffer::Float64(vec![11.0, 22.0, 33.0]));
    }

    #[test]
    fn test_topological_order_and_visit() {
        let (model, input, sum, _) = add_graph();
        let order = model.topological_order().unwrap();
        let pos = |id| order.iter().position(|&x| x == id).unwrap();
        assert!(pos(input) < pos(sum));

        let mut names = Vec::new();
        model.visit(|n| names.push(n.type_name())).unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(names[2], "BinaryOperationNode<double>");
    }

    #[test]
    fn test_verify_detects_cycle() {
        let (mut model, input, sum, _) = add_graph();
        // turn the constant into a reader of the sum, closing a cycle
        let constant = NodeId(1);
        if let Some(node) = model.nodes.get_mut(&constant) {
            node.kind = OutputNode::new(
                ElementType::Float64,
                PortElements::full(sum, DEFAULT_OUTPUT_PORT, 3),
            )
            .into();
        }
        assert!(matches!(model.verify(), Err(ModelError::InvalidGraph(_))));
        assert!(model.contains(input));
    }

    #[test]
    fn test_simplify_outputs() {
        let (mut model, input, sum, out) = add_graph();
        assert_eq!(model.simplify_outputs(&out).unwrap(), out);
        let before = model.len();

        let mut mixed = PortElements::new();
        mixed.push(PortRange::new(input, DEFAULT_OUTPUT_PORT, 0, 1));
        mixed.push(PortRange::new(sum, DEFAULT_OUTPUT_PORT, 2, 1));
        assert!(!model.is_full_port_output(&mixed));
        let simplified = model.simplify_outputs(&mixed).unwrap();
        assert_eq!(model.len(), before + 1);
        assert!(model.is_full_port_output(&simplified));
        assert_eq!(simplified.size(), 2);

        model
            .set_input_values(input, Buffer::Float64(vec![5.0, 0.0, 0.0]))
            .unwrap();
        let values = model.compute_output(&simplified).unwrap();
        assert_eq!(values, Buffer::Float64(vec![5.0, 3.0]));
    }

    #[test]
    fn test_nodes_by_type() {
        let (model, input, _, _) = add_graph();
        let inputs = model.nodes_by_type::<InputNode>();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].0, input);
        assert_eq!(inputs[0].1.size(), 3);
    }

    #[test]
    fn test_summary() {
        let (model, _, _, _) = add_graph();
        let s = model.summary();
        assert!(s.contains("3 nodes"));
        assert!(s.contains("InputNode x1"));
    }

    #[test]
    fn test_set_values_on_wrong_variant() {
        let (mut model, _, sum, _) = add_graph();
        assert!(matches!(
            model.set_input_values(sum, Buffer::Float64(vec![0.0; 3])),
            Err(ModelError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_rename_callbacks_source_and_sink() {
        let mut model = Model::new();
        let trigger = model.add_node(InputNode::vector(ElementType::Float64, 1)).unwrap();
        let source = model
            .add_node(SourceNode::new(
                ElementType::Float32,
                model.full_output(trigger, DEFAULT_OUTPUT_PORT).unwrap(),
                MemoryShape::vector(4),
                "read_mic",
            ))
            .unwrap();
        model
            .add_node(SinkNode::new(
                ElementType::Float32,
                model.full_output(source, DEFAULT_OUTPUT_PORT).unwrap(),
                "write_led",
            ))
            .unwrap();

        let callbacks = |model: &Model| {
            let source = model.nodes_by_type::<SourceNode>()[0].1.callback_name().to_string();
            let sink = model.nodes_by_type::<SinkNode>()[0].1.callback_name().to_string();
            (source, sink)
        };

        model.rename_callbacks("", "");
        assert_eq!(callbacks(&model), ("read_mic".into(), "write_led".into()));

        model.rename_callbacks("next_frame", "");
        assert_eq!(callbacks(&model), ("next_frame".into(), "write_led".into()));

        model.rename_callbacks("", "emit_frame");
        assert_eq!(callbacks(&model), ("next_frame".into(), "emit_frame".into()));
    }
}
