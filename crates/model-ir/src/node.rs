// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graph vertices and their capability sets.
//!
//! Every node variant lives in [`NodeKind`] and implements [`NodeOps`].
//! Callers dispatch through [`Node`], which checks the variant's declared
//! [`Capability`] set before forwarding, so asking a compile-only node to
//! compute is an [`ModelError::Unsupported`] error rather than a silent
//! fallback.

use crate::nodes::{
    BinaryOperationNode, ConcatenationNode, ConstantNode, ConvolutionComputeNode,
    ConvolutionNode, DebugSinkNode, InputNode, OutputNode, SinkNode, SourceNode,
};
use crate::{InputPort, ModelError, ModelTransformer, NodeId, OutputPort, PortElements};
use emitter::{ConvolutionRoutine, EmitOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tensor_core::{Buffer, ElementType};

/// What a node variant can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Direct evaluation.
    Compute,
    /// Identity rewrite into another model.
    Copy,
    /// Decomposition into lower-level nodes.
    Refine,
    /// Lowering into an emitted routine.
    Compile,
    /// Serialization.
    Archive,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Compute => "compute",
            Capability::Copy => "copy",
            Capability::Refine => "refine",
            Capability::Compile => "compile",
            Capability::Archive => "archive",
        };
        f.write_str(name)
    }
}

pub(crate) const COMPUTE_NODE: &[Capability] =
    &[Capability::Compute, Capability::Copy, Capability::Archive];
pub(crate) const REFINE_NODE: &[Capability] =
    &[Capability::Refine, Capability::Copy, Capability::Archive];
pub(crate) const COMPILE_NODE: &[Capability] =
    &[Capability::Compile, Capability::Copy, Capability::Archive];

/// Behaviour shared by all node variants.
pub trait NodeOps {
    /// Runtime type name, e.g. `SinkNode<float>`.
    fn type_name(&self) -> String;

    fn capabilities(&self) -> &'static [Capability];

    fn input_ports(&self) -> Vec<InputPort<'_>>;

    fn output_ports(&self) -> Vec<OutputPort>;

    /// Mutable access to every input's wiring, in `input_ports` order.
    fn inputs_mut(&mut self) -> Vec<&mut PortElements>;

    /// Adds a copy of this node to the transformer's model, rewiring its
    /// inputs and mapping its outputs.
    fn copy_node(&self, id: NodeId, transformer: &mut ModelTransformer) -> Result<(), ModelError>;

    /// Replaces this node with lower-level nodes. Returns `false` (after
    /// copying) if there is nothing to decompose.
    fn refine(&self, id: NodeId, transformer: &mut ModelTransformer) -> Result<bool, ModelError> {
        self.copy_node(id, transformer)?;
        Ok(false)
    }

    /// Evaluates the node, returning one buffer per output port.
    fn compute(&self, context: &ComputeContext<'_>) -> Result<Vec<Buffer>, ModelError>;
}

/// A node that lowers into an emitted routine.
pub trait Compilable {
    fn element_type(&self) -> ElementType;

    /// Input and filter-weight wiring, in routine argument order.
    fn routine_inputs(&self) -> [&PortElements; 2];

    fn emit_routine(&self, options: EmitOptions) -> Result<ConvolutionRoutine, ModelError>;
}

/// Output values computed so far during one evaluation.
pub struct ComputeContext<'a> {
    pub(crate) values: &'a HashMap<(NodeId, String), Buffer>,
}

impl ComputeContext<'_> {
    /// Gathers the referenced values into one buffer of `element_type`.
    pub fn gather(&self, elements: &PortElements, element_type: ElementType) -> Result<Buffer, ModelError> {
        let mut out = Buffer::zeros(element_type, 0);
        for range in elements.ranges() {
            let source = self
                .values
                .get(&(range.node, range.port.clone()))
                .ok_or_else(|| ModelError::InvalidReference(format!("no value computed for {range}")))?;
            out.extend_from(&source.slice(range.offset, range.length)?)?;
        }
        Ok(out)
    }
}

/// All node variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Input(InputNode),
    Constant(ConstantNode),
    Concatenation(ConcatenationNode),
    BinaryOperation(BinaryOperationNode),
    Output(OutputNode),
    Source(SourceNode),
    Sink(SinkNode),
    DebugSink(DebugSinkNode),
    Convolution(ConvolutionNode),
    ConvolutionCompute(ConvolutionComputeNode),
}

macro_rules! dispatch {
    ($kind:expr, $n:ident => $body:expr) => {
        match $kind {
            NodeKind::Input($n) => $body,
            NodeKind::Constant($n) => $body,
            NodeKind::Concatenation($n) => $body,
            NodeKind::BinaryOperation($n) => $body,
            NodeKind::Output($n) => $body,
            NodeKind::Source($n) => $body,
            NodeKind::Sink($n) => $body,
            NodeKind::DebugSink($n) => $body,
            NodeKind::Convolution($n) => $body,
            NodeKind::ConvolutionCompute($n) => $body,
        }
    };
}

impl NodeKind {
    pub fn type_name(&self) -> String {
        dispatch!(self, n => n.type_name())
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        dispatch!(self, n => n.capabilities())
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn input_ports(&self) -> Vec<InputPort<'_>> {
        dispatch!(self, n => n.input_ports())
    }

    pub fn output_ports(&self) -> Vec<OutputPort> {
        dispatch!(self, n => n.output_ports())
    }

    pub(crate) fn inputs_mut(&mut self) -> Vec<&mut PortElements> {
        dispatch!(self, n => n.inputs_mut())
    }

    /// The compile-time view of this node, if it has one.
    pub fn as_compilable(&self) -> Option<&dyn Compilable> {
        match self {
            NodeKind::ConvolutionCompute(n) => Some(n),
            _ => None,
        }
    }
}

/// Typed access to a [`NodeKind`] variant.
pub trait NodeVariant: Sized {
    fn from_kind(kind: &NodeKind) -> Option<&Self>;

    fn from_kind_mut(kind: &mut NodeKind) -> Option<&mut Self>;
}

macro_rules! node_variant {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl NodeVariant for $ty {
                fn from_kind(kind: &NodeKind) -> Option<&Self> {
                    match kind {
                        NodeKind::$variant(n) => Some(n),
                        _ => None,
                    }
                }

                fn from_kind_mut(kind: &mut NodeKind) -> Option<&mut Self> {
                    match kind {
                        NodeKind::$variant(n) => Some(n),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for NodeKind {
                fn from(node: $ty) -> Self {
                    NodeKind::$variant(node)
                }
            }
        )*
    };
}

node_variant! {
    Input => InputNode,
    Constant => ConstantNode,
    Concatenation => ConcatenationNode,
    BinaryOperation => BinaryOperationNode,
    Output => OutputNode,
    Source => SourceNode,
    Sink => SinkNode,
    DebugSink => DebugSinkNode,
    Convolution => ConvolutionNode,
    ConvolutionCompute => ConvolutionComputeNode,
}

/// A vertex owned by a [`Model`](crate::Model).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn type_name(&self) -> String {
        self.kind.type_name()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.kind.supports(capability)
    }

    pub fn input_ports(&self) -> Vec<InputPort<'_>> {
        self.kind.input_ports()
    }

    pub fn output_ports(&self) -> Vec<OutputPort> {
        self.kind.output_ports()
    }

    pub fn output_port(&self, name: &str) -> Option<OutputPort> {
        self.output_ports().into_iter().find(|p| p.name == name)
    }

    /// Distinct nodes this node reads from.
    pub fn parents(&self) -> Vec<NodeId> {
        let mut parents: Vec<NodeId> = Vec::new();
        for port in self.input_ports() {
            for id in port.elements.nodes() {
                if !parents.contains(&id) {
                    parents.push(id);
                }
            }
        }
        parents
    }

    /// Typed view of this node, if it is a `T`.
    pub fn downcast<T: NodeVariant>(&self) -> Option<&T> {
        T::from_kind(&self.kind)
    }

    fn require(&self, capability: Capability) -> Result<(), ModelError> {
        if self.supports(capability) {
            Ok(())
        } else {
            Err(ModelError::Unsupported {
                node: self.type_name(),
                capability,
            })
        }
    }

    pub fn copy_node(&self, transformer: &mut ModelTransformer) -> Result<(), ModelError> {
        self.require(Capability::Copy)?;
        dispatch!(&self.kind, n => n.copy_node(self.id, transformer))
    }

    /// Refines the node if it supports refinement, copies it otherwise.
    pub fn refine(&self, transformer: &mut ModelTransformer) -> Result<bool, ModelError> {
        if !self.supports(Capability::Refine) {
            self.copy_node(transformer)?;
            return Ok(false);
        }
        dispatch!(&self.kind, n => n.refine(self.id, transformer))
    }

    pub fn compute(&self, context: &ComputeContext<'_>) -> Result<Vec<Buffer>, ModelError> {
        self.require(Capability::Compute)?;
        dispatch!(&self.kind, n => n.compute(context))
    }

    pub fn compilable(&self) -> Result<&dyn Compilable, ModelError> {
        self.require(Capability::Compile)?;
        self.kind.as_compilable().ok_or_else(|| ModelError::Unsupported {
            node: self.type_name(),
            capability: Capability::Compile,
        })
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.type_name())
    }
}
