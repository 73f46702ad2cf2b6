// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Side-effecting endpoints. Both variants pass their input through, so
//! they can sit in the middle of a graph as well as at its end.

use super::vector_layout;
use crate::node::{NodeOps, COMPUTE_NODE};
use crate::{
    Capability, ComputeContext, InputPort, ModelError, ModelTransformer, NodeId, OutputPort,
    PortElements, DEFAULT_INPUT_PORT, DEFAULT_OUTPUT_PORT,
};
use serde::{Deserialize, Serialize};
use tensor_core::{Buffer, ElementType};

/// Hands its input to an external callback. Always survives pruning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkNode {
    element_type: ElementType,
    input: PortElements,
    callback_name: String,
}

impl SinkNode {
    pub fn new(element_type: ElementType, input: PortElements, callback_name: impl Into<String>) -> Self {
        Self {
            element_type,
            input,
            callback_name: callback_name.into(),
        }
    }

    pub fn callback_name(&self) -> &str {
        &self.callback_name
    }

    pub fn set_callback_name(&mut self, name: impl Into<String>) {
        self.callback_name = name.into();
    }
}

impl NodeOps for SinkNode {
    fn type_name(&self) -> String {
        format!("SinkNode<{}>", self.element_type)
    }

    fn capabilities(&self) -> &'static [Capability] {
        COMPUTE_NODE
    }

    fn input_ports(&self) -> Vec<InputPort<'_>> {
        vec![InputPort {
            name: DEFAULT_INPUT_PORT,
            element_type: self.element_type,
            elements: &self.input,
        }]
    }

    fn output_ports(&self) -> Vec<OutputPort> {
        vec![OutputPort::new(
            DEFAULT_OUTPUT_PORT,
            self.element_type,
            vector_layout(self.input.size()),
        )]
    }

    fn inputs_mut(&mut self) -> Vec<&mut PortElements> {
        vec![&mut self.input]
    }

    fn copy_node(&self, id: NodeId, transformer: &mut ModelTransformer) -> Result<(), ModelError> {
        let mut node = self.clone();
        node.input = transformer.transform_port_elements(&self.input)?;
        transformer.copy_node(id, node)?;
        Ok(())
    }

    fn compute(&self, context: &ComputeContext<'_>) -> Result<Vec<Buffer>, ModelError> {
        let values = context.gather(&self.input, self.element_type)?;
        tracing::trace!(callback = %self.callback_name, len = values.len(), "sink");
        Ok(vec![values])
    }
}

/// A labelled debug tap.
///
/// Kept through pruning only while it sits beside another consumer of its
/// parent; a tap that is its parent's only consumer is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugSinkNode {
    element_type: ElementType,
    input: PortElements,
    label: String,
}

impl DebugSinkNode {
    pub fn new(element_type: ElementType, input: PortElements, label: impl Into<String>) -> Self {
        Self {
            element_type,
            input,
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl NodeOps for DebugSinkNode {
    fn type_name(&self) -> String {
        format!("DebugSinkNode<{}>", self.element_type)
    }

    fn capabilities(&self) -> &'static [Capability] {
        COMPUTE_NODE
    }

    fn input_ports(&self) -> Vec<InputPort<'_>> {
        vec![InputPort {
            name: DEFAULT_INPUT_PORT,
            element_type: self.element_type,
            elements: &self.input,
        }]
    }

    fn output_ports(&self) -> Vec<OutputPort> {
        vec![OutputPort::new(
            DEFAULT_OUTPUT_PORT,
            self.element_type,
            vector_layout(self.input.size()),
        )]
    }

    fn inputs_mut(&mut self) -> Vec<&mut PortElements> {
        vec![&mut self.input]
    }

    fn copy_node(&self, id: NodeId, transformer: &mut ModelTransformer) -> Result<(), ModelError> {
        let mut node = self.clone();
        node.input = transformer.transform_port_elements(&self.input)?;
        transformer.copy_node(id, node)?;
        Ok(())
    }

    fn compute(&self, context: &ComputeContext<'_>) -> Result<Vec<Buffer>, ModelError> {
        let values = context.gather(&self.input, self.element_type)?;
        tracing::debug!(label = %self.label, values = ?values, "debug sink");
        Ok(vec![values])
    }
}
