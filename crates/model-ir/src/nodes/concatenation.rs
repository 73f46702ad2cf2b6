// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

use super::vector_layout;
use crate::node::{NodeOps, COMPUTE_NODE};
use crate::{
    Capability, ComputeContext, InputPort, ModelError, ModelTransformer, NodeId, OutputPort,
    PortElements, DEFAULT_INPUT_PORT, DEFAULT_OUTPUT_PORT,
};
use serde::{Deserialize, Serialize};
use tensor_core::{Buffer, ElementType};

/// Gathers arbitrary elements into one full output port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcatenationNode {
    element_type: ElementType,
    input: PortElements,
}

impl ConcatenationNode {
    pub fn new(element_type: ElementType, input: PortElements) -> Self {
        Self {
            element_type,
            input,
        }
    }

    pub fn input(&self) -> &PortElements {
        &self.input
    }
}

impl NodeOps for ConcatenationNode {
    fn type_name(&self) -> String {
        format!("ConcatenationNode<{}>", self.element_type)
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
        let input = transformer.transform_port_elements(&self.input)?;
        transformer.copy_node(id, Self::new(self.element_type, input))?;
        Ok(())
    }

    fn compute(&self, context: &ComputeContext<'_>) -> Result<Vec<Buffer>, ModelError> {
        Ok(vec![context.gather(&self.input, self.element_type)?])
    }
}
