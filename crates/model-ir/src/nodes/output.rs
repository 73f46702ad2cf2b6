// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

use crate::node::{NodeOps, COMPUTE_NODE};
use crate::{
    Capability, ComputeContext, InputPort, ModelError, ModelTransformer, NodeId, OutputPort,
    PortElements, DEFAULT_INPUT_PORT, DEFAULT_OUTPUT_PORT,
};
use serde::{Deserialize, Serialize};
use tensor_core::{Buffer, ElementType, MemoryLayout, MemoryShape};

/// Identity pass-through marking a graph output, optionally reshaped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputNode {
    element_type: ElementType,
    input: PortElements,
    shape: MemoryShape,
}

impl OutputNode {
    pub fn new(element_type: ElementType, input: PortElements) -> Self {
        let shape = MemoryShape::vector(input.size());
        Self {
            element_type,
            input,
            shape,
        }
    }

    /// An output presenting its input under `shape`.
    pub fn with_shape(
        element_type: ElementType,
        input: PortElements,
        shape: MemoryShape,
    ) -> Result<Self, ModelError> {
        if shape.num_elements() != input.size() {
            return Err(ModelError::ContractViolation(format!(
                "output shape {shape} does not hold {} elements",
                input.size()
            )));
        }
        Ok(Self {
            element_type,
            input,
            shape,
        })
    }

    pub fn shape(&self) -> &MemoryShape {
        &self.shape
    }
}

impl NodeOps for OutputNode {
    fn type_name(&self) -> String {
        format!("OutputNode<{}>", self.element_type)
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
            MemoryLayout::dense(self.shape.clone()),
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
        Ok(vec![context.gather(&self.input, self.element_type)?])
    }
}
