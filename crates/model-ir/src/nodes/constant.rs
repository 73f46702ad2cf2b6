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
    PortElements, DEFAULT_OUTPUT_PORT,
};
use serde::{Deserialize, Serialize};
use tensor_core::{Buffer, ElementType, MemoryLayout};

/// Fixed values, e.g. materialised filter weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantNode {
    values: Buffer,
    layout: MemoryLayout,
}

impl ConstantNode {
    /// A constant with a dense one-dimensional layout.
    pub fn new(values: Buffer) -> Self {
        Self {
            layout: vector_layout(values.len()),
            values,
        }
    }

    /// A constant occupying the physical buffer of `layout`.
    pub fn with_layout(values: Buffer, layout: MemoryLayout) -> Result<Self, ModelError> {
        layout.validate()?;
        if values.len() != layout.memory_size() {
            return Err(ModelError::ContractViolation(format!(
                "constant holds {} values but its layout needs {}",
                values.len(),
                layout.memory_size()
            )));
        }
        Ok(Self { values, layout })
    }

    pub fn element_type(&self) -> ElementType {
        self.values.element_type()
    }

    pub fn values(&self) -> &Buffer {
        &self.values
    }
}

impl NodeOps for ConstantNode {
    fn type_name(&self) -> String {
        format!("ConstantNode<{}>", self.element_type())
    }

    fn capabilities(&self) -> &'static [Capability] {
        COMPUTE_NODE
    }

    fn input_ports(&self) -> Vec<InputPort<'_>> {
        Vec::new()
    }

    fn output_ports(&self) -> Vec<OutputPort> {
        vec![OutputPort::new(
            DEFAULT_OUTPUT_PORT,
            self.element_type(),
            self.layout.clone(),
        )]
    }

    fn inputs_mut(&mut self) -> Vec<&mut PortElements> {
        Vec::new()
    }

    fn copy_node(&self, id: NodeId, transformer: &mut ModelTransformer) -> Result<(), ModelError> {
        transformer.copy_node(id, self.clone())?;
        Ok(())
    }

    fn compute(&self, _context: &ComputeContext<'_>) -> Result<Vec<Buffer>, ModelError> {
        Ok(vec![self.values.clone()])
    }
}
