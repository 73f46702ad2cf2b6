// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

use super::check_values;
use crate::node::{NodeOps, COMPUTE_NODE};
use crate::{
    Capability, ComputeContext, InputPort, ModelError, ModelTransformer, NodeId, OutputPort,
    PortElements, DEFAULT_OUTPUT_PORT,
};
use serde::{Deserialize, Serialize};
use tensor_core::{Buffer, ElementType, MemoryLayout, MemoryShape};

/// A graph input: values bound by the caller before evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputNode {
    element_type: ElementType,
    shape: MemoryShape,
    values: Buffer,
}

impl InputNode {
    /// A zero-initialised input of the given shape.
    pub fn new(element_type: ElementType, shape: MemoryShape) -> Self {
        Self {
            values: Buffer::zeros(element_type, shape.num_elements()),
            element_type,
            shape,
        }
    }

    /// A one-dimensional input of `size` elements.
    pub fn vector(element_type: ElementType, size: usize) -> Self {
        Self::new(element_type, MemoryShape::vector(size))
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn shape(&self) -> &MemoryShape {
        &self.shape
    }

    pub fn size(&self) -> usize {
        self.shape.num_elements()
    }

    pub fn values(&self) -> &Buffer {
        &self.values
    }

    pub fn set_values(&mut self, values: Buffer) -> Result<(), ModelError> {
        check_values(&self.type_name(), &values, self.element_type, self.size())?;
        self.values = values;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.values = Buffer::zeros(self.element_type, self.size());
    }
}

impl NodeOps for InputNode {
    fn type_name(&self) -> String {
        format!("InputNode<{}>", self.element_type)
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
            self.element_type,
            MemoryLayout::dense(self.shape.clone()),
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
