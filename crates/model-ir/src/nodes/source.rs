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
    PortElements, DEFAULT_INPUT_PORT, DEFAULT_OUTPUT_PORT,
};
use serde::{Deserialize, Serialize};
use tensor_core::{Buffer, ElementType, MemoryLayout, MemoryShape};

/// Externally streamed data.
///
/// The input port carries `float64` trigger values (timestamps); the output
/// is the most recently bound sample buffer. The surrounding runtime feeds
/// samples through the callback named by [`callback_name`](Self::callback_name).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    element_type: ElementType,
    trigger: PortElements,
    shape: MemoryShape,
    callback_name: String,
    samples: Buffer,
}

impl SourceNode {
    pub const TRIGGER_TYPE: ElementType = ElementType::Float64;

    pub fn new(
        element_type: ElementType,
        trigger: PortElements,
        shape: MemoryShape,
        callback_name: impl Into<String>,
    ) -> Self {
        Self {
            samples: Buffer::zeros(element_type, shape.num_elements()),
            element_type,
            trigger,
            shape,
            callback_name: callback_name.into(),
        }
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn shape(&self) -> &MemoryShape {
        &self.shape
    }

    pub fn callback_name(&self) -> &str {
        &self.callback_name
    }

    pub fn set_callback_name(&mut self, name: impl Into<String>) {
        self.callback_name = name.into();
    }

    pub fn samples(&self) -> &Buffer {
        &self.samples
    }

    pub fn set_samples(&mut self, samples: Buffer) -> Result<(), ModelError> {
        check_values(
            &self.type_name(),
            &samples,
            self.element_type,
            self.shape.num_elements(),
        )?;
        self.samples = samples;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.samples = Buffer::zeros(self.element_type, self.shape.num_elements());
    }
}

impl NodeOps for SourceNode {
    fn type_name(&self) -> String {
        format!("SourceNode<{}>", self.element_type)
    }

    fn capabilities(&self) -> &'static [Capability] {
        COMPUTE_NODE
    }

    fn input_ports(&self) -> Vec<InputPort<'_>> {
        vec![InputPort {
            name: DEFAULT_INPUT_PORT,
            element_type: Self::TRIGGER_TYPE,
            elements: &self.trigger,
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
        vec![&mut self.trigger]
    }

    fn copy_node(&self, id: NodeId, transformer: &mut ModelTransformer) -> Result<(), ModelError> {
        let mut node = self.clone();
        node.trigger = transformer.transform_port_elements(&self.trigger)?;
        transformer.copy_node(id, node)?;
        Ok(())
    }

    fn compute(&self, _context: &ComputeContext<'_>) -> Result<Vec<Buffer>, ModelError> {
        Ok(vec![self.samples.clone()])
    }
}
