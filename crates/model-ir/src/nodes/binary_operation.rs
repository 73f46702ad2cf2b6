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
    PortElements, DEFAULT_OUTPUT_PORT, INPUT1_PORT, INPUT2_PORT,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tensor_core::{Buffer, ElementType};

/// Element-wise arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperation {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOperation::Add => a + b,
            BinaryOperation::Subtract => a - b,
            BinaryOperation::Multiply => a * b,
            BinaryOperation::Divide => a / b,
        }
    }
}

impl fmt::Display for BinaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BinaryOperation::Add => "add",
            BinaryOperation::Subtract => "subtract",
            BinaryOperation::Multiply => "multiply",
            BinaryOperation::Divide => "divide",
        };
        f.write_str(name)
    }
}

/// `output[i] = input1[i] op input2[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryOperationNode {
    element_type: ElementType,
    operation: BinaryOperation,
    input1: PortElements,
    input2: PortElements,
}

impl BinaryOperationNode {
    /// # Errors
    /// Returns [`ModelError::ContractViolation`] if the operands differ in
    /// length or the element type is `bool`.
    pub fn new(
        element_type: ElementType,
        operation: BinaryOperation,
        input1: PortElements,
        input2: PortElements,
    ) -> Result<Self, ModelError> {
        if element_type == ElementType::Bool {
            return Err(ModelError::ContractViolation(format!(
                "{operation} is not defined for bool elements"
            )));
        }
        if input1.size() != input2.size() {
            return Err(ModelError::ContractViolation(format!(
                "{operation} operands differ in size: {} vs {}",
                input1.size(),
                input2.size()
            )));
        }
        Ok(Self {
            element_type,
            operation,
            input1,
            input2,
        })
    }

    pub fn operation(&self) -> BinaryOperation {
        self.operation
    }
}

impl NodeOps for BinaryOperationNode {
    fn type_name(&self) -> String {
        format!("BinaryOperationNode<{}>", self.element_type)
    }

    fn capabilities(&self) -> &'static [Capability] {
        COMPUTE_NODE
    }

    fn input_ports(&self) -> Vec<InputPort<'_>> {
        vec![
            InputPort {
                name: INPUT1_PORT,
                element_type: self.element_type,
                elements: &self.input1,
            },
            InputPort {
                name: INPUT2_PORT,
                element_type: self.element_type,
                elements: &self.input2,
            },
        ]
    }

    fn output_ports(&self) -> Vec<OutputPort> {
        vec![OutputPort::new(
            DEFAULT_OUTPUT_PORT,
            self.element_type,
            vector_layout(self.input1.size()),
        )]
    }

    fn inputs_mut(&mut self) -> Vec<&mut PortElements> {
        vec![&mut self.input1, &mut self.input2]
    }

    fn copy_node(&self, id: NodeId, transformer: &mut ModelTransformer) -> Result<(), ModelError> {
        let mut node = self.clone();
        node.input1 = transformer.transform_port_elements(&self.input1)?;
        node.input2 = transformer.transform_port_elements(&self.input2)?;
        transformer.copy_node(id, node)?;
        Ok(())
    }

    fn compute(&self, context: &ComputeContext<'_>) -> Result<Vec<Buffer>, ModelError> {
        let a = context.gather(&self.input1, self.element_type)?.to_f64_vec();
        let b = context.gather(&self.input2, self.element_type)?.to_f64_vec();
        let values: Vec<f64> = a
            .iter()
            .zip(&b)
            .map(|(&x, &y)| self.operation.apply(x, y))
            .collect();
        Ok(vec![Buffer::from_f64(self.element_type, &values)])
    }
}
