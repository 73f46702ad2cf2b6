// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Declarative and lowered convolution nodes.
//!
//! [`ConvolutionNode`] carries its filter weights as a parameter and cannot
//! be evaluated directly. Refining it emits a [`ConstantNode`] holding the
//! flattened `f × k × k × d` weights plus a [`ConvolutionComputeNode`] that
//! reads them through its `filter_weights` port and lowers to an emitted
//! routine.

use super::ConstantNode;
use crate::node::{Compilable, NodeOps, COMPILE_NODE, REFINE_NODE};
use crate::{
    Capability, ComputeContext, InputPort, ModelError, ModelTransformer, NodeId, OutputPort,
    PortElements, DEFAULT_INPUT_PORT, DEFAULT_OUTPUT_PORT, FILTER_WEIGHTS_PORT,
};
use emitter::{ConvolutionParameters, ConvolutionRoutine, EmitError, EmitOptions};
use serde::{Deserialize, Serialize};
use tensor_core::{Buffer, ElementType, MemoryLayout};

fn check_input_size(input: &PortElements, layout: &MemoryLayout) -> Result<(), ModelError> {
    if input.size() != layout.memory_size() {
        return Err(ModelError::ContractViolation(format!(
            "convolution input has {} elements, its layout occupies {}",
            input.size(),
            layout.memory_size()
        )));
    }
    Ok(())
}

/// A convolution declared by its weights and stride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvolutionNode {
    input: PortElements,
    weights: Buffer,
    params: ConvolutionParameters,
}

impl ConvolutionNode {
    /// Creates the node from `f × k × k × channels` weights, `f` being the
    /// output layout's channel count.
    ///
    /// The convolution is depthwise-separable when the weights have a
    /// single channel and the input has more than one.
    ///
    /// # Errors
    /// - [`EmitError::UnsupportedType`] for non floating-point weights.
    /// - [`ModelError::ContractViolation`] if the weights do not divide into
    ///   `f` filters of `k × k` windows, the channel count disagrees with the
    ///   input, the input size disagrees with its layout, or the layouts
    ///   break the loop-nest preconditions.
    pub fn new(
        input: PortElements,
        input_layout: MemoryLayout,
        output_layout: MemoryLayout,
        weights: Buffer,
        filter_size: usize,
        stride: usize,
    ) -> Result<Self, ModelError> {
        let element_type = weights.element_type();
        if !element_type.is_floating_point() {
            return Err(EmitError::UnsupportedType(element_type).into());
        }
        if input_layout.num_dimensions() != 3 || output_layout.num_dimensions() != 3 {
            return Err(ModelError::ContractViolation(
                "convolution layouts must be rows x columns x channels".into(),
            ));
        }

        let window = output_layout.active_dim(2) * filter_size * filter_size;
        if window == 0 || weights.len() % window != 0 {
            return Err(ModelError::ContractViolation(format!(
                "{} weights do not form {} filters of {filter_size}x{filter_size}",
                weights.len(),
                output_layout.active_dim(2)
            )));
        }
        let channels = weights.len() / window;
        let input_depth = input_layout.active_dim(2);
        let depthwise = channels == 1 && input_depth > 1;
        if !depthwise && channels != input_depth {
            return Err(ModelError::ContractViolation(format!(
                "filters have {channels} channels, input has {input_depth}"
            )));
        }

        let params = ConvolutionParameters {
            input_layout,
            output_layout,
            filter_size,
            stride,
            depthwise,
        };
        params.validate()?;
        check_input_size(&input, &params.input_layout)?;

        Ok(Self {
            input,
            weights,
            params,
        })
    }

    pub fn element_type(&self) -> ElementType {
        self.weights.element_type()
    }

    pub fn weights(&self) -> &Buffer {
        &self.weights
    }

    pub fn params(&self) -> &ConvolutionParameters {
        &self.params
    }

    pub fn is_depthwise(&self) -> bool {
        self.params.depthwise
    }
}

impl NodeOps for ConvolutionNode {
    fn type_name(&self) -> String {
        format!("ConvolutionNode<{}>", self.element_type())
    }

    fn capabilities(&self) -> &'static [Capability] {
        REFINE_NODE
    }

    fn input_ports(&self) -> Vec<InputPort<'_>> {
        vec![InputPort {
            name: DEFAULT_INPUT_PORT,
            element_type: self.element_type(),
            elements: &self.input,
        }]
    }

    fn output_ports(&self) -> Vec<OutputPort> {
        vec![OutputPort::new(
            DEFAULT_OUTPUT_PORT,
            self.element_type(),
            self.params.output_layout.clone(),
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

    fn refine(&self, id: NodeId, transformer: &mut ModelTransformer) -> Result<bool, ModelError> {
        let input = transformer.transform_port_elements(&self.input)?;
        let weights = transformer.add_node(ConstantNode::new(self.weights.clone()))?;
        let weights = transformer.full_output(weights, DEFAULT_OUTPUT_PORT)?;
        let compute = ConvolutionComputeNode::new(
            self.element_type(),
            input,
            weights,
            self.params.clone(),
        )?;
        let compute = transformer.add_node(compute)?;
        let output = transformer.full_output(compute, DEFAULT_OUTPUT_PORT)?;
        transformer.map_node_output(id, DEFAULT_OUTPUT_PORT, output);
        Ok(true)
    }

    fn compute(&self, _context: &ComputeContext<'_>) -> Result<Vec<Buffer>, ModelError> {
        Err(ModelError::Unsupported {
            node: self.type_name(),
            capability: Capability::Compute,
        })
    }
}

/// A lowered convolution reading its weights from a port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvolutionComputeNode {
    element_type: ElementType,
    input: PortElements,
    filter_weights: PortElements,
    params: ConvolutionParameters,
}

impl ConvolutionComputeNode {
    pub fn new(
        element_type: ElementType,
        input: PortElements,
        filter_weights: PortElements,
        params: ConvolutionParameters,
    ) -> Result<Self, ModelError> {
        if !element_type.is_floating_point() {
            return Err(EmitError::UnsupportedType(element_type).into());
        }
        params.validate()?;
        check_input_size(&input, &params.input_layout)?;
        if filter_weights.size() != params.weights_len() {
            return Err(ModelError::ContractViolation(format!(
                "expected {} filter weights, got {}",
                params.weights_len(),
                filter_weights.size()
            )));
        }
        Ok(Self {
            element_type,
            input,
            filter_weights,
            params,
        })
    }

    pub fn params(&self) -> &ConvolutionParameters {
        &self.params
    }
}

impl NodeOps for ConvolutionComputeNode {
    fn type_name(&self) -> String {
        format!("ConvolutionComputeNode<{}>", self.element_type)
    }

    fn capabilities(&self) -> &'static [Capability] {
        COMPILE_NODE
    }

    fn input_ports(&self) -> Vec<InputPort<'_>> {
        vec![
            InputPort {
                name: DEFAULT_INPUT_PORT,
                element_type: self.element_type,
                elements: &self.input,
            },
            InputPort {
                name: FILTER_WEIGHTS_PORT,
                element_type: self.element_type,
                elements: &self.filter_weights,
            },
        ]
    }

    fn output_ports(&self) -> Vec<OutputPort> {
        vec![OutputPort::new(
            DEFAULT_OUTPUT_PORT,
            self.element_type,
            self.params.output_layout.clone(),
        )]
    }

    fn inputs_mut(&mut self) -> Vec<&mut PortElements> {
        vec![&mut self.input, &mut self.filter_weights]
    }

    fn copy_node(&self, id: NodeId, transformer: &mut ModelTransformer) -> Result<(), ModelError> {
        let mut node = self.clone();
        node.input = transformer.transform_port_elements(&self.input)?;
        node.filter_weights = transformer.transform_port_elements(&self.filter_weights)?;
        transformer.copy_node(id, node)?;
        Ok(())
    }

    fn compute(&self, _context: &ComputeContext<'_>) -> Result<Vec<Buffer>, ModelError> {
        Err(ModelError::Unsupported {
            node: self.type_name(),
            capability: Capability::Compute,
        })
    }
}

impl Compilable for ConvolutionComputeNode {
    fn element_type(&self) -> ElementType {
        self.element_type
    }

    fn routine_inputs(&self) -> [&PortElements; 2] {
        [&self.input, &self.filter_weights]
    }

    fn emit_routine(&self, options: EmitOptions) -> Result<ConvolutionRoutine, ModelError> {
        Ok(ConvolutionRoutine::emit(self.params.clone(), options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::MemoryShape;

    fn input_elements(size: usize) -> PortElements {
        PortElements::full(NodeId(0), DEFAULT_OUTPUT_PORT, size)
    }

    fn layouts(channels: usize, filters: usize) -> (MemoryLayout, MemoryLayout) {
        (
            MemoryLayout::padded(MemoryShape::tensor(4, 4, channels), &[1, 1, 0]),
            MemoryLayout::dense(MemoryShape::tensor(4, 4, filters)),
        )
    }

    #[test]
    fn test_depthwise_detection() {
        let (il, ol) = layouts(2, 2);
        let node = ConvolutionNode::new(
            input_elements(il.memory_size()),
            il,
            ol,
            Buffer::Float32(vec![0.0; 2 * 9]),
            3,
            1,
        )
        .unwrap();
        assert!(node.is_depthwise());

        let (il, ol) = layouts(2, 3);
        let node = ConvolutionNode::new(
            input_elements(il.memory_size()),
            il,
            ol,
            Buffer::Float32(vec![0.0; 3 * 9 * 2]),
            3,
            1,
        )
        .unwrap();
        assert!(!node.is_depthwise());
        assert_eq!(node.type_name(), "ConvolutionNode<float>");
    }

    #[test]
    fn test_rejects_integer_weights() {
        let (il, ol) = layouts(1, 1);
        let err = ConvolutionNode::new(
            input_elements(il.memory_size()),
            il,
            ol,
            Buffer::Int32(vec![0; 9]),
            3,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Emit(EmitError::UnsupportedType(ElementType::Int32))));
    }

    #[test]
    fn test_rejects_channel_mismatch() {
        let (il, ol) = layouts(3, 1);
        let err = ConvolutionNode::new(
            input_elements(il.memory_size()),
            il,
            ol,
            Buffer::Float64(vec![0.0; 9 * 2]),
            3,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::ContractViolation(_)));
    }

    #[test]
    fn test_rejects_bad_padding() {
        let il = MemoryLayout::dense(MemoryShape::tensor(4, 4, 1));
        let ol = MemoryLayout::dense(MemoryShape::tensor(2, 2, 1));
        let err = ConvolutionNode::new(
            input_elements(il.memory_size()),
            il,
            ol,
            Buffer::Float32(vec![0.0; 9]),
            3,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::Emit(EmitError::ContractViolation(_))));
    }

    #[test]
    fn test_compute_is_unsupported() {
        let (il, ol) = layouts(1, 1);
        let params = ConvolutionParameters {
            input_layout: il.clone(),
            output_layout: ol,
            filter_size: 3,
            stride: 1,
            depthwise: false,
        };
        let node = ConvolutionComputeNode::new(
            ElementType::Float32,
            input_elements(il.memory_size()),
            PortElements::full(NodeId(1), DEFAULT_OUTPUT_PORT, 9),
            params,
        )
        .unwrap();
        let values = std::collections::HashMap::new();
        let context = ComputeContext { values: &values };
        assert!(matches!(
            node.compute(&context),
            Err(ModelError::Unsupported {
                capability: Capability::Compute,
                ..
            })
        ));
    }
}
