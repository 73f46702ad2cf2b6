// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! The dataflow graph that the map compiler works on.
//!
//! - [`Model`] owns a set of [`Node`]s, each identified by a [`NodeId`].
//!   Nodes read from each other through [`PortElements`]: lists of ranges
//!   over named output ports.
//! - [`NodeKind`] is the closed set of node variants (see [`nodes`]). Each
//!   variant advertises the [`Capability`]s it supports: evaluation,
//!   refinement into simpler nodes, or compilation to a routine.
//! - [`ModelTransformer`] builds a new model out of an old one and keeps the
//!   old-to-new correspondence for nodes and output ports.
//! - [`Transformation`] implementations ([`CopyTransformation`],
//!   [`RefineTransformation`], [`PruneTransformation`]) package the common
//!   whole-model rewrites.
//!
//! # Example
//! ```
//! use model_ir::nodes::{ConvolutionComputeNode, ConvolutionNode, InputNode, OutputNode};
//! use model_ir::{Model, ModelTransformer, TransformContext, DEFAULT_OUTPUT_PORT};
//! use tensor_core::{Buffer, ElementType, MemoryLayout, MemoryShape};
//!
//! let input_layout = MemoryLayout::padded(MemoryShape::tensor(4, 4, 1), &[1, 1, 0]);
//! let output_layout = MemoryLayout::dense(MemoryShape::tensor(4, 4, 1));
//!
//! let mut model = Model::new();
//! let input = model
//!     .add_node(InputNode::vector(ElementType::Float64, input_layout.memory_size()))
//!     .unwrap();
//! let conv = model
//!     .add_node(
//!         ConvolutionNode::new(
//!             model.full_output(input, DEFAULT_OUTPUT_PORT).unwrap(),
//!             input_layout,
//!             output_layout,
//!             Buffer::Float64(vec![1.0; 9]),
//!             3,
//!             1,
//!         )
//!         .unwrap(),
//!     )
//!     .unwrap();
//! let conv_out = model.full_output(conv, DEFAULT_OUTPUT_PORT).unwrap();
//! model.add_node(OutputNode::new(ElementType::Float64, conv_out)).unwrap();
//!
//! let mut transformer = ModelTransformer::new();
//! let refined = transformer
//!     .refine_model(&model, &TransformContext::new(), 4)
//!     .unwrap();
//! assert_eq!(refined.nodes_by_type::<ConvolutionComputeNode>().len(), 1);
//! ```

mod error;
mod model;
mod node;
pub mod nodes;
mod port;
mod serialization;
mod submodel;
pub mod transformation;
mod transformer;

pub use error::ModelError;
pub use model::Model;
pub use node::{Capability, Compilable, ComputeContext, Node, NodeKind, NodeOps, NodeVariant};
pub use port::{
    InputPort, NodeId, OutputPort, PortElements, PortRange, DEFAULT_INPUT_PORT, DEFAULT_OUTPUT_PORT,
    FILTER_WEIGHTS_PORT, INPUT1_PORT, INPUT2_PORT,
};
pub use serialization::{ModelArchive, SerializationContext};
pub use submodel::Submodel;
pub use transformation::{
    is_debug_sink_node, is_sink_node, CopyTransformation, PruneTransformation, RefineTransformation,
    Transformation,
};
pub use transformer::{ModelTransformer, TransformContext};
