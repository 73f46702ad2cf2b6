// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Named inputs and outputs over a pruned [`Model`].
//!
//! A [`Map`] owns its model outright. Inputs are stored as [`NodeId`]s of
//! [`InputNode`]s and outputs as [`PortElements`]; every operation that
//! replaces the model (refine, prune, transform, clone) rewrites these
//! through the transformer's correspondence before the new model is
//! installed. If the rewrite fails, the map keeps its old model and
//! bindings.

use crate::{ArchiveVersion, MapArchive, RuntimeError};
use model_ir::nodes::{InputNode, SourceNode};
use model_ir::{
    is_debug_sink_node, ComputeContext, Model, ModelError, ModelTransformer, Node, NodeId,
    PortElements, PruneTransformation, RefineTransformation, SerializationContext, Submodel,
    TransformContext, Transformation,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tensor_core::{Buffer, Element, ElementType, MemoryShape};

/// A model with named, ordered inputs and outputs.
///
/// # Example
/// ```
/// use model_ir::nodes::{InputNode, OutputNode};
/// use model_ir::{Model, DEFAULT_OUTPUT_PORT};
/// use runtime::Map;
/// use tensor_core::{Buffer, ElementType};
///
/// let mut model = Model::new();
/// let input = model.add_node(InputNode::vector(ElementType::Float64, 2)).unwrap();
/// let elements = model.full_output(input, DEFAULT_OUTPUT_PORT).unwrap();
/// let output = model.add_node(OutputNode::new(ElementType::Float64, elements)).unwrap();
/// let output = model.full_output(output, DEFAULT_OUTPUT_PORT).unwrap();
///
/// let mut map = Map::new(&model, vec![("x".into(), input)], vec![("y".into(), output)]).unwrap();
/// let y = map.compute::<f64>(&[Buffer::Float64(vec![1.5, -2.0])]).unwrap();
/// assert_eq!(y, vec![vec![1.5, -2.0]]);
/// ```
#[derive(Debug, PartialEq)]
pub struct Map {
    model: Model,
    input_names: Vec<String>,
    input_nodes: Vec<NodeId>,
    input_index: HashMap<String, usize>,
    output_names: Vec<String>,
    output_elements: Vec<PortElements>,
    output_index: HashMap<String, usize>,
    metadata: BTreeMap<String, String>,
}

impl Map {
    /// Builds a map over a copy of `model`.
    ///
    /// `inputs` name input nodes of `model`; `outputs` name full output ports
    /// of `model`. The copy is pruned to what the outputs, inputs and sink
    /// nodes need.
    ///
    /// # Errors
    /// - [`RuntimeError::ContractViolation`] if an output is not a full port,
    ///   an input is not an [`InputNode`], or a name is used twice.
    /// - [`RuntimeError::ModelError`] if an id or port does not exist.
    pub fn new(
        model: &Model,
        inputs: Vec<(String, NodeId)>,
        outputs: Vec<(String, PortElements)>,
    ) -> Result<Self, RuntimeError> {
        check_full_ports(model, &outputs)?;
        let mut transformer = ModelTransformer::new();
        let copy = transformer.copy_model(model, &TransformContext::new())?;

        let inputs = inputs
            .into_iter()
            .map(|(name, id)| Ok((name, transformer.corresponding_input_node(id)?)))
            .collect::<Result<Vec<_>, RuntimeError>>()?;
        let outputs = outputs
            .into_iter()
            .map(|(name, elements)| Ok((name, transformer.corresponding_outputs(&elements)?)))
            .collect::<Result<Vec<_>, RuntimeError>>()?;
        Self::build(copy, inputs, outputs)
    }

    /// Like [`Map::new`], but takes ownership of `model` instead of copying it.
    pub fn from_model(
        model: Model,
        inputs: Vec<(String, NodeId)>,
        outputs: Vec<(String, PortElements)>,
    ) -> Result<Self, RuntimeError> {
        check_full_ports(&model, &outputs)?;
        Self::build(model, inputs, outputs)
    }

    fn build(
        model: Model,
        inputs: Vec<(String, NodeId)>,
        outputs: Vec<(String, PortElements)>,
    ) -> Result<Self, RuntimeError> {
        let mut map = Self::with_model(model);
        for (name, id) in inputs {
            map.add_input(name, id)?;
        }
        for (name, elements) in outputs {
            map.add_output(name, elements)?;
        }
        if map.output_elements.is_empty() {
            tracing::warn!("map constructed without outputs; only sink nodes survive pruning");
        }
        map.prune()?;
        tracing::debug!("{}", map.summary());
        Ok(map)
    }

    fn with_model(model: Model) -> Self {
        Self {
            model,
            input_names: Vec::new(),
            input_nodes: Vec::new(),
            input_index: HashMap::new(),
            output_names: Vec::new(),
            output_elements: Vec::new(),
            output_index: HashMap::new(),
            metadata: BTreeMap::new(),
        }
    }

    fn add_input(&mut self, name: String, id: NodeId) -> Result<(), RuntimeError> {
        let node = self.model.node(id)?;
        if node.downcast::<InputNode>().is_none() {
            return Err(RuntimeError::ContractViolation(format!(
                "map input '{name}' is bound to {node}, not an input node"
            )));
        }
        if self.input_index.contains_key(&name) {
            return Err(RuntimeError::ContractViolation(format!("duplicate input name '{name}'")));
        }
        self.input_index.insert(name.clone(), self.input_nodes.len());
        self.input_names.push(name);
        self.input_nodes.push(id);
        Ok(())
    }

    /// Adds an output to an existing map.
    ///
    /// Elements that do not cover exactly one full port are first gathered
    /// by a new concatenation node, whose output becomes the map output.
    pub fn add_output(&mut self, name: impl Into<String>, elements: PortElements) -> Result<(), RuntimeError> {
        let name = name.into();
        if self.output_index.contains_key(&name) {
            return Err(RuntimeError::ContractViolation(format!("duplicate output name '{name}'")));
        }
        let elements = self.model.simplify_outputs(&elements)?;
        self.register_output(name, elements);
        Ok(())
    }

    fn register_output(&mut self, name: String, elements: PortElements) {
        self.output_index.insert(name.clone(), self.output_elements.len());
        self.output_names.push(name);
        self.output_elements.push(elements);
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    // ── Inputs ────────────────────────────────────────────────────

    pub fn num_inputs(&self) -> usize {
        self.input_nodes.len()
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    /// The input node at `index`.
    pub fn input(&self, index: usize) -> Result<NodeId, RuntimeError> {
        self.input_nodes
            .get(index)
            .copied()
            .ok_or_else(|| index_error("input", index, self.input_nodes.len()))
    }

    pub fn input_by_name(&self, name: &str) -> Result<NodeId, RuntimeError> {
        let index = self
            .input_index
            .get(name)
            .ok_or_else(|| RuntimeError::InvalidReference(format!("no input named '{name}'")))?;
        self.input(*index)
    }

    pub fn input_name(&self, index: usize) -> Result<&str, RuntimeError> {
        self.input_names
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| index_error("input", index, self.input_names.len()))
    }

    fn input_node(&self, index: usize) -> Result<&InputNode, RuntimeError> {
        let id = self.input(index)?;
        self.model
            .node(id)?
            .downcast::<InputNode>()
            .ok_or_else(|| RuntimeError::ContractViolation(format!("map input {id} is not an input node")))
    }

    /// Source nodes in creation order.
    pub fn source_nodes(&self) -> Vec<(NodeId, &SourceNode)> {
        self.model.nodes_by_type::<SourceNode>()
    }

    /// Shape of input `index`.
    ///
    /// If the model has source nodes, source `index` describes the input
    /// instead of the input node: compiled maps are fed through their
    /// sources.
    pub fn input_shape(&self, index: usize) -> Result<MemoryShape, RuntimeError> {
        if let Some((_, source)) = self.source_nodes().get(index) {
            return Ok(source.shape().clone());
        }
        Ok(self.input_node(index)?.shape().clone())
    }

    pub fn input_size(&self, index: usize) -> Result<usize, RuntimeError> {
        Ok(self.input_shape(index)?.num_elements())
    }

    /// Element type of input `index`, with the same source override as
    /// [`input_shape`](Self::input_shape).
    pub fn input_type(&self, index: usize) -> Result<ElementType, RuntimeError> {
        if let Some((_, source)) = self.source_nodes().get(index) {
            return Ok(source.element_type());
        }
        Ok(self.input_node(index)?.element_type())
    }

    // ── Outputs ───────────────────────────────────────────────────

    pub fn num_outputs(&self) -> usize {
        self.output_elements.len()
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    pub fn output(&self, index: usize) -> Result<&PortElements, RuntimeError> {
        self.output_elements
            .get(index)
            .ok_or_else(|| index_error("output", index, self.output_elements.len()))
    }

    pub fn output_by_name(&self, name: &str) -> Result<&PortElements, RuntimeError> {
        let index = self
            .output_index
            .get(name)
            .ok_or_else(|| RuntimeError::InvalidReference(format!("no output named '{name}'")))?;
        self.output(*index)
    }

    pub fn output_name(&self, index: usize) -> Result<&str, RuntimeError> {
        self.output_names
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| index_error("output", index, self.output_names.len()))
    }

    pub fn output_shape(&self, index: usize) -> Result<MemoryShape, RuntimeError> {
        let layout = self.model.layout(self.output(index)?)?;
        Ok(layout.active_size().clone())
    }

    pub fn output_size(&self, index: usize) -> Result<usize, RuntimeError> {
        Ok(self.output_shape(index)?.num_elements())
    }

    pub fn output_type(&self, index: usize) -> Result<ElementType, RuntimeError> {
        Ok(self.model.element_type(self.output(index)?)?)
    }

    // ── Sinks ─────────────────────────────────────────────────────

    pub fn sink_nodes(&self) -> Vec<&Node> {
        self.model.sink_nodes()
    }

    pub fn num_sink_nodes(&self) -> usize {
        self.sink_nodes().len()
    }

    pub fn sink_node(&self, index: usize) -> Result<&Node, RuntimeError> {
        let sinks = self.sink_nodes();
        let len = sinks.len();
        sinks
            .into_iter()
            .nth(index)
            .ok_or_else(|| index_error("sink node", index, len))
    }

    pub fn sink_output_shape(&self, index: usize) -> Result<MemoryShape, RuntimeError> {
        let port = self.sink_output_port(index)?;
        Ok(port.layout.active_size().clone())
    }

    pub fn sink_output_size(&self, index: usize) -> Result<usize, RuntimeError> {
        Ok(self.sink_output_shape(index)?.num_elements())
    }

    pub fn sink_output_type(&self, index: usize) -> Result<ElementType, RuntimeError> {
        Ok(self.sink_output_port(index)?.element_type)
    }

    fn sink_output_port(&self, index: usize) -> Result<model_ir::OutputPort, RuntimeError> {
        let node = self.sink_node(index)?;
        node.output_ports()
            .into_iter()
            .next()
            .ok_or_else(|| RuntimeError::ContractViolation(format!("{node} has no output port")))
    }

    /// Debug sinks that sit beside other consumers of their parent.
    ///
    /// A debug sink that is the only consumer of everything it reads is
    /// left out, so pruning may drop it.
    pub fn debug_sink_nodes(&self) -> Vec<&Node> {
        self.model
            .nodes_matching(is_debug_sink_node)
            .into_iter()
            .filter(|node| {
                node.parents().into_iter().any(|parent| {
                    self.model
                        .dependents(parent)
                        .into_iter()
                        .any(|dependent| dependent != node.id())
                })
            })
            .collect()
    }

    // ── Binding and evaluation ────────────────────────────────────

    /// Binds `values` to input `index`, converting them to the input's
    /// element type.
    pub fn set_input(&mut self, index: usize, values: Buffer) -> Result<(), RuntimeError> {
        let element_type = self.input_node(index)?.element_type();
        let id = self.input(index)?;
        self.model.set_input_values(id, values.cast(element_type))?;
        Ok(())
    }

    pub fn set_input_by_name(&mut self, name: &str, values: Buffer) -> Result<(), RuntimeError> {
        let index = *self
            .input_index
            .get(name)
            .ok_or_else(|| RuntimeError::InvalidReference(format!("no input named '{name}'")))?;
        self.set_input(index, values)
    }

    pub fn set_input_values<T: Element>(&mut self, index: usize, values: Vec<T>) -> Result<(), RuntimeError> {
        self.set_input(index, T::into_buffer(values))
    }

    /// Binds samples to source node `index`.
    pub fn set_source_values(&mut self, index: usize, values: Buffer) -> Result<(), RuntimeError> {
        let sources = self.source_nodes();
        let (id, element_type) = sources
            .get(index)
            .map(|(id, source)| (*id, source.element_type()))
            .ok_or_else(|| index_error("source node", index, sources.len()))?;
        self.model.set_source_samples(id, values.cast(element_type))?;
        Ok(())
    }

    /// Evaluates output `index` with the current bindings.
    pub fn compute_output(&self, index: usize) -> Result<Buffer, RuntimeError> {
        Ok(self.model.compute_output(self.output(index)?)?)
    }

    /// Evaluates output `index`, letting `hook` stand in for any node.
    pub fn compute_output_with<F>(&self, index: usize, hook: F) -> Result<Buffer, RuntimeError>
    where
        F: FnMut(&Node, &ComputeContext<'_>) -> Result<Option<Vec<Buffer>>, ModelError>,
    {
        Ok(self.model.compute_output_with(self.output(index)?, hook)?)
    }

    pub fn compute_outputs(&self) -> Result<Vec<Buffer>, RuntimeError> {
        (0..self.num_outputs()).map(|i| self.compute_output(i)).collect()
    }

    /// Evaluates arbitrary elements of the model as `T`.
    pub fn compute_elements<T: Element>(&self, elements: &PortElements) -> Result<Vec<T>, RuntimeError> {
        Ok(self.model.compute_output(elements)?.to_vec())
    }

    /// Binds `inputs` positionally and returns every output as `T`.
    ///
    /// # Errors
    /// [`RuntimeError::ContractViolation`] if `inputs.len()` differs from
    /// [`num_inputs`](Self::num_inputs), plus any binding or evaluation error.
    pub fn compute<T: Element>(&mut self, inputs: &[Buffer]) -> Result<Vec<Vec<T>>, RuntimeError> {
        if inputs.len() != self.num_inputs() {
            return Err(RuntimeError::ContractViolation(format!(
                "map has {} inputs, got {} values",
                self.num_inputs(),
                inputs.len()
            )));
        }
        for (index, values) in inputs.iter().enumerate() {
            self.set_input(index, values.clone())?;
        }
        self.compute_outputs()
            .map(|outputs| outputs.iter().map(Buffer::to_vec::<T>).collect())
    }

    /// Clears all input and source bindings.
    pub fn reset(&mut self) {
        self.model.reset();
    }

    // ── Transformations ───────────────────────────────────────────

    /// Refines the model for at most `max_iterations` passes, then prunes.
    /// Returns the number of passes performed; a budget of zero does
    /// nothing.
    pub fn refine(&mut self, context: &TransformContext, max_iterations: usize) -> Result<usize, RuntimeError> {
        if max_iterations == 0 {
            return Ok(0);
        }
        let mut transformer = ModelTransformer::new();
        let refined = RefineTransformation::new(max_iterations).transform(
            &Submodel::new(&self.model),
            &mut transformer,
            context,
        )?;
        self.install(refined, &transformer)?;
        self.prune()?;
        Ok(transformer.refine_passes())
    }

    /// Applies `transformation` to the whole model.
    pub fn transform(
        &mut self,
        transformation: &dyn Transformation,
        context: &TransformContext,
    ) -> Result<(), RuntimeError> {
        let mut transformer = ModelTransformer::new();
        let model = transformation.transform(&Submodel::new(&self.model), &mut transformer, context)?;
        tracing::debug!(transformation = transformation.name(), nodes = model.len(), "map transformed");
        self.install(model, &transformer)
    }

    /// Applies a per-node rewrite to the whole model.
    pub fn transform_with<F>(&mut self, context: &TransformContext, f: F) -> Result<(), RuntimeError>
    where
        F: FnMut(&Node, &mut ModelTransformer) -> Result<(), ModelError>,
    {
        let mut transformer = ModelTransformer::new();
        let model = transformer.transform_model(&self.model, context, f)?;
        self.install(model, &transformer)
    }

    /// Drops every node that no output, input, sink or side-by-side debug
    /// sink depends on.
    pub fn prune(&mut self) -> Result<(), RuntimeError> {
        let mut keep: BTreeSet<NodeId> = self.output_elements.iter().flat_map(|e| e.nodes()).collect();
        keep.extend(self.input_nodes.iter().copied());
        keep.extend(self.debug_sink_nodes().into_iter().map(Node::id));

        let mut frontier = Vec::new();
        for id in keep {
            for port in self.model.node(id)?.output_ports() {
                frontier.push(PortElements::full(id, port.name, port.size()));
            }
        }

        let mut transformer = ModelTransformer::new();
        let pruned = PruneTransformation.transform(
            &Submodel::with_outputs(&self.model, frontier),
            &mut transformer,
            &TransformContext::new(),
        )?;
        self.install(pruned, &transformer)?;
        self.model.verify()?;
        Ok(())
    }

    /// Rewrites the cached inputs and outputs through `transformer` and, if
    /// that succeeds, replaces the model.
    fn install(&mut self, model: Model, transformer: &ModelTransformer) -> Result<(), RuntimeError> {
        self.fix_transformed_io(transformer)?;
        self.model = model;
        Ok(())
    }

    fn fix_transformed_io(&mut self, transformer: &ModelTransformer) -> Result<(), RuntimeError> {
        let input_nodes = self
            .input_nodes
            .iter()
            .map(|&id| transformer.corresponding_input_node(id))
            .collect::<Result<Vec<_>, _>>()?;
        let output_elements = self
            .output_elements
            .iter()
            .map(|e| transformer.corresponding_outputs(e))
            .collect::<Result<Vec<_>, _>>()?;
        self.input_nodes = input_nodes;
        self.output_elements = output_elements;
        Ok(())
    }

    /// Assigns callback names to every source and sink node. Empty names
    /// leave the existing ones in place.
    pub fn rename_callbacks(&mut self, source_callback: &str, sink_callback: &str) {
        self.model.rename_callbacks(source_callback, sink_callback);
    }

    // ── Copies ────────────────────────────────────────────────────

    /// A deep copy with a freshly copied model.
    pub fn try_clone(&self) -> Result<Map, RuntimeError> {
        let mut transformer = ModelTransformer::new();
        let model = transformer.copy_model(&self.model, &TransformContext::new())?;
        let mut copy = Map {
            model: Model::new(),
            input_names: self.input_names.clone(),
            input_nodes: self.input_nodes.clone(),
            input_index: self.input_index.clone(),
            output_names: self.output_names.clone(),
            output_elements: self.output_elements.clone(),
            output_index: self.output_index.clone(),
            metadata: self.metadata.clone(),
        };
        copy.install(model, &transformer)?;
        copy.model.verify()?;
        Ok(copy)
    }

    /// Replaces `self` with a deep copy of `other`. On error `self` is left
    /// untouched.
    pub fn assign_from(&mut self, other: &Map) -> Result<(), RuntimeError> {
        let mut copy = other.try_clone()?;
        std::mem::swap(self, &mut copy);
        Ok(())
    }

    // ── Metadata and archives ─────────────────────────────────────

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.metadata
    }

    /// Version 3 only when there is metadata to write.
    pub fn archive_version(&self) -> ArchiveVersion {
        if self.metadata.is_empty() {
            ArchiveVersion::V2
        } else {
            ArchiveVersion::V3ModelMetadata
        }
    }

    pub fn to_archive(&self) -> Result<MapArchive, RuntimeError> {
        Ok(MapArchive {
            version: self.archive_version().number(),
            model: self.model.to_archive()?,
            input_names: self.input_names.clone(),
            input_ids: self.input_nodes.clone(),
            output_names: self.output_names.clone(),
            output_elements: self.output_elements.clone(),
            metadata: (!self.metadata.is_empty()).then(|| self.metadata.clone()),
        })
    }

    /// Rebuilds a map from an archive.
    ///
    /// # Errors
    /// - [`RuntimeError::UnsupportedArchiveVersion`] for unknown versions.
    /// - [`RuntimeError::CorruptArchive`] if names and ids disagree in
    ///   length, an id does not resolve, an input id names something other
    ///   than an input node, or an output is not a full port.
    pub fn from_archive(archive: &MapArchive) -> Result<Self, RuntimeError> {
        ArchiveVersion::check_readable(archive.version)?;
        if archive.input_names.len() != archive.input_ids.len() {
            return Err(RuntimeError::CorruptArchive(format!(
                "{} input names for {} input ids",
                archive.input_names.len(),
                archive.input_ids.len()
            )));
        }
        if archive.output_names.len() != archive.output_elements.len() {
            return Err(RuntimeError::CorruptArchive(format!(
                "{} output names for {} output elements",
                archive.output_names.len(),
                archive.output_elements.len()
            )));
        }

        let mut context = SerializationContext::new();
        let (model, input_ids, output_elements) = context
            .with_scope(|ctx| {
                let model = Model::from_archive(&archive.model, ctx)?;
                let inputs = archive
                    .input_ids
                    .iter()
                    .map(|&id| ctx.resolve(id))
                    .collect::<Result<Vec<_>, _>>()?;
                let outputs = archive
                    .output_elements
                    .iter()
                    .map(|e| e.remap(|id| ctx.resolve(id)))
                    .collect::<Result<Vec<_>, ModelError>>()?;
                Ok::<_, ModelError>((model, inputs, outputs))
            })
            .map_err(corrupt)?;

        let mut map = Self::with_model(model);
        for (name, id) in archive.input_names.iter().zip(input_ids) {
            map.add_input(name.clone(), id).map_err(corrupt)?;
        }
        for (name, elements) in archive.output_names.iter().zip(output_elements) {
            if map.output_index.contains_key(name) {
                return Err(RuntimeError::CorruptArchive(format!("duplicate output name '{name}'")));
            }
            if !map.model.is_full_port_output(&elements) {
                return Err(RuntimeError::CorruptArchive(format!(
                    "output '{name}' is not a full port: {elements}"
                )));
            }
            map.register_output(name.clone(), elements);
        }
        map.metadata = archive.metadata.clone().unwrap_or_default();
        map.model.verify().map_err(corrupt)?;
        Ok(map)
    }

    pub fn to_json(&self) -> Result<String, RuntimeError> {
        Ok(serde_json::to_string_pretty(&self.to_archive()?)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RuntimeError> {
        let archive: MapArchive = serde_json::from_str(json)?;
        Self::from_archive(&archive)
    }

    pub fn save(&self, path: &Path) -> Result<(), RuntimeError> {
        std::fs::write(path, self.to_json()?)?;
        tracing::info!("map saved to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let map = Self::from_json(&std::fs::read_to_string(path)?)?;
        tracing::info!("map loaded from {}: {}", path.display(), map.summary());
        Ok(map)
    }

    /// One-line description for logging.
    pub fn summary(&self) -> String {
        format!(
            "Map: {} inputs [{}], {} outputs [{}], {} sinks; {}",
            self.num_inputs(),
            self.input_names.join(", "),
            self.num_outputs(),
            self.output_names.join(", "),
            self.num_sink_nodes(),
            self.model.summary()
        )
    }
}

fn check_full_ports(model: &Model, outputs: &[(String, PortElements)]) -> Result<(), RuntimeError> {
    for (name, elements) in outputs {
        if !model.is_full_port_output(elements) {
            return Err(RuntimeError::ContractViolation(format!(
                "map output '{name}' must be a full output port, got {elements}"
            )));
        }
    }
    Ok(())
}

fn index_error(what: &str, index: usize, len: usize) -> RuntimeError {
    RuntimeError::InvalidReference(format!("{what} index {index} out of range ({len} available)"))
}

fn corrupt(error: impl std::fmt::Display) -> RuntimeError {
    RuntimeError::CorruptArchive(error.to_string())
}
