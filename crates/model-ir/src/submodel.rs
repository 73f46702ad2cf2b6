// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

use crate::{Model, ModelError, NodeId, PortElements};

/// A view of a model restricted to what an output frontier depends on.
///
/// Without a frontier the submodel is the whole model.
#[derive(Debug, Clone)]
pub struct Submodel<'a> {
    model: &'a Model,
    outputs: Option<Vec<PortElements>>,
}

impl<'a> Submodel<'a> {
    /// The whole of `model`.
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            outputs: None,
        }
    }

    /// The dependency closure of `outputs` within `model`.
    pub fn with_outputs(model: &'a Model, outputs: Vec<PortElements>) -> Self {
        Self {
            model,
            outputs: Some(outputs),
        }
    }

    pub fn model(&self) -> &'a Model {
        self.model
    }

    /// The frontier; empty for a whole-model view.
    pub fn outputs(&self) -> &[PortElements] {
        self.outputs.as_deref().unwrap_or(&[])
    }

    /// Member nodes in dependency order.
    pub fn nodes(&self) -> Result<Vec<NodeId>, ModelError> {
        let order = self.model.topological_order()?;
        match &self.outputs {
            None => Ok(order),
            Some(outputs) => {
                let closure = self.model.closure(outputs)?;
                Ok(order.into_iter().filter(|id| closure.contains(id)).collect())
            }
        }
    }
}
