// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

use super::Transformation;
use crate::{Model, ModelError, ModelTransformer, Submodel, TransformContext};

/// Repeated decomposition with a pass budget, over the nodes the
/// submodel's frontier needs.
#[derive(Debug, Clone, Copy)]
pub struct RefineTransformation {
    max_iterations: usize,
}

impl RefineTransformation {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

impl Transformation for RefineTransformation {
    fn name(&self) -> &str {
        "refine"
    }

    fn transform(
        &self,
        submodel: &Submodel<'_>,
        transformer: &mut ModelTransformer,
        context: &TransformContext,
    ) -> Result<Model, ModelError> {
        transformer.refine_submodel(submodel, context, self.max_iterations)
    }
}
