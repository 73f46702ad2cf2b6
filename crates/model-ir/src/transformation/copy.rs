// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

use super::Transformation;
use crate::{Model, ModelError, ModelTransformer, Submodel, TransformContext};

/// Identity rewrite of the submodel: the whole model, or the closure of
/// its output frontier.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyTransformation;

impl Transformation for CopyTransformation {
    fn name(&self) -> &str {
        "copy"
    }

    fn transform(
        &self,
        submodel: &Submodel<'_>,
        transformer: &mut ModelTransformer,
        context: &TransformContext,
    ) -> Result<Model, ModelError> {
        transformer.copy_submodel(submodel, context)
    }
}
