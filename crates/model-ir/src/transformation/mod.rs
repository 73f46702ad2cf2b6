// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`Transformation`] trait and the built-in strategies.
//!
//! | Strategy | Result |
//! |---|---|
//! | [`CopyTransformation`] | identical model, fresh ids |
//! | [`RefineTransformation`] | high-level nodes decomposed, bounded passes |
//! | [`PruneTransformation`] | only what the frontier and sink nodes depend on |

mod copy;
mod prune;
mod refine;

pub use copy::CopyTransformation;
pub use prune::{is_debug_sink_node, is_sink_node, PruneTransformation};
pub use refine::RefineTransformation;

use crate::{Model, ModelError, ModelTransformer, Submodel, TransformContext};

/// A whole-model rewrite.
///
/// Implementations drive the given [`ModelTransformer`], so the caller can
/// read the old-to-new correspondence from it afterwards.
pub trait Transformation {
    /// Human-readable name of this transformation.
    fn name(&self) -> &str;

    /// Produces the transformed model.
    fn transform(
        &self,
        submodel: &Submodel<'_>,
        transformer: &mut ModelTransformer,
        context: &TransformContext,
    ) -> Result<Model, ModelError>;
}
