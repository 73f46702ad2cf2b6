// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The unit of external use: a [`Map`] wraps a `model-ir` model with named,
//! ordered inputs and outputs, and can be refined, pruned, archived and
//! compiled.
//!
//! The runtime takes:
//! - A `Model` from `model-ir` plus input/output bindings.
//! - A [`CompilerConfig`] (TOML or programmatic).
//!
//! And produces a [`CompiledMap`] whose compilable nodes run through the
//! routines emitted by `emitter`, along with a [`CompileReport`].
//!
//! # Pipeline
//! ```text
//! Model ──Map::new──▶ Map ──MapCompiler::compile──▶ CompiledMap
//!                      │                               │
//!                      └──save / load (JSON archive)    └──compute, c_source
//! ```

mod archive;
mod compiler;
mod config;
mod error;
mod map;

pub use archive::{ArchiveVersion, MapArchive};
pub use compiler::{CompileReport, CompiledMap, MapCompiler};
pub use config::CompilerConfig;
pub use error::{ErrorKind, RuntimeError};
pub use map::Map;
