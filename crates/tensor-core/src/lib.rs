// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Element types, physical memory layouts and the small numeric
//! collaborators the model compiler consumes as pure functions.
//!
//! This crate provides:
//! - [`ElementType`] / [`Element`]: the five port element types
//!   (`bool`, `int32`, `int64`, `float32`, `float64`) and the trait that
//!   connects them to Rust scalars.
//! - [`Buffer`]: a type-tagged value vector carried between graph nodes.
//! - [`MemoryShape`] and [`MemoryLayout`]: logical extents and the padded
//!   physical buffer they are stored in (active size, stride, offset).
//! - [`Matrix`]: dense and structured (upper-triangular, diagonal) matrices
//!   with scaled matrix-vector products [`gemv`] / [`gevm`].
//! - [`LogLoss`]: a numerically stabilised logistic loss.
//!
//! # Design Goals
//! - Layout arithmetic is explicit and checked at construction.
//! - Products write into caller-provided output slices.
//! - Clean error types via `thiserror`.

mod buffer;
mod dtype;
mod error;
mod layout;
mod loss;
mod matrix;
mod ops;
mod shape;

pub use buffer::Buffer;
pub use dtype::{Element, ElementType};
pub use error::TensorError;
pub use layout::MemoryLayout;
pub use loss::{LogLoss, Loss};
pub use matrix::{Matrix, MatrixStructure};
pub use ops::{gemv, gevm};
pub use shape::MemoryShape;
