// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Matrix-vector products.
//!
//! Each operation writes into a caller-provided output slice. Rows (for
//! [`gemv`]) and columns (for [`gevm`]) are independent, so they are spread
//! over the rayon thread pool.

mod gemv_op;

pub use gemv_op::{gemv, gevm};
