// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Type-tagged value buffers.

use crate::{Element, ElementType, TensorError};

/// An owned vector of port values, tagged with its element type.
///
/// `Buffer` is what flows along graph edges during direct evaluation: every
/// output port produces one, and every input port gathers its ranges out of
/// producer buffers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum Buffer {
    Bool(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl Buffer {
    /// Creates a zero-filled buffer.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Buffer, ElementType};
    /// let b = Buffer::zeros(ElementType::Float32, 3);
    /// assert_eq!(b.len(), 3);
    /// assert_eq!(b.element_type(), ElementType::Float32);
    /// ```
    pub fn zeros(element_type: ElementType, len: usize) -> Self {
        match element_type {
            ElementType::Bool => Buffer::Bool(vec![false; len]),
            ElementType::Int32 => Buffer::Int32(vec![0; len]),
            ElementType::Int64 => Buffer::Int64(vec![0; len]),
            ElementType::Float32 => Buffer::Float32(vec![0.0; len]),
            ElementType::Float64 => Buffer::Float64(vec![0.0; len]),
        }
    }

    /// Wraps typed values.
    pub fn from_values<T: Element>(values: Vec<T>) -> Self {
        T::into_buffer(values)
    }

    /// Builds a buffer of `element_type` from `f64` values.
    pub fn from_f64(element_type: ElementType, values: &[f64]) -> Self {
        match element_type {
            ElementType::Bool => Buffer::Bool(convert(values)),
            ElementType::Int32 => Buffer::Int32(convert(values)),
            ElementType::Int64 => Buffer::Int64(convert(values)),
            ElementType::Float32 => Buffer::Float32(convert(values)),
            ElementType::Float64 => Buffer::Float64(values.to_vec()),
        }
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Buffer::Bool(_) => ElementType::Bool,
            Buffer::Int32(_) => ElementType::Int32,
            Buffer::Int64(_) => ElementType::Int64,
            Buffer::Float32(_) => ElementType::Float32,
            Buffer::Float64(_) => ElementType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Buffer::Bool(v) => v.len(),
            Buffer::Int32(v) => v.len(),
            Buffer::Int64(v) => v.len(),
            Buffer::Float32(v) => v.len(),
            Buffer::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows the values as `T`, failing if the element type differs.
    pub fn as_slice<T: Element>(&self) -> Result<&[T], TensorError> {
        T::as_slice(self).ok_or(TensorError::TypeMismatch {
            op: "as_slice",
            expected: T::TYPE,
            actual: self.element_type(),
        })
    }

    /// Copies the values out as `T`, converting between element types.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        if let Some(values) = T::as_slice(self) {
            return values.to_vec();
        }
        self.to_f64_vec().into_iter().map(T::from_f64).collect()
    }

    /// Copies the values out as `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Buffer::Bool(v) => v.iter().map(|&x| x.to_f64()).collect(),
            Buffer::Int32(v) => v.iter().map(|&x| x as f64).collect(),
            Buffer::Int64(v) => v.iter().map(|&x| x as f64).collect(),
            Buffer::Float32(v) => v.iter().map(|&x| x as f64).collect(),
            Buffer::Float64(v) => v.clone(),
        }
    }

    /// Returns a copy of `[offset, offset + length)`.
    pub fn slice(&self, offset: usize, length: usize) -> Result<Buffer, TensorError> {
        let len = self.len();
        let end = offset.checked_add(length).filter(|&end| end <= len).ok_or(
            TensorError::OutOfRange {
                offset,
                length,
                len,
            },
        )?;
        Ok(match self {
            Buffer::Bool(v) => Buffer::Bool(v[offset..end].to_vec()),
            Buffer::Int32(v) => Buffer::Int32(v[offset..end].to_vec()),
            Buffer::Int64(v) => Buffer::Int64(v[offset..end].to_vec()),
            Buffer::Float32(v) => Buffer::Float32(v[offset..end].to_vec()),
            Buffer::Float64(v) => Buffer::Float64(v[offset..end].to_vec()),
        })
    }

    /// Appends `other`, which must hold the same element type.
    pub fn extend_from(&mut self, other: &Buffer) -> Result<(), TensorError> {
        match (self, other) {
            (Buffer::Bool(a), Buffer::Bool(b)) => a.extend_from_slice(b),
            (Buffer::Int32(a), Buffer::Int32(b)) => a.extend_from_slice(b),
            (Buffer::Int64(a), Buffer::Int64(b)) => a.extend_from_slice(b),
            (Buffer::Float32(a), Buffer::Float32(b)) => a.extend_from_slice(b),
            (Buffer::Float64(a), Buffer::Float64(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(TensorError::TypeMismatch {
                    op: "extend_from",
                    expected: a.element_type(),
                    actual: b.element_type(),
                })
            }
        }
        Ok(())
    }

    /// Converts to `element_type`, copying only when the type changes.
    pub fn cast(self, element_type: ElementType) -> Buffer {
        if self.element_type() == element_type {
            return self;
        }
        Buffer::from_f64(element_type, &self.to_f64_vec())
    }
}

fn convert<T: Element>(values: &[f64]) -> Vec<T> {
    values.iter().map(|&v| T::from_f64(v)).collect()
}
