// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Port element types.

use crate::Buffer;
use std::fmt;

/// Enumerates the element types a port can carry.
///
/// The type decides which [`Buffer`] variant flows through a port and which
/// Rust scalar a typed compute entry point converts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
}

impl ElementType {
    /// Size of a single element in bytes, as laid out by emitted code.
    pub fn size_bytes(self) -> usize {
        match self {
            ElementType::Bool => 1,
            ElementType::Int32 | ElementType::Float32 => 4,
            ElementType::Int64 | ElementType::Float64 => 8,
        }
    }

    /// Name used inside node type names, e.g. `InputNode<float>`.
    pub fn type_name(self) -> &'static str {
        match self {
            ElementType::Bool => "bool",
            ElementType::Int32 => "int",
            ElementType::Int64 => "int64",
            ElementType::Float32 => "float",
            ElementType::Float64 => "double",
        }
    }

    /// C spelling of the type, used by source emission.
    pub fn c_type(self) -> &'static str {
        match self {
            ElementType::Bool => "bool",
            ElementType::Int32 => "int32_t",
            ElementType::Int64 => "int64_t",
            ElementType::Float32 => "float",
            ElementType::Float64 => "double",
        }
    }

    /// Returns `true` for `Float32` and `Float64`.
    pub fn is_floating_point(self) -> bool {
        matches!(self, ElementType::Float32 | ElementType::Float64)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A Rust scalar that can travel through a port.
///
/// Conversions between element types go through `f64`; `bool` maps to
/// `0.0` / `1.0` and back via `!= 0.0`.
pub trait Element: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The port element type this scalar corresponds to.
    const TYPE: ElementType;

    fn from_f64(value: f64) -> Self;

    fn to_f64(self) -> f64;

    /// Wraps owned values in the matching [`Buffer`] variant.
    fn into_buffer(values: Vec<Self>) -> Buffer;

    /// Borrows the values of `buffer` if it holds this element type.
    fn as_slice(buffer: &Buffer) -> Option<&[Self]>;
}

macro_rules! impl_numeric_element {
    ($ty:ty, $variant:ident) => {
        impl Element for $ty {
            const TYPE: ElementType = ElementType::$variant;

            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn into_buffer(values: Vec<Self>) -> Buffer {
                Buffer::$variant(values)
            }

            fn as_slice(buffer: &Buffer) -> Option<&[Self]> {
                match buffer {
                    Buffer::$variant(values) => Some(values),
                    _ => None,
                }
            }
        }
    };
}

impl_numeric_element!(i32, Int32);
impl_numeric_element!(i64, Int64);
impl_numeric_element!(f32, Float32);
impl_numeric_element!(f64, Float64);

impl Element for bool {
    const TYPE: ElementType = ElementType::Bool;

    fn from_f64(value: f64) -> Self {
        value != 0.0
    }

    fn to_f64(self) -> f64 {
        if self {
            1.0
        } else {
            0.0
        }
    }

    fn into_buffer(values: Vec<Self>) -> Buffer {
        Buffer::Bool(values)
    }

    fn as_slice(buffer: &Buffer) -> Option<&[Self]> {
        match buffer {
            Buffer::Bool(values) => Some(values),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(ElementType::Float32.type_name(), "float");
        assert_eq!(ElementType::Float64.type_name(), "double");
        assert_eq!(format!("{}", ElementType::Int64), "int64");
    }

    #[test]
    fn test_size_bytes() {
        assert_eq!(ElementType::Bool.size_bytes(), 1);
        assert_eq!(ElementType::Int32.size_bytes(), 4);
        assert_eq!(ElementType::Float64.size_bytes(), 8);
    }

    #[test]
    fn test_bool_conversion() {
        assert!(bool::from_f64(2.5));
        assert!(!bool::from_f64(0.0));
        assert_eq!(true.to_f64(), 1.0);
    }

    #[test]
    fn test_element_type_constants() {
        assert_eq!(<f32 as Element>::TYPE, ElementType::Float32);
        assert_eq!(<i64 as Element>::TYPE, ElementType::Int64);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ElementType::Float64).unwrap();
        assert_eq!(json, "\"float64\"");
    }
}
