// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! On-disk form of a [`Map`](crate::Map).
//!
//! ```text
//! {
//!   "version": 3,
//!   "model": { "nodes": [...] },
//!   "inputNames": ["x"],
//!   "inputIds": [0],
//!   "outputNames": ["y"],
//!   "outputElements": [[{"node": 3, "port": "output", "offset": 0, "length": 16}]],
//!   "metadata": { "author": "..." }
//! }
//! ```
//!
//! `metadata` is only written by version 3 archives.

use crate::RuntimeError;
use model_ir::{ModelArchive, NodeId, PortElements};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Archive schema versions this crate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArchiveVersion {
    /// Model, inputs and outputs.
    V2 = 2,
    /// Adds the metadata section.
    V3ModelMetadata = 3,
}

impl ArchiveVersion {
    pub const MIN: ArchiveVersion = ArchiveVersion::V2;
    pub const MAX: ArchiveVersion = ArchiveVersion::V3ModelMetadata;

    pub fn number(self) -> u32 {
        self as u32
    }

    /// `true` if a reader of this crate accepts `version`.
    pub fn can_read(version: u32) -> bool {
        (Self::MIN.number()..=Self::MAX.number()).contains(&version)
    }

    /// Fails with [`RuntimeError::UnsupportedArchiveVersion`] unless
    /// [`can_read`](Self::can_read) accepts `version`.
    pub fn check_readable(version: u32) -> Result<(), RuntimeError> {
        if Self::can_read(version) {
            return Ok(());
        }
        Err(RuntimeError::UnsupportedArchiveVersion {
            version,
            min: Self::MIN.number(),
            max: Self::MAX.number(),
        })
    }
}

impl TryFrom<u32> for ArchiveVersion {
    type Error = RuntimeError;

    fn try_from(version: u32) -> Result<Self, Self::Error> {
        Self::check_readable(version)?;
        if version == ArchiveVersion::V2.number() {
            Ok(ArchiveVersion::V2)
        } else {
            Ok(ArchiveVersion::V3ModelMetadata)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapArchive {
    pub version: u32,
    pub model: ModelArchive,
    pub input_names: Vec<String>,
    pub input_ids: Vec<NodeId>,
    pub output_names: Vec<String>,
    pub output_elements: Vec<PortElements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_read() {
        assert!(!ArchiveVersion::can_read(1));
        assert!(ArchiveVersion::can_read(2));
        assert!(ArchiveVersion::can_read(3));
        assert!(!ArchiveVersion::can_read(4));
    }

    #[test]
    fn test_try_from() {
        assert_eq!(ArchiveVersion::try_from(3).unwrap(), ArchiveVersion::V3ModelMetadata);
        assert!(matches!(
            ArchiveVersion::try_from(7),
            Err(RuntimeError::UnsupportedArchiveVersion { version: 7, min: 2, max: 3 })
        ));
    }

    #[test]
    fn test_keys_are_camel_case() {
        let archive = MapArchive {
            version: 2,
            model: ModelArchive { nodes: Vec::new() },
            input_names: vec!["x".into()],
            input_ids: Vec::new(),
            output_names: Vec::new(),
            output_elements: Vec::new(),
            metadata: None,
        };
        let json = serde_json::to_value(&archive).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert!(keys.contains(&"inputNames"));
        assert!(keys.contains(&"outputElements"));
        assert!(!keys.contains(&"metadata"));
    }
}
