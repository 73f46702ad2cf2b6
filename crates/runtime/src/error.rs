// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for maps, archives and compilation.

use model_ir::ModelError;

/// Errors that can occur when building, transforming, archiving or
/// compiling a [`Map`](crate::Map).
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The caller broke an API contract (e.g. a non-full-port output or a
    /// duplicate input name).
    #[error("contract violation: {0}")]
    ContractViolation(String),

    /// An input/output/sink index or name does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// An archive parsed but does not describe a consistent map.
    #[error("corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("archive version {version} is not readable (supported {min}..={max})")]
    UnsupportedArchiveVersion { version: u32, min: u32, max: u32 },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Graph construction, transformation or evaluation failed.
    #[error("model error: {0}")]
    ModelError(#[from] ModelError),
}

/// Coarse classification of a [`RuntimeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ContractViolation,
    InvalidReference,
    /// A node was asked for a capability it does not have.
    Unsupported,
    /// The graph itself is broken (cycle, dangling edge).
    Structural,
    Archive,
    Config,
}

impl RuntimeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::ContractViolation(_) => ErrorKind::ContractViolation,
            RuntimeError::InvalidReference(_) => ErrorKind::InvalidReference,
            RuntimeError::CorruptArchive(_)
            | RuntimeError::UnsupportedArchiveVersion { .. }
            | RuntimeError::Io(_)
            | RuntimeError::Json(_) => ErrorKind::Archive,
            RuntimeError::ConfigError(_) => ErrorKind::Config,
            RuntimeError::ModelError(e) => model_error_kind(e),
        }
    }
}

fn model_error_kind(error: &ModelError) -> ErrorKind {
    match error {
        ModelError::InvalidReference(_) => ErrorKind::InvalidReference,
        ModelError::Unsupported { .. } | ModelError::Emit(emitter::EmitError::UnsupportedType(_)) => {
            ErrorKind::Unsupported
        }
        ModelError::InvalidGraph(_) => ErrorKind::Structural,
        ModelError::ContractViolation(_)
        | ModelError::TypeMismatch { .. }
        | ModelError::Tensor(_)
        | ModelError::Emit(_) => ErrorKind::ContractViolation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model_ir::Capability;

    #[test]
    fn test_kind_of_model_errors() {
        let e: RuntimeError = ModelError::Unsupported {
            node: "ConvolutionNode<float>".into(),
            capability: Capability::Compute,
        }
        .into();
        assert_eq!(e.kind(), ErrorKind::Unsupported);

        let e: RuntimeError = ModelError::InvalidGraph("cycle".into()).into();
        assert_eq!(e.kind(), ErrorKind::Structural);

        let e: RuntimeError = ModelError::InvalidReference("#9".into()).into();
        assert_eq!(e.kind(), ErrorKind::InvalidReference);
    }

    #[test]
    fn test_kind_of_archive_errors() {
        let e = RuntimeError::UnsupportedArchiveVersion {
            version: 9,
            min: 2,
            max: 3,
        };
        assert_eq!(e.kind(), ErrorKind::Archive);
        assert!(e.to_string().contains("2..=3"));
    }
}
