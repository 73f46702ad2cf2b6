// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compiler configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! max_refine_iterations = 10
//! contiguous_fast_path = true
//! parallel = true
//! num_threads = 4
//! function_prefix = "ell_map"
//! source_callback_name = "on_input"
//! sink_callback_name = "on_output"
//! ```
//!
//! Every key is optional; missing keys take the [`Default`] values.

use crate::RuntimeError;
use emitter::EmitOptions;
use std::path::Path;

/// Configuration for [`MapCompiler`](crate::MapCompiler).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Refinement pass budget; `0` skips refinement.
    pub max_refine_iterations: usize,
    /// Use whole-row dot products when the input layout allows it.
    pub contiguous_fast_path: bool,
    /// Run the filter loop of emitted routines in parallel.
    pub parallel: bool,
    /// Number of worker threads (defaults to number of online CPU cores).
    pub num_threads: Option<usize>,
    /// Prefix for emitted function names.
    pub function_prefix: String,
    /// Callback name assigned to every source node; empty keeps the existing names.
    pub source_callback_name: String,
    /// Callback name assigned to every sink node; empty keeps the existing names.
    pub sink_callback_name: String,
}

impl CompilerConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RuntimeError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, RuntimeError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| RuntimeError::ConfigError(format!("TOML serialise error: {e}")))
    }

    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.num_threads == Some(0) {
            return Err(RuntimeError::ConfigError("num_threads must be at least 1".into()));
        }
        if self.function_prefix.is_empty()
            || !self
                .function_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            || self.function_prefix.starts_with(|c: char| c.is_ascii_digit())
        {
            return Err(RuntimeError::ConfigError(format!(
                "function_prefix '{}' is not a C identifier",
                self.function_prefix
            )));
        }
        Ok(())
    }

    /// Resolves the number of worker threads.
    pub fn resolve_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            contiguous_fast_path: self.contiguous_fast_path,
            parallel: self.parallel,
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_refine_iterations: 10,
            contiguous_fast_path: true,
            parallel: true,
            num_threads: None,
            function_prefix: "ell_map".to_string(),
            source_callback_name: String::new(),
            sink_callback_name: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = CompilerConfig::default();
        assert_eq!(c.max_refine_iterations, 10);
        assert!(c.contiguous_fast_path);
        assert!(c.parallel);
        assert_eq!(c.function_prefix, "ell_map");
        assert!(c.source_callback_name.is_empty());
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
max_refine_iterations = 3
parallel = false
num_threads = 2
sink_callback_name = "on_output"
"#;
        let c = CompilerConfig::from_toml(toml).unwrap();
        assert_eq!(c.max_refine_iterations, 3);
        assert!(!c.parallel);
        assert!(c.contiguous_fast_path);
        assert_eq!(c.num_threads, Some(2));
        assert_eq!(c.sink_callback_name, "on_output");
        assert_eq!(c.function_prefix, "ell_map");
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = CompilerConfig {
            function_prefix: "net".into(),
            num_threads: Some(3),
            ..Default::default()
        };
        let back = CompilerConfig::from_toml(&c.to_toml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_invalid_prefix() {
        assert!(CompilerConfig::from_toml("function_prefix = \"9lives\"").is_err());
        assert!(CompilerConfig::from_toml("function_prefix = \"a-b\"").is_err());
        assert!(CompilerConfig::from_toml("num_threads = 0").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compiler.toml");
        std::fs::write(&path, "contiguous_fast_path = false\n").unwrap();
        let c = CompilerConfig::from_file(&path).unwrap();
        assert!(!c.emit_options().contiguous_fast_path);
        assert!(c.emit_options().parallel);

        assert!(CompilerConfig::from_file(&dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_resolve_threads() {
        let c = CompilerConfig {
            num_threads: Some(8),
            ..Default::default()
        };
        assert_eq!(c.resolve_threads(), 8);
        assert!(CompilerConfig::default().resolve_threads() >= 1);
    }
}
