//! Engine configuration.
//!
//! Loaded via the `config` crate from an optional file followed by
//! environment variables prefixed with `FLOWSTUDIO`, using `__` as the
//! nesting separator (`FLOWSTUDIO__LIMITS__MAX_NODES=200`). Every field has
//! a default, so no source is required.

use flowstudio_workflow::{LayoutOptions, ValidationOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration for one CLI invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Layout spacing.
    #[serde(default)]
    pub layout: LayoutOptions,

    /// Tunable validation rules.
    #[serde(default)]
    pub validation: ValidationOptions,

    /// Document size limits enforced before the engine runs.
    #[serde(default)]
    pub limits: Limits,

    /// Node-type catalog file. The built-in catalog is used when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

/// Upper bounds on document size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Limits {
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    #[serde(default = "default_max_edges")]
    pub max_edges: usize,
}

fn default_max_nodes() -> usize {
    1000
}

fn default_max_edges() -> usize {
    5000
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            max_edges: default_max_edges(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from an optional file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or a value has the wrong type.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }
        builder
            .add_source(
                config::Environment::with_prefix("FLOWSTUDIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
