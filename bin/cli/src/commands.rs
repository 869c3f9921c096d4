//! Command implementations.
//!
//! Each command loads its inputs, runs one engine operation and renders the
//! result as pretty-printed JSON. Rendering to stdout and choosing the exit
//! code is left to the caller.

use crate::config::{EngineConfig, Limits};
use crate::error::CliError;
use flowstudio_core::Result;
use flowstudio_workflow::{
    Direction, Mode, StaticCatalog, Validator, WorkflowGraph, diff, layout, upstream_of,
    variable_candidates,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Rendered result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// JSON written to stdout.
    pub json: String,
    /// False when the command ran but the result is a failure, such as an
    /// invalid workflow.
    pub success: bool,
}

/// Configuration and catalog shared by all commands.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    catalog: StaticCatalog,
}

impl Engine {
    /// Builds an engine, loading the catalog from `catalog_override` or the
    /// configured path, falling back to the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if a catalog file is unreadable or malformed.
    pub fn new(config: EngineConfig, catalog_override: Option<&Path>) -> Result<Self, CliError> {
        let catalog_path = catalog_override
            .map(Path::to_path_buf)
            .or_else(|| config.catalog_path.clone());

        let catalog = match catalog_path {
            Some(path) => {
                let text = read(&path)?;
                let catalog =
                    StaticCatalog::from_json(&text).map_err(|report| CliError::Catalog {
                        path: path.clone(),
                        details: report.to_string(),
                    })?;
                info!(path = %path.display(), types = catalog.len(), "loaded node-type catalog");
                catalog
            }
            None => StaticCatalog::builtin(),
        };

        Ok(Self { config, catalog })
    }

    /// Validates a document against `mode`, or its declared mode.
    ///
    /// The outcome fails when the report holds errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    #[instrument(skip(self))]
    pub fn validate(&self, path: &Path, mode: Option<Mode>) -> Result<Outcome, CliError> {
        let graph = self.load(path)?;
        let mode = mode.unwrap_or(graph.mode);
        let report = Validator::new(&self.catalog, &self.config.validation).validate(&graph, mode);
        Ok(Outcome {
            json: render(&report)?,
            success: report.is_valid(),
        })
    }

    /// Lists the nodes upstream of `node_id`, or the variable candidates
    /// among them when `with_outputs` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    #[instrument(skip(self))]
    pub fn upstream(&self, path: &Path, node_id: &str, with_outputs: bool) -> Result<Outcome, CliError> {
        let graph = self.load(path)?;
        if graph.index().node_by_id(node_id).is_none() {
            warn!(node_id, "node not found in workflow");
        }

        let json = if with_outputs {
            render(&variable_candidates(&graph, node_id, &self.catalog))?
        } else {
            render(&upstream_of(&graph, node_id))?
        };
        Ok(Outcome {
            json,
            success: true,
        })
    }

    /// Diffs two documents.
    ///
    /// # Errors
    ///
    /// Returns an error if either document cannot be loaded.
    #[instrument(skip(self))]
    pub fn diff(&self, base: &Path, target: &Path) -> Result<Outcome, CliError> {
        let base = self.load(base)?;
        let target = self.load(target)?;
        let result = diff(&base, &target);
        debug!(changed = result.stats.has_changes(), "diff computed");
        Ok(Outcome {
            json: render(&result)?,
            success: true,
        })
    }

    /// Lays a document out.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    #[instrument(skip(self))]
    pub fn layout(&self, path: &Path, direction: Direction) -> Result<Outcome, CliError> {
        let graph = self.load(path)?;
        let laid_out = layout(&graph, direction, &self.config.layout);
        Ok(Outcome {
            json: render(&laid_out)?,
            success: true,
        })
    }

    fn load(&self, path: &Path) -> Result<WorkflowGraph, CliError> {
        let text = read(path)?;
        let graph = WorkflowGraph::from_json(&text).map_err(|report| CliError::Document {
            path: path.to_path_buf(),
            details: report.to_string(),
        })?;
        check_limits(path, &graph, self.config.limits)?;
        debug!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "loaded workflow"
        );
        Ok(graph)
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    let text = fs::read_to_string(path).map_err(|e| CliError::ReadFile {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    Ok(text)
}

fn check_limits(path: &Path, graph: &WorkflowGraph, limits: Limits) -> Result<(), CliError> {
    let exceeded = |what: &'static str, count: usize, limit: usize| CliError::LimitExceeded {
        path: PathBuf::from(path),
        what,
        count,
        limit,
    };
    if graph.node_count() > limits.max_nodes {
        return Err(exceeded("nodes", graph.node_count(), limits.max_nodes).into());
    }
    if graph.edge_count() > limits.max_edges {
        return Err(exceeded("edges", graph.edge_count(), limits.max_edges).into());
    }
    Ok(())
}

fn render<T: Serialize>(value: &T) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::Output {
        details: e.to_string(),
    })?;
    Ok(json)
}
