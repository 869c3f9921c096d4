//! Structural engine for the flowstudio workflow DSL.
//!
//! A workflow is a JSON document of nodes and edges that a visual editor
//! mutates freely. This crate never executes it; it answers structural
//! questions about it:
//!
//! - **Graph Model**: [`WorkflowGraph`], [`Node`] and [`Edge`], with a
//!   petgraph-backed [`GraphIndex`] built per operation
//! - **Validation**: mode-aware rules for `LINEAR`, `DAG` and `DEBATE`
//!   workflows, including cycle detection
//! - **Reachability**: which nodes can run before a given node, and which
//!   of their outputs are selectable as variables
//! - **Diff**: a merged, annotated view of two versions of a workflow
//! - **Layout**: deterministic hierarchical positions for every node
//!
//! Node-type knowledge lives in a [`NodeTypeCatalog`] that callers pass in.

pub mod catalog;
pub mod definition;
pub mod diff;
pub mod edge;
pub mod error;
pub mod graph;
pub mod layout;
pub mod node;
pub mod reachability;
pub mod validation;

pub use catalog::{NodeCategory, NodeTypeCatalog, NodeTypeSpec, OutputField, StaticCatalog};
pub use definition::{Mode, WorkflowGraph};
pub use diff::{DiffResult, DiffStats, NodeChange, NodeField, diff};
pub use edge::{Edge, EdgeType};
pub use error::{CatalogError, DocumentError};
pub use flowstudio_core::{EdgeId, NodeId, WorkflowId};
pub use graph::GraphIndex;
pub use layout::{Direction, LayoutOptions, layout};
pub use node::{DiffStatus, Node, NodeConfig, Position};
pub use reachability::{UpstreamNode, VariableSource, upstream_of, variable_candidates};
pub use validation::{
    Issue, IssueCategory, IssueCode, Severity, ValidationOptions, ValidationReport, Validator,
    validate,
};
