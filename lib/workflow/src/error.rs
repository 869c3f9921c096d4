//! Error types for the workflow crate.
//!
//! Only the document boundaries can fail: parsing a workflow document and
//! loading a node-type catalog. Validation, reachability, diff and layout
//! never return errors; they report problems as data or degrade gracefully.
//!
//! Errors are returned wrapped in a rootcause `Report` so callers can add
//! their own context as they propagate.

use std::fmt;

/// Errors from reading or writing a workflow DSL document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The document is not valid JSON or does not match the document shape.
    Parse { details: String },
    /// The document could not be serialized.
    Serialize { details: String },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { details } => write!(f, "invalid workflow document: {details}"),
            Self::Serialize { details } => {
                write!(f, "failed to serialize workflow document: {details}")
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// Errors from loading a node-type catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog is not valid JSON or does not match the catalog shape.
    Parse { details: String },
    /// The same type key is declared more than once.
    DuplicateType { node_type: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { details } => write!(f, "invalid node-type catalog: {details}"),
            Self::DuplicateType { node_type } => {
                write!(f, "node type '{node_type}' is declared more than once")
            }
        }
    }
}

impl std::error::Error for CatalogError {}
