//! Error types for the command line driver.

use std::fmt;
use std::path::PathBuf;

/// Errors that stop a command before or after the engine runs.
#[derive(Debug)]
pub enum CliError {
    /// An input file could not be read.
    ReadFile { path: PathBuf, details: String },
    /// Configuration sources could not be merged or deserialized.
    Config { details: String },
    /// A workflow document did not parse.
    Document { path: PathBuf, details: String },
    /// A node-type catalog did not parse.
    Catalog { path: PathBuf, details: String },
    /// A document exceeds the configured size limits.
    LimitExceeded {
        path: PathBuf,
        what: &'static str,
        count: usize,
        limit: usize,
    },
    /// A result could not be written as JSON.
    Output { details: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFile { path, details } => {
                write!(f, "failed to read '{}': {}", path.display(), details)
            }
            Self::Config { details } => write!(f, "invalid configuration: {details}"),
            Self::Document { path, details } => {
                write!(f, "failed to load workflow '{}': {}", path.display(), details)
            }
            Self::Catalog { path, details } => {
                write!(f, "failed to load catalog '{}': {}", path.display(), details)
            }
            Self::LimitExceeded {
                path,
                what,
                count,
                limit,
            } => write!(
                f,
                "workflow '{}' has {count} {what}, limit is {limit}",
                path.display()
            ),
            Self::Output { details } => write!(f, "failed to write output: {details}"),
        }
    }
}

impl std::error::Error for CliError {}
