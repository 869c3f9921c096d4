//! Command line driver for the flowstudio structural engine.
//!
//! Reads workflow documents from disk, enforces size limits, runs one engine
//! operation and renders its result as JSON.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::{Engine, Outcome};
pub use config::{EngineConfig, Limits};
pub use error::CliError;
