//! Core domain types and utilities for flowstudio.
//!
//! This crate provides the identifier types and error handling foundation
//! shared by the workflow DSL engine and its command line driver.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{EdgeId, NodeId, ParseIdError, WorkflowId};
