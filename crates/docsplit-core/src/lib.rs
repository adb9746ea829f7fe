//! docsplit-core - Core types and traits for docsplit
//!
//! This crate provides the splitter configuration, the error type, and the
//! traits that connect the splitter to the embedding and storage
//! collaborators of the ingestion service.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::{DocsplitError, Result};
pub use traits::*;
pub use types::*;
