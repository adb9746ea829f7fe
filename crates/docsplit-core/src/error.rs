//! Error types for docsplit.

use thiserror::Error;

/// Result type alias using DocsplitError.
pub type Result<T> = std::result::Result<T, DocsplitError>;

/// Errors that can occur while splitting or ingesting a document.
///
/// Only [`DocsplitError::Config`] can originate in the splitter itself. The
/// remaining variants belong to the ingestion glue around it.
#[derive(Error, Debug)]
pub enum DocsplitError {
    /// Invalid splitter or file configuration.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid argument provided.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Embedding collaborator failed.
    #[error("Embedding error: {message}")]
    Embedding { message: String },

    /// Embedding collaborator returned the wrong number of vectors.
    #[error("Embedding count mismatch: expected {expected} embeddings, got {actual}")]
    EmbeddingCountMismatch { expected: usize, actual: usize },

    /// Storage collaborator failed.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocsplitError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// Get a stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "CONFIG_ERROR",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Embedding { .. } => "EMBEDDING_ERROR",
            Self::EmbeddingCountMismatch { .. } => "EMBEDDING_COUNT_MISMATCH",
            Self::Storage { .. } => "STORAGE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
