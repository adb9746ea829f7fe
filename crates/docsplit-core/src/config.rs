//! File configuration for docsplit.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DocsplitError, Result};
use crate::types::SplitConfig;

/// Main configuration, loaded from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocsplitConfig {
    /// Splitter configuration.
    #[serde(default)]
    pub splitter: SplitConfig,

    /// Ingestion configuration.
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Ingestion configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum chunks per embedding request. Unset sends all chunks at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_batch_size: Option<usize>,

    /// Dimension of the vectors produced by the mock embedder.
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            embed_batch_size: None,
            embedding_dimension: default_embedding_dimension(),
        }
    }
}

fn default_embedding_dimension() -> usize {
    768
}

impl DocsplitConfig {
    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| DocsplitError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default paths.
    pub fn load_default() -> Result<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("docsplit").join("config.toml");
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        let local_config = PathBuf::from("docsplit.toml");
        if local_config.exists() {
            return Self::load(&local_config);
        }

        Ok(Self::default())
    }

    /// Validate all sections.
    pub fn validate(&self) -> Result<()> {
        self.splitter.validate()?;
        if self.ingest.embed_batch_size == Some(0) {
            return Err(DocsplitError::config("embed_batch_size must be greater than 0"));
        }
        if self.ingest.embedding_dimension == 0 {
            return Err(DocsplitError::config("embedding_dimension must be greater than 0"));
        }
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| DocsplitError::config(format!("Failed to render config: {}", e)))
    }
}
