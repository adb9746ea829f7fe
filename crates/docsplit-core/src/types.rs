//! Core domain types for docsplit.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{DocsplitError, Result};

/// Separators used by the deployed ingestion service, highest priority first.
pub const INGEST_SEPARATORS: &[&str] = &["\n\n", "\n", ".", "!", "?", " ", ""];

/// Paragraph, line, word, character.
pub const PROSE_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Where a matched separator ends up after a split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepSeparator {
    /// The separator is consumed; pieces are re-joined with it when packed.
    #[default]
    Discard,
    /// The separator stays attached to the start of the following piece.
    Start,
    /// The separator stays attached to the end of the preceding piece.
    End,
}

impl std::str::FromStr for KeepSeparator {
    type Err = DocsplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "discard" | "none" | "false" => Ok(Self::Discard),
            "start" | "true" => Ok(Self::Start),
            "end" => Ok(Self::End),
            other => Err(DocsplitError::invalid_argument(format!(
                "unknown separator placement '{}', expected discard, start or end",
                other
            ))),
        }
    }
}

/// Splitter configuration.
///
/// Lengths are measured by the splitter's length function, which counts
/// characters unless a custom one is injected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Maximum chunk length.
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Target length of the tail of one chunk repeated at the start of the next.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Separators in priority order. The last one must be `""`.
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,

    /// Where matched separators are kept.
    #[serde(default = "default_keep_separator")]
    pub keep_separator: KeepSeparator,

    /// Trim whitespace around each emitted chunk.
    #[serde(default = "default_true")]
    pub strip_whitespace: bool,
}

impl SplitConfig {
    /// Create a config with prose separators and discarded separators.
    pub fn new(max_chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            max_chunk_size,
            chunk_overlap,
            separators: to_owned(PROSE_SEPARATORS),
            keep_separator: KeepSeparator::Discard,
            strip_whitespace: true,
        }
    }

    /// The settings of the deployed ingestion service.
    pub fn ingest() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            separators: default_separators(),
            keep_separator: default_keep_separator(),
            strip_whitespace: true,
        }
    }

    /// Replace the separator list.
    pub fn with_separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Set where matched separators are kept.
    pub fn with_keep_separator(mut self, keep: KeepSeparator) -> Self {
        self.keep_separator = keep;
        self
    }

    /// Enable or disable whitespace trimming of chunks.
    pub fn with_strip_whitespace(mut self, strip: bool) -> Self {
        self.strip_whitespace = strip;
        self
    }

    /// Check the invariants the splitter relies on for termination.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(DocsplitError::config("max_chunk_size must be greater than 0"));
        }

        if self.chunk_overlap >= self.max_chunk_size {
            return Err(DocsplitError::config(format!(
                "chunk_overlap ({}) must be less than max_chunk_size ({})",
                self.chunk_overlap, self.max_chunk_size
            )));
        }

        match self.separators.split_last() {
            None => Err(DocsplitError::config("separators must not be empty")),
            Some((last, _)) if !last.is_empty() => Err(DocsplitError::config(
                "separators must end with the empty-string fallback",
            )),
            Some((_, rest)) if rest.iter().any(String::is_empty) => Err(DocsplitError::config(
                "the empty-string fallback must be the last separator",
            )),
            Some(_) => Ok(()),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self::ingest()
    }
}

fn default_max_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_separators() -> Vec<String> {
    to_owned(INGEST_SEPARATORS)
}

fn default_keep_separator() -> KeepSeparator {
    KeepSeparator::Start
}

fn default_true() -> bool {
    true
}

fn to_owned(separators: &[&str]) -> Vec<String> {
    separators.iter().map(|s| s.to_string()).collect()
}

/// Content type of a document, determines the separator preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    PlainText,
    Markdown,
    Code,
    Data,
    Unknown,
}

impl ContentType {
    /// Detect content type from file extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" | "text" | "log" => Self::PlainText,
            "md" | "markdown" | "mdx" => Self::Markdown,
            "rs" | "py" | "pyi" | "ts" | "tsx" | "js" | "jsx" | "mjs" | "go" | "java" | "c"
            | "h" | "cpp" | "cc" | "hpp" | "rb" => Self::Code,
            "json" | "yaml" | "yml" | "toml" | "csv" => Self::Data,
            _ => Self::Unknown,
        }
    }

    /// Detect content type from file path.
    pub fn from_path(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => {
                Self::from_extension(ext)
            }
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PlainText => "Plain Text",
            Self::Markdown => "Markdown",
            Self::Code => "Code",
            Self::Data => "Data",
            Self::Unknown => "Unknown",
        };
        write!(f, "{}", s)
    }
}

/// One row handed to the storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Document this chunk was split from.
    pub document_id: Ulid,

    /// Position in the splitter's output (0-based).
    pub chunk_index: u32,

    /// Chunk text.
    pub chunk_text: String,

    /// Embedding of `chunk_text`.
    pub embedding: Vec<f32>,

    /// Blake3 hash of `chunk_text`.
    #[serde(with = "serde_hash")]
    pub content_hash: [u8; 32],
}

impl ChunkRecord {
    /// Create a new record, hashing the chunk text.
    pub fn new(document_id: Ulid, chunk_index: u32, chunk_text: &str, embedding: Vec<f32>) -> Self {
        Self {
            document_id,
            chunk_index,
            chunk_text: chunk_text.to_string(),
            embedding,
            content_hash: *blake3::hash(chunk_text.as_bytes()).as_bytes(),
        }
    }
}

/// Summary of one ingested document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Identifier assigned to the document.
    pub document_id: Ulid,

    /// Number of chunks embedded and stored.
    pub chunks_processed: usize,

    /// Chunks longer than the configured maximum (indivisible units).
    pub oversized_chunks: usize,

    /// Wall-clock time spent, in milliseconds.
    pub latency_ms: u64,
}

/// Hex (de)serialization for 32-byte hashes.
mod serde_hash {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        hex::encode(value).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        let bytes = hex::decode(&hex).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("invalid hash length"))
    }
}
