//! Core traits defining the seams between the splitter and its collaborators.

use async_trait::async_trait;
use ulid::Ulid;

use crate::error::Result;
use crate::types::{ChunkRecord, SplitConfig};

/// Text splitting strategy.
///
/// Implementations are pure: the same text and config always produce the
/// same chunks, and no state is kept between calls.
pub trait Splitter: Send + Sync {
    /// Split text into ordered chunks.
    ///
    /// Fails with a configuration error before doing any work if `config`
    /// is invalid.
    ///
    /// An empty `text` yields no chunks. With `strip_whitespace` set (the
    /// default) chunks are trimmed and those left empty are dropped, so a
    /// whitespace-only document also yields no chunks. With it unset, any
    /// non-empty document yields at least one chunk.
    fn split(&self, text: &str, config: &SplitConfig) -> Result<Vec<String>>;

    /// Length of `text` as this splitter measures it.
    fn length(&self, text: &str) -> usize {
        text.chars().count()
    }
}

/// Embedding collaborator.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of chunk texts, one vector per text, in order.
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;
}

/// Storage collaborator for chunk rows.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Insert all rows of one document.
    async fn insert_chunks(&self, records: &[ChunkRecord]) -> Result<()>;

    /// Get the rows of a document ordered by chunk index.
    async fn get_chunks_for_document(&self, document_id: Ulid) -> Result<Vec<ChunkRecord>>;
}
