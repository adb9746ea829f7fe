//! docsplit-ingest - Ingestion pipeline
//!
//! Splits a document, hands the chunks to an [`Embedder`] and writes one
//! [`ChunkRecord`] per chunk to a [`ChunkStore`]. Transport and real
//! backends live outside this workspace; [`MockEmbedder`] and
//! [`MemoryStore`] are deterministic in-process stand-ins.

mod memory;
mod pipeline;

pub use memory::{MemoryStore, MockEmbedder};
pub use pipeline::IngestPipeline;

// Re-export the collaborator traits for convenience
pub use docsplit_core::{ChunkRecord, ChunkStore, Embedder, IngestReport};
