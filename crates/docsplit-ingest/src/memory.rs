//! In-process collaborators for dry runs and tests.

use async_trait::async_trait;
use tokio::sync::RwLock;
use ulid::Ulid;

use docsplit_core::{ChunkRecord, ChunkStore, Embedder, Result};

/// Mock embedder producing deterministic, L2-normalised vectors.
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    /// Create a mock embedder with the default dimension (768).
    pub fn new() -> Self {
        Self { dimension: 768 }
    }

    /// Create a mock embedder with a custom dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let hash = text_seed(text);
        let mut embedding = vec![0.0f32; self.dimension];
        for (i, v) in embedding.iter_mut().enumerate() {
            *v = ((hash.wrapping_mul(i as u64 + 1)) % 1000) as f32 / 1000.0 - 0.5;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }
        embedding
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

/// FNV-1a over the text bytes.
fn text_seed(text: &str) -> u64 {
    text.bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |acc, b| (acc ^ b as u64).wrapping_mul(0x100_0000_01b3))
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Chunk store backed by a vector in memory.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<ChunkRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether no rows are stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ChunkStore for MemoryStore {
    async fn insert_chunks(&self, records: &[ChunkRecord]) -> Result<()> {
        self.records.write().await.extend_from_slice(records);
        Ok(())
    }

    async fn get_chunks_for_document(&self, document_id: Ulid) -> Result<Vec<ChunkRecord>> {
        let mut chunks: Vec<ChunkRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.document_id == document_id)
            .cloned()
            .collect();
        chunks.sort_by_key(|r| r.chunk_index);
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embedder() {
        let embedder = MockEmbedder::new();
        assert_eq!(embedder.dimension(), 768);

        let embeddings = embedder
            .embed_documents(&["Hello world", "Rust is great"])
            .await
            .unwrap();

        assert_eq!(embeddings.len(), 2);
        assert_eq!(embeddings[0].len(), 768);

        // Check L2 normalization
        let norm: f32 = embeddings[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_deterministic_embeddings() {
        let embedder = MockEmbedder::with_dimension(16);

        let e1 = embedder.embed_documents(&["consistent input"]).await.unwrap();
        let e2 = embedder.embed_documents(&["consistent input"]).await.unwrap();
        assert_eq!(e1, e2);

        let other = embedder.embed_documents(&["different input"]).await.unwrap();
        assert_ne!(e1, other);
    }

    #[tokio::test]
    async fn test_memory_store_filters_and_orders() {
        let store = MemoryStore::new();
        let doc_a = Ulid::new();
        let doc_b = Ulid::new();

        store
            .insert_chunks(&[
                ChunkRecord::new(doc_a, 1, "second", vec![]),
                ChunkRecord::new(doc_b, 0, "other", vec![]),
                ChunkRecord::new(doc_a, 0, "first", vec![]),
            ])
            .await
            .unwrap();

        assert_eq!(store.len().await, 3);

        let chunks = store.get_chunks_for_document(doc_a).await.unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.chunk_text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);

        assert!(store.get_chunks_for_document(Ulid::new()).await.unwrap().is_empty());
    }
}
