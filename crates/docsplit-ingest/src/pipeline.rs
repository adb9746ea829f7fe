//! Split, embed and store one document.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use ulid::Ulid;

use docsplit_chunk::RecursiveSplitter;
use docsplit_core::{
    ChunkRecord, ChunkStore, DocsplitConfig, DocsplitError, Embedder, IngestReport, Result,
    SplitConfig, Splitter,
};

/// Ingestion pipeline over an embedding and a storage collaborator.
pub struct IngestPipeline<E, S> {
    /// Splitting strategy.
    splitter: Box<dyn Splitter>,

    /// Splitter configuration, validated at construction.
    split_config: SplitConfig,

    /// Maximum chunks per embedding request (None = all at once).
    embed_batch_size: Option<usize>,

    /// Embedding collaborator.
    embedder: Arc<E>,

    /// Storage collaborator.
    store: Arc<S>,
}

impl<E, S> IngestPipeline<E, S>
where
    E: Embedder,
    S: ChunkStore,
{
    /// Create a pipeline with a character-counting recursive splitter.
    pub fn new(embedder: Arc<E>, store: Arc<S>, config: &DocsplitConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            splitter: Box::new(RecursiveSplitter::new()),
            split_config: config.splitter.clone(),
            embed_batch_size: config.ingest.embed_batch_size,
            embedder,
            store,
        })
    }

    /// Replace the splitting strategy.
    pub fn with_splitter(mut self, splitter: impl Splitter + 'static) -> Self {
        self.splitter = Box::new(splitter);
        self
    }

    /// Ingest one document.
    ///
    /// Chunk `i` of the splitter's output is stored with `chunk_index = i`.
    /// Nothing is stored if splitting or embedding fails.
    pub async fn ingest(&self, document: &str) -> Result<IngestReport> {
        let start = Instant::now();
        let document_id = Ulid::new();

        let chunks = self.splitter.split(document, &self.split_config)?;

        let max = self.split_config.max_chunk_size;
        let oversized_chunks = chunks
            .iter()
            .filter(|c| self.splitter.length(c) > max)
            .count();
        if oversized_chunks > 0 {
            warn!(
                document_id = %document_id,
                oversized_chunks,
                max_chunk_size = max,
                "Document contains units longer than the maximum chunk size"
            );
        }

        if chunks.is_empty() {
            debug!(document_id = %document_id, "Empty document, nothing to embed");
            return Ok(IngestReport {
                document_id,
                chunks_processed: 0,
                oversized_chunks: 0,
                latency_ms: start.elapsed().as_millis() as u64,
            });
        }

        let embeddings = self.embed(&chunks).await?;

        let records = chunks
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(idx, (chunk, embedding))| {
                let chunk_index = u32::try_from(idx).map_err(|_| {
                    DocsplitError::invalid_argument(format!("chunk index {} out of range", idx))
                })?;
                Ok(ChunkRecord::new(document_id, chunk_index, chunk, embedding))
            })
            .collect::<Result<Vec<_>>>()?;

        self.store.insert_chunks(&records).await?;

        let latency_ms = start.elapsed().as_millis() as u64;
        info!(
            document_id = %document_id,
            chunks = records.len(),
            latency_ms,
            "Ingested document"
        );

        Ok(IngestReport {
            document_id,
            chunks_processed: records.len(),
            oversized_chunks,
            latency_ms,
        })
    }

    /// Embed chunks in order, batching if configured.
    async fn embed(&self, chunks: &[String]) -> Result<Vec<Vec<f32>>> {
        let texts: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let batch_size = self.embed_batch_size.unwrap_or(texts.len()).max(1);
        let dimension = self.embedder.dimension();

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(batch_size) {
            debug!(batch = batch.len(), "Embedding chunk batch");
            let batch_embeddings = self.embedder.embed_documents(batch).await?;

            if batch_embeddings.len() != batch.len() {
                return Err(DocsplitError::EmbeddingCountMismatch {
                    expected: batch.len(),
                    actual: batch_embeddings.len(),
                });
            }

            if let Some(bad) = batch_embeddings.iter().find(|e| e.len() != dimension) {
                return Err(DocsplitError::embedding(format!(
                    "expected {}-dimensional embeddings, got {}",
                    dimension,
                    bad.len()
                )));
            }

            embeddings.extend(batch_embeddings);
        }

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, MockEmbedder};
    use async_trait::async_trait;
    use docsplit_chunk::AdaptiveSplitter;
    use docsplit_core::ContentType;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn small_config() -> DocsplitConfig {
        let mut config = DocsplitConfig::default();
        config.splitter = SplitConfig::new(20, 0);
        config.ingest.embedding_dimension = 8;
        config
    }

    fn mock_pipeline(
        config: &DocsplitConfig,
    ) -> (IngestPipeline<MockEmbedder, MemoryStore>, Arc<MemoryStore>) {
        let embedder = Arc::new(MockEmbedder::with_dimension(config.ingest.embedding_dimension));
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestPipeline::new(embedder, store.clone(), config).unwrap();
        (pipeline, store)
    }

    /// Counts calls and returns one vector fewer than asked for.
    struct ShortEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for ShortEmbedder {
        async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![vec![0.0; 4]; texts.len().saturating_sub(1)])
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    /// Claims four dimensions but returns two.
    struct NarrowEmbedder;

    #[async_trait]
    impl Embedder for NarrowEmbedder {
        async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![0.5, 0.5]; texts.len()])
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    /// Records the size of every batch.
    #[derive(Default)]
    struct BatchRecorder {
        batches: std::sync::Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl Embedder for BatchRecorder {
        async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            if let Ok(mut batches) = self.batches.lock() {
                batches.push(texts.len());
            }
            Ok(vec![vec![1.0, 0.0]; texts.len()])
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn test_ingest_stores_chunks_in_order() {
        let config = small_config();
        let (pipeline, store) = mock_pipeline(&config);

        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let report = pipeline.ingest(text).await.unwrap();

        let expected = docsplit_chunk::split(text, &config.splitter).unwrap();
        assert_eq!(report.chunks_processed, expected.len());
        assert_eq!(report.oversized_chunks, 0);

        let records = store.get_chunks_for_document(report.document_id).await.unwrap();
        assert_eq!(records.len(), expected.len());
        for (idx, (record, chunk)) in records.iter().zip(&expected).enumerate() {
            assert_eq!(record.chunk_index as usize, idx);
            assert_eq!(&record.chunk_text, chunk);
            assert_eq!(record.embedding.len(), 8);
            assert_eq!(record.document_id, report.document_id);
        }
    }

    #[tokio::test]
    async fn test_empty_document_touches_no_collaborator() {
        let embedder = Arc::new(ShortEmbedder {
            calls: AtomicUsize::new(0),
        });
        let store = Arc::new(MemoryStore::new());
        let pipeline =
            IngestPipeline::new(embedder.clone(), store.clone(), &small_config()).unwrap();

        let report = pipeline.ingest("").await.unwrap();

        assert_eq!(report.chunks_processed, 0);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_embedding_count_mismatch_stores_nothing() {
        let embedder = Arc::new(ShortEmbedder {
            calls: AtomicUsize::new(0),
        });
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestPipeline::new(embedder, store.clone(), &small_config()).unwrap();

        let err = pipeline
            .ingest("one two three four five six seven eight nine ten")
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "EMBEDDING_COUNT_MISMATCH");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_wrong_dimension_is_embedding_error() {
        let store = Arc::new(MemoryStore::new());
        let pipeline =
            IngestPipeline::new(Arc::new(NarrowEmbedder), store.clone(), &small_config()).unwrap();

        let err = pipeline.ingest("some text").await.unwrap_err();
        assert_eq!(err.error_code(), "EMBEDDING_ERROR");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_batches_respect_batch_size() {
        let mut config = small_config();
        config.splitter = SplitConfig::new(5, 0).with_separators([""]);
        config.ingest.embed_batch_size = Some(2);

        let recorder = Arc::new(BatchRecorder::default());
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestPipeline::new(recorder.clone(), store, &config).unwrap();

        // 25 characters -> 5 chunks -> batches of 2, 2, 1.
        let report = pipeline.ingest(&"abcde".repeat(5)).await.unwrap();
        assert_eq!(report.chunks_processed, 5);

        let batches = recorder.batches.lock().unwrap().clone();
        assert_eq!(batches, vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_at_construction() {
        let mut config = small_config();
        config.splitter.chunk_overlap = config.splitter.max_chunk_size;

        let embedder = Arc::new(MockEmbedder::with_dimension(8));
        let store = Arc::new(MemoryStore::new());
        let err = IngestPipeline::new(embedder, store, &config).err().unwrap();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_custom_splitter_and_oversized_count() {
        let mut config = small_config();
        config.splitter = SplitConfig::new(1, 0).with_separators([""]);

        let embedder = Arc::new(MockEmbedder::with_dimension(8));
        let store = Arc::new(MemoryStore::new());
        let pipeline = IngestPipeline::new(embedder, store, &config)
            .unwrap()
            .with_splitter(AdaptiveSplitter::with_length_function(
                ContentType::PlainText,
                str::len,
            ));

        // Every "ü" is two bytes, longer than the one-byte limit.
        let report = pipeline.ingest("üü").await.unwrap();
        assert_eq!(report.chunks_processed, 2);
        assert_eq!(report.oversized_chunks, 2);
    }

    #[tokio::test]
    async fn test_each_ingest_gets_a_new_document_id() {
        let config = small_config();
        let (pipeline, store) = mock_pipeline(&config);

        let first = pipeline.ingest("same text").await.unwrap();
        let second = pipeline.ingest("same text").await.unwrap();

        assert_ne!(first.document_id, second.document_id);
        assert_eq!(store.len().await, 2);
    }
}
