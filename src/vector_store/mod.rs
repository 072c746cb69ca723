//! Vector index abstraction.
//!
//! Two implementations of the same capability: a SQLite-backed
//! [`PersistentIndex`] and a process-local [`InMemoryIndex`] whose per-context
//! stores live in an [`IndexRegistry`]. The backend is chosen once from
//! configuration. Every query is scoped to a single context id.

mod memory;
mod sqlite;

pub use memory::{ContextStore, InMemoryIndex, IndexRegistry};
pub use sqlite::PersistentIndex;

use crate::chunking::Chunk;
use crate::config::{IndexBackend, Settings};
use crate::embedding::Embedder;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::info;

/// Summary of an indexed context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedContext {
    pub context_id: String,
    pub chunk_count: usize,
    pub indexed_at: DateTime<Utc>,
}

/// A chunk returned by similarity search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk: Chunk,
    /// Cosine similarity (higher is better).
    pub score: f32,
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Backend name for logs and listings.
    fn backend(&self) -> IndexBackend;

    /// Embed and store the chunks of a context, replacing any previous ones.
    async fn add(&self, context_id: &str, chunks: &[Chunk]) -> Result<usize>;

    /// Top-k chunks of one context by similarity to the question.
    async fn search(&self, context_id: &str, question: &str, k: usize) -> Result<Vec<SearchHit>>;

    /// All chunks of a context in index order.
    async fn chunks(&self, context_id: &str) -> Result<Vec<Chunk>>;

    /// Remove a context. Returns the number of chunks deleted.
    async fn delete_context(&self, context_id: &str) -> Result<usize>;

    /// List indexed contexts, most recent first.
    async fn list_contexts(&self) -> Result<Vec<IndexedContext>>;

    /// Top-k chunks of one context, best first.
    async fn query(&self, context_id: &str, question: &str, k: usize) -> Result<Vec<Chunk>> {
        Ok(self
            .search(context_id, question, k)
            .await?
            .into_iter()
            .map(|hit| hit.chunk)
            .collect())
    }
}

/// Select the vector index backend from configuration.
pub fn create_index(
    settings: &Settings,
    embedder: Arc<dyn Embedder>,
    registry: Arc<IndexRegistry>,
) -> Result<Arc<dyn VectorIndex>> {
    let index: Arc<dyn VectorIndex> = match settings.retrieval.backend {
        IndexBackend::Persistent => Arc::new(PersistentIndex::open(&settings.sqlite_path(), embedder)?),
        IndexBackend::Memory => Arc::new(InMemoryIndex::new(registry, embedder)),
    };
    info!("Using {} vector index", index.backend());
    Ok(index)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Score chunks against a query vector and keep the best `k`.
pub(crate) fn top_k(query: &[f32], chunks: impl IntoIterator<Item = Chunk>, k: usize) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = chunks
        .into_iter()
        .map(|chunk| {
            let score = chunk
                .embedding
                .as_deref()
                .map_or(0.0, |embedding| cosine_similarity(query, embedding));
            SearchHit { chunk, score }
        })
        .collect();

    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    hits.truncate(k);
    hits
}
