//! In-memory vector index.
//!
//! Each context gets its own [`ContextStore`], held by an [`IndexRegistry`]
//! that lives as long as the process and is passed in explicitly.

use super::{top_k, IndexedContext, SearchHit, VectorIndex};
use crate::chunking::Chunk;
use crate::config::IndexBackend;
use crate::embedding::Embedder;
use crate::error::{DeenbotError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument};

/// Embedded chunks of a single context.
#[derive(Debug, Clone)]
pub struct ContextStore {
    chunks: Vec<Chunk>,
    indexed_at: DateTime<Utc>,
}

impl ContextStore {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks,
            indexed_at: Utc::now(),
        }
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        top_k(query, self.chunks.iter().cloned(), k)
    }
}

/// Process-wide map from context id to its in-memory store.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    stores: RwLock<HashMap<String, Arc<ContextStore>>>,
}

fn lock_error(e: impl std::fmt::Display) -> DeenbotError {
    DeenbotError::VectorStore(format!("Failed to acquire lock: {}", e))
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, context_id: &str, store: ContextStore) -> Result<()> {
        let mut stores = self.stores.write().map_err(lock_error)?;
        stores.insert(context_id.to_string(), Arc::new(store));
        Ok(())
    }

    pub fn get(&self, context_id: &str) -> Result<Option<Arc<ContextStore>>> {
        let stores = self.stores.read().map_err(lock_error)?;
        Ok(stores.get(context_id).cloned())
    }

    pub fn remove(&self, context_id: &str) -> Result<Option<Arc<ContextStore>>> {
        let mut stores = self.stores.write().map_err(lock_error)?;
        Ok(stores.remove(context_id))
    }

    /// Snapshot of all registered contexts.
    pub fn entries(&self) -> Result<Vec<(String, Arc<ContextStore>)>> {
        let stores = self.stores.read().map_err(lock_error)?;
        Ok(stores
            .iter()
            .map(|(id, store)| (id.clone(), Arc::clone(store)))
            .collect())
    }
}

/// Vector index backed by the registry.
pub struct InMemoryIndex {
    registry: Arc<IndexRegistry>,
    embedder: Arc<dyn Embedder>,
}

impl InMemoryIndex {
    pub fn new(registry: Arc<IndexRegistry>, embedder: Arc<dyn Embedder>) -> Self {
        Self { registry, embedder }
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn backend(&self) -> IndexBackend {
        IndexBackend::Memory
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn add(&self, context_id: &str, chunks: &[Chunk]) -> Result<usize> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let embedded: Vec<Chunk> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| Chunk {
                context_id: context_id.to_string(),
                embedding: Some(embedding),
                ..chunk.clone()
            })
            .collect();

        let count = embedded.len();
        self.registry.put(context_id, ContextStore::new(embedded))?;
        debug!("Registered {} chunks in memory", count);
        Ok(count)
    }

    async fn search(&self, context_id: &str, question: &str, k: usize) -> Result<Vec<SearchHit>> {
        let Some(store) = self.registry.get(context_id)? else {
            return Ok(Vec::new());
        };
        let query = self.embedder.embed(question).await?;
        Ok(store.search(&query, k))
    }

    async fn chunks(&self, context_id: &str) -> Result<Vec<Chunk>> {
        Ok(self
            .registry
            .get(context_id)?
            .map(|store| store.chunks().to_vec())
            .unwrap_or_default())
    }

    async fn delete_context(&self, context_id: &str) -> Result<usize> {
        Ok(self.registry.remove(context_id)?.map_or(0, |store| store.len()))
    }

    async fn list_contexts(&self) -> Result<Vec<IndexedContext>> {
        let mut contexts: Vec<IndexedContext> = self
            .registry
            .entries()?
            .into_iter()
            .map(|(context_id, store)| IndexedContext {
                context_id,
                chunk_count: store.len(),
                indexed_at: store.indexed_at,
            })
            .collect();
        contexts.sort_by(|a, b| b.indexed_at.cmp(&a.indexed_at));
        Ok(contexts)
    }
}
