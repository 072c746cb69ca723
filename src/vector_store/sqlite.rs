//! SQLite-backed persistent vector index.
//!
//! Embeddings are stored as little-endian f32 blobs and cosine similarity is
//! computed in Rust over the rows of a single context.

use super::{top_k, IndexedContext, SearchHit, VectorIndex};
use crate::chunking::Chunk;
use crate::config::IndexBackend;
use crate::embedding::Embedder;
use crate::error::{DeenbotError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        context_id TEXT NOT NULL,
        chunk_index INTEGER NOT NULL,
        content TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_context_id ON chunks(context_id);
"#;

/// SQLite-based vector index.
pub struct PersistentIndex {
    conn: Mutex<Connection>,
    embedder: Arc<dyn Embedder>,
}

impl PersistentIndex {
    /// Open (or create) an index database.
    #[instrument(skip_all)]
    pub fn open(path: &Path, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector index at {:?}", path);
        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
        })
    }

    /// Create an in-memory database (useful for testing).
    pub fn in_memory(embedder: Arc<dyn Embedder>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DeenbotError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn load_chunks(&self, context_id: &str) -> Result<Vec<Chunk>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT chunk_index, content, embedding
            FROM chunks
            WHERE context_id = ?1
            ORDER BY chunk_index
            "#,
        )?;

        let rows = stmt.query_map(params![context_id], |row| {
            let index: i64 = row.get(0)?;
            let embedding: Vec<u8> = row.get(2)?;
            Ok(Chunk {
                content: row.get(1)?,
                index: index as usize,
                context_id: context_id.to_string(),
                embedding: Some(Self::bytes_to_embedding(&embedding)),
            })
        })?;

        let chunks = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(chunks)
    }
}

#[async_trait]
impl VectorIndex for PersistentIndex {
    fn backend(&self) -> IndexBackend {
        IndexBackend::Persistent
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn add(&self, context_id: &str, chunks: &[Chunk]) -> Result<usize> {
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        let indexed_at = Utc::now().to_rfc3339();

        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM chunks WHERE context_id = ?1", params![context_id])?;

        for (chunk, embedding) in chunks.iter().zip(&embeddings) {
            tx.execute(
                r#"
                INSERT INTO chunks (id, context_id, chunk_index, content, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    Uuid::new_v4().to_string(),
                    context_id,
                    chunk.index as i64,
                    chunk.content,
                    Self::embedding_to_bytes(embedding),
                    indexed_at,
                ],
            )?;
        }

        tx.commit()?;
        info!("Indexed {} chunks for {}", embeddings.len(), context_id);
        Ok(embeddings.len())
    }

    #[instrument(skip(self, question))]
    async fn search(&self, context_id: &str, question: &str, k: usize) -> Result<Vec<SearchHit>> {
        let query = self.embedder.embed(question).await?;
        let hits = top_k(&query, self.load_chunks(context_id)?, k);
        debug!("Found {} matching chunks", hits.len());
        Ok(hits)
    }

    async fn chunks(&self, context_id: &str) -> Result<Vec<Chunk>> {
        self.load_chunks(context_id)
    }

    #[instrument(skip(self))]
    async fn delete_context(&self, context_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM chunks WHERE context_id = ?1", params![context_id])?;
        info!("Deleted {} chunks for {}", deleted, context_id);
        Ok(deleted)
    }

    async fn list_contexts(&self) -> Result<Vec<IndexedContext>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT context_id, COUNT(*) AS chunk_count, MAX(indexed_at) AS indexed_at
            FROM chunks
            GROUP BY context_id
            ORDER BY indexed_at DESC
            "#,
        )?;

        let contexts = stmt.query_map([], |row| {
            let chunk_count: i64 = row.get(1)?;
            let indexed_at: String = row.get(2)?;
            Ok(IndexedContext {
                context_id: row.get(0)?,
                chunk_count: chunk_count as usize,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let result: Vec<IndexedContext> = contexts.filter_map(|c| c.ok()).collect();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;

    fn chunks(context_id: &str, texts: &[&str]) -> Vec<Chunk> {
        Chunk::from_texts(context_id, texts.iter().map(|t| t.to_string()).collect())
    }

    #[tokio::test]
    async fn test_add_query_and_list() {
        let index = PersistentIndex::in_memory(Arc::new(HashEmbedder::new(128))).unwrap();
        index
            .add("a", &chunks("a", &["fasting in ramadan", "the five daily prayers"]))
            .await
            .unwrap();
        index.add("b", &chunks("b", &["the five daily prayers"])).await.unwrap();

        let results = index.query("a", "daily prayers", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "the five daily prayers");
        assert_eq!(results[0].context_id, "a");

        let contexts = index.list_contexts().await.unwrap();
        assert_eq!(contexts.len(), 2);
    }

    #[tokio::test]
    async fn test_reindex_replaces_chunks() {
        let index = PersistentIndex::in_memory(Arc::new(HashEmbedder::new(32))).unwrap();
        index.add("a", &chunks("a", &["one", "two", "three"])).await.unwrap();
        index.add("a", &chunks("a", &["four"])).await.unwrap();

        let stored = index.chunks("a").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].content, "four");
        assert_eq!(stored[0].embedding.as_ref().map(Vec::len), Some(32));

        assert_eq!(index.delete_context("a").await.unwrap(), 1);
        assert!(index.query("a", "four", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");
        let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(16));

        {
            let index = PersistentIndex::open(&path, embedder.clone()).unwrap();
            index.add("ctx", &chunks("ctx", &["kept"])).await.unwrap();
        }

        let index = PersistentIndex::open(&path, embedder).unwrap();
        assert_eq!(index.chunks("ctx").await.unwrap().len(), 1);
    }
}
