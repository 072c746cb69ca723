//! Candidate chunk retrieval for a context.

use crate::chunking::{Chunk, Chunker};
use crate::error::Result;
use crate::transcript::TranscriptStore;
use crate::vector_store::VectorIndex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Where the candidate chunks came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalSource {
    VectorIndex,
    /// Degraded path: the raw transcript was reloaded and chunked.
    Transcript,
}

/// Result of retrieving a context.
#[derive(Debug, Clone)]
pub enum Retrieved {
    Chunks {
        chunks: Vec<Chunk>,
        source: RetrievalSource,
    },
    /// Neither the index nor the transcript store knows the context.
    NotFound,
}

/// Fetches candidate chunks, preferring the vector index.
pub struct ContextRetriever {
    index: Arc<dyn VectorIndex>,
    transcripts: Arc<dyn TranscriptStore>,
    chunker: Arc<dyn Chunker>,
    top_k: usize,
}

impl ContextRetriever {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        transcripts: Arc<dyn TranscriptStore>,
        chunker: Arc<dyn Chunker>,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            transcripts,
            chunker,
            top_k: top_k.max(1),
        }
    }

    /// Top-k chunks by similarity, in source order.
    ///
    /// A failing or empty index query falls back to chunking the stored
    /// transcript.
    #[instrument(skip(self, question))]
    pub async fn retrieve(&self, context_id: &str, question: &str) -> Result<Retrieved> {
        match self.index.query(context_id, question, self.top_k).await {
            Ok(mut chunks) if !chunks.is_empty() => {
                chunks.sort_by_key(|c| c.index);
                debug!("Retrieved {} chunks from the vector index", chunks.len());
                return Ok(Retrieved::Chunks {
                    chunks,
                    source: RetrievalSource::VectorIndex,
                });
            }
            Ok(_) => warn!("Vector index returned nothing for {}, reloading transcript", context_id),
            Err(e) => warn!("Vector index query failed: {}, reloading transcript", e),
        }

        self.from_transcript(context_id).await
    }

    /// Every chunk of a context in source order.
    pub async fn all_chunks(&self, context_id: &str) -> Result<Retrieved> {
        match self.index.chunks(context_id).await {
            Ok(chunks) if !chunks.is_empty() => Ok(Retrieved::Chunks {
                chunks,
                source: RetrievalSource::VectorIndex,
            }),
            Ok(_) => self.from_transcript(context_id).await,
            Err(e) => {
                warn!("Failed to read indexed chunks: {}, reloading transcript", e);
                self.from_transcript(context_id).await
            }
        }
    }

    async fn from_transcript(&self, context_id: &str) -> Result<Retrieved> {
        let Some(text) = self.transcripts.get_transcript(context_id).await? else {
            return Ok(Retrieved::NotFound);
        };

        let chunks = self.chunker.chunk_context(context_id, &text);
        debug!("Chunked stored transcript into {} chunks", chunks.len());
        Ok(Retrieved::Chunks {
            chunks,
            source: RetrievalSource::Transcript,
        })
    }
}
