//! Pipeline orchestrator for DeenBot.
//!
//! Wires transcript storage, chunking, the vector index and the answer
//! synthesizer together behind the operations the CLI and HTTP server expose.

use crate::chunking::{Chunker, TextChunker};
use crate::config::{Prompts, Settings};
use crate::embedding::create_embedder;
use crate::error::{DeenbotError, Result};
use crate::language::{detect, Lang};
use crate::llm::{ChatClient, LlmClient};
use crate::rag::{Answer, AnswerSynthesizer, AskOptions, ContextRetriever, Retrieved};
use crate::ranking::{ChunkRanker, Query, ScoredChunk, ScoringStrategy};
use crate::transcript::{new_context_id, validate_context_id, FileTranscriptStore, TranscriptStore};
use crate::vector_store::{create_index, IndexRegistry, VectorIndex};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the DeenBot pipeline.
pub struct Orchestrator {
    settings: Settings,
    index: Arc<dyn VectorIndex>,
    transcripts: Arc<dyn TranscriptStore>,
    chunker: Arc<dyn Chunker>,
    retriever: ContextRetriever,
    synthesizer: AnswerSynthesizer,
}

impl Orchestrator {
    /// Create an orchestrator from configuration.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let embedder = create_embedder(&settings.embedding)?;
        let registry = Arc::new(IndexRegistry::new());
        let index = create_index(&settings, embedder, registry)?;

        let transcripts_dir = settings.transcripts_dir();
        std::fs::create_dir_all(&transcripts_dir)?;
        let transcripts: Arc<dyn TranscriptStore> = Arc::new(FileTranscriptStore::new(transcripts_dir));

        let llm = match ChatClient::from_settings(&settings.llm)? {
            Some(client) => {
                info!("LLM rewrite enabled ({})", client.model());
                Some(Arc::new(client) as Arc<dyn LlmClient>)
            }
            None => None,
        };

        Ok(Self::with_components(settings, prompts, index, transcripts, llm))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        index: Arc<dyn VectorIndex>,
        transcripts: Arc<dyn TranscriptStore>,
        llm: Option<Arc<dyn LlmClient>>,
    ) -> Self {
        let chunker: Arc<dyn Chunker> = Arc::new(TextChunker::from_settings(&settings.chunking));
        let top_k = settings.retrieval.top_k;
        let retriever = ContextRetriever::new(index.clone(), transcripts.clone(), chunker.clone(), top_k);
        let synthesizer = AnswerSynthesizer::from_settings(
            &settings,
            ContextRetriever::new(index.clone(), transcripts.clone(), chunker.clone(), top_k),
            llm,
            prompts,
        );

        Self {
            settings,
            index,
            transcripts,
            chunker,
            retriever,
            synthesizer,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a reference to the vector index.
    pub fn index(&self) -> Arc<dyn VectorIndex> {
        self.index.clone()
    }

    /// Store a transcript and index its chunks.
    ///
    /// The transcript is saved first; an indexing failure is logged and
    /// reported in the result, since answers can still be built from the
    /// stored transcript.
    #[instrument(skip(self, text))]
    pub async fn ingest(&self, text: &str, context_id: Option<&str>) -> Result<IngestResult> {
        if text.trim().is_empty() {
            return Err(DeenbotError::InvalidInput("Transcript is empty".to_string()));
        }

        let context_id = match context_id {
            Some(id) => {
                validate_context_id(id)?;
                id.to_string()
            }
            None => new_context_id(),
        };

        self.transcripts.save_transcript(&context_id, text).await?;
        info!("Stored transcript {} ({} chars)", context_id, text.chars().count());

        let chunks = self.chunker.chunk_context(&context_id, text);
        let chunk_count = chunks.len();

        let chunks_indexed = match self.index.add(&context_id, &chunks).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!("Indexing failed for {}: {}", context_id, e);
                None
            }
        };

        Ok(IngestResult {
            context_id,
            chunk_count,
            chunks_indexed,
        })
    }

    /// Answer a question about a stored transcript. Never fails.
    pub async fn ask(&self, question: &str, context_id: &str, options: &AskOptions) -> Answer {
        self.synthesizer.answer(question, context_id, options).await
    }

    /// Rank every chunk of a context against a question.
    #[instrument(skip(self))]
    pub async fn rank(
        &self,
        question: &str,
        context_id: &str,
        strategy: Option<ScoringStrategy>,
        lang: Option<Lang>,
    ) -> Result<RankResult> {
        let chunks = match self.retriever.all_chunks(context_id).await? {
            Retrieved::Chunks { chunks, .. } => chunks,
            Retrieved::NotFound => return Err(DeenbotError::ContextNotFound(context_id.to_string())),
        };

        let lang = lang.unwrap_or_else(|| detect(question));
        let ranker = match strategy {
            Some(strategy) => ChunkRanker::with_strategy(strategy, &self.settings.ranking),
            None => ChunkRanker::from_settings(&self.settings.ranking),
        };
        let query = Query::new(question, lang);

        Ok(RankResult {
            lang,
            keywords: query.keywords.clone(),
            strategy: ranker.scorer_name().to_string(),
            chunks: ranker.select(&query, &chunks),
        })
    }

    /// Re-chunk and re-index a stored transcript with the current settings.
    #[instrument(skip(self))]
    pub async fn rechunk(&self, context_id: &str) -> Result<IngestResult> {
        validate_context_id(context_id)?;
        let text = self
            .transcripts
            .get_transcript(context_id)
            .await?
            .ok_or_else(|| DeenbotError::ContextNotFound(context_id.to_string()))?;

        let chunks = self.chunker.chunk_context(context_id, &text);
        let indexed = self.index.add(context_id, &chunks).await?;
        info!("Rechunked {} into {} chunks", context_id, indexed);

        Ok(IngestResult {
            context_id: context_id.to_string(),
            chunk_count: chunks.len(),
            chunks_indexed: Some(indexed),
        })
    }

    /// All known contexts: stored transcripts merged with index entries.
    pub async fn list(&self) -> Result<Vec<ContextSummary>> {
        let mut contexts: BTreeMap<String, ContextSummary> = BTreeMap::new();

        for id in self.transcripts.list_ids().await? {
            contexts.insert(
                id.clone(),
                ContextSummary {
                    context_id: id,
                    has_transcript: true,
                    chunk_count: None,
                    indexed_at: None,
                },
            );
        }

        match self.index.list_contexts().await {
            Ok(indexed) => {
                for entry in indexed {
                    let summary = contexts
                        .entry(entry.context_id.clone())
                        .or_insert_with(|| ContextSummary {
                            context_id: entry.context_id.clone(),
                            has_transcript: false,
                            chunk_count: None,
                            indexed_at: None,
                        });
                    summary.chunk_count = Some(entry.chunk_count);
                    summary.indexed_at = Some(entry.indexed_at);
                }
            }
            Err(e) => warn!("Could not list indexed contexts: {}", e),
        }

        Ok(contexts.into_values().collect())
    }
}

/// Result of ingesting or rechunking a transcript.
#[derive(Debug, Clone, Serialize)]
pub struct IngestResult {
    pub context_id: String,
    /// Chunks produced by the chunker.
    pub chunk_count: usize,
    /// Chunks written to the index, `None` when indexing failed.
    pub chunks_indexed: Option<usize>,
}

/// Ranked chunks for a question.
#[derive(Debug, Clone, Serialize)]
pub struct RankResult {
    pub lang: Lang,
    pub keywords: Vec<String>,
    pub strategy: String,
    pub chunks: Vec<ScoredChunk>,
}

/// One row of the context listing.
#[derive(Debug, Clone, Serialize)]
pub struct ContextSummary {
    pub context_id: String,
    pub has_transcript: bool,
    pub chunk_count: Option<usize>,
    pub indexed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::Chunk;
    use crate::config::IndexBackend;
    use crate::embedding::HashEmbedder;
    use crate::rag::AnswerOrigin;
    use crate::vector_store::{InMemoryIndex, IndexedContext, SearchHit};
    use async_trait::async_trait;

    const TRANSCRIPT: &str = "Prayer is performed five times a day. Fasting takes place in Ramadan.";

    struct OfflineIndex;

    #[async_trait]
    impl VectorIndex for OfflineIndex {
        fn backend(&self) -> IndexBackend {
            IndexBackend::Persistent
        }
        async fn add(&self, _: &str, _: &[Chunk]) -> Result<usize> {
            Err(DeenbotError::VectorStore("offline".to_string()))
        }
        async fn search(&self, _: &str, _: &str, _: usize) -> Result<Vec<SearchHit>> {
            Err(DeenbotError::VectorStore("offline".to_string()))
        }
        async fn chunks(&self, _: &str) -> Result<Vec<Chunk>> {
            Err(DeenbotError::VectorStore("offline".to_string()))
        }
        async fn delete_context(&self, _: &str) -> Result<usize> {
            Ok(0)
        }
        async fn list_contexts(&self) -> Result<Vec<IndexedContext>> {
            Err(DeenbotError::VectorStore("offline".to_string()))
        }
    }

    fn orchestrator(dir: &tempfile::TempDir, index: Arc<dyn VectorIndex>) -> Orchestrator {
        let mut settings = Settings::default();
        settings.chunking.min_chunk_size = 10;
        settings.chunking.max_chunk_size = 40;
        Orchestrator::with_components(
            settings,
            Prompts::default(),
            index,
            Arc::new(FileTranscriptStore::new(dir.path())),
            None,
        )
    }

    fn memory_index() -> Arc<dyn VectorIndex> {
        Arc::new(InMemoryIndex::new(
            Arc::new(IndexRegistry::new()),
            Arc::new(HashEmbedder::new(64)),
        ))
    }

    #[tokio::test]
    async fn test_ingest_then_ask() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(&dir, memory_index());

        let result = orchestrator.ingest(TRANSCRIPT, None).await.unwrap();
        assert!(result.context_id.starts_with("trans_"));
        assert_eq!(result.chunk_count, 2);
        assert_eq!(result.chunks_indexed, Some(2));

        let answer = orchestrator
            .ask("When does fasting take place?", &result.context_id, &AskOptions::default())
            .await;
        assert_eq!(answer.origin, AnswerOrigin::Extractive);
        assert_eq!(answer.lang, Lang::En);
        assert_eq!(answer.text, "Fasting takes place in Ramadan.");
    }

    #[tokio::test]
    async fn test_ingest_survives_index_failure() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(&dir, Arc::new(OfflineIndex));

        let result = orchestrator.ingest(TRANSCRIPT, Some("lecture-1")).await.unwrap();
        assert_eq!(result.context_id, "lecture-1");
        assert_eq!(result.chunks_indexed, None);

        let answer = orchestrator
            .ask("How often is prayer performed?", "lecture-1", &AskOptions::default())
            .await;
        assert_eq!(answer.text, "Prayer is performed five times a day.");

        let listed = orchestrator.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].has_transcript);
        assert_eq!(listed[0].chunk_count, None);
    }

    #[tokio::test]
    async fn test_ingest_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(&dir, memory_index());

        assert!(orchestrator.ingest("   ", None).await.is_err());
        assert!(orchestrator.ingest(TRANSCRIPT, Some("../etc/passwd")).await.is_err());
    }

    #[tokio::test]
    async fn test_rank_with_each_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(&dir, memory_index());
        let id = orchestrator.ingest(TRANSCRIPT, None).await.unwrap().context_id;

        let ranked = orchestrator
            .rank("fasting Ramadan", &id, Some(ScoringStrategy::Keyword), None)
            .await
            .unwrap();
        assert_eq!(ranked.strategy, "keyword");
        assert_eq!(ranked.chunks.len(), 1);
        assert_eq!(ranked.chunks[0].chunk.index, 1);

        let ranked = orchestrator
            .rank("fasting Ramadan", &id, Some(ScoringStrategy::Proximity), None)
            .await
            .unwrap();
        assert_eq!(ranked.strategy, "proximity");
        assert_eq!(ranked.chunks[0].chunk.index, 1);
        assert!(ranked.chunks[0].score <= 1.0);

        let missing = orchestrator.rank("fasting", "trans_none", None, None).await;
        assert!(matches!(missing, Err(DeenbotError::ContextNotFound(_))));
    }

    #[tokio::test]
    async fn test_rechunk_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator(&dir, memory_index());
        let id = orchestrator.ingest(TRANSCRIPT, None).await.unwrap().context_id;

        let result = orchestrator.rechunk(&id).await.unwrap();
        assert_eq!(result.chunks_indexed, Some(2));

        let listed = orchestrator.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].chunk_count, Some(2));
        assert!(listed[0].indexed_at.is_some());

        assert!(matches!(
            orchestrator.rechunk("trans_none").await,
            Err(DeenbotError::ContextNotFound(_))
        ));
    }
}
