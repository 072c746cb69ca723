//! Chunk ranking and top-N selection.

use super::{Query, ScoredChunk, Scorer, ScoringStrategy};
use crate::chunking::Chunk;
use crate::config::RankingSettings;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Sorts chunks by relevance and selects a bounded subset.
pub struct ChunkRanker {
    scorer: Box<dyn Scorer>,
    top_n: usize,
    fallback_chunks: usize,
}

impl ChunkRanker {
    pub fn new(scorer: Box<dyn Scorer>, top_n: usize, fallback_chunks: usize) -> Self {
        Self {
            scorer,
            top_n: top_n.max(1),
            fallback_chunks: fallback_chunks.max(1),
        }
    }

    /// Build a ranker using the configured strategy.
    pub fn from_settings(settings: &RankingSettings) -> Self {
        let strategy = settings.strategy.parse().unwrap_or_else(|e| {
            warn!("{}, using keyword scoring", e);
            ScoringStrategy::Keyword
        });
        Self::with_strategy(strategy, settings)
    }

    pub fn with_strategy(strategy: ScoringStrategy, settings: &RankingSettings) -> Self {
        Self::new(
            strategy.scorer(settings),
            settings.top_n,
            settings.fallback_chunks,
        )
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Score every non-empty chunk, highest first. Ties keep source order.
    pub fn rank(&self, query: &Query, chunks: &[Chunk]) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = chunks
            .iter()
            .filter(|chunk| !chunk.content.trim().is_empty())
            .map(|chunk| ScoredChunk {
                score: self.scorer.score(&chunk.content, query),
                chunk: chunk.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored
    }

    /// Keep the top-N positively scored chunks.
    ///
    /// When nothing scores above zero, the first chunks in source order are
    /// returned instead, so a non-empty transcript always yields something.
    pub fn select(&self, query: &Query, chunks: &[Chunk]) -> Vec<ScoredChunk> {
        let ranked = self.rank(query, chunks);

        let top: Vec<ScoredChunk> = ranked
            .iter()
            .filter(|scored| scored.score > 0.0)
            .take(self.top_n)
            .cloned()
            .collect();

        if !top.is_empty() {
            debug!(
                selected = top.len(),
                best = top[0].score,
                scorer = self.scorer.name(),
                "Selected relevant chunks"
            );
            return top;
        }

        warn!(
            "No chunk scored above zero, using the first {} chunks",
            self.fallback_chunks
        );
        chunks
            .iter()
            .filter(|chunk| !chunk.content.trim().is_empty())
            .take(self.fallback_chunks)
            .map(|chunk| ScoredChunk {
                score: 0.0,
                chunk: chunk.clone(),
            })
            .collect()
    }
}

impl Default for ChunkRanker {
    fn default() -> Self {
        Self::from_settings(&RankingSettings::default())
    }
}
