//! Relevance scoring and ranking of transcript chunks against a question.

mod keyword_score;
mod keywords;
mod proximity;
mod ranker;

pub use keyword_score::KeywordScorer;
pub use keywords::{extract_keywords, fallback_keywords};
pub use proximity::ProximityScorer;
pub use ranker::ChunkRanker;

use crate::chunking::Chunk;
use crate::config::RankingSettings;
use crate::language::Lang;
use serde::{Deserialize, Serialize};

/// A chunk with its relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub score: f64,
    pub chunk: Chunk,
}

/// A question prepared for scoring.
#[derive(Debug, Clone)]
pub struct Query {
    /// Raw question text.
    pub text: String,
    /// Extracted keywords, or every question word when none survive filtering.
    pub keywords: Vec<String>,
    pub lang: Lang,
}

impl Query {
    pub fn new(text: impl Into<String>, lang: Lang) -> Self {
        let text = text.into();
        let mut keywords = extract_keywords(&text, lang);
        if keywords.is_empty() {
            keywords = fallback_keywords(&text);
        }
        Self {
            text,
            keywords,
            lang,
        }
    }
}

/// Computes a non-negative relevance score between a chunk and a query.
///
/// Implementations must be deterministic.
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, text: &str, query: &Query) -> f64;
}

/// Available scoring strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    /// Keyword frequency with bigram bonus.
    #[default]
    Keyword,
    /// Proximity, density and length composite in `[0, 1]`.
    Proximity,
}

impl ScoringStrategy {
    /// Build the scorer for this strategy.
    pub fn scorer(&self, settings: &RankingSettings) -> Box<dyn Scorer> {
        match self {
            ScoringStrategy::Keyword => Box::new(KeywordScorer::from_settings(settings)),
            ScoringStrategy::Proximity => Box::new(ProximityScorer::new()),
        }
    }
}

impl std::str::FromStr for ScoringStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" | "keywords" => Ok(ScoringStrategy::Keyword),
            "proximity" => Ok(ScoringStrategy::Proximity),
            _ => Err(format!("Unknown scoring strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringStrategy::Keyword => write!(f, "keyword"),
            ScoringStrategy::Proximity => write!(f, "proximity"),
        }
    }
}
