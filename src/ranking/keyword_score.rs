//! Keyword frequency and bigram adjacency scoring.

use super::{Query, Scorer};
use crate::config::RankingSettings;

/// Scores a chunk by keyword occurrences, normalized by chunk length.
///
/// Each keyword found contributes `1 + 0.5 * ln(1 + count)`. Adjacent
/// keyword pairs found verbatim add `bigram_bonus`. The sum is divided by
/// `sqrt(words) / normalization_divisor`. Scores are unbounded above.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    bigram_bonus: f64,
    normalization_divisor: f64,
}

impl KeywordScorer {
    pub fn new(bigram_bonus: f64, normalization_divisor: f64) -> Self {
        Self {
            bigram_bonus,
            normalization_divisor,
        }
    }

    pub fn from_settings(settings: &RankingSettings) -> Self {
        Self::new(settings.bigram_bonus, settings.normalization_divisor)
    }

    /// Score a text against an ordered keyword list.
    pub fn score_keywords(&self, text: &str, keywords: &[String]) -> f64 {
        if text.is_empty() || keywords.is_empty() {
            return 0.0;
        }

        let lower = text.to_lowercase();
        let mut score = 0.0;

        for keyword in keywords {
            let keyword = keyword.to_lowercase();
            if keyword.is_empty() {
                continue;
            }
            let count = lower.matches(keyword.as_str()).count();
            if count > 0 {
                score += 1.0 + 0.5 * (count as f64).ln_1p();
            }
        }

        for pair in keywords.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]).to_lowercase();
            if lower.contains(&bigram) {
                score += self.bigram_bonus;
            }
        }

        let words = text.split_whitespace().count();
        if words > 0 && self.normalization_divisor > 0.0 {
            score /= (words as f64).sqrt() / self.normalization_divisor;
        }

        score
    }
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::from_settings(&RankingSettings::default())
    }
}

impl Scorer for KeywordScorer {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn score(&self, text: &str, query: &Query) -> f64 {
        self.score_keywords(text, &query.keywords)
    }
}
