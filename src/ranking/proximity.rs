//! Proximity, density and length composite scoring.

use super::{Query, Scorer};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

const EXACT_WEIGHT: f64 = 0.4;
const PROXIMITY_WEIGHT: f64 = 0.3;
const WINDOW_WEIGHT: f64 = 0.2;
const LENGTH_WEIGHT: f64 = 0.1;
const POSITION_WEIGHT: f64 = 0.1;
/// Preferred passage length, in words.
const IDEAL_LENGTH: f64 = 15.0;

fn normalize(text: &str) -> String {
    NON_WORD.replace_all(&text.to_lowercase(), " ").into_owned()
}

/// Scores a passage against the raw question. Always in `[0, 1]`.
#[derive(Debug, Clone, Default)]
pub struct ProximityScorer;

impl ProximityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score_passage(&self, question: &str, passage: &str) -> f64 {
        let question = normalize(question);
        let passage = normalize(passage);

        let query_words: HashSet<&str> = question.split_whitespace().collect();
        let passage_words: Vec<&str> = passage.split_whitespace().collect();
        if query_words.is_empty() || passage_words.is_empty() {
            return 0.0;
        }

        let num_query = query_words.len() as f64;
        let total_words = passage_words.len();

        let exact_matches = query_words
            .iter()
            .filter(|word| passage_words.contains(word))
            .count();
        let exact_score = exact_matches as f64 / num_query;

        let positions: Vec<usize> = passage_words
            .iter()
            .enumerate()
            .filter(|(_, word)| query_words.contains(*word))
            .map(|(i, _)| i)
            .collect();
        let (Some(&min_pos), Some(&max_pos)) = (positions.iter().min(), positions.iter().max())
        else {
            return 0.0;
        };

        let span = (max_pos - min_pos + 1) as f64;
        let proximity_score = 1.0 / (1.0 + span / num_query);

        let window = (query_words.len() * 3).clamp(10, 20) as f64;
        let window_score = (positions.len() as f64 / window).min(1.0);

        let length_score =
            (1.0 - (total_words as f64 - IDEAL_LENGTH).abs() / (IDEAL_LENGTH * 2.0)).clamp(0.1, 1.0);

        let composite = EXACT_WEIGHT * exact_score
            + PROXIMITY_WEIGHT * proximity_score
            + WINDOW_WEIGHT * window_score
            + LENGTH_WEIGHT * length_score;

        let position_bonus = 1.0 - min_pos as f64 / total_words.max(1) as f64;
        let blended = composite * (1.0 - POSITION_WEIGHT) + position_bonus * POSITION_WEIGHT;

        blended.clamp(0.0, 1.0)
    }
}

impl Scorer for ProximityScorer {
    fn name(&self) -> &'static str {
        "proximity"
    }

    fn score(&self, text: &str, query: &Query) -> f64 {
        self.score_passage(&query.text, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs_score_zero() {
        let scorer = ProximityScorer::new();
        assert_eq!(scorer.score_passage("", "some passage"), 0.0);
        assert_eq!(scorer.score_passage("question", ""), 0.0);
        assert_eq!(scorer.score_passage("?!", "..."), 0.0);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        assert_eq!(ProximityScorer::new().score_passage("zakat", "prayer times"), 0.0);
    }

    #[test]
    fn test_known_value() {
        // One query word, matched at position 0 of a 15-word passage.
        let passage = "zakat a b c d e f g h i j k l m n";
        let score = ProximityScorer::new().score_passage("Zakat?", passage);
        let composite = 0.4 * 1.0 + 0.3 * 0.5 + 0.2 * 0.1 + 0.1 * 1.0;
        let expected = composite * 0.9 + 1.0 * 0.1;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bounded_for_varied_inputs() {
        let scorer = ProximityScorer::new();
        let passages = [
            "prayer prayer prayer prayer prayer prayer prayer prayer prayer prayer prayer prayer",
            "the five daily prayers are obligatory upon every muslim",
            "الصلاة خمس صلوات في اليوم",
            "x",
        ];
        let questions = ["prayer", "how many daily prayers", "كم عدد الصلوات؟", "x y z"];
        for q in questions {
            for p in passages {
                let score = scorer.score_passage(q, p);
                assert!((0.0..=1.0).contains(&score), "{q} / {p}: {score}");
            }
        }
    }

    #[test]
    fn test_closer_terms_score_higher() {
        let scorer = ProximityScorer::new();
        let close = scorer.score_passage("daily prayers", "the daily prayers are five in number today");
        let spread = scorer.score_passage("daily prayers", "the daily count is five in number for prayers");
        assert!(close > spread);
    }
}
