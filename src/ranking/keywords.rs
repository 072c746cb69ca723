//! Question keyword extraction.

use crate::chunking::char_len;
use crate::language::{stopwords, Lang};

const ARABIC_ARTICLE: &str = "ال";
/// Minimum length left after stripping the Arabic article.
const MIN_STEM_CHARS: usize = 3;

fn strip_punctuation(token: &str) -> String {
    token
        .chars()
        .filter(|c| !c.is_ascii_punctuation() && !is_unicode_punctuation(*c))
        .collect()
}

/// Arabic and general punctuation outside the ASCII range.
fn is_unicode_punctuation(c: char) -> bool {
    matches!(
        c,
        '؟' | '،' | '؛' | '«' | '»' | '…' | '“' | '”' | '‘' | '’' | '¿' | '¡' | '–' | '—' | '٪'
    )
}

/// Remove a leading `ال` when enough of the word remains.
fn strip_arabic_article(word: &str) -> &str {
    match word.strip_prefix(ARABIC_ARTICLE) {
        Some(rest) if char_len(rest) >= MIN_STEM_CHARS => rest,
        _ => word,
    }
}

/// Extract keywords in question order, skipping stopwords and one-letter tokens.
///
/// Duplicates are kept. Returns an empty list for blank input.
pub fn extract_keywords(question: &str, lang: Lang) -> Vec<String> {
    let stops = stopwords(lang);
    let lower = question.to_lowercase();

    lower
        .split_whitespace()
        .filter_map(|token| {
            let cleaned = strip_punctuation(token);
            if char_len(&cleaned) <= 1 || stops.contains(&cleaned.as_str()) {
                return None;
            }
            let stem = strip_arabic_article(&cleaned);
            if stops.contains(&stem) {
                return None;
            }
            Some(stem.to_string())
        })
        .collect()
}

/// Every question word longer than one character, punctuation removed.
///
/// Used when every word of the question is a stopword.
pub fn fallback_keywords(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .map(strip_punctuation)
        .filter(|word| char_len(word) > 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arabic_keywords() {
        assert_eq!(extract_keywords("كم عدد الصلوات؟", Lang::Ar), vec!["عدد", "صلوات"]);
        assert_eq!(extract_keywords("ما حكم الزكاة؟", Lang::Ar), vec!["حكم", "زكاة"]);
    }

    #[test]
    fn test_short_article_words_are_kept_whole() {
        // "الله" would leave only two letters
        assert_eq!(extract_keywords("الله", Lang::Ar), vec!["الله"]);
    }

    #[test]
    fn test_english_keywords_keep_order_and_duplicates() {
        assert_eq!(
            extract_keywords("What is the prayer, and why prayer?", Lang::En),
            vec!["prayer", "prayer"]
        );
    }

    #[test]
    fn test_blank_question() {
        assert!(extract_keywords("", Lang::Fr).is_empty());
        assert!(extract_keywords("   \n", Lang::Fr).is_empty());
    }

    #[test]
    fn test_unlisted_language_uses_fallback_stopwords() {
        assert_eq!(extract_keywords("der Gebete und die", Lang::De), vec!["der", "gebete", "und", "die"]);
        assert_eq!(extract_keywords("la prière de", Lang::Es), vec!["prière"]);
    }

    #[test]
    fn test_fallback_keywords() {
        assert_eq!(fallback_keywords("What is it?"), vec!["what", "is", "it"]);
    }
}
