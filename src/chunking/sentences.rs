//! Sentence splitting strategies used for oversized paragraphs.

use crate::error::{DeenbotError, Result};
use unicode_segmentation::UnicodeSegmentation;

/// Splits a paragraph into sentences.
pub trait SentenceSplitter: Send + Sync {
    /// Short name used in configuration and logs.
    fn name(&self) -> &'static str;

    /// Split text into trimmed, non-empty sentences.
    fn split(&self, text: &str) -> Result<Vec<String>>;
}

/// UAX #29 sentence boundaries. Handles Arabic terminals such as `؟`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeSentenceSplitter;

impl SentenceSplitter for UnicodeSentenceSplitter {
    fn name(&self) -> &'static str {
        "unicode"
    }

    fn split(&self, text: &str) -> Result<Vec<String>> {
        let sentences: Vec<String> = text
            .unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if sentences.is_empty() && !text.trim().is_empty() {
            return Err(DeenbotError::Chunking(
                "unicode segmentation produced no sentences".to_string(),
            ));
        }
        Ok(sentences)
    }
}

/// Splits after `.`, `!` or `?` when followed by whitespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexSentenceSplitter;

impl SentenceSplitter for RegexSentenceSplitter {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn split(&self, text: &str) -> Result<Vec<String>> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut chars = text.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }
            let end = i + c.len_utf8();
            if chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
                push_trimmed(&mut sentences, &text[start..end]);
                while chars.peek().is_some_and(|(_, next)| next.is_whitespace()) {
                    chars.next();
                }
                start = chars.peek().map_or(text.len(), |(j, _)| *j);
            }
        }
        push_trimmed(&mut sentences, &text[start..]);

        Ok(sentences)
    }
}

fn push_trimmed(out: &mut Vec<String>, sentence: &str) {
    let sentence = sentence.trim();
    if !sentence.is_empty() {
        out.push(sentence.to_string());
    }
}

/// Build a splitter by configuration name.
pub fn splitter_by_name(name: &str) -> Option<Box<dyn SentenceSplitter>> {
    match name.to_lowercase().as_str() {
        "unicode" | "uax29" => Some(Box::new(UnicodeSentenceSplitter)),
        "regex" => Some(Box::new(RegexSentenceSplitter)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_splitter() {
        let sentences = RegexSentenceSplitter
            .split("First one. Second!  Third? trailing")
            .unwrap();
        assert_eq!(sentences, vec!["First one.", "Second!", "Third?", "trailing"]);
    }

    #[test]
    fn test_regex_splitter_keeps_inner_periods() {
        let sentences = RegexSentenceSplitter.split("Version 1.5 is out. Yes.").unwrap();
        assert_eq!(sentences, vec!["Version 1.5 is out.", "Yes."]);
    }

    #[test]
    fn test_unicode_splitter_arabic() {
        let sentences = UnicodeSentenceSplitter
            .split("الصلاة خمس صلوات في اليوم. الزكاة واجبة على كل مسلم قادر.")
            .unwrap();
        assert_eq!(
            sentences,
            vec!["الصلاة خمس صلوات في اليوم.", "الزكاة واجبة على كل مسلم قادر."]
        );
    }

    #[test]
    fn test_splitter_by_name() {
        assert_eq!(splitter_by_name("Unicode").unwrap().name(), "unicode");
        assert_eq!(splitter_by_name("regex").unwrap().name(), "regex");
        assert!(splitter_by_name("punkt").is_none());
    }
}
