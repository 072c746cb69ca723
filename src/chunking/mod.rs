//! Transcript chunking.
//!
//! Splits raw transcript text into size-bounded chunks that follow paragraph
//! and sentence boundaries. All lengths are counted in characters.

mod sentences;

pub use sentences::{
    splitter_by_name, RegexSentenceSplitter, SentenceSplitter, UnicodeSentenceSplitter,
};

use crate::config::ChunkingSettings;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

const PARAGRAPH_SEPARATOR: &str = "\n\n";
const SENTENCE_SEPARATOR: &str = " ";

/// A contiguous slice of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of this chunk.
    pub content: String,
    /// Zero-based position in the transcript.
    pub index: usize,
    /// Identifier of the transcript this chunk belongs to.
    pub context_id: String,
    /// Embedding vector, when the chunk came from a vector index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    pub fn new(content: impl Into<String>, index: usize, context_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            index,
            context_id: context_id.into(),
            embedding: None,
        }
    }

    /// Wrap chunk texts in source order.
    pub fn from_texts(context_id: &str, texts: Vec<String>) -> Vec<Chunk> {
        texts
            .into_iter()
            .enumerate()
            .map(|(index, content)| Chunk::new(content, index, context_id))
            .collect()
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        char_len(&self.content)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Trait for transcript chunking implementations.
pub trait Chunker: Send + Sync {
    /// Split text into chunk strings in source order.
    fn chunk(&self, text: &str) -> Vec<String>;

    /// Split a transcript into indexed chunks for a context.
    fn chunk_context(&self, context_id: &str, text: &str) -> Vec<Chunk> {
        Chunk::from_texts(context_id, self.chunk(text))
    }
}

/// Paragraph-then-sentence chunker.
pub struct TextChunker {
    min_size: usize,
    max_size: usize,
    splitters: Vec<Box<dyn SentenceSplitter>>,
}

impl TextChunker {
    /// Create a chunker with the default splitter order (unicode, then regex).
    pub fn new(min_size: usize, max_size: usize) -> Self {
        Self {
            min_size,
            max_size: max_size.max(1),
            splitters: vec![
                Box::new(UnicodeSentenceSplitter),
                Box::new(RegexSentenceSplitter),
            ],
        }
    }

    /// Create a chunker from settings. Unknown splitter names are skipped.
    pub fn from_settings(settings: &ChunkingSettings) -> Self {
        let mut chunker = Self::new(settings.min_chunk_size, settings.max_chunk_size);

        let splitters: Vec<Box<dyn SentenceSplitter>> = settings
            .sentence_splitters
            .iter()
            .filter_map(|name| {
                let splitter = splitter_by_name(name);
                if splitter.is_none() {
                    warn!("Unknown sentence splitter '{}', skipping", name);
                }
                splitter
            })
            .collect();

        if !splitters.is_empty() {
            chunker.splitters = splitters;
        }
        chunker
    }

    /// Replace the ordered list of sentence splitters.
    pub fn with_splitters(mut self, splitters: Vec<Box<dyn SentenceSplitter>>) -> Self {
        self.splitters = splitters;
        self
    }

    /// First splitter that succeeds wins; the paragraph itself is the last resort.
    fn sentences(&self, paragraph: &str) -> Vec<String> {
        for splitter in &self.splitters {
            match splitter.split(paragraph) {
                Ok(sentences) if !sentences.is_empty() => return sentences,
                Ok(_) => debug!("Splitter '{}' returned no sentences", splitter.name()),
                Err(e) => warn!("Sentence splitter '{}' failed: {}, trying next", splitter.name(), e),
            }
        }
        vec![paragraph.trim().to_string()]
    }

    fn fits(&self, buffer: &str, piece: &str, separator: &str) -> bool {
        let mut len = char_len(piece);
        if !buffer.is_empty() {
            len += char_len(buffer) + char_len(separator);
        }
        len <= self.max_size
    }

    fn hard_split(&self, sentence: &str) -> Vec<String> {
        let chars: Vec<char> = sentence.chars().collect();
        chars
            .chunks(self.max_size)
            .map(|slice| slice.iter().collect())
            .collect()
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::from_settings(&ChunkingSettings::default())
    }
}

impl Chunker for TextChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) < self.min_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut buffer = String::new();

        for paragraph in PARAGRAPH_BREAK
            .split(text)
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            if char_len(paragraph) <= self.max_size {
                if self.fits(&buffer, paragraph, PARAGRAPH_SEPARATOR) {
                    append(&mut buffer, paragraph, PARAGRAPH_SEPARATOR);
                } else {
                    flush(&mut chunks, &mut buffer);
                    buffer = paragraph.to_string();
                }
                continue;
            }

            for sentence in self.sentences(paragraph) {
                if self.fits(&buffer, &sentence, SENTENCE_SEPARATOR) {
                    append(&mut buffer, &sentence, SENTENCE_SEPARATOR);
                    continue;
                }

                flush(&mut chunks, &mut buffer);
                if char_len(&sentence) > self.max_size {
                    let mut slices = self.hard_split(&sentence);
                    buffer = slices.pop().unwrap_or_default();
                    chunks.extend(slices);
                } else {
                    buffer = sentence;
                }
            }
        }
        flush(&mut chunks, &mut buffer);

        debug!(chunks = chunks.len(), "Chunked transcript");
        chunks
    }
}

fn append(buffer: &mut String, piece: &str, separator: &str) {
    if !buffer.is_empty() {
        buffer.push_str(separator);
    }
    buffer.push_str(piece);
}

fn flush(chunks: &mut Vec<String>, buffer: &mut String) {
    let content = buffer.trim();
    if !content.is_empty() {
        chunks.push(content.to_string());
    }
    buffer.clear();
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeenbotError, Result};

    fn non_whitespace(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn sample_transcript() -> String {
        let mut text = String::new();
        for p in 0..6 {
            for s in 0..8 {
                text.push_str(&format!("Paragraph {} sentence {} talks about prayer times. ", p, s));
            }
            text.push_str("\n\n");
        }
        text
    }

    #[test]
    fn test_empty_and_short_text() {
        let chunker = TextChunker::new(100, 500);
        assert!(chunker.chunk("").is_empty());
        assert_eq!(chunker.chunk("short text"), vec!["short text"]);
    }

    #[test]
    fn test_chunks_respect_max_size() {
        let chunker = TextChunker::new(100, 200);
        let chunks = chunker.chunk(&sample_transcript());

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 200, "chunk too long: {}", char_len(chunk));
        }
    }

    #[test]
    fn test_chunks_reconstruct_source() {
        let text = sample_transcript();
        let chunker = TextChunker::new(100, 200);
        let joined: String = chunker.chunk(&text).concat();
        assert_eq!(non_whitespace(&joined), non_whitespace(&text));
    }

    #[test]
    fn test_small_paragraphs_are_merged() {
        let text = format!("{}\n\n{}\n\n{}", "a".repeat(60), "b".repeat(60), "c".repeat(60));
        let chunks = TextChunker::new(10, 130).chunk(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], format!("{}\n\n{}", "a".repeat(60), "b".repeat(60)));
        assert_eq!(chunks[1], "c".repeat(60));
    }

    #[test]
    fn test_oversized_sentence_is_hard_split() {
        let text = "x".repeat(250);
        let chunks = TextChunker::new(10, 100).chunk(&text);
        assert_eq!(chunks, vec!["x".repeat(100), "x".repeat(100), "x".repeat(50)]);
    }

    #[test]
    fn test_arabic_lengths_count_characters() {
        let text = "الصلاة خمس صلوات في اليوم. الزكاة واجبة على كل مسلم قادر.";
        let chunks = TextChunker::new(10, 40).chunk(text);
        assert_eq!(
            chunks,
            vec!["الصلاة خمس صلوات في اليوم.", "الزكاة واجبة على كل مسلم قادر."]
        );
    }

    struct BrokenSplitter;

    impl SentenceSplitter for BrokenSplitter {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn split(&self, _text: &str) -> Result<Vec<String>> {
            Err(DeenbotError::Chunking("tokenizer data missing".to_string()))
        }
    }

    #[test]
    fn test_failing_splitter_falls_through() {
        let chunker = TextChunker::new(10, 30)
            .with_splitters(vec![Box::new(BrokenSplitter), Box::new(RegexSentenceSplitter)]);
        let chunks = chunker.chunk("One short sentence. Another short sentence.");
        assert_eq!(chunks, vec!["One short sentence.", "Another short sentence."]);
    }

    #[test]
    fn test_all_splitters_failing_still_chunks() {
        let chunker = TextChunker::new(10, 30).with_splitters(vec![Box::new(BrokenSplitter)]);
        let text = "One short sentence. Another short sentence.";
        let joined: String = chunker.chunk(text).concat();
        assert_eq!(non_whitespace(&joined), non_whitespace(text));
    }

    #[test]
    fn test_chunk_context_assigns_indices() {
        let chunks = TextChunker::new(10, 40).chunk_context(
            "trans_0001",
            "الصلاة خمس صلوات في اليوم. الزكاة واجبة على كل مسلم قادر.",
        );
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].index, 1);
        assert_eq!(chunks[0].context_id, "trans_0001");
    }
}
