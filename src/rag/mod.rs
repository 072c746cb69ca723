//! Answer synthesis over a single transcript context.
//!
//! Retrieval narrows the transcript to candidate chunks, local ranking picks
//! the most relevant ones, and an ordered list of answer strategies (LLM
//! rewrite, then extraction) turns them into the final text.

mod extractive;
mod postprocess;
mod retrieval;
mod synthesizer;

pub use extractive::{extractive_answer, truncate_at_sentence};
pub use postprocess::{clean_llm_answer, strip_reasoning, truncate_context};
pub use retrieval::{ContextRetriever, Retrieved, RetrievalSource};
pub use synthesizer::{AnswerStrategy, AnswerSynthesizer, ExtractiveStrategy, LlmRewriteStrategy, StrategyInput};

use crate::chunking::Chunk;
use crate::language::{template, Lang, TemplateKey};
use serde::{Deserialize, Serialize};

/// Where the final answer text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOrigin {
    /// Rewritten by the language model.
    Llm,
    /// Assembled from ranked chunks.
    Extractive,
    /// A fixed response template.
    Template(TemplateKey),
}

/// A synthesized answer and the chunks it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<Chunk>,
    pub lang: Lang,
    pub origin: AnswerOrigin,
}

impl Answer {
    /// A template answer with no sources.
    pub fn from_template(lang: Lang, key: TemplateKey) -> Self {
        Self {
            text: template(lang, key).to_string(),
            sources: Vec::new(),
            lang,
            origin: AnswerOrigin::Template(key),
        }
    }
}

/// Per-request options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AskOptions {
    /// Allow the LLM rewrite stage when a client is configured.
    pub use_llm: bool,
    /// Declared language; detected from the question when absent.
    pub lang: Option<Lang>,
}

impl Default for AskOptions {
    fn default() -> Self {
        Self {
            use_llm: true,
            lang: None,
        }
    }
}
