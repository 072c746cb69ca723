//! Configuration module for DeenBot.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, Prompts};
pub use settings::{
    AnswerSettings, ChunkingSettings, EmbeddingSettings, GeneralSettings, IndexBackend,
    LlmSettings, PromptSettings, RankingSettings, RetrievalSettings, Settings,
};
