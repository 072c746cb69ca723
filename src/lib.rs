//! DeenBot - Questions and answers over lecture transcripts
//!
//! Answers questions about transcribed Islamic lectures in Arabic, French,
//! English, Spanish and German, grounded in the transcript text.
//!
//! # Overview
//!
//! A question against a stored transcript (a *context*) goes through:
//! - vector retrieval of candidate chunks, or re-chunking of the raw
//!   transcript when the index has nothing
//! - local keyword or proximity ranking of those chunks
//! - an LLM rewrite of the best chunks, falling back to an extractive answer
//! - a language-specific template whenever no answer can be built
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `language` - Language detection, stopwords and response templates
//! - `chunking` - Transcript chunking
//! - `ranking` - Keyword extraction, relevance scoring and chunk ranking
//! - `embedding` - Embedding generation
//! - `vector_store` - Persistent and in-memory vector indexes
//! - `transcript` - Raw transcript storage
//! - `llm` - Chat-completion client
//! - `rag` - Answer synthesis
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use deenbot::config::Settings;
//! use deenbot::orchestrator::Orchestrator;
//! use deenbot::rag::AskOptions;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let orchestrator = Orchestrator::new(Settings::load()?)?;
//!
//!     let text = std::fs::read_to_string("lecture.txt")?;
//!     let ingested = orchestrator.ingest(&text, None).await?;
//!
//!     let answer = orchestrator
//!         .ask("كم عدد الصلوات؟", &ingested.context_id, &AskOptions::default())
//!         .await;
//!     println!("{}", answer.text);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod language;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod ranking;
pub mod transcript;
pub mod vector_store;

pub use error::{DeenbotError, Result};
