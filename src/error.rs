//! Error types for DeenBot.

use thiserror::Error;

/// Library-level error type for DeenBot operations.
#[derive(Error, Debug)]
pub enum DeenbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Chunking failed: {0}")]
    Chunking(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Transcript store error: {0}")]
    Transcript(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("RAG error: {0}")]
    Rag(String),

    #[error("Context not found: {0}")]
    ContextNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for DeenBot operations.
pub type Result<T> = std::result::Result<T, DeenbotError>;
