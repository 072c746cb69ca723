//! Configuration settings for DeenBot.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub chunking: ChunkingSettings,
    pub ranking: RankingSettings,
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub llm: LlmSettings,
    pub answer: AnswerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.deenbot".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Transcript chunking settings. Sizes are counted in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Texts shorter than this are kept as a single chunk.
    pub min_chunk_size: usize,
    /// Upper bound for a chunk, except for hard-split sentence slices.
    pub max_chunk_size: usize,
    /// Sentence splitters to try, in order (unicode, regex).
    pub sentence_splitters: Vec<String>,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            min_chunk_size: 100,
            max_chunk_size: 500,
            sentence_splitters: vec!["unicode".to_string(), "regex".to_string()],
        }
    }
}

/// Chunk relevance ranking settings.
///
/// The numeric defaults are empirically tuned and kept overridable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    /// Scoring strategy (keyword, proximity).
    pub strategy: String,
    /// Number of positively scored chunks to keep.
    pub top_n: usize,
    /// Number of leading chunks used when nothing scores above zero.
    pub fallback_chunks: usize,
    /// Divisor applied to sqrt(word count) when normalizing keyword scores.
    pub normalization_divisor: f64,
    /// Bonus for an adjacent keyword pair found verbatim.
    pub bigram_bonus: f64,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            strategy: "keyword".to_string(),
            top_n: 3,
            fallback_chunks: 2,
            normalization_divisor: 10.0,
            bigram_bonus: 2.0,
        }
    }
}

/// Vector index backend type. Chosen once at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// SQLite-backed index that survives restarts.
    #[default]
    Persistent,
    /// Process-local index held in the index registry.
    Memory,
}

impl std::str::FromStr for IndexBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "persistent" | "sqlite" => Ok(IndexBackend::Persistent),
            "memory" | "in-memory" => Ok(IndexBackend::Memory),
            _ => Err(format!("Unknown index backend: {}", s)),
        }
    }
}

impl std::fmt::Display for IndexBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexBackend::Persistent => write!(f, "persistent"),
            IndexBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Vector index backend (persistent, memory).
    pub backend: IndexBackend,
    /// Path to the SQLite database (persistent backend).
    pub sqlite_path: String,
    /// Directory holding raw transcripts as `<context_id>.txt`.
    pub transcripts_dir: String,
    /// Number of chunks requested from the vector index.
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Persistent,
            sqlite_path: "~/.deenbot/index.db".to_string(),
            transcripts_dir: "~/.deenbot/transcripts".to_string(),
            top_k: 5,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (hash, openai).
    pub provider: String,
    /// Embedding model (openai provider).
    pub model: String,
    /// Alternate model tried when the primary one fails.
    pub fallback_model: Option<String>,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "hash".to_string(),
            model: "text-embedding-3-small".to_string(),
            fallback_model: None,
            dimensions: 384,
        }
    }
}

/// LLM rewrite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Allow the LLM rewrite stage.
    pub enabled: bool,
    /// Base URL of an OpenAI-compatible chat completions API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Chat model.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    /// Seconds before the call is abandoned.
    pub timeout_seconds: u64,
    /// Shorter responses are treated as a failed attempt.
    pub min_answer_chars: usize,
    /// Context longer than this is truncated before prompting.
    pub max_context_chars: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            model: "meta-llama/llama-4-maverick-17b-128e-instruct".to_string(),
            temperature: 0.0,
            max_tokens: 1024,
            top_p: 0.1,
            timeout_seconds: 60,
            min_answer_chars: 20,
            max_context_chars: 15000,
        }
    }
}

impl LlmSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Extractive answer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerSettings {
    /// Maximum length of an extractive answer, in characters.
    pub max_response_length: usize,
    /// Extractive answers shorter than this become the no-answer template.
    pub min_answer_chars: usize,
    /// Maximum number of chunks concatenated or fed to the LLM.
    pub max_sources: usize,
}

impl Default for AnswerSettings {
    fn default() -> Self {
        Self {
            max_response_length: 500,
            min_answer_chars: 10,
            max_sources: 3,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::DeenbotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("deenbot")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.retrieval.sqlite_path)
    }

    /// Get the expanded transcripts directory.
    pub fn transcripts_dir(&self) -> PathBuf {
        Self::expand_path(&self.retrieval.transcripts_dir)
    }
}
