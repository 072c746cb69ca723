//! Client construction for OpenAI-compatible APIs (OpenAI, Groq).

use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection options for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL, e.g. `https://api.groq.com/openai/v1`. Defaults to OpenAI.
    pub api_base: Option<String>,
    /// API key. Falls back to `OPENAI_API_KEY` when unset.
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_base: None,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Create a client for the default OpenAI endpoint.
pub fn create_client() -> Result<Client<OpenAIConfig>> {
    create_client_with_options(&ClientOptions::default())
}

/// Backoff policy that gives up after the first attempt.
///
/// The client otherwise retries rate-limited requests until its own
/// deadline, which would outlast the caller's timeout.
pub fn no_retry_backoff() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// Create a client with a custom endpoint, key and request timeout.
///
/// Requests are attempted once; rate-limit responses are not retried.
pub fn create_client_with_options(options: &ClientOptions) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(options.timeout).build()?;

    let mut config = OpenAIConfig::default();
    if let Some(base) = &options.api_base {
        config = config.with_api_base(base.trim_end_matches('/'));
    }
    if let Some(key) = &options.api_key {
        config = config.with_api_key(key);
    }

    Ok(Client::with_config(config)
        .with_http_client(http_client)
        .with_backoff(no_retry_backoff()))
}
