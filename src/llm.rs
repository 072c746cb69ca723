//! Chat-completion client used for the answer rewrite stage.

use crate::config::LlmSettings;
use crate::error::{DeenbotError, Result};
use crate::openai::{create_client_with_options, ClientOptions};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// A single-shot completion endpoint.
///
/// Any transport error, non-success status or empty content is an error;
/// there is no partial success.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Client for an OpenAI-compatible chat completions API (Groq by default).
pub struct ChatClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

impl ChatClient {
    /// Build a client when the rewrite stage is enabled and a key is available.
    pub fn from_settings(settings: &LlmSettings) -> Result<Option<Self>> {
        if !settings.enabled {
            debug!("LLM rewrite disabled in configuration");
            return Ok(None);
        }
        let Some(api_key) = settings.api_key() else {
            info!("{} not set, answers will be extractive only", settings.api_key_env);
            return Ok(None);
        };

        let client = create_client_with_options(&ClientOptions {
            api_base: Some(settings.api_base.clone()),
            api_key: Some(api_key),
            timeout: Duration::from_secs(settings.timeout_seconds),
        })?;

        Ok(Some(Self {
            client,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            top_p: settings.top_p,
        }))
    }
}

#[async_trait]
impl LlmClient for ChatClient {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| DeenbotError::Llm(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| DeenbotError::Llm(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .top_p(self.top_p)
            .build()
            .map_err(|e| DeenbotError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| DeenbotError::Llm(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| DeenbotError::Llm("Empty response from LLM".to_string()))?;

        debug!("Received {} characters from LLM", answer.chars().count());
        Ok(answer)
    }
}
