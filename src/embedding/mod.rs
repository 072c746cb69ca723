//! Embedding generation for vector retrieval.

mod hash;
mod openai;

pub use hash::HashEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::EmbeddingSettings;
use crate::error::{DeenbotError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier used in logs, e.g. `openai:text-embedding-3-small`.
    fn name(&self) -> String;

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DeenbotError::Embedding("Empty embedding response".to_string()))
    }

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Ordered list of embedders. The first one that succeeds wins.
pub struct EmbedderChain {
    embedders: Vec<Arc<dyn Embedder>>,
}

impl EmbedderChain {
    pub fn new(embedders: Vec<Arc<dyn Embedder>>) -> Self {
        Self { embedders }
    }

    pub fn len(&self) -> usize {
        self.embedders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embedders.is_empty()
    }
}

#[async_trait]
impl Embedder for EmbedderChain {
    fn name(&self) -> String {
        self.embedders
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut last_error = None;
        for embedder in &self.embedders {
            match embedder.embed_batch(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) => {
                    warn!("Embedder {} failed: {}, trying next", embedder.name(), e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| DeenbotError::Embedding("No embedders configured".to_string())))
    }

    fn dimensions(&self) -> usize {
        self.embedders.first().map_or(0, |e| e.dimensions())
    }
}

/// Build the embedder described by the settings.
///
/// With an `openai` provider and a `fallback_model`, the alternate model is
/// tried after the primary one.
pub fn create_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let dimensions = settings.dimensions as usize;

    match settings.provider.to_lowercase().as_str() {
        "hash" | "local" => Ok(Arc::new(HashEmbedder::new(dimensions))),
        "openai" => {
            let primary: Arc<dyn Embedder> =
                Arc::new(OpenAIEmbedder::with_config(&settings.model, dimensions)?);
            let Some(fallback) = &settings.fallback_model else {
                return Ok(primary);
            };
            let alternate: Arc<dyn Embedder> =
                Arc::new(OpenAIEmbedder::with_config(fallback, dimensions)?);
            let chain = EmbedderChain::new(vec![primary, alternate]);
            info!("Using embedder chain {}", chain.name());
            Ok(Arc::new(chain))
        }
        other => Err(DeenbotError::Config(format!(
            "Unknown embedding provider: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        fn name(&self) -> String {
            "failing".to_string()
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(DeenbotError::Embedding("model unavailable".to_string()))
        }

        fn dimensions(&self) -> usize {
            8
        }
    }

    #[tokio::test]
    async fn test_chain_takes_first_success() {
        let chain = EmbedderChain::new(vec![
            Arc::new(FailingEmbedder),
            Arc::new(HashEmbedder::new(8)),
        ]);
        let vectors = chain.embed_batch(&["text".to_string()]).await.unwrap();
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0], HashEmbedder::new(8).embed_text("text"));
    }

    #[tokio::test]
    async fn test_chain_reports_last_error() {
        let chain = EmbedderChain::new(vec![Arc::new(FailingEmbedder)]);
        let err = chain.embed("text").await.unwrap_err();
        assert!(err.to_string().contains("model unavailable"));

        let empty = EmbedderChain::new(Vec::new());
        assert!(empty.embed("text").await.is_err());
    }

    #[test]
    fn test_create_embedder_by_provider() {
        let settings = EmbeddingSettings::default();
        assert_eq!(create_embedder(&settings).unwrap().name(), "hash:384");

        let settings = EmbeddingSettings {
            provider: "cohere".to_string(),
            ..EmbeddingSettings::default()
        };
        assert!(create_embedder(&settings).is_err());
    }
}
