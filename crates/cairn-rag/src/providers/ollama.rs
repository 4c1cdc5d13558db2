//! Ollama-backed providers for embeddings and generation
//!
//! Both providers wrap a shared blocking `OllamaClient`; the client is built
//! once at construction and held for the process lifetime.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::generation::OllamaClient;

use super::embedding::EmbeddingProvider;
use super::llm::TextGenerator;

/// Ollama embedding provider (nomic-embed-text or similar models)
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Arc::new(OllamaClient::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?);
        tracing::info!(model = %config.model, "embedding provider initialized");
        Ok(Self {
            client,
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    /// Create from an existing client
    pub fn from_client(client: Arc<OllamaClient>, model: String, dimensions: usize) -> Self {
        Self {
            client,
            model,
            dimensions,
        }
    }

    /// Check if the backing server is reachable
    pub fn health_check(&self) -> bool {
        self.client.health_check()
    }
}

impl EmbeddingProvider for OllamaEmbedder {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        tracing::info!(count = texts.len(), "generating embeddings");

        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            // Reject locally before any network call; failing the whole
            // batch preserves the chunk/vector alignment.
            if text.trim().is_empty() {
                return Err(Error::embedding("cannot embed empty text"));
            }
            let vector = self.client.embed(&self.model, text)?;
            if vector.len() != self.dimensions {
                return Err(Error::embedding(format!(
                    "model '{}' returned dimension {} but {} was configured",
                    self.model,
                    vector.len(),
                    self.dimensions
                )));
            }
            vectors.push(vector);
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Ollama text-generation provider
pub struct OllamaGenerator {
    client: Arc<OllamaClient>,
    model: String,
    temperature: f32,
}

impl OllamaGenerator {
    /// Create a new Ollama generator
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Arc::new(OllamaClient::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?);
        tracing::info!(model = %config.model, "generation provider initialized");
        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Create from an existing client
    pub fn from_client(client: Arc<OllamaClient>, model: String, temperature: f32) -> Self {
        Self {
            client,
            model,
            temperature,
        }
    }

    /// Check if the backing server is reachable
    pub fn health_check(&self) -> bool {
        self.client.health_check()
    }
}

impl TextGenerator for OllamaGenerator {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.client.generate(&self.model, prompt, self.temperature)
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
