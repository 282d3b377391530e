use crate::config::EmbeddingConfig;
use crate::index::IndexError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, IndexError>;
}

pub fn embedder_from_config(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>, IndexError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| IndexError::Embedding(e.to_string()))?;

    match config.backend.as_str() {
        "ollama" => Ok(Box::new(OllamaEmbedder {
            client,
            api_url: config
                .api_url
                .clone()
                .unwrap_or_else(|| "http://localhost:11434/api/embeddings".to_string()),
            model: config.model.clone(),
        })),
        "remote" => {
            let api_url = config.api_url.clone().ok_or_else(|| {
                IndexError::Embedding("API URL is required for remote embeddings".to_string())
            })?;
            Ok(Box::new(RemoteEmbedder {
                client,
                api_url,
                api_key: config.api_key.clone(),
                model: config.model.clone(),
            }))
        }
        other => Err(IndexError::Embedding(format!(
            "Unsupported embedding backend: {}",
            other
        ))),
    }
}

pub struct OllamaEmbedder {
    client: reqwest::Client,
    api_url: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, IndexError> {
        debug!("Embedding query with Ollama model: {}", self.model);

        let response = self
            .client
            .post(&self.api_url)
            .json(&OllamaEmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| IndexError::Embedding(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IndexError::Embedding(format!(
                "Ollama embeddings responded with status code: {}",
                response.status()
            )));
        }

        let body: OllamaEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Embedding(e.to_string()))?;

        Ok(body.embedding)
    }
}

/// OpenAI-compatible `/v1/embeddings` endpoint.
pub struct RemoteEmbedder {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct RemoteEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct RemoteEmbeddingResponse {
    data: Vec<RemoteEmbeddingData>,
}

#[derive(Deserialize)]
struct RemoteEmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, IndexError> {
        let mut request = self.client.post(&self.api_url).json(&RemoteEmbeddingRequest {
            model: &self.model,
            input: text,
        });
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| IndexError::Embedding(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IndexError::Embedding(format!(
                "Embeddings API responded with status code: {}",
                response.status()
            )));
        }

        let body: RemoteEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Embedding(e.to_string()))?;

        body.data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| IndexError::Embedding("No embedding in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn ollama_is_the_default_backend() {
        let config = AppConfig::default().embedding;

        assert!(embedder_from_config(&config).is_ok());
    }

    #[test]
    fn remote_backend_needs_url() {
        let mut config = AppConfig::default().embedding;
        config.backend = "remote".to_string();

        let err = embedder_from_config(&config).err().unwrap();

        assert!(err.to_string().contains("API URL is required"));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let mut config = AppConfig::default().embedding;
        config.backend = "sentence-transformers".to_string();

        assert!(matches!(
            embedder_from_config(&config),
            Err(IndexError::Embedding(_))
        ));
    }
}
