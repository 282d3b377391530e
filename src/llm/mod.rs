pub mod prompt;
pub mod providers;

use crate::config::LlmConfig;
use async_trait::async_trait;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM connection error: {0}")]
    ConnectionError(String),
    #[error("LLM response error: {0}")]
    ResponseError(String),
    #[error("LLM configuration error: {0}")]
    ConfigError(String),
}

/// A text-completion backend. Takes a fully rendered prompt, returns the raw completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

pub struct LlmManager {
    generator: Box<dyn TextGenerator>,
    backend: String,
    model: String,
}

impl LlmManager {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let generator: Box<dyn TextGenerator> = match config.backend.as_str() {
            "gemini" => Box::new(providers::gemini::GeminiProvider::new(config)?),
            "remote" => Box::new(providers::remote::RemoteLlmProvider::new(config)?),
            "ollama" => Box::new(providers::ollama::OllamaProvider::new(config)?),
            _ => {
                return Err(LlmError::ConfigError(format!(
                    "Unsupported LLM backend: {}",
                    config.backend
                )))
            }
        };

        Ok(Self {
            generator,
            backend: config.backend.clone(),
            model: config.model.clone(),
        })
    }

    #[cfg(test)]
    pub fn with_generator(generator: Box<dyn TextGenerator>) -> Self {
        Self {
            generator,
            backend: "test".to_string(),
            model: "test".to_string(),
        }
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` to the backend. The elapsed seconds cover the backend call only.
    pub async fn invoke(&self, prompt: &str) -> Result<(String, f64), LlmError> {
        debug!("Sending prompt to {} backend ({} chars)", self.backend, prompt.len());

        let start = Instant::now();
        let response = self.generator.generate(prompt).await?;
        let elapsed = start.elapsed().as_secs_f64();

        Ok((response, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    struct SlowEcho {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for SlowEcho {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok("SELECT 1;".to_string())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl TextGenerator for Unreachable {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::ConnectionError("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn invoke_times_the_backend_call() {
        let manager = LlmManager::with_generator(Box::new(SlowEcho { seen: Mutex::new(Vec::new()) }));

        let (response, elapsed) = manager.invoke("### User: \nhow many?").await.unwrap();

        assert_eq!(response, "SELECT 1;");
        assert!(elapsed >= 0.02, "elapsed was {elapsed}");
    }

    #[tokio::test]
    async fn invoke_propagates_backend_errors() {
        let manager = LlmManager::with_generator(Box::new(Unreachable));

        let err = manager.invoke("prompt").await.unwrap_err();

        assert!(matches!(err, LlmError::ConnectionError(_)));
    }

    #[test]
    fn unknown_backend_is_a_config_error() {
        let mut config = crate::config::AppConfig::default().llm;
        config.backend = "local".to_string();

        let err = LlmManager::new(&config).err().unwrap();

        assert!(err.to_string().contains("Unsupported LLM backend: local"));
    }
}
