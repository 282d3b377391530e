//! Substitutable collaborators for pipeline and HTTP tests.

use crate::bot::context::BotContext;
use crate::index::retriever::Retriever;
use crate::index::{ExampleMetadata, IndexError, IndexQueryResult, SimilarityIndex};
use crate::llm::{LlmError, LlmManager, TextGenerator};
use crate::sql::validator::{SqlParserValidator, SqlValidator, SyntaxCheck, ValidatorError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const TEST_SCHEMA: &str = "CREATE TABLE users (id INTEGER, name TEXT, age INTEGER);";

pub fn neighbours(rows: &[(&str, &str, f64)]) -> IndexQueryResult {
    IndexQueryResult {
        documents: rows.iter().map(|(q, _, _)| q.to_string()).collect(),
        metadatas: rows
            .iter()
            .map(|(_, sql, _)| ExampleMetadata {
                response: sql.to_string(),
            })
            .collect(),
        distances: rows.iter().map(|(_, _, d)| *d).collect(),
    }
}

pub struct FakeIndex {
    result: Option<IndexQueryResult>,
}

impl FakeIndex {
    pub fn returning(result: IndexQueryResult) -> Self {
        Self {
            result: Some(result),
        }
    }

    pub fn failing() -> Self {
        Self { result: None }
    }
}

#[async_trait]
impl SimilarityIndex for FakeIndex {
    async fn query(&self, _text: &str, _top_k: usize) -> Result<IndexQueryResult, IndexError> {
        self.result
            .clone()
            .ok_or_else(|| IndexError::Query("collection is unavailable".to_string()))
    }
}

pub struct ScriptedModel {
    reply: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Arc::default(),
        }
    }

    /// Prompts received so far, shared with the model after it is boxed.
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| LlmError::ConnectionError("backend unreachable".to_string()))
    }
}

/// Holds every call until the test releases it.
pub struct GatedModel {
    entered: Arc<AtomicUsize>,
    release: Arc<Notify>,
}

impl GatedModel {
    pub fn new() -> Self {
        Self {
            entered: Arc::default(),
            release: Arc::new(Notify::new()),
        }
    }

    /// Number of calls that reached the model so far.
    pub fn entered(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.entered)
    }

    pub fn release(&self) -> Arc<Notify> {
        Arc::clone(&self.release)
    }
}

#[async_trait]
impl TextGenerator for GatedModel {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok("SELECT 1;".to_string())
    }
}

pub struct BrokenValidator;

impl SqlValidator for BrokenValidator {
    fn validate(&self, _sql: &str) -> Result<SyntaxCheck, ValidatorError> {
        Err(ValidatorError::Aborted("validator misconfigured".to_string()))
    }
}

pub fn context_with(
    index: Option<FakeIndex>,
    model: impl TextGenerator + 'static,
    validator: Option<Box<dyn SqlValidator>>,
) -> BotContext {
    let retriever = match index {
        Some(index) => Retriever::new(Arc::new(index)),
        None => Retriever::disabled(),
    };
    let validator: Box<dyn SqlValidator> = match validator {
        Some(validator) => validator,
        None => Box::new(SqlParserValidator::new("generic").unwrap()),
    };

    BotContext {
        schema: TEST_SCHEMA.to_string(),
        retriever,
        llm: LlmManager::with_generator(Box::new(model)),
        validator,
    }
}
