use crate::config::AppConfig;
use crate::index::embedding::embedder_from_config;
use crate::index::local::LocalVectorIndex;
use crate::index::retriever::Retriever;
use crate::index::IndexError;
use crate::llm::{LlmError, LlmManager};
use crate::sql::validator::{SqlParserValidator, SqlValidator, ValidatorError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("'{}' file not found", .0.display())]
    SchemaNotFound(PathBuf),
    #[error("failed to read schema '{}': {source}", .path.display())]
    SchemaRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Validator(#[from] ValidatorError),
}

/// Everything a request needs, built once before the server accepts traffic
/// and shared read-only afterwards.
pub struct BotContext {
    pub schema: String,
    pub retriever: Retriever,
    pub llm: LlmManager,
    pub validator: Box<dyn SqlValidator>,
}

pub fn load_schema(path: &Path) -> Result<String, StartupError> {
    if !path.is_file() {
        return Err(StartupError::SchemaNotFound(path.to_path_buf()));
    }

    info!("Loading LLM schema from {}", path.display());
    std::fs::read_to_string(path).map_err(|source| StartupError::SchemaRead {
        path: path.to_path_buf(),
        source,
    })
}

impl BotContext {
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let schema = load_schema(&config.schema.path)?;

        let retriever = match &config.index.path {
            Some(dir) => {
                let embedder = embedder_from_config(&config.embedding)?;
                let index = LocalVectorIndex::open(dir, &config.index.collection, embedder)?;
                Retriever::new(Arc::new(index))
            }
            None => {
                warn!("No example index configured. Examples will not be added in prompt.");
                Retriever::disabled()
            }
        };

        info!("Initializing LLM manager with backend: {}", config.llm.backend);
        let llm = LlmManager::new(&config.llm)?;
        let validator = SqlParserValidator::new(&config.validator.dialect)?;

        Ok(Self {
            schema,
            retriever,
            llm,
            validator: Box::new(validator),
        })
    }
}
