pub mod embedding;
pub mod local;
pub mod retriever;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("'{}' directory not found", .0.display())]
    NotFound(PathBuf),
    #[error("failed to open collection '{}': {reason}", .path.display())]
    Open { path: PathBuf, reason: String },
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("index query error: {0}")]
    Query(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleMetadata {
    /// SQL answering the stored question
    pub response: String,
}

/// Nearest neighbours of one query, best match first. The three vectors are parallel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexQueryResult {
    pub documents: Vec<String>,
    pub metadatas: Vec<ExampleMetadata>,
    pub distances: Vec<f64>,
}

/// Read-only nearest-neighbour lookup over stored questions.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    async fn query(&self, text: &str, top_k: usize) -> Result<IndexQueryResult, IndexError>;
}
