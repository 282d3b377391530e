use crate::index::embedding::Embedder;
use crate::index::{ExampleMetadata, IndexError, IndexQueryResult, SimilarityIndex};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One stored question with its SQL and precomputed embedding.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CollectionEntry {
    pub id: String,
    pub document: String,
    pub metadata: ExampleMetadata,
    pub embedding: Vec<f32>,
}

/// On-disk layout of `<dir>/<collection>.json`.
#[derive(Debug, Deserialize, Serialize)]
pub struct CollectionFile {
    pub name: String,
    pub entries: Vec<CollectionEntry>,
}

/// A persisted example collection loaded into memory at startup.
///
/// Entries are ranked by cosine distance to the embedded query text.
pub struct LocalVectorIndex {
    name: String,
    entries: Vec<CollectionEntry>,
    embedder: Box<dyn Embedder>,
}

impl LocalVectorIndex {
    pub fn open(dir: &Path, collection: &str, embedder: Box<dyn Embedder>) -> Result<Self, IndexError> {
        if !dir.is_dir() {
            return Err(IndexError::NotFound(dir.to_path_buf()));
        }

        let path = dir.join(format!("{}.json", collection));
        let raw = std::fs::read_to_string(&path).map_err(|e| IndexError::Open {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let file: CollectionFile = serde_json::from_str(&raw).map_err(|e| IndexError::Open {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        info!(
            "Opened example collection '{}' with {} entries from {}",
            file.name,
            file.entries.len(),
            path.display()
        );

        Ok(Self {
            name: file.name,
            entries: file.entries,
            embedder,
        })
    }
}

pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let (dot, na, nb) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f64, 0.0f64, 0.0f64), |(d, aa, bb), (x, y)| {
            let (x, y) = (*x as f64, *y as f64);
            (d + x * y, aa + x * x, bb + y * y)
        });

    if na == 0.0 || nb == 0.0 {
        1.0
    } else {
        1.0 - dot / (na.sqrt() * nb.sqrt())
    }
}

#[async_trait]
impl SimilarityIndex for LocalVectorIndex {
    async fn query(&self, text: &str, top_k: usize) -> Result<IndexQueryResult, IndexError> {
        let query_embedding = self.embedder.embed(text).await?;

        let mut scored = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if entry.embedding.len() != query_embedding.len() {
                return Err(IndexError::Query(format!(
                    "embedding dimension mismatch in '{}': query has {}, entry '{}' has {}",
                    self.name,
                    query_embedding.len(),
                    entry.id,
                    entry.embedding.len()
                )));
            }
            scored.push((entry, cosine_distance(&query_embedding, &entry.embedding)));
        }

        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(top_k);

        let mut result = IndexQueryResult::default();
        for (entry, distance) in scored {
            result.documents.push(entry.document.clone());
            result.metadatas.push(entry.metadata.clone());
            result.distances.push(distance);
        }

        Ok(result)
    }
}
