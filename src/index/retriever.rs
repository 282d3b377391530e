use crate::bot::models::ExamplePair;
use crate::index::{IndexError, IndexQueryResult, SimilarityIndex};
use std::sync::Arc;
use tracing::debug;

/// Number of neighbours placed in the prompt.
pub const TOP_K: usize = 4;

pub struct Retriever {
    index: Option<Arc<dyn SimilarityIndex>>,
}

impl Retriever {
    pub fn new(index: Arc<dyn SimilarityIndex>) -> Self {
        Self { index: Some(index) }
    }

    pub fn disabled() -> Self {
        Self { index: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.index.is_some()
    }

    /// Returns the serialized examples and one similarity score per example.
    ///
    /// Without an index this is `("", [])`. Index failures are returned to the caller.
    pub async fn retrieve(&self, question: &str) -> Result<(String, Vec<f64>), IndexError> {
        let Some(index) = &self.index else {
            return Ok((String::new(), Vec::new()));
        };

        let pairs = example_pairs(index.query(question, TOP_K).await?);
        debug!("Retrieved {} examples", pairs.len());

        let scores = pairs.iter().map(|pair| pair.similarity).collect();
        Ok((serialize_examples(&pairs), scores))
    }
}

/// Zips the index result in index order. Similarity is `1 - distance`.
pub fn example_pairs(result: IndexQueryResult) -> Vec<ExamplePair> {
    result
        .documents
        .into_iter()
        .zip(result.metadatas)
        .zip(result.distances)
        .map(|((question, metadata), distance)| ExamplePair {
            question,
            sql_query: metadata.response,
            similarity: 1.0 - distance,
        })
        .collect()
}

pub fn serialize_examples(pairs: &[ExamplePair]) -> String {
    pairs
        .iter()
        .map(|pair| {
            format!(
                "{{\n    'question': '{}',\n    'sql_query': '{}'\n}}",
                pair.question, pair.sql_query
            )
        })
        .collect::<Vec<_>>()
        .join(",\n")
}
