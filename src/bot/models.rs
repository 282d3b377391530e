use serde::{Deserialize, Serialize};

/// A historical question with its SQL, as returned by the similarity index.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamplePair {
    pub question: String,
    pub sql_query: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    #[serde(alias = "query")]
    pub question: String,
}

/// Response record for one request. Starts from `Default` and is filled in stage by stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub model_response: String,
    pub is_valid_syntax: bool,
    /// Seconds spent in the model backend call
    pub time_taken: f64,
    pub examples: String,
    pub similarity_scores: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_accepts_query_alias() {
        let a: QueryRequest = serde_json::from_value(json!({"question": "how many?"})).unwrap();
        let b: QueryRequest = serde_json::from_value(json!({"query": "how many?"})).unwrap();

        assert_eq!(a.question, b.question);
    }

    #[test]
    fn default_response_is_empty_record() {
        let value = serde_json::to_value(QueryResponse::default()).unwrap();

        assert_eq!(
            value,
            json!({
                "model_response": "",
                "is_valid_syntax": false,
                "time_taken": 0.0,
                "examples": "",
                "similarity_scores": [],
            })
        );
    }
}
