pub mod context;
pub mod models;
#[cfg(test)]
pub mod testing;

use crate::bot::context::BotContext;
use crate::bot::models::QueryResponse;
use crate::index::IndexError;
use crate::llm::prompt::build_prompt;
use crate::llm::LlmError;
use crate::sql::normalizer::normalize;
use crate::sql::validator::{SqlValidator, SyntaxCheck, ValidatorError};
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Retrieving,
    Generating,
    Normalizing,
    Validating,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Retrieving => "retrieving",
            Stage::Generating => "generating",
            Stage::Normalizing => "normalizing",
            Stage::Validating => "validating",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Failures before post-processing. These abort the request without a response record.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] IndexError),
    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryStatus {
    Done,
    Failed { stage: Stage, reason: String },
}

#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub status: QueryStatus,
    /// Populated as far as the pipeline got, also when it failed
    pub response: QueryResponse,
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Done
    }
}

/// Runs one question through retrieval, generation, normalization and validation.
pub async fn answer_question(
    context: &BotContext,
    question: &str,
) -> Result<QueryOutcome, PipelineError> {
    info!(stage = %Stage::Retrieving, "User query: '{}'", question);
    let (examples, similarity_scores) = context.retriever.retrieve(question).await?;

    debug!(stage = %Stage::Generating, examples = similarity_scores.len(), "Building prompt");
    let prompt = build_prompt(question, &context.schema, &examples);
    let (model_response, time_taken) = context.llm.invoke(&prompt).await?;
    info!("LLM response: '{}' ({:.3}s)", model_response, time_taken);

    let mut response = QueryResponse {
        model_response,
        time_taken,
        examples,
        similarity_scores,
        ..Default::default()
    };

    match post_process(context.validator.as_ref(), &mut response) {
        Ok(()) => {
            debug!(stage = %Stage::Done, valid = response.is_valid_syntax, "Query answered");
            Ok(QueryOutcome {
                status: QueryStatus::Done,
                response,
            })
        }
        Err((stage, e)) => {
            error!(stage = %Stage::Failed, failed_at = %stage, "Exception: {}", e);
            Ok(QueryOutcome {
                status: QueryStatus::Failed {
                    stage,
                    reason: e.to_string(),
                },
                response,
            })
        }
    }
}

/// Normalizes and validates in place. On error the record keeps what was already written.
fn post_process(
    validator: &dyn SqlValidator,
    response: &mut QueryResponse,
) -> Result<(), (Stage, ValidatorError)> {
    debug!(stage = %Stage::Normalizing, "Normalizing model response");
    response.model_response = normalize(&response.model_response);

    debug!(stage = %Stage::Validating, "Validating SQL syntax");
    let check = validator
        .validate(&response.model_response)
        .map_err(|e| (Stage::Validating, e))?;
    if let SyntaxCheck::Invalid { diagnostic } = &check {
        info!("Generated SQL did not parse: {}", diagnostic);
    }
    response.is_valid_syntax = check.is_valid();

    Ok(())
}
