pub mod gemini;
pub mod ollama;
pub mod remote;

use crate::llm::LlmError;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{error, warn};

const RETRY_BACKOFF: Duration = Duration::from_millis(500);

pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LlmError::ConnectionError(e.to_string()))
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Sends the request produced by `build`, retrying connection failures, 429 and 5xx
/// responses up to `max_retries` extra times.
pub(crate) async fn send_with_retry<F>(
    backend: &str,
    max_retries: u32,
    build: F,
) -> Result<reqwest::Response, LlmError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;
    loop {
        match build().send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) if is_transient(response.status()) && attempt < max_retries => {
                warn!(
                    "{} API responded with status code: {} (attempt {}/{})",
                    backend,
                    response.status(),
                    attempt + 1,
                    max_retries + 1
                );
            }
            Ok(response) => {
                let status = response.status();
                // Try to get the error message from the response body
                let error_body = match response.text().await {
                    Ok(body) if !body.is_empty() => format!(" - Response body: {}", body),
                    _ => String::new(),
                };

                error!("{} API responded with status code: {}{}", backend, status, error_body);
                return Err(LlmError::ResponseError(format!(
                    "{} API responded with status code: {}{}",
                    backend, status, error_body
                )));
            }
            Err(e) if attempt < max_retries => {
                warn!(
                    "{} request failed: {} (attempt {}/{})",
                    backend,
                    e,
                    attempt + 1,
                    max_retries + 1
                );
            }
            Err(e) => return Err(LlmError::ConnectionError(e.to_string())),
        }

        attempt += 1;
        tokio::time::sleep(RETRY_BACKOFF * attempt).await;
    }
}
