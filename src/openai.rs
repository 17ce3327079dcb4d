//! OpenAI client and shared HTTP client construction.

use crate::error::{HarkError, Result};
use async_openai::error::OpenAIError;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Build a reqwest client with a request timeout.
///
/// Every backend call goes through a client built here, so no request can
/// hang indefinitely.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Create an OpenAI client with a custom timeout.
pub fn create_client_with_timeout(timeout: Duration) -> Result<Client<OpenAIConfig>> {
    Ok(Client::with_config(OpenAIConfig::default()).with_http_client(http_client(timeout)?))
}

/// Map an OpenAI client error onto the query-path taxonomy.
pub fn backend_error(service: &str, err: OpenAIError) -> HarkError {
    HarkError::BackendUnavailable(format!("{} request failed: {}", service, err))
}

/// Check if the OpenAI API key is configured.
pub fn is_api_key_configured() -> bool {
    std::env::var("OPENAI_API_KEY").is_ok_and(|key| !key.is_empty())
}
