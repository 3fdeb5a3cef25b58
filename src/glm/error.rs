//! GLM client errors.

use thiserror::Error;

/// Errors from the GLM chat-completions client.
#[derive(Debug, Error)]
pub enum GlmError {
    /// No API key in configuration or the `GLM_API_KEY` environment variable.
    #[error("GLM API key not set; set GLM_API_KEY or api.glm.api_key")]
    MissingApiKey,

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-retriable API rejection (4xx other than 429).
    #[error("GLM API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response decoded but lacked the expected structure.
    #[error("malformed GLM response: {reason}")]
    MalformedResponse { reason: String },

    /// Every retry attempt failed.
    #[error("GLM request failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}
