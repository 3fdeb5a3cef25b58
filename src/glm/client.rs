//! GLM chat-completions client.
//!
//! Serial request flow with exponential-backoff retry: rate limits (429) and
//! server errors are retried, other client errors fail immediately.
//! Cumulative token usage is tracked across the client's lifetime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::SystemConfig;
use crate::glm::error::GlmError;
use crate::roots::provider::{ProviderError, RootProvider};

const DEFAULT_MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_secs(2);

/// Cumulative token counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

/// GLM API client.
pub struct GlmClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_retries: u32,
    usage_input: AtomicU64,
    usage_output: AtomicU64,
    usage_total: AtomicU64,
}

impl GlmClient {
    /// Build a client from system configuration.
    ///
    /// The API key comes from `api.glm.api_key` (usually injected via
    /// `${GLM_API_KEY}` substitution) or, failing that, the `GLM_API_KEY`
    /// environment variable.
    ///
    /// # Errors
    /// [`GlmError::MissingApiKey`] when neither source provides a key.
    pub fn from_config(system: &SystemConfig) -> Result<Self, GlmError> {
        let configured = system.api.glm.api_key.trim();
        let api_key = if !configured.is_empty() && !configured.starts_with("${") {
            configured.to_string()
        } else {
            std::env::var("GLM_API_KEY").map_err(|_| GlmError::MissingApiKey)?
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(system.api.timeout))
            .build()?;

        log::debug!("GlmClient initialized, model={}", system.api.glm.model);

        Ok(Self {
            client,
            api_key,
            base_url: system.api.glm.base_url.clone(),
            model: system.api.glm.model.clone(),
            max_retries: DEFAULT_MAX_RETRIES,
            usage_input: AtomicU64::new(0),
            usage_output: AtomicU64::new(0),
            usage_total: AtomicU64::new(0),
        })
    }

    /// Send one prompt and return the assistant text.
    ///
    /// Retries transport failures, 429s, and 5xx responses with exponential
    /// backoff (2s, 4s, 8s); any other 4xx is fatal.
    pub async fn chat(&self, prompt: &str) -> Result<String, GlmError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": prompt},
                {"role": "user", "content": "Generate the requested roots now."},
            ],
            "temperature": 0.9,
            "top_p": 0.9,
            "max_tokens": 4096,
        });

        let mut last_error = String::new();
        let mut retry_delay = RETRY_BASE_DELAY;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                log::warn!("GLM API retry attempt {} after {:?}", attempt, retry_delay);
                tokio::time::sleep(retry_delay).await;
                retry_delay *= 2;
            }

            let response = match self
                .client
                .post(&self.base_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                last_error = "rate limited by GLM API (429)".to_string();
                continue;
            }
            if status.is_server_error() {
                last_error = format!("GLM API server error: {status}");
                continue;
            }

            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            if status.is_client_error() {
                return Err(GlmError::Api {
                    status: status.as_u16(),
                    body: text.chars().take(1000).collect(),
                });
            }

            let payload: Value =
                serde_json::from_str(&text).map_err(|e| GlmError::MalformedResponse {
                    reason: format!("invalid JSON: {e}"),
                })?;
            self.record_usage(&payload);
            return extract_content(&payload);
        }

        Err(GlmError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last: last_error,
        })
    }

    /// Cumulative token usage across all calls on this client.
    pub fn token_usage(&self) -> TokenUsage {
        TokenUsage {
            input: self.usage_input.load(Ordering::Relaxed),
            output: self.usage_output.load(Ordering::Relaxed),
            total: self.usage_total.load(Ordering::Relaxed),
        }
    }

    fn record_usage(&self, payload: &Value) {
        let usage = &payload["usage"];
        let take = |key: &str| usage[key].as_u64().unwrap_or(0);
        let (input, output, total) = (
            take("prompt_tokens"),
            take("completion_tokens"),
            take("total_tokens"),
        );
        self.usage_input.fetch_add(input, Ordering::Relaxed);
        self.usage_output.fetch_add(output, Ordering::Relaxed);
        self.usage_total.fetch_add(total, Ordering::Relaxed);
        log::debug!("GLM call used tokens: input={input}, output={output}, total={total}");
    }
}

fn extract_content(payload: &Value) -> Result<String, GlmError> {
    if let Some(error) = payload.get("error") {
        return Err(GlmError::MalformedResponse {
            reason: format!("API error payload: {error}"),
        });
    }
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| GlmError::MalformedResponse {
            reason: "missing choices[0].message.content".to_string(),
        })
}

#[async_trait]
impl RootProvider for GlmClient {
    async fn generate_roots(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(self.chat(prompt).await?)
    }
}
