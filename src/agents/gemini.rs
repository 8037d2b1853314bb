use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::GeminiConfig;
use crate::error::JudgmentError;

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: Option<String>,
}

/// Text-in/text-out client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiAgent {
    client: Client,
    config: GeminiConfig,
}

impl GeminiAgent {
    pub fn new(config: GeminiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Primary model first, then fallbacks in configured order.
    pub fn models(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.config.model.as_str())
            .chain(self.config.fallback_models.iter().map(String::as_str))
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, JudgmentError> {
        let models: Vec<&str> = self.models().collect();
        let mut model_index = 0;
        let mut retry_count = 0;
        let mut backoff = self.config.initial_backoff;

        loop {
            let model = models[model_index];
            info!("Requesting judgment from {} (prompt length: {} chars)", model, prompt.len());

            let url = format!(
                "{}/v1beta/models/{}:generateContent",
                self.config.base_url, model
            );
            let body = GenerateRequest {
                contents: vec![Content {
                    parts: vec![Part {
                        text: Some(prompt.to_string()),
                    }],
                }],
            };

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.config.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let text = response.text().await?;

            if status.is_success() {
                let parsed: GenerateResponse = serde_json::from_str(&text)?;
                let judgment = extract_text(parsed)?;
                info!("Received judgment from {}", model);
                return Ok(judgment);
            }

            let message = serde_json::from_str::<GeminiErrorBody>(&text)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(text);

            let code = status.as_u16();
            if (code == 429 || code == 404) && model_index + 1 < models.len() {
                warn!("Model {} unavailable (HTTP {}), falling back", model, code);
                model_index += 1;
                retry_count = 0;
                backoff = self.config.initial_backoff;
                continue;
            }

            let retryable = code == 429 || status.is_server_error();
            if !retryable || retry_count >= self.config.max_retries {
                return Err(JudgmentError::Api {
                    status: code,
                    message,
                });
            }

            retry_count += 1;
            warn!(
                "Model {} answered HTTP {}, retry {}/{} in {:?}",
                model, code, retry_count, self.config.max_retries, backoff
            );
            tokio::time::sleep(backoff).await;
            backoff = backoff.saturating_mul(2).min(Duration::from_secs(60));
        }
    }
}

fn extract_text(response: GenerateResponse) -> Result<String, JudgmentError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(JudgmentError::BlockedPrompt { reason });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        if let Some(reason) = candidate.finish_reason.filter(|r| r == "SAFETY") {
            return Err(JudgmentError::BlockedPrompt { reason });
        }
        return Err(JudgmentError::EmptyResponse);
    }
    Ok(text)
}
