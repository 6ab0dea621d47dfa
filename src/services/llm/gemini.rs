use crate::constants::LLM_FALLBACK_TIMEOUT_SECONDS;
use crate::error::{AppError, Result};
use crate::services::llm::{system_prompt, LlmProvider};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini provider. Slower than Groq (~6s) but reliable; used as
/// the fallback when no Groq credential is configured.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        GeminiProvider {
            client,
            api_key,
            model,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String> {
        // Gemini has no separate system role here; prepend the shared
        // system prompt so both providers reason with the same context.
        let full_prompt = format!("{}\n\n{}", system_prompt(), prompt);
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);

        let body = json!({
            "contents": [{"parts": [{"text": full_prompt}]}],
        });

        let request = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send();

        let response = tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| {
                tracing::warn!("[Gemini] Timeout after {:?}", timeout);
                AppError::LlmApi(format!("Gemini timed out after {:?}", timeout))
            })?
            .map_err(|e| {
                tracing::warn!("[Gemini] Error: {}", e);
                AppError::LlmApi(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("[Gemini] HTTP {}: {}", status, text);
            return Err(AppError::LlmApi(format!("Gemini HTTP {}", status)));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::LlmApi(format!("Gemini response parse failed: {}", e)))?;

        let content = generated
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(content)
    }

    fn default_timeout(&self) -> Duration {
        Duration::from_secs(LLM_FALLBACK_TIMEOUT_SECONDS)
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }
}
