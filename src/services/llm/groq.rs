use crate::constants::LLM_PRIMARY_TIMEOUT_SECONDS;
use crate::error::{AppError, Result};
use crate::services::llm::{system_prompt, LlmProvider};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Groq LPU provider (OpenAI-compatible chat completions). The fast
/// primary: typical latency ~1.5s.
pub struct GroqProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GroqProvider {
    pub fn new(client: reqwest::Client, api_key: String, model: String) -> Self {
        GroqProvider {
            client,
            api_key,
            model,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt()},
                {"role": "user", "content": prompt},
            ],
            "temperature": 0.3,
            "max_tokens": 4096,
        });

        let request = self
            .client
            .post(GROQ_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send();

        let response = tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| {
                tracing::warn!("[Groq] Timeout after {:?}", timeout);
                AppError::LlmApi(format!("Groq timed out after {:?}", timeout))
            })?
            .map_err(|e| {
                tracing::warn!("[Groq] Error: {}", e);
                AppError::LlmApi(format!("Groq request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("[Groq] HTTP {}: {}", status, text);
            return Err(AppError::LlmApi(format!("Groq HTTP {}", status)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::LlmApi(format!("Groq response parse failed: {}", e)))?;

        let content = chat
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(content)
    }

    fn default_timeout(&self) -> Duration {
        Duration::from_secs(LLM_PRIMARY_TIMEOUT_SECONDS)
    }

    fn name(&self) -> &'static str {
        "Groq"
    }
}
