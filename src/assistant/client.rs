use crate::config::app::AssistantConfig;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

/// A text-completion service: one system instruction, one question, one answer.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system_instruction: &str, question: &str) -> Result<String>;

    fn provider_name(&self) -> &'static str;
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    pub model: String,
    pub endpoint: String,
    pub api_key: String,
    pub client: reqwest::Client,
}

impl GeminiClient {
    #[must_use]
    pub fn new(model: String, endpoint: String, api_key: String) -> Self {
        Self {
            model,
            endpoint,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &AssistantConfig, api_key: String) -> Self {
        Self::new(config.model.clone(), config.endpoint.clone(), api_key)
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

/// Concatenates the text parts of the first candidate. Missing parts yield an
/// empty string; the caller decides what an empty answer means.
pub(crate) fn extract_text(response: &Value) -> String {
    response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, system_instruction: &str, question: &str) -> Result<String> {
        let body = json!({
            "systemInstruction": {
                "parts": [{ "text": system_instruction }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": question }]
            }],
        });

        debug!("Sending question to {} model {}", self.provider_name(), self.model);
        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(Error::Completion {
                message: format!("Gemini API returned {status}: {error_text}"),
            });
        }

        let json: Value = resp.json().await?;
        Ok(extract_text(&json))
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}
