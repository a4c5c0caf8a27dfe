use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::domain::builder::ChatMessage;
use crate::domain::repository::LlmPort;
use crate::error::StoreError;

const TEMPERATURE: f32 = 0.4;

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct OpenAiChatClient {
    pub http: reqwest::Client,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
}

impl OpenAiChatClient {
    /// `None` when no API key is configured.
    pub fn from_config(http: reqwest::Client, config: &LlmConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl LlmPort for OpenAiChatClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, StoreError> {
        let url = format!("{}/chat/completions", self.api_url);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages,
                temperature: TEMPERATURE,
            })
            .send()
            .await
            .context("send chat completion request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Internal(anyhow::anyhow!(
                "chat completion returned {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: ChatResponse = resp
            .json()
            .await
            .context("decode chat completion response")?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| StoreError::Internal(anyhow::anyhow!("chat completion had no content")))
    }
}
