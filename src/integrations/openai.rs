//! OpenAI chat-completions client used for extraction, keywords and answers.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ChatModel;
use crate::config::{OpenAIConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, OPENAI_API_URL};
use crate::{Error, Result};

/// OpenAI client.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAIClient {
    /// Create client from the `openai` section of the configuration.
    pub fn from_config(config: &OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::ConfigError("OPENAI_API_KEY is not set".to_string()));
        }

        let mut client = Self::new(config.api_key.clone())?;
        client.base_url = config.base_url.trim_end_matches('/').to_string();
        client.model = config.model.clone();
        client.max_tokens = config.max_tokens;
        Ok(client)
    }

    /// Create client with API key and default model.
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidArgument("OPENAI_API_KEY is empty".to_string()));
        }

        let http = Client::builder()
            .user_agent("kg_rag/0.1.0")
            .build()
            .map_err(|e| Error::InvalidArgument(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: OPENAI_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Chat completion.
    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        model: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages,
            temperature,
            max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::OpenAiError(format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::OpenAiError(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::OpenAiError(format!("status {}: {}", status, text)));
        }

        let chat_response: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| Error::OpenAiError(format!("invalid response: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::OpenAiError("empty response".to_string()))?;

        debug!(model, chars = content.len(), "chat completion received");
        Ok(content)
    }
}

#[async_trait]
impl ChatModel for OpenAIClient {
    async fn complete(&self, messages: Vec<ChatMessage>, temperature: f32) -> Result<String> {
        self.chat_completion(messages, &self.model, temperature, self.max_tokens)
            .await
    }
}

/// Chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
