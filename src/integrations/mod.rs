//! External integrations module.
//!
//! Provides the language model seam ([`ChatModel`]) and its OpenAI
//! chat-completions implementation.

pub mod openai;

pub use openai::{ChatMessage, OpenAIClient};

use async_trait::async_trait;

use crate::Result;

/// Request/response language model: role-tagged messages in, completion text out.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>, temperature: f32) -> Result<String>;
}
