use std::sync::Arc;

use crate::config::ANSWER_TEMPERATURE;
use crate::integrations::{ChatMessage, ChatModel};
use crate::metrics;
use crate::prompts::Prompt;
use crate::Result;

/// Answers a question from rendered graph context.
#[derive(Clone)]
pub struct Answerer {
    model: Arc<dyn ChatModel>,
    temperature: f32,
}

impl Answerer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            temperature: ANSWER_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Returns the model's reply verbatim.
    pub async fn answer(&self, context: &str, question: &str) -> Result<String> {
        let messages = vec![
            ChatMessage::system(Prompt::AnswerSystem.load()),
            ChatMessage::user(format!("Context:\n{}\n\nQuestion: {}", context, question)),
        ];

        let reply = self.model.complete(messages, self.temperature).await;
        metrics::record_llm_request("answer", reply.is_ok());
        reply
    }
}
