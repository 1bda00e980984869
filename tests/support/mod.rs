//! Scripted language model shared by the integration tests.

use std::sync::Mutex;

use async_trait::async_trait;
use kg_rag::{ChatMessage, ChatModel, Result};

pub const CATS_CHUNK_REPLY: &str = r#"```json
{"entities": [{"name": "Cats", "type": "ANIMAL"}, {"name": "Mammals", "type": "ANIMAL"}],
 "relations": [{"source": "Cats", "relation": "SUBSET_OF", "target": "Mammals"}]}
```"#;

pub const MAMMALS_CHUNK_REPLY: &str = r#"{"entities": [{"name": "Mammals", "type": "ANIMAL"}, {"name": "Animals", "type": "CONCEPT"}], "relations": [{"source": "Mammals", "relation": "SUBSET_OF", "target": "Animals"}]}"#;

/// Replies to extraction prompts in order, to keyword prompts with a fixed
/// reply, and to everything else with a fixed answer.
pub struct ScriptedModel {
    extraction_replies: Mutex<Vec<String>>,
    keyword_reply: String,
    calls: Mutex<Vec<(String, f32)>>,
}

impl ScriptedModel {
    pub fn new(extraction_replies: Vec<String>, keyword_reply: &str) -> Self {
        let mut replies = extraction_replies;
        replies.reverse();
        Self {
            extraction_replies: Mutex::new(replies),
            keyword_reply: keyword_reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn cats() -> Self {
        Self::new(
            vec![CATS_CHUNK_REPLY.to_string(), MAMMALS_CHUNK_REPLY.to_string()],
            r#"["cats"]"#,
        )
    }

    /// Recorded (prompt text, temperature) pairs whose text contains `needle`.
    pub fn calls_containing(&self, needle: &str) -> Vec<(String, f32)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(text, _)| text.contains(needle))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, messages: Vec<ChatMessage>, temperature: f32) -> Result<String> {
        let text = messages
            .into_iter()
            .filter_map(|m| m.content)
            .collect::<Vec<_>>()
            .join("\n");
        self.calls.lock().unwrap().push((text.clone(), temperature));

        if text.starts_with("Extract entities and relations") {
            let reply = self.extraction_replies.lock().unwrap().pop();
            return Ok(reply.unwrap_or_else(|| r#"{"entities": [], "relations": []}"#.to_string()));
        }
        if text.starts_with("Extract keywords") {
            return Ok(self.keyword_reply.clone());
        }
        Ok("Cats are mammals.".to_string())
    }
}
