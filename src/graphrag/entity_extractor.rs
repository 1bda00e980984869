use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::chunker::Chunk;
use crate::config::EXTRACTION_TEMPERATURE;
use crate::integrations::{ChatMessage, ChatModel};
use crate::metrics;
use crate::prompts::Prompt;
use crate::{Error, Result};

/// Named entity returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    /// Free-form label chosen by the model
    #[serde(rename = "type")]
    pub entity_type: String,
}

impl Entity {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
        }
    }
}

/// Directed, typed relation between two entity names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub source: String,
    pub relation: String,
    pub target: String,
}

impl Relation {
    pub fn new(
        source: impl Into<String>,
        relation: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            relation: relation.into(),
            target: target.into(),
        }
    }

    /// Deduplication key.
    pub fn triple(&self) -> (&str, &str, &str) {
        (&self.source, &self.relation, &self.target)
    }
}

/// Entities and relations extracted from one chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relations.is_empty()
    }
}

/// Remove Markdown code-fence wrapping from a model reply.
///
/// Takes the text between the first and second fence and drops one leading
/// `json` language tag. Replies without a fence are only trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    if !text.contains("```") {
        return text;
    }

    let inner = text.split("```").nth(1).unwrap_or_default();
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

/// Strictly parse an extraction reply.
pub fn parse_extraction(text: &str) -> Result<Extraction> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| Error::SchemaError(format!("extraction reply: {}", e)))
}

/// LLM-backed entity/relation extractor.
#[derive(Clone)]
pub struct EntityExtractor {
    model: Arc<dyn ChatModel>,
    temperature: f32,
}

impl EntityExtractor {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            temperature: EXTRACTION_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Extract entities and relations from a chunk.
    ///
    /// A reply that is not the expected JSON object yields an empty
    /// [`Extraction`]. Transport errors are returned.
    pub async fn extract(&self, chunk: &Chunk) -> Result<Extraction> {
        let prompt = Prompt::Extraction.render(&[("text", chunk.text.as_str())]);

        let reply = self
            .model
            .complete(vec![ChatMessage::user(prompt)], self.temperature)
            .await;
        metrics::record_llm_request("extraction", reply.is_ok());
        let reply = reply?;

        match parse_extraction(&reply) {
            Ok(extraction) => {
                debug!(
                    chunk = chunk.index,
                    entities = extraction.entities.len(),
                    relations = extraction.relations.len(),
                    "chunk extracted"
                );
                Ok(extraction)
            }
            Err(err) => {
                metrics::record_extraction_fallback();
                warn!(
                    chunk = chunk.index,
                    reply = %truncate(&reply, 200),
                    "Discarding unparseable extraction: {}",
                    err
                );
                Ok(Extraction::default())
            }
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
