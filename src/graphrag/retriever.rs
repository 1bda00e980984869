use std::sync::Arc;

use tracing::{debug, info};

use super::entity_extractor::strip_code_fence;
use super::graph::{GraphStore, Neighborhood};
use crate::config::KEYWORD_TEMPERATURE;
use crate::integrations::{ChatMessage, ChatModel};
use crate::metrics;
use crate::prompts::Prompt;
use crate::{Error, Result};

/// Context returned when no keyword matches any entity.
pub const NO_INFO_FOUND: &str = "No info found.";

/// Strictly parse a keyword reply as a JSON array of strings.
pub fn parse_keywords(text: &str) -> Result<Vec<String>> {
    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| Error::SchemaError(format!("keyword reply: {}", e)))
}

/// Render one matched entity and its one-hop neighborhood.
///
/// Edges without a neighbor (no edge in that direction) are skipped.
pub fn render_neighborhood(hood: &Neighborhood) -> String {
    let mut info = format!(
        "{} ({})",
        hood.name,
        hood.entity_type.as_deref().unwrap_or_default()
    );

    for out in &hood.outgoing {
        if let Some(target) = out.target.as_deref() {
            info.push_str(&format!(
                "\n  → {} --{}--> {}",
                hood.name,
                out.relation.as_deref().unwrap_or_default(),
                target
            ));
        }
    }

    for inc in &hood.incoming {
        if let Some(source) = inc.source.as_deref() {
            info.push_str(&format!(
                "\n  ← {} --{}--> {}",
                source,
                inc.relation.as_deref().unwrap_or_default(),
                hood.name
            ));
        }
    }

    info
}

/// Turns a question into rendered graph context.
#[derive(Clone)]
pub struct GraphRetriever {
    model: Arc<dyn ChatModel>,
    store: Arc<dyn GraphStore>,
    temperature: f32,
}

impl GraphRetriever {
    pub fn new(model: Arc<dyn ChatModel>, store: Arc<dyn GraphStore>) -> Self {
        Self {
            model,
            store,
            temperature: KEYWORD_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Ask the model for the question's keywords.
    ///
    /// A reply that is not a JSON array of strings is an [`Error::SchemaError`].
    pub async fn extract_keywords(&self, question: &str) -> Result<Vec<String>> {
        let prompt = Prompt::Keywords.render(&[("question", question)]);

        let reply = self
            .model
            .complete(vec![ChatMessage::user(prompt)], self.temperature)
            .await;
        metrics::record_llm_request("keywords", reply.is_ok());

        let keywords = parse_keywords(&reply?)?;
        debug!(?keywords, "keywords extracted");
        Ok(keywords)
    }

    /// Render the neighborhoods of every entity matching any keyword.
    ///
    /// Keywords are trimmed before lookup and blank ones are skipped, so a
    /// stray `""` or `"  "` in the model's reply never matches the whole
    /// graph. Blocks are joined with a blank line.
    pub async fn build_context(&self, question: &str) -> Result<String> {
        let keywords = self.extract_keywords(question).await?;

        let mut blocks = Vec::new();
        for keyword in keywords.iter().map(|k| k.trim()) {
            // An empty needle would match every node
            if keyword.is_empty() {
                continue;
            }
            for hood in self.store.find_neighborhood(keyword).await? {
                blocks.push(render_neighborhood(&hood));
            }
        }

        info!(
            "Retrieved {} context blocks for {} keywords",
            blocks.len(),
            keywords.len()
        );

        if blocks.is_empty() {
            Ok(NO_INFO_FOUND.to_string())
        } else {
            Ok(blocks.join("\n\n"))
        }
    }
}
