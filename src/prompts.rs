//! Prompt templates for the three model call sites.
//!
//! Built-in templates can be overridden by Markdown files in the `prompts/`
//! directory at the project root.

use std::path::PathBuf;

use tracing::debug;

use crate::{Error, Result};

const EXTRACTION_TEMPLATE: &str = r#"Extract entities and relations from this text.
Return ONLY valid JSON like:
If the context contains partial information,
answer only with what is available in txt file.
{"entities": [{"name": "AI", "type": "CONCEPT"}], "relations": [{"source": "ML", "relation": "SUBSET_OF", "target": "AI"}]}

Text: {text}"#;

const KEYWORDS_TEMPLATE: &str =
    r#"Extract keywords from this question as a JSON array: "{question}""#;

const ANSWER_SYSTEM_TEMPLATE: &str =
    "Answer based ONLY on this Knowledge Graph context. Be concise.";

/// Available prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Entity/relation extraction for one chunk (`{text}`).
    Extraction,
    /// Keyword extraction from a question (`{question}`).
    Keywords,
    /// System instruction for the answer call.
    AnswerSystem,
}

impl Prompt {
    /// Override file name (Markdown).
    pub fn filename(&self) -> &'static str {
        match self {
            Prompt::Extraction => "extraction.md",
            Prompt::Keywords => "keywords.md",
            Prompt::AnswerSystem => "answer_system.md",
        }
    }

    /// Built-in template text.
    pub fn builtin(&self) -> &'static str {
        match self {
            Prompt::Extraction => EXTRACTION_TEMPLATE,
            Prompt::Keywords => KEYWORDS_TEMPLATE,
            Prompt::AnswerSystem => ANSWER_SYSTEM_TEMPLATE,
        }
    }

    /// Load the template: override file if present, built-in otherwise.
    pub fn load(&self) -> String {
        match load_prompt(self.filename()) {
            Ok(text) => {
                debug!("Using prompt override {}", self.filename());
                text
            }
            Err(_) => self.builtin().to_string(),
        }
    }

    /// Load the template and substitute `{key}` placeholders.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        render_template(&self.load(), vars)
    }
}

/// Substitute `{key}` placeholders in a template.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

/// Load a prompt override by file name.
pub fn load_prompt(filename: &str) -> Result<String> {
    let path = prompts_dir().join(filename);
    std::fs::read_to_string(&path)
        .map_err(|e| Error::InvalidArgument(format!("Failed to load prompt {}: {}", filename, e)))
}

/// Path to the prompts directory.
pub fn prompts_dir() -> PathBuf {
    let candidates = [
        PathBuf::from("prompts"),
        PathBuf::from("../prompts"),
        PathBuf::from("../../prompts"),
    ];

    for path in candidates {
        if path.exists() {
            return path;
        }
    }

    PathBuf::from("prompts")
}
