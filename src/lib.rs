//! Knowledge Graph RAG Library
//!
//! This library provides tools to:
//! - Split a text document into paragraph chunks
//! - Extract entities and relations from each chunk with a language model
//! - Store the deduplicated graph in Neo4j (or in memory)
//! - Answer questions from the one-hop neighborhood of matching entities

pub mod config;
pub mod error;
pub mod graphrag;
pub mod integrations;
pub mod metrics;
pub mod prompts;

// Re-export common types
pub use config::Config;
pub use error::{Error, Result};
pub use integrations::{ChatMessage, ChatModel, OpenAIClient};
pub use prompts::{load_prompt, Prompt};

// Commands module uses re-exported types, so it must be declared after the re-exports
pub mod commands;
