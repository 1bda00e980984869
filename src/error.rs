//! Error types for the knowledge graph pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The model replied, but not with the JSON shape we asked for.
    #[error("Unexpected model output: {0}")]
    SchemaError(String),

    #[error("OpenAI API error: {0}")]
    OpenAiError(String),

    #[error("Graph store error: {0}")]
    GraphStoreError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<neo4rs::Error> for Error {
    fn from(err: neo4rs::Error) -> Self {
        Error::GraphStoreError(err.to_string())
    }
}

impl From<neo4rs::DeError> for Error {
    fn from(err: neo4rs::DeError) -> Self {
        Error::GraphStoreError(format!("failed to decode row: {}", err))
    }
}
