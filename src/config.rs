//! Configuration for the language model, the graph store and the source document
//!
//! Loads configuration from config.yml (optional), `.env` and the environment.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Default constants (fallback if config.yml not found)
pub const DEFAULT_DOCUMENT_PATH: &str = "faq.txt";
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const EXTRACTION_TEMPERATURE: f32 = 0.0;
pub const KEYWORD_TEMPERATURE: f32 = 0.0;
pub const ANSWER_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_NEO4J_URI: &str = "bolt://localhost:7687";
pub const DEFAULT_NEO4J_USERNAME: &str = "neo4j";

/// YAML config structures
#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    openai: Option<OpenAIYaml>,
    neo4j: Option<Neo4jYaml>,
    document_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIYaml {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    extraction_temperature: Option<f32>,
    keyword_temperature: Option<f32>,
    answer_temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct Neo4jYaml {
    uri: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

/// Language model settings.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub extraction_temperature: f32,
    pub keyword_temperature: f32,
    pub answer_temperature: f32,
}

/// Neo4j connection settings.
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub openai: OpenAIConfig,
    pub neo4j: Neo4jConfig,
    pub document_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Load configuration from config.yml or use defaults
    /// Environment variables take precedence over config.yml values
    pub fn new() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|err| {
            warn!("{}; using environment and defaults", err);
            Self::from_yaml(YamlConfig::default())
        })
    }

    /// Load from `path`, or from environment + defaults when it does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("Config file {} not found, using environment and defaults", path.display());
            return Ok(Self::from_yaml(YamlConfig::default()));
        }
        Self::load_from_file(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Resolve a value: prefer env var if config value looks like ${VAR}
    fn resolve_env_string(value: Option<String>, env_key: &str) -> Option<String> {
        if let Some(ref v) = value {
            if v.starts_with("${") && v.ends_with('}') {
                let var_name = &v[2..v.len() - 1];
                if let Ok(env_val) = std::env::var(var_name) {
                    return Some(env_val);
                }
            }
        }
        if let Ok(env_val) = std::env::var(env_key) {
            return Some(env_val);
        }
        // An unresolved placeholder is as good as missing
        value.filter(|v| !(v.starts_with("${") && v.ends_with('}')))
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, String> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let yaml: YamlConfig = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        Ok(Self::from_yaml(yaml))
    }

    fn from_yaml(yaml: YamlConfig) -> Self {
        Self::load_dotenv();

        let openai = yaml.openai.unwrap_or_default();
        let neo4j = yaml.neo4j.unwrap_or_default();

        let model = Self::resolve_env_string(openai.model, "OPENAI_MODEL")
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            openai: OpenAIConfig {
                api_key: Self::resolve_env_string(openai.api_key, "OPENAI_API_KEY")
                    .unwrap_or_default(),
                base_url: Self::resolve_env_string(openai.base_url, "OPENAI_BASE_URL")
                    .unwrap_or_else(|| OPENAI_API_URL.to_string()),
                model,
                max_tokens: openai.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
                extraction_temperature: openai
                    .extraction_temperature
                    .unwrap_or(EXTRACTION_TEMPERATURE),
                keyword_temperature: openai.keyword_temperature.unwrap_or(KEYWORD_TEMPERATURE),
                answer_temperature: openai.answer_temperature.unwrap_or(ANSWER_TEMPERATURE),
            },
            neo4j: Neo4jConfig {
                uri: Self::resolve_env_string(neo4j.uri, "NEO4J_URI")
                    .unwrap_or_else(|| DEFAULT_NEO4J_URI.to_string()),
                username: Self::resolve_env_string(neo4j.username, "NEO4J_USERNAME")
                    .unwrap_or_else(|| DEFAULT_NEO4J_USERNAME.to_string()),
                password: Self::resolve_env_string(neo4j.password, "NEO4J_PASSWORD")
                    .unwrap_or_default(),
            },
            document_path: Self::resolve_env_string(yaml.document_path, "DOCUMENT_PATH")
                .unwrap_or_else(|| DEFAULT_DOCUMENT_PATH.to_string()),
        }
    }
}
