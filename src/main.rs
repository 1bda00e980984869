//! Knowledge Graph RAG CLI - main entry point
//!
//! Builds a knowledge graph from a text document and answers questions
//! about it.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use kg_rag::commands::{self, graphrag::pipeline_from_config, StoreBackend};
use kg_rag::config::DEFAULT_CONFIG_PATH;
use kg_rag::{metrics, Config};
use tracing::warn;

#[derive(Parser)]
#[command(name = "kg_rag")]
#[command(about = "Knowledge graph builder and graph-RAG question answering", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to expose Prometheus metrics (e.g., 0.0.0.0:9898)
    #[arg(long, env = "METRICS_ADDR", global = true)]
    metrics_addr: Option<String>,

    /// Path to the YAML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    /// Graph store backend
    #[arg(long, value_enum, default_value_t = StoreBackend::Neo4j, global = true)]
    store: StoreBackend,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph from the document, then answer questions interactively
    Run {
        /// Source document (defaults to DOCUMENT_PATH or faq.txt)
        #[arg(short, long)]
        document: Option<PathBuf>,
    },

    /// Build the graph from the document and exit
    Build {
        /// Source document (defaults to DOCUMENT_PATH or faq.txt)
        #[arg(short, long)]
        document: Option<PathBuf>,
    },

    /// Answer a single question from the existing graph
    Ask {
        /// The question
        question: String,
    },

    /// Answer questions interactively from the existing graph
    Chat,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Run { .. } => "run",
            Commands::Build { .. } => "build",
            Commands::Ask { .. } => "ask",
            Commands::Chat => "chat",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("kg_rag=info".parse()?))
        .init();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr.as_deref() {
        match addr.parse::<SocketAddr>() {
            Ok(socket) => metrics::spawn_metrics_server(socket),
            Err(err) => warn!(%addr, "Invalid metrics address: {}", err),
        }
    }

    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    let command = cli.command.unwrap_or(Commands::Run { document: None });

    let command_name = command.name();
    metrics::record_command_start(command_name);
    let start = Instant::now();

    let result = execute_command(command, &config, cli.store).await;

    metrics::record_command_result(command_name, start.elapsed(), result.is_ok());

    result
}

async fn execute_command(
    command: Commands,
    config: &Config,
    store: StoreBackend,
) -> anyhow::Result<()> {
    if store == StoreBackend::Memory && matches!(command, Commands::Ask { .. } | Commands::Chat) {
        warn!("The in-memory store starts empty; every answer will lack graph context");
    }

    let pipeline = pipeline_from_config(config, store).await?;

    match command {
        Commands::Run { document } => {
            let document = document.unwrap_or_else(|| PathBuf::from(&config.document_path));
            commands::build(&pipeline, &document).await?;
            commands::chat(&pipeline).await?;
        }
        Commands::Build { document } => {
            let document = document.unwrap_or_else(|| PathBuf::from(&config.document_path));
            commands::build(&pipeline, &document).await?;
        }
        Commands::Ask { question } => {
            let answer = commands::ask(&pipeline, &question).await?;
            println!("{}", answer);
        }
        Commands::Chat => {
            commands::chat(&pipeline).await?;
        }
    }

    Ok(())
}
