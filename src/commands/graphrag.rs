//! Knowledge graph commands: build the graph, answer questions, interactive loop.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::graphrag::{
    load_document, BuildReport, GraphStore, InMemoryGraphStore, KnowledgeGraphPipeline,
    Neo4jGraphStore, PipelineSettings, StoreSummary,
};
use crate::integrations::{ChatModel, OpenAIClient};
use crate::Config;

/// Inputs that end the question loop (compared case-insensitively).
pub const QUIT_COMMANDS: &[&str] = &["quit", "exit", "q"];

/// Where the graph lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StoreBackend {
    /// Neo4j over Bolt
    #[default]
    Neo4j,
    /// Process memory (lost on exit)
    Memory,
}

/// True for `quit`, `exit` or `q` in any case.
pub fn is_quit_command(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    QUIT_COMMANDS.contains(&input.as_str())
}

/// Connect the configured graph store.
pub async fn connect_store(backend: StoreBackend, config: &Config) -> Result<Arc<dyn GraphStore>> {
    match backend {
        StoreBackend::Neo4j => {
            let store = Neo4jGraphStore::from_config(&config.neo4j)
                .await
                .with_context(|| format!("failed to connect to Neo4j at {}", config.neo4j.uri))?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory graph store; the graph is lost when the process exits");
            Ok(Arc::new(InMemoryGraphStore::new()))
        }
    }
}

/// Build the pipeline from configuration.
pub async fn pipeline_from_config(
    config: &Config,
    backend: StoreBackend,
) -> Result<KnowledgeGraphPipeline> {
    let model: Arc<dyn ChatModel> = Arc::new(
        OpenAIClient::from_config(&config.openai).context("failed to create OpenAI client")?,
    );
    let store = connect_store(backend, config).await?;

    Ok(KnowledgeGraphPipeline::new(
        model,
        store,
        PipelineSettings::from(&config.openai),
    ))
}

/// Build phase: load the document and replace the graph with its contents.
pub async fn build(pipeline: &KnowledgeGraphPipeline, document: &Path) -> Result<BuildReport> {
    println!("🚀 Building Knowledge Graph...\n");

    let text = load_document(document)
        .with_context(|| format!("failed to read document {}", document.display()))?;

    let mut announced = false;
    let report = pipeline
        .build_with_progress(&text, |chunk, total| {
            if !announced {
                println!("📄 Loaded {} chunks", total);
                announced = true;
            }
            println!("  🧠 Extracting chunk {}/{}...", chunk.index + 1, total);
        })
        .await?;

    if report.chunks == 0 {
        println!("📄 Loaded 0 chunks");
    }
    println!("{}", stored_line(&report.stored));
    if report.empty_extractions > 0 {
        warn!(
            "{} of {} chunks produced no entities or relations",
            report.empty_extractions, report.chunks
        );
    }
    println!("✅ Knowledge Graph ready!\n");

    Ok(report)
}

/// Console summary of a store write; dropped relations are listed so the
/// counts add up to what extraction produced.
fn stored_line(summary: &StoreSummary) -> String {
    if summary.dangling == 0 {
        format!(
            "💾 Stored {} entities, {} relations",
            summary.entities, summary.relations
        )
    } else {
        format!(
            "💾 Stored {} entities, {} relations ({} dropped: unknown endpoint)",
            summary.entities, summary.relations, summary.dangling
        )
    }
}

/// Answer one question from the current graph.
pub async fn ask(pipeline: &KnowledgeGraphPipeline, question: &str) -> Result<String> {
    info!("Answering question: {}", question);
    pipeline
        .ask(question)
        .await
        .context("failed to answer question")
}

/// Query phase: read questions until a quit command or end of input.
///
/// A failed question is reported and the loop continues. Returns the number
/// of questions answered.
pub async fn chat_loop<R, W>(
    pipeline: &KnowledgeGraphPipeline,
    input: R,
    output: &mut W,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(output, "💬 Ask anything! (type 'quit' to exit)\n")?;

    let mut lines = input.lines();
    let mut answered = 0;

    loop {
        write!(output, "❓ Question: ")?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();

        if is_quit_command(question) {
            break;
        }
        if question.is_empty() {
            continue;
        }

        match pipeline.ask(question).await {
            Ok(answer) => {
                writeln!(output, "\n💡 {}\n", answer)?;
                answered += 1;
            }
            Err(err) => {
                warn!("Question failed: {}", err);
                writeln!(output, "\n⚠️  {}\n", err)?;
            }
        }
    }

    Ok(answered)
}

/// Interactive loop on stdin/stdout.
pub async fn chat(pipeline: &KnowledgeGraphPipeline) -> Result<usize> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    chat_loop(pipeline, stdin, &mut stdout).await
}
