use std::sync::Arc;

use tracing::debug;

use super::aggregator::Aggregator;
use super::answerer::Answerer;
use super::chunker::{Chunk, Chunker};
use super::entity_extractor::EntityExtractor;
use super::graph::{GraphStore, StoreSummary};
use super::retriever::GraphRetriever;
use crate::config::{OpenAIConfig, ANSWER_TEMPERATURE, EXTRACTION_TEMPERATURE, KEYWORD_TEMPERATURE};
use crate::integrations::ChatModel;
use crate::Result;

/// Sampling temperatures for the three model call sites.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub extraction_temperature: f32,
    pub keyword_temperature: f32,
    pub answer_temperature: f32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            extraction_temperature: EXTRACTION_TEMPERATURE,
            keyword_temperature: KEYWORD_TEMPERATURE,
            answer_temperature: ANSWER_TEMPERATURE,
        }
    }
}

impl From<&OpenAIConfig> for PipelineSettings {
    fn from(config: &OpenAIConfig) -> Self {
        Self {
            extraction_temperature: config.extraction_temperature,
            keyword_temperature: config.keyword_temperature,
            answer_temperature: config.answer_temperature,
        }
    }
}

/// Outcome of a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub chunks: usize,
    /// Chunks whose extraction came back empty
    pub empty_extractions: usize,
    pub stored: StoreSummary,
}

/// Build-then-query pipeline over one document.
pub struct KnowledgeGraphPipeline {
    chunker: Chunker,
    extractor: EntityExtractor,
    retriever: GraphRetriever,
    answerer: Answerer,
    store: Arc<dyn GraphStore>,
}

impl KnowledgeGraphPipeline {
    pub fn new(
        model: Arc<dyn ChatModel>,
        store: Arc<dyn GraphStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            chunker: Chunker::new(),
            extractor: EntityExtractor::new(model.clone())
                .with_temperature(settings.extraction_temperature),
            retriever: GraphRetriever::new(model.clone(), store.clone())
                .with_temperature(settings.keyword_temperature),
            answerer: Answerer::new(model).with_temperature(settings.answer_temperature),
            store,
        }
    }

    /// Chunk, extract, deduplicate and store `text`, replacing the graph.
    pub async fn build(&self, text: &str) -> Result<BuildReport> {
        self.build_with_progress(text, |_, _| {}).await
    }

    /// Like [`build`](Self::build), calling `on_chunk(chunk, total)` before
    /// each extraction.
    pub async fn build_with_progress<F>(&self, text: &str, mut on_chunk: F) -> Result<BuildReport>
    where
        F: FnMut(&Chunk, usize),
    {
        let chunks = self.chunker.chunk(text);
        debug!("Split document into {} chunks", chunks.len());

        let mut aggregator = Aggregator::new();
        let mut empty_extractions = 0;

        for chunk in &chunks {
            on_chunk(chunk, chunks.len());
            let extraction = self.extractor.extract(chunk).await?;
            if extraction.is_empty() {
                empty_extractions += 1;
            }
            aggregator.push(extraction);
        }

        let (entities, relations) = aggregator.finish();
        let stored = self.store.reset_and_store(&entities, &relations).await?;

        Ok(BuildReport {
            chunks: chunks.len(),
            empty_extractions,
            stored,
        })
    }

    /// Rendered graph context for a question.
    pub async fn context(&self, question: &str) -> Result<String> {
        self.retriever.build_context(question).await
    }

    /// Answer a question from the current graph.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let context = self.retriever.build_context(question).await?;
        self.answerer.answer(&context, question).await
    }
}
