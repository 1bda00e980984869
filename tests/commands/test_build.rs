//! Tests for the build command

use std::io::Write;
use std::sync::Arc;

use kg_rag::commands::build;
use kg_rag::graphrag::{InMemoryGraphStore, KnowledgeGraphPipeline, PipelineSettings};
use tempfile::NamedTempFile;

use crate::support::ScriptedModel;

#[tokio::test]
async fn test_build_reads_document_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "Cats are mammals.\n\nMammals are animals.\n").unwrap();

    let store = Arc::new(InMemoryGraphStore::new());
    let pipeline = KnowledgeGraphPipeline::new(
        Arc::new(ScriptedModel::cats()),
        store.clone(),
        PipelineSettings::default(),
    );

    let report = build(&pipeline, file.path()).await.unwrap();

    assert_eq!(report.chunks, 2);
    assert_eq!(store.node_count().await, 3);
}

#[tokio::test]
async fn test_build_missing_document_fails() {
    let pipeline = KnowledgeGraphPipeline::new(
        Arc::new(ScriptedModel::cats()),
        Arc::new(InMemoryGraphStore::new()),
        PipelineSettings::default(),
    );

    let result = build(&pipeline, std::path::Path::new("no_such_document.txt")).await;

    assert!(result.is_err());
}
