//! Tests for the interactive question loop

use std::sync::Arc;

use kg_rag::commands::{chat_loop, is_quit_command};
use kg_rag::graphrag::{InMemoryGraphStore, KnowledgeGraphPipeline, PipelineSettings};

use crate::support::ScriptedModel;

async fn built_pipeline(keyword_reply: &str) -> KnowledgeGraphPipeline {
    let model = Arc::new(ScriptedModel::new(
        vec![crate::support::CATS_CHUNK_REPLY.to_string()],
        keyword_reply,
    ));
    let pipeline = KnowledgeGraphPipeline::new(
        model,
        Arc::new(InMemoryGraphStore::new()),
        PipelineSettings::default(),
    );
    pipeline.build("Cats are mammals.").await.unwrap();
    pipeline
}

#[tokio::test]
async fn test_chat_loop_answers_until_quit() {
    let pipeline = built_pipeline(r#"["cats"]"#).await;
    let input: &[u8] = b"What are cats?\n\nQUIT\nnever asked\n";
    let mut output = Vec::new();

    let answered = chat_loop(&pipeline, input, &mut output).await.unwrap();

    assert_eq!(answered, 1);
    let printed = String::from_utf8(output).unwrap();
    assert!(printed.starts_with("💬 Ask anything!"));
    assert!(printed.contains("💡 Cats are mammals."));
    assert_eq!(printed.matches("💡").count(), 1);
}

#[tokio::test]
async fn test_chat_loop_stops_at_end_of_input() {
    let pipeline = built_pipeline(r#"["cats"]"#).await;
    let input: &[u8] = b"What are cats?\nAnd mammals?";
    let mut output = Vec::new();

    let answered = chat_loop(&pipeline, input, &mut output).await.unwrap();

    assert_eq!(answered, 2);
}

#[tokio::test]
async fn test_chat_loop_reports_failed_question_and_continues() {
    let pipeline = built_pipeline("not a json array").await;
    let input: &[u8] = b"What are cats?\nexit\n";
    let mut output = Vec::new();

    let answered = chat_loop(&pipeline, input, &mut output).await.unwrap();

    assert_eq!(answered, 0);
    let printed = String::from_utf8(output).unwrap();
    assert!(printed.contains("⚠️"));
    assert!(!printed.contains("💡"));
}

#[test]
fn test_quit_words() {
    assert!(is_quit_command("q"));
    assert!(is_quit_command(" Exit "));
    assert!(!is_quit_command("quite"));
}
