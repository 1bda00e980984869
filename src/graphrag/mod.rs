//! Graph RAG over a single text document.
//!
//! The build phase splits the document into paragraphs, asks the language
//! model for entities and relations in each one, deduplicates them and
//! replaces the graph store's contents. The query phase asks the model for a
//! question's keywords, renders the one-hop neighborhood of every matching
//! entity and lets the model answer from that context only.

pub mod aggregator;
pub mod answerer;
pub mod chunker;
pub mod entity_extractor;
pub mod graph;
pub mod neo4j;
pub mod pipeline;
pub mod retriever;

pub use aggregator::{aggregate, Aggregator};
pub use answerer::Answerer;
pub use chunker::{load_document, Chunk, Chunker};
pub use entity_extractor::{
    parse_extraction, strip_code_fence, Entity, EntityExtractor, Extraction, Relation,
};
pub use graph::{
    GraphStore, InMemoryGraphStore, IncomingEdge, Neighborhood, OutgoingEdge, StoreSummary,
};
pub use neo4j::Neo4jGraphStore;
pub use pipeline::{BuildReport, KnowledgeGraphPipeline, PipelineSettings};
pub use retriever::{parse_keywords, render_neighborhood, GraphRetriever, NO_INFO_FOUND};
