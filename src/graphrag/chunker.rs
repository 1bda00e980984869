use std::path::Path;

use tracing::debug;

use crate::Result;

/// Paragraph boundary between chunks.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// One paragraph of the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position in the document (for progress output)
    pub index: usize,
    /// Trimmed, non-empty paragraph text
    pub text: String,
}

impl Chunk {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Splits documents on blank lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Chunker;

impl Chunker {
    pub fn new() -> Self {
        Self
    }

    /// Split text into trimmed, non-empty paragraphs.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let normalized = text.replace("\r\n", "\n");

        normalized
            .split(PARAGRAPH_SEPARATOR)
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .enumerate()
            .map(|(index, block)| Chunk::new(index, block))
            .collect()
    }
}

/// Read the whole source document.
pub fn load_document(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = text.len(), "document loaded");
    Ok(text)
}
