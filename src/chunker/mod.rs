//! Chunking engine
//!
//! Turns the primary content of a help page into size-bounded text chunks:
//! - `article` isolates the content fragments of a page
//! - `reducer` walks a fragment's markup tree into semantic text nodes
//! - `packer` greedily merges nodes into chunks
//! - `html` and `openai` are the two [`ChunkParser`] implementations

mod article;
mod html;
mod openai;
mod packer;
mod reducer;
mod tree;

pub use article::extract_content;
pub use html::HtmlChunker;
pub use openai::{default_prompt, OpenAiChunker};
pub use packer::ChunkPacker;
pub use reducer::NodeReducer;
pub use tree::MarkupNode;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A captured markup element reduced to its tag and text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Lowercase tag name (e.g. "p", "li")
    pub tag: String,

    /// Trimmed text, newline-terminated; merged runs hold one line per element
    pub text: String,
}

impl Node {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
        }
    }
}

/// Provenance attached to every chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkMetadata {
    /// Canonical URL of the source page
    pub url: String,
}

/// A unit of text ready for embedding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Concatenated node text, trimmed
    pub text: String,

    /// Contributing nodes in document order (empty for remote chunks)
    pub nodes: Vec<Node>,

    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Creates a chunk with no contributing nodes
    pub fn from_text(text: impl Into<String>, url: &str) -> Self {
        Self {
            text: text.into(),
            nodes: Vec::new(),
            metadata: ChunkMetadata {
                url: url.to_string(),
            },
        }
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// The page has no primary content region
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Main section not found in the page")]
    MissingMain,

    #[error("No article found in the main section")]
    MissingArticle,

    #[error("Invalid selector: {0}")]
    Selector(String),
}

/// Errors produced by a chunk parser
#[derive(Debug, Error)]
pub enum ChunkerError {
    #[error("Chunking request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Chunking service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed chunking response: {0}")]
    MalformedResponse(String),
}

/// Converts one content fragment into chunks
///
/// Implementations are stateless per call, so one parser can serve a whole
/// corpus.
#[async_trait]
pub trait ChunkParser: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Parses a markup fragment from the page at `url`
    async fn parse(&self, fragment: &str, url: &str) -> Result<Vec<Chunk>, ChunkerError>;
}
