//! Greedy chunk packing
//!
//! Nodes are appended to the current chunk while the combined length stays
//! within `chunk_size + buffer` characters. A node that does not fit closes
//! the current chunk and starts the next one, so a single node longer than
//! the ceiling (a merged list) becomes a chunk of its own.

use crate::chunker::{Chunk, ChunkMetadata, Node};
use crate::config::ChunkerConfig;

/// Merges text nodes into size-bounded chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPacker {
    chunk_size: usize,
    buffer: usize,
}

impl ChunkPacker {
    /// Creates a packer with a target size and slack, both in characters
    pub fn new(chunk_size: usize, buffer: usize) -> Self {
        Self { chunk_size, buffer }
    }

    /// Creates a packer from the `[chunker]` table
    pub fn from_config(config: &ChunkerConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_size_buffer)
    }

    /// The soft ceiling: `chunk_size + buffer`
    pub fn ceiling(&self) -> usize {
        self.chunk_size + self.buffer
    }

    /// Packs nodes into chunks in a single pass
    ///
    /// # Arguments
    ///
    /// * `nodes` - Text nodes in document order
    /// * `url` - Source page, recorded in each chunk's metadata
    ///
    /// # Returns
    ///
    /// Chunks in node order. Every chunk's text is trimmed and non-empty.
    pub fn pack(&self, nodes: Vec<Node>, url: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current = PendingChunk::default();

        for node in nodes {
            let trimmed = node.text.trim();
            if trimmed.is_empty() {
                continue;
            }
            let line = format!("{}\n", trimmed);
            let line_len = line.chars().count();

            if current.len + line_len > self.ceiling() {
                if let Some(chunk) = current.commit(url) {
                    chunks.push(chunk);
                }
                current = PendingChunk::default();
            }
            current.push(line, line_len, node);
        }

        if let Some(chunk) = current.commit(url) {
            chunks.push(chunk);
        }

        chunks
    }
}

impl Default for ChunkPacker {
    fn default() -> Self {
        Self::from_config(&ChunkerConfig::default())
    }
}

/// The chunk being filled
#[derive(Debug, Default)]
struct PendingChunk {
    text: String,
    len: usize,
    nodes: Vec<Node>,
}

impl PendingChunk {
    fn push(&mut self, line: String, line_len: usize, node: Node) {
        self.text.push_str(&line);
        self.len += line_len;
        self.nodes.push(node);
    }

    /// Closes the chunk; None if it holds no visible text
    fn commit(self, url: &str) -> Option<Chunk> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }

        Some(Chunk {
            text: text.to_string(),
            nodes: self.nodes,
            metadata: ChunkMetadata {
                url: url.to_string(),
            },
        })
    }
}
