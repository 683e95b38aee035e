//! Native structural chunker

use crate::chunker::{Chunk, ChunkPacker, ChunkParser, ChunkerError, NodeReducer};
use crate::config::ChunkerConfig;
use async_trait::async_trait;

/// Chunks markup locally: node reduction followed by greedy packing
#[derive(Debug, Clone, Default)]
pub struct HtmlChunker {
    reducer: NodeReducer,
    packer: ChunkPacker,
}

impl HtmlChunker {
    pub fn new(reducer: NodeReducer, packer: ChunkPacker) -> Self {
        Self { reducer, packer }
    }

    /// Creates a chunker from the `[chunker]` table
    pub fn from_config(config: &ChunkerConfig) -> Self {
        Self::new(
            NodeReducer::from_config(config),
            ChunkPacker::from_config(config),
        )
    }

    /// Chunks a fragment synchronously
    ///
    /// # Example
    ///
    /// ```
    /// use help_harvest::HtmlChunker;
    ///
    /// let chunker = HtmlChunker::default();
    /// let chunks = chunker.chunk("<h1>Pages</h1><p>Everything is a block.</p>", "https://notion.so/help/pages");
    /// assert_eq!(chunks.len(), 1);
    /// assert_eq!(chunks[0].text, "Pages\nEverything is a block.");
    /// ```
    pub fn chunk(&self, fragment: &str, url: &str) -> Vec<Chunk> {
        let nodes = self.reducer.reduce(fragment);
        self.packer.pack(nodes, url)
    }
}

#[async_trait]
impl ChunkParser for HtmlChunker {
    fn name(&self) -> &'static str {
        "html"
    }

    async fn parse(&self, fragment: &str, url: &str) -> Result<Vec<Chunk>, ChunkerError> {
        Ok(self.chunk(fragment, url))
    }
}
