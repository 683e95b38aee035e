//! Markup-to-node reduction
//!
//! Walks a markup tree depth-first. Elements whose tag is captured become
//! leaves: their whole text is taken and their children are not visited. All
//! other elements are transparent. Consecutive captured elements of the same
//! inseparable tag are merged into one node.

use crate::chunker::tree::MarkupNode;
use crate::chunker::Node;
use crate::config::ChunkerConfig;
use scraper::Html;
use std::collections::HashSet;

/// Reduces markup to an ordered sequence of text nodes
#[derive(Debug, Clone)]
pub struct NodeReducer {
    tags: HashSet<String>,
    inseparable: HashSet<String>,
}

impl NodeReducer {
    /// Creates a reducer
    ///
    /// # Arguments
    ///
    /// * `tags` - Tags captured as text nodes
    /// * `inseparable` - Captured tags whose adjacent runs are merged
    pub fn new<I, J, S, T>(tags: I, inseparable: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            tags: tags.into_iter().map(|t| t.as_ref().to_lowercase()).collect(),
            inseparable: inseparable
                .into_iter()
                .map(|t| t.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Creates a reducer from the `[chunker]` table
    pub fn from_config(config: &ChunkerConfig) -> Self {
        Self::new(&config.tags, &config.inseparable_tags)
    }

    /// Collects the captured elements under `root` in document order
    ///
    /// Elements with no visible text are not captured.
    pub fn captured<N: MarkupNode>(&self, root: N) -> Vec<N> {
        let mut found = Vec::new();
        let mut stack = vec![root];

        while let Some(element) = stack.pop() {
            if self.tags.contains(element.tag_name()) {
                if !element.text_content().trim().is_empty() {
                    found.push(element);
                }
                continue;
            }

            let mut children = element.element_children();
            children.reverse();
            stack.extend(children);
        }

        found
    }

    /// Reduces the tree under `root` to text nodes
    pub fn reduce_tree<N: MarkupNode>(&self, root: N) -> Vec<Node> {
        let mut nodes: Vec<Node> = Vec::new();

        for element in self.captured(root) {
            let text = element.text_content();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            let tag = element.tag_name();
            let merge = self.inseparable.contains(tag)
                && nodes.last().is_some_and(|last| last.tag == tag);

            match nodes.last_mut() {
                Some(last) if merge => {
                    last.text.push_str(text);
                    last.text.push('\n');
                }
                _ => nodes.push(Node::new(tag, format!("{}\n", text))),
            }
        }

        nodes
    }

    /// Parses a markup fragment and reduces it to text nodes
    ///
    /// # Example
    ///
    /// ```
    /// use help_harvest::chunker::NodeReducer;
    ///
    /// let reducer = NodeReducer::new(["h2", "p", "li"], ["li"]);
    /// let nodes = reducer.reduce("<h2>Setup</h2><ul><li>One</li><li>Two</li></ul>");
    ///
    /// assert_eq!(nodes.len(), 2);
    /// assert_eq!(nodes[1].text, "One\nTwo\n");
    /// ```
    pub fn reduce(&self, fragment: &str) -> Vec<Node> {
        let document = Html::parse_fragment(fragment);
        self.reduce_tree(document.root_element())
    }
}

impl Default for NodeReducer {
    fn default() -> Self {
        Self::from_config(&ChunkerConfig::default())
    }
}
