//! Generic view of a markup element tree

use scraper::ElementRef;

/// The parts of an element the node reducer needs
pub trait MarkupNode: Sized {
    /// Lowercase tag name
    fn tag_name(&self) -> &str;

    /// Element children in document order (text and comments excluded)
    fn element_children(&self) -> Vec<Self>;

    /// All descendant text, concatenated
    fn text_content(&self) -> String;
}

impl<'a> MarkupNode for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn element_children(&self) -> Vec<Self> {
        self.children().filter_map(ElementRef::wrap).collect()
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }
}
