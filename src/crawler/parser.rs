//! Link extraction from fetched pages
//!
//! Every `<a href>` is returned as written, in document order. Resolution,
//! canonicalization and scope filtering happen later in the coordinator so
//! that hrefs which cannot be canonicalized can still be recorded as skipped.

use scraper::{Html, Selector};

/// Extracts the raw href of every anchor in the document
///
/// # Arguments
///
/// * `html` - The HTML content to parse
///
/// # Returns
///
/// The href attribute values in document order, duplicates included
///
/// # Example
///
/// ```
/// use help_harvest::crawler::extract_hrefs;
///
/// let html = r#"<html><body><a href="/help/a">A</a><a>none</a><a href="b">B</a></body></html>"#;
/// assert_eq!(extract_hrefs(html), vec!["/help/a", "b"]);
/// ```
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}
