//! Primary content extraction
//!
//! Help pages wrap their content in `<main>` → `<article>`. Table-of-contents
//! asides inside an article are navigation, so they are removed before the
//! article markup is handed to a chunk parser.

use crate::chunker::ExtractionError;
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::Selector(e.to_string()))
}

/// Extracts the primary content fragments of a page
///
/// Finds the first `<main>`, takes every `<article>` inside it, strips all
/// `<aside>` descendants of each article and returns the article markup.
///
/// # Arguments
///
/// * `markup` - The raw page HTML
///
/// # Returns
///
/// * `Ok(Vec<String>)` - The outer HTML of each article, in document order
/// * `Err(ExtractionError::MissingMain)` - The page has no `<main>`
/// * `Err(ExtractionError::MissingArticle)` - `<main>` holds no `<article>`
///
/// # Example
///
/// ```
/// use help_harvest::chunker::extract_content;
///
/// let page = "<main><article><p>Body</p><aside>Contents</aside></article></main>";
/// let fragments = extract_content(page).unwrap();
/// assert_eq!(fragments, vec!["<article><p>Body</p></article>"]);
/// ```
pub fn extract_content(markup: &str) -> Result<Vec<String>, ExtractionError> {
    let main_selector = selector("main")?;
    let article_selector = selector("article")?;
    let aside_selector = selector("aside")?;

    let mut document = Html::parse_document(markup);

    let (article_ids, aside_ids) = {
        let main = document
            .select(&main_selector)
            .next()
            .ok_or(ExtractionError::MissingMain)?;

        let articles: Vec<ElementRef> = main.select(&article_selector).collect();
        if articles.is_empty() {
            return Err(ExtractionError::MissingArticle);
        }

        let asides: Vec<_> = articles
            .iter()
            .flat_map(|article| article.select(&aside_selector))
            .map(|aside| aside.id())
            .collect();
        let articles: Vec<_> = articles.iter().map(|article| article.id()).collect();
        (articles, asides)
    };

    for id in aside_ids {
        if let Some(mut aside) = document.tree.get_mut(id) {
            aside.detach();
        }
    }

    Ok(article_ids
        .into_iter()
        .filter_map(|id| document.tree.get(id).and_then(ElementRef::wrap))
        .map(|article| article.html())
        .collect())
}
