/// Checks if a URL path falls inside the crawl scope
///
/// A path is in scope when it starts with `prefix` and contains none of the
/// `excluded` markers anywhere in it. The prefix test is a plain string
/// prefix, so `/help` also admits `/helpful`.
///
/// # Examples
///
/// ```
/// use help_harvest::url::matches_scope;
///
/// let excluded = vec!["notion-academy".to_string()];
/// assert!(matches_scope("/help/what-is-a-block", "/help", &excluded));
/// assert!(!matches_scope("/help/notion-academy/lesson", "/help", &excluded));
/// assert!(!matches_scope("/pricing", "/help", &excluded));
/// ```
pub fn matches_scope(path: &str, prefix: &str, excluded: &[String]) -> bool {
    path.starts_with(prefix) && !excluded.iter().any(|marker| path.contains(marker.as_str()))
}
