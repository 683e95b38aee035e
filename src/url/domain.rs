use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use help_harvest::url::extract_domain;
///
/// let url = Url::parse("https://Notion.SO/help").unwrap();
/// assert_eq!(extract_domain(&url), Some("notion.so".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the `host[:port]` part of a URL
pub fn authority(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://notion.so/").unwrap();
        assert_eq!(extract_domain(&url), Some("notion.so".to_string()));
    }

    #[test]
    fn test_extract_uppercase_converted_to_lowercase() {
        let url = Url::parse("https://NOTION.SO/help").unwrap();
        assert_eq!(extract_domain(&url), Some("notion.so".to_string()));
    }

    #[test]
    fn test_authority_keeps_port() {
        let url = Url::parse("http://127.0.0.1:8080/help").unwrap();
        assert_eq!(authority(&url), Some("127.0.0.1:8080".to_string()));

        let url = Url::parse("https://notion.so/help").unwrap();
        assert_eq!(authority(&url), Some("notion.so".to_string()));
    }
}
