use crate::url::domain::authority;
use crate::url::CanonicalUrl;
use crate::UrlError;
use url::Url;

/// Canonicalizes an href found on the site
///
/// # Canonicalization Steps
///
/// 1. Reject empty hrefs
/// 2. Resolve relative and protocol-relative hrefs against `base`
/// 3. Reject anything that is not HTTP(S) (`javascript:`, `mailto:`, ...)
/// 4. Rebuild the URL on `origin`, taking its scheme and `host[:port]`
///    whatever host the href named
/// 5. Drop query and fragment, keep the path (dot segments already resolved)
///
/// # Arguments
///
/// * `href` - The raw href or URL string
/// * `base` - The URL relative hrefs are resolved against
/// * `origin` - The site origin supplying the fixed scheme and host
///
/// # Returns
///
/// * `Ok(CanonicalUrl)` - The canonical form
/// * `Err(UrlError)` - The href is empty, unparseable or not a web URL
///
/// # Examples
///
/// ```
/// use help_harvest::url::canonicalize_url;
/// use url::Url;
///
/// let origin = Url::parse("https://notion.so").unwrap();
/// let url = canonicalize_url("https://www.notion.so/help/guides?tab=1#top", &origin, &origin).unwrap();
/// assert_eq!(url.as_str(), "https://notion.so/help/guides");
/// ```
pub fn canonicalize_url(href: &str, base: &Url, origin: &Url) -> Result<CanonicalUrl, UrlError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Empty);
    }

    let url = base.join(href).map_err(|e| UrlError::Parse(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let origin_authority = authority(origin).ok_or(UrlError::MissingDomain)?;

    Ok(CanonicalUrl::new(format!(
        "{}://{}{}",
        origin.scheme(),
        origin_authority,
        url.path()
    )))
}
