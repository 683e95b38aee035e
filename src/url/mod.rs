//! URL handling module for Help-Harvest
//!
//! This module provides URL canonicalization and crawl-scope classification.
//! Canonical URLs are the sole identity key for crawl state.

mod domain;
mod matcher;
mod normalize;

use crate::config::SiteConfig;
use crate::UrlError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use url::Url;

// Re-export main functions
pub use domain::extract_domain;
pub use matcher::matches_scope;
pub use normalize::canonicalize_url;

/// A URL reduced to scheme, host and path
///
/// Two URLs that differ only in query or fragment share one canonical form.
/// Values are only produced by [`canonicalize_url`] and [`SiteScope`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub(crate) fn new(url: String) -> Self {
        Self(url)
    }

    /// Returns the canonical URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the canonical form back into a [`Url`]
    pub fn to_url(&self) -> Result<Url, UrlError> {
        Url::parse(&self.0).map_err(|e| UrlError::Parse(e.to_string()))
    }

    /// Consumes the canonical URL, returning the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalUrl {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The crawl scope of a documentation site
///
/// Holds the site origin (fixed scheme and host), the path prefix every
/// in-scope page starts with and the markers that exclude a sub-section.
#[derive(Debug, Clone)]
pub struct SiteScope {
    origin: Url,
    prefix: String,
    excluded: Vec<String>,
}

impl SiteScope {
    /// Creates a scope from an origin URL, a path prefix and exclusion markers
    ///
    /// # Examples
    ///
    /// ```
    /// use help_harvest::url::SiteScope;
    ///
    /// let scope = SiteScope::new("https://notion.so", "/help", vec!["notion-academy".into()]).unwrap();
    /// assert!(scope.is_in_scope("https://notion.so/help/guides").unwrap());
    /// assert!(!scope.is_in_scope("https://notion.so/help/notion-academy").unwrap());
    /// ```
    pub fn new(origin: &str, prefix: &str, excluded: Vec<String>) -> Result<Self, UrlError> {
        let origin = Url::parse(origin).map_err(|e| UrlError::Parse(e.to_string()))?;
        if origin.scheme() != "http" && origin.scheme() != "https" {
            return Err(UrlError::InvalidScheme(origin.scheme().to_string()));
        }
        extract_domain(&origin).ok_or(UrlError::MissingDomain)?;

        Ok(Self {
            origin,
            prefix: prefix.to_string(),
            excluded,
        })
    }

    /// Builds the scope described by the `[site]` configuration table
    pub fn from_config(site: &SiteConfig) -> Result<Self, UrlError> {
        Self::new(&site.origin, &site.scope_prefix, site.excluded_markers.clone())
    }

    /// The site origin
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Checks whether an absolute URL belongs to the crawl scope
    ///
    /// True iff the URL path starts with the scope prefix and contains no
    /// excluded marker. The host is not consulted: canonicalization rebuilds
    /// every URL on the origin.
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - Whether the URL is in scope
    /// * `Err(UrlError)` - The input is not an absolute HTTP(S) URL
    pub fn is_in_scope(&self, url: &str) -> Result<bool, UrlError> {
        let parsed = Url::parse(url).map_err(|e| UrlError::Parse(e.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(UrlError::InvalidScheme(parsed.scheme().to_string()));
        }
        Ok(matches_scope(parsed.path(), &self.prefix, &self.excluded))
    }

    /// Checks whether a canonical URL belongs to the crawl scope
    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.is_in_scope(url.as_str()).unwrap_or(false)
    }

    /// Canonicalizes an href, resolving relative forms against the site origin
    pub fn canonicalize(&self, href: &str) -> Result<CanonicalUrl, UrlError> {
        canonicalize_url(href, &self.origin, &self.origin)
    }

    /// Canonicalizes an href found on the page at `base`
    pub fn canonicalize_from(&self, href: &str, base: &Url) -> Result<CanonicalUrl, UrlError> {
        canonicalize_url(href, base, &self.origin)
    }
}
