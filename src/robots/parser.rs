//! Robots.txt parser implementation
//!
//! Allow/disallow matching is delegated to the robotstxt crate. Crawl-delay is
//! not part of that crate's API, so it is read from the directive groups here.

use robotstxt::DefaultMatcher;

/// The robots.txt rules of the crawled origin, bound to one user agent token
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    /// Raw robots.txt content (None means allow all)
    content: Option<String>,

    /// Product token matched against `User-agent` lines
    agent: String,
}

impl ParsedRobots {
    /// Creates a ParsedRobots from raw robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `agent` - The crawler's product token (e.g. "HelpHarvest")
    pub fn from_content(content: &str, agent: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            agent: agent.to_string(),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt is ignored or cannot be fetched.
    pub fn allow_all(agent: &str) -> Self {
        Self {
            content: None,
            agent: agent.to_string(),
        }
    }

    /// Returns true if this is the permissive fallback
    pub fn is_allow_all(&self) -> bool {
        self.content.is_none()
    }

    /// Checks if an absolute URL may be fetched
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed
    /// * `false` - If the URL is disallowed
    pub fn is_allowed(&self, url: &str) -> bool {
        match self.content.as_deref() {
            None | Some("") => true,
            Some(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, &self.agent, url)
            }
        }
    }

    /// Gets the crawl delay that applies to this agent, in seconds
    ///
    /// A group naming the agent wins over the `*` group.
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The crawl delay in seconds
    /// * `None` - If no applicable crawl delay is specified
    pub fn crawl_delay(&self) -> Option<f64> {
        let content = self.content.as_deref()?;
        let agent = self.agent.to_lowercase();

        let mut group: Vec<String> = Vec::new();
        let mut group_open = false;
        let mut wildcard_delay = None;
        let mut agent_delay = None;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                if !group_open {
                    group.clear();
                    group_open = true;
                }
                group.push(value.to_lowercase());
                continue;
            }
            group_open = false;

            if key != "crawl-delay" {
                continue;
            }
            let Ok(delay) = value.parse::<f64>() else {
                continue;
            };
            if group.iter().any(|ua| ua != "*" && agent.starts_with(ua.as_str())) {
                agent_delay = Some(delay);
            } else if group.iter().any(|ua| ua == "*") {
                wildcard_delay = wildcard_delay.or(Some(delay));
            }
        }

        agent_delay.or(wildcard_delay)
    }
}
