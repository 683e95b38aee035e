use crate::config::types::{
    ChunkerConfig, Config, CrawlerConfig, OpenAiConfig, OutputConfig, SiteConfig, UserAgentConfig,
};
use crate::url::SiteScope;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_chunker_config(&config.chunker)?;
    validate_openai_config(&config.openai)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site origin, scope prefix and seed
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let scope = SiteScope::from_config(config)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", config.origin, e)))?;

    if !config.scope_prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "scope_prefix must start with '/', got '{}'",
            config.scope_prefix
        )));
    }

    if config.excluded_markers.iter().any(|m| m.is_empty()) {
        return Err(ConfigError::Validation(
            "excluded_markers cannot contain empty strings".to_string(),
        ));
    }

    let seed = config.seed_url();
    let in_scope = scope
        .is_in_scope(&seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;
    if !in_scope {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' is outside the crawl scope",
            seed
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.max_attempts < 1 || config.max_attempts > 10 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be between 1 and 10, got {}",
            config.max_attempts
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates chunker configuration
fn validate_chunker_config(config: &ChunkerConfig) -> Result<(), ConfigError> {
    if config.tags.is_empty() {
        return Err(ConfigError::Validation(
            "chunker tags cannot be empty".to_string(),
        ));
    }

    if let Some(tag) = config
        .inseparable_tags
        .iter()
        .find(|tag| !config.tags.contains(tag))
    {
        return Err(ConfigError::Validation(format!(
            "inseparable tag '{}' is not one of the captured tags",
            tag
        )));
    }

    if config.chunk_size < 1 {
        return Err(ConfigError::Validation(format!(
            "chunk_size must be >= 1, got {}",
            config.chunk_size
        )));
    }

    Ok(())
}

/// Validates remote chunker configuration
fn validate_openai_config(config: &OpenAiConfig) -> Result<(), ConfigError> {
    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "openai model cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid openai base_url: {}", e)))?;

    if config.api_key_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "openai api_key_env cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.raw_dir.is_empty() {
        return Err(ConfigError::Validation(
            "raw_dir cannot be empty".to_string(),
        ));
    }

    if config.processed_dir.is_empty() {
        return Err(ConfigError::Validation(
            "processed_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
