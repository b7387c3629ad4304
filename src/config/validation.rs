use crate::config::types::CrawlConfig;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_site(&config.site)?;
    validate_limits(config)?;
    validate_user_agent(&config.user_agent)?;
    validate_pattern("include_regex", config.include_regex.as_deref())?;
    validate_pattern("exclude_regex", config.exclude_regex.as_deref())?;
    Ok(())
}

/// Validates the site root
fn validate_site(site: &str) -> Result<(), ConfigError> {
    let url = Url::parse(site)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site '{}': {}", site, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Site '{}' must use http or https",
            site
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Site '{}' has no host",
            site
        )));
    }

    Ok(())
}

/// Validates numeric crawl limits
fn validate_limits(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if !(config.duplicate_threshold > 0.0 && config.duplicate_threshold <= 1.0) {
        return Err(ConfigError::Validation(format!(
            "duplicate_threshold must be in (0, 1], got {}",
            config.duplicate_threshold
        )));
    }

    if config.render_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "render_timeout_ms must be >= 1000ms, got {}ms",
            config.render_timeout_ms
        )));
    }

    Ok(())
}

/// Validates the user agent string
fn validate_user_agent(user_agent: &str) -> Result<(), ConfigError> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if user_agent.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "user_agent contains control characters: {:?}",
            user_agent
        )));
    }

    Ok(())
}

/// Validates an optional URL filter regex
fn validate_pattern(name: &str, pattern: Option<&str>) -> Result<(), ConfigError> {
    if let Some(pattern) = pattern {
        Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("{} '{}': {}", name, pattern, e)))?;
    }
    Ok(())
}
