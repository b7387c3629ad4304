use crate::config::CrawlConfig;
use crate::ConfigError;
use regex::Regex;

/// Include/exclude regex gate applied to canonical URLs
///
/// A URL passes when it matches `include` (if configured) and does not match
/// `exclude` (if configured). Matching is unanchored.
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl UrlFilter {
    /// Compiles the filters named in the configuration
    pub fn from_config(config: &CrawlConfig) -> Result<Self, ConfigError> {
        Self::new(config.include_regex.as_deref(), config.exclude_regex.as_deref())
    }

    /// Compiles include/exclude patterns
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self, ConfigError> {
        Ok(Self {
            include: include.map(compile).transpose()?,
            exclude: exclude.map(compile).transpose()?,
        })
    }

    /// Returns true if the canonical URL may be crawled
    pub fn allows(&self, url: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(url) {
                return false;
            }
        }

        if let Some(exclude) = &self.exclude {
            if exclude.is_match(url) {
                return false;
            }
        }

        true
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
}
