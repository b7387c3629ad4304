//! Robots.txt policy
//!
//! Thin wrapper over the `robotstxt` matcher exposing `can_fetch(user_agent, url)`.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt data for the audited site
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Raw robots.txt content
    content: String,
    /// Set when robots.txt was absent, unreachable, or robots are not respected
    allow_all: bool,
}

impl RobotsPolicy {
    /// Creates a policy from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive policy that allows everything
    ///
    /// Used when robots.txt cannot be fetched or robots are not respected.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Returns true if this policy imposes no restrictions at all
    pub fn is_permissive(&self) -> bool {
        self.allow_all || self.content.trim().is_empty()
    }

    /// Checks whether `user_agent` may fetch `url`
    ///
    /// # Arguments
    ///
    /// * `user_agent` - The configured user agent string
    /// * `url` - Absolute URL to check
    pub fn can_fetch(&self, user_agent: &str, url: &str) -> bool {
        if self.is_permissive() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, product_token(user_agent), url)
    }
}

/// Reduces a full user agent string to its product token (`AdSweep/1.0` -> `AdSweep`)
fn product_token(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .find(|s| !s.is_empty())
        .unwrap_or(user_agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        let robots = RobotsPolicy::allow_all();
        assert!(robots.can_fetch("AdSweep/1.0", "https://example.com/any/path"));
        assert!(robots.is_permissive());
    }

    #[test]
    fn test_empty_content_allows_all() {
        let robots = RobotsPolicy::from_content("");
        assert!(robots.can_fetch("AdSweep/1.0", "https://example.com/admin"));
    }

    #[test]
    fn test_disallow_wildcard() {
        let content = "User-agent: *\nDisallow: /admin/\n";
        let robots = RobotsPolicy::from_content(content);

        assert!(robots.can_fetch("AdSweep/1.0", "https://example.com/page"));
        assert!(!robots.can_fetch("AdSweep/1.0", "https://example.com/admin/settings"));
    }

    #[test]
    fn test_specific_agent_group() {
        let content = "User-agent: AdSweep\nDisallow: /private\n\nUser-agent: *\nDisallow:\n";
        let robots = RobotsPolicy::from_content(content);

        assert!(!robots.can_fetch("AdSweep/1.0", "https://example.com/private/page"));
        assert!(robots.can_fetch("OtherBot/2.0", "https://example.com/private/page"));
    }

    #[test]
    fn test_disallow_everything() {
        let robots = RobotsPolicy::from_content("User-agent: *\nDisallow: /\n");
        assert!(!robots.can_fetch("AdSweep/1.0", "https://example.com/"));
        assert!(!robots.can_fetch("AdSweep/1.0", "https://example.com/a/b"));
    }

    #[test]
    fn test_product_token() {
        assert_eq!(product_token("AdSweep/1.0"), "AdSweep");
        assert_eq!(product_token("Mozilla/5.0 (compatible)"), "Mozilla");
        assert_eq!(product_token("plainbot"), "plainbot");
    }
}
