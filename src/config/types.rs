use serde::Deserialize;
use std::path::PathBuf;

/// Immutable crawl configuration snapshot
///
/// Loaded from an optional TOML file, overridden by command-line flags, then
/// validated once before any network activity. Read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Site root to audit (absolute http(s) URL); may come from the command line
    #[serde(default)]
    pub site: String,

    /// Directory that receives findings.json and report.html
    #[serde(rename = "out-dir", default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Maximum number of pages stored in the result collection
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum link-following depth from the site root
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of concurrent crawl workers
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Whether robots.txt rules are honoured
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,

    /// User agent for every outgoing request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Only canonical URLs matching this regex are crawled
    #[serde(rename = "include-regex", default)]
    pub include_regex: Option<String>,

    /// Canonical URLs matching this regex are never crawled
    #[serde(rename = "exclude-regex", default)]
    pub exclude_regex: Option<String>,

    /// Drop query strings during canonicalization
    #[serde(rename = "ignore-querystrings", default)]
    pub ignore_querystrings: bool,

    /// Minimum interval between two requests to the same host (milliseconds)
    #[serde(rename = "rate-limit-ms", default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Run the program-policy detector family
    #[serde(rename = "policy-checks", default = "default_true")]
    pub policy_checks: bool,

    /// Persist noindex pages to the skipped-page store
    #[serde(rename = "list-skipped", default = "default_true")]
    pub list_skipped: bool,

    /// Similarity at or above which two pages are near-duplicates
    #[serde(rename = "duplicate-threshold", default = "default_duplicate_threshold")]
    pub duplicate_threshold: f64,

    /// Per-page render timeout (milliseconds)
    #[serde(rename = "render-timeout-ms", default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// SQLite file for skipped pages; defaults to `<out-dir>/skipped.sqlite`
    #[serde(rename = "database-path", default)]
    pub database_path: Option<PathBuf>,
}

impl CrawlConfig {
    /// Creates a configuration for `site` with every other field at its default
    pub fn for_site(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            out_dir: default_out_dir(),
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            concurrency: default_concurrency(),
            respect_robots: true,
            user_agent: default_user_agent(),
            include_regex: None,
            exclude_regex: None,
            ignore_querystrings: false,
            rate_limit_ms: default_rate_limit_ms(),
            policy_checks: true,
            list_skipped: true,
            duplicate_threshold: default_duplicate_threshold(),
            render_timeout_ms: default_render_timeout_ms(),
            database_path: None,
        }
    }

    /// Resolved location of the skipped-page database
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.out_dir.join("skipped.sqlite"))
    }
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("./out")
}

fn default_max_pages() -> usize {
    500
}

fn default_max_depth() -> u32 {
    3
}

fn default_concurrency() -> usize {
    6
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    "AdSweep/1.0".to_string()
}

fn default_rate_limit_ms() -> u64 {
    250
}

fn default_duplicate_threshold() -> f64 {
    0.85
}

fn default_render_timeout_ms() -> u64 {
    30_000
}
