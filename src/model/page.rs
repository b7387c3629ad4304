use super::Finding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One rendered ad-bearing node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdElement {
    /// The ad selector that matched this node
    pub selector: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Overlaps a link, button, or form control
    #[serde(default)]
    pub overlaps_clickable: bool,
    /// Overlaps the top navigation band
    #[serde(default)]
    pub overlaps_nav: bool,
    /// Overlaps the primary content region
    #[serde(default)]
    pub overlaps_content: bool,
}

impl AdElement {
    /// Creates an ad element with no overlaps
    pub fn new(selector: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            selector: selector.into(),
            x,
            y,
            width,
            height,
            overlaps_clickable: false,
            overlaps_nav: false,
            overlaps_content: false,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns true if the element lies entirely within a `width` x `height` viewport
    pub fn fits_within(&self, width: f64, height: f64) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= width
            && self.y + self.height <= height
    }
}

/// The outcome of visiting one canonical URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Canonical URL (the crawl identity)
    pub url: String,

    /// URL after redirects
    pub final_url: String,

    /// HTTP status; 0 when the render failed
    pub status: u16,

    pub html: String,

    /// Extracted visible text
    pub text: String,

    #[serde(default)]
    pub screenshot_path: Option<String>,

    /// Requests issued while rendering, by host
    #[serde(default)]
    pub network_summary: BTreeMap<String, u32>,

    #[serde(default)]
    pub ad_elements: Vec<AdElement>,

    #[serde(default)]
    pub findings: Vec<Finding>,

    /// Set when content detectors were skipped (e.g. `noindex`)
    #[serde(default)]
    pub skipped_reason: Option<String>,

    /// Crawl depth at which the URL was discovered
    #[serde(default)]
    pub depth: u32,

    /// Render failure description
    #[serde(default)]
    pub fetch_error: Option<String>,
}

impl PageResult {
    /// Creates an empty result for `url`
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status: 0,
            html: String::new(),
            text: String::new(),
            screenshot_path: None,
            network_summary: BTreeMap::new(),
            ad_elements: Vec::new(),
            findings: Vec::new(),
            skipped_reason: None,
            depth,
            fetch_error: None,
        }
    }

    /// Creates a result recording a failed render
    pub fn failed(url: impl Into<String>, depth: u32, error: impl Into<String>) -> Self {
        let mut page = Self::new(url, depth);
        page.fetch_error = Some(error.into());
        page
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped_reason.is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.fetch_error.is_some()
    }

    /// Returns true if content detectors ran (or would run) on this page
    pub fn is_analyzable(&self) -> bool {
        !self.is_skipped() && !self.is_failed()
    }

    /// Highest severity among this page's findings
    pub fn worst_severity(&self) -> Option<super::Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }
}
