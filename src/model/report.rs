use super::{Finding, PageResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Detector name -> severity name -> count
pub type SeveritySummary = BTreeMap<String, BTreeMap<String, usize>>;

/// A set of near-duplicate pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCluster {
    /// Seed URL first, then absorbed URLs in input order
    pub urls: Vec<String>,
    /// Mean similarity of absorbed pages to the seed
    pub similarity: f64,
}

/// Aggregate account risk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRisk {
    /// Clamped to [0, 100]
    pub score: u32,
    pub label: String,
}

/// The terminal audit aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingsReport {
    pub site: String,

    /// RFC 3339 timestamp
    pub generated_at: String,

    /// General-category findings
    pub summary: SeveritySummary,

    /// Program-policy findings
    pub program_policy_summary: SeveritySummary,

    pub account_risk: AccountRisk,

    pub pages: Vec<PageResult>,

    pub duplicates: Vec<DuplicateCluster>,

    /// Findings about the site as a whole
    #[serde(default)]
    pub site_findings: Vec<Finding>,
}

impl FindingsReport {
    /// Every finding in the report: page findings first, then site findings
    pub fn all_findings(&self) -> impl Iterator<Item = &Finding> {
        self.pages
            .iter()
            .flat_map(|p| p.findings.iter())
            .chain(self.site_findings.iter())
    }

    pub fn skipped_pages(&self) -> impl Iterator<Item = &PageResult> {
        self.pages.iter().filter(|p| p.is_skipped())
    }
}
