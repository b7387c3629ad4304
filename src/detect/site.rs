//! Site-level detectors
//!
//! These run once per audit, after every page has been rendered, and produce
//! findings that are not attached to a single page.

use super::text::round3;
use crate::model::{DuplicateCluster, Finding, FindingCategory, Severity};

fn finding(detector: &str, severity: Severity, message: &str) -> Finding {
    Finding::new(detector, severity, FindingCategory::General, message)
}

/// `missing_privacy_policy`: no privacy link seen during the crawl and no probe path answered
pub fn missing_privacy_policy(found: bool) -> Vec<Finding> {
    if found {
        return Vec::new();
    }

    vec![finding(
        "missing_privacy_policy",
        Severity::High,
        "No privacy policy page found.",
    )
    .with_confidence(0.9)
    .with_remediation(&[
        "Publish a privacy policy that discloses third-party ad serving and cookie use.",
        "Link the privacy policy from every page, typically in the footer.",
    ])]
}

/// `missing_ads_txt`: ads.txt errored or has no records
pub fn missing_ads_txt(status: u16, lines: usize) -> Vec<Finding> {
    if status < 400 && lines >= 1 {
        return Vec::new();
    }

    vec![finding("missing_ads_txt", Severity::Medium, "ads.txt missing or empty.")
        .with_confidence(0.9)
        .with_remediation(&[
            "Serve an ads.txt file at the root of the domain.",
            "List every authorized seller, one record per line.",
        ])
        .with_evidence("status", status)
        .with_evidence("lines", lines)]
}

/// `replicated_content`: one finding per near-duplicate cluster
pub fn replicated_content(clusters: &[DuplicateCluster]) -> Vec<Finding> {
    clusters
        .iter()
        .map(|cluster| {
            finding(
                "replicated_content",
                Severity::High,
                "Near-duplicate content cluster detected.",
            )
            .with_confidence(0.7)
            .with_remediation(&[
                "Rewrite or consolidate pages that repeat the same content.",
                "Canonicalize or noindex templated pages with little unique text.",
            ])
            .with_evidence("urls", cluster.urls.clone())
            .with_evidence("similarity", round3(cluster.similarity))
        })
        .collect()
}
