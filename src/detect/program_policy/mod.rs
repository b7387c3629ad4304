//! Program-policy detectors
//!
//! Deceptive representation, invalid-traffic inducement, manipulative ad
//! placement, traffic-source abuse and user-generated-content risk. Findings
//! from this module are counted in the program-policy summary and carry policy
//! reference links.

pub mod deceptive;
pub mod invalid_traffic;
pub mod placement;
pub mod traffic_source;
pub mod ugc;

use crate::model::{Finding, FindingCategory, Severity};
use regex::Regex;
use std::sync::LazyLock;

pub const DECEPTIVE_POLICY_LINKS: [&str; 2] = [
    "https://support.google.com/adsense/answer/1346295",
    "https://support.google.com/adsense/answer/2785928",
];

pub const INVALID_TRAFFIC_POLICY_LINKS: [&str; 2] = [
    "https://support.google.com/adsense/answer/1348695",
    "https://support.google.com/adsense/answer/57153",
];

pub const PLACEMENT_POLICY_LINKS: [&str; 2] = [
    "https://support.google.com/adsense/answer/1346295",
    "https://support.google.com/adsense/answer/48182",
];

pub const TRAFFIC_POLICY_LINKS: [&str; 2] = [
    "https://support.google.com/adsense/answer/48182",
    "https://support.google.com/adsense/answer/1346295",
];

pub const UGC_POLICY_LINKS: [&str; 2] = [
    "https://support.google.com/adsense/answer/1346295",
    "https://support.google.com/adsense/answer/48182",
];

/// Any `<meta http-equiv="refresh">` tag
pub(crate) static META_REFRESH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv=['"]?refresh"#).expect("meta refresh pattern")
});

fn finding(detector: &str, severity: Severity, message: &str) -> Finding {
    Finding::new(detector, severity, FindingCategory::ProgramPolicy, message)
}

/// Returns the first pattern found in `haystack` (which must already be lowercase)
fn first_phrase<'p>(haystack: &str, phrases: &[&'p str]) -> Option<&'p str> {
    phrases.iter().copied().find(|phrase| haystack.contains(phrase))
}
