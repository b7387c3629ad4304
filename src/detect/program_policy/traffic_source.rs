//! Traffic-source abuse: forced redirects and incentivized visits

use super::{finding, first_phrase, TRAFFIC_POLICY_LINKS};
use crate::detect::PageContext;
use crate::model::{Finding, Severity};
use regex::Regex;
use std::sync::LazyLock;

/// Refresh delays below this many seconds count as forced
const FAST_REFRESH_SECS: u64 = 5;

const INCENTIVIZED_PHRASES: [&str; 4] = [
    "get paid to visit",
    "rewards for visiting",
    "points for clicks",
    "paid to click",
];

static META_REFRESH_DELAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv=['"]?refresh[^>]+content=['"]?(\d+)"#)
        .expect("meta refresh delay pattern")
});

static LOAD_REDIRECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(onload\s*=|addEventListener\(['"]load['"]\)).*(location|window\.location)"#)
        .expect("load redirect pattern")
});

static LOCATION_REPLACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)location\.replace\(").expect("location replace pattern"));

/// Emits `traffic_source_forced_redirects` and `traffic_source_incentivized`
pub fn detect(ctx: &PageContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let html = &ctx.page.html;

    let meta_refresh_fast = fast_meta_refresh(html);
    let js_redirect = LOAD_REDIRECT.is_match(html);
    let location_replace = LOCATION_REPLACE.is_match(html);

    if meta_refresh_fast || js_redirect || location_replace {
        findings.push(
            finding(
                "traffic_source_forced_redirects",
                Severity::High,
                "Forced redirects or fast refresh patterns detected.",
            )
            .with_confidence(0.7)
            .with_remediation(&[
                "Remove auto-redirects or immediate refreshes before content loads.",
                "Ensure users intentionally navigate to pages with ads.",
            ])
            .with_policy_links(&TRAFFIC_POLICY_LINKS)
            .with_evidence("meta_refresh_fast", meta_refresh_fast)
            .with_evidence("js_redirect", js_redirect)
            .with_evidence("location_replace", location_replace),
        );
    }

    let text = ctx.page.text.to_lowercase();
    if let Some(phrase) = first_phrase(&text, &INCENTIVIZED_PHRASES) {
        findings.push(
            finding(
                "traffic_source_incentivized",
                Severity::Critical,
                "Incentivized traffic language detected.",
            )
            .with_confidence(0.86)
            .with_remediation(&[
                "Remove offers or rewards tied to visits or clicks.",
                "Acquire traffic organically without incentivization.",
            ])
            .with_policy_links(&TRAFFIC_POLICY_LINKS)
            .with_evidence("matched_pattern", phrase),
        );
    }

    findings
}

/// A meta refresh with a delay under five seconds
///
/// A delay too large for `u64` is far beyond the threshold and is not fast.
fn fast_meta_refresh(html: &str) -> bool {
    META_REFRESH_DELAY
        .captures(html)
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .is_some_and(|delay| delay < FAST_REFRESH_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageResult;
    use crate::render::{MobileFlags, RenderExtras};

    fn run(text: &str, html: &str) -> Vec<Finding> {
        let mut page = PageResult::new("https://example.com/", 0);
        page.text = text.to_string();
        page.html = html.to_string();
        let extras = RenderExtras::default();
        detect(&PageContext::new(&page, &extras, MobileFlags::default()))
    }

    #[test]
    fn test_fast_meta_refresh() {
        assert!(fast_meta_refresh(
            r#"<meta http-equiv="refresh" content="0; url=https://other.example/">"#
        ));
        assert!(fast_meta_refresh(r#"<meta http-equiv="refresh" content="4">"#));
        assert!(!fast_meta_refresh(r#"<meta http-equiv="refresh" content="5">"#));
        assert!(!fast_meta_refresh("<p>no refresh</p>"));
    }

    #[test]
    fn test_overflowing_refresh_delay_is_not_fast() {
        let html = r#"<meta http-equiv="refresh" content="99999999999999999999999">"#;
        assert!(!fast_meta_refresh(html));
        assert!(run("", html).is_empty());
    }

    #[test]
    fn test_forced_redirect_signals() {
        let found = run("", r#"<body onload="window.location='https://x.example/'">"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].detector, "traffic_source_forced_redirects");
        assert_eq!(found[0].evidence["js_redirect"], true);
        assert_eq!(found[0].evidence["meta_refresh_fast"], false);

        let found = run("", "<script>location.replace('/landing')</script>");
        assert_eq!(found[0].evidence["location_replace"], true);
        assert_eq!(found[0].severity, Severity::High);
    }

    #[test]
    fn test_slow_refresh_is_clean() {
        assert!(run("", r#"<meta http-equiv="refresh" content="300">"#).is_empty());
    }

    #[test]
    fn test_incentivized_first_match_only() {
        let found = run("Points for clicks! Get PAID to visit our partners.", "");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].detector, "traffic_source_incentivized");
        assert_eq!(found[0].severity, Severity::Critical);
        assert_eq!(found[0].evidence["matched_pattern"], "get paid to visit");
    }
}
