//! Invalid-traffic signals: click encouragement, forced reloads, ad density

use super::{finding, first_phrase, INVALID_TRAFFIC_POLICY_LINKS, META_REFRESH};
use crate::detect::PageContext;
use crate::model::{Finding, Severity};
use regex::Regex;
use std::sync::LazyLock;

/// Vertical distance within which text counts as "near" an ad
const NEARBY_RADIUS: f64 = 600.0;
const MAX_ADS_IN_VIEWPORT: usize = 3;

const ENCOURAGEMENT_PHRASES: [&str; 4] = [
    "support us by clicking ads",
    "click the ads",
    "help us by clicking",
    "visit our sponsors",
];

static TIMER_RELOAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)set(interval|timeout)\([^)]*(reload|adsbygoogle|googlesyndication)")
        .expect("timer reload pattern")
});

/// Emits `invalid_traffic_encouragement`, `invalid_traffic_reload_patterns` and
/// `invalid_traffic_high_density`
pub fn detect(ctx: &PageContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();

    let nearby = nearby_text(ctx).to_lowercase();
    if let Some(phrase) = first_phrase(&nearby, &ENCOURAGEMENT_PHRASES) {
        findings.push(
            finding(
                "invalid_traffic_encouragement",
                Severity::High,
                "Explicit encouragement to click ads detected near ad placements.",
            )
            .with_confidence(0.82)
            .with_remediation(&[
                "Remove any language that asks users to click ads or support the site via ads.",
                "Ensure ad placements are separated from user prompts and calls-to-action.",
            ])
            .with_policy_links(&INVALID_TRAFFIC_POLICY_LINKS)
            .with_evidence("matched_pattern", phrase),
        );
    }

    let html = &ctx.page.html;
    let meta_refresh = META_REFRESH.is_match(html);
    let js_reload = TIMER_RELOAD.is_match(html);
    if meta_refresh || js_reload {
        findings.push(
            finding(
                "invalid_traffic_reload_patterns",
                Severity::Medium,
                "Auto-refresh or script reload patterns detected around ad containers.",
            )
            .with_confidence(0.64)
            .with_remediation(&[
                "Remove auto-refresh or timer-based reloads that could inflate ad impressions.",
                "Avoid re-rendering ad containers on a timer.",
            ])
            .with_policy_links(&INVALID_TRAFFIC_POLICY_LINKS)
            .with_evidence("meta_refresh", meta_refresh)
            .with_evidence("js_reload", js_reload),
        );
    }

    let width = f64::from(ctx.viewport.width);
    let height = f64::from(ctx.viewport.height);
    let in_viewport = ctx
        .page
        .ad_elements
        .iter()
        .filter(|ad| ad.fits_within(width, height))
        .count();
    if in_viewport > MAX_ADS_IN_VIEWPORT {
        findings.push(
            finding(
                "invalid_traffic_high_density",
                Severity::Medium,
                "Unusually high number of ads above the fold detected.",
            )
            .with_confidence(0.6)
            .with_remediation(&[
                "Reduce the number of above-the-fold ad placements.",
                "Ensure ads do not dominate the initial viewport.",
            ])
            .with_policy_links(&INVALID_TRAFFIC_POLICY_LINKS)
            .with_evidence("above_fold_ads", in_viewport),
        );
    }

    findings
}

/// Concatenates every text block within the radius of any ad
fn nearby_text(ctx: &PageContext<'_>) -> String {
    let mut texts = Vec::new();
    for ad in &ctx.page.ad_elements {
        for block in &ctx.extras.text_blocks {
            if (block.rect.y - ad.y).abs() <= NEARBY_RADIUS {
                texts.push(block.text.as_str());
            }
        }
    }
    texts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdElement, PageResult};
    use crate::render::{MobileFlags, Rect, RenderExtras, TextBlock};

    fn block(text: &str, y: f64) -> TextBlock {
        TextBlock {
            text: text.to_string(),
            rect: Rect::new(0.0, y, 600.0, 20.0),
        }
    }

    fn run(page: &PageResult, extras: &RenderExtras) -> Vec<Finding> {
        detect(&PageContext::new(page, extras, MobileFlags::default()))
    }

    fn names(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.detector.as_str()).collect()
    }

    #[test]
    fn test_encouragement_near_ad() {
        let mut page = PageResult::new("https://example.com/", 0);
        page.ad_elements = vec![AdElement::new("ins.adsbygoogle", 0.0, 1000.0, 300.0, 250.0)];
        let extras = RenderExtras {
            text_blocks: vec![block("Please CLICK THE ADS to keep us running", 1500.0)],
            ..Default::default()
        };

        let found = run(&page, &extras);
        assert_eq!(names(&found), vec!["invalid_traffic_encouragement"]);
        assert_eq!(found[0].evidence["matched_pattern"], "click the ads");
    }

    #[test]
    fn test_encouragement_far_from_ad_ignored() {
        let mut page = PageResult::new("https://example.com/", 0);
        page.ad_elements = vec![AdElement::new("ins.adsbygoogle", 0.0, 0.0, 300.0, 250.0)];
        let extras = RenderExtras {
            text_blocks: vec![block("visit our sponsors", 601.0)],
            ..Default::default()
        };
        assert!(run(&page, &extras).is_empty());
    }

    #[test]
    fn test_encouragement_needs_ads() {
        let page = PageResult::new("https://example.com/", 0);
        let extras = RenderExtras {
            text_blocks: vec![block("click the ads", 0.0)],
            ..Default::default()
        };
        assert!(run(&page, &extras).is_empty());
    }

    #[test]
    fn test_reload_patterns() {
        let mut page = PageResult::new("https://example.com/", 0);
        page.html =
            r#"<script>setTimeout(window.location.reload.bind(window.location), 30000)</script>"#
                .to_string();
        let found = run(&page, &RenderExtras::default());
        assert_eq!(names(&found), vec!["invalid_traffic_reload_patterns"]);
        assert_eq!(found[0].evidence["js_reload"], true);
        assert_eq!(found[0].evidence["meta_refresh"], false);

        page.html = r#"<meta http-equiv="refresh" content="60">"#.to_string();
        let found = run(&page, &RenderExtras::default());
        assert_eq!(found[0].evidence["meta_refresh"], true);
    }

    #[test]
    fn test_high_density() {
        let mut page = PageResult::new("https://example.com/", 0);
        page.ad_elements = (0..4)
            .map(|i| AdElement::new("[data-ad-slot]", i as f64 * 320.0, 100.0, 300.0, 250.0))
            .collect();
        let found = run(&page, &RenderExtras::default());
        assert_eq!(names(&found), vec!["invalid_traffic_high_density"]);
        assert_eq!(found[0].evidence["above_fold_ads"], 4);

        // Push one ad below the fold
        page.ad_elements[3].y = 700.0;
        assert!(run(&page, &RenderExtras::default()).is_empty());
    }
}
