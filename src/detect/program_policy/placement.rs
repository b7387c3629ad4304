//! Manipulative ad placement: ads disguised as navigation or content, and
//! missing or faint ad labels

use super::{finding, PLACEMENT_POLICY_LINKS};
use crate::detect::PageContext;
use crate::model::{Finding, Severity};
use crate::render::layout::AD_SELECTORS;
use scraper::{Html, Selector};

/// Vertical distance within which a label belongs to an ad
const LABEL_RADIUS: f64 = 120.0;
const MIN_LABEL_FONT_SIZE: f64 = 10.0;
const MIN_LABEL_OPACITY: f64 = 0.7;

const LIST_TAGS: [&str; 5] = ["ul", "ol", "nav", "menu", "li"];

/// Emits `manipulative_ad_styling` and `ad_labeling_issues`
pub fn detect(ctx: &PageContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let ads = &ctx.page.ad_elements;

    let overlaps_nav_or_content = ads.iter().any(|ad| ad.overlaps_nav || ad.overlaps_content);
    let ads_in_lists = ad_in_list_or_menu(&ctx.page.html);

    if overlaps_nav_or_content || ads_in_lists {
        findings.push(
            finding(
                "manipulative_ad_styling",
                Severity::High,
                "Ads appear styled to blend with navigation or content.",
            )
            .with_confidence(0.72)
            .with_remediation(&[
                "Separate ad placements from navigation and primary content blocks.",
                "Use clear visual separation (borders, spacing) around ads.",
            ])
            .with_policy_links(&PLACEMENT_POLICY_LINKS)
            .with_evidence("overlaps_nav_or_content", overlaps_nav_or_content)
            .with_evidence("ads_in_lists", ads_in_lists),
        );
    }

    let mut missing_labels = 0usize;
    let mut weak_labels = 0usize;
    for ad in ads {
        let mut nearby = ctx
            .extras
            .label_blocks
            .iter()
            .filter(|label| (label.rect.y - ad.y).abs() <= LABEL_RADIUS)
            .peekable();

        if nearby.peek().is_none() {
            missing_labels += 1;
        } else if nearby
            .any(|label| label.font_size < MIN_LABEL_FONT_SIZE || label.opacity < MIN_LABEL_OPACITY)
        {
            weak_labels += 1;
        }
    }

    if missing_labels > 0 || weak_labels > 0 {
        findings.push(
            finding(
                "ad_labeling_issues",
                Severity::Medium,
                "Ad labeling appears missing or low visibility.",
            )
            .with_confidence(0.6)
            .with_remediation(&[
                "Add clear 'Advertisement' or 'Sponsored' labels adjacent to ads.",
                "Ensure labels are legible and not faded or hidden.",
            ])
            .with_policy_links(&PLACEMENT_POLICY_LINKS)
            .with_evidence("missing_labels", missing_labels)
            .with_evidence("weak_labels", weak_labels),
        );
    }

    findings
}

/// Returns true if any ad node sits inside a list, menu, or nav element
fn ad_in_list_or_menu(html: &str) -> bool {
    let Ok(selector) = Selector::parse(&AD_SELECTORS.join(", ")) else {
        return false;
    };
    let document = Html::parse_document(html);

    document.select(&selector).any(|ad| {
        ad.ancestors()
            .filter_map(|node| node.value().as_element())
            .any(|element| LIST_TAGS.contains(&element.name()))
    })
}
