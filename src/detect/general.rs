//! General content and ad-experience detectors

use super::text::{detect_language, round3, word_count};
use super::PageContext;
use crate::crawler::parser::html_lang;
use crate::model::{Finding, FindingCategory, Severity};

const THIN_CONTENT_WORDS: usize = 300;
const ADS_VS_CONTENT_MIN_ADS: usize = 4;
const ADS_VS_CONTENT_WORDS: usize = 400;
const ADS_VS_CONTENT_AREA_RATIO: f64 = 0.35;

fn finding(detector: &str, severity: Severity, message: &str) -> Finding {
    Finding::new(detector, severity, FindingCategory::General, message)
}

/// `thin_content`: fewer than 300 visible words
pub fn thin_content(ctx: &PageContext<'_>) -> Vec<Finding> {
    let count = word_count(&ctx.page.text);
    if count >= THIN_CONTENT_WORDS {
        return Vec::new();
    }

    vec![finding("thin_content", Severity::Medium, "Page has low visible word count.")
        .with_confidence(0.8)
        .with_remediation(&[
            "Expand the page with original, substantive content.",
            "Consolidate or noindex thin pages that cannot be improved.",
        ])
        .with_evidence("word_count", count)]
}

/// `ads_vs_content`: many ads on a short page, or ads covering over 35% of the viewport
pub fn ads_vs_content(ctx: &PageContext<'_>) -> Vec<Finding> {
    let ads = &ctx.page.ad_elements;
    let ad_count = ads.len();
    let ad_area: f64 = ads.iter().map(|ad| ad.area()).sum();
    let viewport_area = ctx.viewport.area();
    let ad_ratio = if viewport_area > 0.0 {
        ad_area / viewport_area
    } else {
        0.0
    };
    let words = word_count(&ctx.page.text);

    let crowded = ad_count >= ADS_VS_CONTENT_MIN_ADS && words < ADS_VS_CONTENT_WORDS;
    if !crowded && ad_ratio <= ADS_VS_CONTENT_AREA_RATIO {
        return Vec::new();
    }

    vec![finding("ads_vs_content", Severity::High, "More ads than content detected.")
        .with_confidence(0.75)
        .with_remediation(&[
            "Reduce the number or size of ad units on the page.",
            "Make sure publisher content outweighs advertising.",
        ])
        .with_evidence("ad_count", ad_count)
        .with_evidence("word_count", words)
        .with_evidence("ad_area_ratio", round3(ad_ratio))]
}

/// `ads_interfering`: an ad overlaps an interactive control or the primary content
pub fn ads_interfering(ctx: &PageContext<'_>) -> Vec<Finding> {
    let overlapping = ctx
        .page
        .ad_elements
        .iter()
        .filter(|ad| ad.overlaps_clickable || ad.overlaps_content)
        .count();
    if overlapping == 0 {
        return Vec::new();
    }

    vec![finding(
        "ads_interfering",
        Severity::High,
        "Ads overlapping interactive or primary content.",
    )
    .with_confidence(0.7)
    .with_remediation(&[
        "Move ads away from links, buttons and form controls.",
        "Keep ads outside the main content area.",
    ])
    .with_evidence("overlap_count", overlapping)]
}

/// `dead_end_ad`: a viewport-covering overlay on a page that carries ads
pub fn dead_end_ad(ctx: &PageContext<'_>) -> Vec<Finding> {
    let overlays = &ctx.extras.overlays;
    if overlays.is_empty() || ctx.page.ad_elements.is_empty() {
        return Vec::new();
    }

    vec![finding(
        "dead_end_ad",
        Severity::High,
        "Modal overlay with ads may block content.",
    )
    .with_confidence(0.65)
    .with_remediation(&[
        "Do not cover page content with overlays on pages that show ads.",
        "Give overlays an obvious, immediate way to dismiss them.",
    ])
    .with_evidence("overlay_count", overlays.len())]
}

/// `language_issue`: no detectable language, or one that disagrees with `<html lang>`
pub fn language_issue(ctx: &PageContext<'_>) -> Vec<Finding> {
    let declared = html_lang(&ctx.page.html);
    let detected = detect_language(&ctx.page.text).unwrap_or("");

    let mismatch = !declared.is_empty() && !declared.to_lowercase().contains(detected);
    if !detected.is_empty() && !mismatch {
        return Vec::new();
    }

    vec![finding(
        "language_issue",
        Severity::Low,
        "Language mismatch or undetected language.",
    )
    .with_confidence(0.5)
    .with_remediation(&[
        "Declare the page language accurately in the <html lang> attribute.",
        "Publish in a language supported by the ad program.",
    ])
    .with_evidence("html_lang", declared)
    .with_evidence("detected", detected)]
}

/// `abusive_experience`: any mobile heuristic flag is set
pub fn abusive_experience(ctx: &PageContext<'_>) -> Vec<Finding> {
    let flags = ctx.mobile_flags;
    if !flags.any() {
        return Vec::new();
    }

    vec![finding(
        "abusive_experience",
        Severity::Medium,
        "Possible abusive experience heuristics triggered.",
    )
    .with_confidence(0.6)
    .with_remediation(&[
        "Mute autoplaying video by default.",
        "Limit sticky elements and avoid popups on page load on mobile.",
    ])
    .with_evidence("autoplay_audio", flags.autoplay_audio)
    .with_evidence("sticky_elements", flags.sticky_elements)
    .with_evidence("popup_on_load", flags.popup_on_load)]
}
