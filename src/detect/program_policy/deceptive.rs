//! Deceptive representation: claimed affiliation with brands or authorities

use super::{finding, DECEPTIVE_POLICY_LINKS};
use crate::detect::PageContext;
use crate::model::{Finding, Severity};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

const STATUS_TERMS: [&str; 4] = ["official", "authorized", "partner", "approved"];
const BRAND_TERMS: [&str; 3] = ["google", "irs", "government"];

static DISCLAIMER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)not affiliated|not endorsed|no affiliation|independent")
        .expect("disclaimer pattern")
});

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("word pattern"));

/// Emits `deceptive_affiliation_claims` or
/// `deceptive_affiliation_disclaimer_low_visibility`
pub fn detect(ctx: &PageContext<'_>) -> Vec<Finding> {
    let Some((status_terms, brands)) = affiliation_claim(&ctx.page.text) else {
        return Vec::new();
    };
    let html = &ctx.page.html;

    if !DISCLAIMER.is_match(html) {
        return vec![finding(
            "deceptive_affiliation_claims",
            Severity::High,
            "Claims of affiliation or authorization detected without disclaimer.",
        )
        .with_confidence(0.72)
        .with_remediation(&[
            "Remove claims of official status or brand affiliation unless authorized.",
            "Add clear disclaimers when referencing third-party brands.",
        ])
        .with_policy_links(&DECEPTIVE_POLICY_LINKS)
        .with_evidence("status_terms", status_terms)
        .with_evidence("brands", brands)];
    }

    if disclaimer_low_visibility(html) {
        return vec![finding(
            "deceptive_affiliation_disclaimer_low_visibility",
            Severity::Medium,
            "Affiliation disclaimer appears low visibility or buried.",
        )
        .with_confidence(0.6)
        .with_remediation(&[
            "Place disclaimers near claims and make them easy to read.",
            "Avoid hiding disclosures in footers or fine print.",
        ])
        .with_policy_links(&DECEPTIVE_POLICY_LINKS)
        .with_evidence("disclaimer_low_visibility", true)];
    }

    Vec::new()
}

/// Returns the status and brand words if the text claims an affiliation
fn affiliation_claim(text: &str) -> Option<(Vec<&'static str>, Vec<&'static str>)> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = WORD.find_iter(&lowered).map(|m| m.as_str()).collect();
    let present = |term: &&str| words.contains(term);

    let status_terms: Vec<&'static str> = STATUS_TERMS.iter().copied().filter(present).collect();
    let brands: Vec<&'static str> = BRAND_TERMS.iter().copied().filter(present).collect();

    if status_terms.is_empty() || brands.is_empty() {
        None
    } else {
        Some((status_terms, brands))
    }
}

/// Returns true if any disclaimer sits in small, faded, or footer markup
fn disclaimer_low_visibility(html: &str) -> bool {
    let document = Html::parse_document(html);
    let Ok(all) = Selector::parse("body *") else {
        return false;
    };

    document
        .select(&all)
        .filter(|element| own_text_matches(*element))
        .any(is_low_visibility)
}

fn own_text_matches(element: ElementRef<'_>) -> bool {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .any(|text| DISCLAIMER.is_match(text))
}

fn is_low_visibility(element: ElementRef<'_>) -> bool {
    let value = element.value();
    let style = value.attr("style").unwrap_or("").to_lowercase();
    let classes = value.classes().collect::<Vec<_>>().join(" ").to_lowercase();

    style.contains("font-size")
        || style.contains("opacity")
        || classes.contains("fine-print")
        || classes.contains("footer")
        || matches!(value.name(), "small" | "footer")
}
