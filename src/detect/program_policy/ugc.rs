//! User-generated content risk

use super::{finding, UGC_POLICY_LINKS};
use crate::detect::PageContext;
use crate::model::{Finding, Severity};

const COMMENT_TOKENS: [&str; 5] = ["comment", "forum", "reply", "thread", "post"];
const MODERATION_TOKENS: [&str; 4] = ["captcha", "moderation", "awaiting approval", "nofollow"];

const SPAM_TERMS: [&str; 5] = [
    "buy now",
    "free money",
    "work from home",
    "viagra",
    "crypto giveaway",
];

const HIGH_RISK_TERMS: [&str; 6] = ["casino", "betting", "porn", "escort", "illegal", "drugs"];

/// Emits at most one of `ugc_high_risk_terms`, `ugc_unmoderated_spam` or
/// `ugc_unmoderated`, and only for pages with a comment or forum section
pub fn detect(ctx: &PageContext<'_>) -> Vec<Finding> {
    let html = ctx.page.html.to_lowercase();
    if !contains_any(&html, &COMMENT_TOKENS) {
        return Vec::new();
    }

    let text = ctx.page.text.to_lowercase();
    let high_risk = matching(&text, &HIGH_RISK_TERMS);
    let spam = matching(&text, &SPAM_TERMS);
    let moderated = contains_any(&html, &MODERATION_TOKENS);

    let outcome = if !high_risk.is_empty() {
        finding(
            "ugc_high_risk_terms",
            Severity::High,
            "User-generated content contains high-risk terms.",
        )
        .with_confidence(0.7)
        .with_remediation(&[
            "Moderate or remove high-risk user-generated content.",
            "Add keyword filters and active moderation workflows.",
        ])
        .with_evidence("high_risk_terms", high_risk)
    } else if !spam.is_empty() && !moderated {
        finding(
            "ugc_unmoderated_spam",
            Severity::Medium,
            "Comment or forum sections show spam signals without moderation.",
        )
        .with_confidence(0.55)
        .with_remediation(&[
            "Enable moderation, CAPTCHA, or rel=\"nofollow\" on UGC links.",
            "Remove spam-heavy threads or restrict posting privileges.",
        ])
        .with_evidence("spam_terms", spam)
    } else if !moderated {
        finding(
            "ugc_unmoderated",
            Severity::Medium,
            "User-generated content detected without clear moderation controls.",
        )
        .with_confidence(0.5)
        .with_remediation(&[
            "Add moderation notices or CAPTCHA on comment submissions.",
            "Apply rel=\"nofollow\" to outbound UGC links.",
        ])
        .with_evidence("moderation_detected", moderated)
    } else {
        return Vec::new();
    };

    vec![outcome.with_policy_links(&UGC_POLICY_LINKS)]
}

fn contains_any(haystack: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|token| haystack.contains(token))
}

fn matching(haystack: &str, terms: &[&'static str]) -> Vec<&'static str> {
    terms
        .iter()
        .copied()
        .filter(|term| haystack.contains(term))
        .collect()
}
