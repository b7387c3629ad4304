//! HTML parsing for the crawl pipeline
//!
//! This module handles parsing rendered HTML to extract:
//! - Links to follow (from `<a>` tags)
//! - Visible text for the content detectors
//! - The declared document language
//! - Privacy-policy links

use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Tags whose content is never visible text
const INVISIBLE_TAGS: [&str; 6] = ["script", "style", "noscript", "template", "head", "svg"];

/// Extracts all followable links from the HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags, resolved against `base_url`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
///
/// # Arguments
///
/// * `html` - The HTML content
/// * `base_url` - The page's final URL, for resolving relative links
///
/// # Returns
///
/// Absolute http(s) URLs in document order (duplicates kept)
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}

/// Extracts the visible text of a page
///
/// The main content region (`<main>`, then `<article>`) is preferred; otherwise
/// the whole `<body>`. Script, style and template content is dropped and
/// whitespace is collapsed.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for region in ["main", "article", "body"] {
        let Ok(selector) = Selector::parse(region) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = element_text(element);
            if !text.is_empty() {
                return text;
            }
        }
    }

    String::new()
}

/// Collects the visible text under `element`, whitespace-collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();
    collect_text(element, &mut parts);
    parts.join(" ")
}

fn collect_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
    if INVISIBLE_TAGS.contains(&element.value().name()) {
        return;
    }

    // Explicit stack keeps arbitrarily deep documents off the call stack
    let mut pending: Vec<_> = element.children().rev().collect();
    while let Some(node) = pending.pop() {
        if let Some(child_element) = ElementRef::wrap(node) {
            if !INVISIBLE_TAGS.contains(&child_element.value().name()) {
                pending.extend(node.children().rev());
            }
        } else if let Some(text) = node.value().as_text() {
            parts.extend(text.split_whitespace().map(str::to_string));
        }
    }
}

/// Returns the `lang` attribute of the `<html>` element, or an empty string
pub fn html_lang(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .root_element()
        .value()
        .attr("lang")
        .map(|lang| lang.trim().to_string())
        .unwrap_or_default()
}

/// Returns true if any link's text mentions a privacy policy
pub fn page_mentions_privacy(html: &str) -> bool {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a") else {
        return false;
    };

    document.select(&selector).any(|link| {
        link.text()
            .collect::<String>()
            .to_lowercase()
            .contains("privacy")
    })
}

/// Returns true if the `X-Robots-Tag` header carries `noindex`
///
/// Header names are expected in lowercase.
pub fn has_noindex_header(headers: &BTreeMap<String, String>) -> bool {
    headers
        .get("x-robots-tag")
        .map(|value| value.to_lowercase().contains("noindex"))
        .unwrap_or(false)
}
