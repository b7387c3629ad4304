//! Sitemap discovery and expansion
//!
//! Probes the conventional sitemap locations under the site root, then expands
//! any child sitemaps one level deep. Failures are swallowed; an empty result
//! means "fall back to link-following from the site root".

use super::fetcher::fetch_text;
use crate::url::site_path;
use reqwest::Client;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;

/// Sitemap locations probed under the site root
pub const SITEMAP_CANDIDATES: [&str; 4] = [
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap_post.xml",
    "/sitemap_page.xml",
];

/// Parses a sitemap document
///
/// A `<sitemapindex>` document yields its child sitemap locations; any other
/// document yields the `<loc>` of each `<url>` entry. Only a `<loc>` directly
/// under an entry counts, so extension tags such as `<image:loc>` are ignored.
/// CDATA sections and entities inside `<loc>` are decoded. Parsing stops at the
/// first malformed construct, keeping what was read so far.
///
/// # Example
///
/// ```
/// use adsweep::crawler::parse_sitemap;
///
/// let xml = "<urlset><url><loc>https://example.com/a</loc></url></urlset>";
/// assert_eq!(parse_sitemap(xml), vec!["https://example.com/a".to_string()]);
/// ```
pub fn parse_sitemap(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut is_index: Option<bool> = None;
    let mut depth = 0usize;
    let mut entry_depth: Option<usize> = None;
    let mut in_loc = false;
    let mut loc = String::new();
    let mut locs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = e.local_name();
                let name = name.as_ref();
                match is_index {
                    None => is_index = Some(name == b"sitemapindex"),
                    Some(index) => {
                        let entry: &[u8] = if index { b"sitemap" } else { b"url" };
                        if entry_depth.is_none() && name == entry {
                            entry_depth = Some(depth);
                        } else if entry_depth == Some(depth - 1) && name == b"loc" {
                            in_loc = true;
                            loc.clear();
                        }
                    }
                }
            }
            Ok(Event::End(e)) => {
                if in_loc && e.local_name().as_ref() == b"loc" {
                    in_loc = false;
                    let value = loc.trim();
                    if !value.is_empty() {
                        locs.push(value.to_string());
                    }
                }
                if entry_depth == Some(depth) {
                    entry_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(text)) if in_loc => {
                if let Ok(text) = text.unescape() {
                    loc.push_str(&text);
                }
            }
            Ok(Event::CData(data)) if in_loc => {
                loc.push_str(&String::from_utf8_lossy(&data));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!("Stopped parsing sitemap: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    locs
}

/// Returns true if a sitemap entry points at another sitemap
fn is_child_sitemap(entry: &str) -> bool {
    let path = entry.split(['?', '#']).next().unwrap_or(entry);
    path.to_ascii_lowercase().ends_with(".xml")
}

/// Fetches every candidate sitemap and concatenates their entries, deduplicated
pub async fn fetch_sitemap_urls(client: &Client, site: &str) -> Vec<String> {
    let mut entries = Vec::new();

    for path in SITEMAP_CANDIDATES {
        let Some(sitemap_url) = site_path(site, path) else {
            continue;
        };
        if let Some(body) = fetch_text(client, &sitemap_url).await {
            let found = parse_sitemap(&body);
            tracing::debug!("Sitemap {} listed {} entries", sitemap_url, found.len());
            entries.extend(found);
        }
    }

    dedup_preserving_order(entries)
}

/// Discovers the site's page URLs from its sitemaps
///
/// Child sitemaps listed by the root-level probe are fetched once each; their
/// own child sitemaps are not followed. A visited set keeps a sitemap from being
/// fetched twice when indexes reference each other.
///
/// # Returns
///
/// Deduplicated page URLs in discovery order; empty if no sitemap was found
pub async fn expand_sitemaps(client: &Client, site: &str) -> Vec<String> {
    let seeds = fetch_sitemap_urls(client, site).await;
    if seeds.is_empty() {
        return Vec::new();
    }

    let mut visited: HashSet<String> = SITEMAP_CANDIDATES
        .iter()
        .filter_map(|path| site_path(site, path))
        .collect();
    let mut pages = Vec::new();

    for entry in seeds {
        if !is_child_sitemap(&entry) {
            pages.push(entry);
            continue;
        }

        if !visited.insert(entry.clone()) {
            tracing::debug!("Skipping already fetched sitemap {}", entry);
            continue;
        }

        if let Some(body) = fetch_text(client, &entry).await {
            pages.extend(
                parse_sitemap(&body)
                    .into_iter()
                    .filter(|loc| !is_child_sitemap(loc)),
            );
        }
    }

    let pages = dedup_preserving_order(pages);
    tracing::info!("Sitemaps yielded {} page URLs", pages.len());
    pages
}

fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
