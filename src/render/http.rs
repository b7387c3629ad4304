//! Static-HTML renderer backed by `reqwest`

use super::layout::{self, PageLayout};
use super::{MobileFlags, RenderError, RenderExtras, RenderedPage, Renderer, Viewport};
use crate::crawler::parser::extract_visible_text;
use crate::url::extract_host;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use url::Url;

/// Subresource references a browser would request while loading the page
const SUBRESOURCE_SELECTORS: [(&str, &str); 5] = [
    ("script[src]", "src"),
    ("img[src]", "src"),
    ("iframe[src]", "src"),
    ("video[src]", "src"),
    ("link[rel~='stylesheet'][href]", "href"),
];

/// Renders pages by fetching their HTML and estimating layout from markup
///
/// Concurrent renders are bounded by an internal semaphore, independent of how
/// many crawl workers call into it.
#[derive(Clone)]
pub struct HttpRenderer {
    client: Client,
    admission: Arc<Semaphore>,
}

impl HttpRenderer {
    /// Creates a renderer allowing at most `max_concurrent` renders at once
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client carrying the crawl's user agent and timeout
    /// * `max_concurrent` - Render admission limit (at least 1)
    pub fn new(client: Client, max_concurrent: usize) -> Self {
        Self {
            client,
            admission: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Fetched, RenderError> {
        let _permit = self
            .admission
            .acquire()
            .await
            .map_err(|e| RenderError::Transport(e.to_string()))?;

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect();
        let html = response.text().await?;

        Ok(Fetched {
            final_url,
            status,
            headers,
            html,
        })
    }
}

struct Fetched {
    final_url: String,
    status: u16,
    headers: BTreeMap<String, String>,
    html: String,
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str, viewport: Viewport) -> Result<RenderedPage, RenderError> {
        let fetched = self.fetch(url).await?;
        tracing::trace!("Rendered {} ({}, {} bytes)", url, fetched.status, fetched.html.len());

        let PageLayout {
            ads,
            overlays,
            text_blocks,
            label_blocks,
            has_noindex_meta,
            has_google_ad_client,
            ..
        } = layout::analyze(&fetched.html, viewport);

        let request_counts = request_counts(&fetched.html, &fetched.final_url);
        let visible_text = extract_visible_text(&fetched.html);

        Ok(RenderedPage {
            final_url: fetched.final_url,
            status: fetched.status,
            html: fetched.html,
            visible_text,
            request_counts,
            ad_elements: ads,
            extras: RenderExtras {
                headers: fetched.headers,
                has_noindex_meta,
                has_google_ad_client,
                overlays,
                text_blocks,
                label_blocks,
            },
        })
    }

    async fn collect_mobile_flags(
        &self,
        url: &str,
        viewport: Viewport,
    ) -> Result<MobileFlags, RenderError> {
        let fetched = self.fetch(url).await?;
        Ok(layout::analyze(&fetched.html, viewport).mobile_flags)
    }
}

/// Counts the requests a browser would issue for the page, by host
///
/// The document itself counts once toward the final URL's host.
pub fn request_counts(html: &str, final_url: &str) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    let Ok(base) = Url::parse(final_url) else {
        return counts;
    };

    if let Some(host) = extract_host(&base) {
        *counts.entry(host).or_insert(0) += 1;
    }

    let document = Html::parse_document(html);
    for (selector, attr) in SUBRESOURCE_SELECTORS {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&selector) {
            let host = element
                .value()
                .attr(attr)
                .and_then(|src| base.join(src.trim()).ok())
                .filter(|u| u.scheme() == "http" || u.scheme() == "https")
                .and_then(|u| extract_host(&u));
            if let Some(host) = host {
                *counts.entry(host).or_insert(0) += 1;
            }
        }
    }

    counts
}
