//! HTTP client and auxiliary probes
//!
//! This module handles the requests the crawl makes outside the renderer:
//! - Building the HTTP client with the configured user agent
//! - Fetching sitemap documents
//! - Probing ads.txt
//! - Probing well-known privacy-policy paths
//!
//! Every probe swallows transport errors and reports "feature absent" instead.

use crate::url::site_path;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Paths probed directly for a privacy policy
pub const PRIVACY_PATHS: [&str; 3] = ["/privacy", "/privacy-policy", "/policies/privacy"];

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent string sent with every request
/// * `timeout` - Total request timeout
///
/// # Example
///
/// ```no_run
/// use adsweep::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("AdSweep/1.0", Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a document body, returning None on transport errors or status >= 400
pub async fn fetch_text(client: &Client, url: &str) -> Option<String> {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("GET {} failed: {}", url, e);
            return None;
        }
    };

    if response.status().as_u16() >= 400 {
        tracing::debug!("GET {} returned {}", url, response.status());
        return None;
    }

    match response.text().await {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::debug!("Failed to read body of {}: {}", url, e);
            None
        }
    }
}

/// Fetches `/ads.txt` from the site root
///
/// # Returns
///
/// `(http_status, non_comment_line_count)`; `(0, 0)` on transport failure
pub async fn fetch_ads_txt(client: &Client, site: &str) -> (u16, usize) {
    let Some(ads_url) = site_path(site, "/ads.txt") else {
        return (0, 0);
    };

    let response = match client.get(&ads_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("ads.txt probe failed for {}: {}", ads_url, e);
            return (0, 0);
        }
    };

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    (status, count_ads_txt_lines(&body))
}

/// Counts ads.txt records, ignoring blank lines and `#` comments
pub fn count_ads_txt_lines(body: &str) -> usize {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .count()
}

/// Probes the well-known privacy-policy paths
///
/// Returns true as soon as one path answers with a status below 400.
pub async fn probe_privacy_paths(client: &Client, site: &str) -> bool {
    for path in PRIVACY_PATHS {
        let Some(url) = site_path(site, path) else {
            continue;
        };

        match client.get(&url).send().await {
            Ok(response) if response.status().as_u16() < 400 => {
                tracing::debug!("Privacy policy found at {}", url);
                return true;
            }
            Ok(response) => {
                tracing::debug!("Privacy probe {} returned {}", url, response.status());
            }
            Err(e) => {
                tracing::debug!("Privacy probe {} failed: {}", url, e);
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client("TestAuditor/1.0", Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_count_ads_txt_lines() {
        assert_eq!(count_ads_txt_lines("# comment\nline1\nline2\n"), 2);
        assert_eq!(count_ads_txt_lines(""), 0);
        assert_eq!(count_ads_txt_lines("# only\n\n   \n  # indented comment\n"), 0);
        assert_eq!(
            count_ads_txt_lines("google.com, pub-1, DIRECT, f08c47fec0942fa0\r\n\r\n"),
            1
        );
    }

    // Probes against live responses are covered by the wiremock integration tests
}
