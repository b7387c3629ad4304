//! Robots.txt handling module
//!
//! This module fetches and parses the audited site's robots.txt. Any transport
//! failure or error status is treated as "no restriction".

mod parser;

pub use parser::RobotsPolicy;

use crate::url::site_path;
use reqwest::Client;

/// Fetches robots.txt for the site root
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `site` - The audited site root URL
///
/// # Returns
///
/// The parsed policy, or an allow-all policy if robots.txt is unavailable
pub async fn fetch_robots(client: &Client, site: &str) -> RobotsPolicy {
    let Some(robots_url) = site_path(site, "/robots.txt") else {
        return RobotsPolicy::allow_all();
    };

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt unavailable at {}: {}", robots_url, e);
            return RobotsPolicy::allow_all();
        }
    };

    if response.status().as_u16() >= 400 {
        tracing::debug!(
            "robots.txt returned {} at {}; no restrictions",
            response.status(),
            robots_url
        );
        return RobotsPolicy::allow_all();
    }

    match response.text().await {
        Ok(body) => RobotsPolicy::from_content(&body),
        Err(e) => {
            tracing::debug!("Failed to read robots.txt body: {}", e);
            RobotsPolicy::allow_all()
        }
    }
}
