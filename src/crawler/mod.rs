//! Crawler module for page discovery and the audit pipeline
//!
//! This module contains the core crawling logic, including:
//! - HTTP client construction and auxiliary probes
//! - HTML parsing and link extraction
//! - Sitemap expansion
//! - The frontier, per-host rate limiting and the worker pool
//! - Overall audit coordination

mod coordinator;
pub mod fetcher;
pub mod frontier;
pub mod parser;
pub mod rate_limit;
pub mod scheduler;
pub mod sitemap;

pub use coordinator::{audit_site, build_report, Coordinator};
pub use fetcher::{build_http_client, count_ads_txt_lines, fetch_ads_txt, probe_privacy_paths};
pub use parser::{extract_links, extract_visible_text};
pub use scheduler::{CrawlOutcome, Scheduler};
pub use sitemap::{expand_sitemaps, parse_sitemap};
