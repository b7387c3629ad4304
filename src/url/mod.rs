//! URL handling module for AdSweep
//!
//! This module provides canonicalization (the crawl's only notion of URL
//! identity), host extraction for rate limiting, and include/exclude filtering.

mod canonicalize;
mod domain;
mod filter;

pub use canonicalize::{canonicalize, canonicalize_url};
pub use domain::{extract_host, host_key, site_path};
pub use filter::UrlFilter;
