//! Configuration module for AdSweep
//!
//! This module handles loading, parsing, and validating the crawl configuration.
//! A TOML file may supply any field; command-line flags override it; validation
//! runs once before the audit touches the network.
//!
//! # Example
//!
//! ```no_run
//! use adsweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("audit.toml")).unwrap();
//! println!("Auditing {} with {} workers", config.site, config.concurrency);
//! ```

mod parser;
mod types;
mod validation;

pub use types::CrawlConfig;

pub use parser::{compute_config_hash, load_config, load_config_with_hash, read_config};
pub use validation::validate;
