//! Audit coordinator - end-to-end audit orchestration
//!
//! This module ties the crawl to the rest of the pipeline:
//! - Fetching robots.txt and expanding sitemaps
//! - Running the scheduler's worker pool
//! - Site-level probes (privacy policy, ads.txt)
//! - Duplicate clustering, summaries and risk scoring
//! - Writing the report artifacts and persisting skipped pages

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{fetch_ads_txt, probe_privacy_paths};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::{build_http_client, expand_sitemaps};
use crate::detect::{calculate_account_risk, cluster_pages, site};
use crate::model::{DuplicateCluster, Finding, FindingsReport, PageResult};
use crate::output::{summarize, write_html, write_json};
use crate::render::Renderer;
use crate::robots::{fetch_robots, RobotsPolicy};
use crate::storage::{open_storage, SkippedPageStore};
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Main audit coordinator structure
pub struct Coordinator {
    config: Arc<CrawlConfig>,
    client: Client,
    renderer: Arc<dyn Renderer>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - Validated crawl configuration
    /// * `renderer` - Render collaborator used for every page
    ///
    /// # Returns
    ///
    /// * `Err(AuditError::Http)` - The auxiliary HTTP client could not be built
    pub fn new(config: CrawlConfig, renderer: Arc<dyn Renderer>) -> crate::Result<Self> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_millis(config.render_timeout_ms),
        )?;
        Ok(Self::with_client(config, client, renderer))
    }

    /// Creates a coordinator around an existing HTTP client
    pub fn with_client(config: CrawlConfig, client: Client, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            config: Arc::new(config),
            client,
            renderer,
        }
    }

    /// Runs the audit
    ///
    /// 1. Fetch robots.txt (when respected) and expand sitemaps
    /// 2. Crawl with the worker pool
    /// 3. Probe privacy-policy paths unless the crawl already saw a privacy link
    /// 4. Probe ads.txt
    /// 5. Cluster near-duplicates over analyzed pages
    /// 6. Build the report, write `findings.json` and `report.html`
    /// 7. Persist skipped pages when enabled
    pub async fn run(&self) -> crate::Result<FindingsReport> {
        let config = &self.config;
        tracing::info!("Starting audit of {}", config.site);

        let robots = if config.respect_robots {
            fetch_robots(&self.client, &config.site).await
        } else {
            RobotsPolicy::allow_all()
        };

        let sitemap_urls = expand_sitemaps(&self.client, &config.site).await;

        let scheduler = Scheduler::new(Arc::clone(config), Arc::clone(&self.renderer), robots)?;
        let outcome = scheduler.run(sitemap_urls).await;

        let privacy_found = if outcome.privacy_found {
            true
        } else {
            probe_privacy_paths(&self.client, &config.site).await
        };
        let (ads_status, ads_lines) = fetch_ads_txt(&self.client, &config.site).await;

        let duplicates = cluster_pages(
            outcome.pages.iter().filter(|p| p.is_analyzable()),
            config.duplicate_threshold,
        );
        tracing::info!("Found {} near-duplicate clusters", duplicates.len());

        let mut site_findings = site::missing_ads_txt(ads_status, ads_lines);
        site_findings.extend(site::missing_privacy_policy(privacy_found));
        site_findings.extend(site::replicated_content(&duplicates));

        let report = build_report(&config.site, outcome.pages, duplicates, site_findings);

        let json_path = write_json(&report, &config.out_dir)?;
        let html_path = write_html(&report, &config.out_dir)?;
        tracing::info!(
            "Wrote {} and {}",
            json_path.display(),
            html_path.display()
        );

        if config.list_skipped {
            if let Err(e) = self.persist_skipped(&report) {
                tracing::warn!("Failed to store skipped pages: {}", e);
            }
        }

        Ok(report)
    }

    /// Writes every skipped page of `report` to the skipped-page store
    ///
    /// The database is only created when there is something to store.
    fn persist_skipped(&self, report: &FindingsReport) -> crate::Result<usize> {
        let skipped: Vec<&PageResult> = report.skipped_pages().collect();
        if skipped.is_empty() {
            return Ok(0);
        }

        let path = self.config.database_path();
        let mut storage = open_storage(&path)?;
        let stored = storage.save_pages(&skipped)?;
        tracing::info!("Stored {} skipped pages in {}", stored, path.display());
        Ok(stored)
    }
}

/// Assembles the terminal report
///
/// Summaries and the account risk cover both page findings and site findings.
pub fn build_report(
    site: &str,
    pages: Vec<PageResult>,
    duplicates: Vec<DuplicateCluster>,
    site_findings: Vec<Finding>,
) -> FindingsReport {
    let all_findings = || {
        pages
            .iter()
            .flat_map(|p| p.findings.iter())
            .chain(site_findings.iter())
    };
    let tables = summarize(all_findings());
    let account_risk = calculate_account_risk(all_findings());

    FindingsReport {
        site: site.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        summary: tables.general,
        program_policy_summary: tables.program_policy,
        account_risk,
        pages,
        duplicates,
        site_findings,
    }
}

/// Runs a complete audit of `config.site`
///
/// This is the main entry point for library users.
///
/// # Example
///
/// ```no_run
/// use adsweep::config::load_config;
/// use adsweep::crawler::{audit_site, build_http_client};
/// use adsweep::render::HttpRenderer;
/// use std::path::Path;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("adsweep.toml"))?;
/// let client = build_http_client(&config.user_agent, Duration::from_secs(30))?;
/// let renderer = Arc::new(HttpRenderer::new(client, config.concurrency));
/// let report = audit_site(config, renderer).await?;
/// println!("risk: {}", report.account_risk.score);
/// # Ok(())
/// # }
/// ```
pub async fn audit_site(
    config: CrawlConfig,
    renderer: Arc<dyn Renderer>,
) -> crate::Result<FindingsReport> {
    Coordinator::new(config, renderer)?.run().await
}
