//! Worker pool that drains the frontier
//!
//! This module handles:
//! - Admission of frontier items (dedup, page budget, URL filters, robots.txt)
//! - Per-host request spacing through the shared rate limiter
//! - Rendering pages and running the page-level detectors
//! - Re-seeding the frontier with discovered links in link-following mode
//!
//! All cross-worker state lives in one [`CrawlState`] behind a single lock.
//! Critical sections only touch maps, sets and lists; rendering and sleeping
//! happen outside the lock.

use crate::config::CrawlConfig;
use crate::crawler::frontier::{Frontier, FrontierItem, Job, PendingGuard};
use crate::crawler::parser::{
    extract_links, extract_visible_text, has_noindex_header, page_mentions_privacy,
};
use crate::crawler::rate_limit::RateLimiter;
use crate::detect::{run_page_detectors, PageContext};
use crate::model::{AdElement, PageResult};
use crate::render::{MobileFlags, RenderedPage, Renderer, Viewport};
use crate::robots::RobotsPolicy;
use crate::url::{canonicalize_url, host_key, UrlFilter};
use crate::ConfigError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::Instant;
use url::Url;

/// Skip reason recorded for pages that opt out of indexing
pub const NOINDEX: &str = "noindex";

/// Selector of the pseudo ad added for pages that load the AdSense client script
pub const GOOGLE_AD_CLIENT_SCRIPT: &str = "google_ad_client_script";

/// Progress is logged every this many stored pages
const PROGRESS_INTERVAL: usize = 10;

/// Mutable state shared by every worker
#[derive(Debug, Default)]
pub struct CrawlState {
    /// Canonical URLs admitted so far
    pub seen: HashSet<String>,

    /// Completed pages, in completion order
    pub pages: Vec<PageResult>,

    /// Last reserved request slot per host
    pub last_request: HashMap<String, Instant>,

    /// Whether any page linked to a privacy policy
    pub privacy_found: bool,

    /// Admitted pages that have not been stored yet
    in_flight: usize,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    fn budget_exhausted(&self, max_pages: usize) -> bool {
        self.pages.len() + self.in_flight >= max_pages
    }
}

/// What the worker pool hands back once the frontier is drained
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub pages: Vec<PageResult>,
    pub privacy_found: bool,
}

/// Bounded-concurrency crawl scheduler
///
/// Cheap to clone; every worker holds a clone.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

struct Inner {
    config: Arc<CrawlConfig>,
    renderer: Arc<dyn Renderer>,
    robots: RobotsPolicy,
    filter: UrlFilter,
    limiter: RateLimiter,
    /// Links are only followed within this host
    site_host: Option<String>,
}

/// Per-run handles shared by the workers
struct Run {
    state: Mutex<CrawlState>,
    frontier: Frontier,
    follow_links: bool,
    started: std::time::Instant,
}

/// The result of the admission critical section
enum Admission {
    Rejected(&'static str),
    Admitted { host: String, slot: Instant },
}

impl Scheduler {
    /// Creates a scheduler
    ///
    /// # Arguments
    ///
    /// * `config` - Validated crawl configuration
    /// * `renderer` - Render collaborator
    /// * `robots` - Robots policy for the site (allow-all when robots are not respected)
    ///
    /// # Returns
    ///
    /// * `Err(ConfigError)` - The include/exclude patterns do not compile
    pub fn new(
        config: Arc<CrawlConfig>,
        renderer: Arc<dyn Renderer>,
        robots: RobotsPolicy,
    ) -> Result<Self, ConfigError> {
        let filter = UrlFilter::from_config(&config)?;
        let limiter = RateLimiter::from_millis(config.rate_limit_ms);
        let site_host = host_key(&config.site);

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                renderer,
                robots,
                filter,
                limiter,
                site_host,
            }),
        })
    }

    /// Crawls until the frontier is drained
    ///
    /// With a non-empty `sitemap_urls` every sitemap URL is seeded at depth 0 and
    /// links are not followed. Otherwise the site root is seeded and links are
    /// followed up to the configured depth.
    pub async fn run(&self, sitemap_urls: Vec<String>) -> CrawlOutcome {
        let config = &self.inner.config;
        let follow_links = sitemap_urls.is_empty();
        let run = Arc::new(Run {
            state: Mutex::new(CrawlState::new()),
            frontier: Frontier::new(),
            follow_links,
            started: std::time::Instant::now(),
        });

        if follow_links {
            tracing::info!("No sitemap found, following links from {}", config.site);
            run.frontier.push(FrontierItem::new(config.site.clone(), 0));
        } else {
            tracing::info!("Seeding {} URLs from sitemaps", sitemap_urls.len());
            for url in sitemap_urls {
                run.frontier.push(FrontierItem::new(url, 0));
            }
        }

        let workers = config.concurrency.max(1);
        let mut pool = JoinSet::new();
        for id in 0..workers {
            let scheduler = self.clone();
            let run = Arc::clone(&run);
            pool.spawn(async move { scheduler.worker(id, run).await });
        }

        run.frontier.join().await;
        run.frontier.stop(workers);
        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Crawl worker failed: {}", e);
            }
        }

        let mut state = run.state.lock().await;
        tracing::info!(
            "Crawl finished: {} pages in {:?}",
            state.pages.len(),
            run.started.elapsed()
        );

        CrawlOutcome {
            pages: std::mem::take(&mut state.pages),
            privacy_found: state.privacy_found,
        }
    }

    async fn worker(self, id: usize, run: Arc<Run>) {
        tracing::trace!("Worker {} started", id);
        loop {
            match run.frontier.next().await {
                Job::Stop => break,
                Job::Visit(item) => {
                    let _done = PendingGuard::new(&run.frontier);
                    self.visit(item, &run).await;
                }
            }
        }
        tracing::trace!("Worker {} stopped", id);
    }

    /// Processes one frontier item end to end
    async fn visit(&self, item: FrontierItem, run: &Run) {
        let config = &self.inner.config;

        let canonical = match canonicalize_url(&item.url, config.ignore_querystrings) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("Dropping {}: {}", item.url, e);
                return;
            }
        };

        let (host, slot) = match self.admit(&canonical, run).await {
            Admission::Rejected(reason) => {
                tracing::debug!("Skipping {}: {}", canonical, reason);
                return;
            }
            Admission::Admitted { host, slot } => (host, slot),
        };

        self.inner.limiter.wait_until(&host, slot).await;

        let page = match self.inner.renderer.render(&canonical, Viewport::DESKTOP).await {
            Ok(rendered) => {
                self.analyze(&canonical, item.depth, rendered, &host, run)
                    .await
            }
            Err(e) => {
                tracing::warn!("Failed to render {}: {}", canonical, e);
                Visited {
                    page: PageResult::failed(&canonical, item.depth, e.to_string()),
                    privacy_link: false,
                    links: Vec::new(),
                }
            }
        };

        let follow = run.follow_links && item.depth < config.max_depth;
        let links = if follow { page.links } else { Vec::new() };

        let fresh_links = {
            let mut state = run.state.lock().await;
            state.in_flight = state.in_flight.saturating_sub(1);
            state.privacy_found |= page.privacy_link;
            state.pages.push(page.page);

            let done = state.pages.len();
            if done % PROGRESS_INTERVAL == 0 {
                let elapsed = run.started.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages crawled, {:.2} pages/sec",
                    done,
                    done as f64 / elapsed.max(f64::EPSILON)
                );
            }

            let mut batch = HashSet::new();
            links
                .into_iter()
                .filter(|link| !state.seen.contains(link) && batch.insert(link.clone()))
                .collect::<Vec<_>>()
        };

        for link in fresh_links {
            run.frontier.push(FrontierItem::new(link, item.depth + 1));
        }
    }

    /// Dedup, budget, filter and robots checks, then a rate-limit reservation
    ///
    /// Filters and robots rules are evaluated before taking the lock; the URL is
    /// still marked seen before a rejection so it is never considered again.
    async fn admit(&self, canonical: &str, run: &Run) -> Admission {
        let inner = &self.inner;
        let filtered = !inner.filter.allows(canonical);
        let disallowed = !inner.robots.can_fetch(&inner.config.user_agent, canonical);
        let host = host_key(canonical).unwrap_or_else(|| canonical.to_string());

        let mut state = run.state.lock().await;
        if state.seen.contains(canonical) {
            return Admission::Rejected("already seen");
        }
        if state.budget_exhausted(inner.config.max_pages) {
            return Admission::Rejected("page budget reached");
        }
        state.seen.insert(canonical.to_string());

        if filtered {
            return Admission::Rejected("excluded by URL filter");
        }
        if disallowed {
            return Admission::Rejected("disallowed by robots.txt");
        }

        state.in_flight += 1;
        let slot = inner
            .limiter
            .reserve(&mut state.last_request, &host, Instant::now());
        Admission::Admitted { host, slot }
    }

    /// Builds the page result and runs the detectors on a rendered page
    ///
    /// The mobile-flag collection is a second request to `host` and takes its own
    /// rate-limit slot.
    async fn analyze(
        &self,
        canonical: &str,
        depth: u32,
        rendered: RenderedPage,
        host: &str,
        run: &Run,
    ) -> Visited {
        let config = &self.inner.config;
        let RenderedPage {
            final_url,
            status,
            html,
            visible_text,
            request_counts,
            ad_elements,
            extras,
        } = rendered;

        let mut text = extract_visible_text(&html);
        if text.is_empty() {
            text = visible_text;
        }

        let mut page = PageResult::new(canonical, depth);
        page.final_url = final_url;
        page.status = status;
        page.html = html;
        page.text = text;
        page.network_summary = request_counts;
        page.ad_elements = ad_elements;

        if extras.has_google_ad_client {
            page.ad_elements
                .push(AdElement::new(GOOGLE_AD_CLIENT_SCRIPT, 0.0, 0.0, 0.0, 0.0));
        }

        if extras.has_noindex_meta || has_noindex_header(&extras.headers) {
            page.skipped_reason = Some(NOINDEX.to_string());
        }

        let mut privacy_link = false;
        if !page.is_skipped() {
            let limiter = &self.inner.limiter;
            let slot = {
                let mut state = run.state.lock().await;
                limiter.reserve(&mut state.last_request, host, Instant::now())
            };
            limiter.wait_until(host, slot).await;

            let mobile_flags = match self
                .inner
                .renderer
                .collect_mobile_flags(canonical, Viewport::MOBILE)
                .await
            {
                Ok(flags) => flags,
                Err(e) => {
                    tracing::debug!("Mobile checks failed for {}: {}", canonical, e);
                    MobileFlags::default()
                }
            };

            let findings = run_page_detectors(
                &PageContext::new(&page, &extras, mobile_flags),
                config.policy_checks,
            );
            page.findings.extend(findings);
            privacy_link = page_mentions_privacy(&page.html);
        } else {
            tracing::debug!("Skipping analysis of {}: noindex", canonical);
        }

        let links = self.same_site_links(&page);
        Visited {
            page,
            privacy_link,
            links,
        }
    }

    /// Canonical same-site links found on a rendered page
    fn same_site_links(&self, page: &PageResult) -> Vec<String> {
        let config = &self.inner.config;
        let Ok(base) = Url::parse(&page.final_url).or_else(|_| Url::parse(&page.url)) else {
            return Vec::new();
        };

        extract_links(&page.html, &base)
            .into_iter()
            .filter_map(|link| canonicalize_url(&link, config.ignore_querystrings).ok())
            .filter(|link| host_key(link) == self.inner.site_host)
            .collect()
    }
}

/// A processed page plus what it contributes to the shared state
struct Visited {
    page: PageResult,
    privacy_link: bool,
    links: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderError, RenderExtras};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Serves canned pages; unknown URLs fail to render
    #[derive(Default)]
    struct ScriptedRenderer {
        pages: HashMap<String, RenderedPage>,
        renders: StdMutex<Vec<(String, std::time::Instant)>>,
        mobile_checks: StdMutex<Vec<(String, std::time::Instant)>>,
    }

    impl ScriptedRenderer {
        fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                RenderedPage {
                    final_url: url.to_string(),
                    status: 200,
                    html: format!("<html lang=\"en\"><body><main>{}</main></body></html>", body),
                    ..Default::default()
                },
            );
            self
        }

        fn with_rendered(mut self, url: &str, page: RenderedPage) -> Self {
            self.pages.insert(url.to_string(), page);
            self
        }

        fn rendered_urls(&self) -> Vec<String> {
            let mut urls: Vec<String> = self
                .renders
                .lock()
                .unwrap()
                .iter()
                .map(|(url, _)| url.clone())
                .collect();
            urls.sort();
            urls
        }
    }

    #[async_trait]
    impl Renderer for ScriptedRenderer {
        async fn render(&self, url: &str, _viewport: Viewport) -> Result<RenderedPage, RenderError> {
            self.renders
                .lock()
                .unwrap()
                .push((url.to_string(), std::time::Instant::now()));
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| RenderError::Transport(format!("connection refused: {}", url)))
        }

        async fn collect_mobile_flags(
            &self,
            url: &str,
            _viewport: Viewport,
        ) -> Result<MobileFlags, RenderError> {
            self.mobile_checks
                .lock()
                .unwrap()
                .push((url.to_string(), std::time::Instant::now()));
            Ok(MobileFlags::default())
        }
    }

    fn config() -> CrawlConfig {
        let mut config = CrawlConfig::for_site("https://example.com/");
        config.rate_limit_ms = 0;
        config.concurrency = 3;
        config
    }

    async fn crawl(
        config: CrawlConfig,
        renderer: Arc<ScriptedRenderer>,
        robots: RobotsPolicy,
        sitemap: &[&str],
    ) -> CrawlOutcome {
        let scheduler = Scheduler::new(Arc::new(config), renderer, robots).unwrap();
        let sitemap = sitemap.iter().map(|s| s.to_string()).collect();
        tokio::time::timeout(Duration::from_secs(10), scheduler.run(sitemap))
            .await
            .expect("crawl did not terminate")
    }

    fn urls(outcome: &CrawlOutcome) -> Vec<String> {
        let mut urls: Vec<String> = outcome.pages.iter().map(|p| p.url.clone()).collect();
        urls.sort();
        urls
    }

    #[tokio::test]
    async fn test_duplicate_urls_processed_once() {
        let renderer = Arc::new(ScriptedRenderer::default().with_page("https://example.com/a", "A"));
        let outcome = crawl(
            config(),
            renderer.clone(),
            RobotsPolicy::allow_all(),
            &[
                "https://example.com/a",
                "https://example.com/a#top",
                "https://example.com/a",
            ],
        )
        .await;

        assert_eq!(urls(&outcome), vec!["https://example.com/a"]);
        assert_eq!(renderer.rendered_urls(), vec!["https://example.com/a"]);
    }

    #[tokio::test]
    async fn test_page_budget_never_exceeded() {
        let mut renderer = ScriptedRenderer::default();
        let mut sitemap = Vec::new();
        for i in 0..8 {
            let url = format!("https://example.com/p{}", i);
            renderer = renderer.with_page(&url, "page");
            sitemap.push(url);
        }
        let sitemap: Vec<&str> = sitemap.iter().map(String::as_str).collect();

        let mut config = config();
        config.max_pages = 3;
        config.concurrency = 4;
        let renderer = Arc::new(renderer);
        let outcome = crawl(config, renderer.clone(), RobotsPolicy::allow_all(), &sitemap).await;

        assert_eq!(outcome.pages.len(), 3);
        assert_eq!(renderer.rendered_urls().len(), 3);
    }

    #[tokio::test]
    async fn test_link_following_respects_depth() {
        let renderer = Arc::new(
            ScriptedRenderer::default()
                .with_page(
                    "https://example.com/",
                    r#"<a href="/a">A</a> <a href="https://other.example/x">elsewhere</a>"#,
                )
                .with_page("https://example.com/a", r#"<a href="/b">B</a>"#)
                .with_page("https://example.com/b", "leaf"),
        );

        let mut config = config();
        config.max_depth = 1;
        let outcome = crawl(config, renderer.clone(), RobotsPolicy::allow_all(), &[]).await;

        assert_eq!(
            urls(&outcome),
            vec!["https://example.com/", "https://example.com/a"]
        );
        let depth_of_a = outcome
            .pages
            .iter()
            .find(|p| p.url == "https://example.com/a")
            .map(|p| p.depth);
        assert_eq!(depth_of_a, Some(1));
    }

    #[tokio::test]
    async fn test_sitemap_mode_does_not_follow_links() {
        let renderer = Arc::new(
            ScriptedRenderer::default()
                .with_page("https://example.com/a", r#"<a href="/b">B</a>"#)
                .with_page("https://example.com/b", "B"),
        );
        let outcome = crawl(
            config(),
            renderer,
            RobotsPolicy::allow_all(),
            &["https://example.com/a"],
        )
        .await;

        assert_eq!(urls(&outcome), vec!["https://example.com/a"]);
    }

    #[tokio::test]
    async fn test_robots_and_filters_reject_silently() {
        let renderer = Arc::new(
            ScriptedRenderer::default()
                .with_page("https://example.com/public", "ok")
                .with_page("https://example.com/private/x", "secret")
                .with_page("https://example.com/tag/news", "tags"),
        );
        let robots = RobotsPolicy::from_content("User-agent: *\nDisallow: /private\n");

        let mut config = config();
        config.exclude_regex = Some("/tag/".to_string());
        let outcome = crawl(
            config,
            renderer.clone(),
            robots,
            &[
                "https://example.com/public",
                "https://example.com/private/x",
                "https://example.com/tag/news",
            ],
        )
        .await;

        assert_eq!(urls(&outcome), vec!["https://example.com/public"]);
        assert_eq!(renderer.rendered_urls(), vec!["https://example.com/public"]);
    }

    #[tokio::test]
    async fn test_rejected_urls_do_not_consume_budget() {
        let renderer = Arc::new(
            ScriptedRenderer::default()
                .with_page("https://example.com/skip", "x")
                .with_page("https://example.com/keep", "y"),
        );
        let mut config = config();
        config.max_pages = 1;
        config.concurrency = 1;
        config.include_regex = Some("/keep$".to_string());

        let outcome = crawl(
            config,
            renderer,
            RobotsPolicy::allow_all(),
            &["https://example.com/skip", "https://example.com/keep"],
        )
        .await;
        assert_eq!(urls(&outcome), vec!["https://example.com/keep"]);
    }

    #[tokio::test]
    async fn test_render_failure_is_recorded() {
        let renderer = Arc::new(ScriptedRenderer::default());
        let outcome = crawl(config(), renderer, RobotsPolicy::allow_all(), &[]).await;

        assert_eq!(outcome.pages.len(), 1);
        let page = &outcome.pages[0];
        assert_eq!(page.status, 0);
        assert!(page.fetch_error.is_some());
        assert!(page.findings.is_empty());
    }

    #[tokio::test]
    async fn test_noindex_pages_are_stored_but_not_analyzed() {
        let mut headers = std::collections::BTreeMap::new();
        headers.insert("x-robots-tag".to_string(), "noindex, nofollow".to_string());
        let renderer = Arc::new(
            ScriptedRenderer::default()
                .with_rendered(
                    "https://example.com/hidden",
                    RenderedPage {
                        final_url: "https://example.com/hidden".to_string(),
                        status: 200,
                        html: "<body>short</body>".to_string(),
                        extras: RenderExtras {
                            headers,
                            ..Default::default()
                        },
                        ..Default::default()
                    },
                )
                .with_page("https://example.com/shown", "short"),
        );

        let outcome = crawl(
            config(),
            renderer.clone(),
            RobotsPolicy::allow_all(),
            &["https://example.com/hidden", "https://example.com/shown"],
        )
        .await;

        let hidden = outcome
            .pages
            .iter()
            .find(|p| p.url.ends_with("/hidden"))
            .unwrap();
        assert_eq!(hidden.skipped_reason.as_deref(), Some(NOINDEX));
        assert!(hidden.findings.is_empty());

        let shown = outcome
            .pages
            .iter()
            .find(|p| p.url.ends_with("/shown"))
            .unwrap();
        assert!(shown.findings.iter().any(|f| f.detector == "thin_content"));

        let checks: Vec<String> = renderer
            .mobile_checks
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect();
        assert_eq!(checks, vec!["https://example.com/shown"]);
    }

    #[tokio::test]
    async fn test_privacy_link_and_ad_client() {
        let renderer = Arc::new(ScriptedRenderer::default().with_rendered(
            "https://example.com/",
            RenderedPage {
                final_url: "https://example.com/".to_string(),
                status: 200,
                html: r#"<body><main>Hello</main><footer><a href="/p">Privacy Policy</a></footer></body>"#
                    .to_string(),
                extras: RenderExtras {
                    has_google_ad_client: true,
                    ..Default::default()
                },
                ..Default::default()
            },
        ));

        let mut config = config();
        config.max_depth = 0;
        let outcome = crawl(config, renderer, RobotsPolicy::allow_all(), &[]).await;

        assert!(outcome.privacy_found);
        let ads = &outcome.pages[0].ad_elements;
        assert_eq!(ads.len(), 1);
        assert_eq!(ads[0].selector, GOOGLE_AD_CLIENT_SCRIPT);
        assert_eq!(ads[0].area(), 0.0);
    }

    #[tokio::test]
    async fn test_same_host_requests_are_spaced() {
        let mut renderer = ScriptedRenderer::default();
        let sitemap = ["https://example.com/1", "https://example.com/2", "https://example.com/3"];
        for url in sitemap {
            renderer = renderer.with_page(url, "x");
        }
        let renderer = Arc::new(renderer);

        let mut config = config();
        config.rate_limit_ms = 60;
        let started = std::time::Instant::now();
        crawl(config, renderer.clone(), RobotsPolicy::allow_all(), &sitemap).await;

        let last = renderer
            .renders
            .lock()
            .unwrap()
            .iter()
            .map(|(_, at)| *at)
            .max()
            .unwrap();
        assert!(last.duration_since(started) >= Duration::from_millis(120));
    }

    #[tokio::test]
    async fn test_mobile_check_takes_its_own_slot() {
        let renderer = Arc::new(ScriptedRenderer::default().with_page("https://example.com/a", "A"));
        let mut config = config();
        config.rate_limit_ms = 80;

        crawl(
            config,
            renderer.clone(),
            RobotsPolicy::allow_all(),
            &["https://example.com/a"],
        )
        .await;

        let rendered_at = renderer.renders.lock().unwrap()[0].1;
        let checked_at = renderer.mobile_checks.lock().unwrap()[0].1;
        assert!(checked_at.duration_since(rendered_at) >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_distinct_hosts_are_not_delayed() {
        let renderer = Arc::new(
            ScriptedRenderer::default()
                .with_page("https://a.example.com/", "a")
                .with_page("https://b.example.com/", "b"),
        );
        let mut config = config();
        config.rate_limit_ms = 2_000;

        let started = std::time::Instant::now();
        let outcome = crawl(
            config,
            renderer.clone(),
            RobotsPolicy::allow_all(),
            &["https://a.example.com/", "https://b.example.com/"],
        )
        .await;
        assert_eq!(outcome.pages.len(), 2);

        // Both first requests fire right away; only the mobile checks wait
        for (_, at) in renderer.renders.lock().unwrap().iter() {
            assert!(at.duration_since(started) < Duration::from_millis(1_000));
        }
    }
}
