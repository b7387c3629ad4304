//! Integration tests for the audit pipeline
//!
//! These tests use wiremock to create mock HTTP servers and run full audits
//! end-to-end through the bundled HTTP renderer.

use adsweep::config::CrawlConfig;
use adsweep::crawler::{
    audit_site, build_http_client, expand_sitemaps, fetch_ads_txt, parse_sitemap,
};
use adsweep::render::HttpRenderer;
use adsweep::storage::{SkippedPageStore, SqliteStorage};
use adsweep::FindingsReport;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration for the mock site writing into `out_dir`
fn create_test_config(base_url: &str, out_dir: &Path) -> CrawlConfig {
    let mut config = CrawlConfig::for_site(format!("{}/", base_url));
    config.out_dir = out_dir.to_path_buf();
    config.concurrency = 3;
    config.rate_limit_ms = 5;
    config.render_timeout_ms = 5_000;
    config.user_agent = "AdSweep/1.0".to_string();
    config
}

async fn run_audit(config: CrawlConfig) -> FindingsReport {
    let client = build_http_client(&config.user_agent, Duration::from_secs(5))
        .expect("Failed to build HTTP client");
    let renderer = Arc::new(HttpRenderer::new(client, config.concurrency));
    audit_site(config, renderer).await.expect("Audit failed")
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(format!(
            "<html lang=\"en\"><head><title>t</title></head><body>{}</body></html>",
            body
        ))
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_page(body))
        .mount(server)
        .await;
}

async fn mount_never_requested(server: &MockServer, page_path: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html_page("should not be requested"))
        .expect(0)
        .mount(server)
        .await;
}

fn visited_paths(report: &FindingsReport) -> HashSet<String> {
    report
        .pages
        .iter()
        .map(|p| url::Url::parse(&p.url).expect("page url").path().to_string())
        .collect()
}

fn site_detectors(report: &FindingsReport) -> Vec<&str> {
    report
        .site_findings
        .iter()
        .map(|f| f.detector.as_str())
        .collect()
}

#[test]
fn test_parse_urlset_sitemap() {
    let xml = "<urlset><url><loc>https://example.com/a</loc></url>\
               <url><loc>https://example.com/b</loc></url></urlset>";
    assert_eq!(
        parse_sitemap(xml),
        vec!["https://example.com/a", "https://example.com/b"]
    );
}

#[tokio::test]
async fn test_sitemap_index_expands_one_level_without_cycles() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<sitemapindex><sitemap><loc>{base}/s1.xml</loc></sitemap></sitemapindex>"
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/s1.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset>\
             <url><loc>{base}/a</loc></url>\
             <url><loc>{base}/sitemap.xml</loc></url>\
             <url><loc>{base}/s2.xml</loc></url>\
             <url><loc>{base}/b</loc></url>\
             </urlset>"
        )))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/s2.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset><url><loc>{base}/c</loc></url></urlset>"
        )))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = build_http_client("AdSweep/1.0", Duration::from_secs(5)).unwrap();
    let pages = expand_sitemaps(&client, &format!("{}/", base)).await;

    assert_eq!(pages, vec![format!("{base}/a"), format!("{base}/b")]);
}

#[tokio::test]
async fn test_ads_txt_line_count() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ads.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# comment\nline1\nline2\n"))
        .mount(&mock_server)
        .await;

    let client = build_http_client("AdSweep/1.0", Duration::from_secs(5)).unwrap();
    let result = fetch_ads_txt(&client, &format!("{}/", mock_server.uri())).await;

    assert_eq!(result, (200, 2));
}

#[tokio::test]
async fn test_max_pages_one_with_missing_seed() {
    let mock_server = MockServer::start().await;
    let out = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), out.path());
    config.max_pages = 1;

    let report = run_audit(config).await;

    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[0].status, 404);
    assert!(report.account_risk.score <= 100);
}

#[tokio::test]
async fn test_link_following_respects_depth() {
    let mock_server = MockServer::start().await;
    let out = tempfile::tempdir().unwrap();

    mount_page(&mock_server, "/", r#"<a href="/l1">one</a>"#).await;
    mount_page(&mock_server, "/l1", r#"<a href="/l2">two</a>"#).await;
    mount_never_requested(&mock_server, "/l2").await;

    let mut config = create_test_config(&mock_server.uri(), out.path());
    config.max_depth = 1;

    let report = run_audit(config).await;

    let paths = visited_paths(&report);
    assert_eq!(paths, HashSet::from(["/".to_string(), "/l1".to_string()]));
    let l1 = report.pages.iter().find(|p| p.url.ends_with("/l1")).unwrap();
    assert_eq!(l1.depth, 1);
}

#[tokio::test]
async fn test_sitemap_mode_does_not_follow_links() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();
    let out = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset><url><loc>{base}/a</loc></url><url><loc>{base}/b</loc></url></urlset>"
        )))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/a", r#"<a href="/c">c</a>"#).await;
    mount_page(&mock_server, "/b", r#"<a href="/c">c</a>"#).await;
    mount_never_requested(&mock_server, "/c").await;

    let report = run_audit(create_test_config(&base, out.path())).await;

    let paths = visited_paths(&report);
    assert_eq!(paths, HashSet::from(["/a".to_string(), "/b".to_string()]));
}

#[tokio::test]
async fn test_robots_disallow_is_honoured() {
    let mock_server = MockServer::start().await;
    let out = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/",
        r#"<a href="/private">p</a><a href="/public">q</a>"#,
    )
    .await;
    mount_page(&mock_server, "/public", "public page").await;
    mount_never_requested(&mock_server, "/private").await;

    let report = run_audit(create_test_config(&mock_server.uri(), out.path())).await;

    let paths = visited_paths(&report);
    assert!(paths.contains("/public"));
    assert!(!paths.contains("/private"));
}

#[tokio::test]
async fn test_robots_ignored_when_disabled() {
    let mock_server = MockServer::start().await;
    let out = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", "home").await;

    let mut config = create_test_config(&mock_server.uri(), out.path());
    config.respect_robots = false;

    let report = run_audit(config).await;
    assert_eq!(report.pages.len(), 1);
}

#[tokio::test]
async fn test_noindex_pages_are_stored_not_analyzed() {
    let mock_server = MockServer::start().await;
    let out = tempfile::tempdir().unwrap();

    mount_page(&mock_server, "/", r#"<a href="/hidden">hidden</a>"#).await;
    mount_page(
        &mock_server,
        "/hidden",
        r#"<meta name="robots" content="noindex"><p>short</p>"#,
    )
    .await;

    let config = create_test_config(&mock_server.uri(), out.path());
    let db_path = config.database_path();
    let report = run_audit(config).await;

    let hidden_url = format!("{}/hidden", mock_server.uri());
    let hidden = report.pages.iter().find(|p| p.url == hidden_url).unwrap();
    assert_eq!(hidden.skipped_reason.as_deref(), Some("noindex"));
    assert!(hidden.findings.is_empty());

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_pages().unwrap(), 1);
    let stored = storage.load_page(&hidden_url).unwrap().unwrap();
    assert_eq!(stored.skipped_reason.as_deref(), Some("noindex"));
}

#[tokio::test]
async fn test_reports_written_with_site_findings() {
    let mock_server = MockServer::start().await;
    let out = tempfile::tempdir().unwrap();
    let out_dir = out.path().join("report");

    mount_page(&mock_server, "/", "<p>Welcome to a very small page.</p>").await;

    let report = run_audit(create_test_config(&mock_server.uri(), &out_dir)).await;

    let detectors = site_detectors(&report);
    assert!(detectors.contains(&"missing_ads_txt"));
    assert!(detectors.contains(&"missing_privacy_policy"));
    assert_eq!(report.summary["missing_ads_txt"]["medium"], 1);

    let json = std::fs::read_to_string(out_dir.join("findings.json")).unwrap();
    let parsed: FindingsReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.pages.len(), report.pages.len());
    assert_eq!(parsed.account_risk, report.account_risk);

    let html = std::fs::read_to_string(out_dir.join("report.html")).unwrap();
    assert!(html.contains("Likely Account Risk"));
    assert!(html.contains("missing_privacy_policy"));

    assert!(!out_dir.join("skipped.sqlite").exists());
}

#[tokio::test]
async fn test_site_probes_satisfied() {
    let mock_server = MockServer::start().await;
    let out = tempfile::tempdir().unwrap();

    mount_page(&mock_server, "/", "home").await;
    Mock::given(method("GET"))
        .and(path("/privacy"))
        .respond_with(html_page("privacy policy"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ads.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("google.com, pub-0000000000000000, DIRECT, f08c47fec0942fa0\n"),
        )
        .mount(&mock_server)
        .await;

    let report = run_audit(create_test_config(&mock_server.uri(), out.path())).await;

    let detectors = site_detectors(&report);
    assert!(!detectors.contains(&"missing_ads_txt"));
    assert!(!detectors.contains(&"missing_privacy_policy"));
}

#[tokio::test]
async fn test_privacy_link_found_during_crawl() {
    let mock_server = MockServer::start().await;
    let out = tempfile::tempdir().unwrap();

    mount_page(
        &mock_server,
        "/",
        r#"<footer><a href="/legal/data">Privacy Notice</a></footer>"#,
    )
    .await;
    mount_page(&mock_server, "/legal/data", "we respect your data").await;

    let report = run_audit(create_test_config(&mock_server.uri(), out.path())).await;

    assert!(!site_detectors(&report).contains(&"missing_privacy_policy"));
}

#[tokio::test]
async fn test_duplicate_pages_are_clustered() {
    let mock_server = MockServer::start().await;
    let out = tempfile::tempdir().unwrap();
    let article = "<main><p>The quick brown fox jumps over the lazy dog near the quiet \
                   river bank while the evening sun sets behind distant hills.</p></main>";

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/one">one</a><a href="/two">two</a><p>Index page with links only.</p>"#,
    )
    .await;
    mount_page(&mock_server, "/one", article).await;
    mount_page(&mock_server, "/two", article).await;

    let report = run_audit(create_test_config(&mock_server.uri(), out.path())).await;

    assert_eq!(report.duplicates.len(), 1);
    let cluster: HashSet<&str> = report.duplicates[0].urls.iter().map(String::as_str).collect();
    assert!(cluster.contains(format!("{}/one", mock_server.uri()).as_str()));
    assert!(cluster.contains(format!("{}/two", mock_server.uri()).as_str()));
    assert!(site_detectors(&report).contains(&"replicated_content"));
}
