//! Static HTML report
//!
//! A single self-contained page with two tabs (overview and program policy),
//! a risk gauge, the summary tables, duplicate clusters and one card per page
//! that has findings. Cards are ordered by their worst severity.

use crate::model::{Finding, FindingCategory, FindingsReport, PageResult, SeveritySummary};
use crate::output::OutputResult;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const HTML_FILE_NAME: &str = "report.html";

const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8" />
  <title>AdSweep Report</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 20px; }
    .tabs { display: flex; gap: 8px; margin-bottom: 16px; }
    .tab-button { padding: 8px 12px; border: 1px solid #ccc; cursor: pointer; }
    .tab-button.active { background: #f0f0f0; font-weight: bold; }
    .tab-content { display: none; }
    .tab-content.active { display: block; }
    .card { border: 1px solid #ddd; padding: 16px; margin-bottom: 16px; }
    .screenshot { width: 240px; border: 1px solid #ccc; }
    .findings { margin-top: 8px; }
    .risk-gauge { margin: 16px 0; }
    .risk-bar { background: #eee; height: 16px; border-radius: 8px; overflow: hidden; }
    .risk-fill { background: #d9534f; height: 100%; }
  </style>
</head>
<body>
  <h1>AdSweep Findings Report</h1>
  <p>Site: {site} &middot; Generated: {generated_at}</p>
  <div class="tabs">
    <button class="tab-button active" data-tab="overview">Overview</button>
    <button class="tab-button" data-tab="program-policy">Program Policy Violations</button>
  </div>
  <div id="overview" class="tab-content active">
    <div>
      <label>Severity filter:</label>
      <select id="severity-filter">
        <option value="all">All</option>
        <option value="critical">Critical</option>
        <option value="high">High</option>
        <option value="medium">Medium</option>
        <option value="low">Low</option>
      </select>
      <label>Detector filter:</label>
      <input id="detector-filter" placeholder="detector name" />
    </div>
    <div class="risk-gauge">
      <strong>Likely Account Risk:</strong> {risk_score} ({risk_label})
      <div class="risk-bar"><div class="risk-fill" style="width: {risk_score}%"></div></div>
    </div>
    <h2>Summary</h2>
    <table>
      <tr><th>Detector</th><th>Counts</th></tr>
      {summary_rows}
    </table>
    <h2>Site Findings</h2>
    <ul class="findings">{site_findings}</ul>
    <h2>Duplicate Clusters</h2>
    <ul>
      {duplicates}
    </ul>
    <h2>Pages</h2>
    {page_cards}
  </div>
  <div id="program-policy" class="tab-content">
    <h2>Program Policy Summary</h2>
    <table>
      <tr><th>Detector</th><th>Counts</th></tr>
      {program_policy_rows}
    </table>
    <h2>Program Policy Findings</h2>
    {program_policy_cards}
  </div>
  <script>
    const tabs = Array.from(document.querySelectorAll('.tab-button'));
    const tabContents = Array.from(document.querySelectorAll('.tab-content'));
    tabs.forEach((tab) => {
      tab.addEventListener('click', () => {
        tabs.forEach((btn) => btn.classList.remove('active'));
        tab.classList.add('active');
        tabContents.forEach((content) => {
          content.classList.toggle('active', content.id === tab.dataset.tab);
        });
      });
    });
    const severityFilter = document.getElementById('severity-filter');
    const detectorFilter = document.getElementById('detector-filter');
    const cards = Array.from(document.querySelectorAll('#overview .card'));
    const applyFilters = () => {
      const severity = severityFilter.value;
      const detector = detectorFilter.value.trim().toLowerCase();
      cards.forEach((card) => {
        const severities = card.dataset.severities.split(',');
        const detectors = card.dataset.detectors.split(',');
        const severityMatch = severity === 'all' || severities.includes(severity);
        const detectorMatch = !detector || detectors.some((d) => d.includes(detector));
        card.style.display = severityMatch && detectorMatch ? 'block' : 'none';
      });
    };
    severityFilter.addEventListener('change', applyFilters);
    detectorFilter.addEventListener('input', applyFilters);
  </script>
</body>
</html>
"#;

/// Escapes text for use in HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders the full report document
pub fn render_html(report: &FindingsReport) -> String {
    let mut pages: Vec<&PageResult> = report.pages.iter().collect();
    pages.sort_by_key(|page| Reverse(page.worst_severity()));

    let page_cards = pages
        .iter()
        .filter_map(|page| render_page_card(page, None))
        .collect::<Vec<_>>()
        .join("\n");
    let program_policy_cards = pages
        .iter()
        .filter_map(|page| render_page_card(page, Some(FindingCategory::ProgramPolicy)))
        .collect::<Vec<_>>()
        .join("\n");

    let duplicates = report
        .duplicates
        .iter()
        .map(|cluster| {
            format!(
                "<li>{} (sim {:.3})</li>",
                escape_html(&cluster.urls.join(", ")),
                cluster.similarity
            )
        })
        .collect::<Vec<_>>()
        .join("\n      ");

    let mut site_findings: Vec<&Finding> = report.site_findings.iter().collect();
    site_findings.sort_by_key(|f| Reverse(f.severity));
    let site_findings = if site_findings.is_empty() {
        "<li>None</li>".to_string()
    } else {
        site_findings.into_iter().map(render_finding).collect()
    };

    let risk_score = report.account_risk.score.min(100).to_string();

    TEMPLATE
        .replace("{site}", &escape_html(&report.site))
        .replace("{generated_at}", &escape_html(&report.generated_at))
        .replace("{risk_score}", &risk_score)
        .replace("{risk_label}", &escape_html(&report.account_risk.label))
        .replace("{summary_rows}", &render_summary_rows(&report.summary))
        .replace(
            "{program_policy_rows}",
            &render_summary_rows(&report.program_policy_summary),
        )
        .replace("{site_findings}", &site_findings)
        .replace("{duplicates}", &duplicates)
        .replace("{page_cards}", &page_cards)
        .replace("{program_policy_cards}", &program_policy_cards)
}

/// Writes `<out_dir>/report.html`, creating `out_dir` if needed
pub fn write_html(report: &FindingsReport, out_dir: &Path) -> OutputResult<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(HTML_FILE_NAME);
    std::fs::write(&path, render_html(report))?;
    Ok(path)
}

fn render_summary_rows(summary: &SeveritySummary) -> String {
    summary
        .iter()
        .map(|(detector, counts)| {
            let counts = counts
                .iter()
                .map(|(severity, count)| format!("{}: {}", severity, count))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(detector),
                escape_html(&counts)
            )
        })
        .collect::<Vec<_>>()
        .join("\n      ")
}

/// Renders one page card, or nothing when no finding passes `category`
fn render_page_card(page: &PageResult, category: Option<FindingCategory>) -> Option<String> {
    let mut findings: Vec<&Finding> = page
        .findings
        .iter()
        .filter(|f| category.map_or(true, |c| f.category == c))
        .collect();
    if findings.is_empty() {
        return None;
    }
    findings.sort_by_key(|f| Reverse(f.severity));

    let detectors: BTreeSet<&str> = findings.iter().map(|f| f.detector.as_str()).collect();
    let severities: BTreeSet<&str> = findings.iter().map(|f| f.severity.as_str()).collect();
    let screenshot = page
        .screenshot_path
        .as_deref()
        .map(|path| format!("<img class=\"screenshot\" src=\"{}\" />", escape_html(path)))
        .unwrap_or_default();
    let items: String = findings.into_iter().map(render_finding).collect();

    Some(format!(
        r#"  <div class="card" data-detectors="{detectors}" data-severities="{severities}">
    <h3>{url}</h3>
    <p>Status: {status} Final URL: {final_url}</p>
    {screenshot}
    <ul class="findings">{items}</ul>
  </div>"#,
        detectors = escape_html(&detectors.into_iter().collect::<Vec<_>>().join(",")),
        severities = severities.into_iter().collect::<Vec<_>>().join(","),
        url = escape_html(&page.url),
        status = page.status,
        final_url = escape_html(&page.final_url),
    ))
}

fn render_finding(finding: &Finding) -> String {
    let list = |items: &[String]| -> String {
        if items.is_empty() {
            "<li>None</li>".to_string()
        } else {
            items
                .iter()
                .map(|item| format!("<li>{}</li>", escape_html(item)))
                .collect()
        }
    };

    format!(
        "<li><strong>{}</strong> ({}): {}\
         <div><em>Confidence:</em> {:.2}</div>\
         <div><em>Remediation:</em><ul>{}</ul></div>\
         <div><em>Policy references:</em><ul>{}</ul></div></li>",
        escape_html(&finding.detector),
        finding.severity,
        escape_html(&finding.message),
        finding.confidence,
        list(&finding.remediation),
        list(&finding.policy_links),
    )
}
