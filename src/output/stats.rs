//! End-of-run statistics
//!
//! Condenses a [`FindingsReport`] into the counts printed after an audit.

use crate::model::{FindingsReport, Severity};
use std::collections::BTreeMap;

/// Audit statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct AuditStatistics {
    /// Total number of pages visited (including failed and skipped ones)
    pub total_pages: usize,

    /// Pages left out of analysis (`noindex`)
    pub skipped_pages: usize,

    /// Pages whose render failed
    pub failed_pages: usize,

    /// Findings by severity, page and site findings combined
    pub findings_by_severity: BTreeMap<Severity, usize>,

    /// Number of near-duplicate clusters
    pub duplicate_clusters: usize,

    pub risk_score: u32,
    pub risk_label: String,
}

impl AuditStatistics {
    pub fn from_report(report: &FindingsReport) -> Self {
        let mut findings_by_severity = BTreeMap::new();
        for finding in report.all_findings() {
            *findings_by_severity.entry(finding.severity).or_insert(0) += 1;
        }

        Self {
            total_pages: report.pages.len(),
            skipped_pages: report.pages.iter().filter(|p| p.is_skipped()).count(),
            failed_pages: report.pages.iter().filter(|p| p.is_failed()).count(),
            findings_by_severity,
            duplicate_clusters: report.duplicates.len(),
            risk_score: report.account_risk.score,
            risk_label: report.account_risk.label.clone(),
        }
    }

    pub fn total_findings(&self) -> usize {
        self.findings_by_severity.values().sum()
    }

    /// Pages that went through the content detectors
    pub fn analyzed_pages(&self) -> usize {
        self.total_pages
            .saturating_sub(self.skipped_pages)
            .saturating_sub(self.failed_pages)
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &AuditStatistics) {
    println!("=== Audit Statistics ===\n");

    println!("Pages:");
    println!("  Total visited: {}", stats.total_pages);
    println!("  Analyzed: {}", stats.analyzed_pages());
    println!("  Skipped (noindex): {}", stats.skipped_pages);
    println!("  Failed: {}", stats.failed_pages);
    println!();

    println!("Findings ({}):", stats.total_findings());
    for severity in Severity::ALL.iter().rev() {
        let count = stats.findings_by_severity.get(severity).copied().unwrap_or(0);
        if count > 0 {
            println!("  {}: {}", severity, count);
        }
    }
    println!();

    if stats.duplicate_clusters > 0 {
        println!("Duplicate clusters: {}", stats.duplicate_clusters);
        println!();
    }

    println!(
        "Account Risk: {} / 100 ({})",
        stats.risk_score, stats.risk_label
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountRisk, Finding, FindingCategory, PageResult};

    #[test]
    fn test_statistics_from_report() {
        let mut analyzed = PageResult::new("https://example.com/", 0);
        analyzed.status = 200;
        analyzed.findings.push(Finding::new(
            "thin_content",
            Severity::Medium,
            FindingCategory::General,
            "thin",
        ));

        let mut skipped = PageResult::new("https://example.com/hidden", 1);
        skipped.skipped_reason = Some("noindex".to_string());

        let failed = PageResult::failed("https://example.com/down", 1, "timeout");

        let report = FindingsReport {
            site: "https://example.com/".to_string(),
            generated_at: "2024-01-01T00:00:00+00:00".to_string(),
            summary: Default::default(),
            program_policy_summary: Default::default(),
            account_risk: AccountRisk {
                score: 20,
                label: "Moderate Risk".to_string(),
            },
            pages: vec![analyzed, skipped, failed],
            duplicates: vec![],
            site_findings: vec![Finding::new(
                "missing_privacy_policy",
                Severity::High,
                FindingCategory::General,
                "no privacy policy",
            )],
        };

        let stats = AuditStatistics::from_report(&report);
        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.skipped_pages, 1);
        assert_eq!(stats.failed_pages, 1);
        assert_eq!(stats.analyzed_pages(), 1);
        assert_eq!(stats.total_findings(), 2);
        assert_eq!(stats.findings_by_severity[&Severity::High], 1);
        assert_eq!(stats.risk_label, "Moderate Risk");
    }
}
