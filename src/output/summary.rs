//! Findings aggregation
//!
//! Folds findings into detector -> severity -> count tables, one table per
//! finding category.

use crate::model::{Finding, FindingCategory, SeveritySummary};

/// Summary tables for both finding categories
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTables {
    pub general: SeveritySummary,
    pub program_policy: SeveritySummary,
}

/// Counts findings by detector and severity, split by category
pub fn summarize<'a, I>(findings: I) -> SummaryTables
where
    I: IntoIterator<Item = &'a Finding>,
{
    let mut tables = SummaryTables::default();
    for finding in findings {
        let table = match finding.category {
            FindingCategory::General => &mut tables.general,
            FindingCategory::ProgramPolicy => &mut tables.program_policy,
        };
        *table
            .entry(finding.detector.clone())
            .or_default()
            .entry(finding.severity.as_str().to_string())
            .or_default() += 1;
    }
    tables
}

/// Total number of findings counted in a table
pub fn total(summary: &SeveritySummary) -> usize {
    summary.values().flat_map(|counts| counts.values()).sum()
}
