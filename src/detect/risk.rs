//! Account risk scoring

use crate::model::{AccountRisk, Finding};

const MAX_SCORE: u32 = 100;

/// Sums severity weights over `findings`, clamped to 100, and labels the band
pub fn calculate_account_risk<'a, I>(findings: I) -> AccountRisk
where
    I: IntoIterator<Item = &'a Finding>,
{
    let total: u32 = findings
        .into_iter()
        .map(|finding| finding.severity.weight())
        .fold(0u32, u32::saturating_add);
    let score = total.min(MAX_SCORE);

    AccountRisk {
        score,
        label: risk_label(score).to_string(),
    }
}

pub fn risk_label(score: u32) -> &'static str {
    match score {
        0..=15 => "Low Risk",
        16..=40 => "Moderate Risk",
        41..=70 => "High Risk",
        _ => "Severe Risk (Likely Enforcement)",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FindingCategory, Severity};

    fn finding(severity: Severity) -> Finding {
        Finding::new("test", severity, FindingCategory::General, "test")
    }

    #[test]
    fn test_critical_plus_medium() {
        let findings = [finding(Severity::Critical), finding(Severity::Medium)];
        let risk = calculate_account_risk(&findings);
        assert_eq!(risk.score, 35);
        assert_eq!(risk.label, "Moderate Risk");
    }

    #[test]
    fn test_score_clamped() {
        let findings: Vec<Finding> = (0..50).map(|_| finding(Severity::Critical)).collect();
        let risk = calculate_account_risk(&findings);
        assert_eq!(risk.score, 100);
        assert_eq!(risk.label, "Severe Risk (Likely Enforcement)");
    }

    #[test]
    fn test_empty_is_low() {
        let risk = calculate_account_risk(std::iter::empty());
        assert_eq!(risk.score, 0);
        assert_eq!(risk.label, "Low Risk");
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(risk_label(15), "Low Risk");
        assert_eq!(risk_label(16), "Moderate Risk");
        assert_eq!(risk_label(40), "Moderate Risk");
        assert_eq!(risk_label(70), "High Risk");
        assert_eq!(risk_label(71), "Severe Risk (Likely Enforcement)");
    }

    #[test]
    fn test_order_independent() {
        let mut findings = vec![
            finding(Severity::Low),
            finding(Severity::High),
            finding(Severity::Medium),
        ];
        let forward = calculate_account_risk(&findings);
        findings.reverse();
        assert_eq!(calculate_account_risk(&findings), forward);
        assert_eq!(forward.score, 21);
    }
}
