use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Severity of a detector verdict
///
/// Variants are declared in ascending order so `Ord` matches
/// `low < medium < high < critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities, lowest first
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Risk weight contributed by one finding of this severity
    pub fn weight(self) -> u32 {
        match self {
            Severity::Critical => 30,
            Severity::High => 15,
            Severity::Medium => 5,
            Severity::Low => 1,
        }
    }

    /// Returns the lowercase wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which summary table a finding is counted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    #[default]
    General,
    ProgramPolicy,
}

impl FindingCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingCategory::General => "general",
            FindingCategory::ProgramPolicy => "program_policy",
        }
    }
}

/// One detector verdict on a page or on the site as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Detector name (e.g. `thin_content`)
    pub detector: String,

    pub severity: Severity,

    #[serde(default)]
    pub category: FindingCategory,

    /// Detector confidence in [0, 1]
    pub confidence: f64,

    /// Human-readable description
    pub message: String,

    /// Suggested fixes
    #[serde(default)]
    pub remediation: Vec<String>,

    /// Policy reference URLs
    #[serde(default)]
    pub policy_links: Vec<String>,

    /// Free-form supporting data
    #[serde(default)]
    pub evidence: BTreeMap<String, Value>,
}

impl Finding {
    /// Creates a finding with full confidence and no remediation, links or evidence
    pub fn new(
        detector: impl Into<String>,
        severity: Severity,
        category: FindingCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            detector: detector.into(),
            severity,
            category,
            confidence: 1.0,
            message: message.into(),
            remediation: Vec::new(),
            policy_links: Vec::new(),
            evidence: BTreeMap::new(),
        }
    }

    /// Sets the confidence, clamped to [0, 1]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_remediation(mut self, steps: &[&str]) -> Self {
        self.remediation = steps.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_policy_links(mut self, links: &[&str]) -> Self {
        self.policy_links = links.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Adds one evidence entry
    pub fn with_evidence(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.evidence.insert(key.to_string(), value.into());
        self
    }
}
