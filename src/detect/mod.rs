//! Policy violation detectors
//!
//! Detectors are pure functions of a rendered page: they never mutate it and
//! never touch the network, so running them twice on the same input yields the
//! same findings. The page-level set is the closed enumeration [`Detector`];
//! site-level checks live in [`site`], clustering in [`duplicates`] and
//! scoring in [`risk`].

pub mod duplicates;
pub mod general;
pub mod program_policy;
pub mod risk;
pub mod site;
pub mod text;

pub use duplicates::{cluster_pages, simhash, simhash_similarity};
pub use risk::calculate_account_risk;

use crate::model::{Finding, FindingCategory, PageResult};
use crate::render::{MobileFlags, RenderExtras, Viewport};

/// Everything a page-level detector may look at
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub page: &'a PageResult,
    pub extras: &'a RenderExtras,
    pub mobile_flags: MobileFlags,
    /// Desktop viewport the page was rendered at
    pub viewport: Viewport,
}

impl<'a> PageContext<'a> {
    pub fn new(page: &'a PageResult, extras: &'a RenderExtras, mobile_flags: MobileFlags) -> Self {
        Self {
            page,
            extras,
            mobile_flags,
            viewport: Viewport::DESKTOP,
        }
    }
}

/// The page-level detector set
///
/// Each variant may emit findings under more than one detector name; the
/// names are listed on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Detector {
    /// `thin_content`
    ThinContent,
    /// `ads_vs_content`
    AdsVsContent,
    /// `ads_interfering`
    AdsInterfering,
    /// `dead_end_ad`
    DeadEndAd,
    /// `language_issue`
    LanguageIssue,
    /// `abusive_experience`
    AbusiveExperience,
    /// `deceptive_affiliation_claims`, `deceptive_affiliation_disclaimer_low_visibility`
    DeceptiveRepresentation,
    /// `invalid_traffic_encouragement`, `invalid_traffic_reload_patterns`,
    /// `invalid_traffic_high_density`
    InvalidTraffic,
    /// `manipulative_ad_styling`, `ad_labeling_issues`
    ManipulativePlacement,
    /// `traffic_source_forced_redirects`, `traffic_source_incentivized`
    TrafficSource,
    /// `ugc_high_risk_terms`, `ugc_unmoderated_spam`, `ugc_unmoderated`
    UgcRisk,
}

impl Detector {
    pub const GENERAL: [Detector; 6] = [
        Detector::ThinContent,
        Detector::AdsVsContent,
        Detector::AdsInterfering,
        Detector::DeadEndAd,
        Detector::LanguageIssue,
        Detector::AbusiveExperience,
    ];

    pub const PROGRAM_POLICY: [Detector; 5] = [
        Detector::DeceptiveRepresentation,
        Detector::InvalidTraffic,
        Detector::ManipulativePlacement,
        Detector::TrafficSource,
        Detector::UgcRisk,
    ];

    pub fn category(self) -> FindingCategory {
        if Self::PROGRAM_POLICY.contains(&self) {
            FindingCategory::ProgramPolicy
        } else {
            FindingCategory::General
        }
    }

    /// Runs this detector against one page
    pub fn run(self, ctx: &PageContext<'_>) -> Vec<Finding> {
        match self {
            Detector::ThinContent => general::thin_content(ctx),
            Detector::AdsVsContent => general::ads_vs_content(ctx),
            Detector::AdsInterfering => general::ads_interfering(ctx),
            Detector::DeadEndAd => general::dead_end_ad(ctx),
            Detector::LanguageIssue => general::language_issue(ctx),
            Detector::AbusiveExperience => general::abusive_experience(ctx),
            Detector::DeceptiveRepresentation => program_policy::deceptive::detect(ctx),
            Detector::InvalidTraffic => program_policy::invalid_traffic::detect(ctx),
            Detector::ManipulativePlacement => program_policy::placement::detect(ctx),
            Detector::TrafficSource => program_policy::traffic_source::detect(ctx),
            Detector::UgcRisk => program_policy::ugc::detect(ctx),
        }
    }
}

/// Runs the page-level detector set
///
/// Program-policy detectors only run when `policy_checks` is set.
pub fn run_page_detectors(ctx: &PageContext<'_>, policy_checks: bool) -> Vec<Finding> {
    let program_policy: &[Detector] = if policy_checks {
        &Detector::PROGRAM_POLICY
    } else {
        &[]
    };

    Detector::GENERAL
        .iter()
        .chain(program_policy.iter())
        .flat_map(|detector| detector.run(ctx))
        .collect()
}
