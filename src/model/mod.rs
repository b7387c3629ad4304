//! Audit data model
//!
//! Pages, ad elements, findings and the terminal report. Everything here is
//! plain data with `serde` support; behavior lives in `detect` and `crawler`.

mod finding;
mod page;
mod report;

pub use finding::{Finding, FindingCategory, Severity};
pub use page::{AdElement, PageResult};
pub use report::{AccountRisk, DuplicateCluster, FindingsReport, SeveritySummary};
