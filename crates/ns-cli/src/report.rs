//! JSON artifacts and reports.

use serde::{Deserialize, Serialize};

/// Compiled rule snapshot, consumed by the extension loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSnapshot {
    pub version: u32,
    pub rules: Vec<String>,
}

/// Output of `validate --json`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateReport {
    pub version: u32,
    pub rules: usize,
    pub deduped: usize,
    pub issues: Vec<RuleIssue>,
}

/// One rule the lint flagged, with human-readable problems.
#[derive(Debug, Clone, Serialize)]
pub struct RuleIssue {
    pub rule: String,
    pub problems: Vec<String>,
}
