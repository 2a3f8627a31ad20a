//! Compliance report aggregation.
//!
//! The report keeps one [`HostResult`] per processed host in input order and the
//! names of hosts skipped as pending. Rendering is left to the caller.

use crate::config::Mode;
use crate::outcome::HostResult;
use serde::Serialize;

/// Outcome of a full run across the host set.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    /// Mode the run was executed in
    pub mode: Mode,
    /// Report generation timestamp
    pub timestamp: String,
    results: Vec<HostResult>,
    skipped: Vec<String>,
}

impl ComplianceReport {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            timestamp: chrono::Utc::now().to_rfc3339(),
            results: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn record(&mut self, result: HostResult) {
        self.results.push(result);
    }

    pub fn record_skipped(&mut self, host: impl Into<String>) {
        self.skipped.push(host.into());
    }

    pub fn results(&self) -> &[HostResult] {
        &self.results
    }

    /// Hosts skipped because their cluster is still being configured.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn compliant_count(&self) -> usize {
        self.results.iter().filter(|r| r.compliant).count()
    }

    pub fn non_compliant_count(&self) -> usize {
        self.results.iter().filter(|r| !r.compliant).count()
    }

    pub fn non_compliant_hosts(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.compliant)
            .map(|r| r.host.as_str())
            .collect()
    }

    /// Returns true if every processed host is compliant.
    pub fn is_compliant(&self) -> bool {
        self.non_compliant_count() == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "Compliant hosts: {}, non-compliant hosts: {}",
            self.compliant_count(),
            self.non_compliant_count()
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
