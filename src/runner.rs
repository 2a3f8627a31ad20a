//! Per-host orchestration.
//!
//! [`HostComplianceRunner`] walks the baseline in order for each host, keeps one
//! failing rule from aborting the rest, and folds the outcomes into a
//! [`HostResult`]. Hosts are processed one after the other; every external call
//! is awaited before the next one is issued.

use crate::api::{HostApi, TimeoutHostApi};
use crate::baseline::Baseline;
use crate::config::RunOptions;
use crate::filter::HostFilter;
use crate::host::HostRef;
use crate::outcome::{HostResult, Message, RuleOutcome};
use crate::report::ComplianceReport;
use crate::rules::RuleEvaluator;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Runs the baseline against hosts.
pub struct HostComplianceRunner {
    api: Arc<dyn HostApi>,
    baseline: Baseline,
    options: RunOptions,
}

impl HostComplianceRunner {
    /// Create a runner. With a call timeout set, every host API call made by
    /// the runner is bounded by it.
    pub fn new(api: Arc<dyn HostApi>, baseline: Baseline, options: RunOptions) -> Self {
        let api = match options.call_timeout {
            Some(limit) => Arc::new(TimeoutHostApi::new(api, limit)) as Arc<dyn HostApi>,
            None => api,
        };
        Self {
            api,
            baseline,
            options,
        }
    }

    /// Returns true if the host sits in a cluster still being configured.
    ///
    /// A host without a cluster, or whose cluster cannot be looked up, is not
    /// pending.
    pub async fn is_pending(&self, host: &str) -> bool {
        match self.api.get_cluster(host).await {
            Ok(Some(cluster)) => self.options.is_pending_cluster(&cluster),
            Ok(None) => false,
            Err(e) => {
                debug!(host, error = %e, "Cluster lookup failed, treating host as not pending");
                false
            }
        }
    }

    /// Evaluate every baseline entry against one host.
    ///
    /// Returns `None` when the host is skipped as pending.
    pub async fn run(&self, host: &HostRef) -> Option<HostResult> {
        if !self.options.include_pending && self.is_pending(&host.name).await {
            info!(host = %host.name, "Skipping host in pending cluster");
            return None;
        }

        let enforce = self.options.mode.enforce();
        let evaluator = RuleEvaluator::new(self.api.as_ref());
        let mut outcomes = Vec::with_capacity(self.baseline.len());
        for spec in self.baseline.specs() {
            debug!(
                host = %host.name,
                rule = %spec.name,
                kind = %spec.kind(),
                enforce,
                "Evaluating rule"
            );
            let outcome = match evaluator.evaluate(&host.name, spec, enforce).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(host = %host.name, rule = %spec.name, error = %e, "Rule failed");
                    RuleOutcome::non_compliant(
                        spec.name.as_str(),
                        Message::critical(format!("{} - {}: {}", host.name, spec.name, e)),
                    )
                }
            };
            outcomes.push(outcome);
        }

        let result = HostResult::from_outcomes(host.name.as_str(), outcomes);
        debug!(
            host = %host.name,
            compliant = result.compliant,
            failed = ?result.failed_rules(),
            "Host evaluated"
        );
        Some(result)
    }

    /// Filter the host set, then run every remaining host in input order.
    pub async fn run_all(&self, hosts: &[HostRef]) -> ComplianceReport {
        let mut report = ComplianceReport::new(self.options.mode);
        let filter = HostFilter::new(self.options.include_witness);

        for host in filter.apply(hosts) {
            match self.run(host).await {
                Some(result) => report.record(result),
                None => report.record_skipped(host.name.as_str()),
            }
        }

        info!(
            mode = %self.options.mode,
            compliant = report.compliant_count(),
            non_compliant = report.non_compliant_count(),
            skipped = report.skipped().len(),
            "Compliance run finished"
        );
        report
    }
}
