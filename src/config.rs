//! Run configuration.
//!
//! A run is stateless: everything that shapes it is held in [`RunOptions`],
//! built by the caller (the CLI builds it from its flags). The hardening targets
//! themselves live in [`Baseline`](crate::baseline::Baseline).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Clusters whose name matches this are still being configured.
static PENDING_CLUSTER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)config").expect("Invalid pending cluster regex"));

/// What the run is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Report only, never change a host
    #[default]
    Scan,
    /// Apply the baseline where it is safe to do so
    Fix,
}

impl Mode {
    /// Returns true if rules should remediate.
    pub fn enforce(&self) -> bool {
        matches!(self, Mode::Fix)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Scan => write!(f, "scan"),
            Mode::Fix => write!(f, "fix"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scan" => Ok(Mode::Scan),
            "fix" => Ok(Mode::Fix),
            other => Err(format!("invalid mode '{}', expected 'scan' or 'fix'", other)),
        }
    }
}

/// Options for one compliance run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub mode: Mode,
    /// Audit virtual witness appliances too
    pub include_witness: bool,
    /// Audit hosts in clusters that are still being configured
    pub include_pending: bool,
    /// Cluster names matching this mark pending hosts
    pub pending_cluster_pattern: Regex,
    /// Upper bound for each host API call, `None` waits indefinitely
    pub call_timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Scan,
            include_witness: false,
            include_pending: false,
            pending_cluster_pattern: PENDING_CLUSTER_REGEX.clone(),
            call_timeout: None,
        }
    }
}

impl RunOptions {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn with_include_witness(mut self, include: bool) -> Self {
        self.include_witness = include;
        self
    }

    pub fn with_include_pending(mut self, include: bool) -> Self {
        self.include_pending = include;
        self
    }

    pub fn with_pending_cluster_pattern(mut self, pattern: Regex) -> Self {
        self.pending_cluster_pattern = pattern;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Returns true if a cluster with this name holds pending hosts.
    pub fn is_pending_cluster(&self, cluster: &str) -> bool {
        self.pending_cluster_pattern.is_match(cluster)
    }
}
