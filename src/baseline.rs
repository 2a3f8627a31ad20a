//! The hardening baseline.
//!
//! [`Baseline`] is the settings catalog: an ordered, immutable list of
//! [`SettingSpec`] entries the runner evaluates in turn. The default baseline is
//! fixed; tests build their own through [`Baseline::new`].

use crate::host::{AcceptanceLevel, SettingValue};
use std::fmt;

/// Service key of the remote shell (SSH) service.
pub const REMOTE_SHELL_SERVICE: &str = "TSM-SSH";

/// Service key of the time synchronization service.
pub const TIME_SYNC_SERVICE: &str = "ntpd";

/// What a catalog entry requires of a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Advanced setting must hold this value
    Setting(SettingValue),
    /// Service must have startup policy off and be stopped
    ServiceDisabled,
    /// Service must have startup policy on
    ServiceEnabled {
        /// Refuse to enable the service unless NTP servers are configured
        require_ntp_servers: bool,
    },
    /// Host acceptance level must equal this level
    AcceptanceLevel(AcceptanceLevel),
}

/// Broad category of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKind {
    Scalar,
    Service,
    AcceptanceLevel,
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingKind::Scalar => write!(f, "scalar"),
            SettingKind::Service => write!(f, "service"),
            SettingKind::AcceptanceLevel => write!(f, "acceptance level"),
        }
    }
}

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingSpec {
    /// Setting name, or service key for service entries
    pub name: String,
    pub target: Target,
}

impl SettingSpec {
    pub fn setting(name: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        Self {
            name: name.into(),
            target: Target::Setting(value.into()),
        }
    }

    pub fn service_disabled(service: impl Into<String>) -> Self {
        Self {
            name: service.into(),
            target: Target::ServiceDisabled,
        }
    }

    pub fn service_enabled(service: impl Into<String>, require_ntp_servers: bool) -> Self {
        Self {
            name: service.into(),
            target: Target::ServiceEnabled {
                require_ntp_servers,
            },
        }
    }

    pub fn acceptance_level(level: AcceptanceLevel) -> Self {
        Self {
            name: "AcceptanceLevel".to_string(),
            target: Target::AcceptanceLevel(level),
        }
    }

    pub fn kind(&self) -> SettingKind {
        match self.target {
            Target::Setting(_) => SettingKind::Scalar,
            Target::ServiceDisabled | Target::ServiceEnabled { .. } => SettingKind::Service,
            Target::AcceptanceLevel(_) => SettingKind::AcceptanceLevel,
        }
    }
}

/// Ordered settings catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    specs: Vec<SettingSpec>,
}

impl Baseline {
    pub fn new(specs: Vec<SettingSpec>) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &[SettingSpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&SettingSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for Baseline {
    fn default() -> Self {
        Self::new(vec![
            SettingSpec::setting("UserVars.ESXiShellTimeOut", SettingValue::Int(900)),
            SettingSpec::setting(
                "UserVars.ESXiShellInteractiveTimeOut",
                SettingValue::Int(900),
            ),
            SettingSpec::setting("Security.AccountUnlockTime", SettingValue::Int(900)),
            SettingSpec::setting("Security.AccountLockFailures", SettingValue::Int(5)),
            SettingSpec::setting(
                "Security.PasswordQualityControl",
                "retry=3 min=disabled,disabled,disabled,disabled,15",
            ),
            SettingSpec::setting("Mem.ShareForceSalting", SettingValue::Int(2)),
            SettingSpec::service_disabled(REMOTE_SHELL_SERVICE),
            SettingSpec::service_enabled(TIME_SYNC_SERVICE, true),
            SettingSpec::acceptance_level(AcceptanceLevel::PartnerSupported),
        ])
    }
}
