//! Host-side data model.
//!
//! These types describe what the engine observes on a host through the
//! [`HostApi`](crate::api::HostApi): connection state, advanced setting values,
//! service states, acceptance levels and installed packages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Connection state of a host as reported by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Host is connected and serving workloads
    Connected,
    /// Host is connected but in maintenance mode
    Maintenance,
    /// Host is disconnected from the manager
    Disconnected,
    /// Host stopped answering heartbeats
    NotResponding,
}

impl ConnectionState {
    /// Returns true if the host can be audited in this state.
    pub fn is_reachable(&self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::Maintenance)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Maintenance => write!(f, "Maintenance"),
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::NotResponding => write!(f, "NotResponding"),
        }
    }
}

/// Handle to a host supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRef {
    /// Host name as known to the manager
    pub name: String,
    /// Current connection state
    pub connection_state: ConnectionState,
    /// Hardware model identifier
    #[serde(default)]
    pub model: String,
}

impl HostRef {
    /// Create a connected host with an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connection_state: ConnectionState::Connected,
            model: String::new(),
        }
    }

    pub fn with_connection_state(mut self, state: ConnectionState) -> Self {
        self.connection_state = state;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Returns true if the model identifies a virtual appliance such as a
    /// stretched-cluster witness.
    pub fn is_virtual_appliance(&self) -> bool {
        self.model.to_ascii_lowercase().starts_with("vmware")
    }
}

/// Value of an advanced host setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Integer value
    Int(i64),
    /// String value
    Text(String),
}

impl SettingValue {
    /// Compare two values by their rendered form.
    ///
    /// The manager is not consistent about typing, so `900` and `"900"` match.
    pub fn matches(&self, other: &SettingValue) -> bool {
        match (self, other) {
            (SettingValue::Int(a), SettingValue::Int(b)) => a == b,
            (SettingValue::Text(a), SettingValue::Text(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Int(v) => write!(f, "{}", v),
            SettingValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

/// Startup policy of a host service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServicePolicy {
    /// Start and stop with host
    On,
    /// Start and stop manually
    Off,
    /// Start and stop with port usage
    Automatic,
}

impl fmt::Display for ServicePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServicePolicy::On => write!(f, "on"),
            ServicePolicy::Off => write!(f, "off"),
            ServicePolicy::Automatic => write!(f, "automatic"),
        }
    }
}

/// Observed state of a host service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceState {
    /// Startup policy
    pub policy: ServicePolicy,
    /// Whether the service is currently running
    #[serde(default)]
    pub running: bool,
}

impl ServiceState {
    pub fn new(policy: ServicePolicy, running: bool) -> Self {
        Self { policy, running }
    }
}

/// Software acceptance level of a host or of a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AcceptanceLevel {
    VMwareCertified,
    VMwareAccepted,
    PartnerSupported,
    CommunitySupported,
    /// Level reported by the host that this crate does not know about
    Other(String),
}

impl AcceptanceLevel {
    /// Levels an installed package may carry for the hardened baseline.
    pub const PERMITTED: [AcceptanceLevel; 3] = [
        AcceptanceLevel::VMwareCertified,
        AcceptanceLevel::PartnerSupported,
        AcceptanceLevel::VMwareAccepted,
    ];

    /// Returns true if a package at this level does not block the baseline level.
    pub fn is_permitted(&self) -> bool {
        Self::PERMITTED.contains(self)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AcceptanceLevel::VMwareCertified => "VMwareCertified",
            AcceptanceLevel::VMwareAccepted => "VMwareAccepted",
            AcceptanceLevel::PartnerSupported => "PartnerSupported",
            AcceptanceLevel::CommunitySupported => "CommunitySupported",
            AcceptanceLevel::Other(level) => level,
        }
    }
}

impl FromStr for AcceptanceLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Ok(match normalized.as_str() {
            "vmwarecertified" | "certified" => AcceptanceLevel::VMwareCertified,
            "vmwareaccepted" | "accepted" => AcceptanceLevel::VMwareAccepted,
            "partnersupported" | "partner" => AcceptanceLevel::PartnerSupported,
            "communitysupported" | "community" => AcceptanceLevel::CommunitySupported,
            _ => AcceptanceLevel::Other(s.to_string()),
        })
    }
}

impl TryFrom<String> for AcceptanceLevel {
    type Error = std::convert::Infallible;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AcceptanceLevel> for String {
    fn from(level: AcceptanceLevel) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for AcceptanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An installed software package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub acceptance_level: AcceptanceLevel,
}

impl Package {
    pub fn new(name: impl Into<String>, acceptance_level: AcceptanceLevel) -> Self {
        Self {
            name: name.into(),
            acceptance_level,
        }
    }
}
