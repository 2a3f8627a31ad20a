//! Error types for esxi-harden.
//!
//! This module defines the error types returned by the compliance engine and by
//! the host API collaborators it drives.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for esxi-harden operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for esxi-harden.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Host API Errors
    // ========================================================================
    /// A call against the virtualization manager failed.
    #[error("Host API call '{operation}' failed on '{host}': {message}")]
    HostApi {
        /// Target host
        host: String,
        /// Operation that failed (e.g. `set_setting`)
        operation: String,
        /// Error message
        message: String,
    },

    /// Host not known to the collaborator.
    #[error("Host '{0}' not found")]
    HostNotFound(String),

    /// Advanced setting missing on the host.
    #[error("Setting '{setting}' not found on host '{host}'")]
    SettingNotFound {
        /// Target host
        host: String,
        /// Setting name
        setting: String,
    },

    /// Service missing on the host.
    #[error("Service '{service}' not found on host '{host}'")]
    ServiceNotFound {
        /// Target host
        host: String,
        /// Service key
        service: String,
    },

    /// Package removal requested for a package that is not installed.
    #[error("Package '{package}' is not installed on host '{host}'")]
    PackageNotFound {
        /// Target host
        host: String,
        /// Package name
        package: String,
    },

    /// A host API call did not finish within the configured timeout.
    #[error("Host API call '{operation}' timed out on '{host}' after {timeout:?}")]
    Timeout {
        /// Target host
        host: String,
        /// Operation that timed out
        operation: String,
        /// Configured limit
        timeout: Duration,
    },

    // ========================================================================
    // Inventory Errors
    // ========================================================================
    /// Error loading a host inventory snapshot.
    #[error("Failed to load inventory from '{path}': {message}")]
    InventoryLoad {
        /// Path to inventory
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Error parsing an inventory document.
    #[error("Invalid inventory document: {0}")]
    InventoryParse(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a host API error.
    pub fn host_api(
        host: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::HostApi {
            host: host.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Returns the host this error relates to, if any.
    pub fn host(&self) -> Option<&str> {
        match self {
            Error::HostApi { host, .. }
            | Error::SettingNotFound { host, .. }
            | Error::ServiceNotFound { host, .. }
            | Error::PackageNotFound { host, .. }
            | Error::Timeout { host, .. } => Some(host),
            Error::HostNotFound(host) => Some(host),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::host_api("esx01", "set_setting", "permission denied");
        assert_eq!(
            err.to_string(),
            "Host API call 'set_setting' failed on 'esx01': permission denied"
        );

        let err = Error::Timeout {
            host: "esx01".into(),
            operation: "stop_service".into(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(
            err.to_string(),
            "Host API call 'stop_service' timed out on 'esx01' after 30s"
        );
    }

    #[test]
    fn test_error_host() {
        let err = Error::SettingNotFound {
            host: "esx02".into(),
            setting: "Mem.ShareForceSalting".into(),
        };
        assert_eq!(err.host(), Some("esx02"));

        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(err.host(), None);
    }
}
