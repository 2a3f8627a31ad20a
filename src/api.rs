//! The host API seam.
//!
//! The engine never talks to the virtualization manager directly. Everything it
//! reads or changes on a host goes through [`HostApi`], which is implemented by
//! the caller (a live manager session, or [`SnapshotInventory`] for offline runs
//! and tests).
//!
//! [`SnapshotInventory`]: crate::inventory::SnapshotInventory

use crate::error::{Error, Result};
use crate::host::{AcceptanceLevel, Package, ServicePolicy, ServiceState, SettingValue};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Operations the compliance engine needs from the virtualization manager.
///
/// Every call is a blocking round trip from the engine's point of view: the
/// runner awaits each call before issuing the next one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Read an advanced setting.
    async fn get_setting(&self, host: &str, name: &str) -> Result<SettingValue>;

    /// Write an advanced setting.
    async fn set_setting(&self, host: &str, name: &str, value: &SettingValue) -> Result<()>;

    /// Read the startup policy and running state of a service.
    async fn get_service_state(&self, host: &str, service: &str) -> Result<ServiceState>;

    /// Change the startup policy of a service.
    async fn set_service_policy(
        &self,
        host: &str,
        service: &str,
        policy: ServicePolicy,
    ) -> Result<()>;

    /// Stop a running service.
    async fn stop_service(&self, host: &str, service: &str) -> Result<()>;

    /// Name of the cluster the host belongs to, `None` for standalone hosts.
    async fn get_cluster(&self, host: &str) -> Result<Option<String>>;

    /// NTP servers configured on the host.
    async fn get_ntp_servers(&self, host: &str) -> Result<Vec<String>>;

    /// Current host acceptance level.
    async fn get_acceptance_level(&self, host: &str) -> Result<AcceptanceLevel>;

    /// Change the host acceptance level.
    async fn set_acceptance_level(&self, host: &str, level: &AcceptanceLevel) -> Result<()>;

    /// Installed package inventory.
    async fn list_packages(&self, host: &str) -> Result<Vec<Package>>;

    /// Remove exactly one package by name.
    ///
    /// Implementations must not force the removal, cascade into dependent
    /// packages, or bypass maintenance-mode requirements.
    async fn remove_package(&self, host: &str, package: &str) -> Result<()>;
}

/// [`HostApi`] wrapper that bounds every call by a fixed duration.
///
/// A call that runs out of time fails with [`Error::Timeout`] like any other
/// failed call, so rules see it at the exact step where it happened.
pub struct TimeoutHostApi {
    inner: Arc<dyn HostApi>,
    limit: Duration,
}

impl TimeoutHostApi {
    pub fn new(inner: Arc<dyn HostApi>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T>(
        &self,
        host: &str,
        operation: &str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.limit, call)
            .await
            .unwrap_or_else(|_| {
                Err(Error::Timeout {
                    host: host.to_string(),
                    operation: operation.to_string(),
                    timeout: self.limit,
                })
            })
    }
}

#[async_trait]
impl HostApi for TimeoutHostApi {
    async fn get_setting(&self, host: &str, name: &str) -> Result<SettingValue> {
        self.bounded(host, "get_setting", self.inner.get_setting(host, name))
            .await
    }

    async fn set_setting(&self, host: &str, name: &str, value: &SettingValue) -> Result<()> {
        self.bounded(host, "set_setting", self.inner.set_setting(host, name, value))
            .await
    }

    async fn get_service_state(&self, host: &str, service: &str) -> Result<ServiceState> {
        self.bounded(
            host,
            "get_service_state",
            self.inner.get_service_state(host, service),
        )
        .await
    }

    async fn set_service_policy(
        &self,
        host: &str,
        service: &str,
        policy: ServicePolicy,
    ) -> Result<()> {
        self.bounded(
            host,
            "set_service_policy",
            self.inner.set_service_policy(host, service, policy),
        )
        .await
    }

    async fn stop_service(&self, host: &str, service: &str) -> Result<()> {
        self.bounded(host, "stop_service", self.inner.stop_service(host, service))
            .await
    }

    async fn get_cluster(&self, host: &str) -> Result<Option<String>> {
        self.bounded(host, "get_cluster", self.inner.get_cluster(host))
            .await
    }

    async fn get_ntp_servers(&self, host: &str) -> Result<Vec<String>> {
        self.bounded(host, "get_ntp_servers", self.inner.get_ntp_servers(host))
            .await
    }

    async fn get_acceptance_level(&self, host: &str) -> Result<AcceptanceLevel> {
        self.bounded(
            host,
            "get_acceptance_level",
            self.inner.get_acceptance_level(host),
        )
        .await
    }

    async fn set_acceptance_level(&self, host: &str, level: &AcceptanceLevel) -> Result<()> {
        self.bounded(
            host,
            "set_acceptance_level",
            self.inner.set_acceptance_level(host, level),
        )
        .await
    }

    async fn list_packages(&self, host: &str) -> Result<Vec<Package>> {
        self.bounded(host, "list_packages", self.inner.list_packages(host))
            .await
    }

    async fn remove_package(&self, host: &str, package: &str) -> Result<()> {
        self.bounded(
            host,
            "remove_package",
            self.inner.remove_package(host, package),
        )
        .await
    }
}
