//! Inventory snapshots.
//!
//! [`SnapshotInventory`] is a [`HostApi`] backed by an in-memory copy of host
//! state, loaded from a YAML document:
//!
//! ```yaml
//! hosts:
//!   - name: esx01.lab.local
//!     connection_state: connected
//!     model: PowerEdge R650
//!     cluster: Production
//!     settings:
//!       UserVars.ESXiShellTimeOut: 900
//!       Security.PasswordQualityControl: "retry=3 min=disabled,disabled,disabled,disabled,15"
//!     services:
//!       TSM-SSH: { policy: off, running: false }
//!       ntpd: { policy: on, running: true }
//!     ntp_servers: [ntp1.lab.local]
//!     acceptance_level: PartnerSupported
//!     packages:
//!       - { name: esx-base, acceptance_level: VMwareCertified }
//! ```
//!
//! Mutations are applied to the in-memory state and recorded in a journal, so a
//! FIX run against a snapshot shows exactly what would be changed.

use crate::api::HostApi;
use crate::error::{Error, Result};
use crate::host::{
    AcceptanceLevel, ConnectionState, HostRef, Package, ServicePolicy, ServiceState, SettingValue,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

fn default_connection_state() -> ConnectionState {
    ConnectionState::Connected
}

fn default_acceptance_level() -> AcceptanceLevel {
    AcceptanceLevel::PartnerSupported
}

/// Recorded state of a single host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub name: String,
    #[serde(default = "default_connection_state")]
    pub connection_state: ConnectionState,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub settings: IndexMap<String, SettingValue>,
    #[serde(default)]
    pub services: IndexMap<String, ServiceState>,
    #[serde(default)]
    pub ntp_servers: Vec<String>,
    #[serde(default = "default_acceptance_level")]
    pub acceptance_level: AcceptanceLevel,
    #[serde(default)]
    pub packages: Vec<Package>,
}

impl HostSnapshot {
    pub fn host_ref(&self) -> HostRef {
        HostRef {
            name: self.name.clone(),
            connection_state: self.connection_state,
            model: self.model.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InventoryDocument {
    #[serde(default)]
    hosts: Vec<HostSnapshot>,
}

/// A mutating call made against the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SetSetting {
        host: String,
        name: String,
        value: SettingValue,
    },
    SetServicePolicy {
        host: String,
        service: String,
        policy: ServicePolicy,
    },
    StopService {
        host: String,
        service: String,
    },
    SetAcceptanceLevel {
        host: String,
        level: AcceptanceLevel,
    },
    RemovePackage {
        host: String,
        package: String,
    },
}

/// In-memory [`HostApi`] implementation.
#[derive(Debug, Default)]
pub struct SnapshotInventory {
    hosts: RwLock<IndexMap<String, HostSnapshot>>,
    journal: RwLock<Vec<Mutation>>,
}

impl SnapshotInventory {
    pub fn from_hosts(hosts: impl IntoIterator<Item = HostSnapshot>) -> Self {
        let hosts = hosts
            .into_iter()
            .map(|h| (h.name.clone(), h))
            .collect::<IndexMap<_, _>>();
        Self {
            hosts: RwLock::new(hosts),
            journal: RwLock::new(Vec::new()),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let document: InventoryDocument = serde_yaml::from_str(content)?;
        Ok(Self::from_hosts(document.hosts))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::InventoryLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let inventory = Self::from_yaml_str(&content).map_err(|e| Error::InventoryLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!(path = %path.display(), hosts = inventory.len(), "Loaded inventory snapshot");
        Ok(inventory)
    }

    /// Host handles in document order.
    pub fn host_refs(&self) -> Vec<HostRef> {
        self.hosts.read().values().map(HostSnapshot::host_ref).collect()
    }

    /// Current state of a host, including applied mutations.
    pub fn snapshot(&self, host: &str) -> Option<HostSnapshot> {
        self.hosts.read().get(host).cloned()
    }

    /// Every mutating call made so far, in call order.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.journal.read().clone()
    }

    pub fn len(&self) -> usize {
        self.hosts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.read().is_empty()
    }

    fn read_host<T>(&self, host: &str, f: impl FnOnce(&HostSnapshot) -> Result<T>) -> Result<T> {
        let hosts = self.hosts.read();
        let snapshot = hosts
            .get(host)
            .ok_or_else(|| Error::HostNotFound(host.to_string()))?;
        f(snapshot)
    }

    fn mutate_host(
        &self,
        host: &str,
        mutation: Mutation,
        f: impl FnOnce(&mut HostSnapshot) -> Result<()>,
    ) -> Result<()> {
        let mut hosts = self.hosts.write();
        let snapshot = hosts
            .get_mut(host)
            .ok_or_else(|| Error::HostNotFound(host.to_string()))?;
        f(snapshot)?;
        self.journal.write().push(mutation);
        Ok(())
    }

    fn service<'a>(snapshot: &'a HostSnapshot, service: &str) -> Result<&'a ServiceState> {
        snapshot
            .services
            .get(service)
            .ok_or_else(|| Error::ServiceNotFound {
                host: snapshot.name.clone(),
                service: service.to_string(),
            })
    }

    fn service_mut<'a>(
        snapshot: &'a mut HostSnapshot,
        service: &str,
    ) -> Result<&'a mut ServiceState> {
        let host = snapshot.name.clone();
        snapshot
            .services
            .get_mut(service)
            .ok_or_else(|| Error::ServiceNotFound {
                host,
                service: service.to_string(),
            })
    }
}

#[async_trait]
impl HostApi for SnapshotInventory {
    async fn get_setting(&self, host: &str, name: &str) -> Result<SettingValue> {
        self.read_host(host, |h| {
            h.settings
                .get(name)
                .cloned()
                .ok_or_else(|| Error::SettingNotFound {
                    host: host.to_string(),
                    setting: name.to_string(),
                })
        })
    }

    async fn set_setting(&self, host: &str, name: &str, value: &SettingValue) -> Result<()> {
        let mutation = Mutation::SetSetting {
            host: host.to_string(),
            name: name.to_string(),
            value: value.clone(),
        };
        self.mutate_host(host, mutation, |h| {
            h.settings.insert(name.to_string(), value.clone());
            Ok(())
        })
    }

    async fn get_service_state(&self, host: &str, service: &str) -> Result<ServiceState> {
        self.read_host(host, |h| Self::service(h, service).copied())
    }

    async fn set_service_policy(
        &self,
        host: &str,
        service: &str,
        policy: ServicePolicy,
    ) -> Result<()> {
        let mutation = Mutation::SetServicePolicy {
            host: host.to_string(),
            service: service.to_string(),
            policy,
        };
        self.mutate_host(host, mutation, |h| {
            Self::service_mut(h, service)?.policy = policy;
            Ok(())
        })
    }

    async fn stop_service(&self, host: &str, service: &str) -> Result<()> {
        let mutation = Mutation::StopService {
            host: host.to_string(),
            service: service.to_string(),
        };
        self.mutate_host(host, mutation, |h| {
            Self::service_mut(h, service)?.running = false;
            Ok(())
        })
    }

    async fn get_cluster(&self, host: &str) -> Result<Option<String>> {
        self.read_host(host, |h| Ok(h.cluster.clone()))
    }

    async fn get_ntp_servers(&self, host: &str) -> Result<Vec<String>> {
        self.read_host(host, |h| Ok(h.ntp_servers.clone()))
    }

    async fn get_acceptance_level(&self, host: &str) -> Result<AcceptanceLevel> {
        self.read_host(host, |h| Ok(h.acceptance_level.clone()))
    }

    async fn set_acceptance_level(&self, host: &str, level: &AcceptanceLevel) -> Result<()> {
        let mutation = Mutation::SetAcceptanceLevel {
            host: host.to_string(),
            level: level.clone(),
        };
        self.mutate_host(host, mutation, |h| {
            h.acceptance_level = level.clone();
            Ok(())
        })
    }

    async fn list_packages(&self, host: &str) -> Result<Vec<Package>> {
        self.read_host(host, |h| Ok(h.packages.clone()))
    }

    async fn remove_package(&self, host: &str, package: &str) -> Result<()> {
        let mutation = Mutation::RemovePackage {
            host: host.to_string(),
            package: package.to_string(),
        };
        self.mutate_host(host, mutation, |h| {
            let before = h.packages.len();
            h.packages.retain(|p| p.name != package);
            if h.packages.len() == before {
                return Err(Error::PackageNotFound {
                    host: host.to_string(),
                    package: package.to_string(),
                });
            }
            Ok(())
        })
    }
}
