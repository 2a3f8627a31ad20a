//! Shared test utilities and fixtures for the esxi-harden test suite.
//!
//! This module provides:
//! - A builder for host snapshots, starting from a fully compliant host
//! - Helpers to build runners over a [`SnapshotInventory`]
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::sync::Arc;

use indexmap::IndexMap;

use esxi_harden::baseline::{Baseline, REMOTE_SHELL_SERVICE, TIME_SYNC_SERVICE};
use esxi_harden::config::{Mode, RunOptions};
use esxi_harden::host::{
    AcceptanceLevel, ConnectionState, HostRef, Package, ServicePolicy, ServiceState, SettingValue,
};
use esxi_harden::inventory::{HostSnapshot, SnapshotInventory};
use esxi_harden::runner::HostComplianceRunner;

// ============================================================================
// Host Snapshot Builder
// ============================================================================

/// Fluent builder for [`HostSnapshot`], defaulting to a compliant host.
pub struct HostBuilder {
    snapshot: HostSnapshot,
}

impl HostBuilder {
    /// A connected host that already meets the default baseline.
    pub fn compliant(name: &str) -> Self {
        let mut settings = IndexMap::new();
        settings.insert("UserVars.ESXiShellTimeOut".to_string(), SettingValue::Int(900));
        settings.insert(
            "UserVars.ESXiShellInteractiveTimeOut".to_string(),
            SettingValue::Int(900),
        );
        settings.insert("Security.AccountUnlockTime".to_string(), SettingValue::Int(900));
        settings.insert("Security.AccountLockFailures".to_string(), SettingValue::Int(5));
        settings.insert(
            "Security.PasswordQualityControl".to_string(),
            SettingValue::Text("retry=3 min=disabled,disabled,disabled,disabled,15".to_string()),
        );
        settings.insert("Mem.ShareForceSalting".to_string(), SettingValue::Int(2));

        let mut services = IndexMap::new();
        services.insert(
            REMOTE_SHELL_SERVICE.to_string(),
            ServiceState::new(ServicePolicy::Off, false),
        );
        services.insert(
            TIME_SYNC_SERVICE.to_string(),
            ServiceState::new(ServicePolicy::On, true),
        );

        Self {
            snapshot: HostSnapshot {
                name: name.to_string(),
                connection_state: ConnectionState::Connected,
                model: "PowerEdge R650".to_string(),
                cluster: Some("Production".to_string()),
                settings,
                services,
                ntp_servers: vec!["ntp1.lab.local".to_string()],
                acceptance_level: AcceptanceLevel::PartnerSupported,
                packages: vec![Package::new("esx-base", AcceptanceLevel::VMwareCertified)],
            },
        }
    }

    pub fn setting(mut self, name: &str, value: SettingValue) -> Self {
        self.snapshot.settings.insert(name.to_string(), value);
        self
    }

    pub fn without_setting(mut self, name: &str) -> Self {
        self.snapshot.settings.shift_remove(name);
        self
    }

    pub fn service(mut self, key: &str, policy: ServicePolicy, running: bool) -> Self {
        self.snapshot
            .services
            .insert(key.to_string(), ServiceState::new(policy, running));
        self
    }

    pub fn ntp_servers(mut self, servers: &[&str]) -> Self {
        self.snapshot.ntp_servers = servers.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn acceptance_level(mut self, level: AcceptanceLevel) -> Self {
        self.snapshot.acceptance_level = level;
        self
    }

    pub fn package(mut self, name: &str, level: AcceptanceLevel) -> Self {
        self.snapshot.packages.push(Package::new(name, level));
        self
    }

    pub fn cluster(mut self, cluster: Option<&str>) -> Self {
        self.snapshot.cluster = cluster.map(str::to_string);
        self
    }

    pub fn connection_state(mut self, state: ConnectionState) -> Self {
        self.snapshot.connection_state = state;
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.snapshot.model = model.to_string();
        self
    }

    pub fn build(self) -> HostSnapshot {
        self.snapshot
    }
}

// ============================================================================
// Runner Helpers
// ============================================================================

pub fn inventory(hosts: Vec<HostSnapshot>) -> Arc<SnapshotInventory> {
    Arc::new(SnapshotInventory::from_hosts(hosts))
}

pub fn runner(inventory: &Arc<SnapshotInventory>, options: RunOptions) -> HostComplianceRunner {
    HostComplianceRunner::new(inventory.clone(), Baseline::default(), options)
}

pub fn scan() -> RunOptions {
    RunOptions::new(Mode::Scan)
}

pub fn fix() -> RunOptions {
    RunOptions::new(Mode::Fix)
}

pub fn host_refs(inventory: &SnapshotInventory) -> Vec<HostRef> {
    inventory.host_refs()
}
