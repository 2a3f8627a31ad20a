//! # esxi-harden - Hardening Compliance for Virtualization Hosts
//!
//! esxi-harden audits, and optionally remediates, a fixed hardening baseline on
//! hosts managed by a central virtualization manager: shell timeouts, account
//! lockout, password quality, memory salting, the remote shell and time sync
//! services, and the software acceptance level.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           CLI Interface                             │
//! │              (clap parsing, colored message rendering)              │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       HostComplianceRunner                          │
//! │          (host filter, pending clusters, per-rule isolation)        │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!          ┌─────────────────────────┴─────────────────────────┐
//!          ▼                                                   ▼
//! ┌─────────────────────┐                       ┌───────────────────────────┐
//! │    RuleEvaluator    │                       │  AcceptanceLevelResolver  │
//! │ (settings, services)│                       │  (package conflicts)      │
//! └─────────────────────┘                       └───────────────────────────┘
//!          │                                                   │
//!          └─────────────────────────┬─────────────────────────┘
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                             HostApi                                 │
//! │          (manager session, or SnapshotInventory offline)            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use esxi_harden::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let inventory = SnapshotInventory::from_file("hosts.yml")?;
//!     let hosts = inventory.host_refs();
//!
//!     let runner = HostComplianceRunner::new(
//!         Arc::new(inventory),
//!         Baseline::default(),
//!         RunOptions::new(Mode::Scan),
//!     );
//!     let report = runner.run_all(&hosts).await;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::acceptance::AcceptanceLevelResolver;
    pub use crate::api::{HostApi, TimeoutHostApi};
    pub use crate::baseline::{Baseline, SettingKind, SettingSpec, Target};
    pub use crate::config::{Mode, RunOptions};
    pub use crate::error::{Error, Result};
    pub use crate::filter::HostFilter;
    pub use crate::host::{
        AcceptanceLevel, ConnectionState, HostRef, Package, ServicePolicy, ServiceState,
        SettingValue,
    };
    pub use crate::inventory::{HostSnapshot, Mutation, SnapshotInventory};
    pub use crate::outcome::{HostResult, Message, RuleOutcome, Severity};
    pub use crate::report::ComplianceReport;
    pub use crate::rules::RuleEvaluator;
    pub use crate::runner::HostComplianceRunner;
}

/// Error types and result aliases.
pub mod error;

/// Run configuration: mode, inclusion flags and timeouts.
pub mod config;

/// Host-side data model observed through the host API.
pub mod host;

/// The [`HostApi`](api::HostApi) trait every collaborator implements.
pub mod api;

/// The settings catalog.
pub mod baseline;

/// Rule outcomes, messages and host results.
pub mod outcome;

/// Scalar setting and service rules.
pub mod rules;

/// Acceptance level and package conflict resolution.
pub mod acceptance;

/// Connection-state and witness filtering.
pub mod filter;

/// Per-host orchestration.
pub mod runner;

/// Aggregated run report.
pub mod report;

/// In-memory host API backed by a YAML snapshot.
pub mod inventory;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
