//! Acceptance level resolution.
//!
//! Lowering a host's acceptance level is only possible once no installed package
//! carries a level outside the permitted set. The resolver tolerates exactly one
//! known offender, [`TOLERATED_PACKAGE`], which it removes before re-checking.
//! Nothing else is ever removed, and the level is never set while a conflict
//! remains.

use crate::api::HostApi;
use crate::error::Result;
use crate::host::{AcceptanceLevel, Package};
use crate::outcome::{Message, RuleOutcome};
use crate::rules::interrupted;
use tracing::{debug, info, warn};

/// The only package the resolver may remove to clear a conflict.
pub const TOLERATED_PACKAGE: &str = "smartctl";

/// Rule name used in outcomes and messages.
pub const RULE_NAME: &str = "AcceptanceLevel";

/// Evaluates and remediates the host acceptance level.
pub struct AcceptanceLevelResolver<'a> {
    api: &'a dyn HostApi,
}

impl<'a> AcceptanceLevelResolver<'a> {
    pub fn new(api: &'a dyn HostApi) -> Self {
        Self { api }
    }

    pub async fn resolve(
        &self,
        host: &str,
        target: &AcceptanceLevel,
        enforce: bool,
    ) -> Result<RuleOutcome> {
        let current = self.api.get_acceptance_level(host).await?;
        debug!(host, current = %current, target = %target, "Read acceptance level");

        if &current == target {
            return Ok(RuleOutcome::compliant(
                RULE_NAME,
                Message::info(format!("{} - {}: OK", host, RULE_NAME)),
            ));
        }

        if !enforce {
            return Ok(RuleOutcome::non_compliant(
                RULE_NAME,
                Message::warning(format!(
                    "{} - {}: {} (expected {})",
                    host, RULE_NAME, current, target
                )),
            ));
        }

        let mut messages = Vec::new();
        let mut conflicts = self.conflicting_packages(host).await?;

        if conflicts.iter().any(|p| p.name == TOLERATED_PACKAGE) {
            messages.push(Message::change(format!(
                "{} - {}: removing package {}",
                host, RULE_NAME, TOLERATED_PACKAGE
            )));
            info!(host, package = TOLERATED_PACKAGE, "Removing conflicting package");
            let remaining = match self.api.remove_package(host, TOLERATED_PACKAGE).await {
                Ok(()) => self.conflicting_packages(host).await,
                Err(e) => Err(e),
            };
            conflicts = match remaining {
                Ok(conflicts) => conflicts,
                Err(e) => return Ok(interrupted(host, RULE_NAME, messages, &e)),
            };
        }

        if !conflicts.is_empty() {
            let names: Vec<&str> = conflicts.iter().map(|p| p.name.as_str()).collect();
            warn!(host, packages = ?names, "Acceptance level change blocked by packages");
            messages.push(
                Message::warning(format!(
                    "{} - {}: cannot change {} to {}, blocked by packages: ",
                    host, RULE_NAME, current, target
                ))
                .inline(),
            );
            messages.push(Message::critical(names.join(", ")));
            return Ok(RuleOutcome::from_messages(RULE_NAME, false, messages));
        }

        messages.push(Message::change(format!(
            "{} - {}: changing {} to {}",
            host, RULE_NAME, current, target
        )));
        info!(host, from = %current, to = %target, "Setting acceptance level");
        if let Err(e) = self.api.set_acceptance_level(host, target).await {
            return Ok(interrupted(host, RULE_NAME, messages, &e));
        }

        Ok(RuleOutcome::from_messages(RULE_NAME, true, messages))
    }

    /// Installed packages whose level is outside the permitted set.
    pub async fn conflicting_packages(&self, host: &str) -> Result<Vec<Package>> {
        let packages = self.api.list_packages(host).await?;
        Ok(packages
            .into_iter()
            .filter(|p| !p.acceptance_level.is_permitted())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockHostApi;
    use crate::error::Error;
    use crate::outcome::Severity;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn community(name: &str) -> Package {
        Package::new(name, AcceptanceLevel::CommunitySupported)
    }

    fn certified(name: &str) -> Package {
        Package::new(name, AcceptanceLevel::VMwareCertified)
    }

    #[tokio::test]
    async fn test_target_met_makes_no_further_calls() {
        let mut api = MockHostApi::new();
        api.expect_get_acceptance_level()
            .times(1)
            .returning(|_| Ok(AcceptanceLevel::PartnerSupported));
        api.expect_list_packages().never();
        api.expect_remove_package().never();
        api.expect_set_acceptance_level().never();

        let outcome = AcceptanceLevelResolver::new(&api)
            .resolve("esx01", &AcceptanceLevel::PartnerSupported, true)
            .await
            .unwrap();

        assert!(outcome.compliant);
        assert_eq!(outcome.messages[0].severity, Severity::Info);
    }

    #[tokio::test]
    async fn test_scan_reports_current_level() {
        let mut api = MockHostApi::new();
        api.expect_get_acceptance_level()
            .returning(|_| Ok(AcceptanceLevel::CommunitySupported));
        api.expect_list_packages().never();
        api.expect_set_acceptance_level().never();

        let outcome = AcceptanceLevelResolver::new(&api)
            .resolve("esx01", &AcceptanceLevel::PartnerSupported, false)
            .await
            .unwrap();

        assert!(!outcome.compliant);
        assert_eq!(
            outcome.messages[0].text,
            "esx01 - AcceptanceLevel: CommunitySupported (expected PartnerSupported)"
        );
    }

    #[tokio::test]
    async fn test_no_conflicts_sets_level_once() {
        let mut api = MockHostApi::new();
        api.expect_get_acceptance_level()
            .returning(|_| Ok(AcceptanceLevel::CommunitySupported));
        api.expect_list_packages()
            .times(1)
            .returning(|_| Ok(vec![certified("esx-base")]));
        api.expect_remove_package().never();
        api.expect_set_acceptance_level()
            .withf(|_, level| *level == AcceptanceLevel::PartnerSupported)
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = AcceptanceLevelResolver::new(&api)
            .resolve("esx01", &AcceptanceLevel::PartnerSupported, true)
            .await
            .unwrap();

        assert!(outcome.compliant);
    }

    /// Mock whose package listing reflects whether `smartctl` was removed.
    fn api_with_packages(installed: Vec<Package>) -> (MockHostApi, Arc<AtomicBool>) {
        let removed = Arc::new(AtomicBool::new(false));
        let mut api = MockHostApi::new();
        api.expect_get_acceptance_level()
            .returning(|_| Ok(AcceptanceLevel::CommunitySupported));

        let listed = Arc::clone(&removed);
        api.expect_list_packages().returning(move |_| {
            let gone = listed.load(Ordering::SeqCst);
            Ok(installed
                .iter()
                .filter(|p| !(gone && p.name == TOLERATED_PACKAGE))
                .cloned()
                .collect())
        });

        let flag = Arc::clone(&removed);
        api.expect_remove_package()
            .withf(|_, package| package == "smartctl")
            .times(1)
            .returning(move |_, _| {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            });
        (api, removed)
    }

    #[tokio::test]
    async fn test_only_smartctl_conflict_is_removed_then_level_set() {
        let (mut api, removed) =
            api_with_packages(vec![certified("esx-base"), community("smartctl")]);
        let set_after_removal = Arc::clone(&removed);
        api.expect_set_acceptance_level()
            .withf(move |_, level| {
                *level == AcceptanceLevel::PartnerSupported
                    && set_after_removal.load(Ordering::SeqCst)
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let outcome = AcceptanceLevelResolver::new(&api)
            .resolve("esx01", &AcceptanceLevel::PartnerSupported, true)
            .await
            .unwrap();

        assert!(removed.load(Ordering::SeqCst));
        assert!(outcome.compliant);
        assert_eq!(outcome.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_smartctl_with_other_conflict_never_sets_level() {
        let (mut api, removed) =
            api_with_packages(vec![community("smartctl"), community("other-vib")]);
        api.expect_set_acceptance_level().never();

        let outcome = AcceptanceLevelResolver::new(&api)
            .resolve("esx01", &AcceptanceLevel::PartnerSupported, true)
            .await
            .unwrap();

        assert!(removed.load(Ordering::SeqCst));
        assert!(!outcome.compliant);
        let critical: Vec<_> = outcome
            .messages
            .iter()
            .filter(|m| m.severity == Severity::Critical)
            .collect();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].text, "other-vib");
    }

    #[tokio::test]
    async fn test_conflicts_without_smartctl_make_no_changes() {
        let mut api = MockHostApi::new();
        api.expect_get_acceptance_level()
            .returning(|_| Ok(AcceptanceLevel::CommunitySupported));
        api.expect_list_packages()
            .times(1)
            .returning(|_| Ok(vec![community("net-driver"), community("other-vib")]));
        api.expect_remove_package().never();
        api.expect_set_acceptance_level().never();

        let outcome = AcceptanceLevelResolver::new(&api)
            .resolve("esx01", &AcceptanceLevel::PartnerSupported, true)
            .await
            .unwrap();

        assert!(!outcome.compliant);
        assert!(!outcome.messages[0].hint.newline);
        assert_eq!(outcome.messages[1].text, "net-driver, other-vib");
    }

    #[tokio::test]
    async fn test_failed_level_change_after_removal_keeps_narration() {
        let (mut api, removed) =
            api_with_packages(vec![certified("esx-base"), community("smartctl")]);
        api.expect_set_acceptance_level()
            .times(1)
            .returning(|host, _| Err(Error::host_api(host, "set_acceptance_level", "denied")));

        let outcome = AcceptanceLevelResolver::new(&api)
            .resolve("esx01", &AcceptanceLevel::PartnerSupported, true)
            .await
            .unwrap();

        assert!(removed.load(Ordering::SeqCst));
        assert!(!outcome.compliant);
        let texts: Vec<_> = outcome.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts[..2],
            [
                "esx01 - AcceptanceLevel: removing package smartctl",
                "esx01 - AcceptanceLevel: changing CommunitySupported to PartnerSupported",
            ]
        );
        let last = outcome.messages.last().unwrap();
        assert_eq!(last.severity, Severity::Critical);
        assert!(last.text.contains("denied"));
    }

    #[tokio::test]
    async fn test_failed_relisting_after_removal_keeps_narration() {
        let removed = Arc::new(AtomicBool::new(false));
        let mut api = MockHostApi::new();
        api.expect_get_acceptance_level()
            .returning(|_| Ok(AcceptanceLevel::CommunitySupported));

        let listed = Arc::clone(&removed);
        api.expect_list_packages().returning(move |host| {
            if listed.load(Ordering::SeqCst) {
                Err(Error::host_api(host, "list_packages", "session lost"))
            } else {
                Ok(vec![community("smartctl")])
            }
        });
        let flag = Arc::clone(&removed);
        api.expect_remove_package().times(1).returning(move |_, _| {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        api.expect_set_acceptance_level().never();

        let outcome = AcceptanceLevelResolver::new(&api)
            .resolve("esx01", &AcceptanceLevel::PartnerSupported, true)
            .await
            .unwrap();

        assert!(!outcome.compliant);
        assert_eq!(outcome.messages.len(), 2);
        assert!(outcome.messages[0].text.contains("removing package smartctl"));
        assert_eq!(outcome.messages[1].severity, Severity::Critical);
        assert!(outcome.messages[1].text.contains("session lost"));
    }
}
