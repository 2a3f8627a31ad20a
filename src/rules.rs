//! Rule evaluation for scalar settings and host services.
//!
//! Each rule reads the current state of one catalog entry, compares it with the
//! target and, when enforcing, applies the target through the [`HostApi`]. Changes
//! are narrated in the outcome before they are applied and are trusted once the
//! call returns; nothing is read back.

use crate::acceptance::AcceptanceLevelResolver;
use crate::api::HostApi;
use crate::baseline::{SettingSpec, Target};
use crate::error::{Error, Result};
use crate::host::{ServicePolicy, SettingValue};
use crate::outcome::{Message, RuleOutcome};
use tracing::{debug, info, warn};

/// Evaluates scalar and service catalog entries against a host.
pub struct RuleEvaluator<'a> {
    api: &'a dyn HostApi,
}

impl<'a> RuleEvaluator<'a> {
    pub fn new(api: &'a dyn HostApi) -> Self {
        Self { api }
    }

    /// Evaluate one catalog entry, remediating when `enforce` is set.
    ///
    /// Acceptance-level entries are handed to [`AcceptanceLevelResolver`].
    pub async fn evaluate(
        &self,
        host: &str,
        spec: &SettingSpec,
        enforce: bool,
    ) -> Result<RuleOutcome> {
        match &spec.target {
            Target::Setting(target) => {
                self.evaluate_setting(host, &spec.name, target, enforce)
                    .await
            }
            Target::ServiceDisabled => {
                self.evaluate_service_disabled(host, &spec.name, enforce)
                    .await
            }
            Target::ServiceEnabled {
                require_ntp_servers,
            } => {
                self.evaluate_service_enabled(host, &spec.name, *require_ntp_servers, enforce)
                    .await
            }
            Target::AcceptanceLevel(level) => {
                AcceptanceLevelResolver::new(self.api)
                    .resolve(host, level, enforce)
                    .await
            }
        }
    }

    async fn evaluate_setting(
        &self,
        host: &str,
        name: &str,
        target: &SettingValue,
        enforce: bool,
    ) -> Result<RuleOutcome> {
        let current = self.api.get_setting(host, name).await?;
        debug!(host, setting = name, current = %current, target = %target, "Read setting");

        if current.matches(target) {
            return Ok(RuleOutcome::compliant(
                name,
                Message::info(format!("{} - {}: OK", host, name)),
            ));
        }

        if !enforce {
            return Ok(RuleOutcome::non_compliant(
                name,
                Message::warning(format!(
                    "{} - {}: {} (expected {})",
                    host, name, current, target
                )),
            ));
        }

        let message = Message::change(format!(
            "{} - {}: changing {} to {}",
            host, name, current, target
        ));
        info!(host, setting = name, from = %current, to = %target, "Applying setting");
        if let Err(e) = self.api.set_setting(host, name, target).await {
            return Ok(interrupted(host, name, vec![message], &e));
        }

        Ok(RuleOutcome::compliant(name, message))
    }

    /// Service must be stopped with a manual startup policy.
    ///
    /// When enforcing, a running service is stopped even if changing its policy
    /// failed; the failed policy change still makes the rule non-compliant.
    async fn evaluate_service_disabled(
        &self,
        host: &str,
        service: &str,
        enforce: bool,
    ) -> Result<RuleOutcome> {
        let state = self.api.get_service_state(host, service).await?;
        debug!(host, service, policy = %state.policy, running = state.running, "Read service state");

        let policy_ok = state.policy == ServicePolicy::Off;
        if policy_ok && !state.running {
            return Ok(RuleOutcome::compliant(
                service,
                Message::info(format!("{} - {}: OK", host, service)),
            ));
        }

        if !enforce {
            let running = if state.running { "running" } else { "stopped" };
            return Ok(RuleOutcome::non_compliant(
                service,
                Message::warning(format!(
                    "{} - {}: policy {}, {} (expected policy off, stopped)",
                    host, service, state.policy, running
                )),
            ));
        }

        let mut messages = Vec::new();
        let mut compliant = true;

        if !policy_ok {
            messages.push(Message::change(format!(
                "{} - {}: changing policy {} to off",
                host, service, state.policy
            )));
            info!(host, service, from = %state.policy, "Disabling service startup");
            if let Err(e) = self
                .api
                .set_service_policy(host, service, ServicePolicy::Off)
                .await
            {
                warn!(host, service, error = %e, "Failed to change service policy");
                messages.push(Message::critical(format!(
                    "{} - {}: failed to change policy: {}",
                    host, service, e
                )));
                compliant = false;
            }
        }

        if state.running {
            messages.push(Message::change(format!(
                "{} - {}: stopping service",
                host, service
            )));
            info!(host, service, "Stopping service");
            if let Err(e) = self.api.stop_service(host, service).await {
                return Ok(interrupted(host, service, messages, &e));
            }
        }

        Ok(RuleOutcome::from_messages(service, compliant, messages))
    }

    /// Service must start with the host.
    async fn evaluate_service_enabled(
        &self,
        host: &str,
        service: &str,
        require_ntp_servers: bool,
        enforce: bool,
    ) -> Result<RuleOutcome> {
        let state = self.api.get_service_state(host, service).await?;
        debug!(host, service, policy = %state.policy, running = state.running, "Read service state");

        if state.policy == ServicePolicy::On {
            return Ok(RuleOutcome::compliant(
                service,
                Message::info(format!("{} - {}: OK", host, service)),
            ));
        }

        if !enforce {
            return Ok(RuleOutcome::non_compliant(
                service,
                Message::warning(format!(
                    "{} - {}: policy {} (expected on)",
                    host, service, state.policy
                )),
            ));
        }

        if require_ntp_servers {
            match self.api.get_ntp_servers(host).await {
                Ok(servers) if !servers.is_empty() => {
                    debug!(host, service, servers = ?servers, "NTP servers configured");
                }
                Ok(_) => {
                    warn!(host, service, "No NTP servers configured, not enabling");
                    return Ok(RuleOutcome::non_compliant(
                        service,
                        Message::warning(format!(
                            "{} - {}: no NTP servers configured, not enabling",
                            host, service
                        )),
                    ));
                }
                Err(e) => {
                    warn!(host, service, error = %e, "Unable to read NTP servers, not enabling");
                    return Ok(RuleOutcome::non_compliant(
                        service,
                        Message::warning(format!(
                            "{} - {}: unable to read NTP servers ({}), not enabling",
                            host, service, e
                        )),
                    ));
                }
            }
        }

        let message = Message::change(format!(
            "{} - {}: changing policy {} to on",
            host, service, state.policy
        ));
        info!(host, service, from = %state.policy, "Enabling service startup");
        if let Err(e) = self
            .api
            .set_service_policy(host, service, ServicePolicy::On)
            .await
        {
            return Ok(interrupted(host, service, vec![message], &e));
        }

        Ok(RuleOutcome::compliant(service, message))
    }
}

/// Close a rule whose remediation failed part-way.
///
/// Changes already announced in `messages` may have been applied, so they are
/// kept and the failure is appended after them.
pub(crate) fn interrupted(
    host: &str,
    rule: &str,
    mut messages: Vec<Message>,
    error: &Error,
) -> RuleOutcome {
    warn!(host, rule, error = %error, "Remediation interrupted");
    messages.push(Message::critical(format!("{} - {}: {}", host, rule, error)));
    RuleOutcome::from_messages(rule, false, messages)
}
