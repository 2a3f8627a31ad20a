//! Rule outcomes and the messages they carry.
//!
//! Every rule produces exactly one [`RuleOutcome`]. Messages are write-once and
//! only consumed by presentation code; the compliant flag alone drives the
//! host-level verdict.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Setting already at target, only shown in verbose output
    Info,
    /// Setting off target, or a change being applied
    Warning,
    /// Remediation blocked or a rule failed
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Terminal color suggested for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Yellow,
    Red,
    Cyan,
}

/// How a message would like to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayHint {
    pub color: Color,
    /// End the line after this message; `false` lets the next message continue it
    pub newline: bool,
}

/// A single log line produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub severity: Severity,
    pub hint: DisplayHint,
}

impl Message {
    fn new(text: impl Into<String>, severity: Severity, color: Color) -> Self {
        Self {
            text: text.into(),
            severity,
            hint: DisplayHint {
                color,
                newline: true,
            },
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Info, Color::Green)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Warning, Color::Yellow)
    }

    /// Warning announcing a change that is about to be applied.
    pub fn change(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Warning, Color::Cyan)
    }

    pub fn critical(text: impl Into<String>) -> Self {
        Self::new(text, Severity::Critical, Color::Red)
    }

    /// Keep the cursor on the same line after rendering.
    pub fn inline(mut self) -> Self {
        self.hint.newline = false;
        self
    }
}

/// Result of evaluating one rule against one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Rule (setting or service) name
    pub rule: String,
    pub compliant: bool,
    pub messages: Vec<Message>,
}

impl RuleOutcome {
    pub fn compliant(rule: impl Into<String>, message: Message) -> Self {
        Self {
            rule: rule.into(),
            compliant: true,
            messages: vec![message],
        }
    }

    pub fn non_compliant(rule: impl Into<String>, message: Message) -> Self {
        Self {
            rule: rule.into(),
            compliant: false,
            messages: vec![message],
        }
    }

    /// Build an outcome from messages collected while remediating.
    pub fn from_messages(rule: impl Into<String>, compliant: bool, messages: Vec<Message>) -> Self {
        Self {
            rule: rule.into(),
            compliant,
            messages,
        }
    }
}

/// Verdict for one processed host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostResult {
    pub host: String,
    /// True iff every outcome is compliant
    pub compliant: bool,
    pub outcomes: Vec<RuleOutcome>,
}

impl HostResult {
    /// Aggregate rule outcomes into a host verdict.
    pub fn from_outcomes(host: impl Into<String>, outcomes: Vec<RuleOutcome>) -> Self {
        let compliant = outcomes.iter().all(|o| o.compliant);
        Self {
            host: host.into(),
            compliant,
            outcomes,
        }
    }

    /// All messages in evaluation order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.outcomes.iter().flat_map(|o| o.messages.iter())
    }

    /// Names of the rules that were not compliant.
    pub fn failed_rules(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.compliant)
            .map(|o| o.rule.as_str())
            .collect()
    }
}
