//! Output formatting module for esxi-harden
//!
//! Renders the messages of a [`ComplianceReport`] with colors. Info messages are
//! only shown in verbose mode; warnings and criticals are always shown.

use colored::Colorize;
use esxi_harden::config::Mode;
use esxi_harden::outcome::{Color, Message, Severity};
use esxi_harden::report::ComplianceReport;

/// Output formatter for the compliance log
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();

        Self {
            use_color,
            verbosity,
        }
    }

    /// Returns true if the message passes the verbosity filter.
    pub fn shows(&self, message: &Message) -> bool {
        message.severity > Severity::Info || self.verbosity >= 1
    }

    /// Header announcing the run mode
    pub fn banner(&self, mode: Mode) -> String {
        let title = match mode {
            Mode::Scan => "SCAN MODE - NO CHANGES WILL BE MADE",
            Mode::Fix => "FIX MODE - NON-COMPLIANT SETTINGS WILL BE CHANGED",
        };
        let line = "=".repeat(title.len() + 4);
        if self.use_color {
            format!(
                "{}\n{}\n{}\n",
                line.bright_blue(),
                format!("  {}  ", title).bright_blue().bold(),
                line.bright_blue()
            )
        } else {
            format!("{}\n  {}  \n{}\n", line, title, line)
        }
    }

    /// Render a single message, without the trailing line break.
    pub fn message(&self, message: &Message) -> String {
        if !self.use_color {
            return message.text.clone();
        }

        let text = message.text.as_str();
        let colored = match message.hint.color {
            Color::Green => text.green(),
            Color::Yellow => text.yellow(),
            Color::Red => text.red(),
            Color::Cyan => text.cyan(),
        };
        if message.severity == Severity::Critical {
            colored.bold().to_string()
        } else {
            colored.to_string()
        }
    }

    /// Render the whole report: every visible message followed by the summary.
    pub fn report(&self, report: &ComplianceReport) -> String {
        let mut out = String::new();

        if self.verbosity >= 1 {
            for host in report.skipped() {
                let line = format!("{} - skipped, cluster pending configuration", host);
                out.push_str(&self.colorize_muted(&line));
                out.push('\n');
            }
        }

        for result in report.results() {
            let mut open_line = false;
            for message in result.messages() {
                if !self.shows(message) {
                    continue;
                }
                out.push_str(&self.message(message));
                open_line = !message.hint.newline;
                if !open_line {
                    out.push('\n');
                }
            }
            if open_line {
                out.push('\n');
            }
        }

        out.push('\n');
        out.push_str(&self.summary(report));
        out.push('\n');
        out
    }

    /// Final summary line
    pub fn summary(&self, report: &ComplianceReport) -> String {
        let summary = report.summary();
        if !self.use_color {
            summary
        } else if report.is_compliant() {
            summary.green().bold().to_string()
        } else {
            summary.red().bold().to_string()
        }
    }

    fn colorize_muted(&self, text: &str) -> String {
        if self.use_color {
            text.bright_black().to_string()
        } else {
            text.to_string()
        }
    }
}
