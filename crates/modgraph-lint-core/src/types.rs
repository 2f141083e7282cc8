//! Core types for rule violations.

use serde::{Deserialize, Serialize};

/// Severity level for rule violations.
///
/// Ordered so that `Error` is the greatest; reports list the greatest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail the run.
    Info,
    /// Warning that should be addressed, does not fail the run.
    Warning,
    /// Error that must be fixed; fails the run.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single rule breach found in the dependency graph.
///
/// Edge-level violations carry both `from` and `to`; module-level
/// violations (orphans) leave `to` empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule name (e.g., "no-circular").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Id of the source module.
    pub from: String,
    /// Id of the target module, or the raw specifier when unresolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Free-form explanation attached to the rule in configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        severity: Severity,
        from: impl Into<String>,
        to: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity,
            from: from.into(),
            to,
            message: message.into(),
            comment: None,
        }
    }

    /// Attaches the rule's configured comment.
    #[must_use]
    pub fn with_comment(mut self, comment: Option<&str>) -> Self {
        self.comment = comment.map(str::to_owned);
        self
    }

    /// Formats the violation for multi-line terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = match &self.to {
            Some(to) => format!("{} {} -> {}\n", self.rule, self.from, to),
            None => format!("{} {}\n", self.rule, self.from),
        };
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if let Some(comment) = &self.comment {
            let _ = writeln!(output, "  = note: {comment}");
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.from)?;
        if let Some(to) = &self.to {
            write!(f, " -> {to}")?;
        }
        write!(f, ": {} [{}] {}", self.severity, self.rule, self.message)
    }
}
