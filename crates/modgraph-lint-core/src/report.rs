//! Deterministically ordered rule results.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::{Severity, Violation};

/// Result of checking one graph.
///
/// Violations are sorted on construction: severity (errors first), then
/// source module id, rule name, target and message. Two runs over the same
/// input therefore render byte-identical output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    violations: Vec<Violation>,
    /// Number of modules in the checked graph.
    pub modules_checked: usize,
    /// Number of edges in the checked graph.
    pub edges_checked: usize,
}

fn report_order(a: &Violation, b: &Violation) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| a.from.cmp(&b.from))
        .then_with(|| a.rule.cmp(&b.rule))
        .then_with(|| a.to.cmp(&b.to))
        .then_with(|| a.message.cmp(&b.message))
}

impl Report {
    /// Creates a report, sorting the violations.
    #[must_use]
    pub fn new(
        mut violations: Vec<Violation>,
        modules_checked: usize,
        edges_checked: usize,
    ) -> Self {
        violations.sort_by(report_order);
        Self {
            violations,
            modules_checked,
            edges_checked,
        }
    }

    /// Violations in report order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Counts violations by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |s: Severity| self.violations.iter().filter(|v| v.severity == s).count();
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// One-line totals.
    #[must_use]
    pub fn summary(&self) -> String {
        let (errors, warnings, infos) = self.count_by_severity();
        format!(
            "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {} module(s), {} edge(s)",
            self.modules_checked, self.edges_checked
        )
    }

    /// One line per violation, without colors.
    #[must_use]
    pub fn render_compact(&self) -> String {
        use std::fmt::Write;
        let mut out = String::new();
        for v in &self.violations {
            let _ = writeln!(out, "{v}");
        }
        out
    }
}
