//! Shared output formatting for reports.

use anyhow::Result;
use modgraph_lint_core::{Report, Severity};
use std::io::IsTerminal;

use crate::OutputFormat;

/// Print a report in the specified format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print!("{}", report.render_compact()),
    }
    Ok(())
}

fn print_text(report: &Report) {
    if !std::io::stdout().is_terminal() {
        for violation in report.violations() {
            println!("{}", violation.format());
        }
        println!("{}", report.summary());
        return;
    }

    let (errors, warnings, _) = report.count_by_severity();

    for violation in report.violations() {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        match &violation.to {
            Some(to) => println!("{} {} -> {}", violation.rule, violation.from, to),
            None => println!("{} {}", violation.rule, violation.from),
        }
        println!("  {}: {}", severity_indicator, violation.message);
        if let Some(comment) = &violation.comment {
            println!("  = note: {comment}");
        }
        println!();
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!("{}{}\x1b[0m", summary_color, report.summary());
}

fn print_json(report: &Report) -> Result<()> {
    let (errors, warnings, infos) = report.count_by_severity();
    let value = serde_json::json!({
        "passed": !report.has_errors(),
        "summary": {
            "errors": errors,
            "warnings": warnings,
            "infos": infos,
            "modules": report.modules_checked,
            "edges": report.edges_checked,
        },
        "violations": report.violations(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
