//! Check command implementation.

use anyhow::{Context, Result};
use modgraph_lint_core::{InputDocument, RuleEngine};
use std::path::Path;

use crate::config_resolver;
use crate::OutputFormat;

/// Runs the check command and returns whether the graph passed.
///
/// Rules are loaded and validated before the input is touched, so a bad
/// configuration never produces a partial report.
pub fn run(
    input: &Path,
    format: OutputFormat,
    project: &Path,
    explicit_config: Option<&Path>,
) -> Result<bool> {
    let config = config_resolver::load(project, explicit_config)?;
    let rules = config.rules;
    if rules.is_empty() {
        tracing::warn!("No rules enabled in {}; the report will be empty", config.source);
    }
    let document = read_input(input)?;

    tracing::info!(
        "Checking {} import records against {} rules",
        document.record_count(),
        rules.forbidden().len() + usize::from(rules.boundaries().is_some())
    );

    let graph = document.into_graph();
    let report = RuleEngine::new(rules).check(&graph);

    super::output::print(&report, format)?;

    Ok(!report.has_errors())
}

fn read_input(input: &Path) -> Result<InputDocument> {
    if input == Path::new("-") {
        let content =
            std::io::read_to_string(std::io::stdin()).context("Failed to read input from stdin")?;
        return InputDocument::parse(&content).context("Failed to parse input from stdin");
    }
    InputDocument::from_file(input)
        .with_context(|| format!("Failed to load input: {}", input.display()))
}
