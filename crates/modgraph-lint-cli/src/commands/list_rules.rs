//! List rules command implementation.

use modgraph_lint_core::config::presets::{minimal_rules, recommended_rules};
use modgraph_lint_core::engine::{ELEMENT_TYPES, NO_IGNORED, NO_UNKNOWN};

/// Runs the list-rules command.
pub fn run() {
    println!("Built-in rules:\n");
    println!("{:<28} Description", "Name");
    println!("{}", "-".repeat(80));

    for rule in recommended_rules() {
        println!(
            "{:<28} {}",
            rule.name,
            rule.comment.as_deref().unwrap_or_default()
        );
    }

    println!("\nBoundary rules ([boundaries]):");
    println!("{ELEMENT_TYPES:<28} Element pairs must be permitted by allow/disallow/default");
    println!("{NO_UNKNOWN:<28} Imports must target a classified module (no_unknown = true)");
    println!("{NO_IGNORED:<28} Imports must not target ignored modules (no_ignored = true)");

    let minimal: Vec<String> = minimal_rules().into_iter().map(|r| r.name).collect();
    println!("\nPresets:");
    println!("  recommended  - all five built-in rules (default)");
    println!("  minimal      - {} (for gradual adoption)", minimal.join(", "));
    println!("  none         - only rules declared in [[forbidden]]");

    println!("\nOverride a built-in rule by declaring [[forbidden]] with the same name,");
    println!("or switch it off with severity = \"off\".");
}
