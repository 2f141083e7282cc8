//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const CONFIG_NAME: &str = "modgraph-lint.toml";

const DEFAULT_CONFIG: &str = r#"# modgraph-lint configuration

# Built-in forbidden rules: "recommended" (default), "minimal" or "none".
# recommended = not-to-unresolvable, no-circular, no-orphans,
#               not-to-dev-dep, no-deprecated
preset = "recommended"

[options]
# Evaluate rules on all cores
parallel = false

# Element classification, first match wins
[[elements]]
type = "app"
pattern = "^src/app"

[[elements]]
type = "features"
pattern = "^src/features"

[[elements]]
type = "shared"
pattern = "^src/shared"

[boundaries]
# Verdict for element pairs not listed below: "allow" or "disallow"
default = "allow"
severity = "error"
# Flag imports of modules that belong to no element
no_unknown = true
# Flag imports of modules excluded by `ignore`
no_ignored = true
ignore = ["**/*.test.ts", "**/*.test.tsx", "**/*.spec.ts", "**/*.spec.tsx"]

[[boundaries.disallow]]
from = "shared"
to = ["features", "app"]

[[boundaries.disallow]]
from = "features"
to = ["app"]

# Preset rules can be overridden by name or switched off:
#
# [[forbidden]]
# name = "no-orphans"
# severity = "warn"
# from = { orphan = true, path = "^src", path_not = "/types\\.ts$" }
#
# [[forbidden]]
# name = "no-deprecated"
# severity = "off"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(config_path, DEFAULT_CONFIG)?;

    println!("Created {CONFIG_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to match your source layout");
    println!("  2. Export your import graph as JSON (modules or edges)");
    println!("  3. Run: modgraph-lint check deps.json");

    Ok(())
}
