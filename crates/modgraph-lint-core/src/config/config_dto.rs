//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to domain model types via the loader.
//! Field names follow snake case; the camelCase spellings used by
//! dependency-cruiser configs are accepted as aliases.

use serde::Deserialize;

/// Raw TOML representation of a configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDto {
    /// Built-in rule preset (`recommended`, `minimal`, `none`).
    #[serde(default)]
    pub preset: Option<String>,

    /// Engine switches.
    #[serde(default)]
    pub options: OptionsDto,

    /// Ordered classification rules.
    #[serde(default)]
    pub elements: Vec<ElementDto>,

    /// Element boundary policy.
    #[serde(default)]
    pub boundaries: Option<BoundariesDto>,

    /// Forbidden-dependency rules.
    #[serde(default)]
    pub forbidden: Vec<ForbiddenDto>,
}

/// TOML representation of `[options]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsDto {
    /// Evaluate rules in parallel.
    #[serde(default)]
    pub parallel: bool,
}

/// TOML representation of one `[[elements]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementDto {
    /// Element name (e.g., "features").
    #[serde(rename = "type")]
    pub element: String,
    /// Regular expression tested against module ids.
    pub pattern: String,
}

/// TOML representation of `[boundaries]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoundariesDto {
    /// Verdict for unlisted pairs: "allow" (default) or "disallow".
    #[serde(default = "default_boundary_verdict")]
    pub default: String,
    /// Severity for all boundary violations (default: "error").
    #[serde(default = "default_severity_str")]
    pub severity: String,
    /// Flag edges into unclassified modules.
    #[serde(default, alias = "no-unknown")]
    pub no_unknown: bool,
    /// Flag edges into ignored modules.
    #[serde(default, alias = "no-ignored")]
    pub no_ignored: bool,
    /// Globs for modules excluded from boundary checks.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Explicitly permitted element relations.
    #[serde(default)]
    pub allow: Vec<RelationDto>,
    /// Explicitly forbidden element relations.
    #[serde(default)]
    pub disallow: Vec<RelationDto>,
}

/// TOML representation of an element relation.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationDto {
    /// Source element.
    pub from: String,
    /// Target elements.
    pub to: Vec<String>,
}

/// TOML representation of one `[[forbidden]]` rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForbiddenDto {
    /// Rule name (e.g., "no-circular").
    pub name: String,
    /// Severity: "error" (default), "warn", "info" or "off".
    #[serde(default = "default_severity_str")]
    pub severity: String,
    /// Explanation attached to every violation.
    #[serde(default)]
    pub comment: Option<String>,
    /// Source-module predicates.
    #[serde(default)]
    pub from: FromDto,
    /// Edge predicates.
    #[serde(default)]
    pub to: ToDto,
}

/// TOML representation of a rule's `from` side.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FromDto {
    /// Module id must match.
    #[serde(default)]
    pub path: Option<String>,
    /// Module id must not match.
    #[serde(default, alias = "pathNot")]
    pub path_not: Option<String>,
    /// Module must (or must not) be an orphan.
    #[serde(default)]
    pub orphan: Option<bool>,
}

/// TOML representation of a rule's `to` side.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToDto {
    /// Target must match.
    #[serde(default)]
    pub path: Option<String>,
    /// Target must not match.
    #[serde(default, alias = "pathNot")]
    pub path_not: Option<String>,
    /// Edge must (or must not) lie on a cycle.
    #[serde(default)]
    pub circular: Option<bool>,
    /// Edge must (or must not) be unresolvable.
    #[serde(default, alias = "couldNotResolve")]
    pub could_not_resolve: Option<bool>,
    /// Edge kind must be one of these.
    #[serde(default, alias = "dependencyTypes")]
    pub dependency_types: Vec<String>,
}

pub(crate) fn default_severity_str() -> String {
    "error".to_string()
}

fn default_boundary_verdict() -> String {
    "allow".to_string()
}
