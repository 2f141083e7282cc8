//! Built-in rule presets.
//!
//! Presets are expressed as DTOs so that they pass through the same
//! validation as user configuration.

use super::config_dto::{ForbiddenDto, FromDto, ToDto};

/// Name of the unresolvable-import rule.
pub const NOT_TO_UNRESOLVABLE: &str = "not-to-unresolvable";
/// Name of the circular-dependency rule.
pub const NO_CIRCULAR: &str = "no-circular";
/// Name of the orphan-module rule.
pub const NO_ORPHANS: &str = "no-orphans";
/// Name of the dev-dependency rule.
pub const NOT_TO_DEV_DEP: &str = "not-to-dev-dep";
/// Name of the deprecated-package rule.
pub const NO_DEPRECATED: &str = "no-deprecated";

/// Modules allowed to import development-only packages.
pub const DEV_DEP_ALLOW_PATTERN: &str =
    r"(\.(spec|test)\.(ts|tsx)$|^src/test/|-env\.d\.ts$|test-helpers\.ts$)";

/// Preset configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// All five structural rules.
    Recommended,
    /// Unresolvable imports and cycles only, for gradual adoption.
    Minimal,
    /// No built-in rules.
    None,
}

impl Preset {
    /// Looks up a preset by configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "recommended" => Some(Self::Recommended),
            "minimal" => Some(Self::Minimal),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Configuration name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Recommended => "recommended",
            Self::Minimal => "minimal",
            Self::None => "none",
        }
    }

    /// Returns the rules for this preset.
    #[must_use]
    pub fn rules(self) -> Vec<ForbiddenDto> {
        match self {
            Self::Recommended => recommended_rules(),
            Self::Minimal => minimal_rules(),
            Self::None => Vec::new(),
        }
    }
}

fn rule(name: &str, comment: &str, from: FromDto, to: ToDto) -> ForbiddenDto {
    ForbiddenDto {
        name: name.to_string(),
        severity: "error".to_string(),
        comment: Some(comment.to_string()),
        from,
        to,
    }
}

fn not_to_unresolvable() -> ForbiddenDto {
    rule(
        NOT_TO_UNRESOLVABLE,
        "Imports must resolve to an existing module",
        FromDto::default(),
        ToDto {
            could_not_resolve: Some(true),
            ..ToDto::default()
        },
    )
}

fn no_circular() -> ForbiddenDto {
    rule(
        NO_CIRCULAR,
        "Modules must not depend on each other in a cycle",
        FromDto::default(),
        ToDto {
            circular: Some(true),
            ..ToDto::default()
        },
    )
}

/// Returns the recommended set of rules.
///
/// Includes:
/// - `not-to-unresolvable` - every import resolves
/// - `no-circular` - no cycles through internal imports
/// - `no-orphans` - every module under `src` is connected
/// - `not-to-dev-dep` - production code avoids dev-only packages
/// - `no-deprecated` - no deprecated packages
#[must_use]
pub fn recommended_rules() -> Vec<ForbiddenDto> {
    vec![
        not_to_unresolvable(),
        no_circular(),
        rule(
            NO_ORPHANS,
            "Modules under src must import or be imported by another module",
            FromDto {
                path: Some("^src".to_string()),
                path_not: Some(r"/types\.ts$".to_string()),
                orphan: Some(true),
            },
            ToDto::default(),
        ),
        rule(
            NOT_TO_DEV_DEP,
            "Production code must not depend on devDependencies",
            FromDto {
                path_not: Some(DEV_DEP_ALLOW_PATTERN.to_string()),
                ..FromDto::default()
            },
            ToDto {
                dependency_types: vec!["npm-dev".to_string()],
                ..ToDto::default()
            },
        ),
        rule(
            NO_DEPRECATED,
            "Deprecated packages must be replaced",
            FromDto::default(),
            ToDto {
                dependency_types: vec!["deprecated".to_string()],
                ..ToDto::default()
            },
        ),
    ]
}

/// Returns the minimal set of rules.
#[must_use]
pub fn minimal_rules() -> Vec<ForbiddenDto> {
    vec![not_to_unresolvable(), no_circular()]
}
