//! DTO → Domain model conversion with validation.

use tracing::debug;

use crate::graph::{DependencyKind, UnknownKind};
use crate::types::Severity;

use super::config_dto::{BoundariesDto, ConfigDto, ElementDto, ForbiddenDto, RelationDto};
use super::model::{
    BoundaryDefault, BoundaryPolicy, EdgeFilter, ElementName, ElementPattern, ElementRelation,
    EngineOptions, ForbiddenRule, GlobPattern, ModelError, ModuleFilter, PathPattern, RuleSet,
};
use super::presets::Preset;

/// Errors during DTO → Domain conversion.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A field-level validation error.
    #[error("{context}: {source}")]
    Validation {
        /// Where the error occurred (e.g., "elements[0].pattern").
        context: String,
        /// The underlying model error.
        source: ModelError,
    },

    /// Unknown severity string.
    #[error("{context}: unknown severity `{value}`, expected: error, warn, info, off")]
    UnknownSeverity {
        /// Where the error occurred.
        context: String,
        /// The invalid value.
        value: String,
    },

    /// Unknown dependency type in a `dependency_types` list.
    #[error("{context}: {source}")]
    UnknownDependencyType {
        /// Where the error occurred.
        context: String,
        /// The parse error.
        source: UnknownKind,
    },

    /// Unknown preset name.
    #[error("unknown preset `{0}`, expected: recommended, minimal, none")]
    UnknownPreset(String),

    /// Unknown boundary default verdict.
    #[error("boundaries.default: unknown value `{0}`, expected: allow, disallow")]
    UnknownBoundaryDefault(String),

    /// Cross-reference errors from aggregate root construction.
    #[error("configuration validation errors:\n{}", format_errors(.0))]
    CrossRef(Vec<ModelError>),
}

fn format_errors(errors: &[ModelError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Converts a `ConfigDto` to a validated `RuleSet`.
///
/// Preset rules come first; a user rule with the same name replaces the
/// preset rule in place, other user rules are appended. Two user rules
/// sharing a name are rejected. Rules whose severity is `off` are dropped.
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: ConfigDto) -> Result<RuleSet, LoadError> {
    let preset = match dto.preset.as_deref() {
        None => Preset::Recommended,
        Some(name) => {
            Preset::from_name(name).ok_or_else(|| LoadError::UnknownPreset(name.to_string()))?
        }
    };

    let elements = dto
        .elements
        .iter()
        .enumerate()
        .map(|(i, e)| convert_element(e, i))
        .collect::<Result<Vec<_>, _>>()?;

    let mut forbidden = Vec::new();
    for rule in merge_rules(preset.rules(), dto.forbidden)? {
        if let Some(converted) = convert_forbidden(rule)? {
            forbidden.push(converted);
        }
    }

    let boundaries = dto.boundaries.map(convert_boundaries).transpose()?.flatten();

    debug!(
        "Loaded {} element patterns and {} rules (preset: {})",
        elements.len(),
        forbidden.len(),
        preset.name()
    );

    RuleSet::new(
        elements,
        forbidden,
        boundaries,
        EngineOptions {
            parallel: dto.options.parallel,
        },
    )
    .map_err(LoadError::CrossRef)
}

fn merge_rules(
    base: Vec<ForbiddenDto>,
    overrides: Vec<ForbiddenDto>,
) -> Result<Vec<ForbiddenDto>, LoadError> {
    let preset_len = base.len();
    let mut merged = base;
    let mut overridden = vec![false; preset_len];
    let mut duplicates = Vec::new();

    for rule in overrides {
        let Some(pos) = merged.iter().position(|r| r.name == rule.name) else {
            merged.push(rule);
            continue;
        };
        if pos < preset_len && !overridden[pos] {
            overridden[pos] = true;
            merged[pos] = rule;
        } else if !duplicates.contains(&rule.name) {
            duplicates.push(rule.name);
        }
    }

    if duplicates.is_empty() {
        Ok(merged)
    } else {
        Err(LoadError::CrossRef(
            duplicates
                .into_iter()
                .map(|name| ModelError::DuplicateRule { name })
                .collect(),
        ))
    }
}

fn convert_element(dto: &ElementDto, index: usize) -> Result<ElementPattern, LoadError> {
    let ctx = format!("elements[{index}]");
    let element = ElementName::new(&dto.element).map_err(|e| LoadError::Validation {
        context: format!("{ctx}.type"),
        source: e,
    })?;
    let pattern = PathPattern::new(&dto.pattern).map_err(|e| LoadError::Validation {
        context: format!("{ctx}.pattern"),
        source: e,
    })?;
    Ok(ElementPattern::new(element, pattern))
}

fn convert_pattern(
    value: Option<&str>,
    context: String,
) -> Result<Option<PathPattern>, LoadError> {
    value
        .map(|p| {
            PathPattern::new(p).map_err(|e| LoadError::Validation {
                context,
                source: e,
            })
        })
        .transpose()
}

fn convert_forbidden(dto: ForbiddenDto) -> Result<Option<ForbiddenRule>, LoadError> {
    let ctx = format!("forbidden '{}'", dto.name);
    let Some(severity) = parse_severity(&dto.severity, &ctx)? else {
        debug!("Rule {} is off", dto.name);
        return Ok(None);
    };

    let from = ModuleFilter::new(
        convert_pattern(dto.from.path.as_deref(), format!("{ctx} from.path"))?,
        convert_pattern(dto.from.path_not.as_deref(), format!("{ctx} from.path_not"))?,
        dto.from.orphan,
    );

    let dependency_types = dto
        .to
        .dependency_types
        .iter()
        .enumerate()
        .map(|(i, t)| {
            t.parse::<DependencyKind>()
                .map_err(|e| LoadError::UnknownDependencyType {
                    context: format!("{ctx} to.dependency_types[{i}]"),
                    source: e,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let to = EdgeFilter::new(
        convert_pattern(dto.to.path.as_deref(), format!("{ctx} to.path"))?,
        convert_pattern(dto.to.path_not.as_deref(), format!("{ctx} to.path_not"))?,
        dto.to.circular,
        dto.to.could_not_resolve,
        dependency_types,
    );

    ForbiddenRule::new(dto.name, severity, dto.comment, from, to)
        .map(Some)
        .map_err(|e| LoadError::Validation {
            context: ctx,
            source: e,
        })
}

fn convert_relations(
    dtos: &[RelationDto],
    field: &str,
) -> Result<Vec<ElementRelation>, LoadError> {
    dtos.iter()
        .enumerate()
        .map(|(i, r)| {
            let ctx = format!("boundaries.{field}[{i}]");
            let from = ElementName::new(&r.from).map_err(|e| LoadError::Validation {
                context: format!("{ctx}.from"),
                source: e,
            })?;
            let to = r
                .to
                .iter()
                .enumerate()
                .map(|(j, t)| {
                    ElementName::new(t).map_err(|e| LoadError::Validation {
                        context: format!("{ctx}.to[{j}]"),
                        source: e,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ElementRelation::new(from, to))
        })
        .collect()
}

fn convert_boundaries(dto: BoundariesDto) -> Result<Option<BoundaryPolicy>, LoadError> {
    let default = match dto.default.as_str() {
        "allow" => BoundaryDefault::Allow,
        "disallow" => BoundaryDefault::Disallow,
        other => return Err(LoadError::UnknownBoundaryDefault(other.to_string())),
    };
    let Some(severity) = parse_severity(&dto.severity, "boundaries")? else {
        debug!("Boundary checks are off");
        return Ok(None);
    };

    let ignore = dto
        .ignore
        .iter()
        .enumerate()
        .map(|(i, g)| {
            GlobPattern::new(g).map_err(|e| LoadError::Validation {
                context: format!("boundaries.ignore[{i}]"),
                source: e,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(BoundaryPolicy::new(
        default,
        convert_relations(&dto.allow, "allow")?,
        convert_relations(&dto.disallow, "disallow")?,
        ignore,
        dto.no_unknown,
        dto.no_ignored,
        severity,
    )))
}

/// Parses a severity string; `off` / `ignore` yield `None`.
fn parse_severity(value: &str, context: &str) -> Result<Option<Severity>, LoadError> {
    match value {
        "error" => Ok(Some(Severity::Error)),
        "warn" | "warning" => Ok(Some(Severity::Warning)),
        "info" => Ok(Some(Severity::Info)),
        "off" | "ignore" => Ok(None),
        _ => Err(LoadError::UnknownSeverity {
            context: context.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::RuleScope;

    fn parse_and_load(toml_str: &str) -> Result<RuleSet, LoadError> {
        let dto: ConfigDto = toml::from_str(toml_str).unwrap();
        load(dto)
    }

    // -- Happy path --

    #[test]
    fn empty_config_uses_recommended_preset() {
        let rules = parse_and_load("").unwrap();
        assert_eq!(rules.forbidden().len(), 5);
        assert!(rules.elements().is_empty());
        assert!(rules.boundaries().is_none());
    }

    #[test]
    fn preset_none_has_no_rules() {
        let rules = parse_and_load(r#"preset = "none""#).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn load_full_config() {
        let rules = parse_and_load(
            r#"
preset = "minimal"

[options]
parallel = true

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
default = "disallow"
no_unknown = true
ignore = ["**/*.test.ts"]

[[boundaries.allow]]
from = "app"
to = ["features", "shared"]

[[boundaries.allow]]
from = "features"
to = ["shared"]

[[forbidden]]
name = "no-orphans"
severity = "warn"
from = { orphan = true, path = "^src" }
"#,
        )
        .unwrap();

        assert!(rules.options().parallel);
        assert_eq!(rules.elements().len(), 3);
        assert_eq!(rules.elements()[1].element().as_str(), "features");
        assert_eq!(rules.forbidden().len(), 3);
        let orphans = &rules.forbidden()[2];
        assert_eq!(orphans.severity(), Severity::Warning);
        assert_eq!(orphans.scope(), RuleScope::Module);
        let policy = rules.boundaries().unwrap();
        assert_eq!(policy.default_verdict(), BoundaryDefault::Disallow);
        assert!(policy.no_unknown());
        assert!(!policy.permits("shared", "features"));
    }

    #[test]
    fn user_rule_replaces_preset_rule_in_place() {
        let rules = parse_and_load(
            r#"
[[forbidden]]
name = "no-circular"
severity = "warn"
to = { circular = true }
"#,
        )
        .unwrap();
        assert_eq!(rules.forbidden().len(), 5);
        assert_eq!(rules.forbidden()[1].name(), "no-circular");
        assert_eq!(rules.forbidden()[1].severity(), Severity::Warning);
    }

    #[test]
    fn duplicate_user_rules_are_rejected() {
        let result = parse_and_load(
            r#"
preset = "none"

[[forbidden]]
name = "no-legacy"
from = { path = "^src/legacy" }

[[forbidden]]
name = "no-legacy"
severity = "warn"
from = { path = "^src/vendor" }
"#,
        );
        match result {
            Err(LoadError::CrossRef(errors)) => assert_eq!(
                errors,
                vec![ModelError::DuplicateRule {
                    name: "no-legacy".into()
                }]
            ),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn preset_rule_overridden_twice_is_rejected() {
        let result = parse_and_load(
            r#"
[[forbidden]]
name = "no-orphans"
severity = "warn"
from = { orphan = true }

[[forbidden]]
name = "no-orphans"
severity = "off"
"#,
        );
        assert!(matches!(result, Err(LoadError::CrossRef(_))));
    }

    #[test]
    fn severity_off_drops_rule() {
        let rules = parse_and_load(
            r#"
[[forbidden]]
name = "no-orphans"
severity = "off"
"#,
        )
        .unwrap();
        assert_eq!(rules.forbidden().len(), 4);
        assert!(rules.forbidden().iter().all(|r| r.name() != "no-orphans"));
    }

    // -- Error cases --

    #[test]
    fn load_rejects_invalid_element_pattern() {
        let result = parse_and_load(
            r#"
[[elements]]
type = "app"
pattern = "^src/(app"
"#,
        );
        match result {
            Err(LoadError::Validation { context, .. }) => {
                assert_eq!(context, "elements[0].pattern");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn load_rejects_invalid_rule_pattern_with_rule_name() {
        let err = parse_and_load(
            r#"
[[forbidden]]
name = "bad-path"
from = { path = "[" }
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("forbidden 'bad-path' from.path"));
    }

    #[test]
    fn load_rejects_unknown_severity() {
        let result = parse_and_load(
            r#"
[[forbidden]]
name = "bad"
severity = "critical"
"#,
        );
        assert!(matches!(result, Err(LoadError::UnknownSeverity { .. })));
    }

    #[test]
    fn load_rejects_unknown_dependency_type() {
        let result = parse_and_load(
            r#"
[[forbidden]]
name = "bad"
to = { dependency_types = ["npm-peer"] }
"#,
        );
        assert!(matches!(
            result,
            Err(LoadError::UnknownDependencyType { .. })
        ));
    }

    #[test]
    fn load_rejects_unknown_preset() {
        let result = parse_and_load(r#"preset = "strict""#);
        assert!(matches!(result, Err(LoadError::UnknownPreset(_))));
    }

    #[test]
    fn boundaries_off_disables_policy() {
        let rules = parse_and_load(
            r#"
[boundaries]
severity = "off"
no_unknown = true
"#,
        )
        .unwrap();
        assert!(rules.boundaries().is_none());
    }

    #[test]
    fn load_rejects_unknown_boundary_default() {
        let result = parse_and_load(
            r#"
[boundaries]
default = "maybe"
"#,
        );
        assert!(matches!(result, Err(LoadError::UnknownBoundaryDefault(_))));
    }

    #[test]
    fn load_rejects_relation_to_undeclared_element() {
        let result = parse_and_load(
            r#"
[[elements]]
type = "app"
pattern = "^src/app"

[boundaries]
[[boundaries.disallow]]
from = "app"
to = ["legacy"]
"#,
        );
        assert!(matches!(result, Err(LoadError::CrossRef(_))));
    }

    #[test]
    fn load_rejects_orphan_rule_with_target() {
        let result = parse_and_load(
            r#"
[[forbidden]]
name = "weird"
from = { orphan = true }
to = { circular = true }
"#,
        );
        assert!(matches!(result, Err(LoadError::Validation { .. })));
    }
}
