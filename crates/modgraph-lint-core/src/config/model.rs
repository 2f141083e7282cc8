//! Pure domain model for rule configuration.
//!
//! This module contains no serde and no I/O.
//! All invariants are enforced at construction time via validated newtypes.

use crate::graph::DependencyKind;
use crate::types::Severity;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

// ────────────────────────────────────────────
// Newtypes with validation
// ────────────────────────────────────────────

/// A validated element name (non-empty, `[a-z0-9_-]` only).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementName(String);

impl ElementName {
    /// Creates a new element name.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty or contains invalid characters.
    pub fn new(name: &str) -> Result<Self, ModelError> {
        if name.is_empty() {
            return Err(ModelError::EmptyElementName);
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(ModelError::InvalidElementName {
                name: name.to_string(),
            });
        }
        Ok(Self(name.to_string()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated regular expression matched against module ids.
///
/// Compiled once at construction and reused for all match calls.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    compiled: Regex,
}

impl PathPattern {
    /// Creates a new path pattern.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is not a valid regular expression.
    pub fn new(pattern: &str) -> Result<Self, ModelError> {
        let compiled = Regex::new(pattern).map_err(|e| ModelError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// Tests whether a module id matches anywhere in the pattern's sense.
    #[must_use]
    pub fn is_match(&self, id: &str) -> bool {
        self.compiled.is_match(id)
    }

    /// Returns the pattern as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for PathPattern {}

/// A validated glob pattern for module id matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    raw: String,
    compiled: glob::Pattern,
}

impl GlobPattern {
    /// Creates a new glob pattern.
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is empty or has invalid glob syntax.
    pub fn new(pattern: &str) -> Result<Self, ModelError> {
        if pattern.is_empty() {
            return Err(ModelError::EmptyGlobPattern);
        }
        let compiled = glob::Pattern::new(pattern).map_err(|e| ModelError::InvalidGlobPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// Tests whether a module id matches this pattern.
    #[must_use]
    pub fn matches(&self, id: &str) -> bool {
        if self.compiled.matches(id) {
            return true;
        }
        // `dir/**` also covers everything below `dir/`.
        if let Some(prefix) = self.raw.strip_suffix("/**") {
            let normalized = prefix.trim_end_matches('/');
            return id.starts_with(normalized)
                && id
                    .as_bytes()
                    .get(normalized.len())
                    .is_some_and(|&b| b == b'/');
        }
        false
    }

    /// Returns the pattern as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

// ────────────────────────────────────────────
// Classification
// ────────────────────────────────────────────

/// One `(pattern, element)` classification rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPattern {
    element: ElementName,
    pattern: PathPattern,
}

impl ElementPattern {
    /// Creates a new classification rule.
    #[must_use]
    pub fn new(element: ElementName, pattern: PathPattern) -> Self {
        Self { element, pattern }
    }

    /// The element assigned on match.
    #[must_use]
    pub fn element(&self) -> &ElementName {
        &self.element
    }

    /// The pattern tested against module ids.
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }
}

// ────────────────────────────────────────────
// Forbidden rules
// ────────────────────────────────────────────

/// Predicates on the source module of a forbidden rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleFilter {
    path: Option<PathPattern>,
    path_not: Option<PathPattern>,
    orphan: Option<bool>,
}

impl ModuleFilter {
    /// Creates a new module filter.
    #[must_use]
    pub fn new(
        path: Option<PathPattern>,
        path_not: Option<PathPattern>,
        orphan: Option<bool>,
    ) -> Self {
        Self {
            path,
            path_not,
            orphan,
        }
    }

    /// Required orphan state, if constrained.
    #[must_use]
    pub fn orphan(&self) -> Option<bool> {
        self.orphan
    }

    /// Tests the `path` / `path_not` pair against a module id.
    #[must_use]
    pub fn matches_path(&self, id: &str) -> bool {
        self.path.as_ref().map_or(true, |p| p.is_match(id))
            && !self.path_not.as_ref().is_some_and(|p| p.is_match(id))
    }
}

/// Predicates on the edge (and its target) of a forbidden rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeFilter {
    path: Option<PathPattern>,
    path_not: Option<PathPattern>,
    circular: Option<bool>,
    could_not_resolve: Option<bool>,
    dependency_types: Vec<DependencyKind>,
}

impl EdgeFilter {
    /// Creates a new edge filter.
    #[must_use]
    pub fn new(
        path: Option<PathPattern>,
        path_not: Option<PathPattern>,
        circular: Option<bool>,
        could_not_resolve: Option<bool>,
        dependency_types: Vec<DependencyKind>,
    ) -> Self {
        Self {
            path,
            path_not,
            circular,
            could_not_resolve,
            dependency_types,
        }
    }

    /// Required circularity, if constrained.
    #[must_use]
    pub fn circular(&self) -> Option<bool> {
        self.circular
    }

    /// Required resolution failure state, if constrained.
    #[must_use]
    pub fn could_not_resolve(&self) -> Option<bool> {
        self.could_not_resolve
    }

    /// Dependency kinds the rule applies to; empty means any.
    #[must_use]
    pub fn dependency_types(&self) -> &[DependencyKind] {
        &self.dependency_types
    }

    /// Tests the `path` / `path_not` pair against a target name.
    #[must_use]
    pub fn matches_path(&self, target: &str) -> bool {
        self.path.as_ref().map_or(true, |p| p.is_match(target))
            && !self.path_not.as_ref().is_some_and(|p| p.is_match(target))
    }

    /// Tests the kind constraint.
    #[must_use]
    pub fn matches_kind(&self, kind: DependencyKind) -> bool {
        self.dependency_types.is_empty() || self.dependency_types.contains(&kind)
    }

    /// Returns true if no predicate is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_none()
            && self.path_not.is_none()
            && self.circular.is_none()
            && self.could_not_resolve.is_none()
            && self.dependency_types.is_empty()
    }
}

/// Whether a rule is evaluated per module or per edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Evaluated once per module (orphan rules).
    Module,
    /// Evaluated once per edge.
    Edge,
}

/// A forbidden-dependency rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenRule {
    name: String,
    severity: Severity,
    comment: Option<String>,
    from: ModuleFilter,
    to: EdgeFilter,
}

impl ForbiddenRule {
    /// Creates a new forbidden rule.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty, or if an orphan rule also
    /// constrains the edge side.
    pub fn new(
        name: String,
        severity: Severity,
        comment: Option<String>,
        from: ModuleFilter,
        to: EdgeFilter,
    ) -> Result<Self, ModelError> {
        if name.is_empty() {
            return Err(ModelError::EmptyRuleName);
        }
        if from.orphan.is_some() && !to.is_empty() {
            return Err(ModelError::OrphanRuleWithTarget { rule: name });
        }
        Ok(Self {
            name,
            severity,
            comment,
            from,
            to,
        })
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the configured comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Source-module predicates.
    #[must_use]
    pub fn from(&self) -> &ModuleFilter {
        &self.from
    }

    /// Edge predicates.
    #[must_use]
    pub fn to(&self) -> &EdgeFilter {
        &self.to
    }

    /// How this rule is evaluated.
    #[must_use]
    pub fn scope(&self) -> RuleScope {
        if self.from.orphan.is_some() {
            RuleScope::Module
        } else {
            RuleScope::Edge
        }
    }
}

// ────────────────────────────────────────────
// Boundaries
// ────────────────────────────────────────────

/// Verdict for element pairs that no allow/disallow entry mentions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryDefault {
    /// Anything not explicitly disallowed is permitted.
    #[default]
    Allow,
    /// Only explicitly allowed pairs are permitted.
    Disallow,
}

/// `from` may (or may not) depend on each element in `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRelation {
    from: ElementName,
    to: Vec<ElementName>,
}

impl ElementRelation {
    /// Creates a new relation.
    #[must_use]
    pub fn new(from: ElementName, to: Vec<ElementName>) -> Self {
        Self { from, to }
    }

    /// Source element.
    #[must_use]
    pub fn from(&self) -> &ElementName {
        &self.from
    }

    /// Target elements.
    #[must_use]
    pub fn to(&self) -> &[ElementName] {
        &self.to
    }

    fn covers(&self, from: &str, to: &str) -> bool {
        self.from.as_str() == from && self.to.iter().any(|t| t.as_str() == to)
    }
}

/// Element-to-element dependency policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryPolicy {
    default: BoundaryDefault,
    allow: Vec<ElementRelation>,
    disallow: Vec<ElementRelation>,
    ignore: Vec<GlobPattern>,
    no_unknown: bool,
    no_ignored: bool,
    severity: Severity,
}

impl BoundaryPolicy {
    /// Creates a new policy.
    #[must_use]
    pub fn new(
        default: BoundaryDefault,
        allow: Vec<ElementRelation>,
        disallow: Vec<ElementRelation>,
        ignore: Vec<GlobPattern>,
        no_unknown: bool,
        no_ignored: bool,
        severity: Severity,
    ) -> Self {
        Self {
            default,
            allow,
            disallow,
            ignore,
            no_unknown,
            no_ignored,
            severity,
        }
    }

    /// Verdict for unlisted pairs.
    #[must_use]
    pub fn default_verdict(&self) -> BoundaryDefault {
        self.default
    }

    /// Explicitly allowed relations.
    #[must_use]
    pub fn allow(&self) -> &[ElementRelation] {
        &self.allow
    }

    /// Explicitly disallowed relations.
    #[must_use]
    pub fn disallow(&self) -> &[ElementRelation] {
        &self.disallow
    }

    /// Whether edges into unclassified modules are flagged.
    #[must_use]
    pub fn no_unknown(&self) -> bool {
        self.no_unknown
    }

    /// Whether edges into ignored modules are flagged.
    #[must_use]
    pub fn no_ignored(&self) -> bool {
        self.no_ignored
    }

    /// Severity of every boundary violation.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether a module is excluded from boundary checks.
    #[must_use]
    pub fn is_ignored(&self, id: &str) -> bool {
        self.ignore.iter().any(|g| g.matches(id))
    }

    /// Whether `from` may depend on `to`.
    ///
    /// Same-element dependencies are always permitted. Otherwise an explicit
    /// disallow wins, then an explicit allow, then the default.
    #[must_use]
    pub fn permits(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }
        if self.disallow.iter().any(|r| r.covers(from, to)) {
            return false;
        }
        if self.allow.iter().any(|r| r.covers(from, to)) {
            return true;
        }
        self.default == BoundaryDefault::Allow
    }

    fn relations(&self) -> impl Iterator<Item = &ElementRelation> {
        self.allow.iter().chain(self.disallow.iter())
    }
}

// ────────────────────────────────────────────
// Aggregate root
// ────────────────────────────────────────────

/// Engine-level switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Evaluate independent rules on the rayon thread pool.
    pub parallel: bool,
}

/// Validated rule configuration for one run.
///
/// All cross-references are verified at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    elements: Vec<ElementPattern>,
    forbidden: Vec<ForbiddenRule>,
    boundaries: Option<BoundaryPolicy>,
    options: EngineOptions,
}

impl RuleSet {
    /// Creates a new rule set with full validation.
    ///
    /// # Errors
    ///
    /// Returns every cross-reference problem found: duplicate rule names and
    /// boundary relations naming elements that no pattern declares.
    pub fn new(
        elements: Vec<ElementPattern>,
        forbidden: Vec<ForbiddenRule>,
        boundaries: Option<BoundaryPolicy>,
        options: EngineOptions,
    ) -> Result<Self, Vec<ModelError>> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for rule in &forbidden {
            if !seen.insert(rule.name()) {
                errors.push(ModelError::DuplicateRule {
                    name: rule.name().to_string(),
                });
            }
        }

        if let Some(policy) = &boundaries {
            let declared: HashSet<&ElementName> = elements.iter().map(|e| &e.element).collect();
            for relation in policy.relations() {
                for name in std::iter::once(&relation.from).chain(relation.to.iter()) {
                    if !declared.contains(name) {
                        errors.push(ModelError::UnknownElement {
                            context: format!("boundaries relation from '{}'", relation.from),
                            name: name.clone(),
                        });
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(Self {
                elements,
                forbidden,
                boundaries,
                options,
            })
        } else {
            Err(errors)
        }
    }

    /// Returns true if nothing would be checked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty() && self.boundaries.is_none()
    }

    /// Ordered classification rules.
    #[must_use]
    pub fn elements(&self) -> &[ElementPattern] {
        &self.elements
    }

    /// Forbidden rules, in configuration order.
    #[must_use]
    pub fn forbidden(&self) -> &[ForbiddenRule] {
        &self.forbidden
    }

    /// Boundary policy, if configured.
    #[must_use]
    pub fn boundaries(&self) -> Option<&BoundaryPolicy> {
        self.boundaries.as_ref()
    }

    /// Engine switches.
    #[must_use]
    pub fn options(&self) -> EngineOptions {
        self.options
    }
}

// ────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────

/// Errors in domain model construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Element name is empty.
    #[error("element name must not be empty")]
    EmptyElementName,

    /// Element name contains invalid characters.
    #[error("invalid element name `{name}`: must be [a-z0-9_-]")]
    InvalidElementName {
        /// The invalid name.
        name: String,
    },

    /// Regular expression failed to compile.
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidRegex {
        /// The pattern as written.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// Glob pattern is empty.
    #[error("glob pattern must not be empty")]
    EmptyGlobPattern,

    /// Glob pattern has invalid syntax.
    #[error("invalid glob pattern `{pattern}`: {reason}")]
    InvalidGlobPattern {
        /// The pattern as written.
        pattern: String,
        /// Parser message.
        reason: String,
    },

    /// Rule name is empty.
    #[error("rule name must not be empty")]
    EmptyRuleName,

    /// An orphan rule also sets `to` predicates.
    #[error("rule `{rule}`: orphan rules must not set `to` predicates")]
    OrphanRuleWithTarget {
        /// The offending rule.
        rule: String,
    },

    /// Two forbidden rules share a name.
    #[error("duplicate rule name `{name}`")]
    DuplicateRule {
        /// The repeated name.
        name: String,
    },

    /// A boundary relation names an element no pattern declares.
    #[error("{context}: unknown element `{name}`")]
    UnknownElement {
        /// Where the reference occurred.
        context: String,
        /// The unknown element.
        name: ElementName,
    },
}
