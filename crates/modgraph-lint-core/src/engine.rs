//! Dependency rule engine.
//!
//! Evaluates forbidden rules and the element boundary policy against a
//! completed [`Graph`], producing a sorted [`Report`].
//!
//! Every rule is an independent check over a shared read-only view of the
//! graph; an edge trips as many rules as it matches. With
//! [`EngineOptions::parallel`](crate::config::model::EngineOptions) the checks
//! run on the rayon pool. Output is identical either way because the report
//! sorts after merging.

use rayon::prelude::*;
use tracing::debug;

use crate::classify::{Element, ElementClassifier};
use crate::config::model::{BoundaryPolicy, ForbiddenRule, RuleScope, RuleSet};
use crate::graph::{DependencyKind, Edge, EdgeId, Graph};
use crate::report::Report;
use crate::scc::CycleIndex;
use crate::types::Violation;

/// Rule name for disallowed element-to-element dependencies.
pub const ELEMENT_TYPES: &str = "boundaries/element-types";
/// Rule name for dependencies on unclassified modules.
pub const NO_UNKNOWN: &str = "boundaries/no-unknown";
/// Rule name for dependencies on modules excluded from boundary checks.
pub const NO_IGNORED: &str = "boundaries/no-ignored";

/// Graph-derived facts shared by every check.
struct Facts<'g> {
    graph: &'g Graph,
    elements: Vec<Element>,
    cyclic: Vec<bool>,
    /// `None` for external package nodes, which have no orphan state.
    orphan: Vec<Option<bool>>,
}

impl<'g> Facts<'g> {
    fn compute(graph: &'g Graph, classifier: &ElementClassifier) -> Self {
        let cycles = CycleIndex::build(graph);
        debug!("Found {} dependency cycles", cycles.cycle_count());
        Self {
            graph,
            elements: classifier.classify_all(graph),
            cyclic: cycles.cyclic_edges(graph),
            orphan: graph
                .module_ids()
                .map(|id| (!graph.is_external(id)).then(|| graph.internal_degree(id) == (0, 0)))
                .collect(),
        }
    }
}

enum Check<'r> {
    Forbidden(&'r ForbiddenRule),
    Boundaries(&'r BoundaryPolicy),
}

/// Evaluates a [`RuleSet`] against dependency graphs.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: RuleSet,
    classifier: ElementClassifier,
}

impl RuleEngine {
    /// Creates an engine from validated rules.
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        let classifier = ElementClassifier::new(rules.elements().to_vec());
        Self { rules, classifier }
    }

    /// The rules this engine evaluates.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The classifier built from the rule set's element patterns.
    #[must_use]
    pub fn classifier(&self) -> &ElementClassifier {
        &self.classifier
    }

    /// Checks a graph against every rule.
    #[must_use]
    pub fn check(&self, graph: &Graph) -> Report {
        let facts = Facts::compute(graph, &self.classifier);

        let checks: Vec<Check<'_>> = self
            .rules
            .forbidden()
            .iter()
            .map(Check::Forbidden)
            .chain(self.rules.boundaries().map(Check::Boundaries))
            .collect();

        let violations: Vec<Violation> = if self.rules.options().parallel {
            checks
                .par_iter()
                .map(|check| run_check(check, &facts))
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        } else {
            checks
                .iter()
                .flat_map(|check| run_check(check, &facts))
                .collect()
        };

        debug!(
            "Evaluated {} checks, {} violations",
            checks.len(),
            violations.len()
        );
        Report::new(violations, graph.modules().len(), graph.edges().len())
    }
}

fn run_check(check: &Check<'_>, facts: &Facts<'_>) -> Vec<Violation> {
    match check {
        Check::Forbidden(rule) => match rule.scope() {
            RuleScope::Module => check_modules(rule, facts),
            RuleScope::Edge => check_edges(rule, facts),
        },
        Check::Boundaries(policy) => check_boundaries(policy, facts),
    }
}

// ────────────────────────────────────────────
// Forbidden rules
// ────────────────────────────────────────────

fn check_modules(rule: &ForbiddenRule, facts: &Facts<'_>) -> Vec<Violation> {
    let Some(want_orphan) = rule.from().orphan() else {
        return Vec::new();
    };
    facts
        .graph
        .module_ids()
        .filter(|id| facts.orphan[id.index()] == Some(want_orphan))
        .map(|id| facts.graph.module_name(id))
        .filter(|name| rule.from().matches_path(name))
        .map(|name| {
            let message = if want_orphan {
                "orphan module: no internal imports and no internal dependents"
            } else {
                "module has internal dependencies"
            };
            Violation::new(rule.name(), rule.severity(), name, None, message)
                .with_comment(rule.comment())
        })
        .collect()
}

fn check_edges(rule: &ForbiddenRule, facts: &Facts<'_>) -> Vec<Violation> {
    let graph = facts.graph;
    graph
        .edges_with_ids()
        .filter(|(id, edge)| edge_matches(rule, facts, *id, edge))
        .map(|(id, edge)| {
            let from = graph.module_name(edge.from());
            let to = graph.target_name(edge);
            Violation::new(
                rule.name(),
                rule.severity(),
                from,
                Some(to.to_string()),
                edge_message(rule, facts, id, edge),
            )
            .with_comment(rule.comment())
        })
        .collect()
}

fn edge_matches(rule: &ForbiddenRule, facts: &Facts<'_>, id: EdgeId, edge: &Edge) -> bool {
    let graph = facts.graph;
    let to = rule.to();
    rule.from().matches_path(graph.module_name(edge.from()))
        && to.matches_path(graph.target_name(edge))
        && to.matches_kind(edge.kind())
        && to
            .circular()
            .map_or(true, |want| facts.cyclic[id.index()] == want)
        && to
            .could_not_resolve()
            .map_or(true, |want| (edge.kind() == DependencyKind::Unresolvable) == want)
}

fn edge_message(rule: &ForbiddenRule, facts: &Facts<'_>, id: EdgeId, edge: &Edge) -> String {
    let graph = facts.graph;
    let to = graph.target_name(edge);
    if rule.to().could_not_resolve() == Some(true) {
        format!("cannot resolve '{}'", edge.specifier())
    } else if rule.to().circular() == Some(true) && facts.cyclic[id.index()] {
        format!(
            "circular dependency: {} -> {to}",
            graph.module_name(edge.from())
        )
    } else if !rule.to().dependency_types().is_empty() {
        format!("{} dependency on '{to}'", edge.kind())
    } else {
        format!("forbidden dependency on '{to}'")
    }
}

// ────────────────────────────────────────────
// Boundaries
// ────────────────────────────────────────────

fn check_boundaries(policy: &BoundaryPolicy, facts: &Facts<'_>) -> Vec<Violation> {
    let graph = facts.graph;
    let mut violations = Vec::new();

    for edge in graph.edges().iter().filter(|e| e.is_internal()) {
        let Some(to_id) = edge.to() else {
            continue;
        };
        let from = graph.module_name(edge.from());
        let to = graph.module_name(to_id);
        if policy.is_ignored(from) {
            continue;
        }
        let violation = |rule: &str, message: String| {
            Violation::new(rule, policy.severity(), from, Some(to.to_string()), message)
        };

        if policy.is_ignored(to) {
            if policy.no_ignored() {
                violations.push(violation(
                    NO_IGNORED,
                    format!("'{to}' is excluded from boundary checks"),
                ));
            }
            continue;
        }

        let from_element = &facts.elements[edge.from().index()];
        let to_element = &facts.elements[to_id.index()];

        if policy.no_unknown() && *to_element == Element::Unclassified {
            violations.push(violation(
                NO_UNKNOWN,
                format!("'{to}' does not belong to any element"),
            ));
        }

        if let (Some(f), Some(t)) = (from_element.name(), to_element.name()) {
            if !policy.permits(f, t) {
                violations.push(violation(
                    ELEMENT_TYPES,
                    format!("elements of type '{f}' must not depend on '{t}'"),
                ));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeRecord;
    use crate::types::Severity;

    fn engine(toml: &str) -> RuleEngine {
        RuleEngine::new(RuleSet::parse(toml).unwrap())
    }

    fn internal(from: &str, to: &str) -> EdgeRecord {
        EdgeRecord::resolved(from, to, DependencyKind::Internal)
    }

    fn rules_of(report: &Report) -> Vec<&str> {
        report.violations().iter().map(|v| v.rule.as_str()).collect()
    }

    const BOUNDARIES: &str = r#"
preset = "none"

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
ignore = ["**/*.test.ts"]
no_unknown = true
no_ignored = true

[[boundaries.disallow]]
from = "shared"
to = ["features", "app"]

[[boundaries.disallow]]
from = "features"
to = ["app"]
"#;

    #[test]
    fn unresolvable_edge_flagged_once() {
        let e = engine("");
        let graph = Graph::from_records([
            internal("src/a.ts", "src/b.ts"),
            EdgeRecord::unresolved("src/a.ts", "./missing").with_kind(DependencyKind::NpmDev),
        ]);
        let report = e.check(&graph);
        assert_eq!(rules_of(&report), vec!["not-to-unresolvable"]);
        let v = &report.violations()[0];
        assert_eq!(v.to.as_deref(), Some("./missing"));
        assert_eq!(v.message, "cannot resolve './missing'");
        assert!(v.comment.is_some());
    }

    #[test]
    fn cycle_edges_flagged_with_message() {
        let e = engine(r#"preset = "minimal""#);
        let graph = Graph::from_records([internal("src/a.ts", "src/b.ts"), internal("src/b.ts", "src/a.ts")]);
        let report = e.check(&graph);
        assert_eq!(report.violations().len(), 2);
        assert_eq!(
            report.violations()[0].message,
            "circular dependency: src/a.ts -> src/b.ts"
        );
    }

    #[test]
    fn orphans_respect_path_filters() {
        let e = engine("");
        let mut builder = Graph::builder();
        builder.add_module("src/lonely.ts");
        builder.add_module("src/shared/types.ts");
        builder.add_module("scripts/tool.ts");
        builder.add_edge(internal("src/main.ts", "src/util.ts"));
        let graph = builder.build();

        let report = e.check(&graph);
        let orphans: Vec<&str> = report
            .violations()
            .iter()
            .filter(|v| v.rule == "no-orphans")
            .map(|v| v.from.as_str())
            .collect();
        assert_eq!(orphans, vec!["src/lonely.ts"]);
    }

    #[test]
    fn unfiltered_orphan_rule_skips_packages() {
        let e = engine(
            r#"
preset = "none"

[[forbidden]]
name = "any-orphan"
from = { orphan = true }

[[forbidden]]
name = "connected"
severity = "info"
from = { orphan = false }
"#,
        );
        let graph = Graph::from_records([
            internal("src/a.ts", "src/b.ts"),
            EdgeRecord::resolved("src/a.ts", "react", DependencyKind::NpmRuntime),
            EdgeRecord::resolved("src/c.ts", "lodash", DependencyKind::NpmRuntime),
        ]);
        let report = e.check(&graph);
        let flagged: Vec<(&str, &str)> = report
            .violations()
            .iter()
            .map(|v| (v.rule.as_str(), v.from.as_str()))
            .collect();
        assert_eq!(
            flagged,
            vec![
                ("any-orphan", "src/c.ts"),
                ("connected", "src/a.ts"),
                ("connected", "src/b.ts"),
            ]
        );
    }

    #[test]
    fn dev_dependency_exemption() {
        let e = engine("");
        let graph = Graph::from_records([
            EdgeRecord::resolved("src/cart.ts", "vitest", DependencyKind::NpmDev),
            EdgeRecord::resolved("src/cart.test.ts", "vitest", DependencyKind::NpmDev),
            EdgeRecord::resolved("src/test/setup.ts", "vitest", DependencyKind::NpmDev),
            internal("src/cart.test.ts", "src/cart.ts"),
            internal("src/test/setup.ts", "src/cart.ts"),
        ]);
        let report = e.check(&graph);
        let dev: Vec<&str> = report
            .violations()
            .iter()
            .filter(|v| v.rule == "not-to-dev-dep")
            .map(|v| v.from.as_str())
            .collect();
        assert_eq!(dev, vec!["src/cart.ts"]);
        assert_eq!(
            report.violations()[0].message,
            "npm-dev dependency on 'vitest'"
        );
    }

    #[test]
    fn deprecated_dependency_flagged() {
        let e = engine("");
        let graph = Graph::from_records([
            EdgeRecord::resolved("src/a.ts", "request", DependencyKind::Deprecated),
            internal("src/a.ts", "src/b.ts"),
        ]);
        let report = e.check(&graph);
        assert_eq!(rules_of(&report), vec!["no-deprecated"]);
    }

    #[test]
    fn one_edge_can_trip_several_rules() {
        let e = engine(
            r#"
preset = "minimal"

[[forbidden]]
name = "no-legacy"
severity = "warn"
to = { path = "^src/legacy" }
"#,
        );
        let graph = Graph::from_records([
            internal("src/a.ts", "src/legacy/b.ts"),
            internal("src/legacy/b.ts", "src/a.ts"),
        ]);
        let report = e.check(&graph);
        assert_eq!(
            rules_of(&report),
            vec!["no-circular", "no-circular", "no-legacy"]
        );
        assert_eq!(report.violations()[2].message, "forbidden dependency on 'src/legacy/b.ts'");
        assert_eq!(report.violations()[2].severity, Severity::Warning);
    }

    #[test]
    fn boundary_direction_is_enforced() {
        let e = engine(BOUNDARIES);
        let graph = Graph::from_records([
            internal("src/features/cart.ts", "src/shared/ui.ts"),
            internal("src/shared/ui.ts", "src/features/cart.ts"),
        ]);
        let report = e.check(&graph);
        assert_eq!(rules_of(&report), vec![ELEMENT_TYPES]);
        let v = &report.violations()[0];
        assert_eq!(v.from, "src/shared/ui.ts");
        assert_eq!(v.message, "elements of type 'shared' must not depend on 'features'");
    }

    #[test]
    fn boundary_no_unknown_and_no_ignored() {
        let e = engine(BOUNDARIES);
        let graph = Graph::from_records([
            internal("src/app/main.ts", "src/polyfills.ts"),
            internal("src/app/main.ts", "src/app/main.test.ts"),
            internal("src/app/main.test.ts", "src/features/cart.ts"),
            EdgeRecord::resolved("src/app/main.ts", "react", DependencyKind::NpmRuntime),
        ]);
        let report = e.check(&graph);
        let found: Vec<(&str, Option<&str>)> = report
            .violations()
            .iter()
            .map(|v| (v.rule.as_str(), v.to.as_deref()))
            .collect();
        assert_eq!(
            found,
            vec![
                (NO_IGNORED, Some("src/app/main.test.ts")),
                (NO_UNKNOWN, Some("src/polyfills.ts")),
            ]
        );
    }

    #[test]
    fn disallow_default_requires_explicit_allow() {
        let e = engine(
            r#"
preset = "none"

[[elements]]
type = "app"
pattern = "^src/app"

[[elements]]
type = "shared"
pattern = "^src/shared"

[boundaries]
default = "disallow"
severity = "warn"

[[boundaries.allow]]
from = "app"
to = ["shared"]
"#,
        );
        let graph = Graph::from_records([
            internal("src/app/a.ts", "src/shared/b.ts"),
            internal("src/shared/b.ts", "src/app/a.ts"),
            internal("src/shared/b.ts", "src/shared/c.ts"),
        ]);
        let report = e.check(&graph);
        assert_eq!(report.violations().len(), 1);
        assert_eq!(report.violations()[0].severity, Severity::Warning);
        assert!(!report.has_errors());
    }

    #[test]
    fn parallel_matches_sequential() {
        let mut builder = Graph::builder();
        for record in [
            internal("src/a.ts", "src/b.ts"),
            internal("src/b.ts", "src/a.ts"),
            EdgeRecord::unresolved("src/a.ts", "./gone"),
            EdgeRecord::resolved("src/b.ts", "jest", DependencyKind::NpmDev),
        ] {
            builder.add_edge(record);
        }
        builder.add_module("src/orphan.ts");
        let graph = builder.build();

        let sequential = engine("").check(&graph);
        let parallel = engine("[options]\nparallel = true\n").check(&graph);
        assert_eq!(sequential.violations(), parallel.violations());
        assert_eq!(sequential.violations().len(), 5);
    }
}
