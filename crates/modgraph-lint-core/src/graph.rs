//! Module dependency graph.
//!
//! Modules and edges live in arenas addressed by [`ModuleId`] and
//! [`EdgeId`]. Ids are assigned in first-seen order while building, so the
//! same input always produces the same graph.
//!
//! ```text
//! EdgeRecord* ──▶ GraphBuilder ──▶ Graph (immutable)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How a module depends on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DependencyKind {
    /// A module inside the analyzed source tree.
    #[serde(rename = "internal", alias = "local")]
    Internal,
    /// A package listed as a runtime dependency.
    #[serde(rename = "npm", alias = "npm-runtime")]
    NpmRuntime,
    /// A package listed as a development-only dependency.
    #[serde(rename = "npm-dev")]
    NpmDev,
    /// A package marked deprecated.
    #[serde(rename = "deprecated", alias = "npm-deprecated")]
    Deprecated,
    /// A platform builtin (e.g., `fs`, `path`).
    #[serde(rename = "core", alias = "builtin")]
    Core,
    /// The specifier could not be resolved to any module.
    #[serde(rename = "unresolvable")]
    Unresolvable,
}

impl DependencyKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Internal,
        Self::NpmRuntime,
        Self::NpmDev,
        Self::Deprecated,
        Self::Core,
        Self::Unresolvable,
    ];

    /// Canonical configuration name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::NpmRuntime => "npm",
            Self::NpmDev => "npm-dev",
            Self::Deprecated => "deprecated",
            Self::Core => "core",
            Self::Unresolvable => "unresolvable",
        }
    }

    /// Rank used when the same `(from, to)` pair is reported twice with
    /// different kinds; the higher rank wins.
    ///
    /// Order: `deprecated > npm-dev > core > internal > npm`.
    /// `unresolvable` ranks above everything but never shares a key with a
    /// resolved edge.
    #[must_use]
    pub fn specificity(self) -> u8 {
        match self {
            Self::NpmRuntime => 0,
            Self::Internal => 1,
            Self::Core => 2,
            Self::NpmDev => 3,
            Self::Deprecated => 4,
            Self::Unresolvable => 5,
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown dependency kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dependency type `{0}`, expected one of: internal, npm, npm-dev, deprecated, core, unresolvable")]
pub struct UnknownKind(pub String);

impl FromStr for DependencyKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "internal" | "local" => Ok(Self::Internal),
            "npm" | "npm-runtime" => Ok(Self::NpmRuntime),
            "npm-dev" => Ok(Self::NpmDev),
            "deprecated" | "npm-deprecated" => Ok(Self::Deprecated),
            "core" | "builtin" => Ok(Self::Core),
            "unresolvable" => Ok(Self::Unresolvable),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Arena index of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

impl ModuleId {
    /// Position of this module in [`Graph::modules`].
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Arena index of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

impl EdgeId {
    /// Position of this edge in [`Graph::edges`].
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A uniquely identified unit of source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: String,
}

impl Module {
    /// Canonical identity (resolved path or package name).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Destination of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A real module node.
    Module(ModuleId),
    /// Synthetic target for specifiers that did not resolve. Never a node.
    Unresolved,
}

/// A directed dependency relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    from: ModuleId,
    target: Target,
    kind: DependencyKind,
    specifier: String,
}

impl Edge {
    /// Source module.
    #[must_use]
    pub fn from(&self) -> ModuleId {
        self.from
    }

    /// Destination.
    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }

    /// Destination module, if resolved.
    #[must_use]
    pub fn to(&self) -> Option<ModuleId> {
        match self.target {
            Target::Module(id) => Some(id),
            Target::Unresolved => None,
        }
    }

    /// Dependency kind after normalization.
    #[must_use]
    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    /// The import specifier as written in source.
    #[must_use]
    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    /// Whether this edge connects two modules of the analyzed tree.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.kind == DependencyKind::Internal && matches!(self.target, Target::Module(_))
    }
}

/// One extracted import, as supplied by the extractor/resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Id of the importing module.
    pub from: String,
    /// Resolved id of the imported module, if any.
    #[serde(default)]
    pub to: Option<String>,
    /// Raw import specifier. Falls back to `to` when absent.
    #[serde(default)]
    pub specifier: Option<String>,
    /// Reported dependency kind.
    #[serde(default)]
    pub kind: Option<DependencyKind>,
    /// Whether the resolver found a target.
    #[serde(default = "default_true")]
    pub resolved: bool,
}

fn default_true() -> bool {
    true
}

impl EdgeRecord {
    /// A resolved import of `to` with the given kind.
    #[must_use]
    pub fn resolved(from: impl Into<String>, to: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            from: from.into(),
            to: Some(to.into()),
            specifier: None,
            kind: Some(kind),
            resolved: true,
        }
    }

    /// An import whose specifier the resolver could not map to a module.
    #[must_use]
    pub fn unresolved(from: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: None,
            specifier: Some(specifier.into()),
            kind: None,
            resolved: false,
        }
    }

    /// Overrides the reported kind.
    #[must_use]
    pub fn with_kind(mut self, kind: DependencyKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum EdgeKey {
    Module(ModuleId),
    Unresolved(String),
}

/// Accumulates modules and edges, then freezes them into a [`Graph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    modules: Vec<Module>,
    index: HashMap<String, ModuleId>,
    edges: Vec<Edge>,
    edge_index: HashMap<(ModuleId, EdgeKey), EdgeId>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module, returning its id. Idempotent per canonical id.
    pub fn add_module(&mut self, id: &str) -> ModuleId {
        if let Some(&existing) = self.index.get(id) {
            return existing;
        }
        let module_id = ModuleId(self.modules.len());
        self.modules.push(Module { id: id.to_string() });
        self.index.insert(id.to_string(), module_id);
        module_id
    }

    /// Adds one extracted import.
    ///
    /// Unresolved records are forced to [`DependencyKind::Unresolvable`] and
    /// point at [`Target::Unresolved`]. A resolved record without a kind is
    /// treated as internal. Repeated `(from, to)` pairs collapse into the
    /// first edge, keeping the kind with the highest
    /// [`DependencyKind::specificity`]. Unresolved records are keyed by their
    /// specifier, so importing the same missing specifier twice from one
    /// module yields a single edge and a single report line.
    pub fn add_edge(&mut self, record: EdgeRecord) -> EdgeId {
        let from = self.add_module(&record.from);
        let specifier = record
            .specifier
            .or_else(|| record.to.clone())
            .unwrap_or_default();

        let resolved_to = record
            .to
            .filter(|to| record.resolved && !to.is_empty())
            .filter(|_| record.kind != Some(DependencyKind::Unresolvable));

        let (key, target, kind) = match resolved_to {
            Some(to) => {
                let to_id = self.add_module(&to);
                (
                    EdgeKey::Module(to_id),
                    Target::Module(to_id),
                    record.kind.unwrap_or(DependencyKind::Internal),
                )
            }
            None => (
                EdgeKey::Unresolved(specifier.clone()),
                Target::Unresolved,
                DependencyKind::Unresolvable,
            ),
        };

        if let Some(&existing) = self.edge_index.get(&(from, key.clone())) {
            let edge = &mut self.edges[existing.0];
            if kind.specificity() > edge.kind.specificity() {
                debug!(
                    "Duplicate edge from {}: {} replaces {}",
                    record.from, kind, edge.kind
                );
                edge.kind = kind;
            }
            return existing;
        }

        let edge_id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            from,
            target,
            kind,
            specifier,
        });
        self.edge_index.insert((from, key), edge_id);
        edge_id
    }

    /// Freezes the builder into an immutable graph.
    #[must_use]
    pub fn build(self) -> Graph {
        let mut outgoing = vec![Vec::new(); self.modules.len()];
        let mut incoming = vec![Vec::new(); self.modules.len()];
        for (i, edge) in self.edges.iter().enumerate() {
            outgoing[edge.from.0].push(EdgeId(i));
            if let Target::Module(to) = edge.target {
                incoming[to.0].push(EdgeId(i));
            }
        }
        debug!(
            "Built graph with {} modules and {} edges",
            self.modules.len(),
            self.edges.len()
        );
        Graph {
            modules: self.modules,
            index: self.index,
            edges: self.edges,
            outgoing,
            incoming,
        }
    }
}

/// All modules and edges of one analysis run.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    modules: Vec<Module>,
    index: HashMap<String, ModuleId>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
}

impl Graph {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> GraphBuilder {
        GraphBuilder::new()
    }

    /// Builds a graph from a sequence of records.
    #[must_use]
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = EdgeRecord>,
    {
        let mut builder = GraphBuilder::new();
        for record in records {
            builder.add_edge(record);
        }
        builder.build()
    }

    /// All modules, indexed by [`ModuleId::index`].
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// All edges, indexed by [`EdgeId::index`].
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Iterates module ids in arena order.
    pub fn module_ids(&self) -> impl Iterator<Item = ModuleId> {
        (0..self.modules.len()).map(ModuleId)
    }

    /// Iterates `(id, edge)` pairs in arena order.
    pub fn edges_with_ids(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId(i), e))
    }

    /// Looks up a module by canonical id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<ModuleId> {
        self.index.get(id).copied()
    }

    /// Canonical id of a module.
    #[must_use]
    pub fn module_name(&self, id: ModuleId) -> &str {
        self.modules[id.0].id()
    }

    /// Display name of an edge's destination: the module id when resolved,
    /// otherwise the raw specifier.
    #[must_use]
    pub fn target_name<'a>(&'a self, edge: &'a Edge) -> &'a str {
        match edge.target {
            Target::Module(id) => self.module_name(id),
            Target::Unresolved => &edge.specifier,
        }
    }

    /// Edges leaving a module, including unresolved ones.
    #[must_use]
    pub fn outgoing(&self, id: ModuleId) -> &[EdgeId] {
        &self.outgoing[id.0]
    }

    /// Edges arriving at a module.
    #[must_use]
    pub fn incoming(&self, id: ModuleId) -> &[EdgeId] {
        &self.incoming[id.0]
    }

    /// Edge by id.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    /// `(in, out)` degree counting internal edges only.
    #[must_use]
    pub fn internal_degree(&self, id: ModuleId) -> (usize, usize) {
        let count = |ids: &[EdgeId]| ids.iter().filter(|e| self.edge(**e).is_internal()).count();
        (count(self.incoming(id)), count(self.outgoing(id)))
    }

    /// Whether a module is only ever reached through package edges.
    ///
    /// Such nodes (`react`, `node:fs`) import nothing and are never imported
    /// internally; module-scoped rules skip them.
    #[must_use]
    pub fn is_external(&self, id: ModuleId) -> bool {
        let incoming = self.incoming(id);
        self.outgoing(id).is_empty()
            && !incoming.is_empty()
            && incoming.iter().all(|e| !self.edge(*e).is_internal())
    }
}
