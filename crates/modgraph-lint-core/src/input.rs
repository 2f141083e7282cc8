//! JSON input documents produced by an import extractor/resolver.
//!
//! Two shapes are accepted and may be mixed in one document:
//!
//! ```json
//! {
//!   "modules": [
//!     { "source": "src/app/main.ts",
//!       "dependencies": [
//!         { "module": "./features/cart", "resolved": "src/features/cart.ts", "kind": "internal" },
//!         { "module": "./gone", "couldNotResolve": true }
//!       ] }
//!   ],
//!   "edges": [
//!     { "from": "src/a.ts", "to": "react", "kind": "npm" }
//!   ]
//! }
//! ```
//!
//! Module entries are registered even when they import nothing, which is
//! what makes orphans visible.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::graph::{DependencyKind, EdgeRecord, Graph, GraphBuilder};

/// Errors reading an input document.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// Failed to read the input file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },
    /// The document is not valid JSON for this schema.
    #[error("invalid input document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Extracted dependency data for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDocument {
    /// Per-module dependency lists.
    #[serde(default)]
    pub modules: Vec<ModuleRecord>,
    /// Flat edge list.
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

/// A source module and the imports found in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Canonical id of the module.
    pub source: String,
    /// Imports, in source order.
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,
}

/// One import of a [`ModuleRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    /// Import specifier as written.
    pub module: String,
    /// Resolved id, when the resolver found one.
    #[serde(default)]
    pub resolved: Option<String>,
    /// Reported dependency kind.
    #[serde(default)]
    pub kind: Option<DependencyKind>,
    /// Set by resolvers that report failures explicitly.
    #[serde(default)]
    pub could_not_resolve: bool,
}

impl InputDocument {
    /// Reads a document from a file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, InputError> {
        let content = std::fs::read_to_string(path).map_err(|e| InputError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses a document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON does not match the schema.
    pub fn parse(content: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Number of imports in the document before deduplication.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.edges.len()
            + self
                .modules
                .iter()
                .map(|m| m.dependencies.len())
                .sum::<usize>()
    }

    /// Builds the dependency graph.
    ///
    /// Module entries come first, in document order, followed by flat edges.
    #[must_use]
    pub fn into_graph(self) -> Graph {
        let mut builder = GraphBuilder::new();
        for module in self.modules {
            builder.add_module(&module.source);
            for dep in module.dependencies {
                let resolved = !dep.could_not_resolve && dep.resolved.is_some();
                builder.add_edge(EdgeRecord {
                    from: module.source.clone(),
                    to: dep.resolved,
                    specifier: Some(dep.module),
                    kind: dep.kind,
                    resolved,
                });
            }
        }
        for edge in self.edges {
            builder.add_edge(edge);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Target;

    #[test]
    fn parses_module_list() {
        let doc = InputDocument::parse(
            r#"{
                "modules": [
                    { "source": "src/app/main.ts",
                      "dependencies": [
                        { "module": "./cart", "resolved": "src/features/cart.ts", "kind": "internal" },
                        { "module": "./gone", "couldNotResolve": true }
                      ] },
                    { "source": "src/lonely.ts" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.record_count(), 2);

        let graph = doc.into_graph();
        assert_eq!(graph.modules().len(), 3);
        assert!(graph.find("src/lonely.ts").is_some());
        let unresolved = graph
            .edges()
            .iter()
            .find(|e| e.target() == Target::Unresolved)
            .unwrap();
        assert_eq!(unresolved.specifier(), "./gone");
    }

    #[test]
    fn parses_flat_edges_with_defaults() {
        let doc = InputDocument::parse(
            r#"{ "edges": [
                { "from": "src/a.ts", "to": "react", "kind": "npm" },
                { "from": "src/a.ts", "to": null, "resolved": false, "specifier": "./x" }
            ] }"#,
        )
        .unwrap();
        assert!(doc.edges[0].resolved);
        let graph = doc.into_graph();
        assert_eq!(graph.edges()[0].kind(), DependencyKind::NpmRuntime);
        assert_eq!(graph.edges()[1].kind(), DependencyKind::Unresolvable);
    }

    #[test]
    fn dependency_without_resolution_is_unresolvable() {
        let doc = InputDocument::parse(
            r#"{ "modules": [ { "source": "src/a.ts",
                "dependencies": [ { "module": "lodash", "kind": "npm" } ] } ] }"#,
        )
        .unwrap();
        let graph = doc.into_graph();
        assert_eq!(graph.edges()[0].kind(), DependencyKind::Unresolvable);
    }

    #[test]
    fn rejects_unknown_kind() {
        let result = InputDocument::parse(
            r#"{ "edges": [ { "from": "a", "to": "b", "kind": "npm-peer" } ] }"#,
        );
        assert!(matches!(result, Err(InputError::Parse(_))));
    }
}
