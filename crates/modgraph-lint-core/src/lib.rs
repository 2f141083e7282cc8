//! # modgraph-lint-core
//!
//! Static validation of module dependency graphs.
//!
//! The extractor/resolver that turns source files into import records lives
//! outside this crate. Given those records, this crate:
//!
//! - builds an immutable [`Graph`] of modules and edges
//! - classifies modules into architectural elements ([`ElementClassifier`])
//! - evaluates forbidden rules and element boundaries ([`RuleEngine`])
//! - produces a deterministically ordered [`Report`]
//!
//! ## Example
//!
//! ```ignore
//! use modgraph_lint_core::{InputDocument, RuleEngine, RuleSet};
//!
//! let rules = RuleSet::from_file("modgraph-lint.toml".as_ref())?;
//! let graph = InputDocument::from_file("deps.json".as_ref())?.into_graph();
//!
//! let report = RuleEngine::new(rules).check(&graph);
//! print!("{}", report.render_compact());
//! std::process::exit(i32::from(report.has_errors()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classify;
pub mod config;
pub mod engine;
pub mod graph;
pub mod input;
pub mod report;
pub mod scc;
mod types;

pub use classify::{Element, ElementClassifier};
pub use config::{ConfigError, LoadError, Preset, RuleSet};
pub use engine::RuleEngine;
pub use graph::{
    DependencyKind, Edge, EdgeId, EdgeRecord, Graph, GraphBuilder, Module, ModuleId, Target,
};
pub use input::{InputDocument, InputError};
pub use report::Report;
pub use types::{Severity, Violation};
