//! Element classification: maps module ids to architectural elements.

use std::fmt;

use crate::config::model::ElementPattern;
use crate::graph::Graph;

/// The architectural category of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    /// Matched a configured pattern.
    Named(String),
    /// No pattern matched.
    Unclassified,
}

impl Element {
    /// The element name, or `None` when unclassified.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Unclassified => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "{name}"),
            Self::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Assigns elements to module ids.
///
/// Patterns are tried in configuration order and the first match wins, so
/// overlapping patterns resolve by position.
#[derive(Debug, Clone, Default)]
pub struct ElementClassifier {
    patterns: Vec<ElementPattern>,
}

impl ElementClassifier {
    /// Builds a classifier from ordered patterns.
    #[must_use]
    pub fn new(patterns: Vec<ElementPattern>) -> Self {
        Self { patterns }
    }

    /// Which element does this module belong to?
    #[must_use]
    pub fn classify(&self, id: &str) -> Element {
        self.patterns
            .iter()
            .find(|p| p.pattern().is_match(id))
            .map_or(Element::Unclassified, |p| {
                Element::Named(p.element().as_str().to_string())
            })
    }

    /// Classifies every module, indexed by [`crate::graph::ModuleId::index`].
    #[must_use]
    pub fn classify_all(&self, graph: &Graph) -> Vec<Element> {
        graph
            .modules()
            .iter()
            .map(|m| self.classify(m.id()))
            .collect()
    }
}
