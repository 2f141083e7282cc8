//! Strongly connected components over internal edges.
//!
//! Tarjan's algorithm, driven by an explicit frame stack instead of
//! recursion so that long import chains cannot exhaust the call stack.
//! Runs in O(V + E).

use crate::graph::{Graph, ModuleId};

const UNVISITED: usize = usize::MAX;

/// SCC membership for every module of a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleIndex {
    component: Vec<usize>,
    sizes: Vec<usize>,
    self_loop: Vec<bool>,
}

impl CycleIndex {
    /// Computes components over the subgraph of internal edges.
    #[must_use]
    pub fn build(graph: &Graph) -> Self {
        let n = graph.modules().len();
        let mut self_loop = vec![false; n];
        let successors: Vec<Vec<usize>> = graph
            .module_ids()
            .map(|id| {
                graph
                    .outgoing(id)
                    .iter()
                    .map(|e| graph.edge(*e))
                    .filter(|e| e.is_internal())
                    .filter_map(|e| e.to())
                    .map(|to| {
                        if to == id {
                            self_loop[id.index()] = true;
                        }
                        to.index()
                    })
                    .collect()
            })
            .collect();

        let mut index = vec![UNVISITED; n];
        let mut low = vec![0; n];
        let mut on_stack = vec![false; n];
        let mut stack = Vec::new();
        let mut component = vec![UNVISITED; n];
        let mut sizes = Vec::new();
        let mut next = 0;
        // (node, position in its successor list)
        let mut frames: Vec<(usize, usize)> = Vec::new();

        for root in 0..n {
            if index[root] != UNVISITED {
                continue;
            }
            index[root] = next;
            low[root] = next;
            next += 1;
            stack.push(root);
            on_stack[root] = true;
            frames.push((root, 0));

            while let Some(&(v, pos)) = frames.last() {
                if let Some(&w) = successors[v].get(pos) {
                    let top = frames.len() - 1;
                    frames[top].1 += 1;
                    if index[w] == UNVISITED {
                        index[w] = next;
                        low[w] = next;
                        next += 1;
                        stack.push(w);
                        on_stack[w] = true;
                        frames.push((w, 0));
                    } else if on_stack[w] {
                        low[v] = low[v].min(index[w]);
                    }
                    continue;
                }

                frames.pop();
                if let Some(&(parent, _)) = frames.last() {
                    low[parent] = low[parent].min(low[v]);
                }
                if low[v] == index[v] {
                    let id = sizes.len();
                    let mut size = 0;
                    while let Some(w) = stack.pop() {
                        on_stack[w] = false;
                        component[w] = id;
                        size += 1;
                        if w == v {
                            break;
                        }
                    }
                    sizes.push(size);
                }
            }
        }

        Self {
            component,
            sizes,
            self_loop,
        }
    }

    /// Component id of a module.
    #[must_use]
    pub fn component_of(&self, id: ModuleId) -> usize {
        self.component[id.index()]
    }

    /// Number of modules in the module's component.
    #[must_use]
    pub fn component_size(&self, id: ModuleId) -> usize {
        self.sizes[self.component_of(id)]
    }

    /// Whether the module lies on at least one cycle.
    #[must_use]
    pub fn is_cyclic(&self, id: ModuleId) -> bool {
        self.component_size(id) > 1 || self.self_loop[id.index()]
    }

    /// Number of components with more than one module.
    #[must_use]
    pub fn cycle_count(&self) -> usize {
        self.sizes.iter().filter(|&&s| s > 1).count()
    }

    /// Flags every internal edge whose endpoints share a cyclic component,
    /// indexed by [`crate::graph::EdgeId::index`].
    #[must_use]
    pub fn cyclic_edges(&self, graph: &Graph) -> Vec<bool> {
        graph
            .edges()
            .iter()
            .map(|edge| match edge.to() {
                Some(to) if edge.is_internal() => {
                    to == edge.from()
                        || (self.component_of(to) == self.component_of(edge.from())
                            && self.component_size(to) > 1)
                }
                _ => false,
            })
            .collect()
    }
}
