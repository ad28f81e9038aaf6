//! Dependency graph and leveled ordering.
//!
//! A [`DependencyGraph`] is rebuilt for every resolution from only the codes
//! that request references. Edges point from a dependent to its dependency.
//! [`DependencyGraph::topological_sort`] groups the codes into levels so that
//! every code's dependencies sit in a strictly earlier level.
//!
//! # Example
//!
//! ```
//! use quill_graph::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_edge("total", "subtotal");
//! graph.add_edge("total", "tax");
//! graph.add_edge("tax", "subtotal");
//!
//! let levels = graph.topological_sort().unwrap();
//! assert_eq!(levels, vec![vec!["subtotal"], vec!["tax"], vec!["total"]]);
//! ```

use hashbrown::{HashMap, HashSet};
use indexmap::{IndexMap, IndexSet};
use std::hash::BuildHasher;

/// Source of declared dependencies, keyed by code.
///
/// Implemented by the injector registry so the graph can be built without
/// depending on the injector crate.
pub trait InjectorLookup {
    /// Returns the declared dependencies of `code`, or `None` if the lookup
    /// does not own `code`.
    fn dependencies_of(&self, code: &str) -> Option<Vec<String>>;
}

impl<S: BuildHasher> InjectorLookup for std::collections::HashMap<String, Vec<String>, S> {
    fn dependencies_of(&self, code: &str) -> Option<Vec<String>> {
        self.get(code).cloned()
    }
}

/// Errors produced while ordering the graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The requested codes contain a dependency cycle.
    ///
    /// This is a configuration error: retrying without changing the injector
    /// declarations fails the same way.
    #[error("dependency cycle detected: {}", .path.join(" -> "))]
    Cycle {
        /// Codes along the cycle; the first code is repeated at the end.
        path: Vec<String>,
    },
}

impl GraphError {
    /// Returns the cycle trace, if this is a cycle error.
    #[must_use]
    pub fn cycle_path(&self) -> Option<&[String]> {
        match self {
            GraphError::Cycle { path } => Some(path),
        }
    }
}

/// Directed graph over injector codes.
///
/// Nodes keep insertion order, which fixes the order of codes within a level.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Node -> the codes it depends on.
    edges: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph for `codes` from `lookup`.
    ///
    /// See [`build_from_injectors`](Self::build_from_injectors).
    #[must_use]
    pub fn from_injectors<L, S>(lookup: &L, codes: &[S]) -> Self
    where
        L: InjectorLookup + ?Sized,
        S: AsRef<str>,
    {
        let mut graph = Self::new();
        graph.build_from_injectors(lookup, codes);
        graph
    }

    /// Adds a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, code: impl Into<String>) {
        self.edges.entry(code.into()).or_default();
    }

    /// Adds an edge meaning "`from` depends on `to`".
    ///
    /// Missing endpoints are added as nodes; duplicate edges are ignored.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let to = to.into();
        self.edges.entry(from.into()).or_default().insert(to.clone());
        self.add_node(to);
    }

    /// Adds every code in `codes` owned by `lookup`, plus an edge to each
    /// declared dependency that is itself in `codes`.
    ///
    /// Dependencies on codes outside `codes` are dropped: the dependent runs
    /// without that value in the context.
    pub fn build_from_injectors<L, S>(&mut self, lookup: &L, codes: &[S])
    where
        L: InjectorLookup + ?Sized,
        S: AsRef<str>,
    {
        let requested: HashSet<&str> = codes.iter().map(AsRef::as_ref).collect();

        for code in codes {
            let code = code.as_ref();
            let Some(dependencies) = lookup.dependencies_of(code) else {
                continue;
            };
            self.add_node(code);
            for dependency in dependencies {
                if requested.contains(dependency.as_str()) {
                    self.add_edge(code, dependency);
                } else {
                    tracing::debug!(
                        code = %code,
                        dependency = %dependency,
                        "dependency not referenced by request, dropping edge"
                    );
                }
            }
        }
    }

    /// Returns whether `code` is a node.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.edges.contains_key(code)
    }

    /// Returns the dependencies recorded for `code`.
    #[must_use]
    pub fn dependencies(&self, code: &str) -> Vec<&str> {
        self.edges
            .get(code)
            .map(|deps| deps.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(IndexSet::len).sum()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Groups the nodes into execution levels.
    ///
    /// Level 0 needs no prior results; every code's dependencies appear in a
    /// strictly earlier level. Codes within a level have no ordering
    /// requirement and are listed in node insertion order.
    ///
    /// Kahn's algorithm runs over dependent counts: nodes nobody depends on
    /// are peeled off first, which builds the levels last-to-first, and the
    /// result is reversed at the end.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Cycle`] with the cycle trace if the graph is cyclic.
    pub fn topological_sort(&self) -> Result<Vec<Vec<String>>, GraphError> {
        let mut dependents: HashMap<&str, usize> =
            self.edges.keys().map(|code| (code.as_str(), 0)).collect();
        for dependencies in self.edges.values() {
            for dependency in dependencies {
                if let Some(count) = dependents.get_mut(dependency.as_str()) {
                    *count += 1;
                }
            }
        }

        let mut remaining: IndexSet<&str> = self.edges.keys().map(String::as_str).collect();
        let mut levels: Vec<Vec<String>> = Vec::new();

        while !remaining.is_empty() {
            let level: Vec<&str> = remaining
                .iter()
                .copied()
                .filter(|code| dependents.get(code).copied() == Some(0))
                .collect();

            if level.is_empty() {
                let path = self.find_cycle().unwrap_or_else(|| {
                    remaining.iter().map(|code| (*code).to_string()).collect()
                });
                return Err(GraphError::Cycle { path });
            }

            for code in &level {
                remaining.shift_remove(code);
                for dependency in &self.edges[*code] {
                    if let Some(count) = dependents.get_mut(dependency.as_str()) {
                        *count -= 1;
                    }
                }
            }

            levels.push(level.into_iter().map(str::to_string).collect());
        }

        levels.reverse();
        Ok(levels)
    }

    /// Finds one cycle with a depth-first search.
    ///
    /// The first back-edge closes the cycle; the path is rebuilt by walking
    /// parent pointers from the discovering node back to the cycle entry.
    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut on_stack: HashSet<&str> = HashSet::new();
        let mut parent: HashMap<&str, &str> = HashMap::new();

        for start in self.edges.keys() {
            if visited.contains(start.as_str()) {
                continue;
            }
            if let Some(path) =
                self.visit(start.as_str(), &mut visited, &mut on_stack, &mut parent)
            {
                return Some(path);
            }
        }
        None
    }

    fn visit<'a>(
        &'a self,
        code: &'a str,
        visited: &mut HashSet<&'a str>,
        on_stack: &mut HashSet<&'a str>,
        parent: &mut HashMap<&'a str, &'a str>,
    ) -> Option<Vec<String>> {
        visited.insert(code);
        on_stack.insert(code);

        for dependency in self.edges.get(code).into_iter().flatten() {
            let dependency = dependency.as_str();
            if on_stack.contains(dependency) {
                let mut path = vec![code.to_string()];
                let mut current = code;
                while current != dependency {
                    current = *parent.get(current)?;
                    path.push(current.to_string());
                }
                path.reverse();
                path.push(dependency.to_string());
                return Some(path);
            }
            if !visited.contains(dependency) {
                parent.insert(dependency, code);
                if let Some(path) = self.visit(dependency, visited, on_stack, parent) {
                    return Some(path);
                }
            }
        }

        on_stack.remove(code);
        None
    }
}
