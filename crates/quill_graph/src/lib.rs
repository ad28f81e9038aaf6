//! Dependency ordering for Quill injectors.
//!
//! `quill_graph` turns the codes referenced by one resolution request into
//! execution levels: every code in level *k* depends only on codes in levels
//! before *k*, so each level can run concurrently once the previous one is done.
//!
//! # Core Concepts
//!
//! - [`DependencyGraph`] - Directed graph over codes, edges point at dependencies
//! - [`InjectorLookup`] - Source of declared dependencies (the injector registry)
//! - [`GraphError`] - Cycle detection with a readable trace
//!
//! # Example
//!
//! ```
//! use quill_graph::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_edge("B", "A");
//! graph.add_edge("C", "A");
//! graph.add_edge("D", "B");
//! graph.add_edge("D", "C");
//!
//! let levels = graph.topological_sort()?;
//! assert_eq!(levels.len(), 3);
//! # Ok::<(), quill_graph::GraphError>(())
//! ```

/// Graph structure, leveled ordering and cycle detection.
pub mod graph;

pub use graph::{DependencyGraph, GraphError, InjectorLookup};
