//! Graph module for dependency relationship modeling.
//!
//! This module provides the [`DependencyGraph`] struct, which tracks
//! "depends-on" edges between named nodes in two mirrored indices and can
//! tell, before an edge is added, whether that edge would close a cycle.
//!
//! # Example
//!
//! ```rust
//! use depgraph::graph::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_node("react");
//! graph.add_node_with_dependencies("react-dom", ["react"]);
//!
//! assert_eq!(graph.node_count(), 2);
//! assert!(graph.depends_on("react-dom", "react"));
//! assert_eq!(graph.will_make_dependency_cycle("react", "react-dom"), Some(true));
//! ```

mod cycles;
mod dependency_graph;
mod error;
mod snapshot;

pub use cycles::CycleInfo;
pub use dependency_graph::{AddOutcome, DependencyGraph, RemovedNode};
pub use error::GraphError;
pub use snapshot::GraphSnapshot;
