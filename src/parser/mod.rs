//! Parser module for graph snapshots.
//!
//! Snapshots are the JSON form of [`GraphSnapshot`](crate::graph::GraphSnapshot):
//! the forward index, the reverse index and the cycle mode flag.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use depgraph::parser;
//!
//! // Load, validate and rebuild a previously exported graph
//! let graph = parser::load_graph(Path::new("depgraph.json")).unwrap();
//!
//! println!("Loaded {} nodes", graph.node_count());
//! ```

pub mod snapshot;

pub use snapshot::{
    load_graph, load_str, parse_file, parse_str, validate, ParseError, ParseResult,
};
