//! depgraph - dependency graph with mirrored adjacency indices
//!
//! This crate provides a directed graph of "depends-on" relationships for
//! build systems, task runners and module loaders, plus snapshot parsing and
//! export helpers for persisting it.

pub mod export;
pub mod graph;
pub mod parser;
