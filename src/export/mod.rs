//! Export functionality for dependency graphs.
//!
//! This module provides exporters for writing graph state in various
//! formats: a JSON snapshot that can be loaded back, a CSV edge list and a
//! Markdown report.

pub mod csv;
pub mod json;
pub mod markdown;

use crate::graph::{CycleInfo, DependencyGraph, GraphSnapshot};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// JSON snapshot - loadable with [`crate::parser::load_graph`]
    #[default]
    Json,
    /// CSV edge list - spreadsheet-friendly
    Csv,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: json, csv, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Data container for export operations.
///
/// Holds an ordered snapshot of the graph together with derived figures,
/// so every exporter sees the same point-in-time state.
#[derive(Debug, Clone)]
pub struct ExportData {
    /// Graph state, ordered by node id
    pub snapshot: GraphSnapshot,
    /// Number of registered nodes
    pub node_count: usize,
    /// Number of forward edges
    pub edge_count: usize,
    /// Detected circular dependencies
    pub cycles: Vec<CycleInfo>,
}

impl ExportData {
    /// Collect export data from a graph.
    pub fn new(graph: &DependencyGraph) -> Self {
        Self {
            snapshot: graph.export(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            cycles: graph.detect_cycles(),
        }
    }

    /// Iterate over `(dependent, dependency)` pairs in id order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.snapshot.dependencies.iter().flat_map(|(dependent, deps)| {
            deps.iter()
                .map(move |dependency| (dependent.as_str(), dependency.as_str()))
        })
    }

    /// Returns true if `id` has an entry in the forward index.
    pub fn is_node(&self, id: &str) -> bool {
        self.snapshot.dependencies.contains_key(id)
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export a graph in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    graph: &DependencyGraph,
    writer: &mut W,
) -> io::Result<()> {
    let data = ExportData::new(graph);
    match format {
        ExportFormat::Json => json::JsonExporter.export(&data, writer),
        ExportFormat::Csv => csv::CsvExporter.export(&data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(&data, writer),
    }
}

/// Export a graph to a string.
pub fn export_to_string(format: ExportFormat, graph: &DependencyGraph) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, graph, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Export a graph to a file, replacing any existing content.
pub fn export_to_file(format: ExportFormat, graph: &DependencyGraph, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    export(format, graph, &mut writer)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), %format, "exported graph");
    Ok(())
}
