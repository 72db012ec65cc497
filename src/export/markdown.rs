//! Markdown export implementation.
//!
//! Exports a summary and a per-node table for documentation and reporting.

use super::{ExportData, Exporter};
use std::collections::BTreeSet;
use std::io::{self, Write};

/// Markdown exporter implementation.
pub struct MarkdownExporter;

fn join_ids(ids: Option<&BTreeSet<String>>) -> String {
    match ids {
        Some(ids) if !ids.is_empty() => ids
            .iter()
            .map(|id| format!("`{}`", id))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "-".to_string(),
    }
}

impl Exporter for MarkdownExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "# Dependency Graph Report")?;
        writeln!(writer)?;

        // Summary section
        writeln!(writer, "## Summary")?;
        writeln!(writer)?;
        writeln!(writer, "| Metric | Value |")?;
        writeln!(writer, "|--------|-------|")?;
        writeln!(writer, "| Nodes | {} |", data.node_count)?;
        writeln!(writer, "| Edges | {} |", data.edge_count)?;
        writeln!(writer, "| Circular Dependencies | {} |", data.cycles.len())?;
        writeln!(
            writer,
            "| Cycles Allowed | {} |",
            if data.snapshot.cycle_allowed { "yes" } else { "no" }
        )?;
        writeln!(writer)?;

        if data.node_count > 0 {
            writeln!(writer, "## Nodes")?;
            writeln!(writer)?;
            writeln!(writer, "| Node | Depends On | Depended On By |")?;
            writeln!(writer, "|------|------------|----------------|")?;
            for (id, deps) in &data.snapshot.dependencies {
                writeln!(
                    writer,
                    "| `{}` | {} | {} |",
                    id,
                    join_ids(Some(deps)),
                    join_ids(data.snapshot.dependers.get(id))
                )?;
            }
            writeln!(writer)?;
        }

        if !data.cycles.is_empty() {
            writeln!(writer, "## Circular Dependencies")?;
            writeln!(writer)?;
            for cycle in &data.cycles {
                writeln!(writer, "- {}", cycle.cycle_path())?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DependencyGraph;

    fn render(graph: &DependencyGraph) -> String {
        let mut output = Vec::new();
        MarkdownExporter
            .export(&ExportData::new(graph), &mut output)
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_markdown_export_basic() {
        let mut graph = DependencyGraph::new();
        graph.add_node("react");
        graph.add_node_with_dependencies("react-dom", ["react"]);

        let md = render(&graph);
        assert!(md.starts_with("# Dependency Graph Report"));
        assert!(md.contains("| Nodes | 2 |"));
        assert!(md.contains("| Edges | 1 |"));
        assert!(md.contains("| `react` | - | `react-dom` |"));
        assert!(md.contains("| `react-dom` | `react` | - |"));
        assert!(!md.contains("## Circular Dependencies"));
    }

    #[test]
    fn test_markdown_export_empty_graph() {
        let md = render(&DependencyGraph::new());
        assert!(md.contains("| Nodes | 0 |"));
        assert!(!md.contains("## Nodes"));
    }

    #[test]
    fn test_markdown_export_with_cycles() {
        let mut graph = DependencyGraph::with_cycles_allowed(true);
        graph.add_node("a");
        graph.add_node_with_dependencies("b", ["a"]);
        graph.add_dependency("a", "b");

        let md = render(&graph);
        assert!(md.contains("| Cycles Allowed | yes |"));
        assert!(md.contains("## Circular Dependencies"));
        assert!(md.contains("- a -> b -> a"));
    }
}
