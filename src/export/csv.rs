//! CSV export implementation.
//!
//! Exports the forward index as an edge list for spreadsheet use.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// CSV exporter implementation.
pub struct CsvExporter;

impl CsvExporter {
    /// Escape a field value for CSV format.
    ///
    /// Wraps the value in quotes if it contains commas, quotes, or newlines.
    fn escape_field(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

impl Exporter for CsvExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "dependent,dependency,registered")?;

        // Nodes without edges still get a row so the node list survives
        for (id, deps) in &data.snapshot.dependencies {
            if deps.is_empty() {
                writeln!(writer, "{},,true", Self::escape_field(id))?;
            }
        }

        for (dependent, dependency) in data.edges() {
            writeln!(
                writer,
                "{},{},{}",
                Self::escape_field(dependent),
                Self::escape_field(dependency),
                data.is_node(dependency)
            )?;
        }

        Ok(())
    }
}
