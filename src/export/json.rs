//! JSON export implementation.
//!
//! Writes the graph snapshot as pretty-printed JSON. The output is the
//! construction input format, so it can be loaded back unchanged.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&data.snapshot)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}
