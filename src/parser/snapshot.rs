//! Parser for JSON graph snapshots.
//!
//! This module reads snapshots written by [`crate::export`] (or by any host
//! application using the same layout) and checks that the two indices agree
//! before the graph is rebuilt from them.

use std::fs;
use std::path::Path;

use crate::graph::{DependencyGraph, GraphSnapshot};

/// Errors that can occur while loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to read the file from disk.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The snapshot indices contradict each other.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a snapshot file from a file path.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use depgraph::parser::parse_file;
///
/// let snapshot = parse_file(Path::new("depgraph.json")).unwrap();
/// println!("{} nodes", snapshot.node_count());
/// ```
pub fn parse_file(path: &Path) -> ParseResult<GraphSnapshot> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parses a snapshot from a string.
///
/// # Example
///
/// ```
/// use depgraph::parser::parse_str;
///
/// let json = r#"{"dependencies": {"n1": []}, "dependers": {"n1": []}}"#;
/// let snapshot = parse_str(json).unwrap();
/// assert_eq!(snapshot.node_count(), 1);
/// ```
pub fn parse_str(content: &str) -> ParseResult<GraphSnapshot> {
    let snapshot: GraphSnapshot = serde_json::from_str(content)?;
    Ok(snapshot)
}

/// Validates that a snapshot can be trusted as graph state.
///
/// Checks that:
/// - no node id is empty,
/// - every key of the reverse index is a node,
/// - every reverse edge `b <- a` is mirrored by a forward edge `a -> b`.
///
/// Forward edges to ids without a reverse entry are allowed; the graph keeps
/// edges to unregistered ids in the forward index only.
pub fn validate(snapshot: &GraphSnapshot) -> ParseResult<()> {
    if snapshot.dependencies.contains_key("") {
        return Err(ParseError::InvalidSnapshot(
            "node ids must not be empty".to_string(),
        ));
    }

    for (id, dependers) in &snapshot.dependers {
        if !snapshot.dependencies.contains_key(id) {
            return Err(ParseError::InvalidSnapshot(format!(
                "dependers index lists unknown node '{}'",
                id
            )));
        }

        for dependent in dependers {
            let mirrored = snapshot
                .dependencies
                .get(dependent)
                .is_some_and(|deps| deps.contains(id));
            if !mirrored {
                return Err(ParseError::InvalidSnapshot(format!(
                    "'{}' is listed as depending on '{}' but has no such dependency",
                    dependent, id
                )));
            }
        }
    }

    Ok(())
}

/// Parses, validates and rebuilds a graph from a snapshot string.
pub fn load_str(content: &str) -> ParseResult<DependencyGraph> {
    let snapshot = parse_str(content)?;
    validate(&snapshot)?;
    tracing::debug!(nodes = snapshot.node_count(), "loaded snapshot");
    Ok(DependencyGraph::from_snapshot(snapshot))
}

/// Parses, validates and rebuilds a graph from a snapshot file.
pub fn load_graph(path: &Path) -> ParseResult<DependencyGraph> {
    let content = fs::read_to_string(path)?;
    load_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TWO_NODES: &str = r#"{
        "dependencies": {"n1": [], "n2": ["n1"]},
        "dependers": {"n1": ["n2"], "n2": []},
        "cycleAllowed": false
    }"#;

    #[test]
    fn test_parse_str() {
        let snapshot = parse_str(TWO_NODES).unwrap();
        assert_eq!(snapshot.node_count(), 2);
        assert!(!snapshot.cycle_allowed);
        assert!(snapshot.dependencies["n2"].contains("n1"));
    }

    #[test]
    fn test_parse_invalid_json() {
        let result = parse_str("{ not json");
        assert!(matches!(result, Err(ParseError::JsonError(_))));
    }

    #[test]
    fn test_load_str_builds_graph() {
        let graph = load_str(TWO_NODES).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert!(graph.depends_on("n2", "n1"));
        assert!(graph.depended_by("n1", "n2"));
    }

    #[test]
    fn test_load_single_node_without_edges() {
        let graph = load_str(r#"{"dependencies": {"n1": []}, "dependers": {"n1": []}}"#).unwrap();
        assert!(!graph.has_dependencies("n1"));
        assert!(!graph.has_dependers("n1"));
    }

    #[test]
    fn test_validate_rejects_unknown_depender_key() {
        let snapshot = parse_str(r#"{"dependencies": {}, "dependers": {"ghost": []}}"#).unwrap();
        let err = validate(&snapshot).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_validate_rejects_unmirrored_reverse_edge() {
        let snapshot = parse_str(
            r#"{"dependencies": {"a": [], "b": []}, "dependers": {"a": ["b"], "b": []}}"#,
        )
        .unwrap();
        assert!(matches!(
            validate(&snapshot),
            Err(ParseError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        let snapshot = parse_str(r#"{"dependencies": {"": []}}"#).unwrap();
        assert!(validate(&snapshot).is_err());
    }

    #[test]
    fn test_validate_allows_forward_only_edges() {
        let snapshot =
            parse_str(r#"{"dependencies": {"app": ["external"]}, "dependers": {"app": []}}"#)
                .unwrap();
        assert!(validate(&snapshot).is_ok());
    }

    #[test]
    fn test_validate_accepts_exported_graph() {
        let mut graph = DependencyGraph::new();
        graph.add_node_with_dependencies("app", ["later"]);
        graph.add_node("later");
        graph.add_node_with_dependencies("cli", ["app"]);

        assert!(validate(&graph.export()).is_ok());
    }

    #[test]
    fn test_load_graph_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_NODES.as_bytes()).unwrap();

        let graph = load_graph(file.path()).unwrap();
        assert!(graph.depends_on("n2", "n1"));
    }

    #[test]
    fn test_load_graph_missing_file() {
        let result = load_graph(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ParseError::IoError(_))));
    }
}
