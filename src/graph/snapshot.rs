//! Serializable graph state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Exported state of a [`DependencyGraph`](super::DependencyGraph).
///
/// Ordered collections keep serialized output stable between runs. In JSON
/// the fields are `dependencies`, `dependers` and `cycleAllowed`; the legacy
/// `dependables` name is accepted for the forward map when reading.
///
/// # Example
///
/// ```rust
/// use depgraph::graph::GraphSnapshot;
///
/// let json = r#"{"dependencies": {"a": [], "b": ["a"]}, "dependers": {"a": ["b"], "b": []}}"#;
/// let snapshot: GraphSnapshot = serde_json::from_str(json).unwrap();
/// assert!(!snapshot.cycle_allowed);
/// assert_eq!(snapshot.dependencies.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    /// Node id to the ids it depends on. Keys are the node list.
    #[serde(default, alias = "dependables")]
    pub dependencies: BTreeMap<String, BTreeSet<String>>,

    /// Node id to the ids that depend on it.
    #[serde(default)]
    pub dependers: BTreeMap<String, BTreeSet<String>>,

    /// Whether the graph skips the cycle pre-check.
    #[serde(default)]
    pub cycle_allowed: bool,
}

impl GraphSnapshot {
    /// Returns the number of nodes described by the snapshot.
    pub fn node_count(&self) -> usize {
        self.dependencies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_field_names() {
        let mut snapshot = GraphSnapshot {
            cycle_allowed: true,
            ..GraphSnapshot::default()
        };
        snapshot
            .dependencies
            .insert("a".to_string(), BTreeSet::new());

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["cycleAllowed"], true);
        assert!(value["dependencies"]["a"].as_array().unwrap().is_empty());
        assert!(value["dependers"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_accepts_dependables_alias() {
        let json = r#"{"dependables": {"n1": [], "n2": ["n1"]}}"#;
        let snapshot: GraphSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.node_count(), 2);
        assert!(snapshot.dependers.is_empty());
        assert!(snapshot.dependencies["n2"].contains("n1"));
    }

    #[test]
    fn test_snapshot_defaults() {
        let snapshot: GraphSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot, GraphSnapshot::default());
    }
}
