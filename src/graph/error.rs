//! Error types for whole-graph analysis.

/// Errors returned by graph analyses that cannot proceed on the current
/// graph shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The graph contains a cycle, so no dependency order exists.
    #[error("cyclic dependency detected at node '{0}'")]
    CyclicDependency(String),
}
