//! Dependency graph implementation backed by dual adjacency maps.
//!
//! The graph keeps a forward index (`dependencies[n]`, what `n` depends on)
//! and a reverse index (`dependers[n]`, what depends on `n`). Every mutator
//! updates both maps so that queries in either direction are a single lookup.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::snapshot::GraphSnapshot;

/// Result of adding a node to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddOutcome {
    /// A new node was created
    Added,
    /// The node already existed and its dependency set was replaced
    Updated,
    /// The input was malformed and the graph was left untouched
    Failed,
}

impl AddOutcome {
    /// Returns true for [`AddOutcome::Added`] and [`AddOutcome::Updated`].
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

impl fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "ADDED"),
            Self::Updated => write!(f, "UPDATED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Edges severed by [`DependencyGraph::remove_node`].
///
/// Both lists are sorted so callers can re-validate affected nodes in a
/// stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovedNode {
    /// Nodes the removed node depended on
    pub dependencies: Vec<String>,
    /// Nodes that depended on the removed node
    pub dependers: Vec<String>,
}

/// A directed graph of "depends-on" relationships between named nodes.
///
/// An edge `a -> b` means `a` depends on `b`: `b` must be present, built or
/// loaded before `a`.
///
/// # Example
///
/// ```rust
/// use depgraph::graph::{AddOutcome, DependencyGraph};
///
/// let mut graph = DependencyGraph::new();
/// assert_eq!(graph.add_node("core"), AddOutcome::Added);
/// assert_eq!(graph.add_node_with_dependencies("app", ["core"]), AddOutcome::Added);
///
/// assert!(graph.depends_on("app", "core"));
/// assert!(graph.depended_by("core", "app"));
/// assert_eq!(graph.will_make_dependency_cycle("core", "app"), Some(true));
/// ```
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Forward index, also the authoritative membership list
    dependencies: HashMap<String, HashSet<String>>,
    /// Reverse index, inverse of `dependencies` for registered targets
    dependers: HashMap<String, HashSet<String>>,
    /// Cached `dependencies.len()`
    node_count: usize,
    /// Skips the cycle pre-check when set
    cycle_allowed: bool,
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
}

impl DependencyGraph {
    /// Creates a new empty graph that rejects cycles.
    ///
    /// # Example
    ///
    /// ```rust
    /// use depgraph::graph::DependencyGraph;
    ///
    /// let graph = DependencyGraph::new();
    /// assert!(!graph.has_nodes());
    /// assert_eq!(graph.node_count(), 0);
    /// ```
    pub fn new() -> Self {
        Self::with_cycles_allowed(false)
    }

    /// Creates a new empty graph with the given cycle mode.
    ///
    /// When `cycle_allowed` is true, [`will_make_dependency_cycle`] performs
    /// no check and returns `None`.
    ///
    /// [`will_make_dependency_cycle`]: Self::will_make_dependency_cycle
    pub fn with_cycles_allowed(cycle_allowed: bool) -> Self {
        Self {
            dependencies: HashMap::new(),
            dependers: HashMap::new(),
            node_count: 0,
            cycle_allowed,
        }
    }

    /// Creates a new graph with pre-allocated capacity for `nodes` nodes.
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            dependencies: HashMap::with_capacity(nodes),
            dependers: HashMap::with_capacity(nodes),
            node_count: 0,
            cycle_allowed: false,
        }
    }

    /// Rebuilds a graph from a previously exported snapshot.
    ///
    /// The snapshot is trusted as-is. Use [`crate::parser::validate`] first
    /// when it comes from an untrusted source.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let dependencies: HashMap<String, HashSet<String>> = snapshot
            .dependencies
            .into_iter()
            .map(|(id, deps)| (id, deps.into_iter().collect()))
            .collect();
        let dependers = snapshot
            .dependers
            .into_iter()
            .map(|(id, deps)| (id, deps.into_iter().collect()))
            .collect();

        Self {
            node_count: dependencies.len(),
            dependencies,
            dependers,
            cycle_allowed: snapshot.cycle_allowed,
        }
    }

    /// Returns a point-in-time copy of the graph state for persistence.
    ///
    /// # Example
    ///
    /// ```rust
    /// use depgraph::graph::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_node("a");
    /// graph.add_node_with_dependencies("b", ["a"]);
    ///
    /// let restored = DependencyGraph::from_snapshot(graph.export());
    /// assert!(restored.depends_on("b", "a"));
    /// assert_eq!(restored.node_count(), 2);
    /// ```
    pub fn export(&self) -> GraphSnapshot {
        GraphSnapshot {
            dependencies: self
                .dependencies
                .iter()
                .map(|(id, deps)| (id.clone(), deps.iter().cloned().collect()))
                .collect(),
            dependers: self
                .dependers
                .iter()
                .map(|(id, deps)| (id.clone(), deps.iter().cloned().collect()))
                .collect(),
            cycle_allowed: self.cycle_allowed,
        }
    }

    /// Consumes the graph and returns its state as a snapshot.
    pub fn into_snapshot(self) -> GraphSnapshot {
        GraphSnapshot {
            dependencies: self
                .dependencies
                .into_iter()
                .map(|(id, deps)| (id, deps.into_iter().collect()))
                .collect(),
            dependers: self
                .dependers
                .into_iter()
                .map(|(id, deps)| (id, deps.into_iter().collect()))
                .collect(),
            cycle_allowed: self.cycle_allowed,
        }
    }

    /// Returns true if the cycle pre-check is disabled for this graph.
    pub fn cycle_allowed(&self) -> bool {
        self.cycle_allowed
    }

    /// Checks if `id` is a registered node.
    pub fn is_node(&self, id: &str) -> bool {
        self.dependencies.contains_key(id)
    }

    /// Returns the number of nodes in the graph.
    ///
    /// This is a cached counter, not a scan of the node map.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns true if the graph has at least one node.
    pub fn has_nodes(&self) -> bool {
        self.node_count > 0
    }

    /// Checks if the graph is empty.
    pub fn is_empty(&self) -> bool {
        !self.has_nodes()
    }

    /// Returns the number of forward edges, including edges to ids that
    /// were never registered.
    pub fn edge_count(&self) -> usize {
        self.dependencies.values().map(HashSet::len).sum()
    }

    /// Iterates over all registered node ids in arbitrary order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    /// Returns true if `id` is a node that depends on at least one id.
    pub fn has_dependencies(&self, id: &str) -> bool {
        self.dependencies
            .get(id)
            .is_some_and(|deps| !deps.is_empty())
    }

    /// Returns true if `id` is a node that at least one node depends on.
    pub fn has_dependers(&self, id: &str) -> bool {
        self.is_node(id)
            && self
                .dependers
                .get(id)
                .is_some_and(|deps| !deps.is_empty())
    }

    /// Checks whether `n1` directly depends on `n2`.
    ///
    /// Unknown nodes are not an error; they simply have no relationships.
    ///
    /// # Example
    ///
    /// ```rust
    /// use depgraph::graph::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_node("m1");
    /// graph.add_node_with_dependencies("m2", ["m1"]);
    ///
    /// assert!(graph.depends_on("m2", "m1"));
    /// assert!(!graph.depends_on("m1", "m2"));
    /// assert!(!graph.depends_on("m2", "missing"));
    /// ```
    pub fn depends_on(&self, n1: &str, n2: &str) -> bool {
        if !self.has_dependencies(n1) || !self.has_dependers(n2) {
            return false;
        }

        self.dependencies
            .get(n1)
            .is_some_and(|deps| deps.contains(n2))
    }

    /// Checks whether `n1` is directly depended on by `n2`.
    pub fn depended_by(&self, n1: &str, n2: &str) -> bool {
        if !self.has_dependers(n1) || !self.has_dependencies(n2) {
            return false;
        }

        self.dependers
            .get(n1)
            .is_some_and(|deps| deps.contains(n2))
    }

    /// Returns the ids `id` depends on.
    ///
    /// Returns `None` both for unknown ids and for nodes without
    /// dependencies. Use [`is_node`](Self::is_node) when the distinction
    /// matters.
    pub fn get_dependencies(&self, id: &str) -> Option<&HashSet<String>> {
        self.dependencies.get(id).filter(|deps| !deps.is_empty())
    }

    /// Returns the ids that depend on `id`.
    ///
    /// Same `None` semantics as [`get_dependencies`](Self::get_dependencies).
    pub fn get_dependers(&self, id: &str) -> Option<&HashSet<String>> {
        if !self.is_node(id) {
            return None;
        }

        self.dependers.get(id).filter(|deps| !deps.is_empty())
    }

    /// Adds a node without dependencies.
    ///
    /// If the node already exists its dependency set is cleared and
    /// [`AddOutcome::Updated`] is returned.
    pub fn add_node(&mut self, id: &str) -> AddOutcome {
        self.add_node_with_dependencies(id, std::iter::empty::<String>())
    }

    /// Adds a node that depends on `dependencies`.
    ///
    /// `dependencies` may be an ordered list or a pre-built set; duplicates
    /// collapse into a single edge. Ids that are not registered yet are kept
    /// in the forward index but are not mirrored in the reverse index.
    ///
    /// Returns [`AddOutcome::Failed`] without touching the graph if `id` or
    /// any dependency id is empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use depgraph::graph::{AddOutcome, DependencyGraph};
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_node("a");
    /// graph.add_node("b");
    ///
    /// assert_eq!(graph.add_node_with_dependencies("c", vec!["a"]), AddOutcome::Added);
    /// assert_eq!(graph.add_node_with_dependencies("c", ["b"]), AddOutcome::Updated);
    /// assert_eq!(graph.add_node_with_dependencies("", ["a"]), AddOutcome::Failed);
    ///
    /// assert!(graph.depends_on("c", "b"));
    /// assert!(!graph.depends_on("c", "a"));
    /// ```
    pub fn add_node_with_dependencies<I, S>(&mut self, id: &str, dependencies: I) -> AddOutcome
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dependencies: HashSet<String> = dependencies.into_iter().map(Into::into).collect();

        if !is_valid_id(id) || !dependencies.iter().all(|dep| is_valid_id(dep)) {
            tracing::debug!(id, "rejected malformed node");
            return AddOutcome::Failed;
        }

        if self.is_node(id) {
            self.replace_dependencies(id, dependencies);
            tracing::debug!(id, "updated node");
            return AddOutcome::Updated;
        }

        self.dependencies.insert(id.to_string(), HashSet::new());
        self.dependers.entry(id.to_string()).or_default();
        self.node_count += 1;
        self.replace_dependencies(id, dependencies);

        tracing::debug!(id, nodes = self.node_count, "added node");
        AddOutcome::Added
    }

    /// Removes a node and severs every edge that references it.
    ///
    /// Returns `None` if `id` is not a node. Otherwise returns the ids on
    /// both sides of the severed edges so the caller can react to them.
    ///
    /// # Example
    ///
    /// ```rust
    /// use depgraph::graph::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_node("n1");
    /// graph.add_node_with_dependencies("n2", ["n1"]);
    ///
    /// let removed = graph.remove_node("n1").unwrap();
    /// assert_eq!(removed.dependers, vec!["n2".to_string()]);
    /// assert!(!graph.has_dependencies("n2"));
    /// assert!(graph.remove_node("n1").is_none());
    /// ```
    pub fn remove_node(&mut self, id: &str) -> Option<RemovedNode> {
        let forward = self.dependencies.remove(id)?;
        let reverse = self.dependers.remove(id).unwrap_or_default();

        for dependency in &forward {
            if let Some(set) = self.dependers.get_mut(dependency) {
                set.remove(id);
            }
        }

        for dependent in &reverse {
            if let Some(set) = self.dependencies.get_mut(dependent) {
                set.remove(id);
            }
        }

        self.node_count -= 1;
        tracing::debug!(id, nodes = self.node_count, "removed node");

        let mut dependencies: Vec<String> = forward.into_iter().collect();
        let mut dependers: Vec<String> = reverse.into_iter().collect();
        dependencies.sort();
        dependers.sort();

        Some(RemovedNode {
            dependencies,
            dependers,
        })
    }

    /// Renames a node, rewriting every edge that references it.
    ///
    /// Returns false without changes if `old_id` is not a node, or if
    /// `new_id` is empty, already a node, or already held as an unregistered
    /// dependency. Taking an id that is already referenced would merge two
    /// distinct edges into one.
    pub fn change_id(&mut self, old_id: &str, new_id: &str) -> bool {
        if !self.is_node(old_id) || !is_valid_id(new_id) || self.is_node(new_id) {
            return false;
        }
        if self.dependencies.values().any(|deps| deps.contains(new_id)) {
            tracing::debug!(old_id, new_id, "rename target is an unregistered dependency");
            return false;
        }

        let forward = self.dependencies.remove(old_id).unwrap_or_default();
        let reverse = self.dependers.remove(old_id).unwrap_or_default();
        self.dependencies.insert(new_id.to_string(), forward);
        self.dependers.insert(new_id.to_string(), reverse);

        // Forward-only references to `old_id` are not reachable through the
        // reverse index, so every set is checked.
        for set in self
            .dependencies
            .values_mut()
            .chain(self.dependers.values_mut())
        {
            if set.remove(old_id) {
                set.insert(new_id.to_string());
            }
        }

        tracing::debug!(old_id, new_id, "renamed node");
        true
    }

    /// Replaces the full dependency set of an existing node.
    ///
    /// Returns false if `id` is not a node or any dependency id is empty.
    pub fn update_dependencies<I, S>(&mut self, id: &str, dependencies: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.is_node(id) {
            return false;
        }

        let dependencies: HashSet<String> = dependencies.into_iter().map(Into::into).collect();
        if !dependencies.iter().all(|dep| is_valid_id(dep)) {
            return false;
        }

        self.replace_dependencies(id, dependencies);
        true
    }

    /// Adds the edge `dependent -> dependency`.
    ///
    /// Both ids must be registered, non-empty nodes. Adding an edge that
    /// already exists is a successful no-op.
    ///
    /// # Example
    ///
    /// ```rust
    /// use depgraph::graph::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_node("a");
    /// graph.add_node("b");
    ///
    /// assert!(graph.add_dependency("a", "b"));
    /// assert!(graph.depends_on("a", "b"));
    /// assert!(!graph.add_dependency("a", "missing"));
    /// ```
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) -> bool {
        if !is_valid_id(dependent)
            || !is_valid_id(dependency)
            || !self.is_node(dependent)
            || !self.is_node(dependency)
        {
            return false;
        }

        if let Some(set) = self.dependencies.get_mut(dependent) {
            if set.insert(dependency.to_string()) {
                tracing::trace!(dependent, dependency, "added edge");
            }
        }
        self.dependers
            .entry(dependency.to_string())
            .or_default()
            .insert(dependent.to_string());

        true
    }

    /// Adds an edge from `dependent` to each id, skipping ids that fail.
    pub fn add_dependencies<I, S>(&mut self, dependent: &str, dependencies: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for dependency in dependencies {
            self.add_dependency(dependent, dependency.as_ref());
        }
    }

    /// Removes the edge `dependent -> dependency` from both indices.
    ///
    /// Returns false if either id is not a node.
    pub fn remove_dependency(&mut self, dependent: &str, dependency: &str) -> bool {
        if !self.is_node(dependent) || !self.is_node(dependency) {
            return false;
        }

        if let Some(set) = self.dependencies.get_mut(dependent) {
            if set.remove(dependency) {
                tracing::trace!(dependent, dependency, "removed edge");
            }
        }
        if let Some(set) = self.dependers.get_mut(dependency) {
            set.remove(dependent);
        }

        true
    }

    /// Removes the edge from `dependent` to each id, skipping ids that fail.
    pub fn remove_dependencies<I, S>(&mut self, dependent: &str, dependencies: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for dependency in dependencies {
            self.remove_dependency(dependent, dependency.as_ref());
        }
    }

    /// Answers whether making `existing_id` depend on `target_id` would
    /// close a cycle.
    ///
    /// Walks everything reachable from `target_id`'s dependencies and
    /// reports `Some(true)` as soon as `existing_id` is found. Returns `None`
    /// when the graph allows cycles, in which case no check is performed.
    ///
    /// `existing_id == target_id` returns `Some(true)` without walking. A
    /// plain walk would only find the node again if it already had a
    /// self-loop, but the requested edge is itself a one-edge cycle.
    ///
    /// The walk keeps no visited set: the graph must already be acyclic,
    /// otherwise the call does not terminate.
    ///
    /// # Example
    ///
    /// ```rust
    /// use depgraph::graph::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_node("n1");
    /// graph.add_node_with_dependencies("n2", ["n1"]);
    /// graph.add_node_with_dependencies("n3", ["n2"]);
    ///
    /// assert_eq!(graph.will_make_dependency_cycle("n1", "n3"), Some(true));
    /// assert_eq!(graph.will_make_dependency_cycle("n3", "n1"), Some(false));
    /// ```
    pub fn will_make_dependency_cycle(&self, existing_id: &str, target_id: &str) -> Option<bool> {
        if self.cycle_allowed {
            return None;
        }

        if existing_id == target_id {
            return Some(true);
        }

        let mut stack: Vec<&str> = self
            .dependencies
            .get(target_id)
            .map(|deps| deps.iter().map(String::as_str).collect())
            .unwrap_or_default();

        while let Some(current) = stack.pop() {
            if current == existing_id {
                return Some(true);
            }
            if let Some(next) = self.dependencies.get(current) {
                stack.extend(next.iter().map(String::as_str));
            }
        }

        Some(false)
    }

    /// Swaps in a new forward set for `id`, keeping the reverse index in sync.
    ///
    /// `id` must already be a node.
    fn replace_dependencies(&mut self, id: &str, dependencies: HashSet<String>) {
        let previous = self
            .dependencies
            .insert(id.to_string(), HashSet::new())
            .unwrap_or_default();

        for dependency in &previous {
            if let Some(set) = self.dependers.get_mut(dependency) {
                set.remove(id);
            }
        }

        for dependency in &dependencies {
            if self.is_node(dependency) {
                self.dependers
                    .entry(dependency.clone())
                    .or_default()
                    .insert(id.to_string());
            }
        }

        self.dependencies.insert(id.to_string(), dependencies);
    }
}

impl From<GraphSnapshot> for DependencyGraph {
    fn from(snapshot: GraphSnapshot) -> Self {
        Self::from_snapshot(snapshot)
    }
}
