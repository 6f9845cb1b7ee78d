//! Rendering-ready syntax tree graph.
//!
//! [`AstGraph`] is the accumulator the graph builder writes into and the
//! renderer reads from. It is a directed graph backed by
//! [`petgraph::graph::DiGraph`], but it only exposes tree-shaped insertion:
//! a root is added once, and every other node is added together with the
//! single edge that connects it to its parent.
//!
//! # Example
//!
//! ```
//! use astviz_core::graph::AstGraph;
//!
//! let mut graph = AstGraph::new();
//! let root = graph.add_root("Module");
//! let child = graph.add_child(root, "Assignment");
//!
//! assert_eq!(graph.node_count(), 2);
//! assert_eq!(graph.parent(child), Some(root));
//! ```

use std::fmt;

use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

/// Opaque identifier of a node inside one [`AstGraph`].
///
/// Identifiers are unique within the graph that issued them. Their
/// [`Display`](fmt::Display) form (`n0`, `n1`, ...) is safe to use as a
/// node name in rendering formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(NodeIndex);

impl NodeId {
    /// Returns the zero-based insertion position of the node.
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0.index())
    }
}

/// A labeled node of the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    id: NodeId,
    label: String,
}

impl GraphNode {
    /// Returns the node identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the display label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Directed parent-to-child graph of syntax tree nodes.
#[derive(Debug, Default, Clone)]
pub struct AstGraph {
    inner: DiGraph<String, ()>,
    root: Option<NodeId>,
}

impl AstGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the root node and returns its identifier.
    ///
    /// The root is the only node without a parent edge. Calling this on a
    /// graph that already has a root returns the existing root and leaves
    /// its label untouched.
    pub fn add_root(&mut self, label: impl Into<String>) -> NodeId {
        if let Some(root) = self.root {
            return root;
        }
        let root = NodeId(self.inner.add_node(label.into()));
        self.root = Some(root);
        root
    }

    /// Adds a node labeled `label` with a single edge from `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not issued by this graph.
    pub fn add_child(&mut self, parent: NodeId, label: impl Into<String>) -> NodeId {
        let child = self.inner.add_node(label.into());
        self.inner.add_edge(parent.0, child, ());
        NodeId(child)
    }

    /// Returns the root node identifier, if a root was added.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns the node with the given identifier.
    pub fn node(&self, id: NodeId) -> Option<GraphNode> {
        self.inner.node_weight(id.0).map(|label| GraphNode {
            id,
            label: label.clone(),
        })
    }

    /// Returns the label of the node with the given identifier.
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.inner.node_weight(id.0).map(String::as_str)
    }

    /// Returns the parent of a node, or `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.inner
            .neighbors_directed(id.0, Direction::Incoming)
            .next()
            .map(NodeId)
    }

    /// Returns the children of a node in insertion order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        // petgraph walks adjacency lists newest-first.
        let mut children: Vec<NodeId> = self
            .inner
            .neighbors_directed(id.0, Direction::Outgoing)
            .map(NodeId)
            .collect();
        children.reverse();
        children
    }

    /// Iterates over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = GraphNode> + '_ {
        self.inner.node_indices().map(|index| GraphNode {
            id: NodeId(index),
            label: self.inner[index].clone(),
        })
    }

    /// Iterates over all `(parent, child)` edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.inner
            .edge_references()
            .map(|edge| (NodeId(edge.source()), NodeId(edge.target())))
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }
}
