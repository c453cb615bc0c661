//! Graph - flattened node/edge form of a schema model.
//!
//! A [`Graph`] is an owned value. Edits never mutate a graph that callers
//! can see: [`Graph::apply`](crate::integrity) works on a copy and returns
//! the new graph, bumping [`Graph::version`] when something changed.
//!
//! The module is organized into submodules:
//! - `types`: nodes, fields, edges and their identifiers
//! - `query`: identifier resolution and read-only queries

mod query;
mod types;

pub use query::{InertReason, InertReference};
pub use types::{Calculation, Edge, EdgeId, EdgeKind, Field, Node, NodeData, Position};

use serde::Serialize;

use crate::naming::FieldHandle;

/// Entities as nodes, field references as edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) version: u64,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of applied changes since this graph was built.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn field(&self, handle: &FieldHandle) -> Option<&Field> {
        self.node(&handle.entity)?.field(&handle.field)
    }

    pub(crate) fn field_mut(&mut self, handle: &FieldHandle) -> Option<&mut Field> {
        self.node_mut(&handle.entity)?.field_mut(&handle.field)
    }

    pub fn has_field(&self, handle: &FieldHandle) -> bool {
        self.field(handle).is_some()
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| &e.id == id)
    }

    pub fn has_edge(&self, id: &EdgeId) -> bool {
        self.edge(id).is_some()
    }

    /// Append a node. Callers guarantee the id is free.
    pub(crate) fn push_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Append an edge unless one with the same id exists.
    /// Returns false when the edge was already present.
    pub(crate) fn push_edge(&mut self, edge: Edge) -> bool {
        if self.has_edge(&edge.id) {
            return false;
        }
        self.edges.push(edge);
        true
    }
}
