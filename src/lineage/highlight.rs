//! Click-to-toggle highlight state.

use std::collections::BTreeSet;

use log::debug;

use super::{compute_lineage, Direction};
use crate::graph::{EdgeId, Graph};
use crate::integrity::Renamed;
use crate::naming::FieldHandle;

/// The current highlight set and the field it was computed from.
///
/// Selecting a field highlights its lineage. Selecting the same field again
/// clears the highlight; selecting another field replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlighter {
    root: Option<FieldHandle>,
    edges: BTreeSet<EdgeId>,
    direction: Direction,
}

impl Highlighter {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// Toggle the highlight for `root`.
    pub fn select(&mut self, graph: &Graph, root: FieldHandle) {
        if self.root.as_ref() == Some(&root) {
            debug!("clearing highlight for {}", root);
            self.clear();
            return;
        }
        self.edges = compute_lineage(graph, &root, self.direction);
        debug!(
            "highlighting {} {} edges from {}",
            self.edges.len(),
            self.direction,
            root
        );
        self.root = Some(root);
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.edges.clear();
    }

    /// Switch traversal direction. A change clears the current highlight.
    pub fn set_direction(&mut self, direction: Direction) {
        if self.direction != direction {
            self.direction = direction;
            self.clear();
        }
    }

    /// Move the root to where a rename put it.
    pub fn follow(&mut self, renamed: &Renamed) {
        if let Some(root) = &mut self.root {
            *root = renamed.carry(root);
        }
    }

    /// Recompute after the graph changed.
    ///
    /// A root whose field no longer exists clears the highlight.
    pub fn refresh(&mut self, graph: &Graph) {
        let Some(root) = &self.root else {
            return;
        };
        if graph.has_field(root) {
            self.edges = compute_lineage(graph, root, self.direction);
        } else {
            self.clear();
        }
    }

    pub fn root(&self) -> Option<&FieldHandle> {
        self.root.as_ref()
    }

    pub fn edges(&self) -> &BTreeSet<EdgeId> {
        &self.edges
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_active(&self) -> bool {
        self.root.is_some()
    }

    pub fn is_highlighted(&self, id: &EdgeId) -> bool {
        self.edges.contains(id)
    }
}
