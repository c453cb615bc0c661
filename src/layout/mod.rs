//! Node placement.
//!
//! A [`Layout`] maps nodes and edges to positions and nothing else; it never
//! sees field-level identifiers. [`Graph::apply_layout`] installs a result,
//! overwriting every position at once.
//!
//! Two layouts ship with the crate:
//! - [`StackedLayout`]: one column (or row) in node order, the import default
//! - [`LayeredLayout`]: entities ranked by longest reference path

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use petgraph::algo::{condensation, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::graph::{Edge, Graph, Node, Position};

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Layout produced no position for node '{0}'")]
    MissingPosition(String),

    #[error("Layout could not order nodes: cycle through '{0}'")]
    Cycle(String),
}

/// Main axis of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutDirection {
    /// Left to right.
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    /// Top to bottom.
    #[serde(rename = "TB")]
    TopBottom,
}

impl fmt::Display for LayoutDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutDirection::LeftRight => write!(f, "LR"),
            LayoutDirection::TopBottom => write!(f, "TB"),
        }
    }
}

impl FromStr for LayoutDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LR" => Ok(LayoutDirection::LeftRight),
            "TB" => Ok(LayoutDirection::TopBottom),
            _ => Err(format!("unknown layout direction: {}", s)),
        }
    }
}

/// Positions keyed by node id.
pub type Positions = IndexMap<String, Position>;

/// A pure placement function.
pub trait Layout {
    fn layout(&self, nodes: &[Node], edges: &[Edge], direction: LayoutDirection) -> LayoutResult<Positions>;
}

// =============================================================================
// Stacked
// =============================================================================

/// Every node in one line, spaced by `spacing`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackedLayout {
    pub spacing: f64,
}

impl Default for StackedLayout {
    fn default() -> Self {
        Self {
            spacing: crate::transform::PLACEHOLDER_ROW_HEIGHT,
        }
    }
}

impl Layout for StackedLayout {
    fn layout(&self, nodes: &[Node], _edges: &[Edge], direction: LayoutDirection) -> LayoutResult<Positions> {
        Ok(nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let offset = i as f64 * self.spacing;
                let position = match direction {
                    // A left-to-right graph stacks its single rank vertically.
                    LayoutDirection::LeftRight => Position::new(0.0, offset),
                    LayoutDirection::TopBottom => Position::new(offset, 0.0),
                };
                (node.id.clone(), position)
            })
            .collect())
    }
}

// =============================================================================
// Layered
// =============================================================================

/// Ranks entities so every reference points forward along the main axis.
///
/// Entities on a reference cycle share a rank. Within a rank, nodes keep
/// graph order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayeredLayout {
    /// Distance between ranks.
    pub rank_spacing: f64,
    /// Distance between nodes within a rank.
    pub node_spacing: f64,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            rank_spacing: 320.0,
            node_spacing: crate::transform::PLACEHOLDER_ROW_HEIGHT,
        }
    }
}

impl Layout for LayeredLayout {
    fn layout(&self, nodes: &[Node], edges: &[Edge], direction: LayoutDirection) -> LayoutResult<Positions> {
        let mut entities: DiGraph<usize, ()> = DiGraph::new();
        let index: HashMap<&str, NodeIndex> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), entities.add_node(i)))
            .collect();

        for edge in edges {
            if edge.source == edge.target {
                continue;
            }
            if let (Some(&from), Some(&to)) =
                (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
            {
                entities.update_edge(from, to, ());
            }
        }

        let dag = condensation(entities, true);
        let order = toposort(&dag, None).map_err(|cycle| {
            let id = dag
                .node_weight(cycle.node_id())
                .and_then(|members| members.first())
                .and_then(|&i| nodes.get(i))
                .map(|n| n.id.clone())
                .unwrap_or_default();
            LayoutError::Cycle(id)
        })?;

        let mut rank = vec![0usize; nodes.len()];
        let mut component_rank: HashMap<NodeIndex, usize> = HashMap::new();
        for component in order {
            let r = dag
                .neighbors_directed(component, petgraph::Direction::Incoming)
                .filter_map(|pred| component_rank.get(&pred))
                .map(|r| r + 1)
                .max()
                .unwrap_or(0);
            component_rank.insert(component, r);
            if let Some(members) = dag.node_weight(component) {
                for &i in members {
                    rank[i] = r;
                }
            }
        }

        let mut filled: HashMap<usize, usize> = HashMap::new();
        let mut positions = Positions::new();
        for (i, node) in nodes.iter().enumerate() {
            let slot = filled.entry(rank[i]).or_insert(0);
            let along = rank[i] as f64 * self.rank_spacing;
            let across = *slot as f64 * self.node_spacing;
            *slot += 1;
            let position = match direction {
                LayoutDirection::LeftRight => Position::new(along, across),
                LayoutDirection::TopBottom => Position::new(across, along),
            };
            positions.insert(node.id.clone(), position);
        }
        Ok(positions)
    }
}

// =============================================================================
// Graph
// =============================================================================

impl Graph {
    /// Overwrite every node position.
    ///
    /// Fails without touching the graph when a node has no position.
    pub fn apply_layout(&mut self, positions: &Positions) -> LayoutResult<()> {
        if let Some(missing) = self.nodes.iter().find(|n| !positions.contains_key(&n.id)) {
            return Err(LayoutError::MissingPosition(missing.id.clone()));
        }
        for node in &mut self.nodes {
            if let Some(position) = positions.get(&node.id) {
                node.position = *position;
            }
        }
        Ok(())
    }

    /// Run `layout` over this graph and install the result.
    pub fn relayout(&mut self, layout: &dyn Layout, direction: LayoutDirection) -> LayoutResult<()> {
        let positions = layout.layout(&self.nodes, &self.edges, direction)?;
        self.apply_layout(&positions)
    }
}
