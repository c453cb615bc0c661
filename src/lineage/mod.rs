//! Field-level lineage traversal.
//!
//! Answers "what does this field depend on?" (upstream) and "what does this
//! field feed?" (downstream) as a set of edge ids, for highlighting.
//!
//! # Use Cases
//!
//! - **Inspection**: click a field to see everything it is derived from
//! - **Impact analysis**: see which fields a change would reach
//! - **Consistency**: find reference cycles between fields

mod highlight;

pub use highlight::Highlighter;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::graph::{Edge, EdgeId, Graph};
use crate::naming::FieldHandle;

/// Which way to follow edges from the selected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// From target back to source: what feeds this field.
    #[default]
    Upstream,
    /// From source forward to target: what this field feeds.
    Downstream,
    /// Both closures, unioned.
    Both,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Upstream => "upstream",
            Direction::Downstream => "downstream",
            Direction::Both => "both",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upstream" => Ok(Direction::Upstream),
            "downstream" => Ok(Direction::Downstream),
            "both" => Ok(Direction::Both),
            _ => Err(format!("unknown lineage direction: {}", s)),
        }
    }
}

/// Compute the lineage closure of `root` as a set of edge ids.
///
/// Iterative worklist over field handles with a visited set, so deep chains
/// do not grow the stack and cycles terminate. Each field and edge is
/// visited at most once per direction.
pub fn compute_lineage(graph: &Graph, root: &FieldHandle, direction: Direction) -> BTreeSet<EdgeId> {
    match direction {
        Direction::Upstream => walk(graph, root, Step::Backward),
        Direction::Downstream => walk(graph, root, Step::Forward),
        Direction::Both => {
            let mut edges = walk(graph, root, Step::Backward);
            edges.extend(walk(graph, root, Step::Forward));
            edges
        }
    }
}

/// Upstream closure of `root`.
pub fn compute_upstream(graph: &Graph, root: &FieldHandle) -> BTreeSet<EdgeId> {
    compute_lineage(graph, root, Direction::Upstream)
}

#[derive(Clone, Copy)]
enum Step {
    Backward,
    Forward,
}

impl Step {
    /// The handle an edge is indexed by, and the handle it leads to.
    fn ends(self, edge: &Edge) -> (&FieldHandle, &FieldHandle) {
        match self {
            Step::Backward => (&edge.target_handle, &edge.source_handle),
            Step::Forward => (&edge.source_handle, &edge.target_handle),
        }
    }
}

fn walk(graph: &Graph, root: &FieldHandle, step: Step) -> BTreeSet<EdgeId> {
    let mut adjacency: HashMap<&FieldHandle, Vec<&Edge>> = HashMap::new();
    for edge in graph.edges() {
        let (from, _) = step.ends(edge);
        adjacency.entry(from).or_default().push(edge);
    }

    let mut visited_fields: HashSet<&FieldHandle> = HashSet::new();
    let mut visited_edges = BTreeSet::new();
    let mut worklist = vec![root];

    while let Some(handle) = worklist.pop() {
        if !visited_fields.insert(handle) {
            continue;
        }
        let Some(edges) = adjacency.get(handle) else {
            continue;
        };
        for edge in edges {
            visited_edges.insert(edge.id.clone());
            let (_, next) = step.ends(edge);
            worklist.push(next);
        }
    }

    visited_edges
}

/// Reference cycles between fields.
///
/// Each cycle is the set of fields in one strongly connected component;
/// a single field only counts when it references itself.
pub fn lineage_cycles(graph: &Graph) -> Vec<Vec<FieldHandle>> {
    let mut dag: DiGraph<FieldHandle, ()> = DiGraph::new();
    let mut index: HashMap<FieldHandle, NodeIndex> = HashMap::new();

    let mut node_for = |dag: &mut DiGraph<FieldHandle, ()>, handle: &FieldHandle| {
        *index
            .entry(handle.clone())
            .or_insert_with(|| dag.add_node(handle.clone()))
    };

    for edge in graph.edges() {
        let from = node_for(&mut dag, &edge.source_handle);
        let to = node_for(&mut dag, &edge.target_handle);
        dag.add_edge(from, to, ());
    }

    tarjan_scc(&dag)
        .into_iter()
        .filter(|scc| match scc.as_slice() {
            [single] => dag.find_edge(*single, *single).is_some(),
            _ => true,
        })
        .map(|scc| {
            let mut cycle: Vec<FieldHandle> = scc
                .into_iter()
                .filter_map(|idx| dag.node_weight(idx).cloned())
                .collect();
            cycle.sort();
            cycle
        })
        .collect()
}
