//! Invariant checks for graphs.

use std::collections::{BTreeSet, HashSet};

use crate::graph::{EdgeId, EdgeKind, Graph};
use crate::naming::{FieldHandle, QualifiedName};

/// A broken graph invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// Node id differs from the name recomputed from its data.
    NonCanonicalId { id: String, expected: String },
    /// Two nodes share an id.
    DuplicateNode(String),
    /// Two fields on one node share a name.
    DuplicateField { entity: String, field: String },
    /// An edge endpoint names a missing node or field.
    DanglingEdge { edge: String, handle: String },
    /// An edge's id, source or target disagrees with its handles.
    StaleEdge(String),
    /// Stored pointers and incoming edges of one kind disagree.
    ReferenceMismatch {
        field: String,
        kind: EdgeKind,
        stored: Vec<String>,
        edges: Vec<String>,
    },
}

impl std::fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityViolation::NonCanonicalId { id, expected } => {
                write!(f, "node '{}' should be named '{}'", id, expected)
            }
            IntegrityViolation::DuplicateNode(id) => write!(f, "duplicate node '{}'", id),
            IntegrityViolation::DuplicateField { entity, field } => {
                write!(f, "duplicate field '{}' on '{}'", field, entity)
            }
            IntegrityViolation::DanglingEdge { edge, handle } => {
                write!(f, "edge '{}' points at missing '{}'", edge, handle)
            }
            IntegrityViolation::StaleEdge(edge) => {
                write!(f, "edge '{}' disagrees with its handles", edge)
            }
            IntegrityViolation::ReferenceMismatch {
                field,
                kind,
                stored,
                edges,
            } => write!(
                f,
                "{} references of '{}' are [{}] but edges say [{}]",
                kind,
                field,
                stored.join(", "),
                edges.join(", ")
            ),
        }
    }
}

impl std::error::Error for IntegrityViolation {}

/// Check every graph invariant, collecting all violations.
pub fn validate(graph: &Graph) -> Result<(), Vec<IntegrityViolation>> {
    let mut errors = Vec::new();

    validate_nodes(graph, &mut errors);
    validate_edges(graph, &mut errors);
    validate_references(graph, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_nodes(graph: &Graph, errors: &mut Vec<IntegrityViolation>) {
    let mut ids = HashSet::new();
    for node in graph.nodes() {
        if !ids.insert(node.id.as_str()) {
            errors.push(IntegrityViolation::DuplicateNode(node.id.clone()));
        }

        let expected = node.qualified_name().to_string();
        let decodes = QualifiedName::parse(&node.id).map(|q| q.to_string());
        if node.id != expected || decodes.as_deref() != Some(node.id.as_str()) {
            errors.push(IntegrityViolation::NonCanonicalId {
                id: node.id.clone(),
                expected,
            });
        }

        let mut names = HashSet::new();
        for field in &node.data.fields {
            if !names.insert(field.name.as_str()) {
                errors.push(IntegrityViolation::DuplicateField {
                    entity: node.id.clone(),
                    field: field.name.clone(),
                });
            }
        }
    }
}

fn validate_edges(graph: &Graph, errors: &mut Vec<IntegrityViolation>) {
    for edge in graph.edges() {
        for handle in [&edge.source_handle, &edge.target_handle] {
            if !graph.has_field(handle) {
                errors.push(IntegrityViolation::DanglingEdge {
                    edge: edge.id.to_string(),
                    handle: handle.to_string(),
                });
            }
        }
        let fresh = EdgeId::derive(edge.kind, &edge.source_handle, &edge.target_handle);
        if fresh != edge.id
            || edge.source != edge.source_handle.entity
            || edge.target != edge.target_handle.entity
        {
            errors.push(IntegrityViolation::StaleEdge(edge.id.to_string()));
        }
    }
}

fn validate_references(graph: &Graph, errors: &mut Vec<IntegrityViolation>) {
    for node in graph.nodes() {
        for field in &node.data.fields {
            let target = node.handle(&field.name);
            for kind in [EdgeKind::Normal, EdgeKind::Calculation] {
                let stored: BTreeSet<FieldHandle> = field
                    .references_of(kind)
                    .iter()
                    .filter_map(|raw| graph.resolve_existing(raw))
                    .collect();
                let edges: BTreeSet<FieldHandle> = graph
                    .incoming(&target, kind)
                    .map(|e| e.source_handle.clone())
                    .collect();
                if stored != edges {
                    errors.push(IntegrityViolation::ReferenceMismatch {
                        field: target.to_string(),
                        kind,
                        stored: stored.iter().map(|h| h.to_pointer().to_string()).collect(),
                        edges: edges.iter().map(|h| h.to_pointer().to_string()).collect(),
                    });
                }
            }
        }
    }
}
