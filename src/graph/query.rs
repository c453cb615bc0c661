//! Identifier resolution and read-only graph queries.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::{Edge, EdgeKind, Graph};
use crate::naming::{FieldHandle, FieldPointer, QualifiedName};

/// Why a stored pointer does not produce an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InertReason {
    /// The pointer has no `entity.field` separator.
    Malformed,
    /// The pointer names an entity or field that is not in the graph.
    UnknownTarget,
}

/// A stored pointer that is kept verbatim but never drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InertReference {
    pub entity: String,
    pub field: String,
    pub kind: EdgeKind,
    pub pointer: String,
    pub reason: InertReason,
}

impl fmt::Display for InertReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let why = match self.reason {
            InertReason::Malformed => "malformed pointer",
            InertReason::UnknownTarget => "unknown target",
        };
        write!(
            f,
            "{}.{} {} reference '{}': {}",
            self.entity, self.field, self.kind, self.pointer, why
        )
    }
}

/// How the entity part of a pointer matched a node. Earlier is stronger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EntityMatch {
    Exact,
    Canonical,
    DisplayName,
}

impl Graph {
    /// Resolve an entity name written in a pointer to a node id.
    ///
    /// Tries, in order: an exact node id, the canonical qualified form
    /// (`Orders` → `BASE_Orders`), then a display-name match.
    pub fn resolve_entity(&self, name: &str) -> Option<&str> {
        self.match_entity(name).map(|(_, id)| id)
    }

    fn match_entity(&self, name: &str) -> Option<(EntityMatch, &str)> {
        if let Some(node) = self.node(name) {
            return Some((EntityMatch::Exact, node.id.as_str()));
        }
        if let Some(canonical) = QualifiedName::canonicalize(name) {
            if let Some(node) = self.node(&canonical) {
                return Some((EntityMatch::Canonical, node.id.as_str()));
            }
        }
        self.nodes
            .iter()
            .find(|n| n.data.display_name == name)
            .map(|n| (EntityMatch::DisplayName, n.id.as_str()))
    }

    /// Resolve a stored pointer to its entity, without checking the field.
    ///
    /// Entity names may contain `.`, so every split of `raw` is tried. The
    /// strongest entity match wins, then the longest entity, the same way
    /// [`FieldHandle::resolve`] picks among entities containing `-`.
    pub fn resolve_pointer(&self, raw: &str) -> Option<FieldPointer> {
        best_match(self.pointer_candidates(raw))
    }

    /// Resolve a stored pointer to an existing field.
    pub fn resolve_existing(&self, raw: &str) -> Option<FieldHandle> {
        let candidates = self
            .pointer_candidates(raw)
            .filter(|(_, p)| self.has_field(&p.to_handle()));
        best_match(candidates).map(|p| p.to_handle())
    }

    fn pointer_candidates<'a>(
        &'a self,
        raw: &'a str,
    ) -> impl Iterator<Item = (EntityMatch, FieldPointer)> + 'a {
        FieldPointer::splits(raw).filter_map(move |split| {
            let (how, id) = self.match_entity(&split.entity)?;
            Some((how, FieldPointer::new(id, split.field)))
        })
    }

    /// Decode a wire handle id (`entity-field`) to an existing field.
    pub fn resolve_handle(&self, handle: &str) -> Option<FieldHandle> {
        let resolved = FieldHandle::resolve(handle, self.node_ids())?;
        self.has_field(&resolved).then_some(resolved)
    }

    /// Edges of `kind` feeding into `handle`.
    pub fn incoming<'a>(
        &'a self,
        handle: &'a FieldHandle,
        kind: EdgeKind,
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.kind == kind && &e.target_handle == handle)
    }

    /// Edges attached to a node on either side.
    pub fn edges_of_entity<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.touches_entity(id))
    }

    /// The decoded `(kind, source field, target field)` set.
    ///
    /// Two graphs with equal triple sets have the same references,
    /// regardless of edge order.
    pub fn edge_triples(&self) -> BTreeSet<(EdgeKind, FieldHandle, FieldHandle)> {
        self.edges
            .iter()
            .map(|e| (e.kind, e.source_handle.clone(), e.target_handle.clone()))
            .collect()
    }

    /// Stored pointers that do not resolve to a field in this graph.
    pub fn inert_references(&self) -> Vec<InertReference> {
        let mut inert = Vec::new();
        for node in &self.nodes {
            for field in &node.data.fields {
                for kind in [EdgeKind::Normal, EdgeKind::Calculation] {
                    for pointer in field.references_of(kind) {
                        let reason = if FieldPointer::splits(pointer).next().is_none() {
                            InertReason::Malformed
                        } else if self.resolve_existing(pointer).is_none() {
                            InertReason::UnknownTarget
                        } else {
                            continue;
                        };
                        inert.push(InertReference {
                            entity: node.id.clone(),
                            field: field.name.clone(),
                            kind,
                            pointer: pointer.clone(),
                            reason,
                        });
                    }
                }
            }
        }
        inert
    }
}

fn best_match(candidates: impl Iterator<Item = (EntityMatch, FieldPointer)>) -> Option<FieldPointer> {
    candidates
        .min_by_key(|(how, p)| (*how, Reverse(p.entity.len())))
        .map(|(_, p)| p)
}
