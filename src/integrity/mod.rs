//! Integrity-preserving edits.
//!
//! Every change to a [`Graph`] goes through [`Graph::apply`], which works on
//! a copy and hands back the new graph. A rejected edit returns an
//! [`EditError`] and leaves the original graph as it was, so an edit is
//! never half-applied.
//!
//! After each edit the graph satisfies:
//! 1. node ids are canonical qualified names
//! 2. no edge points at a missing node or field
//! 3. node ids and per-node field names are unique
//! 4. resolvable stored pointers and incoming edges correspond one-to-one
//!
//! A stored pointer that resolves is kept in the canonical form of the field
//! it names, so it stays bound to that field when other entities are renamed
//! or created. [`validate`] checks the invariants and is used heavily by the
//! tests.
//!
//! The module is organized into submodules:
//! - `entity`: rename, delete, alias, create
//! - `field`: add, rename, delete, calculation text
//! - `edge`: connect, disconnect, per-reference removal, reconfiguration
//! - `validation`: invariant checks

mod edge;
mod entity;
mod field;
mod validation;

pub use validation::{validate, IntegrityViolation};

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::graph::{Edge, EdgeKind, Graph};
use crate::naming::{FieldHandle, FieldPointer, TableType};

/// Result type for edit operations.
pub type EditResult<T> = Result<T, EditError>;

/// Why an edit was rejected.
///
/// None of these are fatal; a session treats them as "nothing happened".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Name must not be blank")]
    BlankIdentifier,

    #[error("Field '{field}' already exists on '{entity}'")]
    DuplicateFieldName { entity: String, field: String },

    #[error("An entity named '{0}' already exists")]
    EntityNameCollision(String),

    #[error("Unknown entity: '{0}'")]
    UnknownEntity(String),

    #[error("Unknown field '{field}' on '{entity}'")]
    UnknownField { entity: String, field: String },

    #[error("Unknown edge: '{0}'")]
    UnknownEdge(String),

    #[error("Field '{entity}.{field}' has no {kind} reference '{pointer}'")]
    UnknownReference {
        entity: String,
        field: String,
        kind: EdgeKind,
        pointer: String,
    },

    #[error("Edge '{0}' already exists")]
    DuplicateEdge(String),
}

/// A single change to a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    RenameEntity {
        id: String,
        new_name: String,
    },
    DeleteEntity {
        id: String,
    },
    SetAlias {
        id: String,
        alias: String,
    },
    CreateTable {
        table_type: TableType,
    },
    AddField {
        entity: String,
        name: String,
    },
    RenameField {
        entity: String,
        old_name: String,
        new_name: String,
    },
    DeleteField {
        entity: String,
        field: String,
    },
    SetCalculation {
        entity: String,
        field: String,
        expression: String,
    },
    Connect {
        source: FieldHandle,
        target: FieldHandle,
        kind: EdgeKind,
        expression: Option<String>,
    },
    Disconnect {
        edge_id: String,
    },
    RemoveReference {
        entity: String,
        field: String,
        pointer: String,
        kind: EdgeKind,
    },
    ReconfigureEdge {
        edge_id: String,
        kind: EdgeKind,
        expression: Option<String>,
    },
}

/// The graph an edit produced, with what the edit created or moved.
#[derive(Debug, Clone)]
pub struct Applied {
    pub graph: Graph,
    /// Id of the entity added by [`Edit::CreateTable`].
    pub created: Option<String>,
    /// The rename carried out, if the edit renamed something.
    pub renamed: Option<Renamed>,
}

/// An entity or field that now lives under another name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renamed {
    Entity { from: String, to: String },
    Field { from: FieldHandle, to: FieldHandle },
}

impl Renamed {
    /// Where `handle` lives after the rename.
    pub fn carry(&self, handle: &FieldHandle) -> FieldHandle {
        match self {
            Renamed::Entity { from, to } if &handle.entity == from => {
                FieldHandle::new(to, &handle.field)
            }
            Renamed::Field { from, to } if handle == from => to.clone(),
            _ => handle.clone(),
        }
    }
}

impl Graph {
    /// Apply an edit, returning the resulting graph.
    ///
    /// The version of the returned graph is one higher than `self` when
    /// the edit changed something, and equal when it was a no-op.
    pub fn apply(&self, edit: Edit) -> EditResult<Graph> {
        self.apply_edit(edit).map(|applied| applied.graph)
    }

    /// Like [`Graph::apply`], also reporting created and renamed items.
    pub fn apply_edit(&self, edit: Edit) -> EditResult<Applied> {
        debug!("applying {:?}", edit);
        let mut next = self.clone();
        let mut created = None;
        let mut renamed = None;
        let changed = match edit {
            Edit::RenameEntity { id, new_name } => match next.rename_entity(&id, &new_name)? {
                Some(to) => {
                    renamed = Some(Renamed::Entity { from: id, to });
                    true
                }
                None => false,
            },
            Edit::DeleteEntity { id } => next.delete_entity(&id)?,
            Edit::SetAlias { id, alias } => next.set_alias(&id, &alias)?,
            Edit::CreateTable { table_type } => {
                created = Some(next.create_table(table_type));
                true
            }
            Edit::AddField { entity, name } => next.add_field(&entity, &name)?,
            Edit::RenameField {
                entity,
                old_name,
                new_name,
            } => match next.rename_field(&entity, &old_name, &new_name)? {
                Some(to) => {
                    renamed = Some(Renamed::Field {
                        from: FieldHandle::new(entity, old_name),
                        to,
                    });
                    true
                }
                None => false,
            },
            Edit::DeleteField { entity, field } => next.delete_field(&entity, &field)?,
            Edit::SetCalculation {
                entity,
                field,
                expression,
            } => next.set_calculation(&entity, &field, expression)?,
            Edit::Connect {
                source,
                target,
                kind,
                expression,
            } => next.connect(source, target, kind, expression)?,
            Edit::Disconnect { edge_id } => next.disconnect(&edge_id)?,
            Edit::RemoveReference {
                entity,
                field,
                pointer,
                kind,
            } => next.remove_reference(&entity, &field, &pointer, kind)?,
            Edit::ReconfigureEdge {
                edge_id,
                kind,
                expression,
            } => next.reconfigure_edge(&edge_id, kind, expression)?,
        };

        if changed {
            let linked = next.bind_references();
            if linked > 0 {
                debug!("linked {} previously inert references", linked);
            }
            next.version += 1;
        }
        Ok(Applied {
            graph: next,
            created,
            renamed,
        })
    }

    /// Bind every stored pointer that resolves to the field it names.
    ///
    /// Such pointers are rewritten to canonical `entity.field` form, and
    /// one that has no edge yet gets one. Pointers that do not resolve stay
    /// as written. Returns the number of edges created.
    pub(crate) fn bind_references(&mut self) -> usize {
        let mut bound: HashMap<String, String> = HashMap::new();
        let mut missing = Vec::new();
        for node in &self.nodes {
            for field in &node.data.fields {
                let target = node.handle(&field.name);
                for kind in [EdgeKind::Normal, EdgeKind::Calculation] {
                    for pointer in field.references_of(kind) {
                        if let Some(source) = self.resolve_existing(pointer) {
                            bound.insert(pointer.clone(), source.to_pointer().to_string());
                            missing.push(Edge::new(kind, source, target.clone()));
                        }
                    }
                }
            }
        }

        for node in &mut self.nodes {
            for field in &mut node.data.fields {
                bind_list(&mut field.references, &bound);
                if let Some(calc) = &mut field.calculation {
                    bind_list(&mut calc.references, &bound);
                }
            }
        }

        missing
            .into_iter()
            .filter(|edge| self.push_edge(edge.clone()))
            .count()
    }

    /// Rewrite or drop stored pointers across the whole graph.
    ///
    /// `change` sees each resolvable pointer in canonical form; pointers that
    /// do not resolve are never passed to it and stay as they are.
    pub(crate) fn retarget_pointers<F>(&mut self, change: F)
    where
        F: Fn(&FieldPointer) -> Option<PointerChange>,
    {
        let resolved: HashMap<String, FieldPointer> = self
            .nodes
            .iter()
            .flat_map(|n| n.data.fields.iter())
            .flat_map(|f| {
                f.references
                    .iter()
                    .chain(f.calculation.iter().flat_map(|c| c.references.iter()))
            })
            .filter_map(|raw| self.resolve_pointer(raw).map(|p| (raw.clone(), p)))
            .collect();

        for node in &mut self.nodes {
            for field in &mut node.data.fields {
                rewrite_list(&mut field.references, &resolved, &change);
                if let Some(calc) = &mut field.calculation {
                    rewrite_list(&mut calc.references, &resolved, &change);
                }
            }
        }
    }

    /// Drop every `kind` pointer on `target` that resolves to `source`.
    pub(crate) fn forget_pointer(
        &mut self,
        target: &FieldHandle,
        kind: EdgeKind,
        source: &FieldHandle,
    ) {
        let Some(field) = self.field(target) else {
            return;
        };
        let keep: Vec<bool> = field
            .references_of(kind)
            .iter()
            .map(|raw| self.resolve_existing(raw).as_ref() != Some(source))
            .collect();

        let Some(field) = self.field_mut(target) else {
            return;
        };
        let list = match kind {
            EdgeKind::Normal => &mut field.references,
            EdgeKind::Calculation => match &mut field.calculation {
                Some(calc) => &mut calc.references,
                None => return,
            },
        };
        let mut keep = keep.into_iter();
        list.retain(|_| keep.next().unwrap_or(true));
    }

    pub(crate) fn require_field(&self, handle: &FieldHandle) -> EditResult<()> {
        let node = self
            .node(&handle.entity)
            .ok_or_else(|| EditError::UnknownEntity(handle.entity.clone()))?;
        if node.has_field(&handle.field) {
            Ok(())
        } else {
            Err(EditError::UnknownField {
                entity: handle.entity.clone(),
                field: handle.field.clone(),
            })
        }
    }
}

/// What to do with one stored pointer.
pub(crate) enum PointerChange {
    Replace(String),
    Remove,
}

/// Swap bound pointers for their canonical form, dropping repeats.
fn bind_list(list: &mut Vec<String>, bound: &HashMap<String, String>) {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(list.len());
    for raw in list.drain(..) {
        match bound.get(&raw) {
            Some(canonical) => {
                if seen.insert(canonical.clone()) {
                    out.push(canonical.clone());
                }
            }
            None => out.push(raw),
        }
    }
    *list = out;
}

fn rewrite_list<F>(list: &mut Vec<String>, resolved: &HashMap<String, FieldPointer>, change: &F)
where
    F: Fn(&FieldPointer) -> Option<PointerChange>,
{
    let mut out = Vec::with_capacity(list.len());
    for raw in list.drain(..) {
        match resolved.get(&raw).and_then(change) {
            Some(PointerChange::Replace(new)) => out.push(new),
            Some(PointerChange::Remove) => {}
            None => out.push(raw),
        }
    }
    *list = out;
}

/// Trim a user-supplied identifier, rejecting blanks.
pub(crate) fn non_blank(name: &str) -> EditResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(EditError::BlankIdentifier)
    } else {
        Ok(trimmed)
    }
}
