//! Edge-level edits: connecting and disconnecting fields.

use super::{EditError, EditResult};
use crate::graph::{Calculation, Edge, EdgeId, EdgeKind, Graph};
use crate::naming::FieldHandle;

impl Graph {
    /// Connect `source` into `target`.
    ///
    /// The target field records the source pointer in its references (or
    /// its calculation references for [`EdgeKind::Calculation`]). A
    /// supplied expression replaces the calculation text.
    pub(crate) fn connect(
        &mut self,
        source: FieldHandle,
        target: FieldHandle,
        kind: EdgeKind,
        expression: Option<String>,
    ) -> EditResult<bool> {
        self.require_field(&source)?;
        self.require_field(&target)?;

        let edge = Edge::new(kind, source.clone(), target.clone());
        if self.has_edge(&edge.id) {
            return Err(EditError::DuplicateEdge(edge.id.to_string()));
        }

        let already_stored = self.field(&target).is_some_and(|f| {
            f.references_of(kind)
                .iter()
                .any(|raw| self.resolve_existing(raw).as_ref() == Some(&source))
        });
        let pointer = source.to_pointer().to_string();

        let Some(field) = self.field_mut(&target) else {
            return Ok(false);
        };
        match kind {
            EdgeKind::Normal => {
                if !already_stored {
                    field.references.push(pointer);
                }
            }
            EdgeKind::Calculation => {
                let calc = field.calculation.get_or_insert_with(Calculation::default);
                if !already_stored {
                    calc.references.push(pointer);
                }
                if let Some(expression) = expression {
                    calc.expression = expression;
                }
            }
        }

        self.edges.push(edge);
        Ok(true)
    }

    /// Remove an edge and the stored pointer behind it.
    pub(crate) fn disconnect(&mut self, edge_id: &str) -> EditResult<bool> {
        let id = EdgeId::from(edge_id);
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| EditError::UnknownEdge(edge_id.to_string()))?;
        let edge = self.edges.remove(index);
        self.forget_pointer(&edge.target_handle, edge.kind, &edge.source_handle);
        Ok(true)
    }

    /// Remove one stored pointer from a field, along with its edge.
    pub(crate) fn remove_reference(
        &mut self,
        entity: &str,
        field: &str,
        pointer: &str,
        kind: EdgeKind,
    ) -> EditResult<bool> {
        let target = FieldHandle::new(entity, field);
        self.require_field(&target)?;

        let unknown = || EditError::UnknownReference {
            entity: entity.to_string(),
            field: field.to_string(),
            kind,
            pointer: pointer.to_string(),
        };
        let position = self
            .field(&target)
            .and_then(|f| f.references_of(kind).iter().position(|raw| raw == pointer))
            .ok_or_else(unknown)?;

        match self.resolve_existing(pointer) {
            Some(source) => {
                let id = EdgeId::derive(kind, &source, &target);
                self.edges.retain(|e| e.id != id);
                self.forget_pointer(&target, kind, &source);
            }
            None => {
                if let Some(f) = self.field_mut(&target) {
                    match kind {
                        EdgeKind::Normal => {
                            f.references.remove(position);
                        }
                        EdgeKind::Calculation => {
                            if let Some(calc) = &mut f.calculation {
                                calc.references.remove(position);
                            }
                        }
                    }
                }
            }
        }
        Ok(true)
    }

    /// Change an existing edge's kind, or its target's calculation text.
    pub(crate) fn reconfigure_edge(
        &mut self,
        edge_id: &str,
        kind: EdgeKind,
        expression: Option<String>,
    ) -> EditResult<bool> {
        let edge = self
            .edge(&EdgeId::from(edge_id))
            .cloned()
            .ok_or_else(|| EditError::UnknownEdge(edge_id.to_string()))?;

        if edge.kind == kind {
            return match (kind, expression) {
                (EdgeKind::Calculation, Some(expression)) => self.set_calculation(
                    &edge.target_handle.entity,
                    &edge.target_handle.field,
                    expression,
                ),
                _ => Ok(false),
            };
        }

        self.disconnect(edge_id)?;
        self.connect(edge.source_handle, edge.target_handle, kind, expression)
    }
}
