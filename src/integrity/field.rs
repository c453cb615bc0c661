//! Field-level edits.

use super::{non_blank, EditError, EditResult, PointerChange};
use crate::graph::{Calculation, Field, Graph};
use crate::naming::{FieldHandle, FieldPointer};

impl Graph {
    /// Append an empty field. Duplicate or blank names are rejected.
    pub(crate) fn add_field(&mut self, entity: &str, name: &str) -> EditResult<bool> {
        let name = non_blank(name)?;
        let node = self
            .node_mut(entity)
            .ok_or_else(|| EditError::UnknownEntity(entity.to_string()))?;
        if node.has_field(name) {
            return Err(EditError::DuplicateFieldName {
                entity: entity.to_string(),
                field: name.to_string(),
            });
        }
        node.data.fields.push(Field::new(name));
        Ok(true)
    }

    /// Rename a field and every handle, edge id and pointer that names it.
    /// Returns the field's new handle, or `None` when the name is unchanged.
    pub(crate) fn rename_field(
        &mut self,
        entity: &str,
        old_name: &str,
        new_name: &str,
    ) -> EditResult<Option<FieldHandle>> {
        let new_name = non_blank(new_name)?;
        let old = FieldHandle::new(entity, old_name);
        self.require_field(&old)?;
        if new_name == old_name {
            return Ok(None);
        }
        if self.has_field(&FieldHandle::new(entity, new_name)) {
            return Err(EditError::DuplicateFieldName {
                entity: entity.to_string(),
                field: new_name.to_string(),
            });
        }

        self.retarget_pointers(|p| {
            (p.entity == entity && p.field == old_name).then(|| {
                PointerChange::Replace(FieldPointer::new(entity, new_name).to_string())
            })
        });

        if let Some(field) = self.field_mut(&old) {
            field.name = new_name.to_string();
        }

        for edge in &mut self.edges {
            if !edge.touches_handle(&old) {
                continue;
            }
            if edge.source_handle == old {
                edge.source_handle.field = new_name.to_string();
            }
            if edge.target_handle == old {
                edge.target_handle.field = new_name.to_string();
            }
            edge.rederive();
        }
        Ok(Some(FieldHandle::new(entity, new_name)))
    }

    /// Remove a field, every edge touching it, and every pointer to it.
    pub(crate) fn delete_field(&mut self, entity: &str, field: &str) -> EditResult<bool> {
        let handle = FieldHandle::new(entity, field);
        self.require_field(&handle)?;

        self.retarget_pointers(|p| {
            (p.entity == entity && p.field == field).then_some(PointerChange::Remove)
        });
        if let Some(node) = self.node_mut(entity) {
            node.data.fields.retain(|f| f.name != field);
        }
        self.edges.retain(|e| !e.touches_handle(&handle));
        Ok(true)
    }

    /// Replace a field's calculation text. References are left alone.
    pub(crate) fn set_calculation(
        &mut self,
        entity: &str,
        field: &str,
        expression: String,
    ) -> EditResult<bool> {
        let handle = FieldHandle::new(entity, field);
        self.require_field(&handle)?;
        let Some(field) = self.field_mut(&handle) else {
            return Ok(false);
        };
        match &mut field.calculation {
            Some(calc) if calc.expression == expression => Ok(false),
            Some(calc) => {
                calc.expression = expression;
                Ok(true)
            }
            None => {
                field.calculation = Some(Calculation {
                    expression,
                    references: Vec::new(),
                });
                Ok(true)
            }
        }
    }
}
