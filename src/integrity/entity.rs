//! Entity-level edits.

use super::{non_blank, EditError, EditResult, PointerChange};
use crate::graph::{Graph, Node, Position};
use crate::naming::{FieldPointer, QualifiedName, TableType};

/// Base display name for tables created from scratch.
const NEW_TABLE_NAME: &str = "NewTable";

impl Graph {
    /// Rename an entity, keeping its table type.
    ///
    /// Edges, handles and stored pointers that name the old id are rewritten
    /// in the same step. A name whose qualified id belongs to another
    /// entity is rejected. Returns the new id, or `None` when the name is
    /// unchanged.
    pub(crate) fn rename_entity(&mut self, id: &str, new_name: &str) -> EditResult<Option<String>> {
        let new_name = non_blank(new_name)?;
        let node = self
            .node(id)
            .ok_or_else(|| EditError::UnknownEntity(id.to_string()))?;
        let new_id = QualifiedName::new(new_name, node.data.table_type).to_string();

        if new_id == id {
            return Ok(None);
        }
        if self.has_node(&new_id) {
            return Err(EditError::EntityNameCollision(new_id));
        }

        self.retarget_pointers(|p| {
            (p.entity == id).then(|| {
                PointerChange::Replace(FieldPointer::new(&new_id, &p.field).to_string())
            })
        });

        if let Some(node) = self.node_mut(id) {
            node.id = new_id.clone();
            node.data.display_name = new_name.to_string();
        }

        for edge in &mut self.edges {
            if !edge.touches_entity(id) {
                continue;
            }
            if edge.source_handle.entity == id {
                edge.source_handle.entity = new_id.clone();
            }
            if edge.target_handle.entity == id {
                edge.target_handle.entity = new_id.clone();
            }
            edge.rederive();
        }
        Ok(Some(new_id))
    }

    /// Remove an entity, every edge attached to it and every stored pointer
    /// that names it.
    pub(crate) fn delete_entity(&mut self, id: &str) -> EditResult<bool> {
        if !self.has_node(id) {
            return Err(EditError::UnknownEntity(id.to_string()));
        }
        self.retarget_pointers(|p| (p.entity == id).then_some(PointerChange::Remove));
        self.edges.retain(|e| !e.touches_entity(id));
        self.nodes.retain(|n| n.id != id);
        Ok(true)
    }

    /// Set or clear an entity's alias.
    pub(crate) fn set_alias(&mut self, id: &str, alias: &str) -> EditResult<bool> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| EditError::UnknownEntity(id.to_string()))?;
        let alias = Some(alias.trim().to_string()).filter(|a| !a.is_empty());
        if node.data.alias == alias {
            return Ok(false);
        }
        node.data.alias = alias;
        Ok(true)
    }

    /// Append an empty entity with a generated name. Returns its id.
    pub(crate) fn create_table(&mut self, table_type: TableType) -> String {
        let name = self.next_table_name(table_type);
        let mut node = Node::new(name, table_type);
        node.position = self.free_position();
        let id = node.id.clone();
        self.push_node(node);
        id
    }

    /// First unused display name of the form `NewTable`, `NewTable1`, ...
    pub fn next_table_name(&self, table_type: TableType) -> String {
        let mut counter = 0usize;
        loop {
            let candidate = if counter == 0 {
                NEW_TABLE_NAME.to_string()
            } else {
                format!("{}{}", NEW_TABLE_NAME, counter)
            };
            if !self.has_node(&QualifiedName::new(candidate.as_str(), table_type).to_string()) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// A spot below the lowest node, until the next layout pass.
    fn free_position(&self) -> Position {
        match self.nodes.iter().map(|n| n.position.y).reduce(f64::max) {
            Some(y) => Position::new(0.0, y + crate::transform::PLACEHOLDER_ROW_HEIGHT),
            None => Position::default(),
        }
    }
}
