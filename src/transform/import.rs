//! SchemaModel → Graph.

use std::collections::HashMap;

use log::{debug, warn};

use super::{ImportError, ImportResult};
use crate::graph::{Calculation, Field, Graph, Node, Position};
use crate::naming::QualifiedName;
use crate::schema::SchemaModel;

/// Vertical spacing of the placeholder positions given to imported nodes.
pub const PLACEHOLDER_ROW_HEIGHT: f64 = 180.0;

/// Build a graph from a schema model.
///
/// Entity keys are canonicalized (`Orders` becomes `BASE_Orders`). A stored
/// pointer that resolves to an existing field is rewritten to the canonical
/// form of that field and gets one edge. Pointers without a `.` separator or
/// naming something absent are kept verbatim and left inert.
pub fn import_model(model: &SchemaModel) -> ImportResult<Graph> {
    let mut graph = Graph::new();
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (index, (key, entity)) in model.entities.iter().enumerate() {
        let qualified =
            QualifiedName::parse(key).ok_or_else(|| ImportError::InvalidEntityName(key.clone()))?;
        let id = qualified.to_string();

        if let Some(first) = seen.insert(id.clone(), key) {
            return Err(ImportError::DuplicateEntity {
                id,
                first: first.to_string(),
                second: key.clone(),
            });
        }

        let mut node = Node::new(qualified.display_name, qualified.table_type);
        node.position = Position::new(0.0, index as f64 * PLACEHOLDER_ROW_HEIGHT);
        node.data.alias = entity.alias.clone().filter(|a| !a.is_empty());

        for (name, def) in &entity.fields {
            if name.trim().is_empty() {
                return Err(ImportError::InvalidFieldName {
                    entity: id.clone(),
                    field: name.clone(),
                });
            }
            node.data.fields.push(Field {
                name: name.clone(),
                references: def.references.clone(),
                calculation: def.calculation.as_ref().map(|c| Calculation {
                    expression: c.expression.clone(),
                    references: c.references.clone(),
                }),
            });
        }

        graph.push_node(node);
    }

    // Edges need every node in place before pointers can resolve.
    graph.bind_references();
    for inert in graph.inert_references() {
        warn!("inert {} reference '{}' on {}.{}", inert.kind, inert.pointer, inert.entity, inert.field);
    }

    debug!(
        "imported {} entities and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
