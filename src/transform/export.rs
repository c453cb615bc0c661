//! Graph → SchemaModel.

use std::collections::HashSet;

use crate::graph::{EdgeKind, Field, Graph, Node};
use crate::schema::{CalculationDef, EntityDef, FieldDef, SchemaModel};

/// Convert a graph back into a schema model.
///
/// Each field's references are the ordered union of its stored pointers
/// (normalized to qualified form where they resolve) and the pointers
/// implied by incoming edges of the matching kind. The result is
/// deterministic for a given graph.
pub fn export_model(graph: &Graph) -> SchemaModel {
    let mut model = SchemaModel::new();
    for node in graph.nodes() {
        let name = node.qualified_name().to_string();
        model.entities.insert(name, export_entity(graph, node));
    }
    model
}

fn export_entity(graph: &Graph, node: &Node) -> EntityDef {
    let mut entity = EntityDef {
        alias: node.data.alias.clone().filter(|a| !a.is_empty()),
        ..Default::default()
    };
    for field in &node.data.fields {
        entity
            .fields
            .insert(field.name.clone(), export_field(graph, node, field));
    }
    entity
}

fn export_field(graph: &Graph, node: &Node, field: &Field) -> FieldDef {
    let references = collect_references(graph, node, field, EdgeKind::Normal);
    let calc_references = collect_references(graph, node, field, EdgeKind::Calculation);

    let calculation = match &field.calculation {
        Some(calc) => Some(CalculationDef {
            expression: calc.expression.clone(),
            references: calc_references,
        }),
        // Calculation edges without a stored calculation still export.
        None if !calc_references.is_empty() => Some(CalculationDef {
            expression: String::new(),
            references: calc_references,
        }),
        None => None,
    };

    FieldDef {
        references,
        calculation,
    }
}

fn collect_references(graph: &Graph, node: &Node, field: &Field, kind: EdgeKind) -> Vec<String> {
    let handle = node.handle(&field.name);

    let stored = field
        .references_of(kind)
        .iter()
        .map(|raw| normalize_pointer(graph, raw));
    let from_edges = graph
        .incoming(&handle, kind)
        .map(|e| e.source_handle.to_pointer().to_string());

    let mut seen = HashSet::new();
    stored
        .chain(from_edges)
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Qualify a stored pointer against the current node set.
/// Pointers that do not resolve are returned unchanged.
fn normalize_pointer(graph: &Graph, raw: &str) -> String {
    match graph.resolve_pointer(raw) {
        Some(pointer) => pointer.to_string(),
        None => raw.to_string(),
    }
}
