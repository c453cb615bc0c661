//! Core graph types: nodes carry entities, edges carry field references.

use std::fmt;

use serde::Serialize;

use crate::naming::{FieldHandle, QualifiedName, TableType};

// =============================================================================
// Node
// =============================================================================

/// Canvas position, owned by the layout collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A field's derivation: the expression text plus the pointers it reads.
///
/// The expression is stored verbatim and never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Calculation {
    pub expression: String,
    pub references: Vec<String>,
}

/// A field as held on a node.
///
/// `references` and `calculation.references` keep the pointer text as it
/// was imported or connected. Pointers that do not resolve to a field in
/// the graph stay here untouched and never produce edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    pub references: Vec<String>,
    pub calculation: Option<Calculation>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Stored pointers for one edge kind.
    pub fn references_of(&self, kind: EdgeKind) -> &[String] {
        match kind {
            EdgeKind::Normal => &self.references,
            EdgeKind::Calculation => self
                .calculation
                .as_ref()
                .map(|c| c.references.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn expression(&self) -> Option<&str> {
        self.calculation.as_ref().map(|c| c.expression.as_str())
    }
}

/// Denormalized entity record carried by a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeData {
    pub display_name: String,
    pub alias: Option<String>,
    pub table_type: TableType,
    pub fields: Vec<Field>,
}

/// One entity in the graph. `id` is the qualified entity name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
}

impl Node {
    pub fn new(display_name: impl Into<String>, table_type: TableType) -> Self {
        let display_name = display_name.into();
        let id = QualifiedName::new(display_name.clone(), table_type).to_string();
        Self {
            id,
            position: Position::default(),
            data: NodeData {
                display_name,
                alias: None,
                table_type,
                fields: Vec::new(),
            },
        }
    }

    /// The qualified name recomputed from display name and table type.
    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::new(self.data.display_name.clone(), self.data.table_type)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.data.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.data.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn handle(&self, field: &str) -> FieldHandle {
        FieldHandle::new(&self.id, field)
    }
}

// =============================================================================
// Edge
// =============================================================================

/// What a reference edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// A direct field reference.
    Normal,
    /// An input of the target field's calculation.
    Calculation,
}

impl EdgeKind {
    /// Prefix used in edge ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EdgeKind::Normal => "ref",
            EdgeKind::Calculation => "calc",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Normal => "normal",
            EdgeKind::Calculation => "calculation",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deterministic edge identifier.
///
/// Derived from `(kind, source, target)` as
/// `ref-{src_entity}.{src_field}->{tgt_entity}.{tgt_field}` (`calc-` for
/// calculation edges), so rebuilding edges from the same model always
/// reproduces the same ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    pub fn derive(kind: EdgeKind, source: &FieldHandle, target: &FieldHandle) -> Self {
        Self(format!(
            "{}-{}->{}",
            kind.id_prefix(),
            source.to_pointer(),
            target.to_pointer()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EdgeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EdgeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A reference from one field to another.
///
/// Data flows from `source_handle` into `target_handle`; the target field
/// is the one that holds the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: EdgeId,
    pub kind: EdgeKind,
    pub source: String,
    pub target: String,
    pub source_handle: FieldHandle,
    pub target_handle: FieldHandle,
}

impl Edge {
    pub fn new(kind: EdgeKind, source_handle: FieldHandle, target_handle: FieldHandle) -> Self {
        Self {
            id: EdgeId::derive(kind, &source_handle, &target_handle),
            kind,
            source: source_handle.entity.clone(),
            target: target_handle.entity.clone(),
            source_handle,
            target_handle,
        }
    }

    /// Recompute `id`, `source` and `target` after a handle changed.
    pub(crate) fn rederive(&mut self) {
        self.source = self.source_handle.entity.clone();
        self.target = self.target_handle.entity.clone();
        self.id = EdgeId::derive(self.kind, &self.source_handle, &self.target_handle);
    }

    pub fn touches_entity(&self, entity: &str) -> bool {
        self.source == entity || self.target == entity
    }

    pub fn touches_handle(&self, handle: &FieldHandle) -> bool {
        &self.source_handle == handle || &self.target_handle == handle
    }
}
