//! Identifier conventions shared by the schema and the graph.
//!
//! Three textual forms are used throughout the crate:
//!
//! ```text
//! qualified entity name   BASE_Orders        (prefix + display name)
//! field pointer           BASE_Orders.total  (schema references)
//! field handle            BASE_Orders-total  (graph attachment points)
//! ```
//!
//! Every component encodes and decodes these through the types in this
//! module; nothing else splits identifier strings by hand.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Table Type
// =============================================================================

/// Kind of entity, carried as a prefix on the qualified name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TableType {
    /// A physical base table.
    #[default]
    Base,
    /// A common table expression.
    Cte,
    /// A view.
    View,
}

impl TableType {
    pub const ALL: [TableType; 3] = [TableType::Base, TableType::Cte, TableType::View];

    /// The prefix this type puts in front of a display name.
    pub fn prefix(&self) -> &'static str {
        match self {
            TableType::Base => "BASE_",
            TableType::Cte => "CTE_",
            TableType::View => "VIEW_",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::Base => "BASE",
            TableType::Cte => "CTE",
            TableType::View => "VIEW",
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a table type string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown table type '{0}' (expected BASE, CTE or VIEW)")]
pub struct UnknownTableType(pub String);

impl FromStr for TableType {
    type Err = UnknownTableType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BASE" => Ok(TableType::Base),
            "CTE" => Ok(TableType::Cte),
            "VIEW" => Ok(TableType::View),
            _ => Err(UnknownTableType(s.to_string())),
        }
    }
}

// =============================================================================
// Qualified Name
// =============================================================================

/// An entity identifier: table type plus user-facing display name.
///
/// Encodes as `{PREFIX}{display_name}`. Decoding a name without a recognised
/// prefix yields [`TableType::Base`] with the whole string as display name,
/// so `Orders` and `BASE_Orders` decode to the same pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub table_type: TableType,
    pub display_name: String,
}

impl QualifiedName {
    pub fn new(display_name: impl Into<String>, table_type: TableType) -> Self {
        Self {
            table_type,
            display_name: display_name.into(),
        }
    }

    /// Decode a qualified name.
    /// Returns None for a blank string.
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().is_empty() {
            return None;
        }
        for table_type in TableType::ALL {
            if let Some(rest) = s.strip_prefix(table_type.prefix()) {
                if !rest.is_empty() {
                    return Some(Self::new(rest, table_type));
                }
            }
        }
        Some(Self::new(s, TableType::Base))
    }

    /// The canonical encoded form of `s`, if it decodes.
    pub fn canonicalize(s: &str) -> Option<String> {
        Self::parse(s).map(|q| q.to_string())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.table_type.prefix(), self.display_name)
    }
}

// =============================================================================
// Field Pointer (schema form)
// =============================================================================

/// A reference to a field as written in the schema: `entity.field`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPointer {
    pub entity: String,
    pub field: String,
}

impl FieldPointer {
    pub fn new(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Parse from "entity.field" format, splitting at the first `.`.
    /// Returns None when the separator is missing or either side is empty.
    pub fn parse(s: &str) -> Option<Self> {
        let (entity, field) = s.split_once('.')?;
        if entity.is_empty() || field.is_empty() {
            return None;
        }
        Some(Self::new(entity, field))
    }

    /// Every way of reading `s` as `entity.field`, one per `.` separator.
    ///
    /// Entity names may contain `.` (`dbo.Orders`), so which split is right
    /// depends on the entities that exist. See [`crate::graph::Graph::resolve_pointer`].
    pub fn splits(s: &str) -> impl Iterator<Item = Self> + '_ {
        s.match_indices('.').filter_map(move |(at, _)| {
            let (entity, field) = (&s[..at], &s[at + 1..]);
            (!entity.is_empty() && !field.is_empty()).then(|| Self::new(entity, field))
        })
    }

    pub fn to_handle(&self) -> FieldHandle {
        FieldHandle::new(&self.entity, &self.field)
    }
}

impl fmt::Display for FieldPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.field)
    }
}

// =============================================================================
// Field Handle (graph form)
// =============================================================================

/// A field attachment point on a graph node: `entity-field`.
///
/// Entity names may themselves contain `-`, so a handle string cannot be
/// split without knowing which entity it belongs to. Use
/// [`FieldHandle::parse_for_entity`] when the entity is known, or
/// [`FieldHandle::resolve`] against the set of node ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldHandle {
    pub entity: String,
    pub field: String,
}

impl FieldHandle {
    pub fn new(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Decode `handle` as a field of `entity`.
    pub fn parse_for_entity(handle: &str, entity: &str) -> Option<Self> {
        let field = handle.strip_prefix(entity)?.strip_prefix('-')?;
        if field.is_empty() {
            return None;
        }
        Some(Self::new(entity, field))
    }

    /// Decode `handle` against a set of candidate entity ids.
    ///
    /// The longest matching entity wins, so `BASE_a-b-c` resolves to
    /// entity `BASE_a-b` when both `BASE_a` and `BASE_a-b` exist.
    pub fn resolve<'a>(handle: &str, entities: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        entities
            .into_iter()
            .filter_map(|entity| Self::parse_for_entity(handle, entity))
            .max_by_key(|h| h.entity.len())
    }

    pub fn to_pointer(&self) -> FieldPointer {
        FieldPointer::new(&self.entity, &self.field)
    }
}

impl fmt::Display for FieldHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.entity, self.field)
    }
}

impl From<FieldPointer> for FieldHandle {
    fn from(p: FieldPointer) -> Self {
        Self::new(p.entity, p.field)
    }
}
