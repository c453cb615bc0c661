//! The nested JSON schema: entities → fields → references.
//!
//! ```json
//! { "entities": {
//!     "BASE_Orders": {
//!       "alias": "o",
//!       "fields": {
//!         "id": {},
//!         "total": { "calculation": { "expression": "qty*price",
//!                                     "ref": ["BASE_Lines.qty", "BASE_Lines.price"] } },
//!         "customer": { "ref": ["BASE_Customers.id"] }
//!       }
//!     }
//! }}
//! ```
//!
//! Pure data. Entity and field order follow the document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A complete schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaModel {
    /// Entities keyed by qualified name.
    pub entities: IndexMap<String, EntityDef>,
}

/// One entity (table, CTE or view).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Fields keyed by name.
    pub fields: IndexMap<String, FieldDef>,
}

/// One field. Serializes as `{}` when it carries nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Direct references, as `entity.field` pointers.
    #[serde(rename = "ref", default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation: Option<CalculationDef>,
}

/// A derivation expression plus the fields it reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationDef {
    #[serde(default)]
    pub expression: String,

    #[serde(rename = "ref", default)]
    pub references: Vec<String>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, name: impl Into<String>, entity: EntityDef) -> Self {
        self.entities.insert(name.into(), entity);
        self
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }
}

impl EntityDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, field: FieldDef) -> Self {
        self.fields.insert(name.into(), field);
        self
    }
}

impl FieldDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ref(mut self, pointer: impl Into<String>) -> Self {
        self.references.push(pointer.into());
        self
    }

    pub fn with_calculation<I, S>(mut self, expression: impl Into<String>, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.calculation = Some(CalculationDef {
            expression: expression.into(),
            references: refs.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// True for the minimal `{}` form.
    pub fn is_empty(&self) -> bool {
        self.references.is_empty() && self.calculation.is_none()
    }
}
