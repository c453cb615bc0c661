//! # fieldflow
//!
//! Field-level data lineage models: entities, their fields, and the
//! references between fields.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │              Schema JSON (entities → fields → ref)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │  ▲
//!             [transform]  ▼  │  [transform]
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Graph (nodes + edges)                    │
//! │     edits via [integrity], placement via [layout]        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [lineage]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Highlight set (edge ids)                    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [view]
//! ┌─────────────────────────────────────────────────────────┐
//! │              Render edges (filtered, styled)             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! [`session::Session`] ties these together for one open document.

pub mod config;
pub mod graph;
pub mod integrity;
pub mod layout;
pub mod lineage;
pub mod naming;
pub mod schema;
pub mod session;
pub mod transform;
pub mod view;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::graph::{Edge, EdgeId, EdgeKind, Field, Graph, Node};
    pub use crate::integrity::{validate, Edit, EditError};
    pub use crate::lineage::{compute_lineage, compute_upstream, Direction, Highlighter};
    pub use crate::naming::{FieldHandle, FieldPointer, QualifiedName, TableType};
    pub use crate::schema::SchemaModel;
    pub use crate::session::{EditOutcome, Session};
    pub use crate::transform::{export_model, import_model, parse_model, render_model};
    pub use crate::view::{project, Visibility};
}

pub use graph::Graph;
pub use session::Session;
