//! One open document.
//!
//! A [`Session`] owns the current graph along with the view state that
//! follows it around: the lineage highlight, the visibility toggles and the
//! edge style. Every user action maps to one method call that runs to
//! completion before the next.
//!
//! Edit rejections are not errors at this level. [`Session::apply`] reports
//! them as [`EditOutcome::Rejected`] and keeps the previous graph.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::{ExportSettings, LayoutSettings, Settings};
use crate::graph::Graph;
use crate::integrity::{Applied, Edit, EditError};
use crate::layout::{LayoutError, LayoutResult, StackedLayout};
use crate::lineage::{Direction, Highlighter};
use crate::naming::{FieldHandle, TableType};
use crate::schema::SchemaModel;
use crate::transform::{
    export_model, import_model, parse_model, render_model, ExportError, ExportResult, ImportError,
};
use crate::view::{project, EdgeStyle, RenderEdge, Visibility};

/// Errors raised by document-level session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// What became of an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The graph changed.
    Applied,
    /// The edit was valid but changed nothing.
    Unchanged,
    /// The edit was refused; the graph is as it was.
    Rejected(EditError),
}

impl EditOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EditOutcome::Applied)
    }
}

/// Graph plus view state for a single document.
#[derive(Debug, Clone, Default)]
pub struct Session {
    graph: Graph,
    highlighter: Highlighter,
    visibility: Visibility,
    style: EdgeStyle,
    export: ExportSettings,
    layout: LayoutSettings,
}

impl Session {
    /// Create an empty session with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session configured from `settings`.
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            graph: Graph::new(),
            highlighter: Highlighter::new(settings.lineage.direction),
            visibility: settings.view.visibility,
            style: settings.view.style.clone(),
            export: settings.export.clone(),
            layout: settings.layout.clone(),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn style(&self) -> &EdgeStyle {
        &self.style
    }

    // =========================================================================
    // Import / export
    // =========================================================================

    /// Replace the document with one parsed from JSON.
    ///
    /// A document that fails to parse or import leaves the session as it
    /// was.
    pub fn import_json(&mut self, json: &str) -> SessionResult<()> {
        let model = parse_model(json).inspect_err(|e| warn!("import rejected: {}", e))?;
        self.import_model(&model)
    }

    /// Replace the document with `model`.
    pub fn import_model(&mut self, model: &SchemaModel) -> SessionResult<()> {
        let mut graph = import_model(model).inspect_err(|e| warn!("import rejected: {}", e))?;
        let stacked = StackedLayout {
            spacing: self.layout.row_height,
        };
        graph.relayout(&stacked, Default::default())?;

        info!(
            "imported {} entities and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        self.graph = graph;
        self.highlighter.clear();
        Ok(())
    }

    /// Read and import a document from disk.
    pub fn import_file<P: AsRef<Path>>(&mut self, path: P) -> SessionResult<()> {
        let content = fs::read_to_string(path).map_err(ImportError::from)?;
        self.import_json(&content)
    }

    pub fn export_model(&self) -> SchemaModel {
        export_model(&self.graph)
    }

    /// Render the document with the configured indent.
    pub fn export_json(&self) -> ExportResult<String> {
        render_model(&self.export_model(), self.export.indent)
    }

    /// Write the document to `path`, or to the configured file name.
    ///
    /// Returns the path written.
    pub fn export_file(&self, path: Option<&Path>) -> SessionResult<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.export.file_name));
        let json = self.export_json()?;
        fs::write(&path, json).map_err(ExportError::from)?;
        info!("exported document to {}", path.display());
        Ok(path)
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Apply an edit, keeping the current graph when it is rejected.
    ///
    /// The highlight follows a renamed root and is recomputed against the
    /// new graph, so it never names an edge that no longer exists.
    pub fn apply(&mut self, edit: Edit) -> EditOutcome {
        match self.graph.apply_edit(edit) {
            Ok(applied) => self.commit(applied),
            Err(err) => {
                debug!("edit rejected: {}", err);
                EditOutcome::Rejected(err)
            }
        }
    }

    /// Add an empty table and return its id.
    pub fn create_table(&mut self, table_type: TableType) -> Option<String> {
        match self.graph.apply_edit(Edit::CreateTable { table_type }) {
            Ok(applied) => {
                let created = applied.created.clone();
                self.commit(applied);
                created
            }
            Err(err) => {
                debug!("table creation rejected: {}", err);
                None
            }
        }
    }

    fn commit(&mut self, applied: Applied) -> EditOutcome {
        if applied.graph.version() == self.graph.version() {
            return EditOutcome::Unchanged;
        }
        self.graph = applied.graph;
        if let Some(renamed) = &applied.renamed {
            self.highlighter.follow(renamed);
        }
        self.highlighter.refresh(&self.graph);
        EditOutcome::Applied
    }

    // =========================================================================
    // Lineage
    // =========================================================================

    /// Toggle the highlight for the field with handle id `handle`.
    ///
    /// Returns the resolved field, or `None` when the handle names no field.
    pub fn select_field(&mut self, handle: &str) -> Option<FieldHandle> {
        let Some(root) = self.graph.resolve_handle(handle) else {
            debug!("ignoring selection of unknown handle '{}'", handle);
            return None;
        };
        self.highlighter.select(&self.graph, root.clone());
        Some(root)
    }

    pub fn clear_highlight(&mut self) {
        self.highlighter.clear();
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.highlighter.set_direction(direction);
    }

    // =========================================================================
    // View
    // =========================================================================

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    pub fn toggle_normal(&mut self) {
        self.visibility.show_normal = !self.visibility.show_normal;
    }

    pub fn toggle_calculation(&mut self) {
        self.visibility.show_calculation = !self.visibility.show_calculation;
    }

    pub fn toggle_only_highlighted(&mut self) {
        self.visibility.only_highlighted = !self.visibility.only_highlighted;
    }

    /// The edges to draw right now.
    pub fn render_edges(&self) -> Vec<RenderEdge<'_>> {
        project(
            self.graph.edges(),
            self.highlighter.edges(),
            &self.visibility,
            &self.style,
        )
    }

    /// Re-run the configured layout over the whole graph.
    pub fn relayout(&mut self) -> LayoutResult<()> {
        let layout = self.layout.build();
        self.graph.relayout(layout.as_ref(), self.layout.direction)
    }
}
