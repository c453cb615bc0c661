//! View projection - which edges to draw, and how.
//!
//! [`project`] is a pure function of the edge list, the highlight set and
//! the visibility toggles. Filtering decides membership; styling never does.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::{Edge, EdgeId, EdgeKind};

// =============================================================================
// Options
// =============================================================================

/// Edge visibility toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visibility {
    pub show_normal: bool,
    pub show_calculation: bool,
    pub only_highlighted: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            show_normal: true,
            show_calculation: true,
            only_highlighted: false,
        }
    }
}

impl Visibility {
    pub fn shows(&self, kind: EdgeKind) -> bool {
        match kind {
            EdgeKind::Normal => self.show_normal,
            EdgeKind::Calculation => self.show_calculation,
        }
    }
}

/// Stroke settings per edge kind and emphasis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeStyle {
    pub normal_color: String,
    pub calculation_color: String,
    /// SVG dash pattern for calculation edges.
    pub calculation_dash: String,
    pub width: f64,
    pub highlighted_width: f64,
    pub dimmed_width: f64,
    pub dimmed_opacity: f64,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            normal_color: "#fd5d5d".to_string(),
            calculation_color: "#0066ff".to_string(),
            calculation_dash: "5,5".to_string(),
            width: 3.0,
            highlighted_width: 4.0,
            dimmed_width: 1.0,
            dimmed_opacity: 0.2,
        }
    }
}

impl EdgeStyle {
    pub fn color(&self, kind: EdgeKind) -> &str {
        match kind {
            EdgeKind::Normal => &self.normal_color,
            EdgeKind::Calculation => &self.calculation_color,
        }
    }

    pub fn dash(&self, kind: EdgeKind) -> Option<&str> {
        match kind {
            EdgeKind::Normal => None,
            EdgeKind::Calculation => Some(&self.calculation_dash),
        }
    }
}

// =============================================================================
// Projection
// =============================================================================

/// How strongly an edge is drawn relative to the highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    /// No highlight is active.
    Default,
    Highlighted,
    Dimmed,
}

/// Resolved drawing attributes for one edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appearance {
    pub emphasis: Emphasis,
    pub color: String,
    pub dash: Option<String>,
    pub width: f64,
    pub opacity: f64,
    pub animated: bool,
}

/// An edge that survived filtering, with its appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderEdge<'a> {
    pub edge: &'a Edge,
    pub appearance: Appearance,
}

impl RenderEdge<'_> {
    pub fn id(&self) -> &EdgeId {
        &self.edge.id
    }
}

/// Filter and style `edges` for display.
///
/// With `only_highlighted` set, exactly the highlighted edges survive and
/// the kind toggles are ignored. Otherwise each kind is dropped when its
/// toggle is off. Surviving edges keep input order.
pub fn project<'a>(
    edges: &'a [Edge],
    highlight: &BTreeSet<EdgeId>,
    visibility: &Visibility,
    style: &EdgeStyle,
) -> Vec<RenderEdge<'a>> {
    edges
        .iter()
        .filter(|edge| {
            if visibility.only_highlighted {
                highlight.contains(&edge.id)
            } else {
                visibility.shows(edge.kind)
            }
        })
        .map(|edge| RenderEdge {
            edge,
            appearance: appearance(edge, highlight, style),
        })
        .collect()
}

fn appearance(edge: &Edge, highlight: &BTreeSet<EdgeId>, style: &EdgeStyle) -> Appearance {
    let emphasis = if highlight.is_empty() {
        Emphasis::Default
    } else if highlight.contains(&edge.id) {
        Emphasis::Highlighted
    } else {
        Emphasis::Dimmed
    };

    let (width, opacity, animated) = match emphasis {
        Emphasis::Default => (style.width, 1.0, edge.kind == EdgeKind::Normal),
        Emphasis::Highlighted => (style.highlighted_width, 1.0, true),
        Emphasis::Dimmed => (style.dimmed_width, style.dimmed_opacity, false),
    };

    Appearance {
        emphasis,
        color: style.color(edge.kind).to_string(),
        dash: style.dash(edge.kind).map(str::to_string),
        width,
        opacity,
        animated,
    }
}
