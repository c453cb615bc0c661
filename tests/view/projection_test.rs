#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use fieldflow::graph::{Edge, EdgeId, EdgeKind};
    use fieldflow::naming::FieldHandle;
    use fieldflow::view::{project, EdgeStyle, Emphasis, Visibility};

    /// e1 is normal, e2 is calculation.
    fn edges() -> Vec<Edge> {
        vec![
            Edge::new(
                EdgeKind::Normal,
                FieldHandle::new("BASE_a", "x"),
                FieldHandle::new("BASE_b", "y"),
            ),
            Edge::new(
                EdgeKind::Calculation,
                FieldHandle::new("BASE_b", "y"),
                FieldHandle::new("VIEW_c", "z"),
            ),
        ]
    }

    fn ids(edges: &[Edge], highlight: &BTreeSet<EdgeId>, visibility: Visibility) -> Vec<EdgeId> {
        project(edges, highlight, &visibility, &EdgeStyle::default())
            .into_iter()
            .map(|r| r.edge.id.clone())
            .collect()
    }

    #[test]
    fn test_filter_composition() {
        let edges = edges();
        let e1 = edges[0].id.clone();
        let highlight: BTreeSet<EdgeId> = [e1.clone()].into_iter().collect();

        let only = Visibility {
            show_normal: true,
            show_calculation: true,
            only_highlighted: true,
        };
        assert_eq!(ids(&edges, &highlight, only), vec![e1.clone()]);

        let no_calc = Visibility {
            show_normal: true,
            show_calculation: false,
            only_highlighted: false,
        };
        assert_eq!(ids(&edges, &highlight, no_calc), vec![e1]);
    }

    #[test]
    fn test_kind_toggles_without_highlight() {
        let edges = edges();
        let none = BTreeSet::new();

        let all = ids(&edges, &none, Visibility::default());
        assert_eq!(all.len(), 2);

        let no_normal = Visibility {
            show_normal: false,
            ..Visibility::default()
        };
        assert_eq!(ids(&edges, &none, no_normal), vec![edges[1].id.clone()]);

        let neither = Visibility {
            show_normal: false,
            show_calculation: false,
            only_highlighted: false,
        };
        assert!(ids(&edges, &none, neither).is_empty());
    }

    #[test]
    fn test_styling_never_changes_membership() {
        let edges = edges();
        let highlight: BTreeSet<EdgeId> = [edges[0].id.clone()].into_iter().collect();
        let plain = ids(&edges, &BTreeSet::new(), Visibility::default());
        let lit = ids(&edges, &highlight, Visibility::default());
        assert_eq!(plain, lit);
    }

    #[test]
    fn test_highlight_styles() {
        let edges = edges();
        let highlight: BTreeSet<EdgeId> = [edges[0].id.clone()].into_iter().collect();
        let style = EdgeStyle::default();
        let out = project(&edges, &highlight, &Visibility::default(), &style);

        let inside = &out[0].appearance;
        assert_eq!(inside.emphasis, Emphasis::Highlighted);
        assert!(inside.animated);
        assert_eq!(inside.width, style.highlighted_width);
        assert_eq!(inside.opacity, 1.0);

        let outside = &out[1].appearance;
        assert_eq!(outside.emphasis, Emphasis::Dimmed);
        assert!(!outside.animated);
        assert_eq!(outside.opacity, style.dimmed_opacity);
        // Kind colouring survives dimming.
        assert_eq!(outside.color, style.calculation_color);
        assert_eq!(outside.dash.as_deref(), Some("5,5"));
    }

    #[test]
    fn test_custom_style_is_used() {
        let edges = edges();
        let style = EdgeStyle {
            normal_color: "#111111".into(),
            calculation_dash: "2,2".into(),
            ..EdgeStyle::default()
        };
        let out = project(&edges, &BTreeSet::new(), &Visibility::default(), &style);
        assert_eq!(out[0].appearance.color, "#111111");
        assert_eq!(out[1].appearance.dash.as_deref(), Some("2,2"));
    }
}
