#[cfg(test)]
mod tests {
    use fieldflow::config::{LayoutAlgorithm, Settings};
    use fieldflow::graph::EdgeKind;
    use fieldflow::integrity::{Edit, EditError};
    use fieldflow::lineage::Direction;
    use fieldflow::naming::{FieldHandle, TableType};
    use fieldflow::session::{EditOutcome, Session, SessionError};
    use fieldflow::transform::{parse_model, DEFAULT_EXPORT_FILE};
    use fieldflow::view::Emphasis;

    const DOC: &str = r#"{"entities":{
        "BASE_Lines":{"fields":{"qty":{},"price":{}}},
        "BASE_Orders":{"alias":"o","fields":{
            "id":{},
            "total":{"calculation":{"expression":"qty*price","ref":["BASE_Lines.qty","BASE_Lines.price"]}}
        }},
        "VIEW_Report":{"fields":{"revenue":{"ref":["BASE_Orders.total"]}}}
    }}"#;

    fn session() -> Session {
        let mut session = Session::new();
        session.import_json(DOC).unwrap();
        session
    }

    #[test]
    fn test_failed_import_keeps_document() {
        let mut session = session();
        let before = session.graph().clone();
        session.select_field("VIEW_Report-revenue").unwrap();

        let err = session.import_json("{\"entities\": [").unwrap_err();
        assert!(matches!(err, SessionError::Import(_)));
        assert_eq!(session.graph(), &before);
        assert!(session.highlighter().is_active());

        // Duplicate canonical keys fail after parsing; still atomic.
        let dup = r#"{"entities":{"Orders":{"fields":{}},"BASE_Orders":{"fields":{}}}}"#;
        assert!(session.import_json(dup).is_err());
        assert_eq!(session.graph(), &before);
    }

    #[test]
    fn test_successful_import_replaces_and_clears_highlight() {
        let mut session = session();
        session.select_field("VIEW_Report-revenue").unwrap();
        session
            .import_json(r#"{"entities":{"BASE_x":{"fields":{"a":{}}}}}"#)
            .unwrap();
        assert_eq!(session.graph().node_count(), 1);
        assert!(!session.highlighter().is_active());
    }

    #[test]
    fn test_select_and_render() {
        let mut session = session();
        let root = session.select_field("VIEW_Report-revenue").unwrap();
        assert_eq!(root, FieldHandle::new("VIEW_Report", "revenue"));
        assert_eq!(session.highlighter().edges().len(), 3);

        let rendered = session.render_edges();
        assert_eq!(rendered.len(), 3);
        assert!(rendered
            .iter()
            .all(|r| r.appearance.emphasis == Emphasis::Highlighted));

        // Select again: cleared, back to kind defaults.
        session.select_field("VIEW_Report-revenue");
        assert!(session
            .render_edges()
            .iter()
            .all(|r| r.appearance.emphasis == Emphasis::Default));
    }

    #[test]
    fn test_toggles_compose_with_highlight() {
        let mut session = session();
        session.select_field("BASE_Orders-total").unwrap();
        session.toggle_only_highlighted();
        assert_eq!(session.render_edges().len(), 2);

        session.toggle_only_highlighted();
        session.toggle_calculation();
        let rendered = session.render_edges();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].edge.kind, EdgeKind::Normal);
        assert_eq!(rendered[0].appearance.emphasis, Emphasis::Dimmed);
    }

    #[test]
    fn test_direction_change_clears() {
        let mut session = session();
        session.select_field("BASE_Lines-qty").unwrap();
        assert!(session.highlighter().edges().is_empty());

        session.set_direction(Direction::Downstream);
        assert!(!session.highlighter().is_active());

        session.select_field("BASE_Lines-qty").unwrap();
        assert_eq!(session.highlighter().edges().len(), 2);
    }

    #[test]
    fn test_delete_under_highlight() {
        let mut session = session();
        session.select_field("VIEW_Report-revenue").unwrap();
        let outcome = session.apply(Edit::DeleteEntity {
            id: "BASE_Lines".into(),
        });
        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(session.highlighter().edges().len(), 1);

        let outcome = session.apply(Edit::DeleteEntity {
            id: "VIEW_Report".into(),
        });
        assert!(outcome.is_applied());
        assert!(!session.highlighter().is_active());
    }

    #[test]
    fn test_rejections_are_outcomes() {
        let mut session = session();
        let outcome = session.apply(Edit::RenameEntity {
            id: "BASE_Lines".into(),
            new_name: "Orders".into(),
        });
        assert_eq!(
            outcome,
            EditOutcome::Rejected(EditError::EntityNameCollision("BASE_Orders".into()))
        );
    }

    #[test]
    fn test_export_file_defaults_to_configured_name() {
        let dir = tempfile::tempdir().unwrap();
        let session = session();

        let explicit = dir.path().join("out.json");
        let written = session.export_file(Some(explicit.as_path())).unwrap();
        assert_eq!(written, explicit);

        let text = std::fs::read_to_string(&written).unwrap();
        let model = parse_model(&text).unwrap();
        assert_eq!(model.entities.len(), 3);
        assert_eq!(model.entity("BASE_Orders").unwrap().alias.as_deref(), Some("o"));
        assert!(text.starts_with("{\n  \"entities\""));

        let mut settings = Settings::default();
        settings.export.file_name = dir.path().join(DEFAULT_EXPORT_FILE).display().to_string();
        let mut configured = Session::with_settings(&settings);
        configured.import_json(DOC).unwrap();
        let written = configured.export_file(None).unwrap();
        assert_eq!(written, dir.path().join(DEFAULT_EXPORT_FILE));
        assert!(written.exists());
    }

    #[test]
    fn test_settings_drive_session() {
        let settings = Settings::from_toml(
            r#"
[export]
indent = 4

[lineage]
direction = "downstream"

[view]
show_normal = false

[layout]
algorithm = "layered"
row_height = 100.0
column_width = 500.0
"#,
        )
        .unwrap();
        assert_eq!(settings.layout.algorithm, LayoutAlgorithm::Layered);

        let mut session = Session::with_settings(&settings);
        session.import_json(DOC).unwrap();

        // Import stacks nodes at the configured row height.
        let ys: Vec<f64> = session.graph().nodes().iter().map(|n| n.position.y).collect();
        assert_eq!(ys, vec![0.0, 100.0, 200.0]);

        assert!(session.export_json().unwrap().starts_with("{\n    \"entities\""));
        assert_eq!(session.highlighter().direction(), Direction::Downstream);
        assert!(session
            .render_edges()
            .iter()
            .all(|r| r.edge.kind == EdgeKind::Calculation));

        session.relayout().unwrap();
        let report = session.graph().node("VIEW_Report").unwrap();
        assert_eq!(report.position.x, 1000.0);
    }

    #[test]
    fn test_create_table_then_edit() {
        let mut session = session();
        let id = session.create_table(TableType::View).unwrap();
        assert_eq!(id, "VIEW_NewTable");
        assert!(session
            .apply(Edit::AddField {
                entity: id.clone(),
                name: "n".into()
            })
            .is_applied());
        assert!(session
            .apply(Edit::Connect {
                source: FieldHandle::new("VIEW_Report", "revenue"),
                target: FieldHandle::new(id, "n"),
                kind: EdgeKind::Normal,
                expression: None,
            })
            .is_applied());
        assert_eq!(session.graph().edge_count(), 4);
    }
}
