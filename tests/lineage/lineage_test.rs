#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use fieldflow::graph::{EdgeId, Graph};
    use fieldflow::integrity::Edit;
    use fieldflow::lineage::{compute_lineage, compute_upstream, lineage_cycles, Direction, Highlighter};
    use fieldflow::naming::FieldHandle;
    use fieldflow::schema::{EntityDef, FieldDef, SchemaModel};
    use fieldflow::transform::{import_model, parse_model};

    fn load(json: &str) -> Graph {
        import_model(&parse_model(json).unwrap()).unwrap()
    }

    fn ids(edges: &BTreeSet<EdgeId>) -> Vec<&str> {
        edges.iter().map(|e| e.as_str()).collect()
    }

    /// A.x <- B.y <- A.x
    fn cycle() -> Graph {
        load(
            r#"{"entities":{
                "BASE_A":{"fields":{"x":{"ref":["BASE_B.y"]}}},
                "BASE_B":{"fields":{"y":{"ref":["BASE_A.x"]}}}
            }}"#,
        )
    }

    #[test]
    fn test_upstream_terminates_on_cycle() {
        let graph = cycle();
        let edges = compute_upstream(&graph, &FieldHandle::new("BASE_A", "x"));
        assert_eq!(
            ids(&edges),
            vec!["ref-BASE_A.x->BASE_B.y", "ref-BASE_B.y->BASE_A.x"]
        );
    }

    #[test]
    fn test_both_directions_on_cycle_match_upstream() {
        let graph = cycle();
        let root = FieldHandle::new("BASE_B", "y");
        let up = compute_lineage(&graph, &root, Direction::Upstream);
        let down = compute_lineage(&graph, &root, Direction::Downstream);
        let both = compute_lineage(&graph, &root, Direction::Both);
        assert_eq!(up, down);
        assert_eq!(both, up);
    }

    #[test]
    fn test_cycle_is_reported() {
        let cycles = lineage_cycles(&cycle());
        assert_eq!(cycles.len(), 1);
        assert_eq!(
            cycles[0],
            vec![FieldHandle::new("BASE_A", "x"), FieldHandle::new("BASE_B", "y")]
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let graph = load(r#"{"entities":{"BASE_A":{"fields":{"x":{"ref":["BASE_A.x"]}}}}}"#);
        assert_eq!(lineage_cycles(&graph), vec![vec![FieldHandle::new("BASE_A", "x")]]);
        assert_eq!(compute_upstream(&graph, &FieldHandle::new("BASE_A", "x")).len(), 1);
    }

    #[test]
    fn test_upstream_ignores_siblings_and_downstream() {
        // s1 -> m <- s2, m -> d1, unrelated u -> v
        let graph = load(
            r#"{"entities":{
                "BASE_src":{"fields":{"s1":{},"s2":{},"u":{}}},
                "CTE_mid":{"fields":{"m":{"ref":["BASE_src.s1"],
                    "calculation":{"expression":"s1 + s2","ref":["BASE_src.s2"]}},
                    "v":{"ref":["BASE_src.u"]}}},
                "VIEW_out":{"fields":{"d1":{"ref":["CTE_mid.m"]}}}
            }}"#,
        );

        let up = compute_upstream(&graph, &FieldHandle::new("CTE_mid", "m"));
        assert_eq!(
            ids(&up),
            vec!["calc-BASE_src.s2->CTE_mid.m", "ref-BASE_src.s1->CTE_mid.m"]
        );

        let down = compute_lineage(&graph, &FieldHandle::new("BASE_src", "s1"), Direction::Downstream);
        assert_eq!(
            ids(&down),
            vec!["ref-BASE_src.s1->CTE_mid.m", "ref-CTE_mid.m->VIEW_out.d1"]
        );

        let both = compute_lineage(&graph, &FieldHandle::new("CTE_mid", "m"), Direction::Both);
        assert_eq!(both.len(), 3);
        assert!(!both.contains(&EdgeId::from("ref-BASE_src.u->CTE_mid.v")));
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let mut entity = EntityDef::new().with_field("f0", FieldDef::new());
        for i in 1..2000 {
            entity = entity.with_field(format!("f{}", i), FieldDef::new().with_ref(format!("BASE_t.f{}", i - 1)));
        }
        let graph = import_model(&SchemaModel::new().with_entity("BASE_t", entity)).unwrap();

        let edges = compute_upstream(&graph, &FieldHandle::new("BASE_t", "f1999"));
        assert_eq!(edges.len(), 1999);
    }

    // ========================================================================
    // Highlighter
    // ========================================================================

    #[test]
    fn test_toggle_idempotence() {
        let graph = load(
            r#"{"entities":{
                "BASE_a":{"fields":{"x":{},"w":{}}},
                "BASE_b":{"fields":{"f":{"ref":["BASE_a.x"]},"g":{"ref":["BASE_a.w"]}}}
            }}"#,
        );
        let f = FieldHandle::new("BASE_b", "f");
        let g = FieldHandle::new("BASE_b", "g");

        let mut hl = Highlighter::default();
        hl.select(&graph, f.clone());
        hl.select(&graph, f.clone());
        assert!(hl.edges().is_empty());

        hl.select(&graph, f);
        hl.select(&graph, g.clone());
        assert_eq!(hl.edges(), &compute_upstream(&graph, &g));
        assert_eq!(hl.root(), Some(&g));
    }

    #[test]
    fn test_highlight_refresh_tracks_edits() {
        let graph = load(
            r#"{"entities":{
                "BASE_a":{"fields":{"x":{}}},
                "BASE_b":{"fields":{"y":{"ref":["BASE_a.x"]}}}
            }}"#,
        );
        let mut hl = Highlighter::new(Direction::Upstream);
        hl.select(&graph, FieldHandle::new("BASE_b", "y"));
        assert_eq!(hl.edges().len(), 1);

        let next = graph
            .apply(Edit::Disconnect {
                edge_id: "ref-BASE_a.x->BASE_b.y".into(),
            })
            .unwrap();
        hl.refresh(&next);
        assert!(hl.is_active());
        assert!(hl.edges().is_empty());
    }

    #[test]
    fn test_direction_switch_clears_and_applies_to_next_selection() {
        let graph = cycle();
        let mut hl = Highlighter::default();
        hl.select(&graph, FieldHandle::new("BASE_A", "x"));
        hl.set_direction(Direction::Both);
        assert!(!hl.is_active());
        assert_eq!(hl.direction(), Direction::Both);

        hl.select(&graph, FieldHandle::new("BASE_A", "x"));
        assert_eq!(hl.edges().len(), 2);
    }
}
