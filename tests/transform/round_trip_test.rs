//! import(export(import(M))) is equivalent to import(M).

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use fieldflow::graph::{EdgeKind, Graph};
    use fieldflow::integrity::{validate, Edit, EditError};
    use fieldflow::naming::{FieldHandle, TableType};
    use fieldflow::transform::{export_model, import_model, parse_model, render_model};

    /// Node ids, per-node field names, and edge triples.
    fn shape(graph: &Graph) -> (BTreeMap<String, Vec<String>>, BTreeSet<(EdgeKind, FieldHandle, FieldHandle)>) {
        let fields = graph
            .nodes()
            .iter()
            .map(|n| {
                (
                    n.id.clone(),
                    n.data.fields.iter().map(|f| f.name.clone()).collect(),
                )
            })
            .collect();
        (fields, graph.edge_triples())
    }

    fn assert_round_trips(json: &str) {
        let first = import_model(&parse_model(json).unwrap()).unwrap();
        let rendered = render_model(&export_model(&first), 2).unwrap();
        let second = import_model(&parse_model(&rendered).unwrap()).unwrap();

        assert_eq!(shape(&first), shape(&second));
        assert!(validate(&second).is_ok());

        // Export is a fixed point after one pass.
        assert_eq!(export_model(&second), export_model(&first));
    }

    #[test]
    fn test_orders_lines() {
        assert_round_trips(
            r#"{"entities":{"BASE_Orders":{"fields":{"id":{},"total":{"calculation":{"expression":"qty*price","ref":["BASE_Lines.qty","BASE_Lines.price"]}}}},"BASE_Lines":{"fields":{"qty":{},"price":{}}}}}"#,
        );
    }

    #[test]
    fn test_mixed_table_types_and_kinds() {
        assert_round_trips(
            r#"{"entities":{
                "BASE_customers":{"alias":"c","fields":{"id":{},"name":{}}},
                "CTE_recent":{"fields":{
                    "customer_id":{"ref":["BASE_customers.id"]},
                    "label":{"ref":["BASE_customers.name"],
                             "calculation":{"expression":"upper(name)","ref":["BASE_customers.name"]}}
                }},
                "VIEW_report":{"fields":{
                    "who":{"ref":["CTE_recent.label","CTE_recent.customer_id"]}
                }}
            }}"#,
        );
    }

    #[test]
    fn test_unqualified_and_display_name_pointers() {
        assert_round_trips(
            r#"{"entities":{
                "Lines":{"fields":{"qty":{}}},
                "VIEW_Summary":{"fields":{"n":{"ref":["Lines.qty"]}}},
                "CTE_Step":{"fields":{"m":{"ref":["Summary.n"]}}}
            }}"#,
        );
    }

    #[test]
    fn test_inert_pointers_and_cycles() {
        assert_round_trips(
            r#"{"entities":{
                "BASE_a":{"fields":{"x":{"ref":["BASE_b.y","dangling","BASE_gone.z"]}}},
                "BASE_b":{"fields":{"y":{"ref":["BASE_a.x"]}}}
            }}"#,
        );
    }

    #[test]
    fn test_empty_model() {
        assert_round_trips(r#"{"entities":{}}"#);
    }

    #[test]
    fn test_round_trip_after_edits() {
        let graph = import_model(
            &parse_model(
                r#"{"entities":{
                    "BASE_a":{"fields":{"x":{}}},
                    "BASE_b":{"fields":{"y":{"ref":["BASE_a.x"]}}}
                }}"#,
            )
            .unwrap(),
        )
        .unwrap();

        let edited = graph
            .apply(Edit::CreateTable {
                table_type: TableType::View,
            })
            .and_then(|g| {
                g.apply(Edit::AddField {
                    entity: "VIEW_NewTable".into(),
                    name: "z".into(),
                })
            })
            .and_then(|g| {
                g.apply(Edit::Connect {
                    source: FieldHandle::new("BASE_b", "y"),
                    target: FieldHandle::new("VIEW_NewTable", "z"),
                    kind: EdgeKind::Calculation,
                    expression: Some("y + 1".into()),
                })
            })
            .and_then(|g| {
                g.apply(Edit::RenameEntity {
                    id: "BASE_a".into(),
                    new_name: "alpha".into(),
                })
            })
            .unwrap();
        assert!(validate(&edited).is_ok());

        let back = import_model(&export_model(&edited)).unwrap();
        assert_eq!(shape(&back), shape(&edited));
    }

    #[test]
    fn test_every_rename_keeps_invariants_and_round_trips() {
        let docs = [
            r#"{"entities":{
                "VIEW_Orders":{"fields":{"id":{}}},
                "BASE_X":{"fields":{"id":{}}},
                "BASE_T":{"fields":{"t":{"ref":["Orders.id","Sales.id"]}}}
            }}"#,
            r#"{"entities":{
                "BASE_dbo.Lines":{"fields":{"qty":{}}},
                "Lines":{"fields":{"qty":{}}},
                "VIEW_r":{"fields":{"q":{"ref":["dbo.Lines.qty","Lines.qty"],
                    "calculation":{"expression":"qty","ref":["BASE_dbo.Lines.qty"]}}}}
            }}"#,
        ];
        let names = ["Orders", "Sales", "dbo.Orders", "x.y.z", "Lines", "T"];

        for doc in docs {
            let graph = import_model(&parse_model(doc).unwrap()).unwrap();
            assert!(validate(&graph).is_ok());
            for id in graph.node_ids() {
                for name in names {
                    let edit = Edit::RenameEntity {
                        id: id.to_string(),
                        new_name: name.to_string(),
                    };
                    let applied = match graph.apply_edit(edit) {
                        Ok(applied) => applied,
                        Err(EditError::EntityNameCollision(_)) => continue,
                        Err(other) => panic!("renaming {} to {}: {}", id, name, other),
                    };
                    let next = applied.graph;
                    if let Err(violations) = validate(&next) {
                        panic!("renaming {} to {} broke invariants: {:?}", id, name, violations);
                    }

                    // Existing references move with the rename and nowhere else.
                    let after = next.edge_triples();
                    for (kind, source, target) in graph.edge_triples() {
                        let carried = match &applied.renamed {
                            Some(renamed) => (kind, renamed.carry(&source), renamed.carry(&target)),
                            None => (kind, source, target),
                        };
                        assert!(
                            after.contains(&carried),
                            "renaming {} to {} lost {:?}",
                            id,
                            name,
                            carried
                        );
                    }

                    let back = import_model(&export_model(&next)).unwrap();
                    assert_eq!(shape(&back), shape(&next), "renaming {} to {}", id, name);
                }
            }
        }
    }
}
