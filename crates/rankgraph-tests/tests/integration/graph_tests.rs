//! Integration tests for entity graph construction from parsed profiles.

use rankgraph_core::engine::graph::{entity_key, NodeKind};
use rankgraph_core::{build_candidate_graph, build_entity_graph, build_role_graph, SubjectType};
use rankgraph_profile::{parse_profile, Category, Profile};

#[test]
fn test_graph_from_loose_json() {
    let candidate = parse_profile(
        r#"{
            "id": "c-17",
            "name": "Ada",
            "skills": ["Python", " CUDA ", "", null],
            "experience": "Research Engineer",
            "education": 0
        }"#,
    )
    .unwrap();
    let role = parse_profile(r#"{"id": "r-3", "skills": ["Python"]}"#).unwrap();

    let g = build_entity_graph(&candidate, &role);

    assert_eq!(
        g.entity_names(Category::Skills),
        vec!["Python", "CUDA", "Python"]
    );
    assert_eq!(g.entity_names(Category::Experience), vec!["Research Engineer"]);
    assert!(g.entity_names(Category::Education).is_empty());
    // 2 subjects + 4 entities
    assert_eq!(g.node_count(), 6);
    // 4 subject-entity edges + candidate-role + 2 self-loops
    assert_eq!(g.edge_count(), 7);
}

#[test]
fn test_subject_node_carries_full_profile() {
    let candidate = Profile::new("c1")
        .with_skills(["Go"])
        .with_attr("location", serde_json::json!("Berlin"));
    let g = build_entity_graph(&candidate, &Profile::new("r1"));

    let node = g.node_by_key("c1").unwrap();
    let attrs = node.attributes();
    assert_eq!(attrs["type"], "candidate");
    assert_eq!(attrs["location"], "Berlin");
    assert_eq!(attrs["skills"], serde_json::json!(["Go"]));
}

#[test]
fn test_entity_attributes() {
    let g = build_role_graph(&Profile::new("r1").with_education(["PhD"]));
    let node = g
        .node_by_key(&entity_key(Category::Education, "PhD", SubjectType::Role))
        .unwrap();
    let attrs = node.attributes();
    assert_eq!(attrs["type"], "education");
    assert_eq!(attrs["name"], "PhD");
    assert_eq!(attrs["parent_type"], "role");
}

#[test]
fn test_same_value_on_both_sides_stays_distinct() {
    let p = Profile::new("x").with_skills(["Rust"]);
    let g = build_entity_graph(&p, &Profile::new("y").with_skills(["Rust"]));
    let keys: Vec<_> = g.entities(Category::Skills).map(|n| n.key.to_string()).collect();
    assert_eq!(keys, vec!["skills_Rust_candidate", "skills_Rust_role"]);
}

#[test]
fn test_one_sided_graphs_hold_one_side() {
    let candidate = Profile::new("c1").with_skills(["Python", "CUDA"]);
    let role = Profile::new("r1").with_skills(["Python"]);

    let cg = build_candidate_graph(&candidate);
    assert!(cg.entities(Category::Skills).all(|n| matches!(
        &n.kind,
        NodeKind::Entity { parent_type: SubjectType::Candidate, .. }
    )));

    let rg = build_role_graph(&role);
    assert_eq!(rg.entity_names(Category::Skills), vec!["Python"]);
    assert_eq!(rg.subjects().count(), 2);
}

#[test]
fn test_missing_ids_use_subject_defaults() {
    let g = build_entity_graph(&Profile::default(), &Profile::default());
    assert!(g.node_by_key("candidate").is_some());
    assert!(g.node_by_key("role").is_some());
}

#[test]
fn test_every_subject_has_self_loop() {
    let g = build_entity_graph(
        &Profile::new("c").with_skills(["A", "B"]),
        &Profile::new("r").with_experience(["C"]),
    );
    for subject in g.subjects() {
        let e = g.edge_between(subject.id, subject.id).unwrap();
        assert_eq!(e.weight, 1.0);
        assert!(g.neighbors(subject.id).contains(&subject.id));
    }
}
