//! Integration tests for exporting and restoring bandit state.

use rankgraph_core::engine::snapshot::SnapshotMetadata;
use rankgraph_core::{
    export_state, load_snapshot_binary, load_snapshot_json, restore_state, save_snapshot_binary,
    save_snapshot_json, BanditRecord, GraphBandit, RankError, Snapshot,
};
use rankgraph_tests::{
    assert_close, assert_records_close, ml_candidates, ml_role, seeded_bandit, simulate,
};

fn trained_bandit() -> GraphBandit {
    let mut bandit = seeded_bandit(21);
    bandit
        .initialize_from_graph(&ml_candidates(), &ml_role())
        .unwrap();
    simulate(&mut bandit, &[0.8, 0.2], 40, 22).unwrap();
    bandit
}

#[test]
fn test_restore_of_export_reproduces_state() {
    let source = trained_bandit();
    let mut restored = GraphBandit::default();
    restore_state(&mut restored, export_state(&source)).unwrap();

    assert_eq!(restored.num_arms(), source.num_arms());
    for i in 0..source.num_arms() {
        assert_close(restored.alpha(i).unwrap(), source.alpha(i).unwrap(), 1e-6, "alpha");
        assert_close(restored.beta(i).unwrap(), source.beta(i).unwrap(), 1e-6, "beta");
    }
    assert_eq!(restored.lambda_fg(), source.lambda_fg());
    assert_eq!(restored.b(), source.b());
}

#[test]
fn test_restored_bandit_keeps_learning() {
    let mut restored = GraphBandit::default();
    restore_state(&mut restored, export_state(&trained_bandit())).unwrap();
    let arm = restored.select_candidate().unwrap();
    let before = restored.beta(arm).unwrap();
    restored.update(arm, 0.0).unwrap();
    assert_eq!(restored.beta(arm).unwrap(), before + 1.0);
}

#[test]
fn test_record_json_shape() {
    let record = export_state(&trained_bandit());
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["num_arms"], 2);
    assert_eq!(value["alpha"].as_array().unwrap().len(), 2);
    assert_eq!(value["lambda_fg"], 0.01);
    assert_eq!(value["b"], 1000.0);
}

#[test]
fn test_partial_record_gets_defaults() {
    let record: BanditRecord =
        serde_json::from_str(r#"{"alpha": [4.0, 2.0], "beta": [1.0, 3.0], "num_arms": 2}"#)
            .unwrap();
    let mut bandit = GraphBandit::default();
    restore_state(&mut bandit, record).unwrap();
    assert_eq!(bandit.lambda_fg(), 0.01);
    assert_eq!(bandit.b(), 1000.0);
    assert_eq!(bandit.alpha(0), Some(4.0));
}

#[test]
fn test_mismatched_record_is_rejected_without_partial_restore() {
    let mut bandit = trained_bandit();
    let before = export_state(&bandit);

    let record: BanditRecord =
        serde_json::from_str(r#"{"alpha": [4.0, 2.0, 1.0], "beta": [1.0, 3.0], "num_arms": 3}"#)
            .unwrap();
    assert!(matches!(
        restore_state(&mut bandit, record),
        Err(RankError::CorruptSnapshot(_))
    ));
    assert_eq!(export_state(&bandit), before);
}

#[test]
fn test_snapshot_json_roundtrip() {
    let snapshot = Snapshot::capture(&trained_bandit(), Some("ml-engineer".into()));
    let json = save_snapshot_json(&snapshot).unwrap();
    assert!(json.contains("record"));
    assert!(json.contains("metadata"));
    assert!(json.contains("ml-engineer"));

    let loaded = load_snapshot_json(&json).unwrap();
    assert_eq!(loaded.metadata, snapshot.metadata);
    assert_records_close(&loaded.record, &snapshot.record);
}

#[test]
fn test_snapshot_binary_roundtrip() {
    let snapshot = Snapshot::capture(&trained_bandit(), None);
    let bytes = save_snapshot_binary(&snapshot).unwrap();
    let loaded = load_snapshot_binary(&bytes).unwrap();
    assert_eq!(loaded.record, snapshot.record);
    assert_eq!(loaded.metadata.role_id, None);
}

#[test]
fn test_incompatible_snapshot_rejected_on_load() {
    let snapshot = Snapshot {
        record: BanditRecord::default(),
        metadata: SnapshotMetadata {
            version: "42.7.0".into(),
            role_id: None,
        },
    };
    let json = save_snapshot_json(&snapshot).unwrap();
    assert!(matches!(
        load_snapshot_json(&json),
        Err(RankError::CorruptSnapshot(msg)) if msg.contains("42.7.0")
    ));
}

#[test]
fn test_truncated_binary_is_serialization_error() {
    let snapshot = Snapshot::capture(&trained_bandit(), None);
    let bytes = save_snapshot_binary(&snapshot).unwrap();
    assert!(matches!(
        load_snapshot_binary(&bytes[..bytes.len() / 2]),
        Err(RankError::Serialization(_))
    ));
}
