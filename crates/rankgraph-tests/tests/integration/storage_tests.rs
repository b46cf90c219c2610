//! Integration tests for the snapshot storage seam.

use rankgraph_core::{
    export_state, restore_from_store, FileSnapshotStore, GraphBandit, MemorySnapshotStore,
    SnapshotStore,
};
use rankgraph_tests::{assert_records_close, ml_candidates, ml_role, seeded_bandit, simulate};

fn trained_bandit() -> GraphBandit {
    let mut bandit = seeded_bandit(31);
    bandit
        .initialize_from_graph(&ml_candidates(), &ml_role())
        .unwrap();
    simulate(&mut bandit, &[0.8, 0.2], 25, 32).unwrap();
    bandit
}

fn persist_and_restore<S: SnapshotStore>(store: &mut S) {
    let source = trained_bandit();
    store.save("ml-engineer", &export_state(&source)).unwrap();

    let mut restored = GraphBandit::default();
    assert!(restore_from_store(&mut restored, &*store, "ml-engineer").unwrap());
    assert_records_close(&export_state(&restored), &export_state(&source));

    let mut cold = GraphBandit::default();
    assert!(!restore_from_store(&mut cold, &*store, "unknown-role").unwrap());
    assert!(!cold.is_ready());
}

#[test]
fn test_memory_store_persists_by_role() {
    persist_and_restore(&mut MemorySnapshotStore::new());
}

#[test]
fn test_file_store_persists_by_role() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileSnapshotStore::new(dir.path());
    persist_and_restore(&mut store);
    assert!(store.path_for("ml-engineer").exists());
}

#[test]
fn test_file_store_keeps_roles_apart() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileSnapshotStore::new(dir.path());
    let bandit = trained_bandit();
    let record = export_state(&bandit);

    store.save("role/a", &record).unwrap();
    assert!(store.load("role/b").unwrap().is_none());
    let loaded = store.load("role/a").unwrap().unwrap();
    assert_records_close(&loaded, &record);
}

#[test]
fn test_file_store_separates_ids_with_similar_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileSnapshotStore::new(dir.path());
    let record = export_state(&trained_bandit());

    store.save("team/a", &record).unwrap();
    assert_ne!(store.path_for("team/a"), store.path_for("team_a"));
    assert!(store.load("team_a").unwrap().is_none());

    let mut bandit = GraphBandit::default();
    assert!(!restore_from_store(&mut bandit, &store, "team_a").unwrap());
    assert!(!bandit.is_ready());
    assert_records_close(&store.load("team/a").unwrap().unwrap(), &record);
}

#[test]
fn test_store_usable_as_trait_object() {
    let mut store: Box<dyn SnapshotStore> = Box::new(MemorySnapshotStore::new());
    store.save("r", &export_state(&trained_bandit())).unwrap();
    let mut bandit = GraphBandit::default();
    assert!(restore_from_store(&mut bandit, store.as_ref(), "r").unwrap());
}
