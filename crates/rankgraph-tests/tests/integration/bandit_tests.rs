//! Integration tests for the bandit lifecycle and error contract.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rankgraph_core::{BanditConfig, GraphBandit, RankError};
use rankgraph_profile::{parse_profiles, Profile};
use rankgraph_tests::{ml_candidates, ml_role, seeded_bandit};

#[test]
fn test_initialize_with_no_candidates_is_invalid_argument() {
    let mut bandit = seeded_bandit(1);
    let err = bandit.initialize_from_graph(&[], &ml_role()).unwrap_err();
    assert!(matches!(err, RankError::InvalidArgument(_)));
    assert!(!bandit.is_ready());
}

#[test]
fn test_select_before_initialize_is_invalid_state() {
    let mut bandit = seeded_bandit(1);
    match bandit.select_candidate() {
        Err(RankError::InvalidState(msg)) => assert!(msg.contains("initialize_from_graph")),
        other => panic!("expected InvalidState, got {:?}", other),
    }
}

#[test]
fn test_update_out_of_range_cites_index() {
    let mut bandit = seeded_bandit(1);
    bandit
        .initialize_from_graph(&ml_candidates(), &ml_role())
        .unwrap();
    assert_eq!(bandit.num_arms(), 2);

    let err = bandit.update(999, 1.0).unwrap_err();
    assert!(matches!(&err, RankError::InvalidArgument(msg) if msg.contains("999")));
    assert!(err.to_string().starts_with("invalid argument"));
}

#[test]
fn test_update_for_never_selected_arm_is_legal() {
    let mut bandit = seeded_bandit(1);
    bandit
        .initialize_from_graph(&ml_candidates(), &ml_role())
        .unwrap();
    let before = bandit.alpha(1).unwrap();
    bandit.update(1, 1.0).unwrap();
    assert_eq!(bandit.alpha(1).unwrap(), before + 1.0);
}

#[test]
fn test_candidates_from_json_warm_start() {
    let candidates = parse_profiles(
        r#"{"candidates": [
            {"id": 1, "skills": ["Python", "CUDA"]},
            {"id": 2, "skills": "Python"},
            {"id": 3}
        ]}"#,
    )
    .unwrap();
    let mut bandit = seeded_bandit(5);
    bandit.initialize_from_graph(&candidates, &ml_role()).unwrap();

    assert_eq!(bandit.num_arms(), 3);
    // a candidate with no entities scores 0.0 and gets the weakest prior
    assert_eq!(bandit.similarities()[2], 0.0);
    assert_eq!(bandit.alpha(2), Some(1.0));
    assert_eq!(bandit.beta(2), Some(11.0));
    assert_eq!(bandit.ranking(), vec![0, 1, 2]);
}

#[test]
fn test_duplicate_candidate_ids_rejected() {
    let candidates = vec![Profile::new("dup"), Profile::new("x"), Profile::new("dup")];
    let err = seeded_bandit(1)
        .initialize_from_graph(&candidates, &ml_role())
        .unwrap_err();
    match err {
        RankError::InvalidArgument(msg) => {
            assert!(msg.contains("candidate #2"));
            assert!(msg.contains("'dup'"));
        }
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
}

#[test]
fn test_external_rng_selection_is_reproducible() {
    let mut bandit = seeded_bandit(9);
    bandit
        .initialize_from_graph(&ml_candidates(), &ml_role())
        .unwrap();

    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..50)
            .map(|_| bandit.select_candidate_with(&mut rng).unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(3), run(3));
}

#[test]
fn test_prior_scale_zero_is_uniform() {
    let config = BanditConfig {
        prior_scale: 0.0,
        ..Default::default()
    };
    let mut bandit = GraphBandit::with_seed(config, Default::default(), 2).unwrap();
    bandit
        .initialize_from_graph(&ml_candidates(), &ml_role())
        .unwrap();
    for i in 0..2 {
        assert_eq!(bandit.alpha(i), Some(1.0));
        assert_eq!(bandit.beta(i), Some(1.0));
    }
}

#[test]
fn test_bandit_can_move_between_threads() {
    let mut bandit = seeded_bandit(4);
    bandit
        .initialize_from_graph(&ml_candidates(), &ml_role())
        .unwrap();
    let handle = std::thread::spawn(move || {
        let arm = bandit.select_candidate().unwrap();
        bandit.update(arm, 1.0).unwrap();
        bandit.num_arms()
    });
    assert_eq!(handle.join().unwrap(), 2);
}
