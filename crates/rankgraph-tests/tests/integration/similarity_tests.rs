//! Integration tests for graph similarity scoring.

use std::sync::Arc;

use rankgraph_core::metrics::embedding::Embedding;
use rankgraph_core::{
    build_candidate_graph, build_entity_graph, build_role_graph, graph_similarity, Embedder,
    EntityWeights, RankError, SimilarityConfig, SimilarityScorer,
};
use rankgraph_profile::{Category, Profile};
use rankgraph_tests::{assert_close, ml_candidates, ml_role};

/// Embeds every string as its length, so vectors are easy to reason about.
struct LengthEmbedder;

impl Embedder for LengthEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding, RankError> {
        Ok(vec![text.len() as f32])
    }

    fn model_name(&self) -> &str {
        "length"
    }

    fn dimension(&self) -> usize {
        1
    }
}

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _text: &str) -> Result<Embedding, RankError> {
        Err(RankError::Internal("embedding backend unavailable".into()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }

    fn dimension(&self) -> usize {
        0
    }
}

#[test]
fn test_concrete_scenario_similarities() {
    let role_graph = build_role_graph(&ml_role());
    let scores: Vec<f64> = ml_candidates()
        .iter()
        .map(|c| graph_similarity(&role_graph, &build_candidate_graph(c), None))
        .collect();

    // Only skills contribute: overlap 2/3 and 1/2, each rooted by p = 4
    assert_close(scores[0], (2.0f64 / 3.0).powf(0.25), 1e-9, "candidate 0");
    assert_close(scores[1], 0.5f64.powf(0.25), 1e-9, "candidate 1");
    assert!(scores[0] > scores[1]);
}

#[test]
fn test_injected_embedder_is_used() {
    let scorer = SimilarityScorer::new(Arc::new(LengthEmbedder));
    assert_eq!(scorer.embedder().model_name(), "length");

    let s = scorer.score_profile(&ml_candidates()[0], &ml_role()).unwrap();
    assert_close(s, (2.0f64 / 3.0).powf(0.25), 1e-9, "length embedder");
}

#[test]
fn test_embedder_errors_propagate_from_scorer() {
    let scorer = SimilarityScorer::new(Arc::new(FailingEmbedder));
    let err = scorer
        .score_profile(&ml_candidates()[0], &ml_role())
        .unwrap_err();
    assert!(matches!(err, RankError::Internal(msg) if msg.contains("unavailable")));
}

#[test]
fn test_small_k_and_p_one() {
    let scorer = SimilarityScorer::default()
        .with_config(SimilarityConfig { k: 1, p: 1 })
        .unwrap();
    let s = scorer.score_profile(&ml_candidates()[0], &ml_role()).unwrap();
    assert_close(s, 2.0 / 3.0, 1e-9, "k=1 p=1");
}

#[test]
fn test_breakdown_reports_each_category() {
    let candidate = Profile::new("c")
        .with_skills(["Python"])
        .with_experience(["Data Scientist", "Analyst"]);
    let role = Profile::new("r")
        .with_skills(["Python", "SQL"])
        .with_experience(["Analyst"])
        .with_education(["BSc"]);

    let b = SimilarityScorer::default()
        .breakdown_profile(&candidate, &role)
        .unwrap();

    let skills = b.category(Category::Skills).unwrap();
    let experience = b.category(Category::Experience).unwrap();
    let education = b.category(Category::Education).unwrap();
    assert_close(skills.similarity.unwrap(), 0.5f64.powf(0.25), 1e-9, "skills");
    assert_close(experience.similarity.unwrap(), 0.5f64.powf(0.25), 1e-9, "experience");
    assert_eq!(education.similarity, None);
    assert_eq!(b.contributing().count(), 2);
    assert_close(b.score, 0.5f64.powf(0.25), 1e-9, "combined");
}

#[test]
fn test_skill_only_weights_ignore_other_categories() {
    let candidate = Profile::new("c")
        .with_skills(["Python", "CUDA"])
        .with_experience(["A", "B", "C", "D"]);
    let role = Profile::new("r")
        .with_skills(["Python", "CUDA"])
        .with_experience(["A"]);

    let weights = EntityWeights::from_pairs([(Category::Skills, 1.0)]);
    let s = graph_similarity(
        &build_role_graph(&role),
        &build_candidate_graph(&candidate),
        Some(&weights),
    );
    assert_close(s, 1.0, 1e-12, "skills only");
}

#[test]
fn test_argument_order_does_not_matter_for_overlap() {
    let a = build_entity_graph(&ml_candidates()[0], &Profile::placeholder("dummy"));
    let b = build_entity_graph(&Profile::placeholder("dummy"), &ml_role());
    assert_eq!(graph_similarity(&a, &b, None), graph_similarity(&b, &a, None));
}

#[test]
fn test_empty_role_scores_zero_for_everyone() {
    let role_graph = build_role_graph(&Profile::new("empty"));
    for c in ml_candidates() {
        assert_eq!(graph_similarity(&role_graph, &build_candidate_graph(&c), None), 0.0);
    }
}
