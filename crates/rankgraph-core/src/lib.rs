//! # RankGraph Core
//!
//! Candidate ranking from entity-graph similarity and a warm-started
//! Thompson Sampling bandit.
//!
//! ```rust
//! use rankgraph_core::{BanditConfig, GraphBandit, SimilarityScorer};
//! use rankgraph_profile::Profile;
//!
//! let role = Profile::new("r1").with_skills(["Python", "PyTorch"]);
//! let candidates = vec![
//!     Profile::new("c0").with_skills(["Python", "PyTorch"]),
//!     Profile::new("c1").with_skills(["JavaScript"]),
//! ];
//!
//! let mut bandit =
//!     GraphBandit::with_seed(BanditConfig::default(), SimilarityScorer::default(), 42)?;
//! bandit.initialize_from_graph(&candidates, &role)?;
//! let arm = bandit.select_candidate()?;
//! bandit.update(arm, 1.0)?;
//! # Ok::<(), rankgraph_core::RankError>(())
//! ```

pub mod engine;
pub mod metrics;
pub mod storage;

// Re-export commonly used types
pub use engine::bandit::{argmax_lowest, BanditConfig, BetaPosterior, GraphBandit};
pub use engine::builder::{build_candidate_graph, build_entity_graph, build_role_graph};
pub use engine::errors::RankError;
pub use engine::graph::{EntityGraph, NodeId, SubjectType};
pub use engine::snapshot::{export_state, restore_state, BanditRecord, Snapshot};
pub use metrics::embedding::{Embedder, HashEmbedder, SharedEmbedder};
pub use metrics::{
    entity_similarity, graph_similarity, try_entity_similarity, EntityWeights, SimilarityConfig,
    SimilarityScorer,
};
pub use storage::{restore_from_store, MemorySnapshotStore, SnapshotStore};

#[cfg(feature = "serde")]
pub use engine::snapshot::{
    load_snapshot_binary, load_snapshot_json, save_snapshot_binary, save_snapshot_json,
};
#[cfg(feature = "serde")]
pub use storage::FileSnapshotStore;

/// Parses a role and a candidate list from JSON and checks candidate ids.
pub fn parse_inputs(
    role_json: &str,
    candidates_json: &str,
) -> Result<(rankgraph_profile::Profile, Vec<rankgraph_profile::Profile>), RankError> {
    let role = rankgraph_profile::parse_profile(role_json)?;
    let candidates = rankgraph_profile::parse_profiles(candidates_json)?;
    rankgraph_profile::validate_profiles(&candidates)?;
    Ok((role, candidates))
}
