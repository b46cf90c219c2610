//! Graph similarity metrics.
//!
//! Similarity between a candidate graph and a role graph is computed per
//! entity category and then combined:
//! - `entity_similarity`: overlap of the kNN index sets of two vector sets,
//!   `(|A ∩ B| / |A ∪ B|)^(1/p)`
//! - `graph_similarity`: weighted average over categories that have at least
//!   one entity on both sides, renormalized over the contributing weights
//!
//! Notes:
//! - Deterministic evaluation: entities are embedded in graph insertion order
//!   and kNN ties break by lower index.
//! - Scores are always in `[0, 1]`.

pub mod embedding;
pub mod knn;

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rankgraph_profile::{Category, Profile};

use crate::engine::builder::{build_candidate_graph, build_role_graph};
use crate::engine::errors::RankError;
use crate::engine::graph::EntityGraph;
use embedding::{Embedding, HashEmbedder, SharedEmbedder};

/// Default neighborhood size.
pub const DEFAULT_K: usize = 10;

/// Default root applied to the overlap ratio.
pub const DEFAULT_P: u32 = 4;

/// Parameters of the kNN overlap similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimilarityConfig {
    /// Neighborhood size; clamped to each side's item count, 0 acts as 1
    pub k: usize,
    /// Root of the overlap ratio; must be at least 1
    pub p: u32,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            p: DEFAULT_P,
        }
    }
}

impl SimilarityConfig {
    pub fn validate(&self) -> Result<(), RankError> {
        if self.p == 0 {
            return Err(RankError::InvalidArgument(
                "similarity root p must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Per-category weights for combining similarities.
///
/// Categories with zero weight still count as contributing when both sides
/// have entities, but add nothing to the score. If every contributing weight
/// is zero the score is 0.0.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EntityWeights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
}

impl Default for EntityWeights {
    fn default() -> Self {
        Self::uniform(1.0 / 3.0)
    }
}

impl EntityWeights {
    pub fn uniform(weight: f64) -> Self {
        Self {
            skills: weight,
            experience: weight,
            education: weight,
        }
    }

    /// Weights from `(category, weight)` pairs; unnamed categories get 0.0.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Category, f64)>,
    {
        let mut out = Self::uniform(0.0);
        for (category, weight) in pairs {
            out.set(category, weight);
        }
        out
    }

    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Skills => self.skills,
            Category::Experience => self.experience,
            Category::Education => self.education,
        }
    }

    pub fn set(&mut self, category: Category, weight: f64) {
        match category {
            Category::Skills => self.skills = weight,
            Category::Experience => self.experience = weight,
            Category::Education => self.education = weight,
        }
    }

    /// Rejects negative or non-finite weights.
    pub fn validate(&self) -> Result<(), RankError> {
        for category in Category::ALL {
            let w = self.get(category);
            if !w.is_finite() || w < 0.0 {
                return Err(RankError::InvalidArgument(format!(
                    "weight for '{}' must be a finite non-negative number, got {}",
                    category, w
                )));
            }
        }
        Ok(())
    }
}

/// Similarity of one category.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoryScore {
    pub category: Category,
    pub weight: f64,
    pub candidate_entities: usize,
    pub role_entities: usize,
    /// `None` when either side has no entities of this category
    pub similarity: Option<f64>,
}

impl CategoryScore {
    pub fn contributes(&self) -> bool {
        self.similarity.is_some()
    }
}

/// Combined score with its per-category parts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimilarityBreakdown {
    pub score: f64,
    pub categories: Vec<CategoryScore>,
}

impl SimilarityBreakdown {
    /// Categories that entered the weighted average.
    pub fn contributing(&self) -> impl Iterator<Item = &CategoryScore> {
        self.categories.iter().filter(|c| c.contributes())
    }

    pub fn category(&self, category: Category) -> Option<&CategoryScore> {
        self.categories.iter().find(|c| c.category == category)
    }
}

/// Scores candidate graphs against role graphs with an injected embedder.
#[derive(Clone)]
pub struct SimilarityScorer {
    embedder: SharedEmbedder,
    config: SimilarityConfig,
    weights: EntityWeights,
}

impl fmt::Debug for SimilarityScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimilarityScorer")
            .field("embedder", &self.embedder.model_name())
            .field("config", &self.config)
            .field("weights", &self.weights)
            .finish()
    }
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(HashEmbedder::shared())
    }
}

impl SimilarityScorer {
    /// Scorer with default `k`, `p`, and uniform weights.
    pub fn new(embedder: SharedEmbedder) -> Self {
        Self {
            embedder,
            config: SimilarityConfig::default(),
            weights: EntityWeights::default(),
        }
    }

    pub fn with_config(mut self, config: SimilarityConfig) -> Result<Self, RankError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_weights(mut self, weights: EntityWeights) -> Result<Self, RankError> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    pub fn weights(&self) -> &EntityWeights {
        &self.weights
    }

    pub fn embedder(&self) -> &SharedEmbedder {
        &self.embedder
    }

    /// Embeddings of every entity node of `category`, in insertion order.
    pub fn category_vectors(
        &self,
        graph: &EntityGraph,
        category: Category,
    ) -> Result<Vec<Embedding>, RankError> {
        let names = graph.entity_names(category);
        if names.is_empty() {
            return Ok(Vec::new());
        }
        self.embedder.embed_batch(&names)
    }

    /// kNN overlap similarity using this scorer's `k` and `p`.
    pub fn entity_similarity(
        &self,
        candidate_vectors: &[Embedding],
        role_vectors: &[Embedding],
    ) -> Result<f64, RankError> {
        try_entity_similarity(
            candidate_vectors,
            role_vectors,
            self.config.k,
            self.config.p,
        )
    }

    /// Weighted similarity with this scorer's weights.
    pub fn graph_similarity(
        &self,
        role_graph: &EntityGraph,
        candidate_graph: &EntityGraph,
    ) -> Result<f64, RankError> {
        Ok(self
            .graph_similarity_breakdown(role_graph, candidate_graph, &self.weights)?
            .score)
    }

    /// Weighted similarity with explicit weights.
    pub fn graph_similarity_with_weights(
        &self,
        role_graph: &EntityGraph,
        candidate_graph: &EntityGraph,
        weights: &EntityWeights,
    ) -> Result<f64, RankError> {
        Ok(self
            .graph_similarity_breakdown(role_graph, candidate_graph, weights)?
            .score)
    }

    /// Per-category similarities and the renormalized weighted average.
    pub fn graph_similarity_breakdown(
        &self,
        role_graph: &EntityGraph,
        candidate_graph: &EntityGraph,
        weights: &EntityWeights,
    ) -> Result<SimilarityBreakdown, RankError> {
        weights.validate()?;

        let mut categories = Vec::with_capacity(Category::ALL.len());
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for category in Category::ALL {
            let candidate_vectors = self.category_vectors(candidate_graph, category)?;
            let role_vectors = self.category_vectors(role_graph, category)?;
            let weight = weights.get(category);

            let similarity = if candidate_vectors.is_empty() || role_vectors.is_empty() {
                None
            } else {
                let s = self.entity_similarity(&candidate_vectors, &role_vectors)?;
                weighted += weight * s;
                total_weight += weight;
                Some(s)
            };

            categories.push(CategoryScore {
                category,
                weight,
                candidate_entities: candidate_vectors.len(),
                role_entities: role_vectors.len(),
                similarity,
            });
        }

        let score = if total_weight > 0.0 {
            (weighted / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            score,
            contributing = categories.iter().filter(|c| c.contributes()).count(),
            "graph similarity"
        );

        Ok(SimilarityBreakdown { score, categories })
    }

    /// Scores a candidate against a role through their one-sided graphs.
    pub fn score_profile(&self, candidate: &Profile, role: &Profile) -> Result<f64, RankError> {
        Ok(self.breakdown_profile(candidate, role)?.score)
    }

    pub fn breakdown_profile(
        &self,
        candidate: &Profile,
        role: &Profile,
    ) -> Result<SimilarityBreakdown, RankError> {
        let candidate_graph = build_candidate_graph(candidate);
        let role_graph = build_role_graph(role);
        self.graph_similarity_breakdown(&role_graph, &candidate_graph, &self.weights)
    }
}

/// kNN overlap similarity between two vector sets.
///
/// Either side empty gives 0.0.
///
/// # Errors
///
/// - `InvalidArgument` if `p == 0` or vector dimensions differ
/// - `Numerical` if a vector holds NaN or infinity
pub fn try_entity_similarity(
    candidate_vectors: &[Embedding],
    role_vectors: &[Embedding],
    k: usize,
    p: u32,
) -> Result<f64, RankError> {
    if p == 0 {
        return Err(RankError::InvalidArgument(
            "similarity root p must be at least 1".into(),
        ));
    }
    let candidate_dim = knn::check_vectors(candidate_vectors)?;
    let role_dim = knn::check_vectors(role_vectors)?;
    let (Some(cd), Some(rd)) = (candidate_dim, role_dim) else {
        return Ok(0.0);
    };
    if cd != rd {
        return Err(RankError::InvalidArgument(format!(
            "candidate vectors have dimension {}, role vectors {}",
            cd, rd
        )));
    }

    let a = knn::neighborhood_union(candidate_vectors, k)?;
    let b = knn::neighborhood_union(role_vectors, k)?;
    let union = a.union(&b).count();
    if union == 0 {
        return Ok(0.0);
    }
    let intersection = a.intersection(&b).count();
    let ratio = intersection as f64 / union as f64;
    Ok(ratio.powf(1.0 / f64::from(p)).clamp(0.0, 1.0))
}

/// Infallible [`try_entity_similarity`]; errors are logged and score 0.0.
pub fn entity_similarity(
    candidate_vectors: &[Embedding],
    role_vectors: &[Embedding],
    k: usize,
    p: u32,
) -> f64 {
    match try_entity_similarity(candidate_vectors, role_vectors, k, p) {
        Ok(s) => s,
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "entity similarity failed, scoring 0.0");
            0.0
        }
    }
}

/// Graph similarity with the hash embedder and default `k`/`p`.
///
/// `weights` defaults to 1/3 per category. Invalid weights score 0.0.
pub fn graph_similarity(
    role_graph: &EntityGraph,
    candidate_graph: &EntityGraph,
    weights: Option<&EntityWeights>,
) -> f64 {
    let scorer = SimilarityScorer::default();
    let weights = weights.copied().unwrap_or_default();
    match scorer.graph_similarity_with_weights(role_graph, candidate_graph, &weights) {
        Ok(s) => s,
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_err, "graph similarity failed, scoring 0.0");
            0.0
        }
    }
}
