//! Feature vectors for entity names.
//!
//! Similarity scoring only needs a deterministic, fixed-dimension vector per
//! string. Production wiring supplies a real embedding model behind
//! [`Embedder`]; [`HashEmbedder`] is a deterministic stand-in whose vectors
//! carry no semantic meaning and exist so scoring can run without a model.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::engine::errors::RankError;

/// Embedding vector type.
pub type Embedding = Vec<f32>;

/// Default dimension of [`HashEmbedder`] vectors.
pub const DEFAULT_HASH_DIMENSION: usize = 32;

/// Text embedding provider.
pub trait Embedder: Send + Sync {
    /// Embedding for a single string.
    fn embed(&self, text: &str) -> Result<Embedding, RankError>;

    /// Embeddings for several strings, in input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, RankError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Model identifier, recorded alongside scores.
    fn model_name(&self) -> &str;

    /// Fixed vector dimension.
    fn dimension(&self) -> usize;
}

/// Shared embedder handle passed to scorers.
pub type SharedEmbedder = Arc<dyn Embedder>;

/// Deterministic hash-seeded vectors in `[0, 1)^dimension`.
///
/// The same string always maps to the same vector across runs on a given
/// target. Different strings map to unrelated vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_HASH_DIMENSION,
        }
    }
}

impl HashEmbedder {
    /// Creates a hash embedder with the given dimension.
    ///
    /// # Errors
    ///
    /// `RankError::InvalidArgument` if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self, RankError> {
        if dimension == 0 {
            return Err(RankError::InvalidArgument(
                "embedding dimension must be at least 1".into(),
            ));
        }
        Ok(Self { dimension })
    }

    /// Shared handle for injection into a scorer.
    pub fn shared() -> SharedEmbedder {
        Arc::new(Self::default())
    }

    fn seed(text: &str) -> u64 {
        let mut hasher = FxHasher::default();
        text.hash(&mut hasher);
        hasher.finish()
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding, RankError> {
        let mut state = Self::seed(text);
        let mut out = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            let bits = splitmix64(&mut state);
            // 24 high bits give an exactly representable f32 in [0, 1)
            out.push((bits >> 40) as f32 / (1u64 << 24) as f32);
        }
        Ok(out)
    }

    fn model_name(&self) -> &str {
        "hash-stand-in"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
