//! k-nearest-neighbor index sets over embedding vectors.
//!
//! Each item's neighborhood is itself plus its `k - 1` nearest other items
//! by Euclidean distance. Equal distances are broken by lower index, so the
//! sets are deterministic. The union of all neighborhoods on one side stands
//! in for that side's local topology in the overlap similarity.
//!
//! ## Feature gating
//!
//! With the `parallel` feature, per-item neighborhoods are computed with
//! rayon. Results are identical to the sequential path.

use std::collections::BTreeSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::engine::errors::RankError;
use crate::metrics::embedding::Embedding;

/// Clamps a requested neighborhood size to `1..=count`.
pub fn effective_k(k: usize, count: usize) -> usize {
    k.max(1).min(count)
}

/// Checks that all vectors share one dimension and hold finite values.
///
/// Returns the shared dimension, or `None` for an empty slice.
pub fn check_vectors(vectors: &[Embedding]) -> Result<Option<usize>, RankError> {
    let Some(first) = vectors.first() else {
        return Ok(None);
    };
    let dim = first.len();
    for (idx, v) in vectors.iter().enumerate() {
        if v.len() != dim {
            return Err(RankError::InvalidArgument(format!(
                "vector #{} has dimension {}, expected {}",
                idx,
                v.len(),
                dim
            )));
        }
        if v.iter().any(|x| !x.is_finite()) {
            return Err(RankError::Numerical(format!(
                "vector #{} contains a non-finite component",
                idx
            )));
        }
    }
    Ok(Some(dim))
}

/// Squared Euclidean distance (monotone in the true distance).
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum()
}

/// Sorted neighbor indices of item `idx`, self included.
fn neighborhood(vectors: &[Embedding], idx: usize, k: usize) -> Vec<usize> {
    let mut others: Vec<(f64, usize)> = vectors
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != idx)
        .map(|(j, v)| (squared_euclidean(&vectors[idx], v), j))
        .collect();
    others.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut out: Vec<usize> = std::iter::once(idx)
        .chain(others.into_iter().take(k.saturating_sub(1)).map(|(_, j)| j))
        .collect();
    out.sort_unstable();
    out
}

/// Per-item kNN index sets, in item order.
///
/// # Errors
///
/// Dimension mismatch or non-finite components (see [`check_vectors`]).
pub fn knn_indices(vectors: &[Embedding], k: usize) -> Result<Vec<Vec<usize>>, RankError> {
    if check_vectors(vectors)?.is_none() {
        return Ok(Vec::new());
    }
    let k = effective_k(k, vectors.len());

    #[cfg(feature = "parallel")]
    let sets = (0..vectors.len())
        .into_par_iter()
        .map(|idx| neighborhood(vectors, idx, k))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let sets = (0..vectors.len())
        .map(|idx| neighborhood(vectors, idx, k))
        .collect();

    Ok(sets)
}

/// Union of every item's kNN index set.
pub fn neighborhood_union(vectors: &[Embedding], k: usize) -> Result<BTreeSet<usize>, RankError> {
    Ok(knn_indices(vectors, k)?.into_iter().flatten().collect())
}
