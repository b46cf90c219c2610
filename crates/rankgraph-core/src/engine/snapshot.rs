//! Bandit state export, restore, and snapshot envelopes.
//!
//! A [`BanditRecord`] is the flat, index-aligned learning state of a bandit.
//! [`Snapshot`] wraps a record with version metadata for persistence in JSON
//! or binary (bincode) form.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::bandit::{BetaPosterior, GraphBandit, DEFAULT_B, DEFAULT_LAMBDA_FG};
use crate::engine::errors::RankError;

/// Exported bandit learning state.
///
/// `alpha[i]` and `beta[i]` belong to arm `i`. On deserialize, `lambda_fg`
/// and `b` fall back to their defaults when absent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BanditRecord {
    pub alpha: Vec<f64>,
    pub beta: Vec<f64>,
    pub num_arms: usize,
    #[cfg_attr(feature = "serde", serde(default = "default_lambda_fg"))]
    pub lambda_fg: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_b"))]
    pub b: f64,
}

#[cfg(feature = "serde")]
fn default_lambda_fg() -> f64 {
    DEFAULT_LAMBDA_FG
}

#[cfg(feature = "serde")]
fn default_b() -> f64 {
    DEFAULT_B
}

impl Default for BanditRecord {
    fn default() -> Self {
        Self {
            alpha: Vec::new(),
            beta: Vec::new(),
            num_arms: 0,
            lambda_fg: DEFAULT_LAMBDA_FG,
            b: DEFAULT_B,
        }
    }
}

impl BanditRecord {
    /// Checks that the record can be restored without truncating, padding,
    /// or breaking the positive-parameter invariant.
    pub fn validate(&self) -> Result<(), RankError> {
        if self.alpha.len() != self.num_arms || self.beta.len() != self.num_arms {
            return Err(RankError::CorruptSnapshot(format!(
                "num_arms is {} but alpha has {} entries and beta has {}",
                self.num_arms,
                self.alpha.len(),
                self.beta.len()
            )));
        }
        for (idx, (a, b)) in self.alpha.iter().zip(&self.beta).enumerate() {
            let arm = BetaPosterior { alpha: *a, beta: *b };
            if !arm.is_valid() {
                return Err(RankError::CorruptSnapshot(format!(
                    "arm {} has invalid parameters alpha={} beta={}",
                    idx, a, b
                )));
            }
        }
        if !self.lambda_fg.is_finite() || self.lambda_fg < 0.0 {
            return Err(RankError::CorruptSnapshot(format!(
                "lambda_fg {} is not a finite non-negative number",
                self.lambda_fg
            )));
        }
        if !self.b.is_finite() || self.b <= 0.0 {
            return Err(RankError::CorruptSnapshot(format!(
                "b {} is not a finite positive number",
                self.b
            )));
        }
        Ok(())
    }

    /// Per-arm posteriors, in arm order.
    pub fn arms(&self) -> impl Iterator<Item = BetaPosterior> + '_ {
        self.alpha
            .iter()
            .zip(&self.beta)
            .map(|(a, b)| BetaPosterior { alpha: *a, beta: *b })
    }
}

/// Copies a bandit's learning state into a record.
pub fn export_state(bandit: &GraphBandit) -> BanditRecord {
    let arms = bandit.arms();
    BanditRecord {
        alpha: arms.iter().map(|a| a.alpha).collect(),
        beta: arms.iter().map(|a| a.beta).collect(),
        num_arms: arms.len(),
        lambda_fg: bandit.lambda_fg(),
        b: bandit.b(),
    }
}

/// Replaces a bandit's learning state with a record.
///
/// The record is validated first; on error the bandit is untouched. A record
/// with zero arms leaves the bandit uninitialized.
///
/// # Errors
///
/// `RankError::CorruptSnapshot` if lengths disagree with `num_arms` or any
/// parameter is out of range.
pub fn restore_state(bandit: &mut GraphBandit, record: BanditRecord) -> Result<(), RankError> {
    record.validate()?;
    let arms: Vec<BetaPosterior> = record.arms().collect();

    #[cfg(feature = "tracing")]
    tracing::info!(arms = arms.len(), "restored bandit state");

    bandit.replace_state(arms, record.lambda_fg, record.b);
    Ok(())
}

/// Metadata included in snapshots for compatibility checking.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SnapshotMetadata {
    /// Crate version that wrote the snapshot
    pub version: String,
    /// Role the learning state belongs to
    #[cfg_attr(feature = "serde", serde(default))]
    pub role_id: Option<String>,
}

/// A bandit record with metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Snapshot {
    pub record: BanditRecord,
    pub metadata: SnapshotMetadata,
}

impl Snapshot {
    pub fn new(record: BanditRecord, role_id: Option<String>) -> Self {
        Self {
            record,
            metadata: SnapshotMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                role_id,
            },
        }
    }

    /// Snapshot of a bandit's current state.
    pub fn capture(bandit: &GraphBandit, role_id: Option<String>) -> Self {
        Self::new(export_state(bandit), role_id)
    }

    /// Checks that the snapshot was written by a compatible version.
    ///
    /// Major and minor components must match the running crate.
    pub fn validate_compatibility(&self) -> Result<(), RankError> {
        let current = env!("CARGO_PKG_VERSION");
        match (version_key(&self.metadata.version), version_key(current)) {
            (Some(found), Some(expected)) if found == expected => Ok(()),
            _ => Err(RankError::CorruptSnapshot(format!(
                "snapshot version mismatch: snapshot was created with version {}, current version is {}",
                self.metadata.version, current
            ))),
        }
    }
}

/// `(major, minor)` of a dotted version string.
fn version_key(version: &str) -> Option<(u64, u64)> {
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// Saves a snapshot to a pretty-printed JSON string.
#[cfg(feature = "serde")]
pub fn save_snapshot_json(snapshot: &Snapshot) -> Result<String, RankError> {
    serde_json::to_string_pretty(snapshot)
        .map_err(|e| RankError::Serialization(format!("failed to serialize snapshot: {}", e)))
}

/// Loads a snapshot from JSON and checks compatibility and record validity.
#[cfg(feature = "serde")]
pub fn load_snapshot_json(json: &str) -> Result<Snapshot, RankError> {
    let snapshot: Snapshot = serde_json::from_str(json)
        .map_err(|e| RankError::Serialization(format!("failed to deserialize snapshot: {}", e)))?;
    snapshot.validate_compatibility()?;
    snapshot.record.validate()?;
    Ok(snapshot)
}

/// Saves a snapshot to a binary format (bincode).
#[cfg(feature = "serde")]
pub fn save_snapshot_binary(snapshot: &Snapshot) -> Result<Vec<u8>, RankError> {
    bincode::serialize(snapshot)
        .map_err(|e| RankError::Serialization(format!("failed to serialize snapshot: {}", e)))
}

/// Loads a snapshot from binary format (bincode).
#[cfg(feature = "serde")]
pub fn load_snapshot_binary(data: &[u8]) -> Result<Snapshot, RankError> {
    let snapshot: Snapshot = bincode::deserialize(data)
        .map_err(|e| RankError::Serialization(format!("failed to deserialize snapshot: {}", e)))?;
    snapshot.validate_compatibility()?;
    snapshot.record.validate()?;
    Ok(snapshot)
}
