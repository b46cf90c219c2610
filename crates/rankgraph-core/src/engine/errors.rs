//! Error types for RankGraph ranking.

use thiserror::Error;

impl From<rankgraph_profile::ProfileError> for RankError {
    fn from(err: rankgraph_profile::ProfileError) -> Self {
        match err {
            rankgraph_profile::ProfileError::ParseError(msg) => RankError::Profile(msg),
            rankgraph_profile::ProfileError::ValidationError(msg) => RankError::InvalidArgument(msg),
            rankgraph_profile::ProfileError::ValidationDiagnostic(diag) => {
                RankError::InvalidArgument(diag.to_string())
            }
            _ => RankError::Internal(format!("unexpected profile error: {:?}", err)),
        }
    }
}

/// Errors surfaced by graph construction, scoring, the bandit, and snapshots.
///
/// All errors are returned synchronously to the immediate caller; nothing in
/// the core retries. Missing optional profile fields are not errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// without breaking changes.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RankError {
    /// Caller bug: empty candidate list, out-of-range arm, bad configuration.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation called in the wrong lifecycle state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Snapshot record that cannot be restored without truncating or padding.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// NaN/Inf or out-of-range values in posterior parameters or scores.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Malformed profile input at the boundary.
    #[error("profile error: {0}")]
    Profile(String),

    /// Failure in a storage adapter.
    #[error("storage error: {0}")]
    Storage(String),

    /// Snapshot encoding or decoding failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (programmer error, not user error).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for RankError {
    fn from(err: std::io::Error) -> Self {
        RankError::Storage(err.to_string())
    }
}
