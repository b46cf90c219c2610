//! # Profile Validation
//!
//! Cross-profile checks run before profiles enter ranking:
//!
//! - **Candidate ids**: ids that are present must be unique across the list,
//!   otherwise graphs built for different candidates would share subject
//!   nodes once merged into one store
//! - **Role**: a role with no skills, experience, or education scores 0.0
//!   against every candidate; this is reported as a warning, not an error
//!
//! Missing fields are never errors here; they were normalized by the parser.

use std::collections::HashMap;

use crate::errors::{ProfileError, ValidationContext};
use crate::profile::Profile;

/// Checks that candidate ids are unique.
///
/// Candidates without an id are skipped; the graph builder assigns them the
/// default subject id.
///
/// # Returns
///
/// * `Ok(())` - All present ids are distinct
/// * `Err(ProfileError::ValidationDiagnostic)` - A duplicate id, with the
///   index of its second occurrence
pub fn validate_profiles(candidates: &[Profile]) -> Result<(), ProfileError> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (idx, candidate) in candidates.iter().enumerate() {
        let Some(id) = candidate.id() else {
            continue;
        };
        if let Some(first) = seen.insert(id, idx) {
            return Err(ProfileError::validation(
                format!("duplicate candidate id '{}' (first seen at #{})", id, first),
                Some(ValidationContext::Candidate { index: idx }),
            ));
        }
    }
    Ok(())
}

/// Returns human-readable warnings about a role profile.
pub fn role_warnings(role: &Profile) -> Vec<String> {
    let mut warnings = Vec::new();
    if role.has_no_entities() {
        warnings.push(format!(
            "role '{}' has no skills, experience, or education; every candidate will score 0.0",
            role.id().unwrap_or("role")
        ));
    }
    if role.id().is_none() {
        warnings.push("role has no id; snapshots cannot be keyed by it".to_string());
    }
    warnings
}
