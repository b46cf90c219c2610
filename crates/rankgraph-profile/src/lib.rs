//! # RankGraph Profiles
//!
//! Typed candidate and role records, JSON normalization, and validation.
//! External data enters ranking here and nowhere else.

pub mod errors;
pub mod parser;
pub mod profile;
pub mod validate;

// Re-export commonly used types
pub use errors::{ProfileError, ValidationContext};
pub use parser::{parse_profile, parse_profiles, profile_from_value, profiles_from_value};
pub use profile::{Category, Profile};
pub use validate::{role_warnings, validate_profiles};
