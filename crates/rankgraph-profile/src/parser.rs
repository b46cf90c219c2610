//! # Profile Parser
//!
//! Turns loosely-typed JSON records into [`Profile`]s.
//!
//! ## Normalization
//!
//! - absent category fields are empty
//! - a scalar in place of a list becomes a one-element list
//! - falsy scalars (`null`, `false`, `0`, `""`, `[]`, `{}`) produce no value
//! - strings are trimmed; empty strings inside lists are dropped
//! - numbers and booleans become their display string; nested objects and
//!   arrays become their compact JSON text
//!
//! Parsing only fails when the input is not JSON or a profile is not an
//! object.

use serde_json::Value;

use crate::errors::ProfileError;
use crate::profile::{Category, Profile};

/// Parses a single profile from JSON text.
///
/// # Example
///
/// ```rust
/// use rankgraph_profile::parse_profile;
///
/// let p = parse_profile(r#"{"id": "r1", "skills": "Python"}"#).unwrap();
/// assert_eq!(p.skills, vec!["Python"]);
/// ```
pub fn parse_profile(source: &str) -> Result<Profile, ProfileError> {
    let value: Value = serde_json::from_str(source)?;
    profile_from_value(value)
}

/// Parses a list of profiles from JSON text.
///
/// Accepts a JSON array of objects, a single object, or an object with a
/// `candidates` array.
pub fn parse_profiles(source: &str) -> Result<Vec<Profile>, ProfileError> {
    let value: Value = serde_json::from_str(source)?;
    profiles_from_value(value)
}

/// Converts a JSON value holding one or more profiles.
pub fn profiles_from_value(value: Value) -> Result<Vec<Profile>, ProfileError> {
    match value {
        Value::Array(items) => items.into_iter().map(profile_from_value).collect(),
        Value::Object(mut map) => match map.remove("candidates") {
            Some(Value::Array(items)) => items.into_iter().map(profile_from_value).collect(),
            Some(other) => Err(ProfileError::ParseError(format!(
                "'candidates' must be an array, found {}",
                kind_of(&other)
            ))),
            None => Ok(vec![profile_from_value(Value::Object(map))?]),
        },
        other => Err(ProfileError::ParseError(format!(
            "expected a profile object or an array of profiles, found {}",
            kind_of(&other)
        ))),
    }
}

/// Converts one JSON object into a normalized [`Profile`].
pub fn profile_from_value(value: Value) -> Result<Profile, ProfileError> {
    let mut map = match value {
        Value::Object(map) => map,
        other => {
            return Err(ProfileError::ParseError(format!(
                "profile must be a JSON object, found {}",
                kind_of(&other)
            )))
        }
    };

    let id = map.remove("id").and_then(|v| normalize_scalar(&v));
    let mut profile = Profile {
        id,
        ..Default::default()
    };
    for category in Category::ALL {
        let values = map
            .remove(category.as_str())
            .map(|v| normalize_category(&v))
            .unwrap_or_default();
        match category {
            Category::Skills => profile.skills = values,
            Category::Experience => profile.experience = values,
            Category::Education => profile.education = values,
        }
    }
    profile.attrs = map;
    Ok(profile)
}

/// Normalizes a category field into a list of non-empty strings.
pub fn normalize_category(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(normalize_item).collect(),
        scalar => normalize_scalar(scalar).into_iter().collect(),
    }
}

fn normalize_item(item: &Value) -> Option<String> {
    match item {
        Value::Null => None,
        Value::String(s) => non_empty(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(item.to_string()),
    }
}

fn normalize_scalar(value: &Value) -> Option<String> {
    if is_falsy(value) {
        return None;
    }
    normalize_item(value)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
