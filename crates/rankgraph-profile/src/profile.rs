//! # Profiles
//!
//! Typed records for candidates and roles.
//!
//! A profile carries an optional identifier, the three entity categories
//! consumed by ranking (`skills`, `experience`, `education`), and every other
//! field of the original record in `attrs`, so the full record can be
//! reassembled with [`Profile::to_value`].
//!
//! Category values are normalized when the profile is built from JSON (see
//! [`crate::parser`]); a `Profile` never holds empty category strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ProfileError;

/// Entity category extracted from a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Skills,
    Experience,
    Education,
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Category; 3] = [Category::Skills, Category::Experience, Category::Education];

    /// Field name used in profile records.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Skills => "skills",
            Category::Experience => "experience",
            Category::Education => "education",
        }
    }

    /// Parses a field name back into a category.
    pub fn from_name(name: &str) -> Option<Category> {
        match name {
            "skills" => Some(Category::Skills),
            "experience" => Some(Category::Experience),
            "education" => Some(Category::Education),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate or role record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Profile {
    /// Unique identifier, if the record had one
    pub id: Option<String>,
    pub skills: Vec<String>,
    pub experience: Vec<String>,
    pub education: Vec<String>,
    /// Remaining fields of the original record
    pub attrs: Map<String, Value>,
}

impl Profile {
    /// Creates an empty profile with the given id.
    ///
    /// The id is trimmed; an empty or blank id means no id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        Self {
            id: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            ..Default::default()
        }
    }

    /// Minimal `{"id": id}` record used to build one-sided graphs.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self::new(id)
    }

    pub fn with_skills<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = collect_values(values);
        self
    }

    pub fn with_experience<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.experience = collect_values(values);
        self
    }

    pub fn with_education<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.education = collect_values(values);
        self
    }

    /// Adds an extra attribute carried through to the graph.
    pub fn with_attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    /// Values recorded for a category.
    pub fn category(&self, category: Category) -> &[String] {
        match category {
            Category::Skills => &self.skills,
            Category::Experience => &self.experience,
            Category::Education => &self.education,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// True when no category has any value.
    pub fn has_no_entities(&self) -> bool {
        Category::ALL.iter().all(|c| self.category(*c).is_empty())
    }

    /// Reassembles the full record, including extra attributes.
    pub fn to_value(&self) -> Value {
        let mut map = self.attrs.clone();
        if let Some(id) = &self.id {
            map.insert("id".into(), Value::String(id.clone()));
        }
        for category in Category::ALL {
            let values = self.category(category);
            if !values.is_empty() {
                map.insert(
                    category.as_str().into(),
                    Value::Array(values.iter().cloned().map(Value::String).collect()),
                );
            }
        }
        Value::Object(map)
    }
}

fn collect_values<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .map(Into::into)
        .map(|s: String| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl TryFrom<Value> for Profile {
    type Error = ProfileError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        crate::parser::profile_from_value(value)
    }
}

impl From<Profile> for Value {
    fn from(profile: Profile) -> Self {
        profile.to_value()
    }
}
