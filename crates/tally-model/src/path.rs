//! Field paths: ordered key sequences locating a value inside a record.

use std::fmt;

use crate::ModelError;

/// A non-empty sequence of keys into a nested mapping.
///
/// Segments are kept as strings; a segment that reaches an array is read as
/// an index by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(ModelError::EmptyPath);
        }
        if segments.iter().any(String::is_empty) {
            return Err(ModelError::EmptyPathSegment {
                path: segments.join("."),
            });
        }
        Ok(Self(segments))
    }

    /// Parse a dotted path such as `heights.1500`.
    pub fn parse(dotted: &str) -> Result<Self, ModelError> {
        if dotted.is_empty() {
            return Err(ModelError::EmptyPath);
        }
        Self::new(dotted.split('.'))
    }

    /// Single-segment path.
    pub fn key(key: impl Into<String>) -> Result<Self, ModelError> {
        Self::new([key.into()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn leaf(&self) -> &str {
        // Non-empty by construction.
        &self.0[self.0.len() - 1]
    }

    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// True when writing through one path could touch the other's storage.
    pub fn overlaps(&self, other: &FieldPath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

impl TryFrom<Vec<String>> for FieldPath {
    type Error = ModelError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FieldPath> for Vec<String> {
    fn from(path: FieldPath) -> Self {
        path.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}
