#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Identifier of a competitor (athlete or team) inside an event's `results`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct CompetitorId(String);

impl CompetitorId {
    /// Keeps `value` exactly; ids that differ only in whitespace are distinct.
    /// Blank ids are rejected.
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ModelError::EmptyCompetitorId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CompetitorId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CompetitorId> for String {
    fn from(id: CompetitorId) -> Self {
        id.0
    }
}

impl fmt::Display for CompetitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key naming a column; also the key of the cell in a materialized row.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnKey(String);

impl ColumnKey {
    /// Reserved key of the delete-button column.
    pub const TOMBSTONE: &'static str = "!delete";

    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyColumnKey);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn tombstone() -> Self {
        Self(Self::TOMBSTONE.to_string())
    }

    pub fn is_tombstone(&self) -> bool {
        self.0 == Self::TOMBSTONE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ColumnKey {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColumnKey> for String {
    fn from(key: ColumnKey) -> Self {
        key.0
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a row within one table.
///
/// Ids are never reused within a table, so a tombstoned row keeps its id and
/// siblings are never renumbered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct RowId(u64);

impl RowId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out [`RowId`]s for a single table.
///
/// Every table owns its allocator; nothing is shared between editors.
#[derive(Debug, Clone, Default)]
pub struct RowIdAllocator {
    last: u64,
}

impl RowIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> RowId {
        self.last += 1;
        RowId(self.last)
    }
}
