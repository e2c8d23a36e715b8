//! Column schema: which cell kind a column holds and where it reads/writes.

use serde::{Deserialize, Serialize};

use crate::{ColumnKey, FieldPath};

/// Fixed tick unit of a duration column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    /// Result documents store finish times in milliseconds.
    #[default]
    Milliseconds,
    Microseconds,
}

impl DurationUnit {
    pub const fn ticks_per_second(self) -> u64 {
        match self {
            Self::Milliseconds => 1_000,
            Self::Microseconds => 1_000_000,
        }
    }

    /// Maximum digits accepted after the decimal point.
    pub const fn fraction_digits(self) -> usize {
        match self {
            Self::Milliseconds => 3,
            Self::Microseconds => 6,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Milliseconds => "milliseconds",
            Self::Microseconds => "microseconds",
        }
    }
}

/// How attempt edits are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// No gaps, at most one success, nothing after a success.
    #[default]
    Strict,
    /// Any combination of slots; used to correct unusual records.
    Relaxed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationConfig {
    pub unit: DurationUnit,
}

/// Inclusive bounds for a count column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountConfig {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl CountConfig {
    pub const fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttemptsConfig {
    pub capacity: usize,
    pub mode: EntryMode,
}

impl AttemptsConfig {
    pub const DEFAULT_CAPACITY: usize = 3;
}

impl Default for AttemptsConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
            mode: EntryMode::default(),
        }
    }
}

/// Which directory resolves a reference cell's id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceSource {
    #[default]
    Athletes,
    Teams,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    pub source: ReferenceSource,
}

/// Closed set of cell kinds, each with its own configuration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellKind {
    Duration(DurationConfig),
    Count(CountConfig),
    Flag,
    Attempts(AttemptsConfig),
    Reference(ReferenceConfig),
    Text,
    Tombstone,
}

impl CellKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Duration(_) => "duration",
            Self::Count(_) => "count",
            Self::Flag => "flag",
            Self::Attempts(_) => "attempts",
            Self::Reference(_) => "reference",
            Self::Text => "text",
            Self::Tombstone => "tombstone",
        }
    }

    /// Kinds that read and write a field of the row's record.
    pub const fn is_field_bound(&self) -> bool {
        !matches!(self, Self::Reference(_) | Self::Tombstone)
    }
}

/// One column of the table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub key: ColumnKey,
    pub kind: CellKind,
    /// Location in the row record; `None` for reference and tombstone columns.
    pub path: Option<FieldPath>,
    pub heading: String,
}

impl ColumnSpec {
    pub fn new(
        key: ColumnKey,
        kind: CellKind,
        path: Option<FieldPath>,
        heading: impl Into<String>,
    ) -> Self {
        Self {
            key,
            kind,
            path,
            heading: heading.into(),
        }
    }

    /// Column whose key doubles as its single-segment path.
    pub fn field(key: ColumnKey, kind: CellKind, heading: impl Into<String>) -> Self {
        let path = FieldPath::key(key.as_str()).ok();
        Self::new(key, kind, path, heading)
    }

    pub fn tombstone() -> Self {
        Self::new(ColumnKey::tombstone(), CellKind::Tombstone, None, "Remove")
    }

    pub fn is_tombstone(&self) -> bool {
        self.key.is_tombstone() || matches!(self.kind, CellKind::Tombstone)
    }
}
