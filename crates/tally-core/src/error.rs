#![deny(unsafe_code)]

use tally_codec::{AttemptWarning, AttemptsError, DurationError};
use tally_model::{ColumnKey, CompetitorId, RowId};

/// Field path failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("field path must have at least one segment")]
    EmptyPath,

    #[error("cannot descend into {found} at segment {segment:?} of {path}")]
    TypeMismatch {
        path: String,
        segment: String,
        found: &'static str,
    },
}

/// A value rejected at the input boundary. The cell keeps its previous value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Duration(#[from] DurationError),

    #[error(transparent)]
    Attempts(#[from] AttemptsError),

    #[error("{input:?} is not a whole number")]
    NotANumber { input: String },

    #[error("{value} is outside the allowed range {range}")]
    OutOfRange { value: i64, range: String },

    #[error("attempts need confirmation: {}", join_warnings(.warnings))]
    AttemptWarnings { warnings: Vec<AttemptWarning> },

    #[error("competitor id must not be empty")]
    EmptyCompetitorId,

    #[error("{kind} cells do not accept {input}")]
    UnsupportedInput {
        kind: &'static str,
        input: &'static str,
    },

    #[error("cell holds an unrecognised value and cannot be edited")]
    ReadOnly,

    #[error("competitors appear more than once: {}", join_ids(.competitors))]
    DuplicateCompetitors { competitors: Vec<CompetitorId> },
}

/// Column schema problems.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("column {key} is declared twice")]
    DuplicateColumn { key: ColumnKey },

    #[error("column {key} needs a field path")]
    MissingPath { key: ColumnKey },

    #[error("columns {first} and {second} write overlapping field paths")]
    OverlappingPaths { first: ColumnKey, second: ColumnKey },
}

/// Failure of a single cell edit. The table is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("row {0} does not exist")]
    UnknownRow(RowId),

    #[error("row {0} has been deleted")]
    DeletedRow(RowId),

    #[error("column {0} does not exist")]
    UnknownColumn(ColumnKey),

    #[error("competitor {0} is not in the table")]
    UnknownCompetitor(CompetitorId),

    #[error("the table has no competitor column")]
    NoReferenceColumn,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Path(#[from] PathError),
}

fn join_warnings(warnings: &[AttemptWarning]) -> String {
    warnings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_ids(ids: &[CompetitorId]) -> String {
    ids.iter()
        .map(CompetitorId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
