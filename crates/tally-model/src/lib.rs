//! Data model for the tally result editor.
//!
//! Plain types only: identifiers, field paths, the column schema and its
//! tagged cell kinds, cell values, and the event document wrapper. Behaviour
//! lives in `tally-codec` and `tally-core`.

pub mod column;
pub mod document;
pub mod error;
pub mod ids;
pub mod path;
pub mod value;

pub use column::{
    AttemptsConfig, CellKind, ColumnSpec, CountConfig, DurationConfig, DurationUnit, EntryMode,
    ReferenceConfig, ReferenceSource,
};
pub use document::{CompetitorType, EventDocument, EventType, RESULTS_KEY};
pub use error::{ModelError, Result};
pub use ids::{ColumnKey, CompetitorId, RowId, RowIdAllocator};
pub use path::FieldPath;
pub use value::{AttemptOutcome, CellValue, json_type_name};
