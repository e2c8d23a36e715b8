//! The cell family.
//!
//! A [`Cell`] owns one typed value decoded from the row's record. It accepts
//! [`CellInput`] commands, reports its value for materialization and
//! describes how it should be drawn through [`CellView`]. Edits are atomic:
//! input is parsed and checked in full before the cell is touched.
//!
//! Absence is a state of its own. An unset duration renders as empty text, an
//! unset attempts cell as a create button, and neither writes anything back.

mod attempts;
mod reference;
mod scalar;

use std::fmt;

use serde_json::Value;
use tally_codec::{AttemptSlot, AttemptWarning};
use tally_model::{AttemptOutcome, CellKind, CellValue, CompetitorId, ReferenceConfig};

pub use attempts::AttemptsCell;
pub use reference::ReferenceCell;
pub use scalar::{CountCell, DurationCell, FlagCell, TextCell};

use crate::error::ValidationError;
use crate::lookup::LabelState;

/// A command addressed to one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellInput {
    /// Typed text: durations, counts, free text, attempt strings, competitor ids.
    Text(String),
    /// Checkbox state of a flag.
    Check(bool),
    /// Cycle one attempt slot.
    ClickAttempt(usize),
    /// Overwrite one attempt slot.
    SetAttempt { index: usize, slot: AttemptSlot },
    /// Turn an unset attempts cell into an empty sequence.
    Create,
    /// Return the cell to the unset state.
    Clear,
    /// Press the cell's button: toggles flags, deletes the row from a tombstone.
    Activate,
}

impl CellInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Check(_) => "check",
            Self::ClickAttempt(_) => "attempt clicks",
            Self::SetAttempt { .. } => "attempt changes",
            Self::Create => "create",
            Self::Clear => "clear",
            Self::Activate => "activate",
        }
    }
}

/// Result of an accepted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellEvent {
    Unchanged,
    /// The value changed; warnings were accepted along with it.
    Changed { warnings: Vec<AttemptWarning> },
    /// A tombstone was activated; the owning row deletes itself.
    DeleteRequested,
}

impl CellEvent {
    fn changed(changed: bool) -> Self {
        if changed {
            Self::Changed {
                warnings: Vec::new(),
            }
        } else {
            Self::Unchanged
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// A value the column could not decode. Shown as-is and written back as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueCell {
    pub(crate) kind: &'static str,
    pub(crate) raw: Value,
}

impl OpaqueCell {
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Kind of the column the value sits in.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Duration(DurationCell),
    Count(CountCell),
    Flag(FlagCell),
    Attempts(AttemptsCell),
    Reference(ReferenceCell),
    Text(TextCell),
    /// Delete button; holds no value.
    Tombstone,
    Opaque(OpaqueCell),
}

impl Cell {
    /// Decode a stored value for a column of `kind`.
    ///
    /// `None` and JSON `null` both mean unset. Values of the wrong shape
    /// produce an [`Cell::Opaque`] cell.
    pub fn bind(kind: &CellKind, stored: Option<&Value>) -> Self {
        let stored = stored.filter(|value| !value.is_null());
        let decoded = match kind {
            CellKind::Duration(config) => match stored {
                None => Some(Self::Duration(DurationCell::new(*config, None))),
                Some(value) => value
                    .as_u64()
                    .map(|ticks| Self::Duration(DurationCell::new(*config, Some(ticks)))),
            },
            CellKind::Count(config) => match stored {
                None => Some(Self::Count(CountCell::new(*config, None))),
                Some(value) => value
                    .as_i64()
                    .map(|count| Self::Count(CountCell::new(*config, Some(count)))),
            },
            CellKind::Flag => match stored {
                None => Some(Self::Flag(FlagCell::new(false))),
                Some(value) => value.as_bool().map(|flag| Self::Flag(FlagCell::new(flag))),
            },
            CellKind::Attempts(config) => match stored {
                None => AttemptsCell::new(*config, None).map(Self::Attempts),
                Some(value) => decode_attempts(value)
                    .and_then(|outcomes| AttemptsCell::new(*config, Some(&outcomes)))
                    .map(Self::Attempts),
            },
            CellKind::Reference(config) => stored
                .and_then(Value::as_str)
                .and_then(|id| CompetitorId::new(id).ok())
                .map(|id| Self::reference(*config, id)),
            CellKind::Text => match stored {
                None => Some(Self::Text(TextCell::new(None))),
                Some(value) => value
                    .as_str()
                    .map(|text| Self::Text(TextCell::new(Some(text.to_string())))),
            },
            CellKind::Tombstone => Some(Self::Tombstone),
        };

        decoded.unwrap_or_else(|| {
            Self::Opaque(OpaqueCell {
                kind: kind.name(),
                raw: stored.cloned().unwrap_or(Value::Null),
            })
        })
    }

    pub fn reference(config: ReferenceConfig, id: CompetitorId) -> Self {
        Self::Reference(ReferenceCell::new(config, id))
    }

    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Duration(_) => "duration",
            Self::Count(_) => "count",
            Self::Flag(_) => "flag",
            Self::Attempts(_) => "attempts",
            Self::Reference(_) => "reference",
            Self::Text(_) => "text",
            Self::Tombstone => "tombstone",
            Self::Opaque(_) => "opaque",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }

    /// Current value, `None` when unset.
    pub fn value(&self) -> Option<CellValue> {
        match self {
            Self::Duration(cell) => cell.ticks.map(CellValue::Duration),
            Self::Count(cell) => cell.count.map(CellValue::Count),
            Self::Flag(cell) => cell.checked.then_some(CellValue::Flag(true)),
            Self::Attempts(cell) => cell
                .sequence
                .as_ref()
                .map(|sequence| CellValue::Attempts(sequence.outcomes())),
            Self::Reference(cell) => Some(CellValue::Reference(cell.id.to_string())),
            Self::Text(cell) => cell.text.clone().map(CellValue::Text),
            Self::Tombstone => None,
            Self::Opaque(cell) => Some(CellValue::Raw(cell.raw.clone())),
        }
    }

    /// Apply one input. On error the cell is unchanged.
    pub fn apply(&mut self, input: CellInput) -> Result<CellEvent, ValidationError> {
        let unsupported = ValidationError::UnsupportedInput {
            kind: self.kind_name(),
            input: input.name(),
        };

        let event = match (self, input) {
            (Self::Opaque(_), _) => return Err(ValidationError::ReadOnly),

            (Self::Duration(cell), CellInput::Text(text)) => CellEvent::changed(cell.enter(&text)?),
            (Self::Duration(cell), CellInput::Clear) => CellEvent::changed(cell.ticks.take().is_some()),

            (Self::Count(cell), CellInput::Text(text)) => CellEvent::changed(cell.enter(&text)?),
            (Self::Count(cell), CellInput::Clear) => CellEvent::changed(cell.count.take().is_some()),

            (Self::Flag(cell), CellInput::Check(checked)) => CellEvent::changed(cell.check(checked)),
            (Self::Flag(cell), CellInput::Activate) => {
                let toggled = !cell.checked;
                CellEvent::changed(cell.check(toggled))
            }
            (Self::Flag(cell), CellInput::Clear) => CellEvent::changed(cell.check(false)),

            (Self::Attempts(cell), CellInput::Text(text)) => {
                let edit = cell.enter(&text)?;
                if edit.changed || !edit.warnings.is_empty() {
                    CellEvent::Changed {
                        warnings: edit.warnings,
                    }
                } else {
                    CellEvent::Unchanged
                }
            }
            (Self::Attempts(cell), CellInput::ClickAttempt(index)) => {
                CellEvent::changed(cell.click(index)?.changed)
            }
            (Self::Attempts(cell), CellInput::SetAttempt { index, slot }) => {
                CellEvent::changed(cell.set(index, slot)?.changed)
            }
            (Self::Attempts(cell), CellInput::Create) => CellEvent::changed(cell.create()),
            (Self::Attempts(cell), CellInput::Clear) => CellEvent::changed(cell.clear()),

            (Self::Reference(cell), CellInput::Text(text)) => CellEvent::changed(cell.rename(&text)?),

            (Self::Text(cell), CellInput::Text(text)) => CellEvent::changed(cell.enter(&text)),
            (Self::Text(cell), CellInput::Clear) => CellEvent::changed(cell.text.take().is_some()),

            (Self::Tombstone, CellInput::Activate) => CellEvent::DeleteRequested,

            _ => return Err(unsupported),
        };
        Ok(event)
    }

    /// How the cell should be drawn right now.
    pub fn view(&self) -> CellView {
        match self {
            Self::Duration(cell) => CellView::Input { text: cell.text() },
            Self::Count(cell) => CellView::Input { text: cell.text() },
            Self::Text(cell) => CellView::Input {
                text: cell.text().to_string(),
            },
            Self::Flag(cell) => CellView::Checkbox {
                checked: cell.checked,
            },
            Self::Attempts(cell) => match &cell.sequence {
                None => CellView::CreateButton,
                Some(sequence) => CellView::Attempts {
                    slots: sequence.slots().to_vec(),
                },
            },
            Self::Reference(cell) => CellView::Reference {
                id: cell.id.to_string(),
                label: cell.label.clone(),
            },
            Self::Tombstone => CellView::DeleteButton,
            Self::Opaque(cell) => CellView::ReadOnly {
                text: match &cell.raw {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                },
            },
        }
    }
}

fn decode_attempts(value: &Value) -> Option<Vec<AttemptOutcome>> {
    value
        .as_array()?
        .iter()
        .map(|attempt| attempt.as_bool().map(AttemptOutcome::from_bool))
        .collect()
}

/// Toolkit-neutral description of a cell's presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellView {
    Input { text: String },
    Checkbox { checked: bool },
    Attempts { slots: Vec<AttemptSlot> },
    CreateButton,
    /// Raw id until resolved; failed lookups keep the id with fallback styling.
    Reference { id: String, label: LabelState },
    ReadOnly { text: String },
    DeleteButton,
}

impl fmt::Display for CellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input { text } | Self::ReadOnly { text } => f.write_str(text),
            Self::Checkbox { checked } => f.write_str(if *checked { "x" } else { "" }),
            Self::Attempts { slots } => {
                for slot in slots {
                    let mark = slot.map_or('.', AttemptOutcome::as_char);
                    write!(f, "{mark}")?;
                }
                Ok(())
            }
            Self::CreateButton => f.write_str("+"),
            Self::Reference { id, label } => match label {
                LabelState::Resolved(label) => f.write_str(&label.display_name),
                _ => f.write_str(id),
            },
            Self::DeleteButton => Ok(()),
        }
    }
}
