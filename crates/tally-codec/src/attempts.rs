//! High-jump attempt sequences.
//!
//! A sequence has a fixed number of slots, each unset or holding an
//! [`AttemptOutcome`]. In strict mode a sequence never has a set slot after an
//! unset one, holds at most one success, and has nothing set after the
//! success. Relaxed mode accepts any combination.
//!
//! The text form is one character per attempt: `s` cleared, `f` failed.

use std::fmt;

use tally_model::{AttemptOutcome, EntryMode};
use thiserror::Error;

pub type AttemptSlot = Option<AttemptOutcome>;

/// Order in which a click cycles a slot.
const CLICK_CYCLE: [AttemptSlot; 3] = [
    None,
    Some(AttemptOutcome::Success),
    Some(AttemptOutcome::Fail),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptsError {
    #[error("{count} attempts entered but only {capacity} are allowed")]
    TooManyAttempts { count: usize, capacity: usize },

    #[error("attempt {index} does not exist (capacity {capacity})")]
    SlotOutOfRange { index: usize, capacity: usize },

    #[error("setting attempt {index} would break the attempt order")]
    OrderViolation { index: usize },
}

/// Something unusual about entered attempt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptWarning {
    /// A character other than `s`/`f`; it was read as a fail.
    InvalidCharacter { character: char, position: usize },
    MultipleSuccesses { count: usize },
    AttemptAfterSuccess,
}

impl AttemptWarning {
    /// Structural warnings describe sequences strict mode refuses.
    pub const fn is_structural(&self) -> bool {
        !matches!(self, Self::InvalidCharacter { .. })
    }
}

impl fmt::Display for AttemptWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCharacter {
                character,
                position,
            } => write!(
                f,
                "character {character:?} at position {} is not 's' or 'f' and was read as 'f'",
                position + 1
            ),
            Self::MultipleSuccesses { count } => {
                write!(f, "{count} successful attempts; at most one is expected")
            }
            Self::AttemptAfterSuccess => f.write_str("attempts recorded after a success"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptSequence {
    slots: Vec<AttemptSlot>,
}

impl AttemptSequence {
    /// All slots unset.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn from_outcomes(
        outcomes: &[AttemptOutcome],
        capacity: usize,
    ) -> Result<Self, AttemptsError> {
        if outcomes.len() > capacity {
            return Err(AttemptsError::TooManyAttempts {
                count: outcomes.len(),
                capacity,
            });
        }
        let mut sequence = Self::new(capacity);
        for (slot, outcome) in sequence.slots.iter_mut().zip(outcomes) {
            *slot = Some(*outcome);
        }
        Ok(sequence)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[AttemptSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<AttemptSlot> {
        self.slots.get(index).copied()
    }

    /// Every set outcome, in slot order. Unset slots are skipped.
    pub fn outcomes(&self) -> Vec<AttemptOutcome> {
        self.slots.iter().filter_map(|slot| *slot).collect()
    }

    pub fn to_text(&self) -> String {
        self.outcomes().into_iter().map(AttemptOutcome::as_char).collect()
    }

    pub fn is_strictly_valid(&self) -> bool {
        strict_violations(&self.slots).is_empty()
    }

    /// Structural problems of the sequence, as warnings.
    pub fn violations(&self) -> Vec<AttemptWarning> {
        strict_violations(&self.slots)
    }

    /// Advance a slot along unset -> success -> fail -> unset.
    ///
    /// In strict mode the slot moves to the next state in the cycle that keeps
    /// the sequence valid and stays put when there is none. Returns whether
    /// the slot changed.
    pub fn click(&mut self, index: usize, mode: EntryMode) -> Result<bool, AttemptsError> {
        let current = self.checked_slot(index)?;
        let position = CLICK_CYCLE
            .iter()
            .position(|state| *state == current)
            .unwrap_or(0);

        for step in 1..CLICK_CYCLE.len() {
            let candidate = CLICK_CYCLE[(position + step) % CLICK_CYCLE.len()];
            if mode == EntryMode::Relaxed || self.valid_with(index, candidate) {
                self.slots[index] = candidate;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Set a slot directly. Strict mode refuses changes that break the order.
    pub fn set(
        &mut self,
        index: usize,
        slot: AttemptSlot,
        mode: EntryMode,
    ) -> Result<(), AttemptsError> {
        self.checked_slot(index)?;
        if mode == EntryMode::Strict && !self.valid_with(index, slot) {
            return Err(AttemptsError::OrderViolation { index });
        }
        self.slots[index] = slot;
        Ok(())
    }

    fn checked_slot(&self, index: usize) -> Result<AttemptSlot, AttemptsError> {
        self.slot(index).ok_or(AttemptsError::SlotOutOfRange {
            index,
            capacity: self.capacity(),
        })
    }

    fn valid_with(&self, index: usize, slot: AttemptSlot) -> bool {
        let mut candidate = self.slots.clone();
        candidate[index] = slot;
        strict_violations(&candidate).is_empty()
    }
}

/// Result of reading attempt text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAttempts {
    pub sequence: AttemptSequence,
    pub warnings: Vec<AttemptWarning>,
}

impl ParsedAttempts {
    pub fn has_structural_warnings(&self) -> bool {
        self.warnings.iter().any(AttemptWarning::is_structural)
    }
}

/// Read attempt text such as `"ffs"`, case-insensitively.
///
/// Unknown characters become fails and are reported; text longer than the
/// capacity is an error.
pub fn parse_attempts(input: &str, capacity: usize) -> Result<ParsedAttempts, AttemptsError> {
    let mut warnings = Vec::new();
    let outcomes: Vec<AttemptOutcome> = input
        .trim()
        .chars()
        .enumerate()
        .map(|(position, character)| match character.to_ascii_lowercase() {
            's' => AttemptOutcome::Success,
            'f' => AttemptOutcome::Fail,
            _ => {
                warnings.push(AttemptWarning::InvalidCharacter {
                    character,
                    position,
                });
                AttemptOutcome::Fail
            }
        })
        .collect();

    let sequence = AttemptSequence::from_outcomes(&outcomes, capacity)?;
    warnings.extend(sequence.violations());
    Ok(ParsedAttempts { sequence, warnings })
}

fn strict_violations(slots: &[AttemptSlot]) -> Vec<AttemptWarning> {
    let mut warnings = Vec::new();

    let successes = slots
        .iter()
        .filter(|slot| **slot == Some(AttemptOutcome::Success))
        .count();
    if successes > 1 {
        warnings.push(AttemptWarning::MultipleSuccesses { count: successes });
    }

    if let Some(first_success) = slots
        .iter()
        .position(|slot| *slot == Some(AttemptOutcome::Success))
        && slots[first_success + 1..].iter().any(Option::is_some)
    {
        warnings.push(AttemptWarning::AttemptAfterSuccess);
    }

    if let Some(first_gap) = slots.iter().position(Option::is_none)
        && slots[first_gap..].iter().any(Option::is_some)
    {
        // Gaps only arise from relaxed edits; report them with the order rule.
        if !warnings.contains(&AttemptWarning::AttemptAfterSuccess) {
            warnings.push(AttemptWarning::AttemptAfterSuccess);
        }
    }

    warnings
}
