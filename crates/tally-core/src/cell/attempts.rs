use tally_codec::{AttemptSequence, AttemptSlot, AttemptWarning, parse_attempts};
use tally_model::{AttemptOutcome, AttemptsConfig, EntryMode};

use crate::error::ValidationError;

/// Jump attempts at one height.
///
/// `None` is the unset state, shown as a create button. Creating binds an
/// empty sequence, which is written to the document as `[]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptsCell {
    pub(crate) config: AttemptsConfig,
    pub(crate) sequence: Option<AttemptSequence>,
}

/// Outcome of an accepted attempts edit.
#[derive(Debug)]
pub(crate) struct AttemptsEdit {
    pub changed: bool,
    pub warnings: Vec<AttemptWarning>,
}

impl AttemptsEdit {
    fn changed(changed: bool) -> Self {
        Self {
            changed,
            warnings: Vec::new(),
        }
    }
}

impl AttemptsCell {
    pub fn new(config: AttemptsConfig, outcomes: Option<&[AttemptOutcome]>) -> Option<Self> {
        let sequence = match outcomes {
            Some(outcomes) => Some(AttemptSequence::from_outcomes(outcomes, config.capacity).ok()?),
            None => None,
        };
        Some(Self { config, sequence })
    }

    pub fn sequence(&self) -> Option<&AttemptSequence> {
        self.sequence.as_ref()
    }

    pub fn mode(&self) -> EntryMode {
        self.config.mode
    }

    pub fn text(&self) -> String {
        self.sequence
            .as_ref()
            .map(AttemptSequence::to_text)
            .unwrap_or_default()
    }

    pub(crate) fn create(&mut self) -> bool {
        if self.sequence.is_some() {
            return false;
        }
        self.sequence = Some(AttemptSequence::new(self.config.capacity));
        true
    }

    pub(crate) fn clear(&mut self) -> bool {
        self.sequence.take().is_some()
    }

    /// Replace the sequence from text like `"ffs"`.
    ///
    /// Unknown characters are applied and reported. Structural warnings block
    /// the edit in strict mode.
    pub(crate) fn enter(&mut self, text: &str) -> Result<AttemptsEdit, ValidationError> {
        let parsed = parse_attempts(text, self.config.capacity)?;
        if self.config.mode == EntryMode::Strict && parsed.has_structural_warnings() {
            return Err(ValidationError::AttemptWarnings {
                warnings: parsed.warnings,
            });
        }
        let changed = self.sequence.as_ref() != Some(&parsed.sequence);
        self.sequence = Some(parsed.sequence);
        Ok(AttemptsEdit {
            changed,
            warnings: parsed.warnings,
        })
    }

    pub(crate) fn click(&mut self, index: usize) -> Result<AttemptsEdit, ValidationError> {
        let mut sequence = self.working_sequence();
        let changed = sequence.click(index, self.config.mode)?;
        if changed {
            self.sequence = Some(sequence);
        }
        Ok(AttemptsEdit::changed(changed))
    }

    pub(crate) fn set(
        &mut self,
        index: usize,
        slot: AttemptSlot,
    ) -> Result<AttemptsEdit, ValidationError> {
        let mut sequence = self.working_sequence();
        sequence.set(index, slot, self.config.mode)?;
        let changed = self.sequence.as_ref() != Some(&sequence);
        self.sequence = Some(sequence);
        Ok(AttemptsEdit::changed(changed))
    }

    /// Copy to edit; an unset cell starts from an empty sequence.
    fn working_sequence(&self) -> AttemptSequence {
        self.sequence
            .clone()
            .unwrap_or_else(|| AttemptSequence::new(self.config.capacity))
    }
}
