use tally_model::{CompetitorId, ReferenceConfig};

use crate::error::ValidationError;
use crate::lookup::{Label, LabelState};

/// The row's competitor id and its resolved label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCell {
    pub(crate) config: ReferenceConfig,
    pub(crate) id: CompetitorId,
    pub(crate) label: LabelState,
}

impl ReferenceCell {
    pub fn new(config: ReferenceConfig, id: CompetitorId) -> Self {
        Self {
            config,
            id,
            label: LabelState::Unresolved,
        }
    }

    pub fn id(&self) -> &CompetitorId {
        &self.id
    }

    pub fn config(&self) -> ReferenceConfig {
        self.config
    }

    pub fn label_state(&self) -> &LabelState {
        &self.label
    }

    pub fn label(&self) -> Option<&Label> {
        match &self.label {
            LabelState::Resolved(label) => Some(label),
            _ => None,
        }
    }

    /// Point the cell at another competitor; the old label is dropped.
    pub(crate) fn rename(&mut self, text: &str) -> Result<bool, ValidationError> {
        let id = CompetitorId::new(text).map_err(|_| ValidationError::EmptyCompetitorId)?;
        if id == self.id {
            return Ok(false);
        }
        self.id = id;
        self.label = LabelState::Unresolved;
        Ok(true)
    }
}
