//! Editing session: one event document bound to one table.
//!
//! The document is read once when the session opens. Edits go to the table;
//! the document's `results` are regenerated from the table on request, and
//! every other top-level key is carried through untouched.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tally_model::{
    ColumnKey, CompetitorId, EventDocument, EventType, ModelError, RowId, json_type_name,
};
use tracing::{debug, info, warn};

use crate::cell::{CellEvent, CellInput};
use crate::error::{EditError, SchemaError};
use crate::keymap::{EditorAction, KeyChord, KeyMap};
use crate::layout;
use crate::lookup::{Label, LookupFailure, LookupTicket, ReferenceLookup};
use crate::persist::{Persistence, PersistenceError};
use crate::settings::{EditingSettings, EditorSettings};
use crate::table::{Direction, Table};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("result for {competitor:?} must be an object, found {found}")]
    InvalidRecord {
        competitor: String,
        found: &'static str,
    },

    #[error("heights can only be added to high jump events, not {event_type:?}")]
    NotHighJump { event_type: String },
}

/// What happened to a save request.
#[derive(Debug)]
pub enum SaveOutcome {
    Saved,
    /// The table could not produce a valid document; nothing was written.
    Rejected(EditError),
    /// Storage failed; the session stays dirty and editing can continue.
    Failed(PersistenceError),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    document: EventDocument,
    table: Table,
    editing: EditingSettings,
    keys: KeyMap,
    dirty: bool,
}

impl EditorSession {
    pub fn open(document: EventDocument, settings: &EditorSettings) -> Result<Self, SessionError> {
        let columns = layout::columns_for(&document, &settings.editing)?;
        let mut table = Table::new(columns)?;

        for (competitor, record) in document.results() {
            let record = match record {
                Value::Object(map) => map.clone(),
                Value::Null => Map::new(),
                other => {
                    return Err(SessionError::InvalidRecord {
                        competitor: competitor.to_string(),
                        found: json_type_name(other),
                    });
                }
            };
            table.append_row(CompetitorId::new(competitor)?, record);
        }

        let duplicated = table.duplicated_competitors();
        if !duplicated.is_empty() {
            warn!(count = duplicated.len(), "document lists competitors more than once");
        }
        debug!(
            event_type = %document.event_type(),
            rows = table.rows().len(),
            columns = table.columns().len(),
            "opened editor session"
        );

        Ok(Self {
            document,
            table,
            editing: settings.editing.clone(),
            keys: settings.keys.key_map(),
            dirty: false,
        })
    }

    pub fn document(&self) -> &EventDocument {
        &self.document
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn key_map(&self) -> &KeyMap {
        &self.keys
    }

    /// Unsaved changes exist.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn edit(
        &mut self,
        row: RowId,
        column: &ColumnKey,
        input: CellInput,
    ) -> Result<CellEvent, EditError> {
        let event = self.table.on_cell_changed(row, column, input)?;
        if event.is_change() {
            self.dirty = true;
        }
        Ok(event)
    }

    /// Edit the row currently holding `competitor`.
    pub fn edit_competitor(
        &mut self,
        competitor: &CompetitorId,
        column: &ColumnKey,
        input: CellInput,
    ) -> Result<CellEvent, EditError> {
        let row = self
            .table
            .find_competitor(competitor)
            .ok_or_else(|| EditError::UnknownCompetitor(competitor.clone()))?;
        self.edit(row, column, input)
    }

    /// Give `first`'s results to `second` and the other way round.
    pub fn swap_competitors(
        &mut self,
        first: &CompetitorId,
        second: &CompetitorId,
    ) -> Result<bool, EditError> {
        let find = |competitor: &CompetitorId| {
            self.table
                .find_competitor(competitor)
                .ok_or_else(|| EditError::UnknownCompetitor(competitor.clone()))
        };
        let (first_row, second_row) = (find(first)?, find(second)?);
        let swapped = self.table.swap_competitors(first_row, second_row)?;
        if swapped {
            self.dirty = true;
        }
        Ok(swapped)
    }

    /// Append an empty row for `competitor` and focus its first cell.
    pub fn add_competitor(&mut self, competitor: CompetitorId) -> RowId {
        let row = self.table.append_row(competitor, Map::new());
        self.table.focus(row, 0);
        self.dirty = true;
        row
    }

    pub fn delete_row(&mut self, row: RowId) -> Result<(), EditError> {
        self.table.delete_row(row)?;
        self.dirty = true;
        Ok(())
    }

    pub fn delete_competitor(&mut self, competitor: &CompetitorId) -> Result<(), EditError> {
        let row = self
            .table
            .find_competitor(competitor)
            .ok_or_else(|| EditError::UnknownCompetitor(competitor.clone()))?;
        self.delete_row(row)
    }

    /// Add an attempts column for a new bar height.
    ///
    /// Every live row starts with an empty attempt list at that height.
    pub fn add_height(&mut self, height: &str) -> Result<ColumnKey, SessionError> {
        let event_type = self.document.event_type();
        if event_type != EventType::HighJump {
            return Err(SessionError::NotHighJump {
                event_type: event_type.to_string(),
            });
        }
        let column = layout::height_column(height.trim(), &self.editing)?;
        let key = column.key.clone();
        self.table.append_column(column)?;

        let rows: Vec<RowId> = self.table.live_rows().map(|row| row.id()).collect();
        for row in rows {
            if let Err(error) = self.table.on_cell_changed(row, &key, CellInput::Create) {
                // Rows that already hold a value at this height keep it.
                debug!(row = %row, %error, "height left as stored");
            }
        }
        self.dirty = true;
        Ok(key)
    }

    /// Dispatch a key chord through the key map.
    ///
    /// Row movement is handled here. Every bound action is returned so the
    /// caller can run the ones that need its help (save, new row, cancel).
    pub fn handle_key(&mut self, chord: &KeyChord) -> Option<EditorAction> {
        let action = self.keys.action_for(chord)?;
        if let Some(direction) = Direction::from_action(action) {
            self.table.navigate(direction);
        }
        Some(action)
    }

    pub fn focus(&mut self, row: RowId, column: usize) -> bool {
        self.table.focus(row, column)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.document.set_name(name);
        self.dirty = true;
    }

    pub fn set_distance(&mut self, distance: impl Into<String>) {
        self.document.set_distance(distance);
        self.dirty = true;
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.document.set_date(date);
        self.dirty = true;
    }

    /// Throw away unsaved edits of one cell.
    pub fn revert(&mut self, row: RowId, column: &ColumnKey) -> Result<(), EditError> {
        self.table.rebuild_cell(row, column)
    }

    pub fn request_lookups(&mut self) -> Vec<LookupTicket> {
        self.table.request_lookups()
    }

    pub fn complete_lookup(
        &mut self,
        ticket: &LookupTicket,
        result: Result<Label, LookupFailure>,
    ) -> bool {
        self.table.complete_lookup(ticket, result)
    }

    /// Resolve competitor labels with a synchronous lookup.
    pub fn resolve_labels(&mut self, lookup: &dyn ReferenceLookup) {
        self.table.resolve_labels(lookup);
    }

    /// The document with `results` regenerated from the table.
    pub fn to_document(&self) -> Result<EventDocument, EditError> {
        let results = self.table.results()?;
        Ok(self.document.with_results(results))
    }

    /// Regenerate the document and hand it to `store`.
    pub fn save(&mut self, store: &mut dyn Persistence) -> SaveOutcome {
        let document = match self.to_document() {
            Ok(document) => document,
            Err(error) => {
                warn!(%error, "save rejected");
                return SaveOutcome::Rejected(error);
            }
        };
        match store.save(&document.into_value()) {
            Ok(()) => {
                self.dirty = false;
                info!(rows = self.table.live_rows().count(), "saved results");
                SaveOutcome::Saved
            }
            Err(error) => {
                warn!(%error, "save failed");
                SaveOutcome::Failed(error)
            }
        }
    }
}
