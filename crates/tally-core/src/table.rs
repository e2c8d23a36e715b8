//! The table: column schema, rows, and the operations that span rows.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use tally_model::{CellKind, ColumnKey, ColumnSpec, CompetitorId, RowId, RowIdAllocator};
use tracing::{debug, warn};

use crate::cell::{Cell, CellEvent, CellInput};
use crate::duplicates::duplicated_ids;
use crate::error::{EditError, SchemaError, ValidationError};
use crate::keymap::EditorAction;
use crate::lookup::{Label, LabelState, LookupFailure, LookupTicket, ReferenceLookup};
use crate::row::{Row, RowValue};

/// Row-to-row movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    /// Row movement bound to an editor action, if any.
    pub const fn from_action(action: EditorAction) -> Option<Self> {
        match action {
            EditorAction::NextRow => Some(Self::Next),
            EditorAction::PreviousRow => Some(Self::Previous),
            _ => None,
        }
    }
}

/// The focused cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    pub row: RowId,
    pub column: usize,
}

/// A cell whose stored value its column could not decode.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueEntry {
    pub row: RowId,
    pub competitor: CompetitorId,
    pub column: ColumnKey,
    pub raw: Value,
}

#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<ColumnSpec>,
    rows: Vec<Row>,
    row_ids: RowIdAllocator,
    focus: Option<Focus>,
}

impl Table {
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, SchemaError> {
        let mut table = Self {
            columns: Vec::with_capacity(columns.len()),
            rows: Vec::new(),
            row_ids: RowIdAllocator::new(),
            focus: None,
        };
        for column in columns {
            table.append_column(column)?;
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, key: &ColumnKey) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| &column.key == key)
    }

    /// All rows in order, deleted ones included.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn live_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|row| !row.is_deleted())
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|row| row.id() == id)
    }

    /// First live row for `competitor`.
    pub fn find_competitor(&self, competitor: &CompetitorId) -> Option<RowId> {
        self.live_rows()
            .find(|row| row.competitor() == competitor)
            .map(Row::id)
    }

    pub fn cell(&self, row: RowId, column: &ColumnKey) -> Option<&Cell> {
        let row = self.row(row)?;
        let index = row.position(column)?;
        row.cell(index).map(|bound| bound.cell())
    }

    /// Add a column at the end and give every existing row a cell for it.
    ///
    /// New cells read the row's record at the column's path. Cells already
    /// in the rows are left alone.
    pub fn append_column(&mut self, column: ColumnSpec) -> Result<(), SchemaError> {
        self.check_column(&column)?;
        for row in &mut self.rows {
            row.append_cell(&column.kind, column.path.as_ref(), &column.key);
        }
        debug!(
            column = %column.key,
            kind = column.kind.name(),
            rows = self.rows.len(),
            "appended column"
        );
        self.columns.push(column);
        Ok(())
    }

    /// Add a row after all existing rows, with one cell per column.
    pub fn append_row(&mut self, competitor: CompetitorId, record: Map<String, Value>) -> RowId {
        let id = self.row_ids.allocate();
        let mut row = Row::new(id, competitor, record);
        for column in &self.columns {
            row.append_cell(&column.kind, column.path.as_ref(), &column.key);
        }
        debug!(row = %id, competitor = %row.competitor(), "appended row");
        self.rows.push(row);
        self.refresh_duplicates();
        id
    }

    pub fn delete_row(&mut self, id: RowId) -> Result<(), EditError> {
        let row = self.live_row_mut(id)?;
        row.delete();
        debug!(row = %id, "deleted row");
        if self.focus.is_some_and(|focus| focus.row == id) {
            self.focus = None;
        }
        self.refresh_duplicates();
        Ok(())
    }

    /// Exchange the competitors of two live rows.
    ///
    /// Both renames go through the reference cells. Records stay with their
    /// rows, so each competitor ends up with the other's results.
    pub fn swap_competitors(&mut self, first: RowId, second: RowId) -> Result<bool, EditError> {
        let key = self
            .columns
            .iter()
            .find(|column| matches!(column.kind, CellKind::Reference(_)))
            .map(|column| column.key.clone())
            .ok_or(EditError::NoReferenceColumn)?;
        let first_id = self.live_row_mut(first)?.competitor().clone();
        let second_id = self.live_row_mut(second)?.competitor().clone();
        if first_id == second_id {
            return Ok(false);
        }

        self.live_row_mut(first)?
            .apply(&key, CellInput::text(second_id.as_str()))?;
        self.live_row_mut(second)?
            .apply(&key, CellInput::text(first_id.as_str()))?;
        debug!(first = %first, second = %second, "swapped competitors");
        self.refresh_duplicates();
        Ok(true)
    }

    /// Values of the live rows, in row order.
    pub fn value(&self) -> Vec<RowValue> {
        self.rows.iter().filter_map(Row::value).collect()
    }

    /// Regenerate the `results` object from the live rows.
    ///
    /// Fails when two rows hold the same competitor, since both would need
    /// the same key.
    pub fn results(&self) -> Result<Map<String, Value>, EditError> {
        let duplicated = self.duplicated_competitors();
        if !duplicated.is_empty() {
            return Err(ValidationError::DuplicateCompetitors {
                competitors: duplicated.into_iter().collect(),
            }
            .into());
        }

        let mut results = Map::new();
        for row in &self.rows {
            if let Some(record) = row.materialize()? {
                results.insert(row.competitor().to_string(), record);
            }
        }
        Ok(results)
    }

    /// Apply one input to the cell at (`row`, `column`).
    ///
    /// Changes to a reference cell re-run duplicate detection; activating a
    /// tombstone deletes the row.
    pub fn on_cell_changed(
        &mut self,
        row: RowId,
        column: &ColumnKey,
        input: CellInput,
    ) -> Result<CellEvent, EditError> {
        if self.column(column).is_none() {
            return Err(EditError::UnknownColumn(column.clone()));
        }
        let target = self.live_row_mut(row)?;
        let event = match target.apply(column, input) {
            Ok(event) => event,
            Err(err) => {
                warn!(row = %row, column = %column, error = %err, "rejected edit");
                return Err(err);
            }
        };

        match &event {
            CellEvent::DeleteRequested => {
                debug!(row = %row, "row deleted from its tombstone");
                if self.focus.is_some_and(|focus| focus.row == row) {
                    self.focus = None;
                }
                self.refresh_duplicates();
            }
            CellEvent::Changed { warnings } => {
                debug!(row = %row, column = %column, warnings = warnings.len(), "cell changed");
                if self
                    .cell(row, column)
                    .is_some_and(|cell| matches!(cell, Cell::Reference(_)))
                {
                    self.refresh_duplicates();
                }
            }
            CellEvent::Unchanged => {}
        }
        Ok(event)
    }

    /// Recreate a cell from its row's record, dropping unsaved edits.
    pub fn rebuild_cell(&mut self, row: RowId, column: &ColumnKey) -> Result<(), EditError> {
        let kind = self
            .column(column)
            .map(|spec| spec.kind.clone())
            .ok_or_else(|| EditError::UnknownColumn(column.clone()))?;
        let target = self.live_row_mut(row)?;
        let index = target
            .position(column)
            .ok_or_else(|| EditError::UnknownColumn(column.clone()))?;
        target.rebuild_cell(index, &kind);
        self.refresh_duplicates();
        Ok(())
    }

    pub fn focused(&self) -> Option<Focus> {
        self.focus
    }

    /// Move focus to column `column` of `row`.
    pub fn focus(&mut self, row: RowId, column: usize) -> bool {
        let Some(index) = self.rows.iter().position(|r| r.id() == row) else {
            return false;
        };
        if !self.rows[index].focus(column) {
            return false;
        }
        if let Some(previous) = self.focus.filter(|focus| focus.row != row)
            && let Some(old) = self.rows.iter_mut().find(|r| r.id() == previous.row)
        {
            old.blur();
        }
        self.focus = Some(Focus { row, column });
        true
    }

    /// Move focus to the same column of the next or previous live row,
    /// wrapping at either end.
    pub fn navigate(&mut self, direction: Direction) -> Option<Focus> {
        let focus = self.focus?;
        let live: Vec<RowId> = self.live_rows().map(Row::id).collect();
        let position = live.iter().position(|id| *id == focus.row)?;
        let count = live.len();
        let target = match direction {
            Direction::Next => live[(position + 1) % count],
            Direction::Previous => live[(position + count - 1) % count],
        };
        self.focus(target, focus.column).then_some(Focus {
            row: target,
            column: focus.column,
        })
    }

    /// Competitors held by more than one live row.
    pub fn duplicated_competitors(&self) -> BTreeSet<CompetitorId> {
        duplicated_ids(self.live_rows().map(Row::competitor))
    }

    /// Reset every row's duplicate flag from a full scan of the live rows.
    pub fn refresh_duplicates(&mut self) {
        let duplicated = self.duplicated_competitors();
        for row in &mut self.rows {
            let flagged = duplicated.contains(row.competitor());
            row.set_duplicated(flagged);
        }
        if !duplicated.is_empty() {
            debug!(count = duplicated.len(), "duplicate competitors");
        }
    }

    /// Cells holding values their column could not decode.
    pub fn opaque_cells(&self) -> Vec<OpaqueEntry> {
        let mut entries = Vec::new();
        for row in self.live_rows() {
            for bound in row.cells() {
                if let Cell::Opaque(opaque) = bound.cell() {
                    entries.push(OpaqueEntry {
                        row: row.id(),
                        competitor: row.competitor().clone(),
                        column: bound.key().clone(),
                        raw: opaque.raw().clone(),
                    });
                }
            }
        }
        entries
    }

    /// Issue tickets for every unresolved reference cell and mark them pending.
    pub fn request_lookups(&mut self) -> Vec<LookupTicket> {
        let mut tickets = Vec::new();
        for row in self.rows.iter_mut().filter(|row| !row.is_deleted()) {
            let row_id = row.id();
            for index in 0..row.cells().len() {
                let Some(bound) = row.cell_mut(index) else {
                    continue;
                };
                let column = bound.key().clone();
                let generation = bound.generation();
                if let Cell::Reference(reference) = bound.cell_mut()
                    && reference.label == LabelState::Unresolved
                {
                    reference.label = LabelState::Pending;
                    tickets.push(LookupTicket {
                        row: row_id,
                        column,
                        generation,
                        source: reference.config.source,
                        id: reference.id.clone(),
                    });
                }
            }
        }
        tickets
    }

    /// Deliver a lookup result. Returns `false` for stale tickets, whose cell
    /// was deleted, rebuilt or renamed since the ticket was issued.
    pub fn complete_lookup(
        &mut self,
        ticket: &LookupTicket,
        result: Result<Label, LookupFailure>,
    ) -> bool {
        let Some(row) = self
            .rows
            .iter_mut()
            .find(|row| row.id() == ticket.row && !row.is_deleted())
        else {
            debug!(row = %ticket.row, "dropping lookup for a deleted row");
            return false;
        };
        let Some(index) = row.position(&ticket.column) else {
            return false;
        };
        let Some(bound) = row.cell_mut(index) else {
            return false;
        };
        if bound.generation() != ticket.generation {
            debug!(row = %ticket.row, competitor = %ticket.id, "dropping stale lookup");
            return false;
        }
        let Cell::Reference(reference) = bound.cell_mut() else {
            return false;
        };

        reference.label = match result {
            Ok(label) => LabelState::Resolved(label),
            Err(failure) => {
                warn!(competitor = %ticket.id, error = %failure, "lookup failed");
                LabelState::Failed(failure)
            }
        };
        true
    }

    /// Resolve every pending reference right away.
    pub fn resolve_labels(&mut self, lookup: &dyn ReferenceLookup) {
        for ticket in self.request_lookups() {
            let result = lookup.lookup(ticket.source, &ticket.id);
            self.complete_lookup(&ticket, result);
        }
    }

    fn check_column(&self, column: &ColumnSpec) -> Result<(), SchemaError> {
        if self.column(&column.key).is_some() {
            return Err(SchemaError::DuplicateColumn {
                key: column.key.clone(),
            });
        }
        if column.is_tombstone() {
            return Ok(());
        }
        match &column.path {
            None if column.kind.is_field_bound() => Err(SchemaError::MissingPath {
                key: column.key.clone(),
            }),
            None => Ok(()),
            Some(path) => {
                let overlapping = self.columns.iter().find(|existing| {
                    existing
                        .path
                        .as_ref()
                        .is_some_and(|other| other.overlaps(path))
                });
                match overlapping {
                    Some(existing) => Err(SchemaError::OverlappingPaths {
                        first: existing.key.clone(),
                        second: column.key.clone(),
                    }),
                    None => Ok(()),
                }
            }
        }
    }

    fn live_row_mut(&mut self, id: RowId) -> Result<&mut Row, EditError> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id() == id)
            .ok_or(EditError::UnknownRow(id))?;
        if row.is_deleted() {
            return Err(EditError::DeletedRow(id));
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tally_model::{CellValue, DurationConfig, FieldPath, ReferenceConfig};

    use super::*;

    fn key(name: &str) -> ColumnKey {
        ColumnKey::new(name).unwrap()
    }

    fn id(name: &str) -> CompetitorId {
        CompetitorId::new(name).unwrap()
    }

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("record must be an object"),
        }
    }

    fn race_table(competitors: &[&str]) -> (Table, Vec<RowId>) {
        let mut table = Table::new(vec![
            ColumnSpec::new(
                key("competitor"),
                CellKind::Reference(ReferenceConfig::default()),
                None,
                "Athlete",
            ),
            ColumnSpec::field(
                key("finish_time"),
                CellKind::Duration(DurationConfig::default()),
                "Finish Time",
            ),
            ColumnSpec::tombstone(),
        ])
        .unwrap();
        let ids = competitors
            .iter()
            .map(|name| table.append_row(id(name), Map::new()))
            .collect();
        (table, ids)
    }

    #[test]
    fn schema_rejects_duplicates_and_overlaps() {
        let (mut table, _) = race_table(&[]);
        assert_eq!(
            table.append_column(ColumnSpec::field(key("finish_time"), CellKind::Text, "x")),
            Err(SchemaError::DuplicateColumn {
                key: key("finish_time")
            })
        );
        assert_eq!(
            table.append_column(ColumnSpec::new(
                key("split"),
                CellKind::Text,
                Some(FieldPath::parse("finish_time.split").unwrap()),
                "Split",
            )),
            Err(SchemaError::OverlappingPaths {
                first: key("finish_time"),
                second: key("split"),
            })
        );
        assert_eq!(
            table.append_column(ColumnSpec::new(key("note"), CellKind::Text, None, "Note")),
            Err(SchemaError::MissingPath { key: key("note") })
        );
        assert_eq!(table.columns().len(), 3);
    }

    #[test]
    fn rows_are_appended_in_order() {
        let (table, rows) = race_table(&["a", "b", "c"]);
        let order: Vec<RowId> = table.value().iter().map(|value| value.row).collect();
        assert_eq!(order, rows);
        assert!(rows.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn delete_row_keeps_siblings() {
        let (mut table, rows) = race_table(&["a", "b", "c"]);
        table
            .on_cell_changed(rows[2], &key("finish_time"), CellInput::text("9"))
            .unwrap();
        table.delete_row(rows[1]).unwrap();
        let values = table.value();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].row, rows[0]);
        assert_eq!(values[1].row, rows[2]);
        assert_eq!(values[1].get("finish_time"), Some(&CellValue::Duration(9_000)));
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.delete_row(rows[1]), Err(EditError::DeletedRow(rows[1])));
    }

    #[test]
    fn tombstone_edit_deletes_row() {
        let (mut table, rows) = race_table(&["a", "b"]);
        let event = table
            .on_cell_changed(rows[0], &ColumnKey::tombstone(), CellInput::Activate)
            .unwrap();
        assert_eq!(event, CellEvent::DeleteRequested);
        assert!(table.row(rows[0]).unwrap().is_deleted());
        assert_eq!(table.value().len(), 1);
    }

    #[test]
    fn rejected_edit_changes_nothing() {
        let (mut table, rows) = race_table(&["a"]);
        table
            .on_cell_changed(rows[0], &key("finish_time"), CellInput::text("1:00"))
            .unwrap();
        let before = table.value();
        let err = table
            .on_cell_changed(rows[0], &key("finish_time"), CellInput::text("1:0x"))
            .unwrap_err();
        assert!(matches!(err, EditError::Validation(ValidationError::Duration(_))));
        assert_eq!(table.value(), before);
        assert_eq!(
            table.on_cell_changed(rows[0], &key("nope"), CellInput::Clear),
            Err(EditError::UnknownColumn(key("nope")))
        );
    }

    #[test]
    fn append_column_backfills_existing_rows() {
        let mut table = Table::new(vec![ColumnSpec::new(
            key("competitor"),
            CellKind::Reference(ReferenceConfig::default()),
            None,
            "Athlete",
        )])
        .unwrap();
        let a = table.append_row(id("a"), record(json!({"DNF": true})));
        let b = table.append_row(id("b"), Map::new());

        table
            .on_cell_changed(b, &key("competitor"), CellInput::text("c"))
            .unwrap();
        table
            .append_column(ColumnSpec::field(key("DNF"), CellKind::Flag, "DNF"))
            .unwrap();

        for row in table.rows() {
            assert_eq!(row.cells().len(), 2);
        }
        assert_eq!(table.cell(a, &key("DNF")).unwrap().value(), Some(CellValue::Flag(true)));
        assert_eq!(table.cell(b, &key("DNF")).unwrap().value(), None);
        // Earlier edits survive the back-fill.
        assert_eq!(table.row(b).unwrap().competitor().as_str(), "c");
    }

    #[test]
    fn duplicates_follow_reference_edits() {
        let (mut table, rows) = race_table(&["a", "a", "b"]);
        let flags = |table: &Table| -> Vec<bool> {
            table.rows().iter().map(Row::is_duplicated).collect()
        };
        assert_eq!(flags(&table), [true, true, false]);

        table
            .on_cell_changed(rows[1], &key("competitor"), CellInput::text("c"))
            .unwrap();
        assert_eq!(flags(&table), [false, false, false]);

        table
            .on_cell_changed(rows[2], &key("competitor"), CellInput::text("a"))
            .unwrap();
        assert_eq!(flags(&table), [true, false, true]);

        // Deleting one of the pair clears the other.
        table.delete_row(rows[0]).unwrap();
        assert_eq!(flags(&table), [false, false, false]);
    }

    #[test]
    fn swapping_moves_results_between_competitors() {
        let mut table = race_table(&[]).0;
        let a = table.append_row(id("a"), record(json!({"finish_time": 1000, "_lane": 1})));
        let b = table.append_row(id("b"), record(json!({"finish_time": 2000})));

        assert_eq!(table.swap_competitors(a, b), Ok(true));
        assert_eq!(table.row(a).unwrap().competitor(), &id("b"));
        assert_eq!(table.row(b).unwrap().competitor(), &id("a"));
        assert!(table.duplicated_competitors().is_empty());

        let results = table.results().unwrap();
        assert_eq!(results["b"], json!({"finish_time": 1000, "_lane": 1}));
        assert_eq!(results["a"], json!({"finish_time": 2000}));

        assert_eq!(table.swap_competitors(a, a), Ok(false));
        table.delete_row(b).unwrap();
        assert_eq!(table.swap_competitors(a, b), Err(EditError::DeletedRow(b)));
    }

    #[test]
    fn results_refuse_duplicate_keys() {
        let (table, _) = race_table(&["a", "a"]);
        assert_eq!(
            table.results(),
            Err(EditError::Validation(ValidationError::DuplicateCompetitors {
                competitors: vec![id("a")]
            }))
        );
    }

    #[test]
    fn navigation_wraps_and_skips_deleted_rows() {
        let (mut table, rows) = race_table(&["a", "b", "c", "d"]);
        assert_eq!(table.navigate(Direction::Next), None);

        assert!(table.focus(rows[0], 1));
        table.delete_row(rows[1]).unwrap();

        let next = table.navigate(Direction::Next).unwrap();
        assert_eq!(next, Focus { row: rows[2], column: 1 });
        assert_eq!(table.row(rows[2]).unwrap().focused(), Some(1));
        assert_eq!(table.row(rows[0]).unwrap().focused(), None);

        table.navigate(Direction::Next);
        let wrapped = table.navigate(Direction::Next).unwrap();
        assert_eq!(wrapped.row, rows[0]);

        let back = table.navigate(Direction::Previous).unwrap();
        assert_eq!(back.row, rows[3]);
    }

    #[test]
    fn stale_lookups_are_dropped() {
        let (mut table, rows) = race_table(&["a", "b", "c"]);
        let tickets = table.request_lookups();
        assert_eq!(tickets.len(), 3);
        assert!(table.request_lookups().is_empty());

        let label = |name: &str| Label {
            display_name: name.to_string(),
            group_id: None,
            group_color: None,
        };

        // Row b is renamed and row c deleted before their lookups return.
        table
            .on_cell_changed(rows[1], &key("competitor"), CellInput::text("z"))
            .unwrap();
        table.delete_row(rows[2]).unwrap();

        assert!(table.complete_lookup(&tickets[0], Ok(label("A"))));
        assert!(!table.complete_lookup(&tickets[1], Ok(label("B"))));
        assert!(!table.complete_lookup(&tickets[2], Ok(label("C"))));

        let view = |row| match table.cell(row, &key("competitor")) {
            Some(Cell::Reference(reference)) => reference.label_state().clone(),
            _ => panic!("not a reference cell"),
        };
        assert_eq!(view(rows[0]), LabelState::Resolved(label("A")));
        assert_eq!(view(rows[1]), LabelState::Unresolved);

        // The renamed cell gets a fresh ticket.
        let retry = table.request_lookups();
        assert_eq!(retry.len(), 1);
        assert_eq!(retry[0].id, id("z"));
        assert!(table.complete_lookup(
            &retry[0],
            Err(LookupFailure::NotFound { id: id("z") })
        ));
        assert_eq!(
            table.cell(rows[1], &key("competitor")).unwrap().view().to_string(),
            "z"
        );
    }
}
