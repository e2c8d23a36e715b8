//! A row: one competitor's record and the cells bound to it.

use serde_json::{Map, Value};
use tally_model::{CellKind, CellValue, ColumnKey, CompetitorId, FieldPath, RowId};

use crate::cell::{Cell, CellEvent, CellInput};
use crate::error::{EditError, PathError};
use crate::resolve;

/// A cell together with the column it was created for.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundCell {
    key: ColumnKey,
    path: Option<FieldPath>,
    /// Bumped whenever the cell is rebuilt or renamed.
    generation: u64,
    cell: Cell,
}

impl BoundCell {
    pub fn key(&self) -> &ColumnKey {
        &self.key
    }

    pub fn path(&self) -> Option<&FieldPath> {
        self.path.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }
}

/// Materialized row: column key to value, unset cells omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct RowValue {
    pub row: RowId,
    pub competitor: CompetitorId,
    pub values: Vec<(ColumnKey, CellValue)>,
}

impl RowValue {
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.values
            .iter()
            .find(|(column, _)| column.as_str() == key)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone)]
pub struct Row {
    id: RowId,
    competitor: CompetitorId,
    /// Record as loaded; edits live in the cells until materialization.
    record: Value,
    cells: Vec<BoundCell>,
    next_generation: u64,
    deleted: bool,
    duplicated: bool,
    focused: Option<usize>,
}

impl Row {
    pub fn new(id: RowId, competitor: CompetitorId, record: Map<String, Value>) -> Self {
        Self {
            id,
            competitor,
            record: Value::Object(record),
            cells: Vec::new(),
            next_generation: 0,
            deleted: false,
            duplicated: false,
            focused: None,
        }
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn competitor(&self) -> &CompetitorId {
        &self.competitor
    }

    pub fn record(&self) -> &Value {
        &self.record
    }

    pub fn cells(&self) -> &[BoundCell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<&BoundCell> {
        self.cells.get(index)
    }

    pub fn position(&self, key: &ColumnKey) -> Option<usize> {
        self.cells.iter().position(|bound| &bound.key == key)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn is_duplicated(&self) -> bool {
        self.duplicated
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Bind a new cell at the end of the row.
    ///
    /// The tombstone column gets a delete button that removes this row when
    /// activated. Reference cells are bound to the competitor id, all others
    /// to `path` inside the record.
    pub fn append_cell(&mut self, kind: &CellKind, path: Option<&FieldPath>, key: &ColumnKey) {
        let cell = self.build_cell(kind, path, key);
        let generation = self.bump_generation();
        self.cells.push(BoundCell {
            key: key.clone(),
            path: path.cloned(),
            generation,
            cell,
        });
    }

    /// Recreate the cell at `index` from the record, discarding its edits.
    /// Sibling cells are untouched.
    pub fn rebuild_cell(&mut self, index: usize, kind: &CellKind) -> bool {
        let Some(bound) = self.cells.get(index) else {
            return false;
        };
        let cell = self.build_cell(kind, bound.path.as_ref(), &bound.key);
        let generation = self.bump_generation();
        let bound = &mut self.cells[index];
        bound.cell = cell;
        bound.generation = generation;
        true
    }

    /// `None` once the row is deleted, so the table can skip it.
    pub fn value(&self) -> Option<RowValue> {
        if self.deleted {
            return None;
        }
        let values = self
            .cells
            .iter()
            .filter(|bound| !bound.key.is_tombstone())
            .filter_map(|bound| Some((bound.key.clone(), bound.cell.value()?)))
            .collect();
        Some(RowValue {
            row: self.id,
            competitor: self.competitor.clone(),
            values,
        })
    }

    /// The record with every bound cell written back through its path.
    ///
    /// Unset cells delete their path; keys no column covers are kept.
    pub fn materialize(&self) -> Result<Option<Value>, PathError> {
        if self.deleted {
            return Ok(None);
        }
        let mut record = self.record.clone();
        for bound in &self.cells {
            let Some(path) = &bound.path else {
                continue;
            };
            match bound.cell.value() {
                Some(value) => {
                    resolve::set(&mut record, path.segments(), value.to_json())?;
                }
                None => {
                    resolve::delete(&mut record, path.segments())?;
                }
            }
        }
        Ok(Some(record))
    }

    /// Route one input to the cell of column `key`.
    pub fn apply(&mut self, key: &ColumnKey, input: CellInput) -> Result<CellEvent, EditError> {
        if self.deleted {
            return Err(EditError::DeletedRow(self.id));
        }
        let index = self
            .position(key)
            .ok_or_else(|| EditError::UnknownColumn(key.clone()))?;
        let event = self.cells[index].cell.apply(input)?;

        match &event {
            CellEvent::DeleteRequested => self.delete(),
            CellEvent::Changed { .. } => {
                if let Cell::Reference(reference) = &self.cells[index].cell {
                    self.competitor = reference.id().clone();
                    let generation = self.bump_generation();
                    self.cells[index].generation = generation;
                }
            }
            CellEvent::Unchanged => {}
        }
        Ok(event)
    }

    pub fn delete(&mut self) {
        self.deleted = true;
        self.duplicated = false;
        self.focused = None;
    }

    /// Move input focus to the cell at `index`.
    pub fn focus(&mut self, index: usize) -> bool {
        if self.deleted || index >= self.cells.len() {
            return false;
        }
        self.focused = Some(index);
        true
    }

    pub(crate) fn blur(&mut self) {
        self.focused = None;
    }

    pub(crate) fn set_duplicated(&mut self, duplicated: bool) {
        self.duplicated = duplicated && !self.deleted;
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> Option<&mut BoundCell> {
        self.cells.get_mut(index)
    }

    fn build_cell(&self, kind: &CellKind, path: Option<&FieldPath>, key: &ColumnKey) -> Cell {
        if key.is_tombstone() {
            return Cell::Tombstone;
        }
        match kind {
            CellKind::Reference(config) => Cell::reference(*config, self.competitor.clone()),
            _ => {
                let stored = path.and_then(|path| {
                    resolve::get(&self.record, path.segments())
                        .ok()
                        .flatten()
                });
                Cell::bind(kind, stored)
            }
        }
    }

    fn bump_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

impl BoundCell {
    pub(crate) fn cell_mut(&mut self) -> &mut Cell {
        &mut self.cell
    }
}
