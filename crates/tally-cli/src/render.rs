//! Terminal rendering of tables and check reports.

use std::collections::BTreeMap;
use std::fmt;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{
    Attribute, Cell as TableCell, CellAlignment, Color, ContentArrangement, Table as TextTable,
};
use tally_core::{CellView, LabelState, OpaqueEntry, Rgb, Table};
use tally_model::{CellKind, CompetitorId, RowId};

pub fn apply_table_style(table: &mut TextTable) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// One line per live row; the tombstone column is left out.
pub fn results_table(table: &Table) -> TextTable {
    let visible: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, column)| !column.is_tombstone())
        .map(|(index, _)| index)
        .collect();

    let mut text = TextTable::new();
    text.set_header(
        visible
            .iter()
            .map(|&index| header_cell(&table.columns()[index].heading)),
    );
    apply_table_style(&mut text);
    for (position, &index) in visible.iter().enumerate() {
        let alignment = match table.columns()[index].kind {
            CellKind::Duration(_) | CellKind::Count(_) => CellAlignment::Right,
            CellKind::Flag => CellAlignment::Center,
            _ => CellAlignment::Left,
        };
        if let Some(column) = text.column_mut(position) {
            column.set_cell_alignment(alignment);
        }
    }

    for row in table.live_rows() {
        let cells = visible.iter().map(|&index| {
            let view = row.cell(index).map(|bound| bound.cell().view());
            match view {
                Some(view) => view_cell(&view, row.is_duplicated()),
                None => TableCell::new(""),
            }
        });
        text.add_row(cells);
    }
    text
}

fn view_cell(view: &CellView, duplicated: bool) -> TableCell {
    let cell = TableCell::new(view.to_string());
    match view {
        CellView::Reference { label, .. } => {
            let cell = match label {
                LabelState::Resolved(label) => match label.group_color {
                    Some(color) => cell.bg(to_color(color)).fg(to_color(
                        label.text_color().unwrap_or(Rgb::BLACK),
                    )),
                    None => cell,
                },
                LabelState::Failed(_) => cell.add_attribute(Attribute::Italic),
                LabelState::Unresolved | LabelState::Pending => cell,
            };
            if duplicated {
                cell.fg(Color::Red).add_attribute(Attribute::Bold)
            } else {
                cell
            }
        }
        CellView::ReadOnly { .. } => cell.fg(Color::DarkGrey),
        CellView::CreateButton => cell.fg(Color::DarkGrey),
        _ => cell,
    }
}

fn header_cell(label: &str) -> TableCell {
    TableCell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Problems that stop a document from being saved or read in full.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    /// Competitors held by more than one live row, with those rows.
    pub duplicates: BTreeMap<CompetitorId, Vec<RowId>>,
    pub opaque: Vec<OpaqueEntry>,
}

impl CheckReport {
    pub fn from_table(table: &Table) -> Self {
        let mut duplicates: BTreeMap<CompetitorId, Vec<RowId>> = BTreeMap::new();
        for row in table.live_rows().filter(|row| row.is_duplicated()) {
            duplicates
                .entry(row.competitor().clone())
                .or_default()
                .push(row.id());
        }
        Self {
            duplicates,
            opaque: table.opaque_cells(),
        }
    }

    /// Duplicates block saving; opaque values do not.
    pub fn has_errors(&self) -> bool {
        !self.duplicates.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.opaque.is_empty()
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return f.write_str("no problems found");
        }
        let mut lines = Vec::new();
        for (competitor, rows) in &self.duplicates {
            let rows: Vec<String> = rows.iter().map(ToString::to_string).collect();
            lines.push(format!(
                "error: competitor {competitor} appears in rows {}",
                rows.join(", ")
            ));
        }
        for entry in &self.opaque {
            lines.push(format!(
                "warning: {} of {} is read-only, stored value {}",
                entry.column, entry.competitor, entry.raw
            ));
        }
        f.write_str(&lines.join("\n"))
    }
}
