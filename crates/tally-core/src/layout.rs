//! Column layouts per event type.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde_json::Value;
use tally_model::{
    CellKind, ColumnKey, ColumnSpec, CompetitorType, CountConfig, DurationConfig, EventDocument,
    EventType, FieldPath, ModelError, ReferenceConfig, ReferenceSource,
};

use crate::settings::EditingSettings;

pub const COMPETITOR_COLUMN: &str = "competitor";
pub const HEIGHTS_KEY: &str = "heights";

/// Race status flags, in display order.
const RACE_FLAGS: [&str; 3] = ["DNF", "DNS", "DQ"];

/// Schema for `document`, decided by its event type.
///
/// Every layout starts with the competitor column and ends with the
/// tombstone column.
pub fn columns_for(
    document: &EventDocument,
    settings: &EditingSettings,
) -> Result<Vec<ColumnSpec>, ModelError> {
    let mut columns = vec![competitor_column(&document.competitor_type())?];

    match document.event_type() {
        EventType::Race => {
            columns.push(ColumnSpec::field(
                ColumnKey::new("finish_time")?,
                CellKind::Duration(DurationConfig {
                    unit: settings.duration_unit,
                }),
                "Finish Time",
            ));
            for flag in RACE_FLAGS {
                columns.push(ColumnSpec::field(ColumnKey::new(flag)?, CellKind::Flag, flag));
            }
        }
        EventType::HighJump => {
            for height in heights(document) {
                columns.push(height_column(&height, settings)?);
            }
        }
        EventType::BonusPoints => {
            columns.push(ColumnSpec::field(
                ColumnKey::new("points")?,
                CellKind::Count(CountConfig::at_least(settings.count_min)),
                "Points",
            ));
            columns.push(ColumnSpec::field(ColumnKey::new("note")?, CellKind::Text, "Note"));
        }
        EventType::Other(_) => {}
    }

    columns.push(ColumnSpec::tombstone());
    Ok(columns)
}

/// Attempts column for one bar height, keyed `heights.<height>`.
pub fn height_column(height: &str, settings: &EditingSettings) -> Result<ColumnSpec, ModelError> {
    let path = FieldPath::new([HEIGHTS_KEY, height])?;
    Ok(ColumnSpec::new(
        ColumnKey::new(path.to_string())?,
        CellKind::Attempts(settings.attempts()),
        Some(path),
        format!("{height} mm"),
    ))
}

fn competitor_column(competitor_type: &CompetitorType) -> Result<ColumnSpec, ModelError> {
    let (source, heading) = match competitor_type {
        CompetitorType::Team => (ReferenceSource::Teams, "Team"),
        _ => (ReferenceSource::Athletes, "Athlete"),
    };
    Ok(ColumnSpec::new(
        ColumnKey::new(COMPETITOR_COLUMN)?,
        CellKind::Reference(ReferenceConfig { source }),
        None,
        heading,
    ))
}

/// Every height recorded by any competitor.
///
/// Sorted numerically when all heights are numbers, lexically otherwise.
pub fn heights(document: &EventDocument) -> Vec<String> {
    let mut heights: Vec<String> = document
        .results()
        .filter_map(|(_, record)| record.get(HEIGHTS_KEY).and_then(Value::as_object))
        .flat_map(|heights| heights.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if heights.iter().all(|height| height.parse::<f64>().is_ok()) {
        heights.sort_by(|a, b| {
            let (a, b) = (a.parse::<f64>(), b.parse::<f64>());
            match (a, b) {
                (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            }
        });
    }
    heights
}
