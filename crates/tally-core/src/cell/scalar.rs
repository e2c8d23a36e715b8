//! Single-value cells: duration, count, flag and free text.

use tally_codec::{format_duration, parse_duration};
use tally_model::{CountConfig, DurationConfig};

use crate::error::ValidationError;

/// Elapsed time stored as whole ticks of the column's unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationCell {
    pub(crate) config: DurationConfig,
    pub(crate) ticks: Option<u64>,
}

impl DurationCell {
    pub fn new(config: DurationConfig, ticks: Option<u64>) -> Self {
        Self { config, ticks }
    }

    pub fn ticks(&self) -> Option<u64> {
        self.ticks
    }

    /// Canonical text; empty when unset.
    pub fn text(&self) -> String {
        self.ticks
            .map(|ticks| format_duration(ticks, self.config.unit))
            .unwrap_or_default()
    }

    /// Returns whether the value changed.
    pub(crate) fn enter(&mut self, text: &str) -> Result<bool, ValidationError> {
        let ticks = parse_duration(text, self.config.unit)?;
        Ok(replace(&mut self.ticks, ticks))
    }
}

/// Whole number with optional inclusive bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountCell {
    pub(crate) config: CountConfig,
    pub(crate) count: Option<i64>,
}

impl CountCell {
    pub fn new(config: CountConfig, count: Option<i64>) -> Self {
        Self { config, count }
    }

    pub fn count(&self) -> Option<i64> {
        self.count
    }

    pub fn text(&self) -> String {
        self.count.map(|count| count.to_string()).unwrap_or_default()
    }

    pub(crate) fn enter(&mut self, text: &str) -> Result<bool, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(replace(&mut self.count, None));
        }
        let value: i64 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
            input: trimmed.to_string(),
        })?;
        if !self.config.contains(value) {
            return Err(ValidationError::OutOfRange {
                value,
                range: describe_range(&self.config),
            });
        }
        Ok(replace(&mut self.count, Some(value)))
    }
}

/// Checkbox. Unchecked is stored as absence, never as `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagCell {
    pub(crate) checked: bool,
}

impl FlagCell {
    pub fn new(checked: bool) -> Self {
        Self { checked }
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub(crate) fn check(&mut self, checked: bool) -> bool {
        let changed = self.checked != checked;
        self.checked = checked;
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCell {
    pub(crate) text: Option<String>,
}

impl TextCell {
    pub fn new(text: Option<String>) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Empty text clears the cell.
    pub(crate) fn enter(&mut self, text: &str) -> bool {
        let text = (!text.is_empty()).then(|| text.to_string());
        replace(&mut self.text, text)
    }
}

fn replace<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn describe_range(config: &CountConfig) -> String {
    match (config.min, config.max) {
        (Some(min), Some(max)) => format!("{min}..={max}"),
        (Some(min), None) => format!("{min}.."),
        (None, Some(max)) => format!("..={max}"),
        (None, None) => "..".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use tally_codec::DurationError;
    use tally_model::DurationUnit;

    use super::*;

    #[test]
    fn duration_entry_is_atomic() {
        let mut cell = DurationCell::new(DurationConfig::default(), Some(5_000));
        let err = cell.enter("1:xx").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Duration(DurationError::InvalidNumber { .. })
        ));
        assert_eq!(cell.ticks(), Some(5_000));

        assert_eq!(cell.enter("5"), Ok(false));
        assert_eq!(cell.enter("1:02:03.5"), Ok(true));
        assert_eq!(cell.text(), "1:02:03.5");
        assert_eq!(cell.enter(""), Ok(true));
        assert_eq!(cell.ticks(), None);
    }

    #[test]
    fn microsecond_columns_keep_six_digits() {
        let mut cell = DurationCell::new(
            DurationConfig {
                unit: DurationUnit::Microseconds,
            },
            None,
        );
        cell.enter("9.000001").unwrap();
        assert_eq!(cell.ticks(), Some(9_000_001));
    }

    #[test]
    fn count_rejects_instead_of_clamping() {
        let mut cell = CountCell::new(CountConfig::at_least(1), Some(2));
        assert_eq!(
            cell.enter("0"),
            Err(ValidationError::OutOfRange {
                value: 0,
                range: "1..".to_string()
            })
        );
        assert_eq!(
            cell.enter("two"),
            Err(ValidationError::NotANumber {
                input: "two".to_string()
            })
        );
        assert_eq!(cell.count(), Some(2));
        assert_eq!(cell.enter(" 3 "), Ok(true));
        assert_eq!(cell.text(), "3");
    }

    #[test]
    fn empty_text_clears() {
        let mut cell = TextCell::new(Some("late start".to_string()));
        assert!(cell.enter(""));
        assert_eq!(cell.text, None);
        assert!(!cell.enter(""));
    }
}
