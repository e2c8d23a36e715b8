//! Elapsed-time text codec.
//!
//! Text form is `[[H:]MM:]SS[.fff]`. Values are whole ticks of a fixed
//! [`DurationUnit`]; the fractional part may carry at most as many digits as
//! the unit resolves, so parsing is exact.
//!
//! Canonical formatting:
//! - zero-valued leading units are omitted (`5`, not `0:05`)
//! - minutes and seconds are padded to two digits only after a higher unit
//! - the fraction drops trailing zeros and disappears when zero

use tally_model::DurationUnit;
use thiserror::Error;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("too many `:` separated parts in {input:?}; expected [[H:]MM:]SS[.fff]")]
    TooManyParts { input: String },

    #[error("{part:?} is not a whole number in {input:?}")]
    InvalidNumber { input: String, part: String },

    #[error("more than {max} digits after the decimal point in {input:?}")]
    FractionTooLong { input: String, max: usize },

    #[error("duration {input:?} is too large")]
    Overflow { input: String },
}

/// Parse duration text into ticks. Blank text means "no value".
pub fn parse_duration(input: &str, unit: DurationUnit) -> Result<Option<u64>, DurationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    if parts.len() > 3 {
        return Err(DurationError::TooManyParts {
            input: trimmed.to_string(),
        });
    }

    let Some((seconds_part, higher)) = parts.split_last() else {
        return Ok(None);
    };
    let (whole, fraction) = match seconds_part.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (*seconds_part, None),
    };

    let mut total_seconds = whole_number(trimmed, whole)?;
    let multipliers = [SECONDS_PER_MINUTE, SECONDS_PER_HOUR];
    for (part, multiplier) in higher.iter().rev().zip(multipliers) {
        let value = whole_number(trimmed, part)?;
        total_seconds = value
            .checked_mul(multiplier)
            .and_then(|scaled| scaled.checked_add(total_seconds))
            .ok_or_else(|| overflow(trimmed))?;
    }

    let fraction_ticks = match fraction {
        Some(digits) => fraction_ticks(trimmed, digits, unit)?,
        None => 0,
    };

    total_seconds
        .checked_mul(unit.ticks_per_second())
        .and_then(|ticks| ticks.checked_add(fraction_ticks))
        .map(Some)
        .ok_or_else(|| overflow(trimmed))
}

/// Format ticks in canonical form.
pub fn format_duration(ticks: u64, unit: DurationUnit) -> String {
    let per_second = unit.ticks_per_second();
    let total_seconds = ticks / per_second;
    let sub_second = ticks % per_second;

    let hours = total_seconds / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total_seconds % SECONDS_PER_MINUTE;

    let mut out = if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else if minutes > 0 {
        format!("{minutes}:{seconds:02}")
    } else {
        seconds.to_string()
    };

    if sub_second > 0 {
        let digits = format!("{sub_second:0width$}", width = unit.fraction_digits());
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out
}

fn whole_number(input: &str, part: &str) -> Result<u64, DurationError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DurationError::InvalidNumber {
            input: input.to_string(),
            part: part.to_string(),
        });
    }
    part.parse().map_err(|_| overflow(input))
}

fn fraction_ticks(input: &str, digits: &str, unit: DurationUnit) -> Result<u64, DurationError> {
    let max = unit.fraction_digits();
    if digits.len() > max {
        return Err(DurationError::FractionTooLong {
            input: input.to_string(),
            max,
        });
    }
    let value = whole_number(input, digits)?;
    let scale = 10u64.pow((max - digits.len()) as u32);
    Ok(value * scale)
}

fn overflow(input: &str) -> DurationError {
    DurationError::Overflow {
        input: input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: DurationUnit = DurationUnit::Milliseconds;
    const US: DurationUnit = DurationUnit::Microseconds;

    #[test]
    fn parses_all_shapes() {
        assert_eq!(parse_duration("5", MS), Ok(Some(5_000)));
        assert_eq!(parse_duration("1:05", MS), Ok(Some(65_000)));
        assert_eq!(parse_duration("1:02:03.500", MS), Ok(Some(3_723_500)));
        assert_eq!(parse_duration("1:02:03.5", MS), Ok(Some(3_723_500)));
        assert_eq!(parse_duration("0.000001", US), Ok(Some(1)));
        assert_eq!(parse_duration("  57:52.12 ", MS), Ok(Some(3_472_120)));
    }

    #[test]
    fn blank_means_absent() {
        assert_eq!(parse_duration("", MS), Ok(None));
        assert_eq!(parse_duration("   ", US), Ok(None));
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(matches!(
            parse_duration("1:2:3:4", MS),
            Err(DurationError::TooManyParts { .. })
        ));
        assert!(matches!(
            parse_duration("1:x", MS),
            Err(DurationError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_duration("1.5:00", MS),
            Err(DurationError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_duration("-5", MS),
            Err(DurationError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_duration("5.", MS),
            Err(DurationError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn rejects_fraction_beyond_unit() {
        assert_eq!(
            parse_duration("1.2345", MS),
            Err(DurationError::FractionTooLong {
                input: "1.2345".to_string(),
                max: 3,
            })
        );
        assert_eq!(parse_duration("1.234567", US), Ok(Some(1_234_567)));
        assert!(parse_duration("1.2345678", US).is_err());
    }

    #[test]
    fn overflow_is_an_error() {
        assert!(matches!(
            parse_duration("99999999999999999999", MS),
            Err(DurationError::Overflow { .. })
        ));
        assert!(matches!(
            parse_duration("9999999999999999:00:00", MS),
            Err(DurationError::Overflow { .. })
        ));
    }

    #[test]
    fn formats_canonically() {
        assert_eq!(format_duration(0, MS), "0");
        assert_eq!(format_duration(5_000, MS), "5");
        assert_eq!(format_duration(65_000, MS), "1:05");
        assert_eq!(format_duration(3_605_000, MS), "1:00:05");
        assert_eq!(format_duration(3_723_500, MS), "1:02:03.5");
        assert_eq!(format_duration(3_472_120, MS), "57:52.12");
        assert_eq!(format_duration(1, US), "0.000001");
    }
}
