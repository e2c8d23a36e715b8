//! Text codecs for duration and attempt cells.
//!
//! Both directions are deterministic: canonical text parses to a value that
//! formats back to the same text.

pub mod attempts;
pub mod duration;

pub use attempts::{
    AttemptSequence, AttemptSlot, AttemptWarning, AttemptsError, ParsedAttempts, parse_attempts,
};
pub use duration::{DurationError, format_duration, parse_duration};
