//! Cell assignments given on the command line.

use std::fmt;
use std::str::FromStr;

use tally_core::CellInput;
use tally_model::{CellKind, ColumnKey, CompetitorId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error("expected COMPETITOR.COLUMN=TEXT, got {0:?}")]
    Syntax(String),

    #[error("competitor and column must not be empty in {0:?}")]
    EmptyPart(String),

    #[error("{text:?} is not a flag value; use true or false")]
    InvalidFlag { text: String },

    #[error("column {column} cannot be set from text")]
    NotEditable { column: ColumnKey },

    #[error("expected FIRST=SECOND competitor ids, got {0:?}")]
    SwapSyntax(String),
}

/// `COMPETITOR.COLUMN=TEXT`.
///
/// The competitor ends at the first `.`, so column keys such as
/// `heights.1000` may contain dots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAssignment {
    pub competitor: CompetitorId,
    pub column: ColumnKey,
    pub text: String,
}

impl FromStr for CellAssignment {
    type Err = AssignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, text) = s
            .split_once('=')
            .ok_or_else(|| AssignmentError::Syntax(s.to_string()))?;
        let (competitor, column) = target
            .split_once('.')
            .ok_or_else(|| AssignmentError::Syntax(s.to_string()))?;
        let empty = || AssignmentError::EmptyPart(s.to_string());
        Ok(Self {
            competitor: CompetitorId::new(competitor).map_err(|_| empty())?,
            column: ColumnKey::new(column).map_err(|_| empty())?,
            text: text.to_string(),
        })
    }
}

impl fmt::Display for CellAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}={}", self.competitor, self.column, self.text)
    }
}

impl CellAssignment {
    /// The input this assignment means for a cell of `kind`.
    ///
    /// Free text is passed on as written; every other kind is trimmed.
    pub fn input_for(&self, kind: &CellKind) -> Result<CellInput, AssignmentError> {
        if matches!(kind, CellKind::Text) {
            return Ok(match self.text.as_str() {
                "" => CellInput::Clear,
                text => CellInput::text(text),
            });
        }
        let text = self.text.trim();
        match kind {
            CellKind::Flag => parse_flag(text).map(CellInput::Check),
            CellKind::Tombstone => Err(AssignmentError::NotEditable {
                column: self.column.clone(),
            }),
            CellKind::Reference(_) => Ok(CellInput::text(text)),
            _ if text.is_empty() => Ok(CellInput::Clear),
            _ => Ok(CellInput::text(text)),
        }
    }
}

/// `FIRST=SECOND`: the two competitors trade results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitorSwap {
    pub first: CompetitorId,
    pub second: CompetitorId,
}

impl FromStr for CompetitorSwap {
    type Err = AssignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || AssignmentError::SwapSyntax(s.to_string());
        let (first, second) = s.split_once('=').ok_or_else(syntax)?;
        Ok(Self {
            first: CompetitorId::new(first).map_err(|_| syntax())?,
            second: CompetitorId::new(second).map_err(|_| syntax())?,
        })
    }
}

impl fmt::Display for CompetitorSwap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.first, self.second)
    }
}

fn parse_flag(text: &str) -> Result<bool, AssignmentError> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "x" | "1" => Ok(true),
        "false" | "no" | "" | "0" => Ok(false),
        _ => Err(AssignmentError::InvalidFlag {
            text: text.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use tally_model::{DurationConfig, DurationUnit};

    use super::*;

    fn assignment(s: &str) -> CellAssignment {
        s.parse().unwrap()
    }

    #[test]
    fn splits_at_the_first_dot() {
        let parsed = assignment("joe_biden.heights.1000=ffs");
        assert_eq!(parsed.competitor.as_str(), "joe_biden");
        assert_eq!(parsed.column.as_str(), "heights.1000");
        assert_eq!(parsed.text, "ffs");
        assert_eq!(parsed.to_string(), "joe_biden.heights.1000=ffs");
    }

    #[test]
    fn rejects_malformed_assignments() {
        assert!(matches!(
            "joe_biden=1".parse::<CellAssignment>(),
            Err(AssignmentError::Syntax(_))
        ));
        assert!(matches!(
            ".DNF=true".parse::<CellAssignment>(),
            Err(AssignmentError::EmptyPart(_))
        ));
    }

    #[test]
    fn inputs_follow_the_column_kind() {
        let duration = CellKind::Duration(DurationConfig {
            unit: DurationUnit::Milliseconds,
        });
        assert_eq!(
            assignment("a.finish_time=21:30").input_for(&duration),
            Ok(CellInput::text("21:30"))
        );
        assert_eq!(
            assignment("a.finish_time=").input_for(&duration),
            Ok(CellInput::Clear)
        );
        assert_eq!(
            assignment("a.DNF=Yes").input_for(&CellKind::Flag),
            Ok(CellInput::Check(true))
        );
        assert!(assignment("a.DNF=maybe").input_for(&CellKind::Flag).is_err());
        assert!(assignment("a.!delete=x").input_for(&CellKind::Tombstone).is_err());
    }

    #[test]
    fn swaps_name_two_competitors() {
        let swap: CompetitorSwap = "joe_biden=al_gore".parse().unwrap();
        assert_eq!(swap.first.as_str(), "joe_biden");
        assert_eq!(swap.second.as_str(), "al_gore");
        assert_eq!(swap.to_string(), "joe_biden=al_gore");
        assert!(matches!(
            "joe_biden".parse::<CompetitorSwap>(),
            Err(AssignmentError::SwapSyntax(_))
        ));
        assert!(matches!(
            "joe_biden=".parse::<CompetitorSwap>(),
            Err(AssignmentError::SwapSyntax(_))
        ));
    }

    #[test]
    fn free_text_keeps_its_whitespace() {
        assert_eq!(
            assignment("a.note=  lane 4 ").input_for(&CellKind::Text),
            Ok(CellInput::text("  lane 4 "))
        );
        assert_eq!(
            assignment("a.note= ").input_for(&CellKind::Text),
            Ok(CellInput::text(" "))
        );
        assert_eq!(
            assignment("a.note=").input_for(&CellKind::Text),
            Ok(CellInput::Clear)
        );
        let duration = CellKind::Duration(DurationConfig {
            unit: DurationUnit::Milliseconds,
        });
        assert_eq!(
            assignment("a.finish_time= 21:30 ").input_for(&duration),
            Ok(CellInput::text("21:30"))
        );
    }
}
