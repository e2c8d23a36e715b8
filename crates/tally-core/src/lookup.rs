//! Reference labels: resolving a competitor id to a name and group colour.
//!
//! Resolution is asynchronous from the table's point of view. The table hands
//! out [`LookupTicket`]s, the caller resolves them however it likes and
//! returns each result through `Table::complete_lookup`. A ticket whose cell
//! was rebuilt, renamed or deleted in the meantime is ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tally_model::{ColumnKey, CompetitorId, ReferenceSource, RowId};

/// Text drawn on a group colour darker than this is white.
const BRIGHTNESS_THRESHOLD: u32 = 125;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupFailure {
    #[error("no entry for {id}")]
    NotFound { id: CompetitorId },

    #[error("lookup unavailable: {reason}")]
    Unavailable { reason: String },
}

/// An sRGB colour written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Perceived brightness on a 0-255 scale.
    pub fn brightness(self) -> u32 {
        (299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b)) / 1000
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0:?} is not a #rrggbb colour")]
pub struct InvalidColor(String);

impl FromStr for Rgb {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel =
            |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// What a reference cell displays once its id is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub display_name: String,
    pub group_id: Option<String>,
    pub group_color: Option<Rgb>,
}

impl Label {
    /// Readable text colour over the group colour, if there is one.
    pub fn text_color(&self) -> Option<Rgb> {
        self.group_color.map(|color| {
            if color.brightness() < BRIGHTNESS_THRESHOLD {
                Rgb::WHITE
            } else {
                Rgb::BLACK
            }
        })
    }
}

/// Resolves reference ids to labels. Each id may fail on its own.
pub trait ReferenceLookup {
    fn lookup(&self, source: ReferenceSource, id: &CompetitorId) -> Result<Label, LookupFailure>;
}

/// Resolution state of a reference cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LabelState {
    #[default]
    Unresolved,
    Pending,
    Resolved(Label),
    /// Shown as the raw id with fallback styling.
    Failed(LookupFailure),
}

/// A pending resolution for one reference cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub(crate) row: RowId,
    pub(crate) column: ColumnKey,
    pub(crate) generation: u64,
    pub source: ReferenceSource,
    pub id: CompetitorId,
}

impl LookupTicket {
    pub fn row(&self) -> RowId {
        self.row
    }

    pub fn column(&self) -> &ColumnKey {
        &self.column
    }
}
