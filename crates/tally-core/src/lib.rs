//! Binding core of the tally result editor.
//!
//! An event document's `results` object is bound to a [`Table`]: one [`Row`]
//! per competitor, one typed [`Cell`] per column. Cells edit their own values
//! and the table regenerates `results` from them, leaving every field it does
//! not know about in place.
//!
//! [`EditorSession`] ties a table to its document, settings and key map, and
//! hands finished documents to a [`Persistence`] implementation.

pub mod cell;
pub mod directory;
pub mod duplicates;
pub mod editor;
pub mod error;
pub mod keymap;
pub mod layout;
pub mod lookup;
pub mod persist;
pub mod resolve;
pub mod row;
pub mod settings;
pub mod table;

pub use cell::{Cell, CellEvent, CellInput, CellView};
pub use directory::{CompetitorDirectory, DirectoryError};
pub use duplicates::duplicated_ids;
pub use editor::{EditorSession, SaveOutcome, SessionError};
pub use error::{EditError, PathError, SchemaError, ValidationError};
pub use keymap::{EditorAction, KeyChord, KeyChordError, KeyMap, KeyPreset};
pub use lookup::{Label, LabelState, LookupFailure, LookupTicket, ReferenceLookup, Rgb};
pub use persist::{JsonFileStore, Persistence, PersistenceError};
pub use row::{BoundCell, Row, RowValue};
pub use settings::{EditorSettings, SettingsError, load_settings, save_settings, settings_path};
pub use table::{Direction, Focus, OpaqueEntry, Table};
