//! Keyboard contract: which key chords trigger which editor actions.
//!
//! The binding table is configuration. Two presets match the two editor
//! front ends: `browser` moves between rows with Enter / Shift+Enter and
//! `desktop` with the arrow keys.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Editor operations reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorAction {
    NextRow,
    PreviousRow,
    Save,
    NewRow,
    Cancel,
}

impl EditorAction {
    pub const fn all() -> &'static [EditorAction] {
        &[
            Self::NextRow,
            Self::PreviousRow,
            Self::Save,
            Self::NewRow,
            Self::Cancel,
        ]
    }

    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::NextRow => "Next Row",
            Self::PreviousRow => "Previous Row",
            Self::Save => "Save",
            Self::NewRow => "New Row",
            Self::Cancel => "Cancel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyChordError {
    #[error("key chord is empty")]
    Empty,

    #[error("unknown modifier {0:?}")]
    UnknownModifier(String),
}

/// A key plus modifiers, written like `Ctrl+Shift+S`.
///
/// Single-character keys compare case-insensitively; named keys are
/// normalised (`esc` and `Escape` are the same key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn plain(key: &str) -> Self {
        Self {
            key: normalize_key(key),
            ctrl: false,
            shift: false,
            alt: false,
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    pub fn shift(key: &str) -> Self {
        Self {
            shift: true,
            ..Self::plain(key)
        }
    }
}

impl FromStr for KeyChord {
    type Err = KeyChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key, modifiers)) = parts.split_last() else {
            return Err(KeyChordError::Empty);
        };
        // A trailing `+` means the plus key itself, as in `Ctrl++`.
        let (key, modifiers) = if key.is_empty() && s.ends_with("++") {
            ("+", &modifiers[..modifiers.len().saturating_sub(1)])
        } else {
            (*key, modifiers)
        };
        if key.is_empty() {
            return Err(KeyChordError::Empty);
        }

        let mut chord = Self::plain(key);
        for modifier in modifiers {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => chord.ctrl = true,
                "shift" => chord.shift = true,
                "alt" | "option" => chord.alt = true,
                _ => return Err(KeyChordError::UnknownModifier(modifier.to_string())),
            }
        }
        Ok(chord)
    }
}

impl TryFrom<String> for KeyChord {
    type Error = KeyChordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyChord> for String {
    fn from(value: KeyChord) -> Self {
        value.to_string()
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        f.write_str(&self.key)
    }
}

fn normalize_key(key: &str) -> String {
    let mut chars = key.chars();
    if let (Some(single), None) = (chars.next(), chars.next()) {
        return single.to_uppercase().collect();
    }
    match key.to_ascii_lowercase().as_str() {
        "enter" | "return" => "Enter".to_string(),
        "esc" | "escape" => "Escape".to_string(),
        "down" | "arrowdown" => "Down".to_string(),
        "up" | "arrowup" => "Up".to_string(),
        "left" | "arrowleft" => "Left".to_string(),
        "right" | "arrowright" => "Right".to_string(),
        "tab" => "Tab".to_string(),
        "space" => "Space".to_string(),
        _ => key.to_string(),
    }
}

/// Named binding sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPreset {
    #[default]
    Browser,
    Desktop,
}

/// Key chords per action. Serialized with one field per action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMap {
    pub next_row: Vec<KeyChord>,
    pub previous_row: Vec<KeyChord>,
    pub save: Vec<KeyChord>,
    pub new_row: Vec<KeyChord>,
    pub cancel: Vec<KeyChord>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::preset(KeyPreset::default())
    }
}

impl KeyMap {
    pub fn preset(preset: KeyPreset) -> Self {
        match preset {
            KeyPreset::Browser => Self {
                next_row: vec![KeyChord::plain("Enter")],
                previous_row: vec![KeyChord::shift("Enter")],
                save: vec![KeyChord::ctrl("S")],
                new_row: vec![KeyChord::ctrl("Enter")],
                cancel: vec![KeyChord::plain("Escape")],
            },
            KeyPreset::Desktop => Self {
                next_row: vec![KeyChord::plain("Down")],
                previous_row: vec![KeyChord::plain("Up")],
                save: vec![KeyChord::ctrl("S")],
                new_row: vec![KeyChord::ctrl("N")],
                cancel: vec![KeyChord::plain("Escape")],
            },
        }
    }

    pub fn chords(&self, action: EditorAction) -> &[KeyChord] {
        match action {
            EditorAction::NextRow => &self.next_row,
            EditorAction::PreviousRow => &self.previous_row,
            EditorAction::Save => &self.save,
            EditorAction::NewRow => &self.new_row,
            EditorAction::Cancel => &self.cancel,
        }
    }

    fn chords_mut(&mut self, action: EditorAction) -> &mut Vec<KeyChord> {
        match action {
            EditorAction::NextRow => &mut self.next_row,
            EditorAction::PreviousRow => &mut self.previous_row,
            EditorAction::Save => &mut self.save,
            EditorAction::NewRow => &mut self.new_row,
            EditorAction::Cancel => &mut self.cancel,
        }
    }

    /// Replace the chords of each action named in `overrides`; the rest keep
    /// their current bindings.
    pub fn with_overrides(mut self, overrides: &BTreeMap<EditorAction, Vec<KeyChord>>) -> Self {
        for (action, chords) in overrides {
            *self.chords_mut(*action) = chords.clone();
        }
        self
    }

    /// First action bound to `chord`, in [`EditorAction::all`] order.
    pub fn action_for(&self, chord: &KeyChord) -> Option<EditorAction> {
        EditorAction::all()
            .iter()
            .copied()
            .find(|action| self.chords(*action).contains(chord))
    }

    /// Chords bound to more than one action.
    pub fn conflicts(&self) -> Vec<(KeyChord, EditorAction, EditorAction)> {
        let actions = EditorAction::all();
        let mut conflicts = Vec::new();
        for (i, first) in actions.iter().enumerate() {
            for second in &actions[i + 1..] {
                for chord in self.chords(*first) {
                    if self.chords(*second).contains(chord) {
                        conflicts.push((chord.clone(), *first, *second));
                    }
                }
            }
        }
        conflicts
    }
}
