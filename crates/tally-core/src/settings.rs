//! Editor settings, persisted as TOML.
//!
//! Settings live in the platform config directory unless a path is given:
//! - macOS: ~/Library/Application Support/org.tally.tally/
//! - Windows: %APPDATA%/tally/tally/config/
//! - Linux: ~/.config/tally/

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tally_model::{AttemptsConfig, DurationUnit, EntryMode};

use crate::keymap::{EditorAction, KeyChord, KeyMap, KeyPreset};
use crate::lookup::Rgb;

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "tally";
const APP_NAME: &str = "tally";
const CONFIG_FILENAME: &str = "settings.toml";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("could not determine the settings directory")]
    NoConfigDir,
}

/// Editor settings (persisted to disk as TOML).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub keys: KeySettings,
    pub editing: EditingSettings,
    pub display: DisplaySettings,
}

/// Keyboard bindings: a preset plus per-action overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySettings {
    pub preset: KeyPreset,
    /// Actions not listed here keep the chords of `preset`.
    pub bindings: BTreeMap<EditorAction, Vec<KeyChord>>,
}

impl KeySettings {
    pub fn key_map(&self) -> KeyMap {
        KeyMap::preset(self.preset).with_overrides(&self.bindings)
    }
}

/// Defaults applied to the columns the editor builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingSettings {
    pub duration_unit: DurationUnit,
    pub attempts_mode: EntryMode,
    pub attempts_capacity: usize,
    /// Lower bound of count columns such as bonus points.
    pub count_min: i64,
}

impl Default for EditingSettings {
    fn default() -> Self {
        Self {
            duration_unit: DurationUnit::default(),
            attempts_mode: EntryMode::default(),
            attempts_capacity: AttemptsConfig::DEFAULT_CAPACITY,
            count_min: 0,
        }
    }
}

impl EditingSettings {
    pub fn attempts(&self) -> AttemptsConfig {
        AttemptsConfig {
            capacity: self.attempts_capacity,
            mode: self.attempts_mode,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Team id to colour, used for reference labels.
    pub team_colors: BTreeMap<String, Rgb>,
}

/// Path of the settings file in the platform config directory.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Load settings.
///
/// With an explicit path every failure is an error. Otherwise the platform
/// file is used; a missing or unreadable file falls back to defaults with a
/// logged warning.
pub fn load_settings(explicit: Option<&Path>) -> Result<EditorSettings, SettingsError> {
    if let Some(path) = explicit {
        return read_settings(path);
    }

    let Some(path) = settings_path() else {
        tracing::warn!("could not determine settings path, using defaults");
        return Ok(EditorSettings::default());
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no settings file, using defaults");
        return Ok(EditorSettings::default());
    }
    match read_settings(&path) {
        Ok(settings) => Ok(settings),
        Err(error) => {
            tracing::warn!(%error, "ignoring settings file, using defaults");
            Ok(EditorSettings::default())
        }
    }
}

/// Write settings to `path`, creating its directory.
pub fn save_settings(settings: &EditorSettings, path: &Path) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let content = toml::to_string_pretty(settings)?;
    fs::write(path, content).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "saved settings");
    Ok(())
}

fn read_settings(path: &Path) -> Result<EditorSettings, SettingsError> {
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip() {
        let settings = EditorSettings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: EditorSettings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let parsed: EditorSettings = toml::from_str(
            r##"
            [keys]
            preset = "desktop"

            [editing]
            attempts_mode = "relaxed"

            [display.team_colors]
            blue = "#00008b"
            "##,
        )
        .unwrap();
        assert_eq!(parsed.keys.preset, KeyPreset::Desktop);
        assert_eq!(
            parsed.keys.key_map().action_for(&KeyChord::plain("Down")),
            Some(EditorAction::NextRow)
        );
        assert_eq!(parsed.editing.attempts().mode, EntryMode::Relaxed);
        assert_eq!(parsed.editing.attempts_capacity, 3);
        assert_eq!(parsed.editing.duration_unit, DurationUnit::Milliseconds);
        assert_eq!(parsed.display.team_colors["blue"], Rgb::new(0, 0, 0x8b));
    }

    #[test]
    fn explicit_bindings_replace_the_preset() {
        let parsed: EditorSettings = toml::from_str(
            r#"
            [keys.bindings]
            save = ["Ctrl+Shift+S"]
            "#,
        )
        .unwrap();
        let keys = parsed.keys.key_map();
        assert_eq!(
            keys.action_for(&"Ctrl+Shift+S".parse().unwrap()),
            Some(EditorAction::Save)
        );
        assert_eq!(keys.action_for(&KeyChord::ctrl("S")), None);
        assert_eq!(
            keys.action_for(&KeyChord::plain("Enter")),
            Some(EditorAction::NextRow)
        );
    }

    #[test]
    fn explicit_bindings_keep_the_chosen_preset() {
        let parsed: EditorSettings = toml::from_str(
            r#"
            [keys]
            preset = "desktop"

            [keys.bindings]
            save = ["Ctrl+Shift+S"]
            "#,
        )
        .unwrap();
        let keys = parsed.keys.key_map();
        assert_eq!(
            keys.action_for(&"Ctrl+Shift+S".parse().unwrap()),
            Some(EditorAction::Save)
        );
        assert_eq!(
            keys.action_for(&KeyChord::plain("Down")),
            Some(EditorAction::NextRow)
        );
        assert_eq!(
            keys.action_for(&KeyChord::ctrl("N")),
            Some(EditorAction::NewRow)
        );
        assert_eq!(keys.action_for(&KeyChord::plain("Enter")), None);

        let text = toml::to_string_pretty(&parsed).unwrap();
        assert_eq!(toml::from_str::<EditorSettings>(&text).unwrap(), parsed);
    }

    #[test]
    fn unknown_actions_are_rejected() {
        let parsed = toml::from_str::<EditorSettings>(
            r#"
            [keys.bindings]
            jump = ["J"]
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn bad_colours_are_rejected() {
        let parsed = toml::from_str::<EditorSettings>(
            r#"
            [display.team_colors]
            blue = "navy"
            "#,
        );
        assert!(parsed.is_err());
    }
}
