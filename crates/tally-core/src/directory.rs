//! Competitor directory: a local [`ReferenceLookup`] backed by a JSON file.
//!
//! The file maps athlete ids to `{ "name": ..., "team": ... }`. Team colours
//! come from the display settings.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tally_model::{CompetitorId, ReferenceSource};

use crate::lookup::{Label, LookupFailure, ReferenceLookup, Rgb};

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("failed to read competitor directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid competitor directory: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AthleteEntry {
    pub name: String,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CompetitorDirectory {
    athletes: BTreeMap<String, AthleteEntry>,
    team_colors: BTreeMap<String, Rgb>,
}

impl CompetitorDirectory {
    pub fn from_json_str(source: &str) -> Result<Self, DirectoryError> {
        Ok(Self {
            athletes: serde_json::from_str(source)?,
            team_colors: BTreeMap::new(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let source = fs::read_to_string(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_json_str(&source)?;
        tracing::debug!(
            path = %path.display(),
            athletes = directory.athletes.len(),
            "loaded competitor directory"
        );
        Ok(directory)
    }

    pub fn with_team_colors(mut self, colors: BTreeMap<String, Rgb>) -> Self {
        self.team_colors = colors;
        self
    }

    pub fn athlete(&self, id: &str) -> Option<&AthleteEntry> {
        self.athletes.get(id)
    }

    pub fn len(&self) -> usize {
        self.athletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.athletes.is_empty()
    }

    fn is_known_team(&self, team: &str) -> bool {
        self.team_colors.contains_key(team)
            || self
                .athletes
                .values()
                .any(|athlete| athlete.team.as_deref() == Some(team))
    }
}

impl ReferenceLookup for CompetitorDirectory {
    fn lookup(&self, source: ReferenceSource, id: &CompetitorId) -> Result<Label, LookupFailure> {
        match source {
            ReferenceSource::Athletes => {
                let athlete = self
                    .athletes
                    .get(id.as_str())
                    .ok_or_else(|| LookupFailure::NotFound { id: id.clone() })?;
                Ok(Label {
                    display_name: athlete.name.clone(),
                    group_color: athlete
                        .team
                        .as_ref()
                        .and_then(|team| self.team_colors.get(team))
                        .copied(),
                    group_id: athlete.team.clone(),
                })
            }
            ReferenceSource::Teams => {
                if !self.is_known_team(id.as_str()) {
                    return Err(LookupFailure::NotFound { id: id.clone() });
                }
                Ok(Label {
                    display_name: id.to_string(),
                    group_id: Some(id.to_string()),
                    group_color: self.team_colors.get(id.as_str()).copied(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATHLETES: &str = r#"{
        "joe_biden": {"name": "Joe Biden", "team": "blue"},
        "mitch_mcconnell": {"name": "Mitch McConnell", "team": "red"},
        "bernie_sanders": {"name": "Bernie Sanders"}
    }"#;

    fn directory() -> CompetitorDirectory {
        let colors = BTreeMap::from([
            ("blue".to_string(), Rgb::new(0, 0, 139)),
            ("red".to_string(), Rgb::new(255, 99, 71)),
        ]);
        CompetitorDirectory::from_json_str(ATHLETES)
            .unwrap()
            .with_team_colors(colors)
    }

    fn id(name: &str) -> CompetitorId {
        CompetitorId::new(name).unwrap()
    }

    #[test]
    fn resolves_athletes_with_team_colours() {
        let label = directory()
            .lookup(ReferenceSource::Athletes, &id("joe_biden"))
            .unwrap();
        assert_eq!(label.display_name, "Joe Biden");
        assert_eq!(label.group_id.as_deref(), Some("blue"));
        assert_eq!(label.text_color(), Some(Rgb::WHITE));

        let solo = directory()
            .lookup(ReferenceSource::Athletes, &id("bernie_sanders"))
            .unwrap();
        assert_eq!(solo.group_color, None);
    }

    #[test]
    fn unknown_ids_fail_individually() {
        let directory = directory();
        assert_eq!(
            directory.lookup(ReferenceSource::Athletes, &id("nobody")),
            Err(LookupFailure::NotFound { id: id("nobody") })
        );
        assert!(directory.lookup(ReferenceSource::Teams, &id("red")).is_ok());
        assert!(directory.lookup(ReferenceSource::Teams, &id("green")).is_err());
    }

    #[test]
    fn rejects_malformed_files() {
        assert!(matches!(
            CompetitorDirectory::from_json_str(r#"{"x": {"team": "blue"}}"#),
            Err(DirectoryError::Json(_))
        ));
    }
}
