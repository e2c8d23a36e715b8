//! Event result documents.
//!
//! A document is an untyped JSON object with scalar metadata (`name`,
//! `distance`, `date`, `type`, `competitor_type`), bookkeeping keys prefixed
//! with `_`, and a `results` object keyed by competitor id. Only `results` is
//! regenerated by the editor; every other key is carried through verbatim.

use std::fmt;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::value::json_type_name;
use crate::{ModelError, Result};

pub const RESULTS_KEY: &str = "results";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Kind of event a document records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Race,
    HighJump,
    BonusPoints,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Race => "race",
            Self::HighJump => "high_jump",
            Self::BonusPoints => "bonus_points",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        match value {
            "race" => Self::Race,
            "high_jump" => Self::HighJump,
            "bonus_points" => Self::BonusPoints,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether results are keyed by athlete or by team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CompetitorType {
    #[default]
    Individual,
    Team,
    Other(String),
}

impl From<&str> for CompetitorType {
    fn from(value: &str) -> Self {
        match value {
            "individual" => Self::Individual,
            "team" => Self::Team,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDocument {
    root: Map<String, Value>,
}

impl EventDocument {
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(root) = value else {
            return Err(ModelError::NotAnObject {
                found: json_type_name(&value),
            });
        };
        match root.get(RESULTS_KEY) {
            None | Some(Value::Object(_)) => {}
            Some(other) => {
                return Err(ModelError::InvalidResults {
                    found: json_type_name(other),
                });
            }
        }
        Ok(Self { root })
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(source)?)
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn distance(&self) -> Option<&str> {
        self.str_field("distance")
    }

    /// Raw `date` text as stored.
    pub fn raw_date(&self) -> Option<&str> {
        self.str_field("date")
    }

    pub fn date(&self) -> Result<Option<NaiveDate>> {
        self.raw_date()
            .map(|raw| {
                NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|source| {
                    ModelError::InvalidDate {
                        value: raw.to_string(),
                        source,
                    }
                })
            })
            .transpose()
    }

    pub fn event_type(&self) -> EventType {
        self.str_field("type")
            .map_or_else(|| EventType::Other(String::new()), EventType::from)
    }

    pub fn competitor_type(&self) -> CompetitorType {
        self.str_field("competitor_type")
            .map(CompetitorType::from)
            .unwrap_or_default()
    }

    /// Results in document order.
    pub fn results(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.root
            .get(RESULTS_KEY)
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|results| results.iter().map(|(id, record)| (id.as_str(), record)))
    }

    pub fn result_count(&self) -> usize {
        self.root
            .get(RESULTS_KEY)
            .and_then(Value::as_object)
            .map_or(0, Map::len)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.root.insert("name".to_string(), Value::String(name.into()));
    }

    pub fn set_distance(&mut self, distance: impl Into<String>) {
        self.root
            .insert("distance".to_string(), Value::String(distance.into()));
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.root.insert(
            "date".to_string(),
            Value::String(date.format(DATE_FORMAT).to_string()),
        );
    }

    /// Copy of this document with `results` replaced; all other keys untouched.
    pub fn with_results(&self, results: Map<String, Value>) -> Self {
        let mut root = self.root.clone();
        root.insert(RESULTS_KEY.to_string(), Value::Object(results));
        Self { root }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.root.get(key).and_then(Value::as_str)
    }
}
