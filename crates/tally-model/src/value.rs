#![deny(unsafe_code)]

use serde_json::Value;

/// Outcome of a single high-jump attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Fail,
}

impl AttemptOutcome {
    pub const fn as_char(self) -> char {
        match self {
            Self::Success => 's',
            Self::Fail => 'f',
        }
    }

    /// Documents encode attempts as booleans, `true` meaning cleared.
    pub const fn from_bool(cleared: bool) -> Self {
        if cleared { Self::Success } else { Self::Fail }
    }

    pub const fn as_bool(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// A defined cell value. Absence is modelled as `Option::None` by callers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// Elapsed time in the column's tick unit.
    Duration(u64),
    Count(i64),
    Flag(bool),
    Attempts(Vec<AttemptOutcome>),
    Text(String),
    Reference(String),
    /// A document value the column could not decode; carried through untouched.
    Raw(Value),
}

impl CellValue {
    /// Document encoding of the value.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Duration(ticks) => Value::from(*ticks),
            Self::Count(count) => Value::from(*count),
            Self::Flag(flag) => Value::Bool(*flag),
            Self::Attempts(attempts) => Value::Array(
                attempts
                    .iter()
                    .map(|attempt| Value::Bool(attempt.as_bool()))
                    .collect(),
            ),
            Self::Text(text) | Self::Reference(text) => Value::String(text.clone()),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

/// Short name of a JSON value's type, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn attempts_encode_as_booleans() {
        let value = CellValue::Attempts(vec![
            AttemptOutcome::Fail,
            AttemptOutcome::Fail,
            AttemptOutcome::Success,
        ]);
        assert_eq!(value.to_json(), json!([false, false, true]));
    }

    #[test]
    fn raw_passes_through() {
        let raw = json!({"split": "DNF"});
        assert_eq!(CellValue::Raw(raw.clone()).to_json(), raw);
    }
}
