//! Read, write and delete values at a field path inside a JSON record.
//!
//! Segments address object keys; a segment that meets an array is read as an
//! index. An empty path is always rejected with [`PathError::EmptyPath`].
//!
//! - `get` never fails on a missing or non-container intermediate; it reports
//!   absence instead.
//! - `set` creates missing intermediate objects and keeps every sibling key.
//!   Descending through a scalar is a [`PathError::TypeMismatch`] and leaves
//!   the root untouched.
//! - `delete` removes the leaf if present; missing intermediates are a no-op.

use serde_json::{Map, Value};
use tally_model::json_type_name;

use crate::error::PathError;

/// Value at `path`, or `None` when any segment is missing.
pub fn get<'a>(root: &'a Value, path: &[String]) -> Result<Option<&'a Value>, PathError> {
    if path.is_empty() {
        return Err(PathError::EmptyPath);
    }

    let mut current = root;
    for segment in path {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Write `value` at `path`, returning the value it replaced.
pub fn set(root: &mut Value, path: &[String], value: Value) -> Result<Option<Value>, PathError> {
    let Some((leaf, parents)) = path.split_last() else {
        return Err(PathError::EmptyPath);
    };
    // Check the whole walk first so a mismatch deep down does not leave
    // freshly created objects behind.
    check_writable(root, path)?;

    let mut current = root;
    for segment in parents {
        current = match current {
            Value::Object(map) => map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(items) => match segment.parse::<usize>().ok() {
                Some(index) if index < items.len() => &mut items[index],
                _ => return Err(mismatch(path, segment, "array")),
            },
            other => return Err(mismatch(path, segment, json_type_name(other))),
        };
    }

    match current {
        Value::Object(map) => Ok(map.insert(leaf.clone(), value)),
        Value::Array(items) => match leaf.parse::<usize>().ok() {
            Some(index) if index < items.len() => Ok(Some(std::mem::replace(
                &mut items[index],
                value,
            ))),
            _ => Err(mismatch(path, leaf, "array")),
        },
        other => Err(mismatch(path, leaf, json_type_name(other))),
    }
}

/// Remove the value at `path`, returning it if it was present.
pub fn delete(root: &mut Value, path: &[String]) -> Result<Option<Value>, PathError> {
    let Some((leaf, parents)) = path.split_last() else {
        return Err(PathError::EmptyPath);
    };

    let mut current = root;
    for segment in parents {
        let next = match current {
            Value::Object(map) => map.get_mut(segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get_mut(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }

    Ok(match current {
        Value::Object(map) => map.shift_remove(leaf),
        Value::Array(items) => match leaf.parse::<usize>() {
            Ok(index) if index < items.len() => Some(items.remove(index)),
            _ => None,
        },
        _ => None,
    })
}

fn check_writable(root: &Value, path: &[String]) -> Result<(), PathError> {
    let mut current = Some(root);
    for segment in path {
        let Some(node) = current else {
            // Everything below a missing key gets created.
            return Ok(());
        };
        current = match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => match segment.parse::<usize>().ok() {
                Some(index) if index < items.len() => items.get(index),
                _ => return Err(mismatch(path, segment, "array")),
            },
            other => return Err(mismatch(path, segment, json_type_name(other))),
        };
    }
    Ok(())
}

fn mismatch(path: &[String], segment: &str, found: &'static str) -> PathError {
    PathError::TypeMismatch {
        path: path.join("."),
        segment: segment.to_string(),
        found,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn path(dotted: &str) -> Vec<String> {
        dotted.split('.').map(str::to_string).collect()
    }

    #[test]
    fn get_reports_absence() {
        let record = json!({"heights": {"1500": [true]}, "name": "x"});
        assert_eq!(
            get(&record, &path("heights.1500")).unwrap(),
            Some(&json!([true]))
        );
        assert_eq!(get(&record, &path("heights.1600")).unwrap(), None);
        assert_eq!(get(&record, &path("missing.deep.key")).unwrap(), None);
        assert_eq!(get(&record, &path("name.inner")).unwrap(), None);
        assert_eq!(get(&record, &path("heights.1500.0")).unwrap(), Some(&json!(true)));
    }

    #[test]
    fn empty_path_is_rejected_everywhere() {
        let mut record = json!({});
        assert_eq!(get(&record, &[]), Err(PathError::EmptyPath));
        assert_eq!(set(&mut record, &[], json!(1)), Err(PathError::EmptyPath));
        assert_eq!(delete(&mut record, &[]), Err(PathError::EmptyPath));
    }

    #[test]
    fn set_vivifies_and_keeps_siblings() {
        let mut record = json!({"DNF": true, "heights": {"1500": [false]}});
        set(&mut record, &path("heights.1600"), json!([true])).unwrap();
        set(&mut record, &path("splits.bike.lap"), json!(3)).unwrap();
        assert_eq!(
            record,
            json!({
                "DNF": true,
                "heights": {"1500": [false], "1600": [true]},
                "splits": {"bike": {"lap": 3}}
            })
        );
    }

    #[test]
    fn set_through_scalar_is_a_mismatch_and_changes_nothing() {
        let mut record = json!({"note": "fast"});
        let before = record.clone();
        let err = set(&mut record, &path("note.deep.x"), json!(1)).unwrap_err();
        assert_eq!(
            err,
            PathError::TypeMismatch {
                path: "note.deep.x".to_string(),
                segment: "deep".to_string(),
                found: "string",
            }
        );
        assert_eq!(record, before);
    }

    #[test]
    fn set_into_array_needs_existing_index() {
        let mut record = json!({"laps": [1, 2]});
        assert_eq!(set(&mut record, &path("laps.1"), json!(5)), Ok(Some(json!(2))));
        assert!(matches!(
            set(&mut record, &path("laps.7"), json!(5)),
            Err(PathError::TypeMismatch { found: "array", .. })
        ));
        assert_eq!(record, json!({"laps": [1, 5]}));
    }

    #[test]
    fn delete_removes_leaf_only() {
        let mut record = json!({"a": 1, "heights": {"1500": [], "1600": []}, "z": 2});
        assert_eq!(delete(&mut record, &path("heights.1500")), Ok(Some(json!([]))));
        assert_eq!(delete(&mut record, &path("nope.deeper")), Ok(None));
        assert_eq!(delete(&mut record, &path("a.b")), Ok(None));
        assert_eq!(record, json!({"a": 1, "heights": {"1600": []}, "z": 2}));

        // Key order of the survivors is kept.
        delete(&mut record, &path("a")).unwrap();
        let keys: Vec<&String> = record.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["heights", "z"]);
    }
}
