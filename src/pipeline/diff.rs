//! Structural diff strategies for topic snapshots.
//!
//! Every strategy works in place on the newly fetched value: wherever a part
//! of it is deep-equal to the matching part of the previous snapshot, that
//! part is replaced by `null`. What is left is the diff document.
//!
//! Strategies only look at positions that exist in the *old* snapshot.
//! Anything that appears only in the new one passes through untouched, and
//! nothing is ever reported for parts that disappeared.
//!
//! An explicitly stored `null` baseline has no positions, so every strategy
//! leaves the new value as-is when diffing against it.

use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::Topic;

/// Old and new snapshots do not line up positionally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ShapeError(String);

impl ShapeError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// How records of a keyed list are matched between snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKey {
    /// Fields whose values together identify a record
    pub fields: &'static [&'static str],
    /// Fields never diffed besides the key fields
    pub ignored: &'static [&'static str],
    /// Field holding a nested timetable, diffed per lesson slot
    pub timetable: Option<&'static str>,
}

impl RecordKey {
    /// Teachers are matched by their abbreviation.
    pub const TEACHERS: RecordKey = RecordKey {
        fields: &["abbr"],
        ignored: &[],
        timetable: Some("timetable"),
    };

    /// Change bulletins are matched by date; the weekday is derived and never diffed.
    pub const CHANGES: RecordKey = RecordKey {
        fields: &["day", "month"],
        ignored: &["wkday"],
        timetable: None,
    };

    /// Lookup key of a record, or `None` if it lacks any key field.
    fn of(&self, record: &Value) -> Option<String> {
        let record = record.as_object()?;
        let parts = self
            .fields
            .iter()
            .map(|field| record.get(*field))
            .collect::<Option<Vec<&Value>>>()?;
        serde_json::to_string(&parts).ok()
    }

    fn skips(&self, field: &str) -> bool {
        self.fields.contains(&field) || self.ignored.contains(&field)
    }
}

/// Diff strategy for one topic's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStrategy {
    /// Null whole entries of a top-level object or array
    Container,
    /// Object of timetables, each diffed per lesson slot
    TimetableMap,
    /// List of records matched by key, diffed per field
    KeyedRecords(RecordKey),
    /// Days of lessons of floor -> rooms maps, diffed per floor
    CellMap,
    /// Always transmit the whole new value
    FullReplace,
}

impl DiffStrategy {
    /// The strategy reconciling the given topic.
    pub fn for_topic(topic: Topic) -> Self {
        match topic {
            Topic::ClassList | Topic::StudyPlan => DiffStrategy::Container,
            Topic::RingsTimetable | Topic::ClassTeachers => DiffStrategy::FullReplace,
            Topic::FullPermTimetable => DiffStrategy::TimetableMap,
            Topic::Teachers => DiffStrategy::KeyedRecords(RecordKey::TEACHERS),
            Topic::Changes => DiffStrategy::KeyedRecords(RecordKey::CHANGES),
            Topic::VacantRooms => DiffStrategy::CellMap,
        }
    }

    /// Turn `new` into a diff document against `old`.
    pub fn apply(&self, old: &Value, new: &mut Value) -> Result<(), ShapeError> {
        match self {
            DiffStrategy::Container => {
                container(old, new);
                Ok(())
            }
            DiffStrategy::TimetableMap => timetable_map(old, new),
            DiffStrategy::KeyedRecords(key) => keyed_records(key, old, new),
            DiffStrategy::CellMap => cell_map(old, new),
            DiffStrategy::FullReplace => Ok(()),
        }
    }
}

/// Null every top-level entry of `new` equal to the same key or index in `old`.
///
/// Entries present on only one side are skipped, as are mismatched
/// container kinds.
pub fn container(old: &Value, new: &mut Value) {
    match (old, new) {
        (Value::Object(old), Value::Object(new)) => {
            for (key, value) in old {
                if let Some(entry) = new.get_mut(key) {
                    null_if_equal(entry, value);
                }
            }
        }
        (Value::Array(old), Value::Array(new)) => {
            for (entry, value) in new.iter_mut().zip(old) {
                null_if_equal(entry, value);
            }
        }
        _ => {}
    }
}

/// Null every lesson slot of `new` equal to the same `(day, slot)` in `old`.
///
/// Days and slots beyond the old timetable's bounds are left as-is. A new
/// timetable smaller than the old one is a [`ShapeError`].
pub fn timetable(old: &Value, new: &mut Value) -> Result<(), ShapeError> {
    let Some(old_days) = as_positional(old, "timetable")? else {
        return Ok(());
    };
    let new_days = new
        .as_array_mut()
        .ok_or_else(|| ShapeError::new("new timetable is not a list of days"))?;

    for (d_idx, old_day) in old_days.iter().enumerate() {
        let Some(old_slots) = as_positional(old_day, "timetable day")? else {
            continue;
        };
        let new_slots = new_days
            .get_mut(d_idx)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| ShapeError::new(format!("day {} missing from new timetable", d_idx)))?;

        for (l_idx, lesson) in old_slots.iter().enumerate() {
            let slot = new_slots.get_mut(l_idx).ok_or_else(|| {
                ShapeError::new(format!("lesson {} of day {} missing", l_idx, d_idx))
            })?;
            null_if_equal(slot, lesson);
        }
    }
    Ok(())
}

/// Diff every timetable of an object keyed by class name.
///
/// Classes present only in `new` pass through.
pub fn timetable_map(old: &Value, new: &mut Value) -> Result<(), ShapeError> {
    let Some(old) = as_keyed(old, "timetable map")? else {
        return Ok(());
    };
    let new = new
        .as_object_mut()
        .ok_or_else(|| ShapeError::new("new timetable map is not an object"))?;

    for (class, old_tt) in old {
        if let Some(new_tt) = new.get_mut(class) {
            timetable(old_tt, new_tt).map_err(|e| ShapeError::new(format!("{}: {}", class, e)))?;
        }
    }
    Ok(())
}

/// Diff a list of records matched by `key`.
///
/// For every old record with a counterpart in `new`, each shared non-key
/// field is nulled when unchanged. Fields missing on either side are
/// skipped, and old records without a counterpart are not reported.
pub fn keyed_records(key: &RecordKey, old: &Value, new: &mut Value) -> Result<(), ShapeError> {
    let Some(old) = as_positional(old, "record list")? else {
        return Ok(());
    };
    let new = new
        .as_array_mut()
        .ok_or_else(|| ShapeError::new("new record list is not a list"))?;

    let lookup: HashMap<String, usize> = new
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| key.of(record).map(|k| (k, idx)))
        .collect();

    for old_record in old {
        let Some(idx) = key.of(old_record).and_then(|k| lookup.get(&k).copied()) else {
            continue;
        };
        let (Some(old_fields), Some(new_fields)) =
            (old_record.as_object(), new[idx].as_object_mut())
        else {
            continue;
        };

        diff_fields(key, old_fields, new_fields)?;
    }
    Ok(())
}

fn diff_fields(
    key: &RecordKey,
    old: &Map<String, Value>,
    new: &mut Map<String, Value>,
) -> Result<(), ShapeError> {
    for (field, old_value) in old {
        if key.skips(field) {
            continue;
        }
        let Some(new_value) = new.get_mut(field) else {
            continue;
        };

        if key.timetable == Some(field.as_str()) {
            timetable(old_value, new_value)
                .map_err(|e| ShapeError::new(format!("{}: {}", field, e)))?;
        } else {
            null_if_equal(new_value, old_value);
        }
    }
    Ok(())
}

/// Diff days of lessons of `floor -> rooms` maps, one floor at a time.
///
/// Every `(day, lesson)` cell of `old` must exist in `new`; floors missing
/// from a new cell are skipped.
pub fn cell_map(old: &Value, new: &mut Value) -> Result<(), ShapeError> {
    let Some(old_days) = as_positional(old, "room table")? else {
        return Ok(());
    };
    let new_days = new
        .as_array_mut()
        .ok_or_else(|| ShapeError::new("new room table is not a list of days"))?;

    for (d_idx, old_day) in old_days.iter().enumerate() {
        let Some(old_lessons) = as_positional(old_day, "room table day")? else {
            continue;
        };
        let new_lessons = new_days
            .get_mut(d_idx)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| ShapeError::new(format!("day {} missing from new room table", d_idx)))?;

        for (l_idx, old_cell) in old_lessons.iter().enumerate() {
            let Some(old_floors) = as_keyed(old_cell, "room cell")? else {
                continue;
            };
            let new_floors = new_lessons
                .get_mut(l_idx)
                .and_then(Value::as_object_mut)
                .ok_or_else(|| {
                    ShapeError::new(format!("lesson {} of day {} missing", l_idx, d_idx))
                })?;

            for (floor, rooms) in old_floors {
                if let Some(entry) = new_floors.get_mut(floor) {
                    null_if_equal(entry, rooms);
                }
            }
        }
    }
    Ok(())
}

fn null_if_equal(entry: &mut Value, old: &Value) {
    if *entry == *old {
        *entry = Value::Null;
    }
}

/// View an old value as a list; `null` has no positions.
fn as_positional<'a>(old: &'a Value, what: &str) -> Result<Option<&'a Vec<Value>>, ShapeError> {
    match old {
        Value::Array(items) => Ok(Some(items)),
        Value::Null => Ok(None),
        _ => Err(ShapeError::new(format!("old {} is not a list", what))),
    }
}

/// View an old value as an object; `null` has no keys.
fn as_keyed<'a>(
    old: &'a Value,
    what: &str,
) -> Result<Option<&'a Map<String, Value>>, ShapeError> {
    match old {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        _ => Err(ShapeError::new(format!("old {} is not an object", what))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_container_object() {
        let old = json!({"8": ["8А", "8Б"], "9": ["9А", "9Б"]});
        let mut new = json!({"8": ["8А", "8Б"], "9": ["9А", "9Б", "9В"]});

        container(&old, &mut new);
        assert_eq!(new, json!({"8": null, "9": ["9А", "9Б", "9В"]}));
    }

    #[test]
    fn test_container_list_with_new_tail() {
        let old = json!([["september"], ["october"]]);
        let mut new = json!([["september"], ["october"], ["november"]]);

        container(&old, &mut new);
        assert_eq!(new, json!([null, null, ["november"]]));
    }

    #[test]
    fn test_container_list_shorter_new() {
        let old = json!([["september"], ["october"]]);
        let mut new = json!([["september"]]);

        container(&old, &mut new);
        assert_eq!(new, json!([null]));
    }

    #[test]
    fn test_container_against_null_baseline() {
        let mut new = json!({"8": ["8А"]});
        container(&Value::Null, &mut new);
        assert_eq!(new, json!({"8": ["8А"]}));
    }

    #[test]
    fn test_timetable() {
        let old = json!([
            [["maths"], ["maths"], [], [], [], [], []],
            [["pe"],    ["pe"],    [], [], [], [], []],
            [["ict"],   ["ict"],   [], [], [], [], []]
        ]);
        let mut new = json!([
            [["maths"], ["english"], [],      [], [], [], []],
            [["pe"],    [],          [],      [], [], [], []],
            [[],        ["ict"],     ["ict"], [], [], [], []]
        ]);

        timetable(&old, &mut new).unwrap();
        assert_eq!(
            new,
            json!([
                [null, ["english"], null,    null, null, null, null],
                [null, [],          null,    null, null, null, null],
                [[],   null,        ["ict"], null, null, null, null]
            ])
        );
    }

    #[test]
    fn test_timetable_extra_days_pass_through() {
        let old = json!([[["maths"]]]);
        let mut new = json!([[["maths"], ["art"]], [["pe"]]]);

        timetable(&old, &mut new).unwrap();
        assert_eq!(new, json!([[null, ["art"]], [["pe"]]]));
    }

    #[test]
    fn test_timetable_shorter_new_is_shape_error() {
        let old = json!([[["maths"]], [["pe"]]]);
        let mut new = json!([[["maths"]]]);

        let err = timetable(&old, &mut new).unwrap_err();
        assert!(err.to_string().contains("day 1"));
    }

    #[test]
    fn test_timetable_map_new_class() {
        let old = json!({"8А": [["lesson", "lesson"], []]});
        let mut new = json!({"8А": [["lesson", "lesson"], []], "8Б": []});

        timetable_map(&old, &mut new).unwrap();
        assert_eq!(new, json!({"8А": [[null, null], []], "8Б": []}));
    }

    #[test]
    fn test_keyed_teachers() {
        let old = json!([{
            "abbr": "t1",
            "full": "Teacher 1",
            "job": "teacher",
            "timetable": [],
            "classes": []
        }]);
        let mut new = json!([
            {"abbr": "t1", "job": "teacher", "timetable": [], "classes": []},
            {"abbr": "t2"}
        ]);

        keyed_records(&RecordKey::TEACHERS, &old, &mut new).unwrap();
        assert_eq!(
            new,
            json!([
                {"abbr": "t1", "job": null, "timetable": [], "classes": null},
                {"abbr": "t2"}
            ])
        );
    }

    #[test]
    fn test_keyed_teachers_nested_timetable() {
        let old = json!([{"abbr": "t1", "timetable": [[["8А"], ["9Б"]]]}]);
        let mut new = json!([{"abbr": "t1", "timetable": [[["8А"], ["10В"]]]}]);

        keyed_records(&RecordKey::TEACHERS, &old, &mut new).unwrap();
        assert_eq!(new, json!([{"abbr": "t1", "timetable": [[null, ["10В"]]]}]));
    }

    #[test]
    fn test_keyed_record_without_key_passes_through() {
        let old = json!([{"abbr": "t1", "job": "teacher"}]);
        let mut new = json!([{"abbr": "t1", "job": "teacher"}, {"job": "test_wrecker"}]);

        keyed_records(&RecordKey::TEACHERS, &old, &mut new).unwrap();
        assert_eq!(new, json!([{"abbr": "t1", "job": null}, {"job": "test_wrecker"}]));
    }

    #[test]
    fn test_keyed_removed_record_not_reported() {
        let old = json!([{"abbr": "t1", "job": "teacher"}, {"abbr": "t9", "job": "head"}]);
        let mut new = json!([{"abbr": "t1", "job": "director"}]);

        keyed_records(&RecordKey::TEACHERS, &old, &mut new).unwrap();
        assert_eq!(new, json!([{"abbr": "t1", "job": "director"}]));
    }

    #[test]
    fn test_keyed_changes() {
        let old = json!([{
            "day": "1",
            "wkday": "monday",
            "month": "january",
            "8А": ["some_changes"]
        }]);
        let mut new = json!([
            {
                "day": "1",
                "wkday": "monday",
                "month": "january",
                "8А": ["some_changes"],
                "9Б": ["more_changes"]
            },
            {"day": "2", "month": "january", "10В": []}
        ]);

        keyed_records(&RecordKey::CHANGES, &old, &mut new).unwrap();
        assert_eq!(
            new,
            json!([
                {
                    "day": "1",
                    "wkday": "monday",
                    "month": "january",
                    "8А": null,
                    "9Б": ["more_changes"]
                },
                {"day": "2", "month": "january", "10В": []}
            ])
        );
    }

    #[test]
    fn test_keyed_changes_composite_key() {
        let old = json!([{"day": "1", "month": "january", "8А": []}]);
        let mut new = json!([{"day": "1", "month": "february", "8А": []}]);

        keyed_records(&RecordKey::CHANGES, &old, &mut new).unwrap();
        assert_eq!(new, json!([{"day": "1", "month": "february", "8А": []}]));
    }

    #[test]
    fn test_keyed_field_dropped_from_old_record() {
        let old = json!([{"day": "1", "month": "may", "8А": ["x"]}]);
        let mut new = json!([{"day": "1", "month": "may", "9Б": ["y"]}]);

        keyed_records(&RecordKey::CHANGES, &old, &mut new).unwrap();
        assert_eq!(new, json!([{"day": "1", "month": "may", "9Б": ["y"]}]));
    }

    #[test]
    fn test_cell_map() {
        let old = json!([[{"1": ["101", "102"], "2": ["201"]}, {"1": []}]]);
        let mut new = json!([
            [{"1": ["101", "102"], "2": []}, {"1": [], "3": ["301"]}],
            [{"1": ["105"]}]
        ]);

        cell_map(&old, &mut new).unwrap();
        assert_eq!(
            new,
            json!([
                [{"1": null, "2": []}, {"1": null, "3": ["301"]}],
                [{"1": ["105"]}]
            ])
        );
    }

    #[test]
    fn test_cell_map_missing_lesson_is_shape_error() {
        let old = json!([[{"1": []}, {"1": []}]]);
        let mut new = json!([[{"1": []}]]);

        assert!(cell_map(&old, &mut new).is_err());
    }

    #[test]
    fn test_full_replace_untouched() {
        let old = json!([{"type": "lesson"}]);
        let mut new = json!([{"type": "lesson"}, {"type": "break"}]);

        DiffStrategy::FullReplace.apply(&old, &mut new).unwrap();
        assert_eq!(new, json!([{"type": "lesson"}, {"type": "break"}]));
    }

    #[test]
    fn test_for_topic() {
        assert_eq!(
            DiffStrategy::for_topic(Topic::Teachers),
            DiffStrategy::KeyedRecords(RecordKey::TEACHERS)
        );
        assert_eq!(
            DiffStrategy::for_topic(Topic::ClassTeachers),
            DiffStrategy::FullReplace
        );
        assert_eq!(
            DiffStrategy::for_topic(Topic::StudyPlan),
            DiffStrategy::Container
        );
    }

    #[test]
    fn test_mismatched_old_kind_is_shape_error() {
        let mut new = json!([]);
        assert!(timetable(&json!({"a": 1}), &mut new).is_err());
        assert!(cell_map(&json!("rooms"), &mut new).is_err());
    }
}
