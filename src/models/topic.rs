//! Topic identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A named, independently reconciled data shape.
///
/// The snake_case name doubles as the snapshot store key and the
/// notification heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// grade -> list of class names
    ClassList,
    /// months -> day entries
    StudyPlan,
    /// lesson and break entries
    RingsTimetable,
    /// class name -> 6-day timetable
    FullPermTimetable,
    /// teacher records keyed by `abbr`
    Teachers,
    /// day bulletins keyed by `(day, month)`
    Changes,
    /// day -> lesson -> floor -> room numbers
    VacantRooms,
    /// class name -> {teacher, subject} pairs
    ClassTeachers,
}

impl Topic {
    /// Every topic, in the order the CLI lists them.
    pub const ALL: [Topic; 8] = [
        Topic::ClassList,
        Topic::StudyPlan,
        Topic::RingsTimetable,
        Topic::FullPermTimetable,
        Topic::Teachers,
        Topic::Changes,
        Topic::VacantRooms,
        Topic::ClassTeachers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::ClassList => "class_list",
            Topic::StudyPlan => "study_plan",
            Topic::RingsTimetable => "rings_timetable",
            Topic::FullPermTimetable => "full_perm_timetable",
            Topic::Teachers => "teachers",
            Topic::Changes => "changes",
            Topic::VacantRooms => "vacant_rooms",
            Topic::ClassTeachers => "class_teachers",
        }
    }

    /// Store key holding this topic's snapshot.
    pub fn key(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .iter()
            .copied()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Topic::ALL.iter().map(Topic::as_str).collect();
                AppError::validation(format!(
                    "unknown topic '{}', expected one of: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for topic in Topic::ALL {
            assert_eq!(topic.as_str().parse::<Topic>().unwrap(), topic);
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = "timetable".parse::<Topic>().unwrap_err();
        assert!(err.to_string().contains("full_perm_timetable"));
    }

    #[test]
    fn test_serde_name_matches_key() {
        let json = serde_json::to_string(&Topic::FullPermTimetable).unwrap();
        assert_eq!(json, "\"full_perm_timetable\"");
        assert_eq!(Topic::VacantRooms.key(), "vacant_rooms");
    }
}
