//! Subject domain model.
//!
//! # Responsibility
//! - Define one graded subject row of a detailed-mode semester.
//! - Decide which subjects are eligible for weighted averaging.
//!
//! # Invariants
//! - `id` is stable for the subject lifetime and unique within a semester.
//! - Credits/grade may be transiently unset; such subjects are skipped by
//!   calculations, never rejected.

use crate::model::value::InputValue;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Credits assigned to a freshly added subject.
pub const DEFAULT_NEW_SUBJECT_CREDITS: u32 = 3;
/// Lowest (best) grade on the fixed grading scale.
pub const GRADE_MIN: f64 = 1.0;
/// Highest (worst) grade on the fixed grading scale.
pub const GRADE_MAX: f64 = 9.0;

const UNNAMED_SUBJECT_LABEL: &str = "New subject";

/// Stable subject identifier.
///
/// New ids are random UUIDs. Snapshots written by older versions used
/// numeric timestamp ids; those are accepted and kept in string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Generates a new collision-resistant id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an externally known id.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for SubjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SubjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(value) => Self(value),
            Raw::Integer(value) => Self(value.to_string()),
            Raw::Float(value) => Self(value.to_string()),
        })
    }
}

/// One subject row: name, credit weight and grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub credits: InputValue,
    #[serde(default)]
    pub grade: InputValue,
}

/// Targeted single-field replacement for one subject.
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectUpdate {
    Name(String),
    Credits(InputValue),
    Grade(InputValue),
}

impl Subject {
    /// Creates a named subject with a generated id and no grade yet.
    pub fn new(name: impl Into<String>, credits: impl Into<InputValue>) -> Self {
        Self {
            id: SubjectId::generate(),
            name: name.into(),
            credits: credits.into(),
            grade: InputValue::empty(),
        }
    }

    /// Creates the empty template appended by "add subject".
    pub fn blank() -> Self {
        Self::new("", DEFAULT_NEW_SUBJECT_CREDITS)
    }

    /// Returns a copy carrying a newly generated id.
    pub fn with_fresh_id(&self) -> Self {
        Self {
            id: SubjectId::generate(),
            ..self.clone()
        }
    }

    /// Name for list/batch views; unnamed rows get a placeholder.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            UNNAMED_SUBJECT_LABEL
        } else {
            self.name.as_str()
        }
    }

    /// Credits when they parse to a number greater than zero.
    pub fn valid_credits(&self) -> Option<f64> {
        self.credits.as_number().filter(|credits| *credits > 0.0)
    }

    /// Grade when it parses to a whole number on the 1..=9 scale.
    pub fn valid_grade(&self) -> Option<f64> {
        self.grade
            .as_number()
            .filter(|grade| grade.fract() == 0.0 && (GRADE_MIN..=GRADE_MAX).contains(grade))
    }

    /// `(credits, grade)` when both are valid, i.e. when the subject counts
    /// toward a weighted average.
    pub fn weighted_pair(&self) -> Option<(f64, f64)> {
        Some((self.valid_credits()?, self.valid_grade()?))
    }

    /// Applies one field replacement. The id is never touched.
    pub fn apply(&mut self, update: SubjectUpdate) {
        match update {
            SubjectUpdate::Name(name) => self.name = name,
            SubjectUpdate::Credits(credits) => self.credits = credits,
            SubjectUpdate::Grade(grade) => self.grade = grade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Subject, SubjectId, SubjectUpdate};
    use crate::model::value::InputValue;

    #[test]
    fn blank_subject_uses_default_credits_and_no_grade() {
        let subject = Subject::blank();
        assert_eq!(subject.name, "");
        assert_eq!(subject.credits, InputValue::Number(3.0));
        assert!(subject.grade.is_unset());
        assert_eq!(subject.display_name(), "New subject");
    }

    #[test]
    fn grade_must_be_whole_and_on_scale() {
        let mut subject = Subject::new("Math", 4);
        for (raw, expected) in [
            ("1", Some(1.0)),
            ("9", Some(9.0)),
            ("0", None),
            ("10", None),
            ("2.5", None),
            ("", None),
        ] {
            subject.grade = InputValue::from(raw);
            assert_eq!(subject.valid_grade(), expected, "grade input {raw:?}");
        }
    }

    #[test]
    fn weighted_pair_requires_positive_credits() {
        let mut subject = Subject::new("Math", 0);
        subject.grade = InputValue::Number(2.0);
        assert_eq!(subject.weighted_pair(), None);

        subject.apply(SubjectUpdate::Credits(InputValue::from("4")));
        assert_eq!(subject.weighted_pair(), Some((4.0, 2.0)));
    }

    #[test]
    fn fresh_id_keeps_fields() {
        let subject = Subject::new("English", 4);
        let copy = subject.with_fresh_id();
        assert_ne!(copy.id, subject.id);
        assert_eq!(copy.name, subject.name);
        assert_eq!(copy.credits, subject.credits);
    }

    #[test]
    fn legacy_numeric_ids_decode_as_strings() {
        let ids: Vec<SubjectId> = serde_json::from_str("[1700000000001, 1700000000000.5, \"abc\"]")
            .expect("ids should decode");
        assert_eq!(ids[0].as_str(), "1700000000001");
        assert_eq!(ids[1].as_str(), "1700000000000.5");
        assert_eq!(ids[2].as_str(), "abc");
    }

    #[test]
    fn generated_ids_serialize_as_plain_strings() {
        let id = SubjectId::generate();
        assert_eq!(id.as_str().len(), 36);
        let json = serde_json::to_string(&id).expect("id should encode");
        assert_eq!(json, format!("\"{id}\""));
        let back: SubjectId = serde_json::from_str(&json).expect("id should decode");
        assert_eq!(back, id);
    }
}
