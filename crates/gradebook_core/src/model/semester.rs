//! Semester domain model.
//!
//! # Responsibility
//! - Define the fixed semester keys and the per-semester record.
//! - Hold the mode tag that decides which input style is authoritative.
//!
//! # Invariants
//! - `mode = Detailed`: `subjects` is authoritative, manual fields are kept.
//! - `mode = Manual`: manual fields are authoritative, `subjects` is kept.
//! - Switching mode only relabels; it never clears the inactive data.
//! - Subject ids are unique within one record.

use crate::model::subject::{Subject, SubjectId};
use crate::model::value::InputValue;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

/// Input style of one semester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryMode {
    /// Itemized subjects with credits and grades.
    Detailed,
    /// Directly entered semester average and credit total.
    Manual,
}

impl EntryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Detailed => "detailed",
            Self::Manual => "manual",
        }
    }

    /// User-facing mode name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Detailed => "Detailed entry",
            Self::Manual => "Semester average entry",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "detailed" => Some(Self::Detailed),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

/// Number of fixed semesters tracked by the store.
pub const SEMESTER_COUNT: usize = 5;

/// One of the fixed semesters tracked by the store, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SemesterKey {
    Y1S1,
    Y1S2,
    Y2S1,
    Y2S2,
    Y3S1,
}

/// Reference credit totals shown next to the manual-entry form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditHint {
    pub total: u32,
    /// Total without the electives named in `excluding`.
    pub reduced: Option<(u32, &'static str)>,
}

impl SemesterKey {
    /// Every fixed key in display order.
    pub const ALL: [SemesterKey; SEMESTER_COUNT] = [Self::Y1S1, Self::Y1S2, Self::Y2S1, Self::Y2S2, Self::Y3S1];

    /// Persisted key string (`"1-1"` .. `"3-1"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Y1S1 => "1-1",
            Self::Y1S2 => "1-2",
            Self::Y2S1 => "2-1",
            Self::Y2S2 => "2-2",
            Self::Y3S1 => "3-1",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value.trim())
    }

    /// Position inside [`SemesterKey::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn year(self) -> u8 {
        match self {
            Self::Y1S1 | Self::Y1S2 => 1,
            Self::Y2S1 | Self::Y2S2 => 2,
            Self::Y3S1 => 3,
        }
    }

    pub fn term(self) -> u8 {
        match self {
            Self::Y1S1 | Self::Y2S1 | Self::Y3S1 => 1,
            Self::Y1S2 | Self::Y2S2 => 2,
        }
    }

    /// Tab label, e.g. `Year 2 Semester 1`.
    pub fn label(self) -> String {
        format!("Year {} Semester {}", self.year(), self.term())
    }

    pub fn credit_hint(self) -> CreditHint {
        match self.year() {
            1 => CreditHint {
                total: 24,
                reduced: Some((21, "Technology/Home Economics and Classical Chinese")),
            },
            2 => CreditHint {
                total: 25,
                reduced: Some((23, "Second Foreign Language")),
            },
            _ => CreditHint {
                total: 9,
                reduced: None,
            },
        }
    }
}

impl Display for SemesterKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directly editable manual-mode field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualField {
    Gpa,
    TotalCredits,
}

/// Full record of one semester in either input style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterRecord {
    pub mode: EntryMode,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(rename = "manualGPA", default)]
    pub manual_gpa: InputValue,
    #[serde(rename = "manualTotalCredits", default)]
    pub manual_total_credits: InputValue,
}

impl SemesterRecord {
    /// Detailed-mode record over `subjects` with empty manual fields.
    pub fn detailed(subjects: Vec<Subject>) -> Self {
        Self {
            mode: EntryMode::Detailed,
            subjects,
            manual_gpa: InputValue::empty(),
            manual_total_credits: InputValue::empty(),
        }
    }

    /// The state produced by "clear semester".
    pub fn empty_detailed() -> Self {
        Self::detailed(Vec::new())
    }

    pub fn is_manual(&self) -> bool {
        self.mode == EntryMode::Manual
    }

    pub fn subject_ids(&self) -> impl Iterator<Item = &SubjectId> {
        self.subjects.iter().map(|subject| &subject.id)
    }

    pub fn subject_mut(&mut self, id: &SubjectId) -> Option<&mut Subject> {
        self.subjects.iter_mut().find(|subject| &subject.id == id)
    }

    pub fn manual_field(&self, field: ManualField) -> &InputValue {
        match field {
            ManualField::Gpa => &self.manual_gpa,
            ManualField::TotalCredits => &self.manual_total_credits,
        }
    }

    pub fn set_manual_field(&mut self, field: ManualField, value: InputValue) {
        match field {
            ManualField::Gpa => self.manual_gpa = value,
            ManualField::TotalCredits => self.manual_total_credits = value,
        }
    }

    /// Deep copy in which every subject carries a newly generated id.
    ///
    /// Mode and manual fields are preserved verbatim.
    pub fn with_renewed_ids(&self) -> Self {
        Self {
            subjects: self.subjects.iter().map(Subject::with_fresh_id).collect(),
            ..self.clone()
        }
    }

    /// Returns whether no two subjects share an id.
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.subjects.len());
        self.subject_ids().all(|id| seen.insert(id))
    }
}
