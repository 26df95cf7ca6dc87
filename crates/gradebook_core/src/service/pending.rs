//! Deferred destructive changes awaiting user confirmation.
//!
//! # Responsibility
//! - Capture everything a destructive change needs at request time.
//! - Apply the change to the store on approval, or drop it on cancel.
//!
//! # Invariants
//! - A pending action targets the semester active when it was requested.
//! - Applying consumes the action, so it can run at most once.

use crate::model::semester::{EntryMode, SemesterKey, SemesterRecord};
use crate::model::subject::SubjectId;
use crate::service::prompt::{ConfirmKind, ConfirmRequest};
use crate::store::SemesterStore;
use log::debug;
use std::collections::BTreeSet;

/// The change a pending action will make.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingChange {
    /// Remove every subject whose id is in the set.
    DeleteSubjects(BTreeSet<SubjectId>),
    /// Overwrite the semester with this clipboard snapshot.
    Paste(SemesterRecord),
    /// Reset the semester to an empty detailed record.
    ClearSemester,
    /// Relabel the semester's input mode.
    SetMode(EntryMode),
}

/// A destructive change bound to one semester, waiting for approval.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction {
    semester: SemesterKey,
    change: PendingChange,
}

impl PendingAction {
    pub fn new(semester: SemesterKey, change: PendingChange) -> Self {
        Self { semester, change }
    }

    pub fn semester(&self) -> SemesterKey {
        self.semester
    }

    pub fn change(&self) -> &PendingChange {
        &self.change
    }

    pub fn kind(&self) -> ConfirmKind {
        match &self.change {
            PendingChange::DeleteSubjects(_) => ConfirmKind::DeleteSubjects,
            PendingChange::Paste(_) => ConfirmKind::Paste,
            PendingChange::ClearSemester => ConfirmKind::ClearSemester,
            PendingChange::SetMode(mode) => ConfirmKind::ModeChange(*mode),
        }
    }

    /// Prompt text describing the change.
    pub fn description(&self) -> String {
        match &self.change {
            PendingChange::DeleteSubjects(ids) => format!(
                "Delete {} subject(s)? This cannot be undone.",
                ids.len()
            ),
            PendingChange::Paste(_) => {
                "Overwrite all subjects and scores of this semester with the copied data?"
                    .to_string()
            }
            PendingChange::ClearSemester => {
                "Delete all subjects and scores of this semester? This cannot be undone."
                    .to_string()
            }
            PendingChange::SetMode(mode) => format!(
                "Switch this semester's input mode to \"{}\"? Existing data is kept.",
                mode.label()
            ),
        }
    }

    pub fn request(&self) -> ConfirmRequest {
        ConfirmRequest {
            kind: self.kind(),
            message: self.description(),
            offers_suppress: matches!(self.change, PendingChange::SetMode(_)),
        }
    }

    /// Applies the change to its semester and returns the affected key.
    pub(crate) fn apply(self, store: &mut SemesterStore) -> SemesterKey {
        let record = store.get_mut(self.semester);
        match self.change {
            PendingChange::DeleteSubjects(ids) => {
                record.subjects.retain(|subject| !ids.contains(&subject.id));
            }
            PendingChange::Paste(snapshot) => {
                *record = snapshot.with_renewed_ids();
            }
            PendingChange::ClearSemester => {
                *record = SemesterRecord::empty_detailed();
            }
            PendingChange::SetMode(mode) => {
                record.mode = mode;
            }
        }
        self.semester
    }

    /// Drops the change without touching any state.
    pub(crate) fn discard(self) {
        debug!(
            "event=confirm_discard module=workflow status=ok semester={} kind={:?}",
            self.semester,
            self.kind()
        );
    }
}
