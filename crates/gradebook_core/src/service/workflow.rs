//! Semester editing workflow.
//!
//! # Responsibility
//! - Own the store, active semester, selection, clipboard and batch editor.
//! - Run add/update/select/delete/copy/paste/batch/clear/mode operations.
//! - Defer destructive operations behind a single pending confirmation.
//! - Hand a full snapshot to the writer after every applied mutation.
//!
//! # Invariants
//! - Selection only holds ids of the active semester's subjects; it is
//!   cleared on semester change and after a confirmed delete.
//! - At most one confirmation is pending; a newer request replaces it.
//! - Precondition failures notify and leave all state untouched.
//! - Read-only operations never write a snapshot.

use crate::model::semester::{EntryMode, ManualField, SemesterKey, SemesterRecord};
use crate::model::subject::{Subject, SubjectId, SubjectUpdate};
use crate::model::value::InputValue;
use crate::service::pending::{PendingAction, PendingChange};
use crate::service::prompt::{ConfirmPrompt, ConfirmResponse, Notice, Notifier};
use crate::service::settings::WorkflowSettings;
use crate::store::{SemesterStore, SnapshotWriter};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Working `subject id -> grade` map of the batch grade editor.
pub type BatchGrades = BTreeMap<SubjectId, InputValue>;

/// Result of one workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// State changed (and a snapshot was written when the store changed).
    Applied,
    /// A confirmation prompt was issued; nothing changed yet.
    AwaitingConfirmation,
    /// A precondition failed; the notice was sent and nothing changed.
    Rejected(Notice),
    /// A pending action was cancelled and dropped.
    Discarded,
    /// Nothing to do (unknown id, no pending prompt).
    Unchanged,
}

/// Open batch grade editor bound to one semester.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEditor {
    pub semester: SemesterKey,
    pub grades: BatchGrades,
}

/// Editing session over one semester store.
pub struct EditingWorkflow<W, N, C> {
    store: SemesterStore,
    active: SemesterKey,
    selection: BTreeSet<SubjectId>,
    clipboard: Option<SemesterRecord>,
    batch: Option<BatchEditor>,
    pending: Option<PendingAction>,
    settings: WorkflowSettings,
    writer: W,
    notifier: N,
    prompt: C,
}

impl<W, N, C> EditingWorkflow<W, N, C>
where
    W: SnapshotWriter,
    N: Notifier,
    C: ConfirmPrompt,
{
    /// Starts a session on the first semester with default settings.
    pub fn new(store: SemesterStore, writer: W, notifier: N, prompt: C) -> Self {
        Self {
            store,
            active: SemesterKey::ALL[0],
            selection: BTreeSet::new(),
            clipboard: None,
            batch: None,
            pending: None,
            settings: WorkflowSettings::default(),
            writer,
            notifier,
            prompt,
        }
    }

    /// Same as [`EditingWorkflow::new`] with explicit settings.
    pub fn with_settings(mut self, settings: WorkflowSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn store(&self) -> &SemesterStore {
        &self.store
    }

    pub fn active_semester(&self) -> SemesterKey {
        self.active
    }

    pub fn active_record(&self) -> &SemesterRecord {
        self.store.get(self.active)
    }

    pub fn settings(&self) -> WorkflowSettings {
        self.settings
    }

    /// Replaces the settings, returning the previous ones.
    pub fn replace_settings(&mut self, settings: WorkflowSettings) -> WorkflowSettings {
        std::mem::replace(&mut self.settings, settings)
    }

    pub fn clipboard(&self) -> Option<&SemesterRecord> {
        self.clipboard.as_ref()
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn batch_editor(&self) -> Option<&BatchEditor> {
        self.batch.as_ref()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn prompt(&self) -> &C {
        &self.prompt
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Waits until every snapshot handed to the writer is committed.
    pub fn flush(&mut self) {
        self.writer.flush();
    }

    pub fn selection(&self) -> &BTreeSet<SubjectId> {
        &self.selection
    }

    pub fn is_selected(&self, id: &SubjectId) -> bool {
        self.selection.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// Whether the "select all" box shows as checked.
    pub fn all_selected(&self) -> bool {
        let record = self.active_record();
        record.mode == EntryMode::Detailed
            && !record.subjects.is_empty()
            && record.subject_ids().all(|id| self.selection.contains(id))
    }

    /// Switches the active semester, clearing selection and batch editor.
    pub fn select_semester(&mut self, key: SemesterKey) {
        if key == self.active {
            return;
        }
        self.active = key;
        self.selection.clear();
        self.batch = None;
        debug!("event=semester_select module=workflow status=ok semester={key}");
    }

    /// Appends an empty subject with default credits to the active semester.
    pub fn add_subject(&mut self) -> SubjectId {
        let subject = Subject::blank();
        let id = subject.id.clone();
        self.store.get_mut(self.active).subjects.push(subject);
        self.commit("subject_add");
        id
    }

    /// Replaces one field of the subject `id`; unknown ids are a no-op.
    pub fn update_subject(&mut self, id: &SubjectId, update: SubjectUpdate) -> ActionOutcome {
        let Some(subject) = self.store.get_mut(self.active).subject_mut(id) else {
            return ActionOutcome::Unchanged;
        };
        subject.apply(update);
        self.commit("subject_update");
        ActionOutcome::Applied
    }

    /// Flips selection of `id`; ids outside the active semester are ignored.
    pub fn toggle_selection(&mut self, id: &SubjectId) -> bool {
        if !self.active_record().subject_ids().any(|known| known == id) {
            return false;
        }
        if !self.selection.remove(id) {
            self.selection.insert(id.clone());
        }
        true
    }

    /// Selects every subject unless all are already selected, else clears.
    pub fn toggle_select_all(&mut self) {
        let record = self.store.get(self.active);
        let everything_selected = !record.subjects.is_empty()
            && record.subject_ids().all(|id| self.selection.contains(id));
        if everything_selected {
            self.selection.clear();
        } else {
            self.selection = record.subject_ids().cloned().collect();
        }
    }

    /// Asks to delete the selected subjects.
    pub fn delete_selected(&mut self) -> ActionOutcome {
        if self.selection.is_empty() {
            return self.reject(Notice::NothingSelected);
        }
        let ids = self.selection.clone();
        self.request(PendingChange::DeleteSubjects(ids))
    }

    /// Snapshots the active semester into the clipboard.
    pub fn copy(&mut self) -> ActionOutcome {
        self.clipboard = Some(self.active_record().clone());
        self.notifier.notify(Notice::SemesterCopied);
        info!(
            "event=semester_copy module=workflow status=ok semester={}",
            self.active
        );
        ActionOutcome::Applied
    }

    /// Asks to overwrite the active semester with the clipboard.
    pub fn paste(&mut self) -> ActionOutcome {
        let Some(snapshot) = self.clipboard.clone() else {
            return self.reject(Notice::NothingToPaste);
        };
        self.request(PendingChange::Paste(snapshot))
    }

    /// Opens the batch grade editor seeded with current grades.
    pub fn open_batch_edit(&mut self) -> ActionOutcome {
        let record = self.active_record();
        if record.is_manual() {
            return self.reject(Notice::BatchEditRequiresDetailed);
        }
        let grades = record
            .subjects
            .iter()
            .map(|subject| (subject.id.clone(), subject.grade.clone()))
            .collect();
        self.batch = Some(BatchEditor {
            semester: self.active,
            grades,
        });
        ActionOutcome::Applied
    }

    /// Edits one grade in the open batch editor.
    pub fn set_batch_grade(&mut self, id: &SubjectId, grade: InputValue) -> bool {
        match self.batch.as_mut() {
            Some(editor) if editor.grades.contains_key(id) => {
                editor.grades.insert(id.clone(), grade);
                true
            }
            _ => false,
        }
    }

    /// Writes `working` grades into the active semester and closes the
    /// batch editor.
    ///
    /// Subjects absent from `working`, or whose working value is unset,
    /// keep their grade.
    pub fn save_batch_edit(&mut self, working: &BatchGrades) -> ActionOutcome {
        self.batch = None;
        let record = self.store.get_mut(self.active);
        let mut changed = 0_usize;
        for subject in &mut record.subjects {
            if let Some(grade) = working.get(&subject.id).filter(|grade| !grade.is_unset()) {
                if &subject.grade != grade {
                    subject.grade = grade.clone();
                    changed += 1;
                }
            }
        }
        if changed == 0 {
            return ActionOutcome::Unchanged;
        }
        debug!(
            "event=batch_save module=workflow status=ok semester={} changed={changed}",
            self.active
        );
        self.commit("batch_save");
        ActionOutcome::Applied
    }

    /// Saves the open batch editor's own working grades.
    pub fn commit_batch_edit(&mut self) -> ActionOutcome {
        match self.batch.take() {
            Some(editor) if editor.semester == self.active => self.save_batch_edit(&editor.grades),
            _ => ActionOutcome::Unchanged,
        }
    }

    pub fn close_batch_edit(&mut self) {
        self.batch = None;
    }

    /// Asks to reset the active semester to an empty detailed record.
    pub fn clear_semester(&mut self) -> ActionOutcome {
        self.request(PendingChange::ClearSemester)
    }

    /// Writes a manual-mode field as entered, without validation.
    pub fn set_manual_field(&mut self, field: ManualField, value: InputValue) -> ActionOutcome {
        self.store
            .get_mut(self.active)
            .set_manual_field(field, value);
        self.commit("manual_update");
        ActionOutcome::Applied
    }

    /// Switches the active semester's mode, confirming first unless the
    /// user opted out of mode-change prompts.
    pub fn set_mode(&mut self, mode: EntryMode) -> ActionOutcome {
        if self.settings.suppress_mode_change_confirm {
            PendingAction::new(self.active, PendingChange::SetMode(mode)).apply(&mut self.store);
            self.commit("mode_change");
            return ActionOutcome::Applied;
        }
        self.request(PendingChange::SetMode(mode))
    }

    /// Applies or discards the pending action according to `response`.
    pub fn resolve_confirmation(&mut self, response: ConfirmResponse) -> ActionOutcome {
        let Some(action) = self.pending.take() else {
            warn!("event=confirm_resolve module=workflow status=ignored reason=nothing_pending");
            return ActionOutcome::Unchanged;
        };
        if !response.confirmed {
            action.discard();
            return ActionOutcome::Discarded;
        }

        let change = action.change().clone();
        if response.suppress_future && matches!(change, PendingChange::SetMode(_)) {
            self.settings.suppress_mode_change_confirm = true;
            info!("event=settings_update module=workflow status=ok suppress_mode_change_confirm=true");
        }

        let semester = action.apply(&mut self.store);
        if semester == self.active {
            match change {
                PendingChange::DeleteSubjects(_) => self.selection.clear(),
                PendingChange::Paste(_) | PendingChange::ClearSemester => {
                    self.selection.clear();
                    self.batch = None;
                }
                PendingChange::SetMode(_) => {}
            }
        }
        self.commit(event_for(&change));
        ActionOutcome::Applied
    }

    fn request(&mut self, change: PendingChange) -> ActionOutcome {
        let action = PendingAction::new(self.active, change);
        let request = action.request();
        if let Some(previous) = self.pending.replace(action) {
            previous.discard();
        }
        self.prompt.request_confirmation(&request);
        debug!(
            "event=confirm_request module=workflow status=pending semester={} kind={:?}",
            self.active, request.kind
        );
        ActionOutcome::AwaitingConfirmation
    }

    fn reject(&self, notice: Notice) -> ActionOutcome {
        self.notifier.notify(notice);
        debug!(
            "event=workflow_reject module=workflow status=rejected semester={} notice={notice:?}",
            self.active
        );
        ActionOutcome::Rejected(notice)
    }

    fn commit(&mut self, event: &str) {
        self.writer.submit(&self.store);
        info!(
            "event={event} module=workflow status=ok semester={} subjects={}",
            self.active,
            self.active_record().subjects.len()
        );
    }
}

fn event_for(change: &PendingChange) -> &'static str {
    match change {
        PendingChange::DeleteSubjects(_) => "subjects_delete",
        PendingChange::Paste(_) => "semester_paste",
        PendingChange::ClearSemester => "semester_clear",
        PendingChange::SetMode(_) => "mode_change",
    }
}
