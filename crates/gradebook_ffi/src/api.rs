//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose one process-wide editing session to Dart via FRB.
//! - Translate UI strings into typed core operations and back.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - All session mutations go through one mutex (single writer).
//! - Snapshot writes run on the background writer, in mutation order.

use gradebook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    overall_gpa, overall_total_credits, ping as ping_inner, semester_gpa, semester_total_credits,
    store, ActionOutcome, BackgroundWriter, ConfirmPrompt, ConfirmRequest, ConfirmResponse,
    EditingWorkflow, EntryMode, InputValue, LogDiagnostics, ManualField, Notice, Notifier,
    SemesterKey, Severity, SqliteBlobStore, SubjectId, SubjectUpdate,
};
use log::info;
use std::cell::RefCell;
use std::sync::Mutex;

/// Notices queued until the UI drains them.
#[derive(Default)]
struct QueuedNotices {
    items: RefCell<Vec<Notice>>,
}

impl Notifier for QueuedNotices {
    fn notify(&self, notice: Notice) {
        self.items.borrow_mut().push(notice);
    }
}

/// Latest confirmation prompt the UI should show.
#[derive(Default)]
struct QueuedPrompt {
    current: RefCell<Option<ConfirmRequest>>,
}

impl ConfirmPrompt for QueuedPrompt {
    fn request_confirmation(&self, request: &ConfirmRequest) {
        *self.current.borrow_mut() = Some(request.clone());
    }
}

type Session = EditingWorkflow<BackgroundWriter, QueuedNotices, QueuedPrompt>;

static SESSION: Mutex<Option<Session>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the call reached the session and was not rejected.
    pub ok: bool,
    /// `applied|awaiting_confirmation|rejected|discarded|unchanged|error`.
    pub outcome: String,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn from_outcome(outcome: ActionOutcome) -> Self {
        let (ok, label, message) = match outcome {
            ActionOutcome::Applied => (true, "applied", String::new()),
            ActionOutcome::AwaitingConfirmation => (true, "awaiting_confirmation", String::new()),
            ActionOutcome::Rejected(notice) => (false, "rejected", notice.message().to_string()),
            ActionOutcome::Discarded => (true, "discarded", String::new()),
            ActionOutcome::Unchanged => (true, "unchanged", String::new()),
        };
        Self {
            ok,
            outcome: label.to_string(),
            message,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            outcome: "error".to_string(),
            message: message.into(),
        }
    }
}

/// One semester tab with its computed figures.
#[derive(Debug, Clone, PartialEq)]
pub struct SemesterSummary {
    pub key: String,
    pub label: String,
    pub mode: String,
    pub gpa: String,
    pub total_credits: f64,
}

/// Whole-store overview for the header and tabs.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewResponse {
    pub ok: bool,
    pub message: String,
    pub active_semester: String,
    pub semesters: Vec<SemesterSummary>,
    pub overall_gpa: String,
    pub overall_total_credits: f64,
}

/// One subject row of the active semester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRow {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub credits: String,
    pub grade: String,
    pub selected: bool,
}

/// Editable view of the active semester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemesterDetail {
    pub ok: bool,
    pub message: String,
    pub key: String,
    pub mode: String,
    pub subjects: Vec<SubjectRow>,
    pub all_selected: bool,
    pub manual_gpa: String,
    pub manual_total_credits: String,
    pub credit_hint: String,
    /// Grades of the open batch editor, by subject id; empty when closed.
    pub batch_grades: Vec<(String, String)>,
}

/// Notice waiting to be shown as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeItem {
    pub message: String,
    pub is_error: bool,
    pub display_ms: u32,
}

/// Confirmation prompt waiting to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptItem {
    pub message: String,
    pub offers_suppress: bool,
}

/// Opens (or reopens) the session backed by the SQLite file at `db_path`.
///
/// Any previous session is flushed and closed before the store is read, so
/// the new session starts from every write the old one accepted.
/// Corrupt or unreadable saved data falls back to the default semesters.
///
/// # FFI contract
/// - Sync call, DB-backed execution; blocks until prior writes land.
/// - Never panics.
/// - Returns `applied` on success, `error` with a message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn session_open(db_path: String) -> ActionResponse {
    let db_path = db_path.trim().to_string();
    if db_path.is_empty() {
        return ActionResponse::failure("session_open failed: db_path cannot be empty");
    }
    let Ok(mut guard) = SESSION.lock() else {
        return ActionResponse::failure("session_open failed: session lock poisoned");
    };
    if let Some(mut previous) = guard.take() {
        previous.flush();
        info!("event=session_close module=ffi status=ok reason=reopen");
    }

    let loaded = match SqliteBlobStore::open(&db_path) {
        Ok(blob) => store::load(&blob, &LogDiagnostics),
        Err(err) => return ActionResponse::failure(format!("session_open failed: {err}")),
    };
    let writer = match SqliteBlobStore::open(&db_path)
        .map_err(|err| err.to_string())
        .and_then(|blob| {
            BackgroundWriter::spawn(blob, LogDiagnostics).map_err(|err| err.to_string())
        }) {
        Ok(writer) => writer,
        Err(err) => return ActionResponse::failure(format!("session_open failed: {err}")),
    };

    *guard = Some(EditingWorkflow::new(
        loaded.store,
        writer,
        QueuedNotices::default(),
        QueuedPrompt::default(),
    ));
    info!(
        "event=session_open module=ffi status=ok source={:?}",
        loaded.source
    );
    ActionResponse::from_outcome(ActionOutcome::Applied)
}

/// Flushes pending writes and closes the session.
///
/// # FFI contract
/// - Sync call; blocks until queued writes land.
/// - Never panics.
/// - Returns `unchanged` when no session is open.
#[flutter_rust_bridge::frb(sync)]
pub fn session_close() -> ActionResponse {
    let Ok(mut guard) = SESSION.lock() else {
        return ActionResponse::failure("session_close failed: session lock poisoned");
    };
    match guard.take() {
        Some(mut session) => {
            session.flush();
            ActionResponse::from_outcome(ActionOutcome::Applied)
        }
        None => ActionResponse::from_outcome(ActionOutcome::Unchanged),
    }
}

/// Returns per-semester and overall figures.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
/// - `ok=false` with a message when no session is open.
#[flutter_rust_bridge::frb(sync)]
pub fn semester_overview() -> OverviewResponse {
    let result = with_session(|session| {
        let store = session.store();
        OverviewResponse {
            ok: true,
            message: String::new(),
            active_semester: session.active_semester().as_str().to_string(),
            semesters: store
                .iter()
                .map(|(key, record)| SemesterSummary {
                    key: key.as_str().to_string(),
                    label: key.label(),
                    mode: record.mode.as_str().to_string(),
                    gpa: semester_gpa(record),
                    total_credits: semester_total_credits(record),
                })
                .collect(),
            overall_gpa: overall_gpa(store),
            overall_total_credits: overall_total_credits(store),
        }
    });
    result.unwrap_or_else(|err| OverviewResponse {
        ok: false,
        message: format!("semester_overview failed: {err}"),
        active_semester: String::new(),
        semesters: Vec::new(),
        overall_gpa: "0.00".to_string(),
        overall_total_credits: 0.0,
    })
}

/// Returns the editable view of the active semester.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
/// - `ok=false` with a message when no session is open.
#[flutter_rust_bridge::frb(sync)]
pub fn active_semester_detail() -> SemesterDetail {
    let result = with_session(|session| {
        let key = session.active_semester();
        let record = session.active_record();
        let hint = key.credit_hint();
        let credit_hint = match hint.reduced {
            Some((reduced, excluding)) => format!(
                "Total credits {}, {} excluding {}.",
                hint.total, reduced, excluding
            ),
            None => format!("Total credits {}.", hint.total),
        };
        SemesterDetail {
            ok: true,
            message: String::new(),
            key: key.as_str().to_string(),
            mode: record.mode.as_str().to_string(),
            subjects: record
                .subjects
                .iter()
                .map(|subject| SubjectRow {
                    id: subject.id.to_string(),
                    name: subject.name.clone(),
                    display_name: subject.display_name().to_string(),
                    credits: subject.credits.to_string(),
                    grade: subject.grade.to_string(),
                    selected: session.is_selected(&subject.id),
                })
                .collect(),
            all_selected: session.all_selected(),
            manual_gpa: record.manual_gpa.to_string(),
            manual_total_credits: record.manual_total_credits.to_string(),
            credit_hint,
            batch_grades: session
                .batch_editor()
                .map(|editor| {
                    editor
                        .grades
                        .iter()
                        .map(|(id, grade)| (id.to_string(), grade.to_string()))
                        .collect()
                })
                .unwrap_or_default(),
        }
    });
    result.unwrap_or_else(|err| SemesterDetail {
        ok: false,
        message: format!("active_semester_detail failed: {err}"),
        key: String::new(),
        mode: String::new(),
        subjects: Vec::new(),
        all_selected: false,
        manual_gpa: String::new(),
        manual_total_credits: String::new(),
        credit_hint: String::new(),
        batch_grades: Vec::new(),
    })
}

/// Switches the active semester tab (`"1-1"` .. `"3-1"`).
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
/// - Clears the selection and closes the batch editor.
#[flutter_rust_bridge::frb(sync)]
pub fn select_semester(key: String) -> ActionResponse {
    let Some(key) = SemesterKey::parse(&key) else {
        return ActionResponse::failure(format!("unknown semester key: {key}"));
    };
    run("select_semester", |session| {
        session.select_semester(key);
        ActionOutcome::Applied
    })
}

/// Appends a blank subject to the active semester.
///
/// # FFI contract
/// - Sync call; committed changes are queued to the background writer.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn add_subject() -> ActionResponse {
    run("add_subject", |session| {
        session.add_subject();
        ActionOutcome::Applied
    })
}

/// Renames one subject of the active semester.
///
/// # FFI contract
/// - Sync call; committed changes are queued to the background writer.
/// - Never panics.
/// - Unknown ids return `unchanged`.
#[flutter_rust_bridge::frb(sync)]
pub fn update_subject_name(id: String, name: String) -> ActionResponse {
    run("update_subject_name", |session| {
        session.update_subject(&SubjectId::new(id), SubjectUpdate::Name(name))
    })
}

/// Updates credits from raw form input (integer coercion applies).
///
/// # FFI contract
/// - Sync call; committed changes are queued to the background writer.
/// - Never panics.
/// - Unknown ids return `unchanged`.
#[flutter_rust_bridge::frb(sync)]
pub fn update_subject_credits(id: String, raw: String) -> ActionResponse {
    let credits = InputValue::from_integer_input(&raw);
    run("update_subject_credits", |session| {
        session.update_subject(&SubjectId::new(id), SubjectUpdate::Credits(credits))
    })
}

/// Updates a grade from raw form input (integer coercion applies).
///
/// # FFI contract
/// - Sync call; committed changes are queued to the background writer.
/// - Never panics.
/// - Unknown ids return `unchanged`.
#[flutter_rust_bridge::frb(sync)]
pub fn update_subject_grade(id: String, raw: String) -> ActionResponse {
    let grade = InputValue::from_integer_input(&raw);
    run("update_subject_grade", |session| {
        session.update_subject(&SubjectId::new(id), SubjectUpdate::Grade(grade))
    })
}

/// Flips the selection of one subject.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
/// - Ids outside the active semester return `unchanged`.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_subject_selection(id: String) -> ActionResponse {
    run("toggle_subject_selection", |session| {
        if session.toggle_selection(&SubjectId::new(id)) {
            ActionOutcome::Applied
        } else {
            ActionOutcome::Unchanged
        }
    })
}

/// Selects every subject, or clears the selection when all are selected.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_select_all() -> ActionResponse {
    run("toggle_select_all", |session| {
        session.toggle_select_all();
        ActionOutcome::Applied
    })
}

/// Asks to delete the selected subjects.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
/// - Returns `awaiting_confirmation`; nothing is removed until resolved.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_selected() -> ActionResponse {
    run("delete_selected", Session::delete_selected)
}

/// Copies the active semester into the clipboard and queues a notice.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn copy_semester() -> ActionResponse {
    run("copy_semester", Session::copy)
}

/// Asks to overwrite the active semester with the clipboard.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
/// - Returns `rejected` when the clipboard is empty.
#[flutter_rust_bridge::frb(sync)]
pub fn paste_semester() -> ActionResponse {
    run("paste_semester", Session::paste)
}

/// Asks to reset the active semester to an empty detailed record.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn clear_semester() -> ActionResponse {
    run("clear_semester", Session::clear_semester)
}

/// Opens the batch grade editor over the active semester.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
/// - Returns `rejected` in manual mode.
#[flutter_rust_bridge::frb(sync)]
pub fn open_batch_edit() -> ActionResponse {
    run("open_batch_edit", Session::open_batch_edit)
}

/// Edits one working grade of the open batch editor (raw text kept).
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn set_batch_grade(id: String, raw: String) -> ActionResponse {
    run("set_batch_grade", |session| {
        if session.set_batch_grade(&SubjectId::new(id), InputValue::from(raw)) {
            ActionOutcome::Applied
        } else {
            ActionOutcome::Unchanged
        }
    })
}

/// Writes the batch editor grades back and closes it.
///
/// # FFI contract
/// - Sync call; committed changes are queued to the background writer.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn save_batch_edit() -> ActionResponse {
    run("save_batch_edit", Session::commit_batch_edit)
}

/// Discards the batch editor without writing.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn close_batch_edit() -> ActionResponse {
    run("close_batch_edit", |session| {
        session.close_batch_edit();
        ActionOutcome::Applied
    })
}

/// Writes `manualGPA` or `manualTotalCredits` as entered.
///
/// # FFI contract
/// - Sync call; committed changes are queued to the background writer.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn set_manual_field(field: String, value: String) -> ActionResponse {
    let field = match field.trim() {
        "manualGPA" => ManualField::Gpa,
        "manualTotalCredits" => ManualField::TotalCredits,
        other => return ActionResponse::failure(format!("unknown manual field: {other}")),
    };
    run("set_manual_field", |session| {
        session.set_manual_field(field, InputValue::from(value))
    })
}

/// Switches the active semester to `"detailed"` or `"manual"`.
///
/// # FFI contract
/// - Sync call; committed changes are queued to the background writer.
/// - Never panics.
/// - Asks for confirmation unless the prompt was suppressed.
#[flutter_rust_bridge::frb(sync)]
pub fn set_mode(mode: String) -> ActionResponse {
    let Some(mode) = EntryMode::parse(&mode) else {
        return ActionResponse::failure(format!("unknown mode: {mode}"));
    };
    run("set_mode", |session| session.set_mode(mode))
}

/// Answers the pending confirmation prompt.
///
/// # FFI contract
/// - Sync call; committed changes are queued to the background writer.
/// - Never panics.
/// - Returns `unchanged` when nothing is pending.
#[flutter_rust_bridge::frb(sync)]
pub fn resolve_confirmation(confirmed: bool, suppress_future: bool) -> ActionResponse {
    let response = ConfirmResponse {
        confirmed,
        suppress_future,
    };
    run("resolve_confirmation", |session| {
        let outcome = session.resolve_confirmation(response);
        session.prompt().current.borrow_mut().take();
        outcome
    })
}

/// Drains queued notices in emission order.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
/// - Returns an empty list when no session is open.
#[flutter_rust_bridge::frb(sync)]
pub fn take_notices() -> Vec<NoticeItem> {
    with_session(|session| {
        session
            .notifier()
            .items
            .borrow_mut()
            .drain(..)
            .map(|notice| NoticeItem {
                message: notice.message().to_string(),
                is_error: notice.severity() == Severity::Error,
                display_ms: notice.display_ms(),
            })
            .collect()
    })
    .unwrap_or_default()
}

/// Returns the prompt awaiting an answer, if any.
///
/// # FFI contract
/// - Sync call, in-memory execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn pending_prompt() -> Option<PromptItem> {
    with_session(|session| {
        session
            .prompt()
            .current
            .borrow()
            .as_ref()
            .map(|request| PromptItem {
                message: request.message.clone(),
                offers_suppress: request.offers_suppress,
            })
    })
    .ok()
    .flatten()
}

fn with_session<T>(f: impl FnOnce(&mut Session) -> T) -> Result<T, String> {
    let mut guard = SESSION
        .lock()
        .map_err(|_| "session lock poisoned".to_string())?;
    let session = guard
        .as_mut()
        .ok_or_else(|| "session is not open".to_string())?;
    Ok(f(session))
}

fn run(operation: &str, f: impl FnOnce(&mut Session) -> ActionOutcome) -> ActionResponse {
    match with_session(f) {
        Ok(outcome) => ActionResponse::from_outcome(outcome),
        Err(err) => ActionResponse::failure(format!("{operation} failed: {err}")),
    }
}
