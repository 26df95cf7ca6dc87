//! Collaborator contracts for user-facing side channels.
//!
//! # Responsibility
//! - Define fire-and-forget notices and their display hints.
//! - Define the non-blocking confirmation request/response pair.

use crate::model::semester::EntryMode;

/// Visual severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Auto-dismissing message emitted by editing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Delete requested with an empty selection.
    NothingSelected,
    /// Paste requested with an empty clipboard.
    NothingToPaste,
    /// Batch grade editing requested on a manual-mode semester.
    BatchEditRequiresDetailed,
    /// Active semester copied to the clipboard.
    SemesterCopied,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Self::NothingSelected => "No subjects selected.",
            Self::NothingToPaste => "No copied semester data.",
            Self::BatchEditRequiresDetailed => {
                "This semester uses semester average entry. Batch grade input is only available in detailed entry mode."
            }
            Self::SemesterCopied => "Semester data copied!",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::SemesterCopied => Severity::Success,
            _ => Severity::Error,
        }
    }

    /// Suggested on-screen time before auto-dismissal.
    pub fn display_ms(self) -> u32 {
        match self {
            Self::BatchEditRequiresDetailed => 4_000,
            _ => 2_000,
        }
    }
}

/// Receives notices; must not block.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Class of destructive action awaiting confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmKind {
    DeleteSubjects,
    Paste,
    ClearSemester,
    ModeChange(EntryMode),
}

/// Prompt shown to the user before a destructive action is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub kind: ConfirmKind,
    pub message: String,
    /// Whether the prompt offers a "don't ask again" choice.
    pub offers_suppress: bool,
}

/// User answer to a [`ConfirmRequest`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmResponse {
    pub confirmed: bool,
    /// "Don't ask again" for this class of prompt.
    pub suppress_future: bool,
}

impl ConfirmResponse {
    pub fn confirm() -> Self {
        Self {
            confirmed: true,
            suppress_future: false,
        }
    }

    pub fn confirm_and_suppress() -> Self {
        Self {
            confirmed: true,
            suppress_future: true,
        }
    }

    pub fn cancel() -> Self {
        Self::default()
    }
}

/// Shows confirmation prompts.
///
/// Returns immediately; the answer arrives later through
/// `EditingWorkflow::resolve_confirmation`.
pub trait ConfirmPrompt {
    fn request_confirmation(&self, request: &ConfirmRequest);
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

impl<T: ConfirmPrompt + ?Sized> ConfirmPrompt for &T {
    fn request_confirmation(&self, request: &ConfirmRequest) {
        (**self).request_confirmation(request);
    }
}
