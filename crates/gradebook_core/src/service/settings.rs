//! Workflow preferences held for the lifetime of one workflow instance.

/// Explicit, resettable workflow configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Skip the confirmation prompt on every future mode change.
    pub suppress_mode_change_confirm: bool,
}
