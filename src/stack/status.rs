// ABOUTME: Stack status model: pipeline-visible status and raw status outcomes.
// ABOUTME: A lookup table maps every known provider status to in-progress, success, or failure.

/// Status of a stack as the reconciler sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackStatus {
    DoesNotExist,
    InProgress,
    Completed,
}

/// Outcome encoded by a raw provider status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutcome {
    InProgress,
    Success,
    Failure,
}

impl StatusOutcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, StatusOutcome::InProgress)
    }
}

const STATUS_TABLE: &[(&str, StatusOutcome)] = &[
    ("CREATE_IN_PROGRESS", StatusOutcome::InProgress),
    ("CREATE_COMPLETE", StatusOutcome::Success),
    ("CREATE_FAILED", StatusOutcome::Failure),
    ("CREATE_ROLLBACK_COMPLETE", StatusOutcome::Failure),
    ("CREATE_ROLLBACK_FAILED", StatusOutcome::Failure),
    ("ROLLBACK_IN_PROGRESS", StatusOutcome::InProgress),
    ("ROLLBACK_COMPLETE", StatusOutcome::Failure),
    ("ROLLBACK_FAILED", StatusOutcome::Failure),
    ("DELETE_IN_PROGRESS", StatusOutcome::InProgress),
    ("DELETE_COMPLETE", StatusOutcome::Success),
    ("DELETE_FAILED", StatusOutcome::Failure),
    ("UPDATE_IN_PROGRESS", StatusOutcome::InProgress),
    ("UPDATE_COMPLETE_CLEANUP_IN_PROGRESS", StatusOutcome::InProgress),
    ("UPDATE_COMPLETE", StatusOutcome::Success),
    ("UPDATE_FAILED", StatusOutcome::Failure),
    ("UPDATE_ROLLBACK_IN_PROGRESS", StatusOutcome::InProgress),
    ("UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS", StatusOutcome::InProgress),
    ("UPDATE_ROLLBACK_COMPLETE", StatusOutcome::Failure),
    ("UPDATE_ROLLBACK_FAILED", StatusOutcome::Failure),
    ("REVIEW_IN_PROGRESS", StatusOutcome::InProgress),
    ("IMPORT_IN_PROGRESS", StatusOutcome::InProgress),
    ("IMPORT_COMPLETE", StatusOutcome::Success),
    ("IMPORT_ROLLBACK_IN_PROGRESS", StatusOutcome::InProgress),
    ("IMPORT_ROLLBACK_COMPLETE", StatusOutcome::Failure),
    ("IMPORT_ROLLBACK_FAILED", StatusOutcome::Failure),
];

/// Statuses a stack can never be updated out of; it must be deleted and
/// created again.
const MUST_DELETE: &[&str] = &[
    "CREATE_FAILED",
    "ROLLBACK_COMPLETE",
    "ROLLBACK_FAILED",
    "DELETE_FAILED",
    "UPDATE_ROLLBACK_FAILED",
];

/// Map a raw provider status onto its outcome. Comparison ignores case.
///
/// Statuses missing from the table fall back to their suffix: `_COMPLETE` is
/// success unless it names a rollback, `_FAILED` is failure, anything else is
/// still in progress.
pub fn outcome(raw: &str) -> StatusOutcome {
    let status = raw.trim().to_ascii_uppercase();

    if let Some((_, outcome)) = STATUS_TABLE.iter().find(|(s, _)| *s == status) {
        return *outcome;
    }

    if status.ends_with("_FAILED") {
        StatusOutcome::Failure
    } else if status.ends_with("_COMPLETE") {
        if status.contains("ROLLBACK") {
            StatusOutcome::Failure
        } else {
            StatusOutcome::Success
        }
    } else {
        StatusOutcome::InProgress
    }
}

/// Whether a stack in this status has to be deleted before it can be deployed.
pub fn must_delete(raw: &str) -> bool {
    let status = raw.trim().to_ascii_uppercase();
    MUST_DELETE.contains(&status.as_str())
}

impl From<StatusOutcome> for StackStatus {
    fn from(outcome: StatusOutcome) -> Self {
        if outcome.is_terminal() {
            StackStatus::Completed
        } else {
            StackStatus::InProgress
        }
    }
}
