//! Per-document state machine
//!
//! PENDING -> FETCHING -> EDITING -> SUBMITTING -> DONE
//!
//! Every non-terminal state may fall through to FAILED. EDITING may end in
//! SKIPPED (dry-run or unchanged). PENDING may end in SKIPPED when a stop was
//! requested. Terminal states never transition again.

use super::outcome::{EditOutcome, SkipReason};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentState {
    Pending,
    Fetching,
    Editing,
    Submitting,
    Finished(EditOutcome),
}

impl DocumentState {
    /// Name for observability
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Fetching => "FETCHING",
            Self::Editing => "EDITING",
            Self::Submitting => "SUBMITTING",
            Self::Finished(outcome) => outcome.label(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    /// Whether `next` is an allowed successor of `self`
    pub fn can_transition_to(&self, next: &DocumentState) -> bool {
        use DocumentState::*;
        use EditOutcome::*;

        match (self, next) {
            (Pending, Fetching) => true,
            (Pending, Finished(Skipped(SkipReason::Cancelled))) => true,
            (Fetching, Editing) => true,
            (Editing, Submitting) => true,
            (Editing, Finished(Skipped(SkipReason::DryRun | SkipReason::Unchanged))) => true,
            (Submitting, Finished(Updated)) => true,
            (Fetching | Editing | Submitting, Finished(Failed(_))) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::errors::CollaboratorError;
    use crate::sync::outcome::FailureReason;

    fn failed() -> DocumentState {
        DocumentState::Finished(EditOutcome::Failed(FailureReason::Fetch(
            CollaboratorError::network("down"),
        )))
    }

    #[test]
    fn test_happy_path_transitions() {
        use DocumentState::*;
        assert!(Pending.can_transition_to(&Fetching));
        assert!(Fetching.can_transition_to(&Editing));
        assert!(Editing.can_transition_to(&Submitting));
        assert!(Submitting.can_transition_to(&Finished(EditOutcome::Updated)));
    }

    #[test]
    fn test_failure_from_active_states_only() {
        use DocumentState::*;
        assert!(Fetching.can_transition_to(&failed()));
        assert!(Editing.can_transition_to(&failed()));
        assert!(Submitting.can_transition_to(&failed()));
        assert!(!Pending.can_transition_to(&failed()));
    }

    #[test]
    fn test_skips() {
        use DocumentState::*;
        let dry = Finished(EditOutcome::Skipped(SkipReason::DryRun));
        let cancelled = Finished(EditOutcome::Skipped(SkipReason::Cancelled));
        assert!(Editing.can_transition_to(&dry));
        assert!(!Submitting.can_transition_to(&dry));
        assert!(Pending.can_transition_to(&cancelled));
        assert!(!Fetching.can_transition_to(&cancelled));
    }

    #[test]
    fn test_terminal_states_are_final() {
        use DocumentState::*;
        let done = Finished(EditOutcome::Updated);
        assert!(done.is_terminal());
        assert!(!done.can_transition_to(&Fetching));
        assert!(!failed().can_transition_to(&Finished(EditOutcome::Updated)));
    }

    #[test]
    fn test_no_skipping_ahead() {
        use DocumentState::*;
        assert!(!Pending.can_transition_to(&Editing));
        assert!(!Fetching.can_transition_to(&Submitting));
        assert!(!Editing.can_transition_to(&Finished(EditOutcome::Updated)));
    }
}
