//! Lifecycle of a single transaction submission

use alloy_primitives::TxHash;

use super::error::SubmissionError;

/// Phase tag of a [`SubmissionState`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionPhase {
    Idle,
    AwaitingSignature,
    AwaitingConfirmation,
    Confirmed,
    Failed,
}

impl SubmissionPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::AwaitingSignature => "awaiting signature",
            SubmissionPhase::AwaitingConfirmation => "awaiting confirmation",
            SubmissionPhase::Confirmed => "confirmed",
            SubmissionPhase::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionPhase::Confirmed | SubmissionPhase::Failed)
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SubmissionPhase::AwaitingSignature | SubmissionPhase::AwaitingConfirmation
        )
    }
}

/// State machine for one submission.
///
/// ```text
/// Idle --begin--> AwaitingSignature --signed--> AwaitingConfirmation --confirmed--> Confirmed
///                 AwaitingSignature --fail--> Failed
///                 AwaitingConfirmation --fail--> Failed
/// Idle --fail--> Failed            (local validation)
/// any --reset--> Idle
/// ```
///
/// Transition methods return `false` and leave the state untouched when the
/// move is not allowed from the current phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    AwaitingSignature,
    AwaitingConfirmation {
        tx_hash: TxHash,
    },
    Confirmed {
        tx_hash: TxHash,
        block_number: Option<u64>,
    },
    Failed {
        tx_hash: Option<TxHash>,
        error: SubmissionError,
    },
}

impl SubmissionState {
    pub fn phase(&self) -> SubmissionPhase {
        match self {
            SubmissionState::Idle => SubmissionPhase::Idle,
            SubmissionState::AwaitingSignature => SubmissionPhase::AwaitingSignature,
            SubmissionState::AwaitingConfirmation { .. } => SubmissionPhase::AwaitingConfirmation,
            SubmissionState::Confirmed { .. } => SubmissionPhase::Confirmed,
            SubmissionState::Failed { .. } => SubmissionPhase::Failed,
        }
    }

    pub fn transaction_id(&self) -> Option<TxHash> {
        match self {
            SubmissionState::AwaitingConfirmation { tx_hash }
            | SubmissionState::Confirmed { tx_hash, .. } => Some(*tx_hash),
            SubmissionState::Failed { tx_hash, .. } => *tx_hash,
            SubmissionState::Idle | SubmissionState::AwaitingSignature => None,
        }
    }

    pub fn error(&self) -> Option<&SubmissionError> {
        match self {
            SubmissionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }

    pub fn is_busy(&self) -> bool {
        self.phase().is_busy()
    }

    pub fn reset(&mut self) {
        *self = SubmissionState::Idle;
    }

    /// Idle -> AwaitingSignature
    pub fn begin(&mut self) -> bool {
        if !matches!(self, SubmissionState::Idle) {
            return self.reject_transition("begin");
        }
        *self = SubmissionState::AwaitingSignature;
        true
    }

    /// AwaitingSignature -> AwaitingConfirmation
    pub fn signed(&mut self, tx_hash: TxHash) -> bool {
        if !matches!(self, SubmissionState::AwaitingSignature) {
            return self.reject_transition("signed");
        }
        *self = SubmissionState::AwaitingConfirmation { tx_hash };
        true
    }

    /// AwaitingConfirmation -> Confirmed
    pub fn confirmed(&mut self, block_number: Option<u64>) -> bool {
        let SubmissionState::AwaitingConfirmation { tx_hash } = *self else {
            return self.reject_transition("confirmed");
        };
        *self = SubmissionState::Confirmed {
            tx_hash,
            block_number,
        };
        true
    }

    /// Idle | AwaitingSignature | AwaitingConfirmation -> Failed
    pub fn fail(&mut self, error: SubmissionError) -> bool {
        let tx_hash = match self {
            SubmissionState::Idle | SubmissionState::AwaitingSignature => None,
            SubmissionState::AwaitingConfirmation { tx_hash } => Some(*tx_hash),
            SubmissionState::Confirmed { .. } | SubmissionState::Failed { .. } => {
                return self.reject_transition("fail");
            }
        };
        *self = SubmissionState::Failed { tx_hash, error };
        true
    }

    fn reject_transition(&self, event: &str) -> bool {
        tracing::warn!(
            phase = self.phase().label(),
            event,
            "ignoring invalid submission transition"
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash() -> TxHash {
        TxHash::with_last_byte(0x23)
    }

    #[test]
    fn test_happy_path() {
        let mut state = SubmissionState::default();
        assert_eq!(state.phase(), SubmissionPhase::Idle);

        assert!(state.begin());
        assert_eq!(state.phase(), SubmissionPhase::AwaitingSignature);
        assert!(state.is_busy());
        assert_eq!(state.transaction_id(), None);

        assert!(state.signed(hash()));
        assert_eq!(state.phase(), SubmissionPhase::AwaitingConfirmation);
        assert_eq!(state.transaction_id(), Some(hash()));

        assert!(state.confirmed(Some(7)));
        assert_eq!(
            state,
            SubmissionState::Confirmed {
                tx_hash: hash(),
                block_number: Some(7)
            }
        );
        assert!(!state.is_busy());
        assert!(state.phase().is_terminal());
        assert_eq!(state.error_message(), None);
    }

    #[test]
    fn test_rejected_signature() {
        let mut state = SubmissionState::default();
        state.begin();
        assert!(state.fail(SubmissionError::rejected()));
        assert_eq!(state.phase(), SubmissionPhase::Failed);
        assert_eq!(state.transaction_id(), None);
        assert_eq!(
            state.error_message().as_deref(),
            Some("User rejected the request.")
        );
    }

    #[test]
    fn test_failure_after_submission_keeps_hash() {
        let mut state = SubmissionState::default();
        state.begin();
        state.signed(hash());
        assert!(state.fail(SubmissionError::reverted("execution reverted")));
        assert_eq!(state.transaction_id(), Some(hash()));
        assert_eq!(state.error().map(SubmissionError::kind), Some("reverted"));
    }

    #[test]
    fn test_invalid_transitions_are_ignored() {
        let mut state = SubmissionState::default();
        assert!(!state.signed(hash()));
        assert!(!state.confirmed(None));
        assert_eq!(state, SubmissionState::Idle);

        state.begin();
        assert!(!state.begin());
        assert!(!state.confirmed(None));
        assert_eq!(state.phase(), SubmissionPhase::AwaitingSignature);

        state.signed(hash());
        state.confirmed(None);
        assert!(!state.fail(SubmissionError::network("late")));
        assert_eq!(state.phase(), SubmissionPhase::Confirmed);
    }

    #[test]
    fn test_validation_failure_from_idle() {
        let mut state = SubmissionState::default();
        assert!(state.fail(SubmissionError::validation("empty address")));
        assert_eq!(state.phase(), SubmissionPhase::Failed);
    }

    #[test]
    fn test_terminal_reset_then_resubmit() {
        let mut state = SubmissionState::default();
        state.begin();
        state.fail(SubmissionError::rejected());
        assert!(!state.begin());

        state.reset();
        assert!(state.begin());
        assert_eq!(state.phase(), SubmissionPhase::AwaitingSignature);
    }
}
