//! Submission lifecycle and its failure taxonomy

mod error;
mod state;

pub use error::{short_message, SubmissionError, MAX_MESSAGE_CHARS, USER_REJECTED};
pub use state::{SubmissionPhase, SubmissionState};
