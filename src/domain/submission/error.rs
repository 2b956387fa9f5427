use std::fmt::Display;

use thiserror::Error;

/// Longest error text shown in the status area
pub const MAX_MESSAGE_CHARS: usize = 160;

/// Message used when the user declines the signature prompt
pub const USER_REJECTED: &str = "User rejected the request.";

/// Why a submission attempt ended.
///
/// Every variant carries the display string; callers never branch on it
/// beyond rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Wallet unavailable, not connected, or on the wrong network
    #[error("{0}")]
    Connection(String),
    /// User declined to sign
    #[error("{0}")]
    Rejected(String),
    /// Contract execution failed
    #[error("{0}")]
    Reverted(String),
    /// RPC or transport failure, including malformed input refused by the node
    #[error("{0}")]
    Network(String),
    /// Local input check failed (empty address)
    #[error("{0}")]
    Validation(String),
}

impl SubmissionError {
    pub fn connection(message: impl Display) -> Self {
        Self::Connection(short_message(message))
    }

    pub fn rejected() -> Self {
        Self::Rejected(USER_REJECTED.to_string())
    }

    pub fn reverted(message: impl Display) -> Self {
        Self::Reverted(short_message(message))
    }

    pub fn network(message: impl Display) -> Self {
        Self::Network(short_message(message))
    }

    pub fn validation(message: impl Display) -> Self {
        Self::Validation(short_message(message))
    }

    /// Short machine-friendly tag, used in exports and logs
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionError::Connection(_) => "connection",
            SubmissionError::Rejected(_) => "rejected",
            SubmissionError::Reverted(_) => "reverted",
            SubmissionError::Network(_) => "network",
            SubmissionError::Validation(_) => "validation",
        }
    }
}

/// Reduce an error report to one readable line.
///
/// Takes the first non-empty line and caps it at [`MAX_MESSAGE_CHARS`].
pub fn short_message(message: impl Display) -> String {
    let text = message.to_string();
    let line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("unknown error");

    if line.chars().count() <= MAX_MESSAGE_CHARS {
        return line.to_string();
    }
    line.chars().take(MAX_MESSAGE_CHARS).collect::<String>() + "…"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_first_line() {
        let message = "\n  server returned an error response: error code -32000: nonce too low\nRequest: {...}";
        assert_eq!(
            short_message(message),
            "server returned an error response: error code -32000: nonce too low"
        );
    }

    #[test]
    fn test_short_message_truncates() {
        let long = "x".repeat(MAX_MESSAGE_CHARS + 40);
        let short = short_message(&long);
        assert_eq!(short.chars().count(), MAX_MESSAGE_CHARS + 1);
        assert!(short.ends_with('…'));
    }

    #[test]
    fn test_short_message_empty() {
        assert_eq!(short_message("   \n"), "unknown error");
    }

    #[test]
    fn test_display_is_message() {
        let err = SubmissionError::rejected();
        assert_eq!(err.to_string(), USER_REJECTED);
        assert_eq!(err.kind(), "rejected");
        assert_eq!(
            SubmissionError::network("connection refused").to_string(),
            "connection refused"
        );
    }
}
