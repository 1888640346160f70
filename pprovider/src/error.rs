//! Shared error kinds and error value helpers.
//!
//! ```rust
//! use pprovider::LlmError;
//!
//! let auth = LlmError::authentication("bad key");
//! assert!(!auth.retryable);
//!
//! let timeout = LlmError::timeout("temporary timeout");
//! assert!(timeout.retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    NoCandidate,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Authentication, message, false)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimited, message, true)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::InvalidRequest, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Timeout, message, true)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Transport, message, true)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unavailable, message, true)
    }

    pub fn no_candidate(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::NoCandidate, message, false)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Other, message, false)
    }
}

impl Display for LlmError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for LlmError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_builders_assign_expected_retryability() {
        let auth = LlmError::authentication("bad key");
        assert!(!auth.retryable);
        assert_eq!(auth.kind, LlmErrorKind::Authentication);

        let timeout = LlmError::timeout("request timed out");
        assert!(timeout.retryable);

        let rate_limited = LlmError::rate_limited("try later");
        assert!(rate_limited.retryable);

        let no_candidate = LlmError::no_candidate("no multimodal model");
        assert!(!no_candidate.retryable);
        assert_eq!(no_candidate.kind, LlmErrorKind::NoCandidate);
    }

    #[test]
    fn display_includes_kind_and_message() {
        let error = LlmError::transport("connection reset");
        assert_eq!(error.to_string(), "Transport: connection reset");
    }
}
