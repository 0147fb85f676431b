//! Backend and session error types.
//!
//! `BackendError` is defined here rather than in `nursepal-client` so the
//! session core can classify failures without depending on the HTTP stack.

use thiserror::Error;

use crate::model::TestRef;

/// Errors that can occur when talking to the nursepal backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend could not be reached.
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The backend rejected our credentials (HTTP 401/403).
    #[error("not authorized: {0}")]
    Unauthorized(String),

    /// The backend returned an error status.
    #[error("backend error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// Returns `true` if repeating the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            BackendError::Unauthorized(_) | BackendError::Malformed(_)
        )
    }
}

/// Errors surfaced by a test session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Question fetch failed or returned malformed data.
    #[error("failed to load questions for {test}: {source}")]
    LoadFailure {
        test: TestRef,
        #[source]
        source: BackendError,
    },

    /// Score submission failed after completion. Logged, never blocking.
    #[error("failed to submit score for {test}: {source}")]
    SubmissionFailure {
        test: TestRef,
        #[source]
        source: BackendError,
    },

    /// Test id 0 is the introduction screen, not a quiz.
    #[error("{0} is the introduction screen, not a quiz")]
    IntroductionScreen(TestRef),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_classification() {
        assert!(BackendError::Unauthorized("expired".into()).is_permanent());
        assert!(BackendError::Malformed("bad json".into()).is_permanent());
        assert!(!BackendError::Timeout(30).is_permanent());
        assert!(!BackendError::Status {
            status: 503,
            message: "down".into()
        }
        .is_permanent());
    }

    #[test]
    fn load_failure_message_names_the_test() {
        let err = SessionError::LoadFailure {
            test: TestRef::new("1", 2),
            source: BackendError::Status {
                status: 500,
                message: "boom".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("course 1 / test 2"));
        assert!(msg.contains("HTTP 500"));
    }
}
