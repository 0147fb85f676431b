//! Backend contract consumed by the session core.
//!
//! These async traits are implemented by `nursepal-client` (HTTP and mock).

use async_trait::async_trait;

use crate::error::BackendError;
use crate::model::{Question, ScoreSubmission, TestRef};

/// Source of question lists for tests.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Fetch the ordered question sequence for a test.
    async fn fetch_questions(&self, test: &TestRef) -> Result<Vec<Question>, BackendError>;
}

/// Destination for completed-session scores.
#[async_trait]
pub trait ScoreSink: Send + Sync {
    /// Submit one score. Returns the backend's acknowledgment message.
    async fn submit_score(&self, submission: &ScoreSubmission) -> Result<String, BackendError>;
}
