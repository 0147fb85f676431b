//! In-memory backend for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use nursepal_core::error::BackendError;
use nursepal_core::model::{Question, ScoreSubmission, TestRef};
use nursepal_core::traits::{QuestionBank, ScoreSink};

/// A mock backend that serves fixed question lists and records submissions.
pub struct MockBackend {
    /// Questions keyed by (course id, test id).
    tests: HashMap<(String, u32), Vec<Question>>,
    /// Error returned by every fetch, if set.
    fetch_error: Option<BackendError>,
    /// Error returned by every submission, if set.
    submit_error: Option<BackendError>,
    fetch_count: AtomicU32,
    submissions: Mutex<Vec<ScoreSubmission>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            tests: HashMap::new(),
            fetch_error: None,
            submit_error: None,
            fetch_count: AtomicU32::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Serve `questions` for `test`.
    pub fn with_test(mut self, test: &TestRef, questions: Vec<Question>) -> Self {
        self.tests
            .insert((test.course_id.clone(), test.test_id), questions);
        self
    }

    pub fn failing_fetch(mut self, error: BackendError) -> Self {
        self.fetch_error = Some(error);
        self
    }

    pub fn failing_submit(mut self, error: BackendError) -> Self {
        self.submit_error = Some(error);
        self
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    /// Every submission received, in order.
    pub fn submissions(&self) -> Vec<ScoreSubmission> {
        self.submissions.lock().unwrap().clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionBank for MockBackend {
    async fn fetch_questions(&self, test: &TestRef) -> Result<Vec<Question>, BackendError> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        if let Some(error) = &self.fetch_error {
            return Err(error.clone());
        }
        self.tests
            .get(&(test.course_id.clone(), test.test_id))
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 404,
                message: format!("no such test: {test}"),
            })
    }
}

#[async_trait]
impl ScoreSink for MockBackend {
    async fn submit_score(&self, submission: &ScoreSubmission) -> Result<String, BackendError> {
        self.submissions.lock().unwrap().push(submission.clone());
        match &self.submit_error {
            Some(error) => Err(error.clone()),
            None => Ok("Score submitted successfully".to_string()),
        }
    }
}
