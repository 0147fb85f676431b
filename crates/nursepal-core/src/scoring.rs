//! Score computation and best-effort score reporting.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::SessionError;
use crate::model::{ScoreSubmission, TestRef};
use crate::traits::ScoreSink;

/// `round(100 * correct / total)`, with half rounding up. An empty test scores 0.
pub fn score_percent(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * correct + total) / (2 * total);
    rounded.min(100) as u8
}

/// Result of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The backend acknowledged the score.
    Submitted { message: String },
    /// The submission failed; the session is unaffected.
    Failed(SessionError),
}

impl ReportOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, ReportOutcome::Submitted { .. })
    }
}

/// Sends completed-session scores to the backend. Failures are logged and
/// returned, never retried.
#[derive(Clone)]
pub struct ScoreReporter {
    sink: Arc<dyn ScoreSink>,
}

impl ScoreReporter {
    pub fn new(sink: Arc<dyn ScoreSink>) -> Self {
        Self { sink }
    }

    /// Submit once and wait for the result.
    pub async fn report(&self, test: &TestRef, submission: &ScoreSubmission) -> ReportOutcome {
        match self.sink.submit_score(submission).await {
            Ok(message) => {
                tracing::info!(test = %test, score = submission.score, "score submitted");
                ReportOutcome::Submitted { message }
            }
            Err(source) => {
                tracing::warn!(test = %test, score = submission.score, "score submission failed: {source}");
                ReportOutcome::Failed(SessionError::SubmissionFailure {
                    test: test.clone(),
                    source,
                })
            }
        }
    }

    /// Submit in the background. The caller may await the handle or drop it.
    pub fn dispatch(&self, test: TestRef, submission: ScoreSubmission) -> JoinHandle<ReportOutcome> {
        let reporter = self.clone();
        tokio::spawn(async move { reporter.report(&test, &submission).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::Mutex;

    #[test]
    fn percent_rounds_and_guards_empty() {
        assert_eq!(score_percent(0, 0), 0);
        assert_eq!(score_percent(3, 4), 75);
        assert_eq!(score_percent(1, 3), 33);
        assert_eq!(score_percent(2, 3), 67);
        assert_eq!(score_percent(1, 8), 13);
        assert_eq!(score_percent(5, 5), 100);
        assert_eq!(score_percent(0, 7), 0);
    }

    #[test]
    fn percent_stays_in_range() {
        for total in 1..40 {
            for correct in 0..=total {
                let score = score_percent(correct, total);
                let expected = (100.0 * correct as f64 / total as f64).round() as u8;
                assert_eq!(score, expected, "{correct}/{total}");
                assert!(score <= 100);
            }
        }
    }

    struct RecordingSink {
        fail: bool,
        seen: Mutex<Vec<ScoreSubmission>>,
    }

    #[async_trait]
    impl ScoreSink for RecordingSink {
        async fn submit_score(&self, submission: &ScoreSubmission) -> Result<String, BackendError> {
            self.seen.lock().unwrap().push(submission.clone());
            if self.fail {
                Err(BackendError::Status {
                    status: 500,
                    message: "db down".into(),
                })
            } else {
                Ok("Score saved".into())
            }
        }
    }

    fn submission() -> ScoreSubmission {
        ScoreSubmission {
            course_id: "1".into(),
            test_id: "2".into(),
            score: 80,
            date_taken: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn successful_report() {
        let sink = Arc::new(RecordingSink {
            fail: false,
            seen: Mutex::new(Vec::new()),
        });
        let reporter = ScoreReporter::new(sink.clone());
        let outcome = reporter.report(&TestRef::new("1", 2), &submission()).await;
        assert_eq!(
            outcome,
            ReportOutcome::Submitted {
                message: "Score saved".into()
            }
        );
        assert_eq!(sink.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_report_is_returned_not_raised() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            seen: Mutex::new(Vec::new()),
        });
        let reporter = ScoreReporter::new(sink.clone());
        let outcome = reporter
            .dispatch(TestRef::new("1", 2), submission())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            ReportOutcome::Failed(SessionError::SubmissionFailure { .. })
        ));
        assert_eq!(sink.seen.lock().unwrap().len(), 1);
    }
}
