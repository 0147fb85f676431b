//! Question Bank Accessor: loads and sanity-checks a test's questions.

use std::collections::HashSet;

use tracing::instrument;

use crate::error::{BackendError, SessionError};
use crate::model::{Question, TestRef};
use crate::traits::QuestionBank;

/// Load the ordered question list for `test`.
///
/// The introduction test (id 0) is rejected before any network call. Backend
/// failures and malformed payloads become [`SessionError::LoadFailure`].
#[instrument(skip_all, fields(test = %test))]
pub async fn load_questions(
    bank: &dyn QuestionBank,
    test: &TestRef,
) -> Result<Vec<Question>, SessionError> {
    if test.is_introduction() {
        return Err(SessionError::IntroductionScreen(test.clone()));
    }

    let questions = bank
        .fetch_questions(test)
        .await
        .and_then(validate_questions)
        .map_err(|source| {
            tracing::error!("question load failed: {source}");
            SessionError::LoadFailure {
                test: test.clone(),
                source,
            }
        })?;

    tracing::info!(count = questions.len(), "questions loaded");
    Ok(questions)
}

fn validate_questions(questions: Vec<Question>) -> Result<Vec<Question>, BackendError> {
    let mut seen = HashSet::new();
    for q in &questions {
        if !seen.insert(q.id) {
            return Err(BackendError::Malformed(format!(
                "duplicate question id {}",
                q.id
            )));
        }
        if q.options.is_empty() {
            return Err(BackendError::Malformed(format!(
                "question {} has no options",
                q.id
            )));
        }
        if !q.has_option(&q.answer) {
            tracing::warn!(question = q.id, "correct answer is not among the options");
        }
    }
    Ok(questions)
}
