//! HTTP implementation of the nursepal backend contract.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use nursepal_core::error::BackendError;
use nursepal_core::model::{
    CourseScore, Question, RankInfo, ScoreRecord, ScoreSubmission, TestRef,
};
use nursepal_core::traits::{QuestionBank, ScoreSink};

pub const DEFAULT_BASE_URL: &str = "https://nursepal-backend.onrender.com/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Endpoint paths relative to the API base URL.
pub mod endpoints {
    pub const SUBMIT_SCORE: &str = "/tests/scores";
    pub const SCORE_LIST: &str = "/tests/scores";
    pub const RANK: &str = "/rank/me";

    pub fn test_questions(course_id: &str, test_id: u32) -> String {
        format!("/courses/{course_id}/{test_id}")
    }

    pub fn course_scores(course_id: &str) -> String {
        format!("/scores/{course_id}")
    }
}

/// Client for the nursepal REST API.
pub struct HttpBackend {
    base_url: String,
    access_token: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct Acknowledgment {
    #[serde(default)]
    message: String,
}

impl HttpBackend {
    pub fn new(base_url: Option<String>, access_token: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            access_token,
            timeout_secs,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(self.timeout_secs)
            } else {
                BackendError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status, "unauthorized access: {body}");
            return Err(BackendError::Unauthorized(body));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            if status >= 500 {
                tracing::error!(status, "server error: {body}");
            }
            return Err(BackendError::Status {
                status,
                message: body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Malformed(format!("failed to parse response: {e}")))
    }

    /// Best score per test for one course.
    #[instrument(skip(self))]
    pub async fn course_scores(&self, course_id: &str) -> Result<Vec<CourseScore>, BackendError> {
        let request = self.client.get(self.url(&endpoints::course_scores(course_id)));
        self.send(request).await
    }

    /// Every recorded attempt of the current user.
    #[instrument(skip(self))]
    pub async fn all_scores(&self) -> Result<Vec<ScoreRecord>, BackendError> {
        let request = self.client.get(self.url(endpoints::SCORE_LIST));
        self.send(request).await
    }

    /// The current user's leaderboard position.
    #[instrument(skip(self))]
    pub async fn rank(&self) -> Result<RankInfo, BackendError> {
        let request = self.client.get(self.url(endpoints::RANK));
        self.send(request).await
    }
}

#[async_trait]
impl QuestionBank for HttpBackend {
    #[instrument(skip_all, fields(test = %test))]
    async fn fetch_questions(&self, test: &TestRef) -> Result<Vec<Question>, BackendError> {
        let path = endpoints::test_questions(&test.course_id, test.test_id);
        let request = self.client.get(self.url(&path));
        self.send(request).await
    }
}

#[async_trait]
impl ScoreSink for HttpBackend {
    #[instrument(skip(self, submission), fields(score = submission.score))]
    async fn submit_score(&self, submission: &ScoreSubmission) -> Result<String, BackendError> {
        let request = self
            .client
            .post(self.url(endpoints::SUBMIT_SCORE))
            .json(submission);
        let ack: Acknowledgment = self.send(request).await?;
        Ok(ack.message)
    }
}
