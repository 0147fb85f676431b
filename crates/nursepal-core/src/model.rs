//! Core data model types for nursepal.
//!
//! Questions arrive from the backend and are immutable once loaded. Answers
//! are owned by the [`AnswerLedger`](crate::ledger::AnswerLedger) of a single
//! attempt.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a question, unique within a test.
pub type QuestionId = u32;

/// Test id reserved for the non-quiz introduction screen.
pub const INTRODUCTION_TEST_ID: u32 = 0;

/// A single multiple-choice question as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the test.
    pub id: QuestionId,
    /// Prompt text.
    pub question: String,
    /// Options in display order.
    pub options: Vec<String>,
    /// Literal text of the correct option.
    pub answer: String,
    /// Explanation shown after answering (practice) or on review (exam).
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    /// Whether `option` is the correct answer. Exact string equality.
    pub fn is_correct(&self, option: &str) -> bool {
        self.answer == option
    }

    /// Whether `option` is one of this question's options.
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// Identifies one test within one course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestRef {
    pub course_id: String,
    pub test_id: u32,
}

impl TestRef {
    pub fn new(course_id: impl Into<String>, test_id: u32) -> Self {
        Self {
            course_id: course_id.into(),
            test_id,
        }
    }

    /// Test id `0` is the introduction screen, never a real quiz.
    pub fn is_introduction(&self) -> bool {
        self.test_id == INTRODUCTION_TEST_ID
    }
}

impl fmt::Display for TestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "course {} / test {}", self.course_id, self.test_id)
    }
}

/// How a session behaves: immediate feedback with locked answers, or timed
/// with answers mutable until submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Practice,
    Exam,
}

impl Mode {
    pub fn is_exam(self) -> bool {
        matches!(self, Mode::Exam)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Practice => write!(f, "practice"),
            Mode::Exam => write!(f, "exam"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "practice" => Ok(Mode::Practice),
            "exam" => Ok(Mode::Exam),
            other => Err(format!("unknown mode: {other} (expected practice or exam)")),
        }
    }
}

/// Whether forward navigation requires the current question to be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationPolicy {
    #[default]
    AnswerRequired,
    /// Exam-mode variant: move forward past unanswered questions.
    Free,
}

/// Body of the score submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub course_id: String,
    pub test_id: String,
    pub score: u8,
    pub date_taken: DateTime<Utc>,
}

/// Best score the user achieved on one test of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseScore {
    pub highest_score: u32,
    pub test_id: String,
}

/// One recorded attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub test_id: String,
    pub score: u32,
}

/// The user's position on the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankInfo {
    pub rank: u32,
    pub total_users: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_display_and_parse() {
        assert_eq!(Mode::Practice.to_string(), "practice");
        assert_eq!(Mode::Exam.to_string(), "exam");
        assert_eq!("EXAM".parse::<Mode>().unwrap(), Mode::Exam);
        assert_eq!("practice".parse::<Mode>().unwrap(), Mode::Practice);
        assert!("quiz".parse::<Mode>().is_err());
    }

    #[test]
    fn question_list_from_backend_json() {
        let json = r#"[
            {"id": 1, "question": "Normal adult heart rate?", "options": ["40-60", "60-100", "100-140"], "answer": "60-100", "explanation": "Resting adult range."},
            {"id": 2, "question": "Universal donor?", "options": ["AB+", "O-"], "answer": "O-"}
        ]"#;
        let questions: Vec<Question> = serde_json::from_str(json).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].options[1], "60-100");
        assert!(questions[0].is_correct("60-100"));
        assert!(!questions[0].is_correct("60-100 "));
        assert_eq!(questions[1].explanation, "");
    }

    #[test]
    fn submission_uses_camel_case() {
        let submission = ScoreSubmission {
            course_id: "1".into(),
            test_id: "3".into(),
            score: 75,
            date_taken: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["courseId"], "1");
        assert_eq!(value["testId"], "3");
        assert_eq!(value["score"], 75);
        assert_eq!(value["dateTaken"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn introduction_test_ref() {
        assert!(TestRef::new("1", 0).is_introduction());
        assert!(!TestRef::new("1", 1).is_introduction());
        assert_eq!(TestRef::new("2", 5).to_string(), "course 2 / test 5");
    }
}
