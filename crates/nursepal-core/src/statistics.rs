//! Aggregate statistics over a course's score history.

use serde::{Deserialize, Serialize};

use crate::model::CourseScore;

/// Coarse performance band for a single score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Strong,
    Fair,
    Weak,
}

impl ScoreBand {
    pub fn of(score: u32) -> Self {
        match score {
            80.. => ScoreBand::Strong,
            60..=79 => ScoreBand::Fair,
            _ => ScoreBand::Weak,
        }
    }
}

/// Progress summary for one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseProgress {
    pub tests_attempted: usize,
    /// Rounded mean of the per-test best scores. 0 when nothing was attempted.
    pub average: u32,
    pub highest: Option<u32>,
}

pub fn course_progress(scores: &[CourseScore]) -> CourseProgress {
    let tests_attempted = scores.len();
    let average = if tests_attempted == 0 {
        0
    } else {
        let sum: u64 = scores.iter().map(|s| u64::from(s.highest_score)).sum();
        let n = tests_attempted as u64;
        ((2 * sum + n) / (2 * n)) as u32
    };
    CourseProgress {
        tests_attempted,
        average,
        highest: scores.iter().map(|s| s.highest_score).max(),
    }
}
