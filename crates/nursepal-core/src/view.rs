//! Read-only snapshots of a session for presentation.
//!
//! [`SessionView`] mirrors what a quiz screen shows while the attempt is in
//! progress; [`SessionReview`] is the results screen after completion.

use serde::{Deserialize, Serialize};

use crate::model::Mode;
use crate::session::{CompletionReason, SessionState, TestSession};
use crate::time::format_seconds;

/// How one option should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionMark {
    /// Not selected, or feedback is withheld.
    Plain,
    /// Selected; correctness withheld (exam mode).
    Selected,
    /// Selected and correct (practice mode).
    SelectedCorrect,
    /// Selected and wrong (practice mode).
    SelectedWrong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionView {
    pub text: String,
    pub mark: OptionMark,
}

/// Snapshot of an in-progress (or loading, or completed) session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub state: SessionState,
    pub mode: Mode,
    /// 1-based question number.
    pub number: usize,
    pub total: usize,
    /// Fraction of the test reached, in `[0, 1]`.
    pub progress: f64,
    pub prompt: Option<String>,
    pub options: Vec<OptionView>,
    pub selected: Option<String>,
    /// Practice mode, once answered.
    pub explanation: Option<String>,
    pub can_advance: bool,
    pub can_retreat: bool,
    pub is_last: bool,
    pub remaining_secs: Option<u64>,
    pub load_error: Option<String>,
}

impl SessionView {
    pub fn of(session: &TestSession) -> Self {
        let total = session.questions().len();
        let index = session.current_index();
        let question = session.current_question();
        let answer = question.and_then(|q| session.ledger().answer_for(q.id));
        let practice = session.mode() == Mode::Practice;

        let options = question
            .map(|q| {
                q.options
                    .iter()
                    .map(|text| {
                        let selected = answer.is_some_and(|a| &a.selected_option == text);
                        let mark = match (selected, practice) {
                            (false, _) => OptionMark::Plain,
                            (true, false) => OptionMark::Selected,
                            (true, true) if q.is_correct(text) => OptionMark::SelectedCorrect,
                            (true, true) => OptionMark::SelectedWrong,
                        };
                        OptionView {
                            text: text.clone(),
                            mark,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let explanation = match (question, answer) {
            (Some(q), Some(_)) if practice => Some(q.explanation.clone()),
            _ => None,
        };

        Self {
            state: session.state(),
            mode: session.mode(),
            number: if total == 0 { 0 } else { index + 1 },
            total,
            progress: if total == 0 {
                0.0
            } else {
                (index + 1) as f64 / total as f64
            },
            prompt: question.map(|q| q.question.clone()),
            options,
            selected: answer.map(|a| a.selected_option.clone()),
            explanation,
            can_advance: session.can_advance(),
            can_retreat: session.state() == SessionState::Active && index > 0,
            is_last: session.is_last_question(),
            remaining_secs: session.remaining_secs(),
            load_error: session.load_error().map(|e| e.to_string()),
        }
    }

    /// Label for the forward button.
    pub fn advance_label(&self) -> &'static str {
        if self.is_last {
            "Finish"
        } else {
            "Next"
        }
    }

    /// Remaining exam time as `m:ss`.
    pub fn remaining_display(&self) -> Option<String> {
        self.remaining_secs.map(format_seconds)
    }
}

/// One row of the results screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionReview {
    pub number: usize,
    pub prompt: String,
    /// `None` when the question was never answered.
    pub selected: Option<String>,
    pub correct_option: String,
    pub is_correct: bool,
    pub explanation: String,
}

/// Results of a completed session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionReview {
    pub mode: Mode,
    pub score: u8,
    pub correct: usize,
    pub total: usize,
    pub reason: Option<CompletionReason>,
    /// Exam mode only: seconds from the start of the attempt to completion.
    pub time_taken_secs: Option<u64>,
    pub questions: Vec<QuestionReview>,
}

impl SessionReview {
    pub fn of(session: &TestSession) -> Self {
        let completion = session.completion();
        let questions = session
            .questions()
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let answer = session.ledger().answer_for(q.id);
                QuestionReview {
                    number: i + 1,
                    prompt: q.question.clone(),
                    selected: answer.map(|a| a.selected_option.clone()),
                    correct_option: q.answer.clone(),
                    is_correct: answer.is_some_and(|a| a.is_correct),
                    explanation: q.explanation.clone(),
                }
            })
            .collect();

        let time_taken_secs = session.exam_clock().map(|clock| {
            let end = completion.map(|(_, at)| at).unwrap_or_else(|| session.now());
            clock.elapsed_secs(end)
        });

        Self {
            mode: session.mode(),
            score: session.score(),
            correct: session.ledger().correct_count(),
            total: session.questions().len(),
            reason: completion.map(|(reason, _)| reason),
            time_taken_secs,
            questions,
        }
    }

    pub fn time_taken_display(&self) -> Option<String> {
        self.time_taken_secs.map(format_seconds)
    }
}
