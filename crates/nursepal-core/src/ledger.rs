//! Answer Ledger: the per-attempt record of chosen options.
//!
//! Keyed by question id. In practice mode the first selection for a question
//! is final; in exam mode a later selection overwrites the earlier one.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Mode, Question, QuestionId};

/// The user's chosen option for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub selected_option: String,
    /// Derived from the question whenever `selected_option` changes.
    pub is_correct: bool,
}

/// What `record_answer` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// First answer for this question.
    Recorded,
    /// Exam mode: an earlier answer was overwritten.
    Replaced,
    /// Practice mode: the question already has its final answer.
    Locked,
    /// The option is not one of the question's options. Nothing recorded.
    UnknownOption,
}

impl RecordOutcome {
    /// Whether the ledger changed.
    pub fn changed(self) -> bool {
        matches!(self, RecordOutcome::Recorded | RecordOutcome::Replaced)
    }
}

#[derive(Debug, Clone)]
pub struct AnswerLedger {
    mode: Mode,
    answers: HashMap<QuestionId, Answer>,
}

impl AnswerLedger {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            answers: HashMap::new(),
        }
    }

    /// Record `selected` as the answer to `question`, honoring the mode's
    /// locking rule.
    pub fn record_answer(&mut self, question: &Question, selected: &str) -> RecordOutcome {
        if !question.has_option(selected) {
            return RecordOutcome::UnknownOption;
        }

        match self.answers.get_mut(&question.id) {
            None => {
                self.answers.insert(
                    question.id,
                    Answer {
                        question_id: question.id,
                        selected_option: selected.to_string(),
                        is_correct: question.is_correct(selected),
                    },
                );
                RecordOutcome::Recorded
            }
            Some(_) if self.mode == Mode::Practice => RecordOutcome::Locked,
            Some(existing) => {
                existing.selected_option = selected.to_string();
                existing.is_correct = question.is_correct(selected);
                RecordOutcome::Replaced
            }
        }
    }

    pub fn answer_for(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.get(&question_id)
    }

    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.answers.contains_key(&question_id)
    }

    pub fn correct_count(&self) -> usize {
        self.answers.values().filter(|a| a.is_correct).count()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }
}
