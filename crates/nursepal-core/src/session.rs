//! The test-session state machine.
//!
//! A [`TestSession`] moves `Loading → Active → Completed`, with `reset`
//! returning a completed session to `Active` at the first question. Every
//! operation is synchronous and returns a [`Transition`] describing what
//! happened; operations that are not legal in the current state are no-ops
//! reported as [`Transition::Ignored`].
//!
//! Forward progress requires an answer for the current question, except when
//! the exam clock runs out or an exam session uses
//! [`NavigationPolicy::Free`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::ledger::{AnswerLedger, RecordOutcome};
use crate::model::{Mode, NavigationPolicy, Question, ScoreSubmission, TestRef};
use crate::scoring::score_percent;
use crate::time::Clock;
use crate::timer::ExamClock;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Loading,
    Active,
    Completed,
}

/// Why a session completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    /// The user moved past the last question.
    Finished,
    /// The exam clock reached zero.
    TimeExpired,
}

/// The effect of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Not legal in the current state; nothing changed.
    Ignored,
    /// Questions arrived; the session is now active.
    Loaded,
    /// The ledger was consulted for the current question.
    Answered(RecordOutcome),
    Moved { from: usize, to: usize },
    /// One second of exam time elapsed.
    Ticked { remaining_secs: u64 },
    Completed(CompletionReason),
    Reset,
}

/// Construction-time parameters. Immutable for the session's lifetime.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub test: TestRef,
    pub mode: Mode,
    pub navigation: NavigationPolicy,
    pub clock: Clock,
}

impl SessionConfig {
    pub fn new(test: TestRef, mode: Mode) -> Self {
        Self {
            test,
            mode,
            navigation: NavigationPolicy::default(),
            clock: Clock::default(),
        }
    }

    pub fn with_navigation(mut self, navigation: NavigationPolicy) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

/// One attempt at a single test.
#[derive(Debug, Clone)]
pub struct TestSession {
    config: SessionConfig,
    state: SessionState,
    questions: Vec<Question>,
    current: usize,
    ledger: AnswerLedger,
    exam_clock: Option<ExamClock>,
    load_error: Option<SessionError>,
    attempt_id: Uuid,
    completion: Option<(CompletionReason, DateTime<Utc>)>,
    pending_submission: Option<ScoreSubmission>,
}

impl TestSession {
    pub fn new(config: SessionConfig) -> Self {
        let ledger = AnswerLedger::new(config.mode);
        Self {
            config,
            state: SessionState::Loading,
            questions: Vec::new(),
            current: 0,
            ledger,
            exam_clock: None,
            load_error: None,
            attempt_id: Uuid::new_v4(),
            completion: None,
            pending_submission: None,
        }
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Install the question list and enter `Active`. Arms the exam clock when
    /// in exam mode with at least one question.
    pub fn load(&mut self, questions: Vec<Question>) -> Transition {
        if self.state != SessionState::Loading {
            return Transition::Ignored;
        }
        let now = self.config.clock.now();
        self.exam_clock = (self.config.mode.is_exam() && !questions.is_empty())
            .then(|| ExamClock::arm(questions.len(), now));
        self.questions = questions;
        self.current = 0;
        self.load_error = None;
        self.state = SessionState::Active;
        tracing::debug!(
            attempt = %self.attempt_id,
            questions = self.questions.len(),
            mode = %self.config.mode,
            "session active"
        );
        Transition::Loaded
    }

    /// Record a load failure. The session stays in `Loading`.
    pub fn fail_load(&mut self, error: SessionError) -> Transition {
        if self.state != SessionState::Loading {
            return Transition::Ignored;
        }
        self.load_error = Some(error);
        Transition::Ignored
    }

    // -----------------------------------------------------------------------
    // User operations
    // -----------------------------------------------------------------------

    /// Record `selected` for the current question.
    pub fn answer(&mut self, selected: &str) -> Transition {
        if self.state != SessionState::Active {
            return Transition::Ignored;
        }
        let Some(question) = self.questions.get(self.current) else {
            return Transition::Ignored;
        };
        let outcome = self.ledger.record_answer(question, selected);
        tracing::debug!(question = question.id, ?outcome, "answer");
        Transition::Answered(outcome)
    }

    /// Record the option at `index` (0-based display order) for the current question.
    pub fn answer_option(&mut self, index: usize) -> Transition {
        let Some(option) = self
            .current_question()
            .and_then(|q| q.options.get(index))
            .cloned()
        else {
            return Transition::Ignored;
        };
        self.answer(&option)
    }

    /// Move to the next question, or complete from the last one.
    pub fn advance(&mut self) -> Transition {
        if !self.can_advance() {
            return Transition::Ignored;
        }
        if self.is_last_question() {
            return self.complete(CompletionReason::Finished);
        }
        let from = self.current;
        self.current += 1;
        Transition::Moved {
            from,
            to: self.current,
        }
    }

    /// Move to the previous question. No answer requirement.
    pub fn retreat(&mut self) -> Transition {
        if self.state != SessionState::Active || self.current == 0 {
            return Transition::Ignored;
        }
        let from = self.current;
        self.current -= 1;
        Transition::Moved {
            from,
            to: self.current,
        }
    }

    /// Explicit "Finish": `advance` restricted to the last question.
    pub fn finish(&mut self) -> Transition {
        if !self.is_last_question() {
            return Transition::Ignored;
        }
        self.advance()
    }

    /// One second of exam time. Completes the session when time runs out,
    /// whether or not the current question is answered.
    pub fn tick(&mut self) -> Transition {
        if self.state != SessionState::Active {
            return Transition::Ignored;
        }
        let Some(clock) = self.exam_clock.as_mut() else {
            return Transition::Ignored;
        };
        let remaining_secs = clock.tick();
        if clock.is_expired() {
            tracing::info!(attempt = %self.attempt_id, "exam time expired");
            return self.complete(CompletionReason::TimeExpired);
        }
        Transition::Ticked { remaining_secs }
    }

    /// Start a fresh attempt: empty ledger, first question, full exam allowance.
    pub fn reset(&mut self) -> Transition {
        if self.state != SessionState::Completed {
            return Transition::Ignored;
        }
        let now = self.config.clock.now();
        self.ledger.clear();
        self.current = 0;
        self.completion = None;
        self.attempt_id = Uuid::new_v4();
        if let Some(clock) = self.exam_clock.as_mut() {
            clock.rearm(now);
        }
        self.state = SessionState::Active;
        tracing::debug!(attempt = %self.attempt_id, "session reset");
        Transition::Reset
    }

    fn complete(&mut self, reason: CompletionReason) -> Transition {
        let now = self.config.clock.now();
        self.state = SessionState::Completed;
        self.completion = Some((reason, now));
        let score = self.score();
        self.pending_submission = Some(ScoreSubmission {
            course_id: self.config.test.course_id.clone(),
            test_id: self.config.test.test_id.to_string(),
            score,
            date_taken: now,
        });
        tracing::info!(
            attempt = %self.attempt_id,
            score,
            correct = self.ledger.correct_count(),
            total = self.questions.len(),
            ?reason,
            "session completed"
        );
        Transition::Completed(reason)
    }

    /// Take the submission produced by the most recent completion. Returns
    /// `Some` at most once per completion.
    pub fn take_submission(&mut self) -> Option<ScoreSubmission> {
        self.pending_submission.take()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// `round(100 * correct / total)`; 0 for an empty test.
    pub fn score(&self) -> u8 {
        score_percent(self.ledger.correct_count(), self.questions.len())
    }

    /// Whether `advance` would currently do something.
    pub fn can_advance(&self) -> bool {
        if self.state != SessionState::Active {
            return false;
        }
        match self.current_question() {
            // An empty test has nothing to answer.
            None => true,
            Some(q) => self.ledger.is_answered(q.id) || self.free_navigation(),
        }
    }

    fn free_navigation(&self) -> bool {
        self.config.mode.is_exam() && self.config.navigation == NavigationPolicy::Free
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    pub fn test(&self) -> &TestRef {
        &self.config.test
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    pub fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    pub fn exam_clock(&self) -> Option<&ExamClock> {
        self.exam_clock.as_ref()
    }

    pub fn remaining_secs(&self) -> Option<u64> {
        self.exam_clock.as_ref().map(ExamClock::remaining_secs)
    }

    /// Whether the exam countdown should be running.
    pub fn timer_running(&self) -> bool {
        self.state == SessionState::Active
            && self.exam_clock.as_ref().is_some_and(|c| !c.is_expired())
    }

    pub fn load_error(&self) -> Option<&SessionError> {
        self.load_error.as_ref()
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn completion(&self) -> Option<(CompletionReason, DateTime<Utc>)> {
        self.completion
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.config.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackendError;

    fn question(id: u32, answer: &str) -> Question {
        Question {
            id,
            question: format!("Question {id}"),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            answer: answer.into(),
            explanation: format!("Because {answer}."),
        }
    }

    fn questions(n: u32) -> Vec<Question> {
        (1..=n).map(|id| question(id, "A")).collect()
    }

    fn fixed_clock() -> Clock {
        Clock::fixed(DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap())
    }

    fn session(mode: Mode, n: u32) -> TestSession {
        let config = SessionConfig::new(TestRef::new("1", 3), mode).with_clock(fixed_clock());
        let mut session = TestSession::new(config);
        session.load(questions(n));
        session
    }

    #[test]
    fn operations_are_ignored_while_loading() {
        let mut s = TestSession::new(SessionConfig::new(TestRef::new("1", 3), Mode::Practice));
        assert_eq!(s.state(), SessionState::Loading);
        assert_eq!(s.answer("A"), Transition::Ignored);
        assert_eq!(s.advance(), Transition::Ignored);
        assert_eq!(s.retreat(), Transition::Ignored);
        assert_eq!(s.finish(), Transition::Ignored);
        assert_eq!(s.tick(), Transition::Ignored);
        assert_eq!(s.reset(), Transition::Ignored);
    }

    #[test]
    fn load_failure_keeps_session_loading() {
        let test = TestRef::new("1", 3);
        let mut s = TestSession::new(SessionConfig::new(test.clone(), Mode::Exam));
        s.fail_load(SessionError::LoadFailure {
            test,
            source: BackendError::Timeout(30),
        });
        assert_eq!(s.state(), SessionState::Loading);
        assert!(s.load_error().is_some());
        assert!(s.exam_clock().is_none());
    }

    #[test]
    fn advance_requires_an_answer() {
        let mut s = session(Mode::Practice, 3);
        assert_eq!(s.advance(), Transition::Ignored);
        assert_eq!(s.current_index(), 0);

        s.answer("B");
        assert_eq!(s.advance(), Transition::Moved { from: 0, to: 1 });
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn retreat_is_bounded_and_needs_no_answer() {
        let mut s = session(Mode::Practice, 3);
        assert_eq!(s.retreat(), Transition::Ignored);
        s.answer("A");
        s.advance();
        assert_eq!(s.retreat(), Transition::Moved { from: 1, to: 0 });
        assert_eq!(s.retreat(), Transition::Ignored);
        assert_eq!(s.current_index(), 0);
    }

    #[test]
    fn advance_on_last_answered_question_completes() {
        let mut s = session(Mode::Practice, 2);
        s.answer("A");
        s.advance();
        s.answer("C");
        assert_eq!(
            s.advance(),
            Transition::Completed(CompletionReason::Finished)
        );
        assert!(s.is_completed());
        assert_eq!(s.score(), 50);
        assert_eq!(s.current_index(), 1);
    }

    #[test]
    fn finish_only_from_the_last_question() {
        let mut s = session(Mode::Practice, 2);
        s.answer("A");
        assert_eq!(s.finish(), Transition::Ignored);
        s.advance();
        assert_eq!(s.finish(), Transition::Ignored);
        s.answer("A");
        assert_eq!(s.finish(), Transition::Completed(CompletionReason::Finished));
        assert_eq!(s.finish(), Transition::Ignored);
    }

    #[test]
    fn practice_scenario_scores_75() {
        let mut s = TestSession::new(
            SessionConfig::new(TestRef::new("1", 3), Mode::Practice).with_clock(fixed_clock()),
        );
        s.load(vec![
            question(1, "A"),
            question(2, "B"),
            question(3, "C"),
            question(4, "D"),
        ]);
        for selected in ["A", "C", "C", "D"] {
            s.answer(selected);
            s.advance();
        }
        assert!(s.is_completed());
        assert_eq!(s.ledger().correct_count(), 3);
        assert_eq!(s.score(), 75);
        assert!(s.remaining_secs().is_none());
    }

    #[test]
    fn practice_answers_lock() {
        let mut s = session(Mode::Practice, 2);
        assert_eq!(s.answer("B"), Transition::Answered(RecordOutcome::Recorded));
        assert_eq!(s.answer("A"), Transition::Answered(RecordOutcome::Locked));
        assert_eq!(s.ledger().answer_for(1).unwrap().selected_option, "B");
    }

    #[test]
    fn exam_scenario_revisits_and_changes_an_answer() {
        let mut s = session(Mode::Exam, 2);
        assert_eq!(s.remaining_secs(), Some(60));

        s.answer("B");
        s.advance();
        s.answer("A");
        s.retreat();
        assert_eq!(s.answer("A"), Transition::Answered(RecordOutcome::Replaced));
        assert!(s.ledger().answer_for(1).unwrap().is_correct);

        s.advance();
        assert_eq!(s.finish(), Transition::Completed(CompletionReason::Finished));
        assert_eq!(s.score(), 100);
    }

    #[test]
    fn expiry_forces_completion_without_an_answer() {
        let mut s = session(Mode::Exam, 2);
        for _ in 0..59 {
            assert!(matches!(s.tick(), Transition::Ticked { .. }));
        }
        assert_eq!(s.remaining_secs(), Some(1));
        assert!(s.timer_running());
        assert_eq!(s.tick(), Transition::Completed(CompletionReason::TimeExpired));
        assert!(s.is_completed());
        assert_eq!(s.remaining_secs(), Some(0));
        assert!(!s.timer_running());
        assert_eq!(s.score(), 0);
        // Ticks after completion do nothing.
        assert_eq!(s.tick(), Transition::Ignored);
    }

    #[test]
    fn practice_mode_never_ticks() {
        let mut s = session(Mode::Practice, 2);
        assert_eq!(s.tick(), Transition::Ignored);
        assert!(!s.timer_running());
    }

    #[test]
    fn one_submission_per_completion() {
        let mut s = session(Mode::Practice, 1);
        assert!(s.take_submission().is_none());
        s.answer("A");
        s.advance();
        let submission = s.take_submission().unwrap();
        assert_eq!(submission.score, 100);
        assert_eq!(submission.course_id, "1");
        assert_eq!(submission.test_id, "3");
        assert!(s.take_submission().is_none());
        assert_eq!(s.finish(), Transition::Ignored);
        assert!(s.take_submission().is_none());

        s.reset();
        s.answer("B");
        s.finish();
        assert_eq!(s.take_submission().unwrap().score, 0);
        assert!(s.take_submission().is_none());
    }

    #[test]
    fn reset_restores_a_fresh_attempt() {
        let mut s = session(Mode::Exam, 4);
        let first_attempt = s.attempt_id();
        for _ in 0..4 {
            s.answer("A");
            s.tick();
            s.advance();
        }
        assert!(s.is_completed());
        assert_eq!(s.reset(), Transition::Reset);
        assert_eq!(s.state(), SessionState::Active);
        assert_eq!(s.current_index(), 0);
        assert!(s.ledger().is_empty());
        assert!(s.completion().is_none());
        assert_eq!(s.remaining_secs(), Some(120));
        assert_ne!(s.attempt_id(), first_attempt);
        // Reset is only legal from Completed.
        assert_eq!(s.reset(), Transition::Ignored);
    }

    #[test]
    fn free_navigation_applies_to_exams_only() {
        let config = SessionConfig::new(TestRef::new("1", 3), Mode::Exam)
            .with_navigation(NavigationPolicy::Free);
        let mut exam = TestSession::new(config);
        exam.load(questions(2));
        assert_eq!(exam.advance(), Transition::Moved { from: 0, to: 1 });
        assert_eq!(exam.finish(), Transition::Completed(CompletionReason::Finished));

        let config = SessionConfig::new(TestRef::new("1", 3), Mode::Practice)
            .with_navigation(NavigationPolicy::Free);
        let mut practice = TestSession::new(config);
        practice.load(questions(2));
        assert_eq!(practice.advance(), Transition::Ignored);
    }

    #[test]
    fn empty_test_completes_with_zero() {
        let mut s = session(Mode::Exam, 0);
        assert!(s.exam_clock().is_none());
        assert_eq!(s.answer("A"), Transition::Ignored);
        assert_eq!(s.score(), 0);
        assert_eq!(s.finish(), Transition::Completed(CompletionReason::Finished));
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn answer_by_option_index() {
        let mut s = session(Mode::Practice, 1);
        assert_eq!(s.answer_option(9), Transition::Ignored);
        assert_eq!(
            s.answer_option(0),
            Transition::Answered(RecordOutcome::Recorded)
        );
        assert!(s.ledger().answer_for(1).unwrap().is_correct);
    }
}
