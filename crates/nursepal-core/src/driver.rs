//! Async session driver.
//!
//! Loads a test, then serializes user commands and exam-timer ticks onto a
//! single task so that session mutations never race. Each completion
//! dispatches exactly one score submission; abandoning never submits.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::instrument;

use crate::accessor::load_questions;
use crate::error::SessionError;
use crate::scoring::{ReportOutcome, ScoreReporter};
use crate::session::{SessionConfig, SessionState, TestSession, Transition};
use crate::timer::Ticker;
use crate::traits::{QuestionBank, ScoreSink};
use crate::view::{SessionReview, SessionView};

/// A user action delivered to the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Select an option by its text.
    Answer(String),
    /// Select an option by 0-based display position.
    AnswerOption(usize),
    Next,
    Previous,
    Finish,
    /// Start over after completion.
    Reset,
    /// Leave the session. Stops the timer; never submits.
    Abandon,
}

/// Receives everything the presentation layer needs to render.
pub trait SessionObserver: Send + Sync {
    fn on_view(&self, view: &SessionView);
    fn on_load_error(&self, error: &SessionError);
    fn on_completed(&self, review: &SessionReview);
    fn on_report(&self, outcome: &ReportOutcome);
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_view(&self, _: &SessionView) {}
    fn on_load_error(&self, _: &SessionError) {}
    fn on_completed(&self, _: &SessionReview) {}
    fn on_report(&self, _: &ReportOutcome) {}
}

/// How a driver run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverOutcome {
    /// Test id 0: nothing to run.
    Introduction,
    /// Questions could not be loaded; the session never left `Loading`.
    LoadFailed(SessionError),
    /// The user left or the command stream closed.
    Closed {
        final_state: SessionState,
        completions: usize,
        reports: Vec<ReportOutcome>,
    },
}

/// Runs test sessions against a backend.
pub struct SessionDriver {
    bank: Arc<dyn QuestionBank>,
    reporter: ScoreReporter,
}

impl SessionDriver {
    pub fn new(bank: Arc<dyn QuestionBank>, sink: Arc<dyn ScoreSink>) -> Self {
        Self {
            bank,
            reporter: ScoreReporter::new(sink),
        }
    }

    /// Drive one session until `commands` yields `Abandon` or closes.
    ///
    /// In-flight score submissions are awaited before returning.
    #[instrument(skip_all, fields(test = %config.test, mode = %config.mode))]
    pub async fn run(
        &self,
        config: SessionConfig,
        mut commands: mpsc::Receiver<SessionCommand>,
        observer: &dyn SessionObserver,
    ) -> DriverOutcome {
        let test = config.test.clone();
        let mut session = TestSession::new(config);

        match load_questions(self.bank.as_ref(), &test).await {
            Ok(questions) => {
                session.load(questions);
            }
            Err(SessionError::IntroductionScreen(_)) => return DriverOutcome::Introduction,
            Err(e) => {
                session.fail_load(e.clone());
                observer.on_load_error(&e);
                observer.on_view(&SessionView::of(&session));
                return DriverOutcome::LoadFailed(e);
            }
        }

        let mut ticker = Ticker::default();
        if session.timer_running() {
            ticker.start();
        }
        observer.on_view(&SessionView::of(&session));

        let mut pending: FuturesUnordered<JoinHandle<ReportOutcome>> = FuturesUnordered::new();
        let mut reports = Vec::new();
        let mut completions = 0usize;

        loop {
            let transition = tokio::select! {
                command = commands.recv() => match command {
                    None | Some(SessionCommand::Abandon) => break,
                    Some(command) => apply(&mut session, command),
                },
                _ = ticker.tick() => session.tick(),
                Some(joined) = pending.next(), if !pending.is_empty() => {
                    if let Some(outcome) = joined_outcome(joined) {
                        observer.on_report(&outcome);
                        reports.push(outcome);
                    }
                    continue;
                }
            };

            match transition {
                Transition::Ignored => continue,
                Transition::Completed(_) => {
                    ticker.stop();
                    completions += 1;
                    if let Some(submission) = session.take_submission() {
                        pending.push(self.reporter.dispatch(test.clone(), submission));
                    }
                    observer.on_completed(&SessionReview::of(&session));
                }
                Transition::Reset => {
                    if session.timer_running() {
                        ticker.start();
                    }
                }
                _ => {}
            }
            observer.on_view(&SessionView::of(&session));
        }

        ticker.stop();
        if session.state() == SessionState::Active {
            tracing::info!(attempt = %session.attempt_id(), "session abandoned");
        }

        while let Some(joined) = pending.next().await {
            if let Some(outcome) = joined_outcome(joined) {
                observer.on_report(&outcome);
                reports.push(outcome);
            }
        }

        DriverOutcome::Closed {
            final_state: session.state(),
            completions,
            reports,
        }
    }
}

fn apply(session: &mut TestSession, command: SessionCommand) -> Transition {
    match command {
        SessionCommand::Answer(option) => session.answer(&option),
        SessionCommand::AnswerOption(index) => session.answer_option(index),
        SessionCommand::Next => session.advance(),
        SessionCommand::Previous => session.retreat(),
        SessionCommand::Finish => session.finish(),
        SessionCommand::Reset => session.reset(),
        SessionCommand::Abandon => Transition::Ignored,
    }
}

fn joined_outcome(joined: Result<ReportOutcome, tokio::task::JoinError>) -> Option<ReportOutcome> {
    match joined {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            tracing::error!("score submission task failed: {e}");
            None
        }
    }
}
