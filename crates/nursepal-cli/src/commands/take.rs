//! The `nursepal take` command.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use nursepal_core::driver::{DriverOutcome, SessionCommand, SessionDriver, SessionObserver};
use nursepal_core::error::SessionError;
use nursepal_core::model::{Mode, NavigationPolicy, TestRef};
use nursepal_core::scoring::ReportOutcome;
use nursepal_core::session::{CompletionReason, SessionConfig, SessionState};
use nursepal_core::view::{OptionMark, SessionReview, SessionView};

use super::resolve_config;

const HELP: &str = "Commands: <number> select option, n next, p previous, f finish, r retry, q quit";

/// What was last printed, so ticks and no-op commands don't repaint.
#[derive(PartialEq)]
struct Rendered {
    state: SessionState,
    number: usize,
    selected: Option<String>,
}

/// Console renderer for a running session.
struct ConsoleObserver {
    last: Mutex<Option<Rendered>>,
}

impl ConsoleObserver {
    fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }
}

impl SessionObserver for ConsoleObserver {
    fn on_view(&self, view: &SessionView) {
        let key = Rendered {
            state: view.state,
            number: view.number,
            selected: view.selected.clone(),
        };
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        if last.as_ref() == Some(&key) {
            // Only the clock moved. Announce whole minutes.
            if let Some(remaining) = view.remaining_secs {
                if remaining > 0 && remaining % 60 == 0 {
                    println!("  [{} remaining]", view.remaining_display().unwrap_or_default());
                }
            }
            return;
        }
        *last = Some(key);

        if view.state != SessionState::Active {
            return;
        }
        print_question(view);
    }

    fn on_load_error(&self, error: &SessionError) {
        tracing::debug!("load error: {error:?}");
        eprintln!("Could not load this test. Check your connection and try again.");
    }

    fn on_completed(&self, review: &SessionReview) {
        print_review(review);
    }

    fn on_report(&self, outcome: &ReportOutcome) {
        match outcome {
            ReportOutcome::Submitted { message } => println!("Score submitted: {message}"),
            ReportOutcome::Failed(e) => eprintln!("Warning: {e}"),
        }
    }
}

fn print_question(view: &SessionView) {
    println!();
    match view.remaining_display() {
        Some(remaining) => println!(
            "Question {} of {} ({} mode, {remaining} left)",
            view.number, view.total, view.mode
        ),
        None => println!(
            "Question {} of {} ({} mode)",
            view.number, view.total, view.mode
        ),
    }

    let Some(prompt) = &view.prompt else {
        println!("This test has no questions. Enter n to finish.");
        return;
    };
    println!("{prompt}");
    for (i, option) in view.options.iter().enumerate() {
        let marker = match option.mark {
            OptionMark::Plain => " ",
            OptionMark::Selected => ">",
            OptionMark::SelectedCorrect => "+",
            OptionMark::SelectedWrong => "x",
        };
        println!(" {marker} {}. {}", i + 1, option.text);
    }
    if let Some(explanation) = &view.explanation {
        if !explanation.is_empty() {
            println!("Explanation: {explanation}");
        }
    }

    let mut hints = Vec::new();
    if view.can_retreat {
        hints.push("p previous".to_string());
    }
    if view.can_advance {
        hints.push(format!("n {}", view.advance_label().to_lowercase()));
    }
    hints.push("q quit".to_string());
    println!("({})", hints.join(", "));
}

fn print_review(review: &SessionReview) {
    println!();
    if review.reason == Some(CompletionReason::TimeExpired) {
        println!("Time is up!");
    }
    println!("Test Completed!");
    println!(
        "Score: {}% ({}/{} correct)",
        review.score, review.correct, review.total
    );
    if let Some(taken) = review.time_taken_display() {
        println!("Time taken: {taken}");
    }

    if review.mode == Mode::Exam {
        println!();
        for q in &review.questions {
            let status = if q.is_correct { "correct" } else { "wrong" };
            println!("{}. {} [{status}]", q.number, q.prompt);
            println!(
                "   Your answer: {}",
                q.selected.as_deref().unwrap_or("(unanswered)")
            );
            if !q.is_correct {
                println!("   Correct answer: {}", q.correct_option);
            }
            if !q.explanation.is_empty() {
                println!("   {}", q.explanation);
            }
        }
    }
    println!("(r retry, q quit)");
}

fn print_introduction() {
    println!("Start your journey!");
    println!("  - Start with Practice Mode to familiarize yourself with the questions.");
    println!("  - Take your time to understand each concept thoroughly.");
    println!("  - When you're ready, try Exam Mode to test your knowledge.");
    println!();
    println!("Begin with: nursepal take --course <course> --test 1 --mode practice");
}

/// Parse one line of user input.
pub(crate) fn parse_command(line: &str) -> Option<SessionCommand> {
    let input = line.trim().to_lowercase();
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).map(SessionCommand::AnswerOption);
    }
    match input.as_str() {
        "n" | "next" => Some(SessionCommand::Next),
        "p" | "prev" | "previous" => Some(SessionCommand::Previous),
        "f" | "finish" => Some(SessionCommand::Finish),
        "r" | "retry" | "reset" => Some(SessionCommand::Reset),
        "q" | "quit" | "exit" => Some(SessionCommand::Abandon),
        _ => None,
    }
}

/// Forward stdin lines as commands until EOF or quit.
fn spawn_input_reader(tx: mpsc::Sender<SessionCommand>) -> Result<()> {
    std::thread::Builder::new()
        .name("nursepal-stdin".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Some(command) => {
                        let quit = command == SessionCommand::Abandon;
                        if tx.blocking_send(command).is_err() || quit {
                            break;
                        }
                    }
                    None => eprintln!("{HELP}"),
                }
            }
        })
        .context("failed to start input reader")?;
    Ok(())
}

pub async fn execute(
    course: String,
    test: u32,
    mode: Option<Mode>,
    free_navigation: bool,
    api_url: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = resolve_config(config_path, api_url)?;
    let test = TestRef::new(course, test);

    if test.is_introduction() {
        print_introduction();
        return Ok(());
    }

    let mode = mode.unwrap_or(config.default_mode);
    let navigation = if free_navigation {
        NavigationPolicy::Free
    } else {
        config.navigation()
    };

    let backend = Arc::new(config.backend());
    let driver = SessionDriver::new(backend.clone(), backend);

    println!("nursepal: {test} ({mode} mode)");
    println!("{HELP}");

    let (tx, rx) = mpsc::channel(16);
    spawn_input_reader(tx)?;

    let session = SessionConfig::new(test, mode).with_navigation(navigation);
    let observer = ConsoleObserver::new();

    match driver.run(session, rx, &observer).await {
        DriverOutcome::Introduction => {
            print_introduction();
            Ok(())
        }
        DriverOutcome::LoadFailed(e) => Err(e.into()),
        DriverOutcome::Closed {
            final_state,
            completions,
            reports,
        } => {
            if final_state == SessionState::Active {
                println!("Session abandoned; no score recorded.");
            }
            let failed = reports.iter().filter(|r| !r.is_submitted()).count();
            tracing::info!(completions, failed, "session closed");
            Ok(())
        }
    }
}
