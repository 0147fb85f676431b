//! The `nursepal scores` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use nursepal_core::model::CourseScore;
use nursepal_core::statistics::{course_progress, ScoreBand};

use super::resolve_config;

pub async fn execute(
    course: String,
    api_url: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = resolve_config(config_path, api_url)?;
    let backend = config.backend();

    let scores = backend.course_scores(&course).await?;
    if scores.is_empty() {
        println!("No scores yet for course {course}. Take a test to get started.");
        return Ok(());
    }

    print_scores(&course, &scores);
    Ok(())
}

fn print_scores(course: &str, scores: &[CourseScore]) {
    let progress = course_progress(scores);

    let mut summary = Table::new();
    summary.set_header(vec!["Average", "Tests Attempted", "Highest"]);
    summary.add_row(vec![
        Cell::new(format!("{}%", progress.average)),
        Cell::new(progress.tests_attempted),
        Cell::new(
            progress
                .highest
                .map(|h| format!("{h}%"))
                .unwrap_or_else(|| "-".into()),
        ),
    ]);
    println!("Course {course}");
    println!("{summary}");

    let mut table = Table::new();
    table.set_header(vec!["Test", "Best Score", "Band"]);
    for score in scores {
        let band = match ScoreBand::of(score.highest_score) {
            ScoreBand::Strong => "strong",
            ScoreBand::Fair => "fair",
            ScoreBand::Weak => "needs work",
        };
        table.add_row(vec![
            Cell::new(&score.test_id),
            Cell::new(format!("{}%", score.highest_score)),
            Cell::new(band),
        ]);
    }
    println!("{table}");
}
