//! The `nursepal history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::resolve_config;

pub async fn execute(api_url: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path, api_url)?;
    let records = config.backend().all_scores().await?;

    if records.is_empty() {
        println!("No attempts recorded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Test", "Score"]);
    for (i, record) in records.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&record.test_id),
            Cell::new(format!("{}%", record.score)),
        ]);
    }
    println!("{table}");
    println!("{} attempts", records.len());
    Ok(())
}
