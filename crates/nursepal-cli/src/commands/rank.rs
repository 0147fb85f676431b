//! The `nursepal rank` command.

use std::path::PathBuf;

use anyhow::Result;

use super::resolve_config;

pub async fn execute(api_url: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path, api_url)?;
    let rank = config.backend().rank().await?;
    println!("Rank {} of {}", rank.rank, rank.total_users);
    Ok(())
}
