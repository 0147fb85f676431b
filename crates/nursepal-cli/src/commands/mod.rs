pub mod history;
pub mod init;
pub mod rank;
pub mod scores;
pub mod take;

use std::path::PathBuf;

use anyhow::Result;

use nursepal_client::{load_config_from, NursepalConfig};

/// Load config and apply a `--api-url` override.
pub(crate) fn resolve_config(
    config_path: Option<PathBuf>,
    api_url: Option<String>,
) -> Result<NursepalConfig> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(url) = api_url {
        config.api_base_url = url;
    }
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}
