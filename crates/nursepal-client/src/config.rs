//! Client configuration and backend factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use nursepal_core::model::{Mode, NavigationPolicy};

use crate::http::{HttpBackend, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Top-level nursepal configuration.
///
/// Note: Custom Debug impl masks the access token to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct NursepalConfig {
    /// Base URL of the REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Bearer token sent with every request.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Mode used when `--mode` is not given.
    #[serde(default)]
    pub default_mode: Mode,
    /// Let exam sessions move forward past unanswered questions.
    #[serde(default)]
    pub exam_free_navigation: bool,
}

impl std::fmt::Debug for NursepalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NursepalConfig")
            .field("api_base_url", &self.api_base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("default_mode", &self.default_mode)
            .field("exam_free_navigation", &self.exam_free_navigation)
            .finish()
    }
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for NursepalConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            access_token: None,
            request_timeout_secs: default_timeout(),
            default_mode: Mode::default(),
            exam_free_navigation: false,
        }
    }
}

impl NursepalConfig {
    pub fn navigation(&self) -> NavigationPolicy {
        if self.exam_free_navigation {
            NavigationPolicy::Free
        } else {
            NavigationPolicy::AnswerRequired
        }
    }

    /// Build an HTTP backend from this configuration.
    pub fn backend(&self) -> HttpBackend {
        HttpBackend::new(
            Some(self.api_base_url.clone()),
            self.access_token.clone(),
            self.request_timeout_secs,
        )
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `nursepal.toml` in the current directory
/// 2. `~/.config/nursepal/config.toml`
///
/// Environment variable overrides: `NURSEPAL_API_URL`, `NURSEPAL_TOKEN`.
pub fn load_config() -> Result<NursepalConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<NursepalConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("nursepal.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<NursepalConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => NursepalConfig::default(),
    };

    if let Ok(url) = std::env::var("NURSEPAL_API_URL") {
        config.api_base_url = url;
    }
    if let Ok(token) = std::env::var("NURSEPAL_TOKEN") {
        config.access_token = Some(token);
    }

    config.api_base_url = resolve_env_vars(&config.api_base_url);
    config.access_token = config
        .access_token
        .as_deref()
        .map(resolve_env_vars)
        .filter(|t| !t.is_empty());

    anyhow::ensure!(
        config.request_timeout_secs >= 1,
        "request_timeout_secs must be at least 1"
    );

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("nursepal"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_NURSEPAL_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_NURSEPAL_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_NURSEPAL_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_NURSEPAL_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = NursepalConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.default_mode, Mode::Practice);
        assert_eq!(config.navigation(), NavigationPolicy::AnswerRequired);
    }

    #[test]
    fn parse_config_file() {
        let toml_str = r#"
api_base_url = "http://localhost:4000/api/v1"
access_token = "abc"
request_timeout_secs = 10
default_mode = "exam"
exam_free_navigation = true
"#;
        let config: NursepalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:4000/api/v1");
        assert_eq!(config.default_mode, Mode::Exam);
        assert_eq!(config.navigation(), NavigationPolicy::Free);
    }

    #[test]
    fn debug_masks_token() {
        let config = NursepalConfig {
            access_token: Some("super-secret".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nursepal.toml");
        std::fs::write(&path, "request_timeout_secs = 12\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.request_timeout_secs, 12);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/nursepal.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nursepal.toml");
        std::fs::write(&path, "request_timeout_secs = 0\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }
}
