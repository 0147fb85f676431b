//! nursepal-client — Backend integrations.
//!
//! Implements the `QuestionBank` and `ScoreSink` traits over the nursepal
//! REST API, plus an in-memory mock for tests.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{load_config, load_config_from, NursepalConfig};
pub use http::HttpBackend;
pub use nursepal_core::error::BackendError;
