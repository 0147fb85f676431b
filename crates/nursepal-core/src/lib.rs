//! nursepal-core — Test-session state machine, answer ledger, and scoring.
//!
//! This crate defines the quiz data model, the per-attempt session logic,
//! and the async driver that binds a session to a backend and a timer.

pub mod accessor;
pub mod driver;
pub mod error;
pub mod ledger;
pub mod model;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod time;
pub mod timer;
pub mod traits;
pub mod view;
