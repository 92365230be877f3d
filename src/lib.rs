//! quotacard: a floating terminal card showing AI usage quotas.
//!
//! The snapshot pipeline and position handling live in `quotacard-core`;
//! this crate adds configuration, the background poller and the terminal UI.

pub mod config;
pub mod monitor;
pub mod ui;
