//! Quota snapshots: the JSON file written by the external collector.
//!
//! The format is partial-tolerant: missing keys are absent fields, and a
//! structurally odd but well-formed document still yields a snapshot.

mod lenient;
pub mod parser;
pub mod types;

pub use parser::{parse, read_snapshot, ParseFailure};
pub use types::{AntigravityUsage, ClaudeUsage, ExtraUsage, ModelUsage, QuotaSnapshot, UsageWindow};
