//! Card position: in-memory state plus best-effort persistence.
//!
//! The position is the only state that outlives a refresh cycle. It is read
//! on every render and written by the drag controller.

mod backend;
mod store;

pub use backend::{FileBackend, MemoryBackend, PositionBackend};
pub use store::{PositionState, PositionStore};

/// Storage key of the persisted position record
pub const DEFAULT_POSITION_KEY: &str = "ai-usage-widget-pos";
