//! Core library for quotacard.
//!
//! Turns the JSON quota snapshot written by the external collector into a
//! render plan, and owns the card position (store + drag handling). Nothing
//! in here touches the terminal.

pub mod derive;
pub mod drag;
pub mod plan;
pub mod position;
pub mod snapshot;

pub use derive::{Thresholds, Tone};
pub use drag::{CardBounds, DragController, DragOutcome, Point, PointerEvent};
pub use plan::{build, Meter, PlanBlock, Provider, ProviderSection, RenderPlan, SectionBody};
pub use position::{FileBackend, MemoryBackend, PositionBackend, PositionState, PositionStore};
pub use snapshot::{parse, read_snapshot, ParseFailure, QuotaSnapshot};
