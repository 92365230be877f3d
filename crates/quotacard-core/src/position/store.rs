use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::backend::{MemoryBackend, PositionBackend};

/// Card anchor, in cells from the overlay's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionState {
    pub top: i32,
    pub left: i32,
}

impl PositionState {
    /// Position used when nothing (valid) has been persisted
    pub const DEFAULT: PositionState = PositionState { top: 555, left: 20 };

    pub fn new(top: i32, left: i32) -> Self {
        Self { top, left }
    }

    /// Decode a persisted record. Fractional values are rounded; anything
    /// else that is not two finite numbers is rejected.
    pub fn from_record(record: &str) -> Option<Self> {
        #[derive(Deserialize)]
        struct Stored {
            top: f64,
            left: f64,
        }

        let value: serde_json::Value = serde_json::from_str(record).ok()?;
        if !value.is_object() {
            return None;
        }
        let stored = Stored::deserialize(value).ok()?;
        if !stored.top.is_finite() || !stored.left.is_finite() {
            return None;
        }
        Some(Self {
            top: stored.top.round() as i32,
            left: stored.left.round() as i32,
        })
    }

    /// Canonical record: `{"top":T,"left":L}`
    pub fn to_record(&self) -> String {
        format!("{{\"top\":{},\"left\":{}}}", self.top, self.left)
    }
}

impl Default for PositionState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Shared handle to the card position.
///
/// Clones share the same state. The in-memory value is authoritative; the
/// backend is best effort and its failures are only logged.
#[derive(Clone)]
pub struct PositionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    current: RwLock<PositionState>,
    backend: Box<dyn PositionBackend>,
}

impl PositionStore {
    /// Open a store, initializing the in-memory position from the backend
    pub fn open(backend: impl PositionBackend + 'static) -> Self {
        let store = Self {
            inner: Arc::new(StoreInner {
                current: RwLock::new(PositionState::DEFAULT),
                backend: Box::new(backend),
            }),
        };
        let loaded = store.load();
        *store.inner.current.write() = loaded;
        store
    }

    /// Store without persistence
    pub fn in_memory() -> Self {
        Self::open(MemoryBackend::new())
    }

    /// Read the persisted position, falling back to [`PositionState::DEFAULT`]
    pub fn load(&self) -> PositionState {
        match self.inner.backend.read() {
            Ok(Some(record)) => PositionState::from_record(&record).unwrap_or_else(|| {
                tracing::debug!("Ignoring malformed position record: {:?}", record);
                PositionState::DEFAULT
            }),
            Ok(None) => PositionState::DEFAULT,
            Err(e) => {
                tracing::debug!("Failed to load position: {:#}", e);
                PositionState::DEFAULT
            }
        }
    }

    /// Set the position and persist it
    pub fn save(&self, state: PositionState) {
        self.update(state);
        if let Err(e) = self.inner.backend.write(&state.to_record()) {
            tracing::debug!("Failed to persist position: {:#}", e);
        }
    }

    /// Set the in-memory position without persisting
    pub fn update(&self, state: PositionState) {
        *self.inner.current.write() = state;
    }

    /// Latest in-memory position
    pub fn current(&self) -> PositionState {
        *self.inner.current.read()
    }
}

impl fmt::Debug for PositionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionStore")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}
