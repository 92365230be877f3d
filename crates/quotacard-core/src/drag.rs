//! Drag controller: pointer events to card position updates.
//!
//! Two states: `Idle` and `Dragging`. While dragging, every move writes the
//! new position to the in-memory store; releasing persists it.

use crate::position::{PositionState, PositionStore};

/// Pointer location in overlay cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// On-screen rectangle of the card as last drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CardBounds {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl CardBounds {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left
            && p.x < self.left + self.width
            && p.y >= self.top
            && p.y < self.top + self.height
    }
}

/// Low-level pointer input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Primary button pressed
    Down(Point),
    /// Pointer moved with the button held
    Move(Point),
    /// Primary button released
    Up(Point),
    /// The release will not arrive (focus lost, release seen elsewhere)
    Cancel,
}

/// What handling an event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Event did not affect the drag
    Ignored,
    /// A drag started
    Started,
    /// Card moved to a new position
    Moved(PositionState),
    /// Drag finished and the position was persisted
    Released(PositionState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    /// Pointer offset from the card's top-left corner at grab time
    Dragging { offset: Point },
}

/// Turns pointer events into [`PositionStore`] updates
#[derive(Debug)]
pub struct DragController {
    store: PositionStore,
    state: DragState,
}

impl DragController {
    pub fn new(store: PositionStore) -> Self {
        Self {
            store,
            state: DragState::Idle,
        }
    }

    /// Whether a drag is in progress
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Handle one pointer event. `card` is where the card was last drawn.
    pub fn handle(&mut self, event: PointerEvent, card: CardBounds) -> DragOutcome {
        match (self.state, event) {
            (DragState::Idle, PointerEvent::Down(p)) if card.contains(p) => {
                let offset = Point::new(p.x - card.left, p.y - card.top);
                tracing::trace!("Drag started at {:?}, offset {:?}", p, offset);
                self.state = DragState::Dragging { offset };
                DragOutcome::Started
            }
            (DragState::Dragging { offset }, PointerEvent::Move(p)) => {
                let position = PositionState::new(p.y - offset.y, p.x - offset.x);
                self.store.update(position);
                DragOutcome::Moved(position)
            }
            (DragState::Dragging { .. }, PointerEvent::Up(_) | PointerEvent::Cancel) => {
                self.state = DragState::Idle;
                let position = self.store.current();
                self.store.save(position);
                tracing::debug!("Drag released at {:?}", position);
                DragOutcome::Released(position)
            }
            // Down while dragging (single pointer), or stray moves/releases
            _ => DragOutcome::Ignored,
        }
    }
}
