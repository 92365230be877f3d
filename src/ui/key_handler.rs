//! Terminal input mapping.
//!
//! Resolving an event into an action is separate from executing it, so the
//! mapping is testable without a terminal.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use quotacard_core::{Point, PointerEvent};

/// Result of key resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// No action needed
    None,
    /// Exit the application
    Quit,
    /// Re-read the snapshot now
    Refresh,
}

/// Map a key press to an action
pub fn resolve_key(key: &KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char('r') => KeyAction::Refresh,
        _ => KeyAction::None,
    }
}

/// Map a mouse event to a pointer event for the drag controller.
///
/// Terminals report motion without a button once the release happened
/// somewhere we did not see (outside the window, for instance). During a
/// drag that is treated as a lost release.
pub fn pointer_event(mouse: &MouseEvent, dragging: bool) -> Option<PointerEvent> {
    let point = Point::new(i32::from(mouse.column), i32::from(mouse.row));
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Down(point)),
        MouseEventKind::Drag(MouseButton::Left) => Some(PointerEvent::Move(point)),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up(point)),
        MouseEventKind::Moved if dragging => Some(PointerEvent::Cancel),
        _ => None,
    }
}
