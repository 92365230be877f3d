//! Card placement inside the terminal frame.

use quotacard_core::{CardBounds, PositionState};
use ratatui::layout::Rect;

/// Rectangle for a `width` x `height` card at `position`, clamped so the
/// whole card stays inside `area`.
///
/// The stored position is not changed: a card placed off-screen on a larger
/// terminal reappears there once the terminal grows again.
pub fn card_area(area: Rect, position: PositionState, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let min_x = i32::from(area.x);
    let min_y = i32::from(area.y);
    let max_x = min_x + i32::from(area.width - width);
    let max_y = min_y + i32::from(area.height - height);

    // Both clamped into u16 bounds above
    let x = (min_x + position.left).clamp(min_x, max_x) as u16;
    let y = (min_y + position.top).clamp(min_y, max_y) as u16;

    Rect::new(x, y, width, height)
}

/// Hit-test bounds for a drawn card
pub fn bounds(rect: Rect) -> CardBounds {
    CardBounds {
        left: i32::from(rect.x),
        top: i32::from(rect.y),
        width: i32::from(rect.width),
        height: i32::from(rect.height),
    }
}
