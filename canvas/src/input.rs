//! Input model: pointer, touch and wheel events, and the interaction session.
//!
//! Mouse and touch arrive as different event families but drive the same
//! session: a single touch behaves exactly like the mouse, and two touches
//! switch to pinch-zoom. `InteractionSession` is the active gesture tracked
//! between press and release, carrying everything needed to compute the next
//! move. It is only ever transitioned by [`crate::engine::EngineCore::handle`].

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::Point;
use crate::doc::{FloorId, TableId};

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// A raw input event in screen space (CSS pixels relative to the surface).
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button pressed.
    PointerDown { screen: Point },
    /// Mouse moved (pressed or not).
    PointerMove { screen: Point },
    /// Mouse button released.
    PointerUp { screen: Point },
    /// A finger touched down. `touches` lists every active touch point.
    TouchStart { touches: Vec<Point> },
    /// Touch points moved. `touches` lists every active touch point.
    TouchMove { touches: Vec<Point> },
    /// A finger lifted. `touches` lists the touch points still down.
    TouchEnd { touches: Vec<Point> },
    /// The platform aborted the touch sequence.
    TouchCancel,
    /// Wheel or trackpad scroll.
    Wheel { screen: Point, delta: WheelDelta },
}

/// Persistent UI state visible to the renderer and the host shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    /// The floor whose tables are on screen.
    pub selected_floor: Option<FloorId>,
    /// The table whose properties panel is open.
    pub selected_table: Option<TableId>,
}

/// The in-progress pointer gesture.
///
/// Each active variant carries the context needed to compute deltas and decide
/// on release whether the gesture was a click.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionSession {
    /// No gesture in progress; waiting for the next press.
    #[default]
    Idle,
    /// Dragging on empty canvas moves the view.
    Panning {
        /// Screen position of the previous event, used to compute the pan delta.
        last_screen: Point,
        /// Screen position of the press, used for the click threshold.
        origin: Point,
        /// Whether the pointer has left the click threshold.
        moved: bool,
    },
    /// Moving a table.
    DraggingTable {
        table_id: TableId,
        /// Pointer minus table center at the start of the drag, in logical units.
        offset: Point,
        /// Screen position of the press, used for the click threshold.
        origin: Point,
        /// Whether the pointer has left the click threshold.
        moved: bool,
    },
    /// Two touches are down; their distance drives the zoom.
    Pinching {
        /// Distance between the two touches at the previous event, in screen pixels.
        last_distance: f64,
        /// Table that was being dragged before the second touch, resumed when
        /// only one touch remains.
        resume: Option<TableId>,
    },
}

impl InteractionSession {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The table being dragged, if any.
    #[must_use]
    pub fn dragged_table(&self) -> Option<TableId> {
        match self {
            Self::DraggingTable { table_id, .. } => Some(*table_id),
            _ => None,
        }
    }
}

/// Distance between the first two touches, if there are at least two.
#[must_use]
pub fn pinch_distance(touches: &[Point]) -> Option<f64> {
    match touches {
        [a, b, ..] => Some(a.distance(*b)),
        _ => None,
    }
}
