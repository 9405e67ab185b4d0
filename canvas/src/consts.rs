//! Shared numeric constants for the canvas crate.

// ── Canvas ──────────────────────────────────────────────────────

/// Width of the logical canvas in units (pixels at zoom 1.0).
pub const CANVAS_WIDTH: f64 = 1200.0;

/// Height of the logical canvas in units.
pub const CANVAS_HEIGHT: f64 = 800.0;

/// Minimum distance between a table center and the canvas edge.
pub const EDGE_MARGIN: f64 = 50.0;

// ── Zoom ────────────────────────────────────────────────────────

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 3.0;

/// Factor applied by the zoom-in control.
pub const ZOOM_IN_STEP: f64 = 1.25;

/// Factor applied by the zoom-out control.
pub const ZOOM_OUT_STEP: f64 = 0.8;

/// Factor applied per wheel notch scrolled up.
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Factor applied per wheel notch scrolled down.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

// ── Interaction ─────────────────────────────────────────────────

/// Screen-space movement below which a press/release counts as a click.
pub const CLICK_SLOP_PX: f64 = 4.0;

// ── Seats ───────────────────────────────────────────────────────

/// Gap between a table edge and the center of its chairs.
pub const CHAIR_OFFSET: f64 = 22.0;

/// Seat count used when a table record has none.
pub const DEFAULT_SEAT_COUNT: u32 = 4;
