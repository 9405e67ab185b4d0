//! Viewport state for pan/zoom over the fixed logical canvas.
//!
//! The logical canvas is a constant `CANVAS_WIDTH` × `CANVAS_HEIGHT` space.
//! The viewport picks the visible region of it (zoomed around the canvas
//! center, shifted by `pan`) and that region is fitted into the rendered
//! surface preserving aspect ratio. Every conversion is derived from the
//! current state on demand, so nothing has to be invalidated when zoom or pan
//! changes mid-gesture.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, MAX_ZOOM, MIN_ZOOM};

/// A point in either screen or logical space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Size of the rendered surface in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Default for Surface {
    fn default() -> Self {
        Self { width: CANVAS_WIDTH, height: CANVAS_HEIGHT }
    }
}

/// Uniform-scale affine map from logical to screen space:
/// `screen = logical * scale + (tx, ty)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Transform {
    /// Map a logical point to screen space.
    #[must_use]
    pub fn apply(&self, logical: Point) -> Point {
        Point::new(logical.x * self.scale + self.tx, logical.y * self.scale + self.ty)
    }

    /// Map a screen point back to logical space.
    #[must_use]
    pub fn invert(&self, screen: Point) -> Point {
        Point::new((screen.x - self.tx) / self.scale, (screen.y - self.ty) / self.scale)
    }
}

/// Zoom and pan over the logical canvas.
///
/// `zoom` is a scale factor (1.0 = the whole canvas is visible) and is kept
/// within `[MIN_ZOOM, MAX_ZOOM]`. `pan` is in logical units and shifts the
/// center of the visible region away from the canvas center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan: Point::default() }
    }
}

impl Viewport {
    /// The logical rectangle currently in view.
    #[must_use]
    pub fn visible_region(&self) -> Rect {
        let width = CANVAS_WIDTH / self.zoom;
        let height = CANVAS_HEIGHT / self.zoom;
        let cx = CANVAS_WIDTH * 0.5 + self.pan.x;
        let cy = CANVAS_HEIGHT * 0.5 + self.pan.y;
        Rect { x: cx - width * 0.5, y: cy - height * 0.5, width, height }
    }

    /// Multiply the zoom level by `factor`, clamped to the allowed range.
    ///
    /// Non-finite or non-positive factors are ignored.
    pub fn zoom_by(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Back to zoom 1.0 with no pan.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Shift the view by a screen-pixel drag delta.
    ///
    /// Dragging right moves the content right, so the visible region moves left.
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64) {
        self.pan.x -= dx / self.zoom;
        self.pan.y -= dy / self.zoom;
    }

    /// Logical-to-screen transform for a surface of the given size.
    ///
    /// The visible region is scaled uniformly to fit the surface and centered
    /// along the axis with spare room. A degenerate surface falls back to the
    /// canvas size.
    #[must_use]
    pub fn transform(&self, surface: Surface) -> Transform {
        let surface = if surface.width > 0.0 && surface.height > 0.0 {
            surface
        } else {
            Surface::default()
        };
        let region = self.visible_region();
        let scale = (surface.width / region.width).min(surface.height / region.height);
        let offset_x = (surface.width - region.width * scale) * 0.5;
        let offset_y = (surface.height - region.height * scale) * 0.5;
        Transform { scale, tx: offset_x - region.x * scale, ty: offset_y - region.y * scale }
    }

    /// Convert a screen-space point (CSS pixels) to logical coordinates.
    #[must_use]
    pub fn screen_to_logical(&self, screen: Point, surface: Surface) -> Point {
        self.transform(surface).invert(screen)
    }

    /// Convert a logical point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn logical_to_screen(&self, logical: Point, surface: Surface) -> Point {
        self.transform(surface).apply(logical)
    }
}
