#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::doc::{DocStore, FloorId, Table, TableId};

/// Whether `logical` lies inside the table's outline.
///
/// Round shapes test against the inscribed ellipse, everything else against
/// the bounding box. Points exactly on the outline count as inside.
#[must_use]
pub fn contains(table: &Table, logical: Point) -> bool {
    let half_w = table.width * 0.5;
    let half_h = table.height * 0.5;
    if half_w <= 0.0 || half_h <= 0.0 {
        return false;
    }
    let dx = logical.x - table.x_position;
    let dy = logical.y - table.y_position;
    if table.shape.is_round() {
        (dx / half_w).powi(2) + (dy / half_h).powi(2) <= 1.0
    } else {
        dx.abs() <= half_w && dy.abs() <= half_h
    }
}

/// The top-most table shown for `floor` under `logical`, if any.
///
/// Tables later in draw order are on top, so they are checked first.
#[must_use]
pub fn hit_table(logical: Point, doc: &DocStore, floor: Option<FloorId>) -> Option<TableId> {
    doc.tables_on(floor)
        .into_iter()
        .rev()
        .find(|t| contains(t, logical))
        .map(|t| t.id)
}
