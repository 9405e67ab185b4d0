//! Document model: floors, tables, shapes, and the in-memory store.
//!
//! This module defines what is on the floor plan (`Floor`, `Table`, `Shape`),
//! a sparse-update type for layout edits (`TableLayoutUpdate`), the palette of
//! table templates (`ShapeTemplate`), and the runtime store that owns every
//! floor and table known for the tenant (`DocStore`).
//!
//! Data flows into this layer from the network (JSON deserialization through
//! `TableRecord`, which fills in per-shape defaults) and from the input engine
//! (position mutations). The renderer reads from `DocStore` via `tables_on`.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, DEFAULT_SEAT_COUNT};

/// Server-assigned floor identifier.
pub type FloorId = i64;

/// Server-assigned table identifier.
pub type TableId = i64;

/// A named layer of the restaurant layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub name: String,
}

/// Table outline. Drives both rendering and chair placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Four-sided table with chairs on every edge.
    #[default]
    Rectangle,
    /// Round table; chairs evenly around the rim.
    Circle,
    /// Elliptical table; chairs evenly around the rim.
    Oval,
    /// Bench seating along the top and bottom edges.
    Booth,
    /// Counter with stools along the front edge.
    Bar,
}

impl Shape {
    /// Parse a wire shape name. Unknown names fall back to `Rectangle`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "circle" | "round" => Self::Circle,
            "oval" => Self::Oval,
            "booth" => Self::Booth,
            "bar" => Self::Bar,
            _ => Self::Rectangle,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Oval => "oval",
            Self::Booth => "booth",
            Self::Bar => "bar",
        }
    }

    /// Width and height used when a table has no stored dimensions.
    #[must_use]
    pub fn default_size(self) -> (f64, f64) {
        match self {
            Self::Rectangle | Self::Booth => (120.0, 80.0),
            Self::Circle => (100.0, 100.0),
            Self::Oval => (160.0, 100.0),
            Self::Bar => (200.0, 50.0),
        }
    }

    /// Whether the outline is an ellipse inscribed in the table's box.
    #[must_use]
    pub fn is_round(self) -> bool {
        matches!(self, Self::Circle | Self::Oval)
    }
}

/// Live occupancy, sourced from order data. Never changed by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
}

impl TableStatus {
    /// Parse a wire status. Anything other than `occupied` reads as available.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("occupied") {
            Self::Occupied
        } else {
            Self::Available
        }
    }
}

/// A table as held by the editor, with every layout field resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TableRecord")]
pub struct Table {
    pub id: TableId,
    pub name: String,
    /// `None` means the table is not assigned to any floor.
    pub floor_id: Option<FloorId>,
    /// Center x in logical canvas coordinates.
    pub x_position: f64,
    /// Center y in logical canvas coordinates.
    pub y_position: f64,
    pub shape: Shape,
    pub width: f64,
    pub height: f64,
    pub seat_count: u32,
    pub status: TableStatus,
    /// Public token behind the table's QR-code menu.
    pub token: Option<Uuid>,
}

impl Table {
    /// Center of the table in logical coordinates.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x_position, self.y_position)
    }

    /// Path of the customer-facing menu for this table, if it has a token.
    #[must_use]
    pub fn menu_path(&self) -> Option<String> {
        self.token.map(|t| format!("/menu/{t}"))
    }
}

/// Table as it arrives from the service. Missing layout fields are common for
/// tables created before the floor plan existed.
#[derive(Debug, Clone, Deserialize)]
pub struct TableRecord {
    pub id: TableId,
    #[serde(default)]
    pub name: String,
    pub floor_id: Option<FloorId>,
    pub x_position: Option<f64>,
    pub y_position: Option<f64>,
    pub shape: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub seat_count: Option<u32>,
    pub status: Option<String>,
    pub token: Option<Uuid>,
}

impl From<TableRecord> for Table {
    fn from(rec: TableRecord) -> Self {
        let shape = rec.shape.as_deref().map_or(Shape::Rectangle, Shape::parse);
        let (default_w, default_h) = shape.default_size();
        let positive = |v: Option<f64>| v.filter(|n| n.is_finite() && *n > 0.0);
        Self {
            id: rec.id,
            name: rec.name,
            floor_id: rec.floor_id,
            x_position: rec
                .x_position
                .filter(|n| n.is_finite())
                .unwrap_or(CANVAS_WIDTH * 0.5),
            y_position: rec
                .y_position
                .filter(|n| n.is_finite())
                .unwrap_or(CANVAS_HEIGHT * 0.5),
            shape,
            width: positive(rec.width).unwrap_or(default_w),
            height: positive(rec.height).unwrap_or(default_h),
            seat_count: rec.seat_count.unwrap_or(DEFAULT_SEAT_COUNT).max(1),
            status: rec
                .status
                .as_deref()
                .map_or(TableStatus::Available, TableStatus::parse),
            token: rec.token,
        }
    }
}

/// Sparse layout/property update for a table. Only present fields are sent and applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableLayoutUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_position: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_position: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_count: Option<u32>,
}

impl TableLayoutUpdate {
    /// Position-only update.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self { x_position: Some(x), y_position: Some(y), ..Default::default() }
    }

    /// Whether the update carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A palette entry for adding a new table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeTemplate {
    pub label: &'static str,
    pub shape: Shape,
    pub width: f64,
    pub height: f64,
    pub seat_count: u32,
}

impl ShapeTemplate {
    /// Look up a palette entry by its label.
    #[must_use]
    pub fn by_label(label: &str) -> Option<&'static ShapeTemplate> {
        TEMPLATES.iter().find(|t| t.label == label)
    }

    /// Layout update that turns a bare table record into this template,
    /// placed at the canvas center.
    #[must_use]
    pub fn layout(&self) -> TableLayoutUpdate {
        TableLayoutUpdate {
            name: None,
            x_position: Some(CANVAS_WIDTH * 0.5),
            y_position: Some(CANVAS_HEIGHT * 0.5),
            shape: Some(self.shape),
            width: Some(self.width),
            height: Some(self.height),
            seat_count: Some(self.seat_count),
        }
    }
}

/// Table templates offered by the "add table" palette.
pub const TEMPLATES: [ShapeTemplate; 7] = [
    ShapeTemplate { label: "Square 4", shape: Shape::Rectangle, width: 80.0, height: 80.0, seat_count: 4 },
    ShapeTemplate { label: "Rectangle 6", shape: Shape::Rectangle, width: 140.0, height: 80.0, seat_count: 6 },
    ShapeTemplate { label: "Round 4", shape: Shape::Circle, width: 80.0, height: 80.0, seat_count: 4 },
    ShapeTemplate { label: "Round 6", shape: Shape::Circle, width: 100.0, height: 100.0, seat_count: 6 },
    ShapeTemplate { label: "Oval 8", shape: Shape::Oval, width: 160.0, height: 100.0, seat_count: 8 },
    ShapeTemplate { label: "Booth 4", shape: Shape::Booth, width: 120.0, height: 80.0, seat_count: 4 },
    ShapeTemplate { label: "Bar 6", shape: Shape::Bar, width: 200.0, height: 50.0, seat_count: 6 },
];

/// In-memory store of floors and tables for one tenant.
///
/// Floors keep the order the service returned them in. Tables are keyed by id,
/// which doubles as draw order.
pub struct DocStore {
    floors: Vec<Floor>,
    tables: BTreeMap<TableId, Table>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { floors: Vec::new(), tables: BTreeMap::new() }
    }

    /// Replace everything with a full snapshot.
    pub fn load_snapshot(&mut self, floors: Vec<Floor>, tables: Vec<Table>) {
        self.floors = floors;
        self.tables = tables.into_iter().map(|t| (t.id, t)).collect();
    }

    /// Drop all floors and tables.
    pub fn clear(&mut self) {
        self.floors.clear();
        self.tables.clear();
    }

    // --- Floors ---

    #[must_use]
    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    #[must_use]
    pub fn floor(&self, id: FloorId) -> Option<&Floor> {
        self.floors.iter().find(|f| f.id == id)
    }

    /// Append a floor, replacing any existing floor with the same id in place.
    pub fn push_floor(&mut self, floor: Floor) {
        if let Some(existing) = self.floors.iter_mut().find(|f| f.id == floor.id) {
            *existing = floor;
        } else {
            self.floors.push(floor);
        }
    }

    /// Rename a floor. Returns false if the floor doesn't exist.
    pub fn rename_floor(&mut self, id: FloorId, name: &str) -> bool {
        let Some(floor) = self.floors.iter_mut().find(|f| f.id == id) else {
            return false;
        };
        name.clone_into(&mut floor.name);
        true
    }

    /// Remove a floor, returning it if it was present. Tables are left untouched.
    pub fn remove_floor(&mut self, id: FloorId) -> Option<Floor> {
        let idx = self.floors.iter().position(|f| f.id == id)?;
        Some(self.floors.remove(idx))
    }

    // --- Tables ---

    /// Insert or replace a table.
    pub fn insert_table(&mut self, table: Table) {
        self.tables.insert(table.id, table);
    }

    /// Remove a table by id, returning it if it was present.
    pub fn remove_table(&mut self, id: TableId) -> Option<Table> {
        self.tables.remove(&id)
    }

    #[must_use]
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }

    /// Move a table's center. Returns false if the table doesn't exist.
    pub fn set_position(&mut self, id: TableId, x: f64, y: f64) -> bool {
        let Some(table) = self.tables.get_mut(&id) else {
            return false;
        };
        table.x_position = x;
        table.y_position = y;
        true
    }

    /// Apply a sparse update to an existing table. Returns false if the table doesn't exist.
    pub fn apply_update(&mut self, id: TableId, update: &TableLayoutUpdate) -> bool {
        let Some(table) = self.tables.get_mut(&id) else {
            return false;
        };
        if let Some(ref name) = update.name {
            table.name.clone_from(name);
        }
        if let Some(x) = update.x_position {
            table.x_position = x;
        }
        if let Some(y) = update.y_position {
            table.y_position = y;
        }
        if let Some(shape) = update.shape {
            table.shape = shape;
        }
        if let Some(w) = update.width {
            table.width = w;
        }
        if let Some(h) = update.height {
            table.height = h;
        }
        if let Some(seats) = update.seat_count {
            table.seat_count = seats.max(1);
        }
        true
    }

    /// Tables shown for `floor`, in draw order.
    ///
    /// With a floor selected only its tables match. With no floor selected only
    /// unassigned tables match.
    #[must_use]
    pub fn tables_on(&self, floor: Option<FloorId>) -> Vec<&Table> {
        self.tables
            .values()
            .filter(|t| t.floor_id == floor)
            .collect()
    }

    /// Tables without a floor, in id order.
    #[must_use]
    pub fn unassigned_tables(&self) -> Vec<&Table> {
        self.tables_on(None)
    }

    /// All tables, in id order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Number of tables currently in the store.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if the store holds no floors and no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.floors.is_empty() && self.tables.is_empty()
    }
}

impl Default for DocStore {
    fn default() -> Self {
        Self::new()
    }
}
