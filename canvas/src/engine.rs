use std::collections::BTreeMap;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Point, Rect, Surface, Viewport};
use crate::consts::{
    CANVAS_HEIGHT, CANVAS_WIDTH, CLICK_SLOP_PX, EDGE_MARGIN, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT, ZOOM_IN_STEP,
    ZOOM_OUT_STEP,
};
use crate::doc::{DocStore, Floor, FloorId, Table, TableId, TableLayoutUpdate};
use crate::hit;
use crate::input::{InputEvent, InteractionSession, UiState, WheelDelta, pinch_distance};
use crate::render;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A table's center changed locally. Not persisted until the layout is saved.
    TableMoved { id: TableId, x: f64, y: f64 },
    /// A table was clicked; the host opens its properties panel.
    TableSelected(TableId),
    /// Empty canvas was clicked; the host closes the properties panel.
    SelectionCleared,
    /// Zoom or pan changed.
    ViewChanged,
    /// The host should switch to the table list view.
    NavigateToList,
    SetCursor(&'static str),
    RenderNeeded,
}

/// Clamp a table center so the table can never leave the canvas.
#[must_use]
pub fn clamp_to_canvas(p: Point) -> Point {
    Point::new(
        p.x.clamp(EDGE_MARGIN, CANVAS_WIDTH - EDGE_MARGIN),
        p.y.clamp(EDGE_MARGIN, CANVAS_HEIGHT - EDGE_MARGIN),
    )
}

/// Table positions captured for a bulk save, tagged with the edit
/// generation they reflect.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSnapshot {
    pub floor_id: FloorId,
    pub positions: Vec<(TableId, f64, f64)>,
    pub generation: u64,
}

impl PositionSnapshot {
    /// IDs of the tables the snapshot covers.
    #[must_use]
    pub fn table_ids(&self) -> Vec<TableId> {
        self.positions.iter().map(|&(id, _, _)| id).collect()
    }
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub doc: DocStore,
    pub viewport: Viewport,
    pub ui: UiState,
    pub session: InteractionSession,
    pub surface: Surface,
    /// Bumped on every local position change.
    edit_generation: u64,
    /// Tables moved locally and not yet persisted, with the generation of
    /// their latest move.
    dirty: BTreeMap<TableId, u64>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: DocStore::new(),
            viewport: Viewport::default(),
            ui: UiState::default(),
            session: InteractionSession::default(),
            surface: Surface::default(),
            edit_generation: 0,
            dirty: BTreeMap::new(),
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Hydrate from a full service snapshot.
    ///
    /// Keeps the selected floor if it still exists, otherwise selects the
    /// first floor. Local edits are discarded.
    pub fn load_snapshot(&mut self, floors: Vec<Floor>, tables: Vec<Table>) {
        self.doc.load_snapshot(floors, tables);
        let keep = self
            .ui
            .selected_floor
            .is_some_and(|id| self.doc.floor(id).is_some());
        if !keep {
            self.ui.selected_floor = self.doc.floors().first().map(|f| f.id);
        }
        self.ui.selected_table = None;
        self.session = InteractionSession::Idle;
        self.dirty.clear();
    }

    /// Drop every floor and table, as after a failed load.
    pub fn clear(&mut self) {
        self.doc.clear();
        self.ui = UiState::default();
        self.session = InteractionSession::Idle;
        self.dirty.clear();
    }

    /// A floor was created; it becomes the selected floor.
    pub fn apply_floor_created(&mut self, floor: Floor) {
        let id = floor.id;
        self.doc.push_floor(floor);
        self.select_floor(Some(id));
    }

    pub fn apply_floor_renamed(&mut self, id: FloorId, name: &str) {
        self.doc.rename_floor(id, name);
    }

    /// A floor was deleted. If it was selected, the first remaining floor
    /// (or none) is selected instead.
    pub fn apply_floor_deleted(&mut self, id: FloorId) {
        self.doc.remove_floor(id);
        if self.ui.selected_floor == Some(id) {
            let next = self.doc.floors().first().map(|f| f.id);
            self.select_floor(next);
        }
    }

    /// A table was created on the service.
    pub fn apply_table_created(&mut self, table: Table) {
        self.doc.insert_table(table);
    }

    /// Merge a sparse update into a table.
    pub fn apply_table_update(&mut self, id: TableId, update: &TableLayoutUpdate) {
        self.doc.apply_update(id, update);
    }

    /// A table was deleted on the service.
    pub fn apply_table_deleted(&mut self, id: TableId) {
        self.doc.remove_table(id);
        self.dirty.remove(&id);
        if self.ui.selected_table == Some(id) {
            self.ui.selected_table = None;
        }
        let interrupted = match self.session {
            InteractionSession::DraggingTable { table_id, .. } => table_id == id,
            InteractionSession::Pinching { resume, .. } => resume == Some(id),
            _ => false,
        };
        if interrupted {
            self.session = InteractionSession::Idle;
        }
    }

    // --- Selection ---

    /// Show a different floor. Closes the properties panel and ends any gesture.
    pub fn select_floor(&mut self, id: Option<FloorId>) {
        self.ui.selected_floor = id;
        self.ui.selected_table = None;
        self.session = InteractionSession::Idle;
    }

    /// Close the properties panel.
    pub fn close_properties(&mut self) -> Vec<Action> {
        if self.ui.selected_table.take().is_some() {
            vec![Action::SelectionCleared, Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    // --- View controls ---

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.zoom_by(ZOOM_IN_STEP)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.zoom_by(ZOOM_OUT_STEP)
    }

    pub fn zoom_by(&mut self, factor: f64) -> Vec<Action> {
        let before = self.viewport.zoom;
        self.viewport.zoom_by(factor);
        if (self.viewport.zoom - before).abs() < f64::EPSILON {
            return Vec::new();
        }
        vec![Action::ViewChanged, Action::RenderNeeded]
    }

    pub fn reset_view(&mut self) -> Vec<Action> {
        self.viewport.reset();
        vec![Action::ViewChanged, Action::RenderNeeded]
    }

    /// Leave the canvas for the table list view.
    #[must_use]
    pub fn navigate_to_list(&self) -> Vec<Action> {
        vec![Action::NavigateToList]
    }

    // --- Input ---

    /// Feed one input event through the interaction session.
    pub fn handle(&mut self, event: InputEvent) -> Vec<Action> {
        match event {
            InputEvent::PointerDown { screen } => self.press(screen),
            InputEvent::PointerMove { screen } => self.move_to(screen),
            InputEvent::PointerUp { .. } | InputEvent::TouchCancel => self.release(),
            InputEvent::TouchStart { touches } => match touches.as_slice() {
                [] => Vec::new(),
                [single] => {
                    if self.session.is_idle() {
                        self.press(*single)
                    } else {
                        self.resume_single(*single)
                    }
                }
                _ => self.begin_pinch(&touches),
            },
            InputEvent::TouchMove { touches } => match touches.as_slice() {
                [] => Vec::new(),
                [single] => {
                    let mut actions = if matches!(self.session, InteractionSession::Pinching { .. }) {
                        self.resume_single(*single)
                    } else {
                        Vec::new()
                    };
                    actions.extend(self.move_to(*single));
                    actions
                }
                _ => {
                    if matches!(self.session, InteractionSession::Pinching { .. }) {
                        self.pinch_to(&touches)
                    } else {
                        self.begin_pinch(&touches)
                    }
                }
            },
            InputEvent::TouchEnd { touches } => match touches.as_slice() {
                [] => self.release(),
                [single] => self.resume_single(*single),
                _ => self.begin_pinch(&touches),
            },
            InputEvent::Wheel { delta, .. } => self.wheel(delta),
        }
    }

    fn logical(&self, screen: Point) -> Point {
        self.viewport.screen_to_logical(screen, self.surface)
    }

    fn press(&mut self, screen: Point) -> Vec<Action> {
        let logical = self.logical(screen);
        let hit = hit::hit_table(logical, &self.doc, self.ui.selected_floor).and_then(|id| self.doc.table(id));
        if let Some(table) = hit {
            let offset = Point::new(logical.x - table.x_position, logical.y - table.y_position);
            self.session = InteractionSession::DraggingTable { table_id: table.id, offset, origin: screen, moved: false };
            vec![Action::SetCursor("grabbing")]
        } else {
            self.session = InteractionSession::Panning { last_screen: screen, origin: screen, moved: false };
            vec![Action::SetCursor("move")]
        }
    }

    fn move_to(&mut self, screen: Point) -> Vec<Action> {
        match self.session {
            InteractionSession::Idle | InteractionSession::Pinching { .. } => Vec::new(),
            InteractionSession::Panning { last_screen, origin, moved } => {
                if !moved && screen.distance(origin) <= CLICK_SLOP_PX {
                    return Vec::new();
                }
                self.viewport
                    .pan_by_screen(screen.x - last_screen.x, screen.y - last_screen.y);
                self.session = InteractionSession::Panning { last_screen: screen, origin, moved: true };
                vec![Action::ViewChanged, Action::RenderNeeded]
            }
            InteractionSession::DraggingTable { table_id, offset, origin, moved } => {
                if !moved && screen.distance(origin) <= CLICK_SLOP_PX {
                    return Vec::new();
                }
                let logical = self.logical(screen);
                let target = clamp_to_canvas(Point::new(logical.x - offset.x, logical.y - offset.y));
                if !self.doc.set_position(table_id, target.x, target.y) {
                    self.session = InteractionSession::Idle;
                    return Vec::new();
                }
                self.edit_generation += 1;
                self.dirty.insert(table_id, self.edit_generation);
                self.session = InteractionSession::DraggingTable { table_id, offset, origin, moved: true };
                vec![Action::TableMoved { id: table_id, x: target.x, y: target.y }, Action::RenderNeeded]
            }
        }
    }

    fn release(&mut self) -> Vec<Action> {
        let session = std::mem::take(&mut self.session);
        match session {
            InteractionSession::DraggingTable { table_id, moved: false, .. } => {
                self.ui.selected_table = Some(table_id);
                vec![Action::TableSelected(table_id), Action::SetCursor("default"), Action::RenderNeeded]
            }
            InteractionSession::Panning { moved: false, .. } => {
                let mut actions = self.close_properties();
                actions.push(Action::SetCursor("default"));
                actions
            }
            InteractionSession::DraggingTable { .. } | InteractionSession::Panning { .. } => {
                vec![Action::SetCursor("default")]
            }
            InteractionSession::Pinching { .. } | InteractionSession::Idle => Vec::new(),
        }
    }

    fn begin_pinch(&mut self, touches: &[Point]) -> Vec<Action> {
        let Some(distance) = pinch_distance(touches) else {
            return Vec::new();
        };
        let resume = match self.session {
            InteractionSession::DraggingTable { table_id, .. } => Some(table_id),
            InteractionSession::Pinching { resume, .. } => resume,
            _ => None,
        };
        self.session = InteractionSession::Pinching { last_distance: distance, resume };
        Vec::new()
    }

    fn pinch_to(&mut self, touches: &[Point]) -> Vec<Action> {
        let (InteractionSession::Pinching { last_distance, resume }, Some(distance)) =
            (self.session, pinch_distance(touches))
        else {
            return Vec::new();
        };
        self.session = InteractionSession::Pinching { last_distance: distance, resume };
        if last_distance <= 0.0 || distance <= 0.0 {
            return Vec::new();
        }
        self.zoom_by(distance / last_distance)
    }

    /// Back to a single touch after a pinch: resume the suspended drag, or pan.
    ///
    /// The gesture already moved, so lifting this finger is never a click.
    fn resume_single(&mut self, screen: Point) -> Vec<Action> {
        let InteractionSession::Pinching { resume, .. } = self.session else {
            return Vec::new();
        };
        let logical = self.logical(screen);
        self.session = match resume.and_then(|id| self.doc.table(id)) {
            Some(table) => InteractionSession::DraggingTable {
                table_id: table.id,
                offset: Point::new(logical.x - table.x_position, logical.y - table.y_position),
                origin: screen,
                moved: true,
            },
            None => InteractionSession::Panning { last_screen: screen, origin: screen, moved: true },
        };
        Vec::new()
    }

    fn wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        if delta.dy < 0.0 {
            self.zoom_by(WHEEL_ZOOM_IN)
        } else if delta.dy > 0.0 {
            self.zoom_by(WHEEL_ZOOM_OUT)
        } else {
            Vec::new()
        }
    }

    // --- Persistence bookkeeping ---

    /// Whether any table moved since the last confirmed save.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Whether `id` moved since its position was last persisted.
    #[must_use]
    pub fn is_unsaved(&self, id: TableId) -> bool {
        self.dirty.contains_key(&id)
    }

    /// Capture the current positions of every table on `floor_id`.
    #[must_use]
    pub fn snapshot_positions(&self, floor_id: FloorId) -> PositionSnapshot {
        PositionSnapshot {
            floor_id,
            positions: self
                .doc
                .tables_on(Some(floor_id))
                .iter()
                .map(|t| (t.id, t.x_position, t.y_position))
                .collect(),
            generation: self.edit_generation,
        }
    }

    /// Record that the positions of `ids` captured at `generation` are persisted.
    ///
    /// Tables outside `ids`, and tables moved after the snapshot, stay dirty.
    pub fn mark_saved<I>(&mut self, ids: I, generation: u64)
    where
        I: IntoIterator<Item = TableId>,
    {
        for id in ids {
            if self.dirty.get(&id).is_some_and(|&moved| moved <= generation) {
                self.dirty.remove(&id);
            }
        }
    }

    // --- Queries ---

    /// Tables on the selected floor, in draw order.
    #[must_use]
    pub fn visible_tables(&self) -> Vec<&Table> {
        self.doc.tables_on(self.ui.selected_floor)
    }

    #[must_use]
    pub fn selected_floor(&self) -> Option<&Floor> {
        self.ui.selected_floor.and_then(|id| self.doc.floor(id))
    }

    /// The table whose properties panel is open, if any.
    #[must_use]
    pub fn selected_table(&self) -> Option<&Table> {
        self.ui.selected_table.and_then(|id| self.doc.table(id))
    }

    /// Whether the canvas shows the "add a floor" prompt instead of tables.
    #[must_use]
    pub fn shows_empty_state(&self) -> bool {
        self.selected_floor().is_none()
    }

    #[must_use]
    pub fn visible_region(&self) -> Rect {
        self.viewport.visible_region()
    }

    /// Look up a table by ID.
    #[must_use]
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.doc.table(id)
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    dpr: f64,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, dpr: 1.0, core: EngineCore::new() }
    }

    /// Update the surface size (CSS pixels) and device pixel ratio, resizing
    /// the backing store to match.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_surface(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        let width = width_css.max(1.0);
        let height = height_css.max(1.0);
        self.dpr = dpr;
        self.core.surface = Surface { width, height };
        self.canvas.set_width((width * dpr).round() as u32);
        self.canvas.set_height((height * dpr).round() as u32);
    }

    pub fn handle(&mut self, event: InputEvent) -> Vec<Action> {
        self.core.handle(event)
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.core.zoom_in()
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.core.zoom_out()
    }

    pub fn reset_view(&mut self) -> Vec<Action> {
        self.core.reset_view()
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let Some(ctx) = self.canvas.get_context("2d")? else {
            return Err(JsValue::from_str("2d context unavailable"));
        };
        let ctx = ctx.dyn_into::<CanvasRenderingContext2d>()?;
        render::draw(&ctx, &self.core, self.dpr)
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.core.has_unsaved_changes()
    }
}
