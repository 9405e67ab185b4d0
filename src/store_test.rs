use std::collections::HashSet;
use std::sync::Mutex;

use canvas::doc::{Shape, Table};
use canvas::input::InputEvent;
use canvas::camera::Point;

use super::*;

// =========================================================================
// MockService
// =========================================================================

#[derive(Default)]
struct MockState {
    floors: Vec<Floor>,
    tables: Vec<Table>,
    next_id: i64,
    /// Operation names that fail with a 500.
    failing: HashSet<&'static str>,
    /// Table ids whose layout updates fail.
    failing_tables: HashSet<TableId>,
    calls: Vec<String>,
    updates: Vec<(TableId, TableLayoutUpdate)>,
}

#[derive(Default)]
struct MockService {
    state: Mutex<MockState>,
}

impl MockService {
    fn with(floors: Vec<Floor>, tables: Vec<Table>) -> Self {
        let state = MockState { floors, tables, next_id: 100, ..Default::default() };
        Self { state: Mutex::new(state) }
    }

    fn fail(&self, op: &'static str) {
        self.state.lock().unwrap().failing.insert(op);
    }

    fn heal(&self, op: &'static str) {
        self.state.lock().unwrap().failing.remove(op);
    }

    fn fail_table(&self, id: TableId) {
        self.state.lock().unwrap().failing_tables.insert(id);
    }

    fn heal_tables(&self) {
        self.state.lock().unwrap().failing_tables.clear();
    }

    fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn count(&self, op: &str) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| c.as_str() == op).count()
    }

    fn updates(&self) -> Vec<(TableId, TableLayoutUpdate)> {
        self.state.lock().unwrap().updates.clone()
    }

    /// Record the call and return the injected failure, if any.
    fn enter(&self, op: &'static str) -> Result<std::sync::MutexGuard<'_, MockState>, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(op.to_owned());
        if state.failing.contains(op) {
            return Err(ServiceError::Response { status: 500, message: format!("{op} unavailable") });
        }
        Ok(state)
    }
}

fn bare_table(id: TableId, name: &str, floor_id: Option<FloorId>) -> Table {
    Table {
        id,
        name: name.to_owned(),
        floor_id,
        x_position: 600.0,
        y_position: 400.0,
        shape: Shape::Rectangle,
        width: 120.0,
        height: 80.0,
        seat_count: 4,
        status: TableStatus::Available,
        token: None,
    }
}

#[async_trait::async_trait]
impl FloorService for MockService {
    async fn list_floors(&self, _tenant: TenantId) -> Result<Vec<Floor>, ServiceError> {
        let state = self.enter("list_floors")?;
        Ok(state.floors.clone())
    }

    async fn create_floor(&self, name: &str) -> Result<Floor, ServiceError> {
        let mut state = self.enter("create_floor")?;
        state.next_id += 1;
        let floor = Floor { id: state.next_id, name: name.to_owned() };
        state.floors.push(floor.clone());
        Ok(floor)
    }

    async fn rename_floor(&self, id: FloorId, name: &str) -> Result<Floor, ServiceError> {
        let mut state = self.enter("rename_floor")?;
        let floor = state
            .floors
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(ServiceError::Response { status: 404, message: "Floor not found".into() })?;
        floor.name = name.to_owned();
        Ok(floor.clone())
    }

    async fn delete_floor(&self, id: FloorId) -> Result<(), ServiceError> {
        let mut state = self.enter("delete_floor")?;
        state.floors.retain(|f| f.id != id);
        for t in state.tables.iter_mut().filter(|t| t.floor_id == Some(id)) {
            t.floor_id = None;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TableService for MockService {
    async fn list_tables_with_status(&self, _tenant: TenantId) -> Result<Vec<Table>, ServiceError> {
        let state = self.enter("list_tables_with_status")?;
        Ok(state.tables.clone())
    }

    async fn create_table(&self, name: &str, floor_id: FloorId) -> Result<Table, ServiceError> {
        let mut state = self.enter("create_table")?;
        state.next_id += 1;
        let table = bare_table(state.next_id, name, Some(floor_id));
        state.tables.push(table.clone());
        Ok(table)
    }

    async fn update_table_layout(&self, id: TableId, update: &TableLayoutUpdate) -> Result<Table, ServiceError> {
        let mut state = self.enter("update_table_layout")?;
        state.updates.push((id, update.clone()));
        if state.failing_tables.contains(&id) {
            return Err(ServiceError::Request(format!("table {id} timed out")));
        }
        let table = state
            .tables
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ServiceError::Response { status: 404, message: "Table not found".into() })?;
        if let Some(name) = &update.name {
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
        if let Some(n) = update.seat_count {
            table.seat_count = n;
        }
        Ok(table.clone())
    }

    async fn delete_table(&self, id: TableId) -> Result<(), ServiceError> {
        let mut state = self.enter("delete_table")?;
        state.tables.retain(|t| t.id != id);
        Ok(())
    }
}

// =========================================================================
// Helpers
// =========================================================================

fn main_floor() -> Floor {
    Floor { id: 1, name: "Main Floor".into() }
}

async fn loaded(service: MockService) -> FloorPlanStore<MockService> {
    let mut store = FloorPlanStore::new(service, 7);
    store.load_floors_and_tables().await.unwrap();
    store
}

async fn store_with_tables() -> FloorPlanStore<MockService> {
    let mut a = bare_table(10, "Table 1", Some(1));
    a.x_position = 200.0;
    a.y_position = 200.0;
    let mut b = bare_table(11, "Table 2", Some(1));
    b.x_position = 500.0;
    b.y_position = 300.0;
    let c = bare_table(12, "Table 3", Some(2));
    loaded(MockService::with(vec![main_floor(), Floor { id: 2, name: "Patio".into() }], vec![a, b, c])).await
}

fn drag(store: &mut FloorPlanStore<MockService>, from: (f64, f64), to: (f64, f64)) {
    let engine = store.engine_mut();
    engine.handle(InputEvent::PointerDown { screen: Point::new(from.0, from.1) });
    engine.handle(InputEvent::PointerMove { screen: Point::new(to.0, to.1) });
    engine.handle(InputEvent::PointerUp { screen: Point::new(to.0, to.1) });
}

fn inline_message(store: &FloorPlanStore<MockService>) -> Option<String> {
    store
        .notice()
        .filter(|n| n.kind == NoticeKind::Inline)
        .map(|n| n.message.clone())
}

// =========================================================================
// Load
// =========================================================================

#[tokio::test]
async fn load_selects_first_floor() {
    let store = store_with_tables().await;
    assert_eq!(store.tenant_id(), 7);
    assert_eq!(store.engine().ui.selected_floor, Some(1));
    assert_eq!(store.engine().visible_tables().len(), 2);
    assert!(store.notice().is_none());
}

#[tokio::test]
async fn load_failure_clears_and_raises_banner() {
    let mut store = store_with_tables().await;
    store.service().fail("list_tables_with_status");

    let err = store.load_floors_and_tables().await.unwrap_err();
    assert!(matches!(err, ServiceError::Response { status: 500, .. }));
    assert!(store.engine().doc.is_empty());
    assert!(store.engine().shows_empty_state());
    let notice = store.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Banner);
    assert_eq!(notice.message, "list_tables_with_status unavailable");
}

#[tokio::test]
async fn load_success_clears_banner() {
    let mut store = store_with_tables().await;
    store.service().fail("list_floors");
    store.load_floors_and_tables().await.unwrap_err();
    store.service().heal("list_floors");

    store.load_floors_and_tables().await.unwrap();
    assert!(store.notice().is_none());
    assert_eq!(store.engine().doc.floors().len(), 2);
}

#[tokio::test]
async fn load_without_floors_shows_empty_state() {
    let store = loaded(MockService::with(vec![], vec![])).await;
    assert!(store.engine().shows_empty_state());
}

// =========================================================================
// Floors
// =========================================================================

#[tokio::test]
async fn create_floor_names_by_count_and_selects() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;

    let id = store.create_floor().await.unwrap();
    assert_eq!(store.engine().ui.selected_floor, Some(id));
    assert_eq!(store.engine().selected_floor().unwrap().name, "Floor 2");
    assert_eq!(store.engine().doc.floors().len(), 2);
}

#[tokio::test]
async fn create_floor_failure_changes_nothing() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    store.service().fail("create_floor");

    let err = store.create_floor().await.unwrap_err();
    assert!(err.retryable());
    assert_eq!(store.engine().doc.floors().len(), 1);
    assert_eq!(store.engine().ui.selected_floor, Some(1));
    assert_eq!(inline_message(&store).as_deref(), Some("create_floor unavailable"));
}

#[tokio::test]
async fn rename_to_same_name_makes_no_call() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    assert!(store.begin_rename_floor(1));

    store.rename_floor(1, "Main Floor").await.unwrap();
    assert_eq!(store.service().count("rename_floor"), 0);
    assert_eq!(store.engine().doc.floor(1).unwrap().name, "Main Floor");
    assert_eq!(store.renaming(), None);
}

#[tokio::test]
async fn rename_blank_is_ignored() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    store.begin_rename_floor(1);
    store.rename_floor(1, "   ").await.unwrap();
    assert_eq!(store.service().count("rename_floor"), 0);
    assert_eq!(store.engine().doc.floor(1).unwrap().name, "Main Floor");
}

#[tokio::test]
async fn rename_success_updates_and_closes_editor() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    store.begin_rename_floor(1);

    store.rename_floor(1, "  Dining Room ").await.unwrap();
    assert_eq!(store.engine().doc.floor(1).unwrap().name, "Dining Room");
    assert_eq!(store.renaming(), None);
}

#[tokio::test]
async fn rename_failure_keeps_editor_open() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    store.service().fail("rename_floor");
    store.begin_rename_floor(1);

    store.rename_floor(1, "Dining Room").await.unwrap_err();
    assert_eq!(store.engine().doc.floor(1).unwrap().name, "Main Floor");
    assert_eq!(store.renaming(), Some(1));
    assert!(inline_message(&store).is_some());
}

#[tokio::test]
async fn rename_unknown_floor_is_not_found() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    assert!(!store.begin_rename_floor(9));
    let err = store.rename_floor(9, "Ghost").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { kind: "floor", id: 9 }));
    assert!(inline_message(&store).is_some());
    assert_eq!(store.service().count("rename_floor"), 0);
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    assert!(store.request_delete_floor(1));
    assert_eq!(store.pending_delete(), Some(PendingDelete::Floor(1)));
    store.cancel_delete();

    store.confirm_delete().await.unwrap();
    assert_eq!(store.service().count("delete_floor"), 0);
    assert_eq!(store.engine().doc.floors().len(), 1);
}

#[tokio::test]
async fn deleting_only_floor_leaves_empty_state() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    store.request_delete_floor(1);

    store.confirm_delete().await.unwrap();
    assert_eq!(store.engine().ui.selected_floor, None);
    assert!(store.engine().shows_empty_state());
    assert_eq!(store.pending_delete(), None);
}

#[tokio::test]
async fn deleting_selected_floor_selects_first_remaining() {
    let mut store = store_with_tables().await;
    store.select_floor(Some(2));
    store.request_delete_floor(2);

    store.confirm_delete().await.unwrap();
    assert_eq!(store.engine().ui.selected_floor, Some(1));
    // Local copies keep the stale floor id until the next load.
    assert_eq!(store.engine().table(12).unwrap().floor_id, Some(2));

    store.load_floors_and_tables().await.unwrap();
    assert_eq!(store.engine().table(12).unwrap().floor_id, None);
    assert_eq!(store.engine().doc.unassigned_tables().len(), 1);
}

#[tokio::test]
async fn failed_delete_stays_pending() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    store.service().fail("delete_floor");
    store.request_delete_floor(1);

    store.confirm_delete().await.unwrap_err();
    assert_eq!(store.pending_delete(), Some(PendingDelete::Floor(1)));
    assert_eq!(store.engine().doc.floors().len(), 1);

    store.service().heal("delete_floor");
    store.confirm_delete().await.unwrap();
    assert!(store.engine().doc.floors().is_empty());
    assert!(inline_message(&store).is_none());
}

// =========================================================================
// Tables
// =========================================================================

#[tokio::test]
async fn round_six_round_trip() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    let tpl = ShapeTemplate::by_label("Round 6").unwrap();

    let id = store.create_table(tpl, 1).await.unwrap();
    let table = store.engine().table(id).unwrap();
    assert_eq!(table.name, "Table 1");
    assert_eq!(table.shape, Shape::Circle);
    assert_eq!((table.width, table.height), (100.0, 100.0));
    assert_eq!(table.seat_count, 6);
    assert_eq!((table.x_position, table.y_position), (600.0, 400.0));
    assert_eq!(table.status, TableStatus::Available);
    assert_eq!(store.service().calls(), vec!["list_floors", "list_tables_with_status", "create_table", "update_table_layout"]);

    drag(&mut store, (600.0, 400.0), (40.0, 40.0));
    let table = store.engine().table(id).unwrap();
    assert_eq!((table.x_position, table.y_position), (50.0, 50.0));
    assert!(store.has_unsaved_changes());
}

#[tokio::test]
async fn every_template_round_trips() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    for tpl in &canvas::doc::TEMPLATES {
        let id = store.create_table(tpl, 1).await.unwrap();
        let t = store.engine().table(id).unwrap();
        assert_eq!((t.shape, t.width, t.height, t.seat_count), (tpl.shape, tpl.width, tpl.height, tpl.seat_count));
    }

    // A fresh load reads back the same geometry from the service.
    let before: Vec<Table> = store.engine().doc.tables().cloned().collect();
    store.load_floors_and_tables().await.unwrap();
    let after: Vec<Table> = store.engine().doc.tables().cloned().collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn table_names_count_whole_tenant() {
    let mut store = store_with_tables().await;
    let tpl = ShapeTemplate::by_label("Square 4").unwrap();
    let id = store.create_table(tpl, 2).await.unwrap();
    assert_eq!(store.engine().table(id).unwrap().name, "Table 4");
}

#[tokio::test]
async fn create_table_layout_failure_adds_nothing() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    store.service().fail("update_table_layout");
    let tpl = ShapeTemplate::by_label("Bar 6").unwrap();

    store.create_table(tpl, 1).await.unwrap_err();
    assert_eq!(store.engine().doc.table_count(), 0);
    assert_eq!(store.service().count("create_table"), 1);
    assert!(inline_message(&store).is_some());
}

#[tokio::test]
async fn create_table_on_unknown_floor_is_rejected() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    let tpl = ShapeTemplate::by_label("Bar 6").unwrap();
    let err = store.create_table(tpl, 5).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { kind: "floor", id: 5 }));
    assert!(inline_message(&store).is_some());
    assert!(store.service().calls().iter().all(|c| c != "create_table"));
}

#[tokio::test]
async fn properties_update_merges_only_sent_fields() {
    let mut store = store_with_tables().await;
    drag(&mut store, (200.0, 200.0), (260.0, 220.0));

    store.update_table_properties(10, Some("Window"), Some(0)).await.unwrap();
    let (id, sent) = store.service().updates().pop().unwrap();
    assert_eq!(id, 10);
    assert_eq!(sent, TableLayoutUpdate { name: Some("Window".into()), seat_count: Some(1), ..Default::default() });

    let t = store.engine().table(10).unwrap();
    assert_eq!(t.name, "Window");
    assert_eq!(t.seat_count, 1);
    assert_eq!((t.x_position, t.y_position), (260.0, 220.0));
    assert!(store.has_unsaved_changes());
}

#[tokio::test]
async fn empty_properties_update_makes_no_call() {
    let mut store = store_with_tables().await;
    store.update_table_properties(10, Some("  "), None).await.unwrap();
    assert_eq!(store.service().count("update_table_layout"), 0);
}

#[tokio::test]
async fn properties_update_on_unknown_table_raises_notice() {
    let mut store = store_with_tables().await;
    let err = store.update_table_properties(99, Some("Ghost"), None).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { kind: "table", id: 99 }));
    assert!(inline_message(&store).is_some());
    assert_eq!(store.service().count("update_table_layout"), 0);
}

#[tokio::test]
async fn properties_failure_keeps_local_state() {
    let mut store = store_with_tables().await;
    store.service().fail("update_table_layout");
    store.update_table_properties(10, Some("Window"), None).await.unwrap_err();
    assert_eq!(store.engine().table(10).unwrap().name, "Table 1");
}

#[tokio::test]
async fn deleting_selected_table_clears_selection() {
    let mut store = store_with_tables().await;
    drag(&mut store, (200.0, 200.0), (200.0, 200.0));
    assert_eq!(store.engine().ui.selected_table, Some(10));

    assert!(store.request_delete_table(10));
    store.confirm_delete().await.unwrap();
    assert!(store.engine().table(10).is_none());
    assert_eq!(store.engine().ui.selected_table, None);
}

#[tokio::test]
async fn request_delete_unknown_table_is_refused() {
    let mut store = store_with_tables().await;
    assert!(!store.request_delete_table(99));
    assert_eq!(store.pending_delete(), None);
}

// =========================================================================
// Bulk save
// =========================================================================

#[tokio::test]
async fn save_sends_every_table_on_floor() {
    let mut store = store_with_tables().await;
    drag(&mut store, (200.0, 200.0), (250.0, 260.0));

    store.save_all_positions(1).await.unwrap();
    let mut updates = store.service().updates();
    updates.sort_by_key(|(id, _)| *id);
    assert_eq!(
        updates,
        vec![(10, TableLayoutUpdate::position(250.0, 260.0)), (11, TableLayoutUpdate::position(500.0, 300.0))]
    );
    assert!(!store.has_unsaved_changes());
}

#[tokio::test]
async fn partial_save_failure_keeps_flag_and_retry_resends_all() {
    let mut store = store_with_tables().await;
    drag(&mut store, (200.0, 200.0), (250.0, 260.0));
    store.service().fail_table(11);

    let err = store.save_all_positions(1).await.unwrap_err();
    assert!(matches!(err, ServiceError::Request(_)));
    assert!(store.has_unsaved_changes());
    assert!(inline_message(&store).is_some());

    store.service().heal_tables();
    store.save_all_positions(1).await.unwrap();
    assert_eq!(store.service().count("update_table_layout"), 4);
    assert!(!store.has_unsaved_changes());
    assert!(inline_message(&store).is_none());
}

#[tokio::test]
async fn drag_during_save_stays_dirty() {
    let mut store = store_with_tables().await;
    drag(&mut store, (200.0, 200.0), (250.0, 260.0));

    let snapshot = store.begin_save(1);
    drag(&mut store, (250.0, 260.0), (300.0, 300.0));
    let report = send_positions(store.service(), &snapshot).await;
    assert_eq!(report.saved, 2);
    store.complete_save(report).unwrap();

    assert!(store.has_unsaved_changes());
    store.save_all_positions(1).await.unwrap();
    assert!(!store.has_unsaved_changes());
}

#[tokio::test]
async fn saving_other_floor_keeps_unsent_moves_dirty() {
    let mut store = store_with_tables().await;
    store.select_floor(Some(2));
    drag(&mut store, (600.0, 400.0), (700.0, 500.0));
    assert!(store.has_unsaved_changes());

    store.select_floor(Some(1));
    store.save_all_positions(1).await.unwrap();
    assert!(store.service().updates().iter().all(|(id, _)| *id != 12));
    assert!(store.has_unsaved_changes());
    assert!(store.engine().is_unsaved(12));

    store.save_all_positions(2).await.unwrap();
    assert!(!store.has_unsaved_changes());
}

#[tokio::test]
async fn saving_empty_floor_succeeds() {
    let mut store = loaded(MockService::with(vec![main_floor()], vec![])).await;
    store.save_all_positions(1).await.unwrap();
    assert_eq!(store.service().count("update_table_layout"), 0);
}
