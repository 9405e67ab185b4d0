//! Floor/table store: applies collaborator results to the canvas engine.
//!
//! DESIGN
//! ======
//! Every mutation calls the collaborator first and only touches local state
//! when it succeeds. Table positions are the exception: drags change the
//! engine immediately and are persisted later through an explicit bulk save.
//!
//! ERROR HANDLING
//! ==============
//! Operations return `Result` and also record a [`Notice`]. A failed load
//! clears both collections and raises a persistent banner; a failed mutation
//! leaves local state as it was and raises an inline message, keeping any open
//! editor (rename field, delete confirmation) open for a retry.

use canvas::doc::{Floor, FloorId, ShapeTemplate, TableId, TableLayoutUpdate, TableStatus};
use canvas::engine::{EngineCore, PositionSnapshot};

use crate::error::{ErrorCode, ServiceError};
use crate::service::{FloorService, TableService, TenantId};

/// How a failure is shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Persistent banner above the canvas; cleared by the next successful load.
    Banner,
    /// Message next to the control that failed.
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// A delete waiting for the operator to confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingDelete {
    Floor(FloorId),
    Table(TableId),
}

/// Outcome of one bulk position save.
#[derive(Debug)]
pub struct SaveReport {
    pub floor_id: FloorId,
    /// Edit generation the saved positions reflect.
    pub generation: u64,
    /// Tables the save covered.
    pub tables: Vec<TableId>,
    pub saved: usize,
    pub failures: Vec<(TableId, ServiceError)>,
}

pub struct FloorPlanStore<S> {
    service: S,
    tenant_id: TenantId,
    engine: EngineCore,
    notice: Option<Notice>,
    renaming: Option<FloorId>,
    pending_delete: Option<PendingDelete>,
}

impl<S: FloorService + TableService> FloorPlanStore<S> {
    pub fn new(service: S, tenant_id: TenantId) -> Self {
        Self {
            service,
            tenant_id,
            engine: EngineCore::new(),
            notice: None,
            renaming: None,
            pending_delete: None,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    /// Mutable engine access for input handling and view controls.
    pub fn engine_mut(&mut self) -> &mut EngineCore {
        &mut self.engine
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// The floor whose name is being edited, if any.
    pub fn renaming(&self) -> Option<FloorId> {
        self.renaming
    }

    pub fn pending_delete(&self) -> Option<PendingDelete> {
        self.pending_delete
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.engine.has_unsaved_changes()
    }

    /// Show another floor. Closes the rename editor.
    pub fn select_floor(&mut self, id: Option<FloorId>) {
        self.renaming = None;
        self.engine.select_floor(id);
    }

    // =========================================================================
    // LOAD
    // =========================================================================

    /// Fetch every floor and table for the tenant.
    ///
    /// # Errors
    ///
    /// Returns the first collaborator failure. Both collections are then
    /// empty and a banner is raised.
    pub async fn load_floors_and_tables(&mut self) -> Result<(), ServiceError> {
        let tenant = self.tenant_id;
        let loaded = futures::future::try_join(
            self.service.list_floors(tenant),
            self.service.list_tables_with_status(tenant),
        )
        .await;

        match loaded {
            Ok((floors, tables)) => {
                tracing::info!(tenant, floors = floors.len(), tables = tables.len(), "floor plan loaded");
                self.engine.load_snapshot(floors, tables);
                self.renaming = None;
                self.pending_delete = None;
                self.notice = None;
                Ok(())
            }
            Err(e) => {
                self.engine.clear();
                self.renaming = None;
                self.pending_delete = None;
                Err(self.fail(NoticeKind::Banner, "load floor plan", e))
            }
        }
    }

    // =========================================================================
    // FLOORS
    // =========================================================================

    /// Create `Floor N` (N = floor count + 1) and select it.
    ///
    /// # Errors
    ///
    /// Returns the collaborator failure; no floor is added.
    pub async fn create_floor(&mut self) -> Result<FloorId, ServiceError> {
        let name = format!("Floor {}", self.engine.doc.floors().len() + 1);
        match self.service.create_floor(&name).await {
            Ok(floor) => {
                let id = floor.id;
                tracing::info!(floor_id = id, name = %floor.name, "floor created");
                self.engine.apply_floor_created(floor);
                self.clear_inline();
                Ok(id)
            }
            Err(e) => Err(self.fail(NoticeKind::Inline, "create floor", e)),
        }
    }

    /// Open the rename editor for a floor. Returns `false` for unknown floors.
    pub fn begin_rename_floor(&mut self, id: FloorId) -> bool {
        if self.engine.doc.floor(id).is_none() {
            return false;
        }
        self.renaming = Some(id);
        true
    }

    pub fn cancel_rename(&mut self) {
        self.renaming = None;
    }

    /// Rename a floor.
    ///
    /// A name that is blank or identical to the current one closes the editor
    /// without calling the collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown floor, or the
    /// collaborator failure. On failure the editor stays open.
    pub async fn rename_floor(&mut self, id: FloorId, name: &str) -> Result<(), ServiceError> {
        let Some(current) = self.engine.doc.floor(id) else {
            return Err(self.fail(NoticeKind::Inline, "rename floor", ServiceError::NotFound { kind: "floor", id }));
        };
        let name = name.trim();
        if name.is_empty() || name == current.name {
            self.renaming = None;
            return Ok(());
        }

        match self.service.rename_floor(id, name).await {
            Ok(Floor { name: saved, .. }) => {
                tracing::info!(floor_id = id, name = %saved, "floor renamed");
                self.engine.apply_floor_renamed(id, &saved);
                self.renaming = None;
                self.clear_inline();
                Ok(())
            }
            Err(e) => Err(self.fail(NoticeKind::Inline, "rename floor", e)),
        }
    }

    /// Ask to delete a floor. Returns `false` for unknown floors.
    pub fn request_delete_floor(&mut self, id: FloorId) -> bool {
        if self.engine.doc.floor(id).is_none() {
            return false;
        }
        self.pending_delete = Some(PendingDelete::Floor(id));
        true
    }

    // =========================================================================
    // TABLES
    // =========================================================================

    /// Add a table from a palette template to a floor.
    ///
    /// Two collaborator calls: a bare record named `Table N` (N = tenant table
    /// count + 1), then a layout update that applies the template at the
    /// canvas center. The table appears locally only after both succeed.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown floor, or the first
    /// collaborator failure.
    pub async fn create_table(&mut self, template: &ShapeTemplate, floor_id: FloorId) -> Result<TableId, ServiceError> {
        if self.engine.doc.floor(floor_id).is_none() {
            let err = ServiceError::NotFound { kind: "floor", id: floor_id };
            return Err(self.fail(NoticeKind::Inline, "create table", err));
        }
        let name = format!("Table {}", self.engine.doc.table_count() + 1);

        let bare = match self.service.create_table(&name, floor_id).await {
            Ok(t) => t,
            Err(e) => return Err(self.fail(NoticeKind::Inline, "create table", e)),
        };

        match self.service.update_table_layout(bare.id, &template.layout()).await {
            Ok(mut table) => {
                table.status = TableStatus::Available;
                let id = table.id;
                tracing::info!(table_id = id, floor_id, template = template.label, "table created");
                self.engine.apply_table_created(table);
                self.clear_inline();
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(table_id = bare.id, "table record created but layout failed; not shown");
                Err(self.fail(NoticeKind::Inline, "apply table layout", e))
            }
        }
    }

    /// Persist name and/or seat count immediately.
    ///
    /// Only the fields sent are merged back; position and shape are never
    /// touched. Seat counts below 1 are raised to 1.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown table, or the
    /// collaborator failure.
    pub async fn update_table_properties(
        &mut self,
        id: TableId,
        name: Option<&str>,
        seat_count: Option<u32>,
    ) -> Result<(), ServiceError> {
        if self.engine.doc.table(id).is_none() {
            return Err(self.fail(NoticeKind::Inline, "update table", ServiceError::NotFound { kind: "table", id }));
        }
        let update = TableLayoutUpdate {
            name: name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_owned),
            seat_count: seat_count.map(|n| n.max(1)),
            ..Default::default()
        };
        if update.is_empty() {
            return Ok(());
        }

        match self.service.update_table_layout(id, &update).await {
            Ok(_) => {
                tracing::info!(table_id = id, "table properties saved");
                self.engine.apply_table_update(id, &update);
                self.clear_inline();
                Ok(())
            }
            Err(e) => Err(self.fail(NoticeKind::Inline, "update table", e)),
        }
    }

    /// Ask to delete a table. Returns `false` for unknown tables.
    pub fn request_delete_table(&mut self, id: TableId) -> bool {
        if self.engine.doc.table(id).is_none() {
            return false;
        }
        self.pending_delete = Some(PendingDelete::Table(id));
        true
    }

    // =========================================================================
    // DELETE CONFIRMATION
    // =========================================================================

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Carry out the pending delete, if any.
    ///
    /// A deleted floor's tables keep their stale `floor_id` locally until the
    /// next load.
    ///
    /// # Errors
    ///
    /// Returns the collaborator failure; the confirmation stays pending.
    pub async fn confirm_delete(&mut self) -> Result<(), ServiceError> {
        let Some(pending) = self.pending_delete.take() else {
            return Ok(());
        };
        let result = match pending {
            PendingDelete::Floor(id) => self.service.delete_floor(id).await,
            PendingDelete::Table(id) => self.service.delete_table(id).await,
        };
        if let Err(e) = result {
            self.pending_delete = Some(pending);
            return Err(self.fail(NoticeKind::Inline, "delete", e));
        }

        match pending {
            PendingDelete::Floor(id) => {
                tracing::info!(floor_id = id, "floor deleted");
                if self.renaming == Some(id) {
                    self.renaming = None;
                }
                self.engine.apply_floor_deleted(id);
            }
            PendingDelete::Table(id) => {
                tracing::info!(table_id = id, "table deleted");
                self.engine.apply_table_deleted(id);
            }
        }
        self.clear_inline();
        Ok(())
    }

    // =========================================================================
    // BULK SAVE
    // =========================================================================

    /// Capture the positions of every table on `floor_id` for a save.
    pub fn begin_save(&self, floor_id: FloorId) -> PositionSnapshot {
        self.engine.snapshot_positions(floor_id)
    }

    /// Apply the result of [`send_positions`].
    ///
    /// The saved tables are marked clean only if every update succeeded, and
    /// only those not moved after the snapshot was taken. Tables on other
    /// floors keep their unsaved moves.
    ///
    /// # Errors
    ///
    /// Returns the first failed update; the flag stays set so the next save
    /// re-sends every table on the floor.
    pub fn complete_save(&mut self, report: SaveReport) -> Result<(), ServiceError> {
        let SaveReport { floor_id, generation, tables, saved, failures } = report;
        let failed = failures.len();
        let Some((table_id, first)) = failures.into_iter().next() else {
            tracing::info!(floor_id, saved, "layout saved");
            self.engine.mark_saved(tables, generation);
            self.clear_inline();
            return Ok(());
        };
        tracing::warn!(floor_id, saved, failed, table_id, "layout save incomplete");
        Err(self.fail(NoticeKind::Inline, "save layout", first))
    }

    /// Persist every table position on `floor_id`.
    ///
    /// # Errors
    ///
    /// See [`FloorPlanStore::complete_save`].
    pub async fn save_all_positions(&mut self, floor_id: FloorId) -> Result<(), ServiceError> {
        let snapshot = self.begin_save(floor_id);
        let report = send_positions(&self.service, &snapshot).await;
        self.complete_save(report)
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn fail(&mut self, kind: NoticeKind, op: &'static str, err: ServiceError) -> ServiceError {
        tracing::warn!(op, error = %err, code = err.error_code(), retryable = err.retryable(), "collaborator call failed");
        self.notice = Some(Notice { kind, message: err.user_message() });
        err
    }

    fn clear_inline(&mut self) {
        if self.notice.as_ref().is_some_and(|n| n.kind == NoticeKind::Inline) {
            self.notice = None;
        }
    }
}

/// Send one position update per table in `snapshot`, concurrently.
///
/// Takes the service by reference so the host can keep feeding input to the
/// engine while the requests are in flight.
pub async fn send_positions<T>(service: &T, snapshot: &PositionSnapshot) -> SaveReport
where
    T: TableService + ?Sized,
{
    let requests = snapshot.positions.iter().map(|&(id, x, y)| async move {
        let result = service.update_table_layout(id, &TableLayoutUpdate::position(x, y)).await;
        (id, result)
    });
    let results = futures::future::join_all(requests).await;

    let mut saved = 0;
    let mut failures = Vec::new();
    for (id, result) in results {
        match result {
            Ok(_) => saved += 1,
            Err(e) => failures.push((id, e)),
        }
    }
    SaveReport {
        floor_id: snapshot.floor_id,
        generation: snapshot.generation,
        tables: snapshot.table_ids(),
        saved,
        failures,
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
