//! Collaborator contract for floors and tables.
//!
//! The store only talks to the backend through these traits, so tests can
//! swap in an in-memory implementation. [`http::HttpFloorService`] is the
//! REST binding used in production.

pub mod http;

use canvas::doc::{Floor, FloorId, Table, TableId, TableLayoutUpdate};

use crate::error::ServiceError;

/// Tenant (restaurant) identifier.
pub type TenantId = i64;

/// Floor CRUD.
#[async_trait::async_trait]
pub trait FloorService: Send + Sync {
    /// Every floor of the tenant, in service order.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the request fails or the response is malformed.
    async fn list_floors(&self, tenant: TenantId) -> Result<Vec<Floor>, ServiceError>;

    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the service rejects the floor.
    async fn create_floor(&self, name: &str) -> Result<Floor, ServiceError>;

    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the service rejects the rename.
    async fn rename_floor(&self, id: FloorId, name: &str) -> Result<Floor, ServiceError>;

    /// Delete a floor. The service unassigns its tables.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the floor cannot be deleted.
    async fn delete_floor(&self, id: FloorId) -> Result<(), ServiceError>;
}

/// Table CRUD and layout persistence.
#[async_trait::async_trait]
pub trait TableService: Send + Sync {
    /// Every table of the tenant with its live occupancy status.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the request fails or the response is malformed.
    async fn list_tables_with_status(&self, tenant: TenantId) -> Result<Vec<Table>, ServiceError>;

    /// Create a bare table record on a floor.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the service rejects the table.
    async fn create_table(&self, name: &str, floor_id: FloorId) -> Result<Table, ServiceError>;

    /// Apply a sparse layout update. Only the fields present are changed.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the service rejects the update.
    async fn update_table_layout(&self, id: TableId, update: &TableLayoutUpdate) -> Result<Table, ServiceError>;

    /// # Errors
    ///
    /// Returns a [`ServiceError`] if the table cannot be deleted.
    async fn delete_table(&self, id: TableId) -> Result<(), ServiceError>;
}
