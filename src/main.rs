use std::process::ExitCode;

use canvas::doc::TableStatus;
use floorplan::config::ServiceConfig;
use floorplan::error::ErrorCode;
use floorplan::service::http::HttpFloorService;
use floorplan::store::FloorPlanStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let service = match HttpFloorService::new(&config) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "HTTP client not available");
            return ExitCode::FAILURE;
        }
    };
    let mut store = FloorPlanStore::new(service, config.tenant_id);
    tracing::info!(base_url = store.service().base_url(), tenant = store.tenant_id(), "loading floor plan");
    if let Err(e) = store.load_floors_and_tables().await {
        tracing::error!(error = %e, code = e.error_code(), retryable = e.retryable(), "floor plan load failed");
        return ExitCode::FAILURE;
    }

    let doc = &store.engine().doc;
    for floor in doc.floors() {
        let tables = doc.tables_on(Some(floor.id));
        let seats: u32 = tables.iter().map(|t| t.seat_count).sum();
        let occupied = tables.iter().filter(|t| t.status == TableStatus::Occupied).count();
        tracing::info!(floor_id = floor.id, name = %floor.name, tables = tables.len(), seats, occupied, "floor");
        for table in &tables {
            let menu = table.menu_path();
            tracing::debug!(
                table_id = table.id,
                name = %table.name,
                shape = table.shape.as_str(),
                seats = table.seat_count,
                menu = menu.as_deref().unwrap_or("-"),
                "table"
            );
        }
    }

    let unassigned = doc.unassigned_tables().len();
    if unassigned > 0 {
        tracing::info!(unassigned, "tables without a floor");
    }
    if doc.floors().is_empty() {
        tracing::info!("no floors yet");
    }

    ExitCode::SUCCESS
}
