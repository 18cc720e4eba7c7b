use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::gateway::SqlDispatchGateway;
use crate::handlers::{broadcast_handler, diagnostics_handler, scan_handler, DispatchState};

/// Create the dispatch routes for the API.
///
/// The gateway is built once by the backend service (it also drives the
/// periodic scan) and shared with these routes so a manual scan trigger and
/// the timer use the same scan-window state.
pub fn routes(gateway: Arc<SqlDispatchGateway>) -> Router {
    info!("Dispatch routes initialized");

    let state = Arc::new(DispatchState { gateway });

    Router::new()
        .route("/dispatch/broadcast", post(broadcast_handler))
        .route("/dispatch/scan", post(scan_handler))
        .route(
            "/dispatch/diagnostics/{course_id}",
            get(diagnostics_handler),
        )
        .with_state(state)
}
