use crate::AppState;
use crate::probe::ProbeReport;
use axum::extract::State;
use std::sync::Arc;

/// `GET /api/test-prisma`: check the backend and the data client, 200 or 500
pub async fn test_connection(State(state): State<Arc<AppState>>) -> ProbeReport {
    state.probe.run().await
}
