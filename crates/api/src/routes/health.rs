//! Liveness and readiness report, mounted at the root rather than under
//! `/api/v1` so load balancers need no version prefix.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use inkwell_db::repositories::TimelineRepo;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when timelines can be served from storage, else `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Whether the `timelines` table answers queries. When it does not and
    /// `demo_mode` is on, novel timeline lists are served from sample data.
    pub timelines_readable: bool,
    pub demo_mode: bool,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = inkwell_db::health_check(&state.pool).await.is_ok();
    let timelines_readable = db_healthy && TimelineRepo::check_readable(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if timelines_readable { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        timelines_readable,
        demo_mode: state.config.demo_mode,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
