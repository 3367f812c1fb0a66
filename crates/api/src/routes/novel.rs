//! Route definitions for novel-scoped timeline endpoints.

use axum::routing::get;
use axum::Router;

use crate::handlers::timeline;
use crate::state::AppState;

/// Routes mounted at `/novels`.
///
/// ```text
/// GET    /{novel_id}/timelines              -> list_by_novel (?search=)
/// POST   /{novel_id}/timelines              -> create
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{novel_id}/timelines",
        get(timeline::list_by_novel).post(timeline::create),
    )
}
