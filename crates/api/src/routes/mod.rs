pub mod health;
pub mod novel;
pub mod timeline;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /novels/{novel_id}/timelines                     list (?search=), create
///
/// /timelines                                       list all
/// /timelines/{id}                                  get, update, delete
/// /timelines/{id}/nodes                            add node
/// /timelines/{id}/nodes/{node_id}                  patch data, remove
/// /timelines/{id}/nodes/{node_id}/position         move
/// /timelines/{id}/edges                            connect
/// /timelines/{id}/edges/{edge_id}                  disconnect
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/novels", novel::router())
        .nest("/timelines", timeline::router())
}
