//! Route definitions for the `/timelines` resource and its graph.

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::handlers::{timeline, timeline_graph};
use crate::state::AppState;

/// Routes mounted at `/timelines`.
///
/// ```text
/// GET    /                                  -> list
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
///
/// POST   /{id}/nodes                        -> add_node
/// PATCH  /{id}/nodes/{node_id}              -> update_node_data
/// DELETE /{id}/nodes/{node_id}              -> remove_node
/// PUT    /{id}/nodes/{node_id}/position     -> update_node_position
/// POST   /{id}/edges                        -> connect
/// DELETE /{id}/edges/{edge_id}              -> remove_edge
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(timeline::list))
        .route(
            "/{id}",
            get(timeline::get_by_id)
                .put(timeline::update)
                .delete(timeline::delete),
        )
        .route("/{id}/nodes", post(timeline_graph::add_node))
        .route(
            "/{id}/nodes/{node_id}",
            patch(timeline_graph::update_node_data).delete(timeline_graph::remove_node),
        )
        .route(
            "/{id}/nodes/{node_id}/position",
            put(timeline_graph::update_node_position),
        )
        .route("/{id}/edges", post(timeline_graph::connect))
        .route("/{id}/edges/{edge_id}", delete(timeline_graph::remove_edge))
}
