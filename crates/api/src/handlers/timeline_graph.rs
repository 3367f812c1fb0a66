//! Handlers for editing a timeline's graph one node or edge at a time.
//!
//! Each request runs load → mutate → save through
//! [`TimelineRepo::modify_graph`], which holds a row lock for the duration,
//! so two concurrent edits of the same timeline never overwrite each other.
//! A rejected mutation writes nothing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use inkwell_core::timeline_graph::{
    EdgeOptions, GraphError, NewNode, NodeDataPatch, NodePosition, NodeRemoval, TimelineEdge,
    TimelineNode,
};
use inkwell_core::types::DbId;
use inkwell_db::repositories::TimelineRepo;
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::timeline::{ensure_events_exist, timeline_not_found};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for [`connect`].
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub source: String,
    pub target: String,
    #[serde(flatten)]
    pub options: EdgeOptions,
}

/// POST /api/v1/timelines/{id}/nodes
///
/// The node id is generated; omitted position and data take the editor
/// defaults.
pub async fn add_node(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<NewNode>,
) -> AppResult<(StatusCode, Json<DataResponse<TimelineNode>>)> {
    if let Some(event_id) = input.data.as_ref().and_then(|d| d.event_id) {
        ensure_events_exist(&state.pool, &[event_id]).await?;
    }

    let (_, node) = TimelineRepo::modify_graph(&state.pool, id, |graph| {
        graph.add_node(input).cloned()
    })
    .await?
    .ok_or(timeline_not_found(id))?;

    tracing::info!(timeline_id = id, node_id = %node.id, "Timeline node added");

    Ok((StatusCode::CREATED, Json(DataResponse { data: node })))
}

/// PATCH /api/v1/timelines/{id}/nodes/{node_id}
///
/// Absent fields are left alone; an explicit `null` clears an optional one.
pub async fn update_node_data(
    State(state): State<AppState>,
    Path((id, node_id)): Path<(DbId, String)>,
    Json(patch): Json<NodeDataPatch>,
) -> AppResult<Json<DataResponse<TimelineNode>>> {
    if let Some(Some(event_id)) = patch.event_id {
        ensure_events_exist(&state.pool, &[event_id]).await?;
    }

    let (_, node) = TimelineRepo::modify_graph(&state.pool, id, |graph| {
        graph.update_node_data(&node_id, patch).cloned()
    })
    .await?
    .ok_or(timeline_not_found(id))?;

    tracing::info!(timeline_id = id, node_id = %node.id, "Timeline node updated");

    Ok(Json(DataResponse { data: node }))
}

/// PUT /api/v1/timelines/{id}/nodes/{node_id}/position
pub async fn update_node_position(
    State(state): State<AppState>,
    Path((id, node_id)): Path<(DbId, String)>,
    Json(position): Json<NodePosition>,
) -> AppResult<Json<DataResponse<TimelineNode>>> {
    let (_, node) = TimelineRepo::modify_graph(&state.pool, id, |graph| {
        graph.update_node_position(&node_id, position)?;
        graph
            .node(&node_id)
            .cloned()
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))
    })
    .await?
    .ok_or(timeline_not_found(id))?;

    tracing::debug!(
        timeline_id = id,
        node_id = %node.id,
        x = position.x,
        y = position.y,
        "Timeline node moved",
    );

    Ok(Json(DataResponse { data: node }))
}

/// DELETE /api/v1/timelines/{id}/nodes/{node_id}
///
/// Edges touching the node are removed with it and returned as
/// `detached_edges`.
pub async fn remove_node(
    State(state): State<AppState>,
    Path((id, node_id)): Path<(DbId, String)>,
) -> AppResult<Json<DataResponse<NodeRemoval>>> {
    let (_, removal) =
        TimelineRepo::modify_graph(&state.pool, id, |graph| graph.remove_node(&node_id))
            .await?
            .ok_or(timeline_not_found(id))?;

    tracing::info!(
        timeline_id = id,
        node_id = %node_id,
        detached_edges = removal.detached_edges.len(),
        "Timeline node removed",
    );

    Ok(Json(DataResponse { data: removal }))
}

/// POST /api/v1/timelines/{id}/edges
///
/// Both endpoints must already be nodes of the timeline (422 otherwise).
pub async fn connect(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ConnectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TimelineEdge>>)> {
    let ConnectRequest {
        source,
        target,
        options,
    } = input;

    let (_, edge) = TimelineRepo::modify_graph(&state.pool, id, |graph| {
        graph.connect_with(&source, &target, options).cloned()
    })
    .await?
    .ok_or(timeline_not_found(id))?;

    tracing::info!(
        timeline_id = id,
        edge_id = %edge.id,
        source = %edge.source,
        target = %edge.target,
        "Timeline edge added",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: edge })))
}

/// DELETE /api/v1/timelines/{id}/edges/{edge_id}
pub async fn remove_edge(
    State(state): State<AppState>,
    Path((id, edge_id)): Path<(DbId, String)>,
) -> AppResult<StatusCode> {
    TimelineRepo::modify_graph(&state.pool, id, |graph| graph.remove_edge(&edge_id))
        .await?
        .ok_or(timeline_not_found(id))?;

    tracing::info!(timeline_id = id, edge_id = %edge_id, "Timeline edge removed");

    Ok(StatusCode::NO_CONTENT)
}
