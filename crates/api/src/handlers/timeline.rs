//! Handlers for the `/timelines` resource and its novel-scoped listing.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use inkwell_core::demo::sample_timelines;
use inkwell_core::error::CoreError;
use inkwell_core::timeline::{matches_search, validate_title};
use inkwell_core::timeline_graph::{referenced_event_ids, GraphPayload, TimelineGraph};
use inkwell_core::types::DbId;
use inkwell_db::models::timeline::{CreateTimeline, Timeline, UpdateTimeline};
use inkwell_db::repositories::{EventRepo, NovelRepo, TimelineRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::query::TimelineListParams;
use crate::response::{DataResponse, DemoResponse};
use crate::state::AppState;

/// GET /api/v1/novels/{novel_id}/timelines
///
/// In demo mode a storage failure is answered with the labelled sample
/// timelines of the novel instead of an error.
pub async fn list_by_novel(
    State(state): State<AppState>,
    Path(novel_id): Path<DbId>,
    Query(params): Query<TimelineListParams>,
) -> AppResult<Response> {
    let search = params.search.as_deref();

    match TimelineRepo::list_by_novel(&state.pool, novel_id, search).await {
        Ok(timelines) => Ok(Json(DataResponse { data: timelines }).into_response()),
        Err(err) if state.config.demo_mode => {
            tracing::error!(novel_id, error = %err, "Listing timelines failed, serving demo data");
            let samples: Vec<Timeline> = sample_timelines(novel_id)
                .into_iter()
                .filter(|s| matches_search(&s.title, search.unwrap_or_default()))
                .map(Timeline::from)
                .collect();
            Ok(Json(DemoResponse::new(samples, err.to_string())).into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /api/v1/timelines
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Timeline>>>> {
    let timelines = TimelineRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: timelines }))
}

/// GET /api/v1/timelines/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Timeline>>> {
    let timeline = TimelineRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(timeline_not_found(id))?;
    Ok(Json(DataResponse { data: timeline }))
}

/// POST /api/v1/novels/{novel_id}/timelines
///
/// `"starter": true` without `nodes` seeds the single initial node.
pub async fn create(
    State(state): State<AppState>,
    Path(novel_id): Path<DbId>,
    Json(input): Json<CreateTimeline>,
) -> AppResult<(StatusCode, Json<DataResponse<Timeline>>)> {
    validate_title(&input.title)?;

    NovelRepo::find_by_id(&state.pool, novel_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Novel",
            id: novel_id,
        }))?;

    ensure_valid_graph(&state.pool, input.graph_payload()).await?;

    let timeline = TimelineRepo::create(&state.pool, novel_id, &input).await?;

    tracing::info!(
        timeline_id = timeline.id,
        novel_id,
        node_count = timeline.nodes.len(),
        edge_count = timeline.edges.len(),
        "Timeline created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: timeline })))
}

/// PUT /api/v1/timelines/{id}
///
/// Partial update. When only one of `nodes`/`edges` is supplied it is
/// validated against the stored other half while the row is locked.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTimeline>,
) -> AppResult<Json<DataResponse<Timeline>>> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(nodes) = &input.nodes {
        ensure_events_exist(&state.pool, &referenced_event_ids(nodes)).await?;
    }

    let timeline = TimelineRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(timeline_not_found(id))?;

    tracing::info!(
        timeline_id = id,
        graph_replaced = input.touches_graph(),
        "Timeline updated",
    );

    Ok(Json(DataResponse { data: timeline }))
}

/// DELETE /api/v1/timelines/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = TimelineRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(timeline_id = id, "Timeline deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(timeline_not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Shared checks
// ---------------------------------------------------------------------------

pub(crate) fn timeline_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Timeline",
        id,
    })
}

/// Reject a client-supplied graph that breaks the graph rules or points at
/// events that do not exist. Runs before anything is written.
async fn ensure_valid_graph(pool: &PgPool, payload: GraphPayload) -> AppResult<()> {
    let graph = TimelineGraph::from_payload_strict(payload).map_err(CoreError::from)?;
    ensure_events_exist(pool, &referenced_event_ids(graph.nodes())).await
}

pub(crate) async fn ensure_events_exist(pool: &PgPool, event_ids: &[DbId]) -> AppResult<()> {
    let missing = EventRepo::find_missing_ids(pool, event_ids).await?;
    if missing.is_empty() {
        return Ok(());
    }
    let ids = missing
        .iter()
        .map(DbId::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Err(AppError::Core(CoreError::ReferentialViolation(format!(
        "Nodes reference events that do not exist: {ids}"
    ))))
}
