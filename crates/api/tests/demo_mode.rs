//! Demo mode: labelled sample data when listing timelines fails.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, build_test_app_with, get, seed_novel, test_config};
use inkwell_api::config::ServerConfig;
use sqlx::PgPool;

fn demo_config() -> ServerConfig {
    ServerConfig {
        demo_mode: true,
        ..test_config()
    }
}

/// Make every timeline read fail at the storage layer.
async fn break_timeline_storage(pool: &PgPool) {
    sqlx::query("DROP TABLE timeline_events")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("DROP TABLE timelines").execute(pool).await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn storage_failure_propagates_without_demo_mode(pool: PgPool) {
    break_timeline_storage(&pool).await;

    let response = get(build_test_app(pool), "/api/v1/novels/1/timelines").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(json.get("data").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn demo_mode_serves_labelled_samples_on_failure(pool: PgPool) {
    break_timeline_storage(&pool).await;
    let config = demo_config();

    let response = get(build_test_app_with(pool, config), "/api/v1/novels/1/timelines").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["demo"], true);
    assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));

    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["title"], "三国演义主要事件");
    assert_eq!(data[0]["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(data[0]["edges"][0]["source"], "1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn demo_mode_never_masks_successful_reads(pool: PgPool) {
    let novel_id = seed_novel(&pool, "三国演义").await;
    let config = demo_config();

    let response = get(
        build_test_app_with(pool, config),
        &format!("/api/v1/novels/{novel_id}/timelines"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"], serde_json::json!([]));
    assert!(json.get("demo").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn demo_samples_respect_search(pool: PgPool) {
    break_timeline_storage(&pool).await;
    let config = demo_config();

    let response = get(
        build_test_app_with(pool, config),
        "/api/v1/novels/1/timelines?search=nothing-matches",
    )
    .await;

    let json = body_json(response).await;
    assert_eq!(json["demo"], true);
    assert_eq!(json["data"], serde_json::json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_unreadable_timelines_in_demo_mode(pool: PgPool) {
    break_timeline_storage(&pool).await;

    let response = get(build_test_app_with(pool, demo_config()), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], true);
    assert_eq!(json["timelines_readable"], false);
    assert_eq!(json["demo_mode"], true);
}
