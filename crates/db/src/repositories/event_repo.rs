//! Repository for the `events` table.

use inkwell_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateEvent, Event};

const COLUMNS: &str = "id, title, description, occurred_at, created_at, updated_at";

/// Lookups used to validate `data.event_id` references on timeline nodes.
pub struct EventRepo;

impl EventRepo {
    pub async fn create(pool: &PgPool, input: &CreateEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (title, description, occurred_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.occurred_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Return the ids in `ids` that have no row in `events`, ascending and
    /// without duplicates. Empty input costs no round trip.
    pub async fn find_missing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, DbId>(
            "SELECT DISTINCT wanted.id
             FROM UNNEST($1::BIGINT[]) AS wanted(id)
             LEFT JOIN events e ON e.id = wanted.id
             WHERE e.id IS NULL
             ORDER BY wanted.id",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
