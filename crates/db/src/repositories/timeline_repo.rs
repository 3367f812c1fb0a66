//! Repository for the `timelines` table.
//!
//! Every write that touches the `nodes` column rewrites the timeline's
//! `timeline_events` links in the same transaction.

use inkwell_core::timeline_graph::{GraphError, GraphPayload, TimelineGraph};
use inkwell_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::timeline::{CreateTimeline, Timeline, TimelineRow, UpdateTimeline};
use crate::repositories::TimelineEventRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, novel_id, title, description, nodes, edges, created_at, updated_at";

/// Failure of a locked read-modify-write on a timeline graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphUpdateError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// The mutation itself was rejected; nothing was written.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Provides CRUD and graph operations for timelines.
pub struct TimelineRepo;

impl TimelineRepo {
    /// List the timelines of a novel ordered by title.
    ///
    /// `search` narrows the list to titles containing the term,
    /// case-insensitively. A blank term is ignored. An unknown novel yields
    /// an empty list.
    pub async fn list_by_novel(
        pool: &PgPool,
        novel_id: DbId,
        search: Option<&str>,
    ) -> Result<Vec<Timeline>, sqlx::Error> {
        let search = search.map(str::trim).filter(|term| !term.is_empty());
        let query = format!(
            "SELECT {COLUMNS} FROM timelines
             WHERE novel_id = $1
               AND ($2::TEXT IS NULL OR strpos(lower(title), lower($2::TEXT)) > 0)
             ORDER BY title, id"
        );
        let rows = sqlx::query_as::<_, TimelineRow>(&query)
            .bind(novel_id)
            .bind(search)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Timeline::from).collect())
    }

    /// Fail unless the `timelines` table can be read. Used by the health
    /// report; touches at most one row.
    pub async fn check_readable(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1 FROM timelines LIMIT 1")
            .fetch_optional(pool)
            .await?;
        Ok(())
    }

    /// List every timeline across all novels, ordered by title.
    pub async fn list(pool: &PgPool) -> Result<Vec<Timeline>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timelines ORDER BY title, id");
        let rows = sqlx::query_as::<_, TimelineRow>(&query)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Timeline::from).collect())
    }

    /// Find a timeline by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Timeline>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timelines WHERE id = $1");
        let row = sqlx::query_as::<_, TimelineRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Timeline::from))
    }

    /// Insert a new timeline, returning the created row.
    ///
    /// The graph written is `input.graph_payload()`; callers validate it
    /// first. A missing description is stored as the empty string.
    pub async fn create(
        pool: &PgPool,
        novel_id: DbId,
        input: &CreateTimeline,
    ) -> Result<Timeline, sqlx::Error> {
        let payload = input.graph_payload();
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO timelines (novel_id, title, description, nodes, edges)
             VALUES ($1, $2, COALESCE($3, ''), $4, $5)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TimelineRow>(&query)
            .bind(novel_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(Json(&payload.nodes))
            .bind(Json(&payload.edges))
            .fetch_one(&mut *tx)
            .await?;

        TimelineEventRepo::replace_for_timeline(&mut tx, row.id, &payload.nodes).await?;

        tx.commit().await?;
        Ok(Timeline::from(row))
    }

    /// Update a timeline. Only non-`None` fields in `input` are applied;
    /// `updated_at` is advanced by the table trigger.
    ///
    /// When only one of `nodes`/`edges` is supplied it is merged with the
    /// stored other half and the result must pass strict graph validation.
    /// The row stays locked from that read until commit, so a concurrent
    /// graph edit cannot slip in between validation and write.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTimeline,
    ) -> Result<Option<Timeline>, GraphUpdateError> {
        let mut tx = pool.begin().await?;

        let Some(current) = Self::find_for_update(&mut tx, id).await? else {
            return Ok(None);
        };

        let payload = if input.touches_graph() {
            let merged = GraphPayload {
                nodes: input.nodes.clone().unwrap_or(current.nodes),
                edges: input.edges.clone().unwrap_or(current.edges),
            };
            Some(TimelineGraph::from_payload_strict(merged)?.serialize())
        } else {
            None
        };

        let query = format!(
            "UPDATE timelines SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                nodes = COALESCE($4, nodes),
                edges = COALESCE($5, edges)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TimelineRow>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(payload.as_ref().map(|p| Json(&p.nodes)))
            .bind(payload.as_ref().map(|p| Json(&p.edges)))
            .fetch_one(&mut *tx)
            .await?;

        if let Some(payload) = &payload {
            TimelineEventRepo::replace_for_timeline(&mut tx, id, &payload.nodes).await?;
        }

        tx.commit().await?;
        Ok(Some(Timeline::from(row)))
    }

    /// Permanently delete a timeline. Its event links go with it through
    /// `ON DELETE CASCADE`.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM timelines WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Load a timeline's graph, apply `mutate`, and persist the result.
    ///
    /// The row is locked with `SELECT ... FOR UPDATE` for the whole
    /// read-modify-write, so concurrent mutations of the same timeline apply
    /// one after the other. When `mutate` fails the transaction is rolled back
    /// and nothing is written.
    ///
    /// Returns `None` if no row with the given `id` exists; otherwise the
    /// updated timeline and whatever `mutate` returned.
    pub async fn modify_graph<T, F>(
        pool: &PgPool,
        id: DbId,
        mutate: F,
    ) -> Result<Option<(Timeline, T)>, GraphUpdateError>
    where
        F: FnOnce(&mut TimelineGraph) -> Result<T, GraphError> + Send,
        T: Send,
    {
        let mut tx = pool.begin().await?;

        let Some(current) = Self::find_for_update(&mut tx, id).await? else {
            return Ok(None);
        };

        let mut graph = current.graph();
        let outcome = mutate(&mut graph)?;
        let payload = graph.serialize();

        let row = Self::write_graph(&mut tx, id, &payload).await?;
        TimelineEventRepo::replace_for_timeline(&mut tx, id, &payload.nodes).await?;

        tx.commit().await?;
        Ok(Some((Timeline::from(row), outcome)))
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Read a timeline and lock its row until the transaction ends.
    async fn find_for_update(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<Timeline>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timelines WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, TimelineRow>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(row.map(Timeline::from))
    }

    /// Overwrite both graph columns within an existing transaction.
    async fn write_graph(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
        payload: &GraphPayload,
    ) -> Result<TimelineRow, sqlx::Error> {
        let query = format!(
            "UPDATE timelines SET nodes = $2, edges = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimelineRow>(&query)
            .bind(id)
            .bind(Json(&payload.nodes))
            .bind(Json(&payload.edges))
            .fetch_one(&mut **tx)
            .await
    }
}
