//! Repository for the `timeline_events` link table.

use inkwell_core::timeline_graph::{event_links, TimelineNode};
use inkwell_core::types::DbId;
use sqlx::PgPool;

use crate::models::timeline_event::TimelineEvent;

const COLUMNS: &str = "id, timeline_id, event_id, node_id, created_at, updated_at";

/// Keeps the node → event links of a timeline in step with its `nodes`
/// column.
pub struct TimelineEventRepo;

impl TimelineEventRepo {
    /// Links of a timeline, ordered by node id.
    pub async fn list_by_timeline(
        pool: &PgPool,
        timeline_id: DbId,
    ) -> Result<Vec<TimelineEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timeline_events WHERE timeline_id = $1 ORDER BY node_id, id"
        );
        sqlx::query_as::<_, TimelineEvent>(&query)
            .bind(timeline_id)
            .fetch_all(pool)
            .await
    }

    /// Replace every link of a timeline with one per node carrying an
    /// `event_id`, within an existing transaction.
    ///
    /// Nodes pointing at an event that no longer exists get no link. Returns
    /// the number of links written.
    pub async fn replace_for_timeline(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        timeline_id: DbId,
        nodes: &[TimelineNode],
    ) -> Result<u64, sqlx::Error> {
        sqlx::query("DELETE FROM timeline_events WHERE timeline_id = $1")
            .bind(timeline_id)
            .execute(&mut **tx)
            .await?;

        let links = event_links(nodes);
        if links.is_empty() {
            return Ok(0);
        }
        let (node_ids, event_ids): (Vec<&str>, Vec<DbId>) = links.into_iter().unzip();

        let result = sqlx::query(
            "INSERT INTO timeline_events (timeline_id, node_id, event_id)
             SELECT $1, link.node_id, link.event_id
             FROM UNNEST($2::TEXT[], $3::BIGINT[]) AS link(node_id, event_id)
             JOIN events e ON e.id = link.event_id",
        )
        .bind(timeline_id)
        .bind(&node_ids)
        .bind(&event_ids)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected())
    }
}
