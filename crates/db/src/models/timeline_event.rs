//! Link rows between a timeline node and the event it depicts.

use inkwell_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `timeline_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimelineEvent {
    pub id: DbId,
    pub timeline_id: DbId,
    pub event_id: DbId,
    pub node_id: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
