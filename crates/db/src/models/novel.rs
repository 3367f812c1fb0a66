//! Novel entity model and DTOs.

use inkwell_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `novels` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Novel {
    pub id: DbId,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new novel.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNovel {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
}
