//! Repository for the `novels` table.
//!
//! Timelines only need novels to exist; full novel management lives
//! elsewhere.

use inkwell_core::types::DbId;
use sqlx::PgPool;

use crate::models::novel::{CreateNovel, Novel};

const COLUMNS: &str =
    "id, title, author, description, cover_image_url, created_at, updated_at";

pub struct NovelRepo;

impl NovelRepo {
    /// Insert a new novel, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateNovel) -> Result<Novel, sqlx::Error> {
        let query = format!(
            "INSERT INTO novels (title, author, description, cover_image_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Novel>(&query)
            .bind(&input.title)
            .bind(&input.author)
            .bind(&input.description)
            .bind(&input.cover_image_url)
            .fetch_one(pool)
            .await
    }

    /// Find a novel by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Novel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM novels WHERE id = $1");
        sqlx::query_as::<_, Novel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
