//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?search=` filter for timeline lists. Matches titles case-insensitively;
/// blank or absent means no filter.
#[derive(Debug, Default, Deserialize)]
pub struct TimelineListParams {
    pub search: Option<String>,
}
