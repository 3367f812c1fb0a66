//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })` to get
//! compile-time type safety and consistent serialization.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": T, "demo": true, "error": "..." }`: placeholder data served in
/// demo mode after the real read failed. Never returned outside demo mode.
#[derive(Debug, Serialize)]
pub struct DemoResponse<T: Serialize> {
    pub data: T,
    pub demo: bool,
    /// Why the real data could not be served.
    pub error: String,
}

impl<T: Serialize> DemoResponse<T> {
    pub fn new(data: T, error: impl Into<String>) -> Self {
        Self {
            data,
            demo: true,
            error: error.into(),
        }
    }
}
