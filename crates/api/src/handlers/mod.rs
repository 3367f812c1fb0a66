//! Request handlers.
//!
//! Handlers delegate to the repositories in `inkwell_db` and map errors via
//! [`AppError`](crate::error::AppError).

pub mod timeline;
pub mod timeline_graph;
