//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod event_repo;
pub mod novel_repo;
pub mod timeline_event_repo;
pub mod timeline_repo;

pub use event_repo::EventRepo;
pub use novel_repo::NovelRepo;
pub use timeline_event_repo::TimelineEventRepo;
pub use timeline_repo::{GraphUpdateError, TimelineRepo};
