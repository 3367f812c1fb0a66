//! Domain logic for timeline graphs: the node/edge model, its consistency
//! rules, the JSON column adapter, and the editor session state machine.
//!
//! This crate has no I/O; the `db` and `api` crates build on it.

pub mod demo;
pub mod edit_session;
pub mod error;
pub mod graph_payload;
pub mod timeline;
pub mod timeline_graph;
pub mod types;
