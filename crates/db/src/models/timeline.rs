//! Timeline entity model and DTOs.
//!
//! The `nodes` and `edges` JSONB columns are read through the lenient graph
//! adapter, so a stored row is always readable: entries that do not fit the
//! node/edge shape, duplicate ids, and edges with a missing endpoint are
//! dropped and logged instead of failing the read.

use inkwell_core::demo::SampleTimeline;
use inkwell_core::graph_payload::decode_graph;
use inkwell_core::timeline_graph::{GraphPayload, TimelineEdge, TimelineGraph, TimelineNode};
use inkwell_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity structs
// ---------------------------------------------------------------------------

/// A raw row from the `timelines` table, graph columns still untyped.
#[derive(Debug, Clone, FromRow)]
pub struct TimelineRow {
    pub id: DbId,
    pub novel_id: DbId,
    pub title: String,
    pub description: String,
    pub nodes: serde_json::Value,
    pub edges: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A timeline with its graph decoded. Every edge endpoint is a node id of
/// the same timeline.
#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    pub id: DbId,
    pub novel_id: DbId,
    pub title: String,
    pub description: String,
    pub nodes: Vec<TimelineNode>,
    pub edges: Vec<TimelineEdge>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TimelineRow> for Timeline {
    fn from(row: TimelineRow) -> Self {
        let (graph, report) = decode_graph(&row.nodes, &row.edges);
        if !report.is_clean() {
            tracing::warn!(
                timeline_id = row.id,
                dropped_nodes = report.dropped_nodes,
                dropped_edges = report.dropped_edges,
                "Dropped invalid graph entries while reading timeline",
            );
        }
        let GraphPayload { nodes, edges } = graph.serialize();

        Self {
            id: row.id,
            novel_id: row.novel_id,
            title: row.title,
            description: row.description,
            nodes,
            edges,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<SampleTimeline> for Timeline {
    fn from(sample: SampleTimeline) -> Self {
        Self {
            id: sample.id,
            novel_id: sample.novel_id,
            title: sample.title,
            description: sample.description,
            nodes: sample.graph.nodes,
            edges: sample.graph.edges,
            created_at: sample.created_at,
            updated_at: sample.updated_at,
        }
    }
}

impl Timeline {
    pub fn payload(&self) -> GraphPayload {
        GraphPayload {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// A mutable working copy of this timeline's graph.
    pub fn graph(&self) -> TimelineGraph {
        TimelineGraph::deserialize(self.payload())
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a timeline under a novel.
///
/// Omitted `nodes`/`edges` are stored as empty arrays.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTimeline {
    pub title: String,
    pub description: Option<String>,
    pub nodes: Option<Vec<TimelineNode>>,
    pub edges: Option<Vec<TimelineEdge>>,
    /// Seed the single starter node when `nodes` is omitted.
    #[serde(default)]
    pub starter: bool,
}

impl CreateTimeline {
    /// The graph to store: the supplied collections, or the starter node
    /// when `starter` is set and no nodes were given.
    pub fn graph_payload(&self) -> GraphPayload {
        let nodes = match (&self.nodes, self.starter) {
            (Some(nodes), _) => nodes.clone(),
            (None, true) => TimelineGraph::starter().serialize().nodes,
            (None, false) => Vec::new(),
        };
        GraphPayload {
            nodes,
            edges: self.edges.clone().unwrap_or_default(),
        }
    }
}

/// DTO for updating a timeline. Omitted fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTimeline {
    pub title: Option<String>,
    pub description: Option<String>,
    pub nodes: Option<Vec<TimelineNode>>,
    pub edges: Option<Vec<TimelineEdge>>,
}

impl UpdateTimeline {
    pub fn touches_graph(&self) -> bool {
        self.nodes.is_some() || self.edges.is_some()
    }
}
