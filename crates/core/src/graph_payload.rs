//! Adapter between the `nodes` / `edges` JSON columns and the graph model.
//!
//! Writes are plain serde: the column holds a JSON array of node or edge
//! objects. Reads are lenient. Each array element is decoded on its own and
//! elements that do not match the node/edge shape are skipped, so a single
//! bad entry written by an older client never makes the timeline unreadable.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::timeline_graph::{GraphPayload, LoadReport, TimelineEdge, TimelineGraph, TimelineNode};

/// Decode every well-formed element of a JSON array column.
///
/// Returns the decoded items and the number of elements skipped. A column
/// that is not an array (including SQL `NULL` read as `Value::Null`)
/// decodes as empty; a non-empty non-array value counts as one skipped entry.
fn decode_array<T: DeserializeOwned>(column: &Value) -> (Vec<T>, usize) {
    match column {
        Value::Array(items) => {
            let mut decoded = Vec::with_capacity(items.len());
            let mut skipped = 0;
            for item in items {
                match serde_json::from_value::<T>(item.clone()) {
                    Ok(value) => decoded.push(value),
                    Err(_) => skipped += 1,
                }
            }
            (decoded, skipped)
        }
        Value::Null => (Vec::new(), 0),
        _ => (Vec::new(), 1),
    }
}

pub fn decode_nodes(column: &Value) -> (Vec<TimelineNode>, usize) {
    decode_array(column)
}

pub fn decode_edges(column: &Value) -> (Vec<TimelineEdge>, usize) {
    decode_array(column)
}

/// Decode both columns and load them into a graph.
///
/// The report counts entries skipped at either stage: malformed JSON
/// elements and structurally invalid entries (duplicate ids, edges with a
/// missing endpoint).
pub fn decode_graph(nodes: &Value, edges: &Value) -> (TimelineGraph, LoadReport) {
    let (nodes, malformed_nodes) = decode_nodes(nodes);
    let (edges, malformed_edges) = decode_edges(edges);

    let (graph, mut report) = TimelineGraph::load_lenient(GraphPayload { nodes, edges });
    report.dropped_nodes += malformed_nodes;
    report.dropped_edges += malformed_edges;
    (graph, report)
}
