//! In-memory timeline graph.
//!
//! A timeline is a set of event nodes placed on a canvas plus directed edges
//! between them. Every edge endpoint must name a node of the same graph. All
//! mutating operations keep that invariant, [`TimelineGraph::serialize`]
//! filters anything that violates it, and the two loaders differ only in
//! whether bad entries are dropped (reads) or rejected (client writes).

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// The only node discriminator the editor renders.
pub const EVENT_NODE_TYPE: &str = "event";

/// Rendering hint applied to edges created by `connect`.
pub const DEFAULT_EDGE_TYPE: &str = "smoothstep";

/// Label given to nodes added without data.
pub const DEFAULT_NODE_LABEL: &str = "New event";

/// Canvas position of the first node; later nodes stack downward.
pub const NODE_ORIGIN_X: f64 = 100.0;
pub const NODE_ORIGIN_Y: f64 = 100.0;

/// Vertical gap between auto-placed nodes (canvas units).
pub const NODE_VERTICAL_SPACING: f64 = 100.0;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Canvas-space coordinate of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
}

impl NodePosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Display payload of an event node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub label: String,
    /// Optional reference to a row in the `events` table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<DbId>,
    /// Free-form display date ("184年", "Spring, year 3").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NodeData {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            event_id: None,
            date: None,
            description: None,
        }
    }
}

impl Default for NodeData {
    fn default() -> Self {
        Self::labelled(DEFAULT_NODE_LABEL)
    }
}

/// An event marker on the timeline canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineNode {
    /// Unique within the owning timeline only.
    pub id: String,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    pub position: NodePosition,
    pub data: NodeData,
}

fn default_node_type() -> String {
    EVENT_NODE_TYPE.to_string()
}

/// A directed link between two nodes of the same timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
}

/// The `{nodes, edges}` pair persisted for one timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<TimelineNode>,
    #[serde(default)]
    pub edges: Vec<TimelineEdge>,
}

// ---------------------------------------------------------------------------
// Operation inputs
// ---------------------------------------------------------------------------

/// Caller-supplied fields for [`TimelineGraph::add_node`]. The id is always
/// generated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewNode {
    #[serde(default)]
    pub position: Option<NodePosition>,
    #[serde(default)]
    pub data: Option<NodeData>,
}

/// Partial edit of a node's data.
///
/// For the optional fields, an absent key leaves the value alone and an
/// explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeDataPatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub event_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl NodeDataPatch {
    fn apply(self, data: &mut NodeData) {
        if let Some(label) = self.label {
            data.label = label;
        }
        if let Some(event_id) = self.event_id {
            data.event_id = event_id;
        }
        if let Some(date) = self.date {
            data.date = date;
        }
        if let Some(description) = self.description {
            data.description = description;
        }
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Display options for a new edge. Omitted fields take the editor defaults
/// (`smoothstep`, animated).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdgeOptions {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub edge_type: Option<String>,
    #[serde(default)]
    pub animated: Option<bool>,
}

/// Result of [`TimelineGraph::remove_node`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRemoval {
    pub node: TimelineNode,
    /// Edges that referenced the node and were removed with it.
    pub detached_edges: Vec<TimelineEdge>,
}

/// Counts of entries discarded by a lenient load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub dropped_nodes: usize,
    pub dropped_edges: usize,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.dropped_nodes == 0 && self.dropped_edges == 0
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    #[error("Node '{0}' does not exist")]
    NodeNotFound(String),

    #[error("Edge '{0}' does not exist")]
    EdgeNotFound(String),

    #[error("Edge '{source_id}' -> '{target_id}' references missing node '{missing}'")]
    DanglingEndpoint {
        source_id: String,
        target_id: String,
        missing: String,
    },

    #[error("Duplicate node id '{0}'")]
    DuplicateNodeId(String),

    #[error("Duplicate edge id '{0}'")]
    DuplicateEdgeId(String),

    #[error("Node position must be finite, got ({x}, {y})")]
    NonFinitePosition { x: f64, y: f64 },
}

impl From<GraphError> for CoreError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::NodeNotFound(id) => CoreError::GraphMemberNotFound { entity: "Node", id },
            GraphError::EdgeNotFound(id) => CoreError::GraphMemberNotFound { entity: "Edge", id },
            GraphError::DanglingEndpoint { .. } => CoreError::ReferentialViolation(err.to_string()),
            GraphError::DuplicateNodeId(_)
            | GraphError::DuplicateEdgeId(_)
            | GraphError::NonFinitePosition { .. } => CoreError::Validation(err.to_string()),
        }
    }
}

fn ensure_finite(position: NodePosition) -> Result<(), GraphError> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(GraphError::NonFinitePosition {
            x: position.x,
            y: position.y,
        })
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Mutable node/edge graph of one timeline.
#[derive(Debug, Clone)]
pub struct TimelineGraph {
    nodes: Vec<TimelineNode>,
    edges: Vec<TimelineEdge>,
    /// Next candidate for a generated node id. Only ever increases, so ids
    /// freed by `remove_node` are not handed out again until the counter
    /// reaches `u64::MAX`.
    next_node_seq: u64,
}

impl Default for TimelineGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            next_node_seq: 1,
        }
    }

    /// A graph holding the single placeholder node `"1"` that new timelines
    /// start with.
    pub fn starter() -> Self {
        let mut graph = Self::new();
        let position = graph.next_default_position();
        graph.push_generated_node(position, NodeData::default());
        graph
    }

    pub fn nodes(&self) -> &[TimelineNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[TimelineEdge] {
        &self.edges
    }

    pub fn node(&self, node_id: &str) -> Option<&TimelineNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    pub fn edge(&self, edge_id: &str) -> Option<&TimelineEdge> {
        self.edges.iter().find(|e| e.id == edge_id)
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.node(node_id).is_some()
    }

    fn contains_edge(&self, edge_id: &str) -> bool {
        self.edge(edge_id).is_some()
    }

    fn node_mut(&mut self, node_id: &str) -> Result<&mut TimelineNode, GraphError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))
    }

    // -- Mutations ----------------------------------------------------------

    /// Append an event node with a freshly generated id.
    ///
    /// Without an explicit position the node is stacked below the existing
    /// ones; without data it gets the placeholder label.
    pub fn add_node(&mut self, new_node: NewNode) -> Result<&TimelineNode, GraphError> {
        let position = new_node
            .position
            .unwrap_or_else(|| self.next_default_position());
        ensure_finite(position)?;
        Ok(self.push_generated_node(position, new_node.data.unwrap_or_default()))
    }

    fn push_generated_node(&mut self, position: NodePosition, data: NodeData) -> &TimelineNode {
        let id = self.generate_node_id();
        self.nodes.push(TimelineNode {
            id,
            node_type: EVENT_NODE_TYPE.to_string(),
            position,
            data,
        });
        &self.nodes[self.nodes.len() - 1]
    }

    fn next_default_position(&self) -> NodePosition {
        NodePosition::new(
            NODE_ORIGIN_X,
            NODE_ORIGIN_Y + NODE_VERTICAL_SPACING * self.nodes.len() as f64,
        )
    }

    fn generate_node_id(&mut self) -> String {
        while self.next_node_seq < u64::MAX {
            let candidate = self.next_node_seq.to_string();
            self.next_node_seq += 1;
            if !self.contains_node(&candidate) {
                return candidate;
            }
        }

        // Counter exhausted by a stored id near u64::MAX: take the lowest
        // free decimal id. At most `nodes.len()` candidates are taken.
        let mut n: u64 = 1;
        while self.contains_node(&n.to_string()) {
            n += 1;
        }
        n.to_string()
    }

    /// Remove a node together with every edge that touches it.
    pub fn remove_node(&mut self, node_id: &str) -> Result<NodeRemoval, GraphError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        let node = self.nodes.remove(index);

        let (detached_edges, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|e| e.source == node_id || e.target == node_id);
        self.edges = kept;

        Ok(NodeRemoval {
            node,
            detached_edges,
        })
    }

    /// Add a directed edge with the editor's default display options.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<&TimelineEdge, GraphError> {
        self.connect_with(source, target, EdgeOptions::default())
    }

    /// Add a directed edge between two existing nodes.
    ///
    /// Parallel edges between the same ordered pair are allowed; each gets
    /// its own id. On error the graph is unchanged.
    pub fn connect_with(
        &mut self,
        source: &str,
        target: &str,
        options: EdgeOptions,
    ) -> Result<&TimelineEdge, GraphError> {
        for endpoint in [source, target] {
            if !self.contains_node(endpoint) {
                return Err(GraphError::DanglingEndpoint {
                    source_id: source.to_string(),
                    target_id: target.to_string(),
                    missing: endpoint.to_string(),
                });
            }
        }

        let id = self.generate_edge_id(source, target);
        self.edges.push(TimelineEdge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            edge_type: Some(
                options
                    .edge_type
                    .unwrap_or_else(|| DEFAULT_EDGE_TYPE.to_string()),
            ),
            label: options.label,
            animated: Some(options.animated.unwrap_or(true)),
        });
        Ok(&self.edges[self.edges.len() - 1])
    }

    fn generate_edge_id(&self, source: &str, target: &str) -> String {
        let base = format!("e{source}-{target}");
        if !self.contains_edge(&base) {
            return base;
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.contains_edge(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> Result<TimelineEdge, GraphError> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?;
        Ok(self.edges.remove(index))
    }

    /// Move a node. Edges are not touched.
    pub fn update_node_position(
        &mut self,
        node_id: &str,
        position: NodePosition,
    ) -> Result<(), GraphError> {
        ensure_finite(position)?;
        self.node_mut(node_id)?.position = position;
        Ok(())
    }

    pub fn update_node_data(
        &mut self,
        node_id: &str,
        patch: NodeDataPatch,
    ) -> Result<&TimelineNode, GraphError> {
        let node = self.node_mut(node_id)?;
        patch.apply(&mut node.data);
        Ok(&*node)
    }

    // -- Persistence --------------------------------------------------------

    /// Produce the `{nodes, edges}` payload, omitting any edge whose
    /// endpoints are not both present.
    pub fn serialize(&self) -> GraphPayload {
        let node_ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| node_ids.contains(e.source.as_str()) && node_ids.contains(e.target.as_str()))
            .cloned()
            .collect();

        GraphPayload {
            nodes: self.nodes.clone(),
            edges,
        }
    }

    /// Load a persisted payload, silently dropping entries that break the
    /// graph's invariants.
    pub fn deserialize(payload: GraphPayload) -> Self {
        Self::load_lenient(payload).0
    }

    /// Like [`deserialize`](Self::deserialize), also reporting what was
    /// dropped. Duplicate ids keep their first occurrence; nodes with
    /// non-finite coordinates and edges with a missing endpoint are skipped.
    pub fn load_lenient(payload: GraphPayload) -> (Self, LoadReport) {
        let mut report = LoadReport::default();

        let mut node_ids = HashSet::new();
        let mut nodes = Vec::with_capacity(payload.nodes.len());
        for node in payload.nodes {
            if node.position.is_finite() && node_ids.insert(node.id.clone()) {
                nodes.push(node);
            } else {
                report.dropped_nodes += 1;
            }
        }

        let mut edge_ids = HashSet::new();
        let mut edges = Vec::with_capacity(payload.edges.len());
        for edge in payload.edges {
            let attached = node_ids.contains(&edge.source) && node_ids.contains(&edge.target);
            if attached && edge_ids.insert(edge.id.clone()) {
                edges.push(edge);
            } else {
                report.dropped_edges += 1;
            }
        }

        (Self::from_parts(nodes, edges), report)
    }

    /// Build a graph from client-supplied collections, rejecting anything
    /// that [`load_lenient`](Self::load_lenient) would have dropped.
    pub fn from_payload_strict(payload: GraphPayload) -> Result<Self, GraphError> {
        validate_payload(&payload)?;
        Ok(Self::from_parts(payload.nodes, payload.edges))
    }

    fn from_parts(nodes: Vec<TimelineNode>, edges: Vec<TimelineEdge>) -> Self {
        let next_node_seq = nodes
            .iter()
            .filter_map(|n| n.id.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max.saturating_add(1));
        Self {
            nodes,
            edges,
            next_node_seq,
        }
    }
}

fn validate_payload(payload: &GraphPayload) -> Result<(), GraphError> {
    let mut node_ids = HashSet::new();
    for node in &payload.nodes {
        ensure_finite(node.position)?;
        if !node_ids.insert(node.id.as_str()) {
            return Err(GraphError::DuplicateNodeId(node.id.clone()));
        }
    }

    let mut edge_ids = HashSet::new();
    for edge in &payload.edges {
        if !edge_ids.insert(edge.id.as_str()) {
            return Err(GraphError::DuplicateEdgeId(edge.id.clone()));
        }
        for endpoint in [&edge.source, &edge.target] {
            if !node_ids.contains(endpoint.as_str()) {
                return Err(GraphError::DanglingEndpoint {
                    source_id: edge.source.clone(),
                    target_id: edge.target.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Event references
// ---------------------------------------------------------------------------

/// `(node_id, event_id)` pairs for every node that references an event.
pub fn event_links(nodes: &[TimelineNode]) -> Vec<(&str, DbId)> {
    nodes
        .iter()
        .filter_map(|n| n.data.event_id.map(|event_id| (n.id.as_str(), event_id)))
        .collect()
}

/// Distinct event ids referenced by `nodes`, ascending.
pub fn referenced_event_ids(nodes: &[TimelineNode]) -> Vec<DbId> {
    let mut ids: Vec<DbId> = nodes.iter().filter_map(|n| n.data.event_id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn node(id: &str, label: &str) -> TimelineNode {
        TimelineNode {
            id: id.to_string(),
            node_type: EVENT_NODE_TYPE.to_string(),
            position: NodePosition::new(0.0, 0.0),
            data: NodeData::labelled(label),
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> TimelineEdge {
        TimelineEdge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            edge_type: None,
            label: None,
            animated: None,
        }
    }

    fn two_node_graph() -> TimelineGraph {
        TimelineGraph::deserialize(GraphPayload {
            nodes: vec![node("1", "a"), node("2", "b")],
            edges: vec![edge("e1-2", "1", "2")],
        })
    }

    fn assert_referentially_valid(payload: &GraphPayload) {
        let ids: HashSet<&str> = payload.nodes.iter().map(|n| n.id.as_str()).collect();
        for e in &payload.edges {
            assert!(ids.contains(e.source.as_str()), "dangling source in {e:?}");
            assert!(ids.contains(e.target.as_str()), "dangling target in {e:?}");
        }
    }

    // -- add_node -----------------------------------------------------------

    #[test]
    fn add_node_generates_sequential_ids() {
        let mut graph = TimelineGraph::new();
        let first = graph.add_node(NewNode::default()).unwrap().id.clone();
        let second = graph.add_node(NewNode::default()).unwrap().id.clone();
        assert_eq!(first, "1");
        assert_eq!(second, "2");
    }

    #[test]
    fn add_node_stacks_default_positions() {
        let mut graph = TimelineGraph::new();
        graph.add_node(NewNode::default()).unwrap();
        let second = graph.add_node(NewNode::default()).unwrap();
        assert_eq!(second.position, NodePosition::new(100.0, 200.0));
        assert_eq!(second.data.label, DEFAULT_NODE_LABEL);
        assert_eq!(second.node_type, EVENT_NODE_TYPE);
    }

    #[test]
    fn add_node_does_not_reuse_removed_ids() {
        let mut graph = two_node_graph();
        graph.remove_node("2").unwrap();
        let added = graph.add_node(NewNode::default()).unwrap();
        assert_eq!(added.id, "3");
    }

    #[test]
    fn add_node_skips_ids_taken_by_loaded_nodes() {
        let mut graph = TimelineGraph::deserialize(GraphPayload {
            nodes: vec![node("1", "a"), node("custom", "b"), node("7", "c")],
            edges: vec![],
        });
        let added = graph.add_node(NewNode::default()).unwrap();
        assert_eq!(added.id, "8");
    }

    #[test]
    fn add_node_after_max_numeric_id_falls_back_to_free_id() {
        let max_id = u64::MAX.to_string();
        let mut graph = TimelineGraph::deserialize(GraphPayload {
            nodes: vec![node(&max_id, "far future"), node("1", "a")],
            edges: vec![],
        });

        let first = graph.add_node(NewNode::default()).unwrap().id.clone();
        let second = graph.add_node(NewNode::default()).unwrap().id.clone();

        assert_eq!(first, "2");
        assert_eq!(second, "3");
        assert!(graph.contains_node(&max_id));
        assert_eq!(graph.nodes().len(), 4);
    }

    #[test]
    fn add_node_keeps_supplied_position_and_data() {
        let mut graph = TimelineGraph::new();
        let added = graph
            .add_node(NewNode {
                position: Some(NodePosition::new(300.0, 40.5)),
                data: Some(NodeData {
                    label: "官渡之战".to_string(),
                    event_id: Some(3),
                    date: Some("200年".to_string()),
                    description: None,
                }),
            })
            .unwrap();
        assert_eq!(added.position, NodePosition::new(300.0, 40.5));
        assert_eq!(added.data.event_id, Some(3));
    }

    #[test]
    fn add_node_rejects_non_finite_position() {
        let mut graph = TimelineGraph::new();
        let result = graph.add_node(NewNode {
            position: Some(NodePosition::new(f64::NAN, 0.0)),
            data: None,
        });
        assert_matches!(result, Err(GraphError::NonFinitePosition { .. }));
        assert!(graph.nodes().is_empty());
    }

    #[test]
    fn starter_graph_has_single_node_one() {
        let graph = TimelineGraph::starter();
        assert_eq!(graph.nodes().len(), 1);
        assert_eq!(graph.nodes()[0].id, "1");
        assert!(graph.edges().is_empty());
    }

    // -- remove_node --------------------------------------------------------

    #[test]
    fn remove_node_cascades_to_edges() {
        let mut graph = two_node_graph();
        let removal = graph.remove_node("1").unwrap();
        assert_eq!(removal.node.id, "1");
        assert_eq!(removal.detached_edges.len(), 1);
        assert!(graph.edges().is_empty());
        assert!(graph.serialize().edges.is_empty());
    }

    #[test]
    fn remove_node_keeps_unrelated_edges() {
        let mut graph = TimelineGraph::new();
        for _ in 0..3 {
            graph.add_node(NewNode::default()).unwrap();
        }
        graph.connect("1", "2").unwrap();
        graph.connect("2", "3").unwrap();
        graph.connect("3", "1").unwrap();

        graph.remove_node("1").unwrap();

        let payload = graph.serialize();
        assert_eq!(payload.edges.len(), 1);
        assert_eq!(payload.edges[0].source, "2");
        assert!(payload.edges.iter().all(|e| e.source != "1" && e.target != "1"));
    }

    #[test]
    fn remove_unknown_node_is_not_found() {
        let mut graph = two_node_graph();
        assert_eq!(
            graph.remove_node("9").unwrap_err(),
            GraphError::NodeNotFound("9".to_string())
        );
        assert_eq!(graph.nodes().len(), 2);
    }

    // -- connect ------------------------------------------------------------

    #[test]
    fn connect_to_missing_node_is_rejected_and_graph_unchanged() {
        let mut graph = TimelineGraph::deserialize(GraphPayload {
            nodes: vec![node("1", "黄巾起义")],
            edges: vec![],
        });
        let before = graph.serialize();

        let err = graph.connect("1", "2").unwrap_err();

        assert_matches!(err, GraphError::DanglingEndpoint { ref missing, .. } if missing == "2");
        assert_eq!(graph.serialize(), before);
    }

    #[test]
    fn connect_from_missing_node_is_rejected() {
        let mut graph = two_node_graph();
        assert_matches!(
            graph.connect("x", "2"),
            Err(GraphError::DanglingEndpoint { ref missing, .. }) if missing == "x"
        );
    }

    #[test]
    fn connect_applies_editor_defaults() {
        let mut graph = two_node_graph();
        graph.remove_edge("e1-2").unwrap();
        let edge = graph.connect("1", "2").unwrap();
        assert_eq!(edge.id, "e1-2");
        assert_eq!(edge.edge_type.as_deref(), Some(DEFAULT_EDGE_TYPE));
        assert_eq!(edge.animated, Some(true));
    }

    #[test]
    fn connect_with_overrides_display_options() {
        let mut graph = two_node_graph();
        let edge = graph
            .connect_with(
                "2",
                "1",
                EdgeOptions {
                    label: Some("flashback".to_string()),
                    edge_type: Some("straight".to_string()),
                    animated: Some(false),
                },
            )
            .unwrap();
        assert_eq!(edge.label.as_deref(), Some("flashback"));
        assert_eq!(edge.edge_type.as_deref(), Some("straight"));
        assert_eq!(edge.animated, Some(false));
    }

    #[test]
    fn parallel_edges_are_permitted_with_distinct_ids() {
        let mut graph = two_node_graph();
        let second = graph.connect("1", "2").unwrap().id.clone();
        let third = graph.connect("1", "2").unwrap().id.clone();
        assert_eq!(second, "e1-2-2");
        assert_eq!(third, "e1-2-3");
        assert_eq!(graph.edges().len(), 3);
    }

    // -- remove_edge / updates ----------------------------------------------

    #[test]
    fn remove_edge_leaves_nodes() {
        let mut graph = two_node_graph();
        let removed = graph.remove_edge("e1-2").unwrap();
        assert_eq!(removed.source, "1");
        assert_eq!(graph.nodes().len(), 2);
        assert_matches!(graph.remove_edge("e1-2"), Err(GraphError::EdgeNotFound(_)));
    }

    #[test]
    fn update_node_position_only_moves_node() {
        let mut graph = two_node_graph();
        let edges_before = graph.edges().to_vec();
        graph
            .update_node_position("2", NodePosition::new(500.0, 100.0))
            .unwrap();
        assert_eq!(
            graph.node("2").unwrap().position,
            NodePosition::new(500.0, 100.0)
        );
        assert_eq!(graph.edges(), edges_before.as_slice());
    }

    #[test]
    fn update_node_position_unknown_node() {
        let mut graph = two_node_graph();
        assert_matches!(
            graph.update_node_position("9", NodePosition::new(1.0, 1.0)),
            Err(GraphError::NodeNotFound(_))
        );
    }

    #[test]
    fn update_node_data_sets_and_clears_fields() {
        let mut graph = two_node_graph();
        let patch: NodeDataPatch = serde_json::from_value(serde_json::json!({
            "label": "董卓进京",
            "date": "189年",
            "event_id": 2
        }))
        .unwrap();
        graph.update_node_data("2", patch).unwrap();
        let data = &graph.node("2").unwrap().data;
        assert_eq!(data.label, "董卓进京");
        assert_eq!(data.date.as_deref(), Some("189年"));
        assert_eq!(data.event_id, Some(2));

        let clear: NodeDataPatch =
            serde_json::from_value(serde_json::json!({ "date": null })).unwrap();
        graph.update_node_data("2", clear).unwrap();
        let data = &graph.node("2").unwrap().data;
        assert_eq!(data.date, None);
        assert_eq!(data.event_id, Some(2));
        assert_eq!(data.label, "董卓进京");
    }

    // -- serialize / deserialize --------------------------------------------

    #[test]
    fn serialize_filters_edges_with_missing_endpoints() {
        let graph = TimelineGraph {
            nodes: vec![node("1", "a")],
            edges: vec![edge("e1-2", "1", "2"), edge("e1-1", "1", "1")],
            next_node_seq: 2,
        };
        let payload = graph.serialize();
        assert_eq!(payload.edges.len(), 1);
        assert_eq!(payload.edges[0].id, "e1-1");
        assert_referentially_valid(&payload);
    }

    #[test]
    fn serialize_is_referentially_valid_after_mixed_edits() {
        let mut graph = TimelineGraph::starter();
        for _ in 0..4 {
            graph.add_node(NewNode::default()).unwrap();
        }
        graph.connect("1", "2").unwrap();
        graph.connect("2", "3").unwrap();
        graph.connect("3", "4").unwrap();
        graph.connect("4", "5").unwrap();
        graph.connect("5", "2").unwrap();
        graph.remove_node("3").unwrap();
        graph.connect("2", "4").unwrap();
        graph.remove_node("5").unwrap();

        let payload = graph.serialize();
        assert_referentially_valid(&payload);
        assert_eq!(payload.nodes.len(), 3);
    }

    #[test]
    fn deserialize_drops_dangling_edges() {
        let (graph, report) = TimelineGraph::load_lenient(GraphPayload {
            nodes: vec![node("1", "a"), node("2", "b")],
            edges: vec![edge("e1-2", "1", "2"), edge("e2-3", "2", "3")],
        });
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(
            report,
            LoadReport {
                dropped_nodes: 0,
                dropped_edges: 1
            }
        );
    }

    #[test]
    fn deserialize_keeps_first_of_duplicate_ids() {
        let (graph, report) = TimelineGraph::load_lenient(GraphPayload {
            nodes: vec![node("1", "first"), node("1", "second")],
            edges: vec![edge("e", "1", "1"), edge("e", "1", "1")],
        });
        assert_eq!(graph.nodes().len(), 1);
        assert_eq!(graph.node("1").unwrap().data.label, "first");
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(report.dropped_nodes, 1);
        assert_eq!(report.dropped_edges, 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn round_trip_preserves_nodes_and_valid_edges() {
        let mut graph = TimelineGraph {
            nodes: vec![node("1", "a"), node("2", "b"), node("3", "c")],
            edges: vec![edge("e1-2", "1", "2"), edge("bad", "1", "9")],
            next_node_seq: 4,
        };
        graph.connect("2", "3").unwrap();

        let restored = TimelineGraph::deserialize(graph.serialize());

        assert_eq!(restored.nodes(), graph.nodes());
        let ids: Vec<&str> = restored.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1-2", "e2-3"]);
    }

    #[test]
    fn strict_load_rejects_dangling_edge() {
        let result = TimelineGraph::from_payload_strict(GraphPayload {
            nodes: vec![node("1", "a")],
            edges: vec![edge("e1-2", "1", "2")],
        });
        assert_matches!(result, Err(GraphError::DanglingEndpoint { ref missing, .. }) if missing == "2");
    }

    #[test]
    fn strict_load_rejects_duplicate_ids() {
        let dup_nodes = TimelineGraph::from_payload_strict(GraphPayload {
            nodes: vec![node("1", "a"), node("1", "b")],
            edges: vec![],
        });
        assert_matches!(dup_nodes, Err(GraphError::DuplicateNodeId(_)));

        let dup_edges = TimelineGraph::from_payload_strict(GraphPayload {
            nodes: vec![node("1", "a")],
            edges: vec![edge("e", "1", "1"), edge("e", "1", "1")],
        });
        assert_matches!(dup_edges, Err(GraphError::DuplicateEdgeId(_)));
    }

    #[test]
    fn strict_load_accepts_valid_payload() {
        let graph = TimelineGraph::from_payload_strict(GraphPayload {
            nodes: vec![node("1", "a"), node("2", "b")],
            edges: vec![edge("e1-2", "1", "2")],
        })
        .unwrap();
        assert_eq!(graph.edges().len(), 1);
    }

    // -- wire format --------------------------------------------------------

    #[test]
    fn node_json_shape_omits_absent_optionals() {
        let json = serde_json::to_value(node("1", "黄巾起义")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "1",
                "type": "event",
                "position": { "x": 0.0, "y": 0.0 },
                "data": { "label": "黄巾起义" }
            })
        );
    }

    #[test]
    fn edge_json_uses_type_key() {
        let mut graph = two_node_graph();
        graph.remove_edge("e1-2").unwrap();
        let edge = graph.connect("1", "2").unwrap();
        let json = serde_json::to_value(edge).unwrap();
        assert_eq!(json["type"], "smoothstep");
        assert_eq!(json["animated"], true);
        assert!(json.get("label").is_none());
    }

    // -- error mapping ------------------------------------------------------

    #[test]
    fn graph_errors_map_to_core_taxonomy() {
        assert_matches!(
            CoreError::from(GraphError::NodeNotFound("1".into())),
            CoreError::GraphMemberNotFound { entity: "Node", .. }
        );
        assert_matches!(
            CoreError::from(GraphError::DanglingEndpoint {
                source_id: "1".into(),
                target_id: "2".into(),
                missing: "2".into(),
            }),
            CoreError::ReferentialViolation(_)
        );
        assert_matches!(
            CoreError::from(GraphError::DuplicateEdgeId("e".into())),
            CoreError::Validation(_)
        );
    }

    // -- event references ---------------------------------------------------

    #[test]
    fn event_references_are_collected() {
        let mut a = node("1", "a");
        a.data.event_id = Some(5);
        let mut b = node("2", "b");
        b.data.event_id = Some(3);
        let mut c = node("3", "c");
        c.data.event_id = Some(5);
        let nodes = vec![a, b, c, node("4", "d")];

        assert_eq!(event_links(&nodes), vec![("1", 5), ("2", 3), ("3", 5)]);
        assert_eq!(referenced_event_ids(&nodes), vec![3, 5]);
    }
}
