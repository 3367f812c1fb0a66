//! Sample timelines served only when demo mode is switched on.
//!
//! Responses built from this data are always flagged `demo: true` by the
//! API; nothing here is ever substituted silently for stored data.

use chrono::TimeZone;

use crate::timeline_graph::{
    GraphPayload, NodeData, NodePosition, TimelineEdge, TimelineNode, DEFAULT_EDGE_TYPE,
    EVENT_NODE_TYPE,
};
use crate::types::{DbId, Timestamp};

/// A sample timeline in the same shape as a stored one.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTimeline {
    pub id: DbId,
    pub novel_id: DbId,
    pub title: String,
    pub description: String,
    pub graph: GraphPayload,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// `(id, label, event_id, date, description)` per node, laid out left to
/// right and chained with animated edges.
type SampleNode = (&'static str, &'static str, DbId, &'static str, &'static str);

const THREE_KINGDOMS: &[SampleNode] = &[
    ("1", "黄巾起义", 1, "184年", "张角率领黄巾军起义"),
    ("2", "董卓进京", 2, "189年", "董卓率军进京，掌控朝政"),
    ("3", "官渡之战", 3, "200年", "曹操大败袁绍于官渡"),
];

const WATER_MARGIN: &[SampleNode] = &[
    ("1", "鲁提辖拳打镇关西", 4, "宋朝", "鲁达为民除害，打死镇关西"),
    ("2", "林冲风雪山神庙", 5, "宋朝", "林冲被发配沧州，途中风雪山神庙"),
];

fn chain(nodes: &[SampleNode]) -> GraphPayload {
    let nodes: Vec<TimelineNode> = nodes
        .iter()
        .enumerate()
        .map(|(i, &(id, label, event_id, when, description))| TimelineNode {
            id: id.to_string(),
            node_type: EVENT_NODE_TYPE.to_string(),
            position: NodePosition::new(100.0 + 200.0 * i as f64, 100.0),
            data: NodeData {
                label: label.to_string(),
                event_id: Some(event_id),
                date: Some(when.to_string()),
                description: Some(description.to_string()),
            },
        })
        .collect();

    let edges = nodes
        .windows(2)
        .map(|pair| TimelineEdge {
            id: format!("e{}-{}", pair[0].id, pair[1].id),
            source: pair[0].id.clone(),
            target: pair[1].id.clone(),
            edge_type: Some(DEFAULT_EDGE_TYPE.to_string()),
            label: None,
            animated: Some(true),
        })
        .collect();

    GraphPayload { nodes, edges }
}

fn date(year: i32, month: u32) -> Timestamp {
    chrono::Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Every sample timeline, across all sample novels.
pub fn all_sample_timelines() -> Vec<SampleTimeline> {
    vec![
        SampleTimeline {
            id: 1,
            novel_id: 1,
            title: "三国演义主要事件".to_string(),
            description: "三国演义的主要历史事件时间线".to_string(),
            graph: chain(THREE_KINGDOMS),
            created_at: date(2023, 1),
            updated_at: date(2023, 1),
        },
        SampleTimeline {
            id: 2,
            novel_id: 2,
            title: "水浒传主要事件".to_string(),
            description: "水浒传的主要历史事件时间线".to_string(),
            graph: chain(WATER_MARGIN),
            created_at: date(2023, 2),
            updated_at: date(2023, 2),
        },
    ]
}

/// Sample timelines belonging to `novel_id`; empty for unknown novels.
pub fn sample_timelines(novel_id: DbId) -> Vec<SampleTimeline> {
    all_sample_timelines()
        .into_iter()
        .filter(|t| t.novel_id == novel_id)
        .collect()
}
