//! Diagram assembly.
//!
//! Merges the topology graph, its classification and a layout into a
//! render-ready description: per-node position, color class, shape, size
//! and label; per-edge style, width, label and label position. Pure data
//! transform; the render module draws from it, and the whole structure
//! serializes for the JSON dump.

use serde::Serialize;

use crate::graph::{EdgeKind, NodeKind, TopologyGraph};
use crate::inventory::OspfCost;
use crate::layout::{Layout, Point};

/// Color classification of a node. The renderer maps classes to an
/// actual palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    Router,
    Dn42Peer,
    BgpPeer,
}

/// Node glyph shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeShape {
    Circle,
}

/// Edge stroke style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    Solid,
    Dashed,
}

/// A render-ready node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSpec {
    pub id: String,
    pub position: Point,
    pub class: NodeClass,
    pub shape: NodeShape,
    pub size: f64,
    pub label: String,
}

/// A render-ready undirected edge.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeSpec {
    pub endpoints: (String, String),
    pub style: EdgeStyle,
    pub width: f64,
    pub label: String,
    /// Fractional position of the label along the edge, 0.5 = midpoint.
    pub label_position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ospf_cost: Option<OspfCost>,
}

/// The assembled, render-ready diagram.
#[derive(Debug, Clone, Serialize)]
pub struct Diagram {
    pub title: String,
    pub nodes: Vec<NodeSpec>,
    pub edges: Vec<EdgeSpec>,
}

impl Diagram {
    /// Position of a node by identity, if present.
    pub fn node_position(&self, id: &str) -> Option<Point> {
        self.nodes
            .iter()
            .find(|node| node.id == id)
            .map(|node| node.position)
    }

    /// Where an edge's label sits, interpolated along its endpoints.
    pub fn edge_label_point(&self, edge: &EdgeSpec) -> Option<Point> {
        let a = self.node_position(&edge.endpoints.0)?;
        let b = self.node_position(&edge.endpoints.1)?;
        Some(a.lerp(b, edge.label_position))
    }
}

/// Assembly inputs that are configuration, not inventory.
#[derive(Debug, Clone)]
pub struct DiagramOptions {
    /// The network's own ASN, rendered into every router label.
    pub local_asn: u32,
    pub title: String,
}

const NODE_SIZE: f64 = 4500.0;
const INTERNAL_EDGE_WIDTH: f64 = 3.0;
const EXTERNAL_EDGE_WIDTH: f64 = 2.0;

/// Fractional label positions for internal edges whose midpoint labels
/// collide, keyed by unordered hostname-prefix pair. Data, not code.
const EDGE_LABEL_OFFSETS: &[((&str, &str), f64)] = &[
    (("de-fra", "de-ber"), 0.35),
    (("de-fra", "nl-ams"), 0.65),
];

fn internal_label_position(a: &str, b: &str) -> f64 {
    EDGE_LABEL_OFFSETS
        .iter()
        .find(|((pa, pb), _)| {
            (a.starts_with(pa) && b.starts_with(pb)) || (a.starts_with(pb) && b.starts_with(pa))
        })
        .map(|&(_, fraction)| fraction)
        .unwrap_or(0.5)
}

/// Merge graph, classification and layout into a render-ready diagram.
pub fn assemble(graph: &TopologyGraph, layout: &Layout, options: &DiagramOptions) -> Diagram {
    let protocol_suffix = if graph.segment_routing { "+SR" } else { "" };

    let nodes = graph
        .nodes()
        .map(|(index, node)| {
            let (class, label) = match &node.kind {
                NodeKind::Router { loopback, .. } => (
                    NodeClass::Router,
                    format!("{}\n{}\nAS{}", node.name, loopback, options.local_asn),
                ),
                NodeKind::Dn42Peer {
                    country,
                    latency_us: _,
                } => {
                    // Peer identity is "name_asn"; the label shows the parts.
                    let (name, asn) = split_peer_identity(&node.name);
                    (
                        NodeClass::Dn42Peer,
                        format!("{}\nAS{}\n{}", name, asn, country),
                    )
                }
                NodeKind::BgpPeer {
                    peer_type,
                    remote_as,
                } => {
                    let (name, _) = split_peer_identity(&node.name);
                    (
                        NodeClass::BgpPeer,
                        format!("{}\nAS{}\n{}", name, remote_as, peer_type),
                    )
                }
            };
            NodeSpec {
                id: node.name.clone(),
                position: layout.get(index),
                class,
                shape: NodeShape::Circle,
                size: NODE_SIZE,
                label,
            }
        })
        .collect();

    let edges = graph
        .edges()
        .map(|((a, b), kind)| {
            let node_a = graph.node(a);
            let node_b = graph.node(b);
            match kind {
                EdgeKind::Internal { ospf_cost } => EdgeSpec {
                    endpoints: (node_a.name.clone(), node_b.name.clone()),
                    style: EdgeStyle::Solid,
                    width: INTERNAL_EDGE_WIDTH,
                    label: format!("iBGP+OSPF{}\nWireGuard", protocol_suffix),
                    label_position: internal_label_position(&node_a.name, &node_b.name),
                    ospf_cost: ospf_cost.clone(),
                },
                EdgeKind::External => {
                    let peer = if node_a.is_router() { node_b } else { node_a };
                    let label = match &peer.kind {
                        NodeKind::Dn42Peer { latency_us, .. } => {
                            format!("{:.1}ms\nWireGuard", *latency_us as f64 / 1000.0)
                        }
                        _ => "BGP".to_string(),
                    };
                    EdgeSpec {
                        endpoints: (node_a.name.clone(), node_b.name.clone()),
                        style: EdgeStyle::Dashed,
                        width: EXTERNAL_EDGE_WIDTH,
                        label,
                        label_position: 0.5,
                        ospf_cost: None,
                    }
                }
            }
        })
        .collect();

    Diagram {
        title: options.title.clone(),
        nodes,
        edges,
    }
}

/// Split a `name_asn` identity back into its parts. The ASN is the part
/// after the last underscore; names may themselves contain underscores.
fn split_peer_identity(id: &str) -> (&str, &str) {
    match id.rsplit_once('_') {
        Some((name, asn)) => (name, asn),
        None => (id, ""),
    }
}
