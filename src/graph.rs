//! Typed topology graph and its builder.
//!
//! The graph owns its adjacency structure: nodes live in an arena indexed
//! by `usize` with a name-to-index map for identity lookup, and edges sit
//! in a `BTreeMap` keyed by the sorted index pair. The key shape gives
//! de-duplication of internal edges and deterministic iteration for free.

use log::warn;
use std::collections::{BTreeMap, HashMap};

use crate::inventory::{GlobalVars, OspfCost, Router};

/// Errors raised while building the topology graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Duplicate router hostname '{0}' in inventory")]
    DuplicateRouter(String),
    /// Two peers resolved to the same `name_asn` identity. The source
    /// inventory must disambiguate them; merging would silently attach
    /// both sessions to one node.
    #[error("Duplicate peer identity '{0}'")]
    DuplicatePeer(String),
}

/// Classification of a graph node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Router {
        loopback: String,
        coordinates: Option<(f64, f64)>,
        logical_position: Option<(f64, f64)>,
    },
    Dn42Peer {
        country: String,
        latency_us: u64,
    },
    BgpPeer {
        peer_type: String,
        remote_as: u32,
    },
}

/// A node in the topology graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Identity: hostname for routers, `name_asn` for peers.
    pub name: String,
    pub kind: NodeKind,
}

impl Node {
    pub fn is_router(&self) -> bool {
        matches!(self.kind, NodeKind::Router { .. })
    }
}

/// Classification of an undirected edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeKind {
    /// Router-to-router tunnel carrying the internal mesh.
    Internal { ospf_cost: Option<OspfCost> },
    /// Router-to-peer session.
    External,
}

/// The typed topology graph: node arena plus sorted-pair edge map.
#[derive(Debug, Default)]
pub struct TopologyGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    edges: BTreeMap<(usize, usize), EdgeKind>,
    /// Network-wide flag; affects internal edge label text only.
    pub segment_routing: bool,
}

impl TopologyGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (usize, &Node)> {
        self.nodes.iter().enumerate()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Edges in deterministic (sorted index pair) order.
    pub fn edges(&self) -> impl Iterator<Item = ((usize, usize), &EdgeKind)> {
        self.edges.iter().map(|(&pair, kind)| (pair, kind))
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.edges.contains_key(&sorted_pair(a, b))
    }

    /// Peer nodes attached to `router` by an external edge, ascending by index.
    pub fn attached_peers(&self, router: usize) -> Vec<usize> {
        self.edges
            .iter()
            .filter(|(_, kind)| matches!(kind, EdgeKind::External))
            .filter_map(|(&(a, b), _)| {
                if a == router {
                    Some(b)
                } else if b == router {
                    Some(a)
                } else {
                    None
                }
            })
            .collect()
    }

    fn add_node(&mut self, node: Node) -> Result<usize, GraphError> {
        if self.index.contains_key(&node.name) {
            return Err(match node.kind {
                NodeKind::Router { .. } => GraphError::DuplicateRouter(node.name),
                _ => GraphError::DuplicatePeer(node.name),
            });
        }
        let index = self.nodes.len();
        self.index.insert(node.name.clone(), index);
        self.nodes.push(node);
        Ok(index)
    }

    /// Insert an edge between two existing nodes. A pair already present
    /// keeps its first descriptor; the duplicate is dropped.
    fn add_edge(&mut self, a: usize, b: usize, kind: EdgeKind) {
        self.edges.entry(sorted_pair(a, b)).or_insert(kind);
    }
}

fn sorted_pair(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Options controlling graph construction.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Include peer nodes and their external edges. The world-map mode
    /// builds without them; it depicts only the internal mesh.
    pub include_peers: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            include_peers: true,
        }
    }
}

/// Build the typed graph from the inventory model in one pass.
///
/// Routers become router nodes; every tunnel descriptor naming two known
/// routers becomes one internal edge (de-duplicated across pair order);
/// every peer entry becomes one peer node plus one external edge.
/// Malformed or dangling tunnel descriptors are skipped with a warning.
/// Peer identity collisions abort the build.
pub fn build_graph(
    routers: &[Router],
    global: &GlobalVars,
    options: &BuildOptions,
) -> Result<TopologyGraph, GraphError> {
    let mut graph = TopologyGraph {
        segment_routing: global.segment_routing_enabled,
        ..TopologyGraph::default()
    };

    for router in routers {
        graph.add_node(Node {
            name: router.hostname.clone(),
            kind: NodeKind::Router {
                loopback: router.loopback.clone(),
                coordinates: router.coordinates.map(|c| (c.longitude, c.latitude)),
                logical_position: router.logical_position.map(|p| (p.x, p.y)),
            },
        })?;
    }

    for tunnel in &global.intra_network_tunnels {
        if tunnel.routers.len() != 2 {
            warn!(
                "Skipping tunnel descriptor with {} router references (expected 2)",
                tunnel.routers.len()
            );
            continue;
        }
        let (name_a, name_b) = (&tunnel.routers[0], &tunnel.routers[1]);
        match (graph.index_of(name_a), graph.index_of(name_b)) {
            (Some(a), Some(b)) => {
                graph.add_edge(
                    a,
                    b,
                    EdgeKind::Internal {
                        ospf_cost: tunnel.ospf_cost.clone(),
                    },
                );
            }
            _ => {
                warn!(
                    "Skipping tunnel '{}' <-> '{}': unknown router reference",
                    name_a, name_b
                );
            }
        }
    }

    if options.include_peers {
        for router in routers {
            let router_index = graph
                .index_of(&router.hostname)
                .expect("router was added above");

            for peer in router.dn42_peers() {
                let peer_index = graph.add_node(Node {
                    name: format!("{}_{}", peer.name, peer.asn),
                    kind: NodeKind::Dn42Peer {
                        country: peer.iso_3166_country_code.clone(),
                        latency_us: peer.latency_us,
                    },
                })?;
                graph.add_edge(router_index, peer_index, EdgeKind::External);
            }

            for peer in router.other_peers() {
                let peer_index = graph.add_node(Node {
                    name: format!("{}_{}", peer.name, peer.remote_as),
                    kind: NodeKind::BgpPeer {
                        peer_type: peer.peer_type.clone(),
                        remote_as: peer.remote_as,
                    },
                })?;
                graph.add_edge(router_index, peer_index, EdgeKind::External);
            }
        }
    }

    Ok(graph)
}
