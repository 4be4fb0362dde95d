//! Force-directed layout with radial peer adjustment.
//!
//! Fruchterman-Reingold: edges attract, all node pairs repel, per-round
//! displacement is capped by a linearly cooling temperature. The initial
//! placement comes from a seeded RNG so identical graphs produce
//! bit-for-bit identical layouts across runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Layout, Point};
use crate::graph::{EdgeKind, NodeKind, TopologyGraph};

/// Non-DN42 peers sit close to their router.
const BGP_PEER_FACTOR: f64 = 0.4;
/// DN42 peers are pushed further out.
const DN42_PEER_FACTOR: f64 = 1.3;

/// Minimum pair distance used in force computation, to keep coincident
/// nodes from producing unbounded repulsion.
const MIN_DISTANCE: f64 = 0.01;

/// Parameters for the force-directed layout.
#[derive(Debug, Clone)]
pub struct SpringOptions {
    /// Optimal edge length in layout space.
    pub optimal_distance: f64,
    pub iterations: usize,
    pub seed: u64,
}

impl Default for SpringOptions {
    fn default() -> Self {
        Self {
            optimal_distance: 2.0,
            iterations: 50,
            seed: 42,
        }
    }
}

/// Run the force-directed layout over all nodes of the graph.
///
/// The result is rescaled so positions are centered on the origin with a
/// maximum absolute coordinate of 1.
pub fn spring_layout(graph: &TopologyGraph, options: &SpringOptions) -> Layout {
    let node_count = graph.node_count();
    let mut layout = Layout::with_default(node_count);
    if node_count == 0 {
        return layout;
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut positions: Vec<Point> = (0..node_count)
        .map(|_| Point::new(rng.gen::<f64>(), rng.gen::<f64>()))
        .collect();

    if node_count == 1 {
        layout.set(0, Point::ORIGIN);
        return layout;
    }

    let edges: Vec<(usize, usize)> = graph.edges().map(|(pair, _)| pair).collect();
    let k = options.optimal_distance;

    // Initial temperature is a tenth of the unit starting domain, cooled
    // linearly to zero over the iteration budget.
    let mut temperature = 0.1;
    let cooling = temperature / (options.iterations as f64 + 1.0);

    for _ in 0..options.iterations {
        let mut displacement = vec![Point::ORIGIN; node_count];

        // Repulsion between every node pair
        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let dx = positions[i].x - positions[j].x;
                let dy = positions[i].y - positions[j].y;
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                let force = k * k / distance;
                let (fx, fy) = (dx / distance * force, dy / distance * force);
                displacement[i].x += fx;
                displacement[i].y += fy;
                displacement[j].x -= fx;
                displacement[j].y -= fy;
            }
        }

        // Attraction along edges
        for &(a, b) in &edges {
            let dx = positions[a].x - positions[b].x;
            let dy = positions[a].y - positions[b].y;
            let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
            let force = distance * distance / k;
            let (fx, fy) = (dx / distance * force, dy / distance * force);
            displacement[a].x -= fx;
            displacement[a].y -= fy;
            displacement[b].x += fx;
            displacement[b].y += fy;
        }

        // Apply displacements, capped at the current temperature
        for i in 0..node_count {
            let dx = displacement[i].x;
            let dy = displacement[i].y;
            let length = (dx * dx + dy * dy).sqrt();
            if length > 0.0 {
                let capped = length.min(temperature);
                positions[i].x += dx / length * capped;
                positions[i].y += dy / length * capped;
            }
        }

        temperature -= cooling;
    }

    rescale_to_unit(&mut positions);
    for (index, position) in positions.into_iter().enumerate() {
        layout.set(index, position);
    }
    layout
}

/// Center positions on the origin and scale the largest absolute
/// coordinate to 1.
fn rescale_to_unit(positions: &mut [Point]) {
    let count = positions.len() as f64;
    let center_x = positions.iter().map(|p| p.x).sum::<f64>() / count;
    let center_y = positions.iter().map(|p| p.y).sum::<f64>() / count;

    let mut max_abs: f64 = 0.0;
    for position in positions.iter_mut() {
        position.x -= center_x;
        position.y -= center_y;
        max_abs = max_abs.max(position.x.abs()).max(position.y.abs());
    }
    if max_abs > 0.0 {
        for position in positions.iter_mut() {
            position.x /= max_abs;
            position.y /= max_abs;
        }
    }
}

/// Rescale each router-to-peer vector once: BGP peers move to 0.4x their
/// distance from the router, DN42 peers to 1.3x.
///
/// Applied exactly once per external edge per invocation; re-running the
/// whole layout reproduces the same result rather than drifting.
pub fn adjust_peer_distances(graph: &TopologyGraph, layout: &mut Layout) {
    for ((a, b), _) in graph
        .edges()
        .filter(|(_, kind)| matches!(kind, EdgeKind::External))
    {
        let (router, peer) = if graph.node(a).is_router() {
            (a, b)
        } else {
            (b, a)
        };
        let factor = match graph.node(peer).kind {
            NodeKind::BgpPeer { .. } => BGP_PEER_FACTOR,
            NodeKind::Dn42Peer { .. } => DN42_PEER_FACTOR,
            NodeKind::Router { .. } => continue,
        };
        let router_position = layout.get(router);
        let peer_position = layout.get(peer);
        layout.set(peer, router_position.lerp(peer_position, factor));
    }
}
