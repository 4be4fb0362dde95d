//! Logical diagram placement: fixed router anchors, radial peer fan-out.
//!
//! Routers sit on hand-assigned anchors. Each router's peers fan out on
//! the side of the router facing away from the mesh centroid, spread
//! across a 120 degree arc so they never overlap each other.

use super::{Layout, Point};
use crate::graph::{NodeKind, TopologyGraph};

/// Logical anchors by hostname prefix. Unknown prefixes land on the
/// origin. Longest prefix wins.
const LOGICAL_ANCHORS: &[(&str, (f64, f64))] = &[
    ("de-fra", (0.0, 0.0)),
    ("de-ber", (2.0, 1.5)),
    ("nl-ams", (-1.5, 1.0)),
    ("uk-lon", (-3.0, 0.5)),
    ("us-nyc", (-6.0, 0.0)),
    ("us-lax", (-9.0, -1.0)),
    ("sg-sin", (5.0, -2.0)),
    ("jp-tyo", (7.0, -0.5)),
    ("au-syd", (6.0, -4.0)),
];

/// Distance from a router anchor to its fanned-out peers.
const FAN_DISTANCE: f64 = 2.5;

/// Angular spread of a multi-peer fan, centered on the base angle.
const FAN_SPREAD: f64 = 120.0;

/// Direction vectors shorter than this are treated as zero length.
const ZERO_LENGTH: f64 = 1e-9;

/// Look up a logical anchor by hostname prefix; longest match wins.
pub fn lookup_anchor(hostname: &str) -> Point {
    LOGICAL_ANCHORS
        .iter()
        .filter(|(prefix, _)| hostname.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|&(_, (x, y))| Point::new(x, y))
        .unwrap_or(Point::ORIGIN)
}

/// Angles for `count` peers fanned around `base`: a single peer sits
/// exactly on the base angle, more are spread evenly across the arc.
pub fn fan_angles(base: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![base],
        _ => {
            let spread = FAN_SPREAD.to_radians();
            let start = base - spread / 2.0;
            let step = spread / (count as f64 - 1.0);
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Place routers on their anchors and fan their peers outward.
///
/// A router's anchor is its inventory logical position when present,
/// otherwise the table entry for its hostname prefix. The fan direction
/// points from the centroid of all router anchors towards the router;
/// a zero-length direction defaults to the +x axis.
pub fn logical_layout(graph: &TopologyGraph) -> Layout {
    let mut layout = Layout::with_default(graph.node_count());

    let anchors: Vec<(usize, Point)> = graph
        .nodes()
        .filter_map(|(index, node)| match &node.kind {
            NodeKind::Router {
                logical_position, ..
            } => {
                let anchor = logical_position
                    .map(|(x, y)| Point::new(x, y))
                    .unwrap_or_else(|| lookup_anchor(&node.name));
                Some((index, anchor))
            }
            _ => None,
        })
        .collect();

    for &(index, anchor) in &anchors {
        layout.set(index, anchor);
    }

    let centroid = if anchors.is_empty() {
        Point::ORIGIN
    } else {
        let count = anchors.len() as f64;
        Point::new(
            anchors.iter().map(|(_, a)| a.x).sum::<f64>() / count,
            anchors.iter().map(|(_, a)| a.y).sum::<f64>() / count,
        )
    };

    for &(router, anchor) in &anchors {
        let peers = graph.attached_peers(router);
        if peers.is_empty() {
            continue;
        }

        let (dx, dy) = (anchor.x - centroid.x, anchor.y - centroid.y);
        let base = if (dx * dx + dy * dy).sqrt() < ZERO_LENGTH {
            0.0
        } else {
            dy.atan2(dx)
        };

        for (peer, angle) in peers.iter().zip(fan_angles(base, peers.len())) {
            layout.set(
                *peer,
                Point::new(
                    anchor.x + FAN_DISTANCE * angle.cos(),
                    anchor.y + FAN_DISTANCE * angle.sin(),
                ),
            );
        }
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, BuildOptions};
    use crate::inventory::{Dn42Peer, GlobalVars, LogicalPosition, Router, Tunnel};

    fn peer(name: &str, asn: u32) -> Dn42Peer {
        Dn42Peer {
            name: name.to_string(),
            asn,
            iso_3166_country_code: "DE".to_string(),
            latency_us: 1500,
            wg_public_key: None,
            endpoint: None,
            port: None,
        }
    }

    fn router(hostname: &str, position: Option<(f64, f64)>, peers: Vec<Dn42Peer>) -> Router {
        Router {
            hostname: hostname.to_string(),
            loopback: "172.20.0.1".to_string(),
            coordinates: None,
            logical_position: position.map(|(x, y)| LogicalPosition { x, y }),
            peers: if peers.is_empty() { None } else { Some(peers) },
            bgp_peers: None,
        }
    }

    fn graph_of(routers: Vec<Router>, tunnels: Vec<(&str, &str)>) -> TopologyGraph {
        let global = GlobalVars {
            local_asn: 4242421869,
            intra_network_tunnels: tunnels
                .into_iter()
                .map(|(a, b)| Tunnel {
                    routers: vec![a.to_string(), b.to_string()],
                    ospf_cost: None,
                })
                .collect(),
            segment_routing_enabled: false,
        };
        build_graph(&routers, &global, &BuildOptions::default()).unwrap()
    }

    #[test]
    fn test_fan_angles_single_peer_on_base() {
        let angles = fan_angles(1.0, 1);
        assert_eq!(angles, vec![1.0]);
    }

    #[test]
    fn test_fan_angles_even_spread_centered_on_base() {
        let base = 0.5;
        let spread = FAN_SPREAD.to_radians();
        for count in [2usize, 3, 5, 8] {
            let angles = fan_angles(base, count);
            assert_eq!(angles.len(), count);
            // Endpoints are the arc boundaries
            assert!((angles[0] - (base - spread / 2.0)).abs() < 1e-12);
            assert!((angles[count - 1] - (base + spread / 2.0)).abs() < 1e-12);
            // Even spacing
            let step = spread / (count as f64 - 1.0);
            for window in angles.windows(2) {
                assert!((window[1] - window[0] - step).abs() < 1e-12);
            }
            // Centered on the base angle
            let mid = (angles[0] + angles[count - 1]) / 2.0;
            assert!((mid - base).abs() < 1e-12);
        }
    }

    #[test]
    fn test_routers_sit_on_anchors() {
        let graph = graph_of(
            vec![
                router("de-fra1", None, vec![]),
                router("custom1", Some((4.0, -2.0)), vec![]),
            ],
            vec![("de-fra1", "custom1")],
        );
        let layout = logical_layout(&graph);
        let fra = graph.index_of("de-fra1").unwrap();
        let custom = graph.index_of("custom1").unwrap();
        assert_eq!(layout.get(fra), lookup_anchor("de-fra1"));
        assert_eq!(layout.get(custom), Point::new(4.0, -2.0));
    }

    #[test]
    fn test_unknown_prefix_anchors_on_origin() {
        assert_eq!(lookup_anchor("zz-nowhere1"), Point::ORIGIN);
    }

    #[test]
    fn test_peers_fan_at_fixed_distance_outward() {
        let graph = graph_of(
            vec![
                router(
                    "left1",
                    Some((-4.0, 0.0)),
                    vec![peer("a", 1), peer("b", 2), peer("c", 3)],
                ),
                router("right1", Some((4.0, 0.0)), vec![]),
            ],
            vec![("left1", "right1")],
        );
        let layout = logical_layout(&graph);
        let anchor = layout.get(graph.index_of("left1").unwrap());

        for name in ["a_1", "b_2", "c_3"] {
            let position = layout.get(graph.index_of(name).unwrap());
            let distance =
                ((position.x - anchor.x).powi(2) + (position.y - anchor.y).powi(2)).sqrt();
            assert!((distance - FAN_DISTANCE).abs() < 1e-9);
            // Centroid is the origin, so the outward side is -x
            assert!(position.x < anchor.x);
        }
    }

    #[test]
    fn test_zero_direction_defaults_to_plus_x() {
        // A single router sits exactly on the centroid
        let graph = graph_of(vec![router("solo1", Some((0.0, 0.0)), vec![peer("p", 1)])], vec![]);
        let layout = logical_layout(&graph);
        let position = layout.get(graph.index_of("p_1").unwrap());
        assert!((position.x - FAN_DISTANCE).abs() < 1e-12);
        assert!(position.y.abs() < 1e-12);
    }

    #[test]
    fn test_layout_is_total() {
        let graph = graph_of(
            vec![router("de-fra1", None, vec![peer("p", 1)])],
            vec![],
        );
        let layout = logical_layout(&graph);
        assert_eq!(layout.len(), graph.node_count());
    }
}
