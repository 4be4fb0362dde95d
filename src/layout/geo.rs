//! Geographic placement for the world-map diagram.
//!
//! Routers are placed from their inventory coordinates when present,
//! otherwise from a declarative site table keyed by hostname prefix.
//! Peers are never placed here; the map depicts only the internal mesh.
//!
//! Two coordinate transforms exist: a Mercator projection when the
//! projection capability is enabled, and a degraded linear viewport
//! otherwise. The nodes, edges and labels of the diagram are identical in
//! both modes; only the coordinates differ.

use log::info;

use super::{Layout, Point};
use crate::graph::{NodeKind, TopologyGraph};

/// Site coordinates (longitude, latitude) by hostname prefix. Adding a
/// location is a table edit, not a code change. Longest prefix wins.
const SITE_COORDINATES: &[(&str, (f64, f64))] = &[
    ("de-fra", (8.68, 50.11)),
    ("de-ber", (13.40, 52.52)),
    ("nl-ams", (4.90, 52.37)),
    ("uk-lon", (-0.13, 51.51)),
    ("us-nyc", (-74.01, 40.71)),
    ("us-lax", (-118.24, 34.05)),
    ("sg-sin", (103.85, 1.29)),
    ("jp-tyo", (139.69, 35.69)),
    ("au-syd", (151.21, -33.87)),
];

/// Fallback for hostnames with no table entry and no inventory coordinate.
const DEFAULT_SITE: (f64, f64) = (8.68, 50.11);

/// Margin added around the known coordinates in viewport mode, degrees.
const VIEWPORT_MARGIN: f64 = 5.0;

/// Look up a site coordinate by hostname prefix; longest match wins.
pub fn lookup_site(hostname: &str) -> (f64, f64) {
    SITE_COORDINATES
        .iter()
        .filter(|(prefix, _)| hostname.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, coordinate)| *coordinate)
        .unwrap_or(DEFAULT_SITE)
}

/// Rectangular degree-space viewport derived from the plotted coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_latitude: f64,
    pub max_latitude: f64,
}

impl Viewport {
    /// The min/max of the given coordinates plus a fixed margin.
    /// An empty iterator yields a world-spanning viewport.
    pub fn from_coordinates<I: IntoIterator<Item = (f64, f64)>>(coordinates: I) -> Self {
        let mut min_longitude = f64::INFINITY;
        let mut max_longitude = f64::NEG_INFINITY;
        let mut min_latitude = f64::INFINITY;
        let mut max_latitude = f64::NEG_INFINITY;
        for (longitude, latitude) in coordinates {
            min_longitude = min_longitude.min(longitude);
            max_longitude = max_longitude.max(longitude);
            min_latitude = min_latitude.min(latitude);
            max_latitude = max_latitude.max(latitude);
        }
        if min_longitude > max_longitude {
            return Self {
                min_longitude: -180.0,
                max_longitude: 180.0,
                min_latitude: -90.0,
                max_latitude: 90.0,
            };
        }
        Self {
            min_longitude: min_longitude - VIEWPORT_MARGIN,
            max_longitude: max_longitude + VIEWPORT_MARGIN,
            min_latitude: min_latitude - VIEWPORT_MARGIN,
            max_latitude: max_latitude + VIEWPORT_MARGIN,
        }
    }

    /// Map a coordinate linearly into the unit square of this viewport.
    pub fn project(&self, longitude: f64, latitude: f64) -> Point {
        let width = (self.max_longitude - self.min_longitude).max(f64::EPSILON);
        let height = (self.max_latitude - self.min_latitude).max(f64::EPSILON);
        Point::new(
            (longitude - self.min_longitude) / width,
            (latitude - self.min_latitude) / height,
        )
    }
}

/// Mercator projection of a degree coordinate, in radians.
fn mercator(longitude: f64, latitude: f64) -> Point {
    // Clamp away from the poles where the projection diverges.
    let latitude = latitude.clamp(-85.0, 85.0);
    let x = longitude.to_radians();
    let y = (std::f64::consts::FRAC_PI_4 + latitude.to_radians() / 2.0)
        .tan()
        .ln();
    Point::new(x, y)
}

/// Place every router node geographically.
///
/// `use_projection` selects the Mercator transform; when the projection
/// capability is unavailable the caller passes `false` and positions are
/// mapped linearly through a [`Viewport`] instead. Non-router nodes keep
/// the default position.
pub fn geo_layout(graph: &TopologyGraph, use_projection: bool) -> Layout {
    let mut layout = Layout::with_default(graph.node_count());

    let placements: Vec<(usize, (f64, f64))> = graph
        .nodes()
        .filter_map(|(index, node)| match &node.kind {
            NodeKind::Router { coordinates, .. } => {
                Some((index, coordinates.unwrap_or_else(|| lookup_site(&node.name))))
            }
            _ => None,
        })
        .collect();

    if use_projection {
        for &(index, (longitude, latitude)) in &placements {
            layout.set(index, mercator(longitude, latitude));
        }
    } else {
        info!("Projection capability unavailable, plotting into a linear viewport");
        let viewport = Viewport::from_coordinates(placements.iter().map(|&(_, c)| c));
        for &(index, (longitude, latitude)) in &placements {
            layout.set(index, viewport.project(longitude, latitude));
        }
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, BuildOptions};
    use crate::inventory::{Coordinates, GlobalVars, Router, Tunnel};

    fn router(hostname: &str, coordinates: Option<Coordinates>) -> Router {
        Router {
            hostname: hostname.to_string(),
            loopback: "172.20.0.1".to_string(),
            coordinates,
            logical_position: None,
            peers: None,
            bgp_peers: None,
        }
    }

    fn mesh(routers: Vec<Router>) -> TopologyGraph {
        let global = GlobalVars {
            local_asn: 4242421869,
            intra_network_tunnels: vec![Tunnel {
                routers: routers.iter().take(2).map(|r| r.hostname.clone()).collect(),
                ospf_cost: None,
            }],
            segment_routing_enabled: false,
        };
        build_graph(
            &routers,
            &global,
            &BuildOptions {
                include_peers: false,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_site_prefix_and_fallback() {
        assert_eq!(lookup_site("de-fra1"), (8.68, 50.11));
        assert_eq!(lookup_site("us-nyc2"), (-74.01, 40.71));
        assert_eq!(lookup_site("xx-unknown1"), DEFAULT_SITE);
    }

    #[test]
    fn test_inventory_coordinates_take_precedence() {
        let graph = mesh(vec![
            router(
                "de-fra1",
                Some(Coordinates {
                    longitude: 0.0,
                    latitude: 0.0,
                }),
            ),
            router("us-nyc1", None),
        ]);
        let layout = geo_layout(&graph, true);
        let fra = graph.index_of("de-fra1").unwrap();
        // (0, 0) projects onto the origin under Mercator
        assert!((layout.get(fra).x).abs() < 1e-12);
        assert!((layout.get(fra).y).abs() < 1e-12);
    }

    #[test]
    fn test_viewport_from_coordinates() {
        let viewport = Viewport::from_coordinates(vec![(8.68, 50.11), (-74.01, 40.71)]);
        assert!((viewport.min_longitude - -79.01).abs() < 1e-9);
        assert!((viewport.max_longitude - 13.68).abs() < 1e-9);
        assert!((viewport.min_latitude - 35.71).abs() < 1e-9);
        assert!((viewport.max_latitude - 55.11).abs() < 1e-9);

        let inside = viewport.project(8.68, 50.11);
        assert!(inside.x > 0.0 && inside.x < 1.0);
        assert!(inside.y > 0.0 && inside.y < 1.0);
    }

    #[test]
    fn test_empty_viewport_spans_world() {
        let viewport = Viewport::from_coordinates(std::iter::empty());
        assert_eq!(viewport.min_longitude, -180.0);
        assert_eq!(viewport.max_latitude, 90.0);
    }

    #[test]
    fn test_layout_total_in_both_modes() {
        let graph = mesh(vec![router("de-fra1", None), router("us-nyc1", None)]);
        for use_projection in [true, false] {
            let layout = geo_layout(&graph, use_projection);
            assert_eq!(layout.len(), graph.node_count());
            for (_, position) in layout.iter() {
                assert!(position.x.is_finite() && position.y.is_finite());
            }
        }
    }

    #[test]
    fn test_modes_differ_only_in_coordinates() {
        let graph = mesh(vec![router("de-fra1", None), router("us-nyc1", None)]);
        let projected = geo_layout(&graph, true);
        let flat = geo_layout(&graph, false);
        // Same totality, different transform
        assert_eq!(projected.len(), flat.len());
        let fra = graph.index_of("de-fra1").unwrap();
        assert_ne!(projected.get(fra), flat.get(fra));
    }
}
