//! Inventory model and loaders.
//!
//! This module deserializes the Ansible-style inventory tree into the
//! router/peer/tunnel model consumed by the graph builder:
//!
//! - `inventory/hosts.yml` lists the router hostnames
//! - `inventory/host_vars/<host>/main.yml` holds per-router variables
//! - `inventory/group_vars/all/global.yml` holds network-wide settings

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// Per-router variables from `host_vars/<host>/main.yml`.
///
/// The hostname is not part of the file content; the loader injects it
/// from the `hosts.yml` entry the file belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Router {
    #[serde(skip)]
    pub hostname: String,
    pub loopback: String,
    /// Geographic position used by the world-map diagram, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Hand-assigned anchor used by the logical diagram, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_position: Option<LogicalPosition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peers: Option<Vec<Dn42Peer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgp_peers: Option<Vec<BgpPeer>>,
}

impl Router {
    /// DN42 peers of this router, empty slice when none are configured.
    pub fn dn42_peers(&self) -> &[Dn42Peer] {
        self.peers.as_deref().unwrap_or_default()
    }

    /// Non-DN42 BGP peers of this router, empty slice when none are configured.
    pub fn other_peers(&self) -> &[BgpPeer] {
        self.bgp_peers.as_deref().unwrap_or_default()
    }
}

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

/// Fixed 2-D anchor for the logical diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalPosition {
    pub x: f64,
    pub y: f64,
}

/// A DN42 peering session attached to one router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dn42Peer {
    pub name: String,
    pub asn: u32,
    pub iso_3166_country_code: String,
    pub latency_us: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wg_public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// A non-DN42 BGP session (upstream, IXP, downstream) attached to one router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BgpPeer {
    pub name: String,
    pub remote_as: u32,
    #[serde(rename = "type", default = "default_peer_type")]
    pub peer_type: String,
}

fn default_peer_type() -> String {
    "unknown".to_string()
}

/// Network-wide settings from `group_vars/all/global.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalVars {
    /// The network's own autonomous system number, rendered into router labels.
    pub local_asn: u32,
    #[serde(default)]
    pub intra_network_tunnels: Vec<Tunnel>,
    #[serde(default)]
    pub segment_routing_enabled: bool,
}

/// One intra-network tunnel descriptor. `routers` must name exactly two
/// routers; anything else is skipped by the graph builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tunnel {
    #[serde(default)]
    pub routers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ospf_cost: Option<OspfCost>,
}

/// OSPF cost of an internal link: an explicit metric or `auto`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OspfCost {
    Metric(u32),
    Auto(String),
}

impl OspfCost {
    /// The explicit metric, if one was configured.
    pub fn metric(&self) -> Option<u32> {
        match self {
            Self::Metric(value) => Some(*value),
            Self::Auto(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HostsFile {
    all: HostsAll,
}

#[derive(Debug, Deserialize)]
struct HostsAll {
    children: HostsChildren,
}

#[derive(Debug, Deserialize)]
struct HostsChildren {
    routers: HostsGroup,
}

#[derive(Debug, Deserialize)]
struct HostsGroup {
    hosts: BTreeMap<String, serde_yaml::Value>,
}

/// Load all routers listed in `inventory/hosts.yml`, with their variables.
///
/// A listed host without a `host_vars/<host>/main.yml` file is skipped with
/// a warning so that a partially-specified inventory still renders. A
/// missing or malformed `hosts.yml` is fatal.
pub fn load_routers(base: &Path) -> Result<Vec<Router>> {
    let hosts_path = base.join("inventory").join("hosts.yml");
    let file = File::open(&hosts_path)
        .wrap_err_with(|| format!("Failed to open hosts file '{}'", hosts_path.display()))?;
    let hosts: HostsFile = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse hosts file '{}'", hosts_path.display()))?;

    let mut routers = Vec::new();
    for hostname in hosts.all.children.routers.hosts.keys() {
        let vars_path = base
            .join("inventory")
            .join("host_vars")
            .join(hostname)
            .join("main.yml");
        if !vars_path.exists() {
            warn!("No host_vars for '{}', skipping", hostname);
            continue;
        }
        let file = File::open(&vars_path)
            .wrap_err_with(|| format!("Failed to open host vars '{}'", vars_path.display()))?;
        let mut router: Router = serde_yaml::from_reader(file)
            .wrap_err_with(|| format!("Failed to parse host vars '{}'", vars_path.display()))?;
        router.hostname = hostname.clone();
        routers.push(router);
    }

    Ok(routers)
}

/// Load network-wide settings from `inventory/group_vars/all/global.yml`.
/// A missing global file is fatal.
pub fn load_global(base: &Path) -> Result<GlobalVars> {
    let global_path = base
        .join("inventory")
        .join("group_vars")
        .join("all")
        .join("global.yml");
    let file = File::open(&global_path)
        .wrap_err_with(|| format!("Failed to open global vars '{}'", global_path.display()))?;
    let global: GlobalVars = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse global vars '{}'", global_path.display()))?;
    Ok(global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(base: &Path, rel: &str, content: &str) {
        let path = base.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_routers() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "inventory/hosts.yml",
            "all:\n  children:\n    routers:\n      hosts:\n        de-fra1:\n        us-nyc1:\n",
        );
        write_file(
            dir.path(),
            "inventory/host_vars/de-fra1/main.yml",
            concat!(
                "loopback: 172.20.0.1\n",
                "coordinates:\n  longitude: 8.68\n  latitude: 50.11\n",
                "peers:\n",
                "  - name: peerX\n",
                "    asn: 64512\n",
                "    iso_3166_country_code: DE\n",
                "    latency_us: 1500\n",
            ),
        );
        write_file(
            dir.path(),
            "inventory/host_vars/us-nyc1/main.yml",
            "loopback: 172.20.0.2\nbgp_peers:\n  - name: transitco\n    remote_as: 65010\n    type: upstream\n",
        );

        let routers = load_routers(dir.path()).unwrap();
        assert_eq!(routers.len(), 2);

        // BTreeMap ordering: de-fra1 before us-nyc1
        assert_eq!(routers[0].hostname, "de-fra1");
        assert_eq!(routers[0].loopback, "172.20.0.1");
        assert_eq!(
            routers[0].coordinates,
            Some(Coordinates {
                longitude: 8.68,
                latitude: 50.11
            })
        );
        assert_eq!(routers[0].dn42_peers().len(), 1);
        assert_eq!(routers[0].dn42_peers()[0].asn, 64512);

        assert_eq!(routers[1].hostname, "us-nyc1");
        assert_eq!(routers[1].other_peers()[0].peer_type, "upstream");
    }

    #[test]
    fn test_host_without_vars_is_skipped() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "inventory/hosts.yml",
            "all:\n  children:\n    routers:\n      hosts:\n        ghost1:\n",
        );

        let routers = load_routers(dir.path()).unwrap();
        assert!(routers.is_empty());
    }

    #[test]
    fn test_missing_hosts_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        assert!(load_routers(dir.path()).is_err());
    }

    #[test]
    fn test_load_global() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "inventory/group_vars/all/global.yml",
            concat!(
                "local_asn: 4242421869\n",
                "segment_routing_enabled: true\n",
                "intra_network_tunnels:\n",
                "  - routers: [de-fra1, us-nyc1]\n",
                "    ospf_cost: 20\n",
                "  - routers: [us-nyc1, sg-sin1]\n",
                "    ospf_cost: auto\n",
            ),
        );

        let global = load_global(dir.path()).unwrap();
        assert_eq!(global.local_asn, 4242421869);
        assert!(global.segment_routing_enabled);
        assert_eq!(global.intra_network_tunnels.len(), 2);
        assert_eq!(
            global.intra_network_tunnels[0].ospf_cost,
            Some(OspfCost::Metric(20))
        );
        assert_eq!(
            global.intra_network_tunnels[1]
                .ospf_cost
                .as_ref()
                .and_then(OspfCost::metric),
            None
        );
    }

    #[test]
    fn test_missing_global_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        assert!(load_global(dir.path()).is_err());
    }

    #[test]
    fn test_bgp_peer_type_defaults_to_unknown() {
        let peer: BgpPeer = serde_yaml::from_str("name: mystery\nremote_as: 65000\n").unwrap();
        assert_eq!(peer.peer_type, "unknown");
    }
}
