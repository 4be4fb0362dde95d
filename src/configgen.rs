//! Router configuration text generation.
//!
//! For every router this writes one WireGuard config per DN42 peer
//! (`wg<peer-asn>.conf`) and a single `frr.conf` holding the BGP section
//! followed by the route-maps section.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::inventory::{Dn42Peer, GlobalVars, Router};

/// Section header separating BGP content from route-maps in `frr.conf`.
const ROUTE_MAP_HEADER: &str = "! Route-maps configuration\n";

/// WireGuard configuration for one peering session.
pub fn wireguard_peer_config(node: &Router, peer: &Dn42Peer, common: &GlobalVars) -> String {
    let mut config = String::new();
    config.push_str(&format!(
        "# {} <-> {} (AS{} <-> AS{})\n",
        node.hostname, peer.name, common.local_asn, peer.asn
    ));
    config.push_str("[Interface]\n");
    if let Some(port) = peer.port {
        config.push_str(&format!("ListenPort = {}\n", port));
    }
    config.push_str("Table = off\n");
    config.push_str("\n[Peer]\n");
    if let Some(key) = &peer.wg_public_key {
        config.push_str(&format!("PublicKey = {}\n", key));
    }
    if let Some(endpoint) = &peer.endpoint {
        config.push_str(&format!("Endpoint = {}\n", endpoint));
    }
    config.push_str("AllowedIPs = 0.0.0.0/0, ::/0\n");
    config
}

/// BGP section of a router's `frr.conf`.
pub fn bgp_config(node: &Router, common: &GlobalVars) -> String {
    let mut config = String::new();
    config.push_str(&format!("router bgp {}\n", common.local_asn));
    config.push_str(&format!(" bgp router-id {}\n", node.loopback));
    config.push_str(" no bgp ebgp-requires-policy\n");

    for peer in node.dn42_peers() {
        config.push_str(&format!(
            " neighbor {} remote-as {}\n neighbor {} description {}\n",
            peer.name, peer.asn, peer.name, peer.name
        ));
    }
    for peer in node.other_peers() {
        config.push_str(&format!(
            " neighbor {} remote-as {}\n neighbor {} description {} ({})\n",
            peer.name, peer.remote_as, peer.name, peer.name, peer.peer_type
        ));
    }

    config.push_str(" address-family ipv4 unicast\n");
    for peer in node.dn42_peers() {
        config.push_str(&format!(
            "  neighbor {} route-map {}-in in\n  neighbor {} route-map {}-out out\n",
            peer.name, peer.name, peer.name, peer.name
        ));
    }
    config.push_str(" exit-address-family\n");
    config
}

/// Route-maps section of a router's `frr.conf`.
pub fn route_map_config(node: &Router) -> String {
    let mut config = String::new();
    for peer in node.dn42_peers() {
        config.push_str(&format!(
            "route-map {}-in permit 10\n set local-preference 100\n!\n",
            peer.name
        ));
        config.push_str(&format!("route-map {}-out permit 10\n!\n", peer.name));
    }
    config
}

/// Write all configuration files for every router under `output_dir`.
///
/// Layout: `<output_dir>/<hostname>/wg<peer-asn>.conf` per DN42 peer and
/// `<output_dir>/<hostname>/frr.conf` (BGP first, then the route-map
/// section header, then route-maps). Returns the written paths.
pub fn write_node_configs(
    routers: &[Router],
    common: &GlobalVars,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for node in routers {
        let node_dir = output_dir.join(&node.hostname);
        fs::create_dir_all(&node_dir)
            .wrap_err_with(|| format!("Failed to create output directory '{}'", node_dir.display()))?;

        for peer in node.dn42_peers() {
            let path = node_dir.join(format!("wg{}.conf", peer.asn));
            fs::write(&path, wireguard_peer_config(node, peer, common))
                .wrap_err_with(|| format!("Failed to write '{}'", path.display()))?;
            info!("Generated: {}", path.display());
            written.push(path);
        }

        let mut frr = bgp_config(node, common);
        frr.push('\n');
        frr.push_str(ROUTE_MAP_HEADER);
        frr.push_str(&route_map_config(node));

        let frr_path = node_dir.join("frr.conf");
        fs::write(&frr_path, frr)
            .wrap_err_with(|| format!("Failed to write '{}'", frr_path.display()))?;
        info!("Generated BGP config: {}", frr_path.display());
        written.push(frr_path);
    }

    Ok(written)
}
