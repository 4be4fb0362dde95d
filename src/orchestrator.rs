//! Generation pipeline.
//!
//! Coordinates one diagram or config-generation run end to end: load the
//! inventory, build the graph, run the selected layout, assemble the
//! diagram and write the artifacts. Owns no domain logic of its own.

use color_eyre::Result;
use log::info;
use std::path::{Path, PathBuf};

use crate::configgen;
use crate::diagram::{assemble, DiagramOptions};
use crate::graph::{build_graph, BuildOptions};
use crate::inventory;
use crate::layout::geo::geo_layout;
use crate::layout::logical::logical_layout;
use crate::layout::spring::{adjust_peer_distances, spring_layout, SpringOptions};
use crate::render;

/// Which diagram to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramMode {
    /// Spring layout over the whole network, peers radially adjusted.
    Combined,
    /// Geographic world map of the internal mesh only.
    Map,
    /// Fixed anchors with peers fanned out radially.
    Logical,
}

impl DiagramMode {
    fn title(self) -> &'static str {
        match self {
            Self::Combined => "DN42 Network Topology",
            Self::Map => "DN42 Network Map",
            Self::Logical => "DN42 Logical Topology",
        }
    }
}

/// Options for one diagram generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub mode: DiagramMode,
    /// Cartographic projection capability for the map mode; when false
    /// the degraded linear-viewport fallback is used.
    pub use_projection: bool,
    /// Also dump the assembled diagram as JSON next to the DOT file.
    pub dump_json: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            mode: DiagramMode::Combined,
            use_projection: true,
            dump_json: false,
        }
    }
}

/// Generate one topology diagram from the inventory under `base`.
///
/// Writes the DOT rendering to `output` (and a `.json` sibling when
/// requested) and returns the written paths.
pub fn generate_diagram(
    base: &Path,
    options: &GenerateOptions,
    output: &Path,
) -> Result<Vec<PathBuf>> {
    let routers = inventory::load_routers(base)?;
    let global = inventory::load_global(base)?;
    info!(
        "Loaded {} routers and {} tunnels",
        routers.len(),
        global.intra_network_tunnels.len()
    );

    let build_options = BuildOptions {
        // The world map depicts only the internal mesh.
        include_peers: options.mode != DiagramMode::Map,
    };
    let graph = build_graph(&routers, &global, &build_options)?;
    info!(
        "Built topology graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let layout = match options.mode {
        DiagramMode::Combined => {
            let mut layout = spring_layout(&graph, &SpringOptions::default());
            adjust_peer_distances(&graph, &mut layout);
            layout
        }
        DiagramMode::Map => geo_layout(&graph, options.use_projection),
        DiagramMode::Logical => logical_layout(&graph),
    };

    let diagram = assemble(
        &graph,
        &layout,
        &DiagramOptions {
            local_asn: global.local_asn,
            title: options.mode.title().to_string(),
        },
    );

    let mut written = Vec::new();
    render::write_dot(&diagram, output)?;
    written.push(output.to_path_buf());

    if options.dump_json {
        let json_path = output.with_extension("json");
        render::write_json(&diagram, &json_path)?;
        written.push(json_path);
    }

    Ok(written)
}

/// Generate all router configuration files from the inventory under `base`.
pub fn generate_configs(base: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let routers = inventory::load_routers(base)?;
    let global = inventory::load_global(base)?;
    info!("Generating configuration for {} routers", routers.len());
    configgen::write_node_configs(&routers, &global, output_dir)
}
