//! Diagram rendering collaborator.
//!
//! Emits the assembled diagram as GraphViz DOT text with pinned node
//! positions, and optionally dumps the raw render-ready model as JSON.
//! Raster output is delegated to GraphViz itself.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs;
use std::path::Path;

use crate::diagram::{Diagram, EdgeStyle, NodeClass, NodeShape};

fn fill_color(class: NodeClass) -> &'static str {
    match class {
        NodeClass::Router => "#4a90e2",
        NodeClass::Dn42Peer => "#66bb6a",
        NodeClass::BgpPeer => "#ffa726",
    }
}

fn shape_name(shape: NodeShape) -> &'static str {
    match shape {
        NodeShape::Circle => "circle",
    }
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Render the diagram as GraphViz DOT text (undirected, pinned positions).
pub fn to_dot(diagram: &Diagram) -> String {
    let mut dot = String::new();
    dot.push_str("graph topology {\n");
    dot.push_str(&format!("    label=\"{}\";\n", escape_label(&diagram.title)));
    dot.push_str("    labelloc=t;\n");
    dot.push_str("    layout=neato;\n");
    dot.push_str("    overlap=false;\n");
    dot.push_str("    node [style=filled, fontsize=9];\n\n");

    for node in &diagram.nodes {
        // Matplotlib-style point sizes map onto glyph width in inches.
        let width = (node.size / 4500.0) * 1.2;
        dot.push_str(&format!(
            "    \"{}\" [label=\"{}\", shape={}, fillcolor=\"{}\", width={:.2}, pos=\"{:.4},{:.4}!\"];\n",
            node.id,
            escape_label(&node.label),
            shape_name(node.shape),
            fill_color(node.class),
            width,
            node.position.x,
            node.position.y,
        ));
    }
    dot.push('\n');

    for edge in &diagram.edges {
        let style = match edge.style {
            EdgeStyle::Solid => "solid",
            EdgeStyle::Dashed => "dashed",
        };
        let mut attributes = format!(
            "label=\"{}\", style={}, penwidth={}",
            escape_label(&edge.label),
            style,
            edge.width,
        );
        if let Some(point) = diagram.edge_label_point(edge) {
            attributes.push_str(&format!(", lp=\"{:.4},{:.4}\"", point.x, point.y));
        }
        dot.push_str(&format!(
            "    \"{}\" -- \"{}\" [{}];\n",
            edge.endpoints.0, edge.endpoints.1, attributes
        ));
    }

    dot.push_str("}\n");
    dot
}

/// Write the DOT rendering to `path`.
pub fn write_dot(diagram: &Diagram, path: &Path) -> Result<()> {
    fs::write(path, to_dot(diagram))
        .wrap_err_with(|| format!("Failed to write diagram '{}'", path.display()))?;
    info!("Topology diagram saved to: {}", path.display());
    Ok(())
}

/// Dump the render-ready model as pretty JSON to `path`.
pub fn write_json(diagram: &Diagram, path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .wrap_err_with(|| format!("Failed to create diagram dump '{}'", path.display()))?;
    serde_json::to_writer_pretty(file, diagram)
        .wrap_err_with(|| format!("Failed to serialize diagram dump '{}'", path.display()))?;
    info!("Diagram model saved to: {}", path.display());
    Ok(())
}
