use clap::{Parser, ValueEnum};
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use netatlas::orchestrator::{self, DiagramMode, GenerateOptions};

/// Topology diagram generator for a DN42 mesh network
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base directory containing the inventory/ tree
    #[arg(short, long, default_value = ".")]
    inventory: PathBuf,

    /// Output DOT file
    #[arg(short, long, default_value = "topology.dot")]
    output: PathBuf,

    /// Diagram to generate
    #[arg(short, long, value_enum, default_value = "combined")]
    mode: Mode,

    /// Disable the cartographic projection; the map mode falls back to a
    /// linear viewport
    #[arg(long)]
    flat: bool,

    /// Also dump the assembled diagram as JSON next to the DOT file
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Whole network, spring layout
    Combined,
    /// Internal mesh on a world map
    Map,
    /// Fixed anchors with radial peer fan-out
    Logical,
}

impl From<Mode> for DiagramMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Combined => DiagramMode::Combined,
            Mode::Map => DiagramMode::Map,
            Mode::Logical => DiagramMode::Logical,
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting netatlas diagram generation");
    info!("Inventory directory: {:?}", args.inventory);
    info!("Output file: {:?}", args.output);

    let options = GenerateOptions {
        mode: args.mode.into(),
        use_projection: !args.flat,
        dump_json: args.json,
    };

    let written = orchestrator::generate_diagram(&args.inventory, &options, &args.output)?;
    info!("Diagram generation completed: {} artifacts written", written.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["netatlas", "--inventory", "net"]);
        assert_eq!(args.inventory, PathBuf::from("net"));
        assert_eq!(args.output, PathBuf::from("topology.dot"));
        assert_eq!(args.mode, Mode::Combined);
        assert!(!args.flat);
    }

    #[test]
    fn test_mode_and_flat_flags() {
        let args = Args::parse_from(["netatlas", "--mode", "map", "--flat"]);
        assert_eq!(args.mode, Mode::Map);
        assert!(args.flat);
    }
}
