//! Router configuration generation CLI.
//!
//! Writes WireGuard peer configs and FRR configuration for every router
//! in the inventory.

use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use netatlas::orchestrator;

/// Router configuration generator for a DN42 mesh network
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base directory containing the inventory/ tree
    #[arg(short, long, default_value = ".")]
    inventory: PathBuf,

    /// Output directory for per-router configuration files
    #[arg(short, long, default_value = "configs")]
    output: PathBuf,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting netatlas configuration generation");
    info!("Inventory directory: {:?}", args.inventory);
    info!("Output directory: {:?}", args.output);

    let written = orchestrator::generate_configs(&args.inventory, &args.output)?;
    info!(
        "Configuration generation completed: {} files written",
        written.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["confgen", "--inventory", "net"]);
        assert_eq!(args.inventory, PathBuf::from("net"));
        assert_eq!(args.output, PathBuf::from("configs"));
    }
}
