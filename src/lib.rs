//! # netatlas - Topology diagrams and router configs for a DN42 mesh network
//!
//! This library turns a declarative YAML inventory of a small autonomous
//! system (routers, WireGuard tunnels, external peerings) into GraphViz
//! topology diagrams and per-router configuration text.
//!
//! ## Architecture
//!
//! - `inventory`: serde model and loaders for the Ansible-style inventory tree
//! - `graph`: typed topology graph and its builder
//! - `layout`: the three placement strategies (spring, geographic, logical)
//! - `diagram`: assembly of graph + layout into a render-ready description
//! - `render`: GraphViz DOT emission and JSON model dumps
//! - `configgen`: WireGuard / BGP / route-map text generation
//! - `orchestrator`: end-to-end coordination of one generation run
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use netatlas::orchestrator::{generate_diagram, GenerateOptions};
//!
//! let written = generate_diagram(
//!     Path::new("."),
//!     &GenerateOptions::default(),
//!     Path::new("topology.dot"),
//! )?;
//! println!("wrote {} artifacts", written.len());
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Fallible boundaries return `color_eyre::Result` with file context;
//! graph validation failures are typed (`graph::GraphError`). Recoverable
//! input-shape problems (malformed or dangling tunnel descriptors) are
//! skipped with a warning so a partially-specified inventory still
//! renders.

pub mod configgen;
pub mod diagram;
pub mod graph;
pub mod inventory;
pub mod layout;
pub mod orchestrator;
pub mod render;
