//! Graph command: deduplicated, trimmed call graph.

use super::models::GraphArgs;
use super::utils::load_container;
use crate::output::{render_graph, write_report, GraphReport};
use anyhow::{Context, Result};
use log::{debug, info};

/// Execute the graph command
///
/// **Public** - main entry point called from main.rs
pub fn execute_graph(args: GraphArgs) -> Result<()> {
    info!("Loading profile from {}...", args.input.display());
    let (data, config) = load_container(&args.input, args.config.as_deref())?;

    let mut trim = config.graph.clone();
    if let Some(max_nodes) = args.max_nodes {
        trim.max_nodes = max_nodes;
    }
    debug!("Graph trimming: {:?}", trim);

    let graph = data.call_graph(&trim);
    println!("{}", render_graph(&graph));

    if let Some(path) = &args.output {
        write_report(&GraphReport::new(&graph), path).context("Failed to write graph report")?;
        info!("✓ Report written to: {}", path.display());
    }

    Ok(())
}
