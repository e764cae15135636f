//! Summary and render commands.
//!
//! Both load a profile into the container; summary prints statistics and
//! the top labels, render prints the forest as a text diagram.

use super::models::SummaryArgs;
use super::utils::{load_container, load_profile};
use crate::aggregator::build_forest;
use crate::output::{render_summary, render_text_diagram_with_width, write_report, ForestReport};
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;
use std::time::Instant;

/// Execute the summary command
///
/// **Public** - main entry point called from main.rs
pub fn execute_summary(args: SummaryArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Step 1/3: Loading profile from {}...", args.input.display());
    let (data, _config) = load_container(&args.input, args.config.as_deref())?;

    info!("Step 2/3: Building label table (top {})...", args.top_labels);
    let table = data.label_table(args.top_labels);

    println!(
        "{}",
        render_summary(data.forest(), data.collapsed_map(), &table)
    );

    match &args.output {
        Some(path) => {
            info!("Step 3/3: Writing forest report...");
            write_report(&ForestReport::new(&data, args.top_labels), path)
                .context("Failed to write forest report")?;
            info!("✓ Report written to: {}", path.display());
        }
        None => info!("Step 3/3: Skipping report (not requested)"),
    }

    info!("Summary completed in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

/// Print a profile as a text diagram at most `width` columns wide
pub fn execute_render(input: &Path, width: usize) -> Result<()> {
    let data = load_profile(input)?;
    let forest = build_forest(&data);

    if forest.nodes().iter().any(|n| n.value.fract() != 0.0) {
        warn!("Profile has fractional values; the diagram is rounded");
    }
    if forest.total() > width as f64 {
        warn!(
            "Profile total {} is wider than {} columns; the diagram is scaled",
            forest.total(),
            width
        );
    }

    println!("{}", render_text_diagram_with_width(&forest, width));
    Ok(())
}
