//! Sandwich command: merged callers and callees of one label.

use super::models::SandwichArgs;
use super::utils::load_container;
use crate::output::{render_levels, write_report, SandwichReport};
use anyhow::{bail, Context, Result};
use log::info;

/// Execute the sandwich command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Profile read or validation failures
/// * The label does not occur in the profile
/// * Report write errors
pub fn execute_sandwich(args: SandwichArgs) -> Result<()> {
    info!("Loading profile from {}...", args.input.display());
    let (data, _config) = load_container(&args.input, None)?;

    let occurrences = data.nodes_with_label(&args.label).len();
    if occurrences == 0 {
        bail!("Label `{}` does not occur in the profile", args.label);
    }
    info!("Merging {} occurrences of `{}`", occurrences, args.label);

    let view = data.sandwich_levels(&args.label);

    println!("Callers of {}:", args.label);
    println!("{}", render_levels(&view.callers));
    println!();
    println!("Callees of {}:", args.label);
    println!("{}", render_levels(&view.callees));

    if let Some(path) = &args.output {
        write_report(&SandwichReport::new(&args.label, &view), path)
            .context("Failed to write sandwich report")?;
        info!("✓ Report written to: {}", path.display());
    }

    Ok(())
}
