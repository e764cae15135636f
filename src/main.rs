//! Flamegraph Studio CLI
//!
//! Builds flame graph views from nested-set profiles: level forests,
//! sandwich views of one function, and trimmed call graphs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use flamegraph_studio::commands::{
    display_version, execute_graph, execute_render, execute_sandwich, execute_summary,
    validate_profile_file, GraphArgs, SandwichArgs, SummaryArgs,
};
use flamegraph_studio::utils::config::DEFAULT_DIAGRAM_WIDTH;

/// Flamegraph Studio - flame graph views for nested-set profiles
#[derive(Parser, Debug)]
#[command(name = "flame-studio")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a profile frame (JSON) or text diagram (.txt)
    Validate {
        /// Path to the profile
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print forest statistics and the top labels
    Summary {
        #[arg(short, long)]
        file: PathBuf,

        /// Number of labels in the top table
        #[arg(long, default_value = "10")]
        top: usize,

        /// View configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output path for a JSON forest report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the profile as a text diagram
    Render {
        #[arg(short, long)]
        file: PathBuf,

        /// Widest diagram to print; wider profiles are scaled down
        #[arg(short, long, default_value_t = DEFAULT_DIAGRAM_WIDTH)]
        width: usize,
    },

    /// Merge all callers and callees of one label
    Sandwich {
        #[arg(short, long)]
        file: PathBuf,

        /// Label to center the view on
        #[arg(short, long)]
        label: String,

        /// Output path for a JSON sandwich report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the deduplicated and trimmed call graph
    Graph {
        #[arg(short, long)]
        file: PathBuf,

        /// View configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured node limit (0 for none)
        #[arg(long)]
        max_nodes: Option<usize>,

        /// Output path for a JSON graph report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Validate { file } => validate_profile_file(&file)?,

        Commands::Summary {
            file,
            top,
            config,
            output,
        } => execute_summary(SummaryArgs {
            input: file,
            config,
            top_labels: top,
            output,
        })?,

        Commands::Render { file, width } => execute_render(&file, width)?,

        Commands::Sandwich {
            file,
            label,
            output,
        } => execute_sandwich(SandwichArgs {
            input: file,
            label,
            output,
        })?,

        Commands::Graph {
            file,
            config,
            max_nodes,
            output,
        } => execute_graph(GraphArgs {
            input: file,
            config,
            max_nodes,
            output,
        })?,

        Commands::Version => display_version(),
    }

    Ok(())
}
