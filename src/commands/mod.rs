//! CLI command implementations.
//!
//! Commands orchestrate the library components: they read profiles and
//! configuration, run the transforms, and print or write the results.

pub mod graph;
pub mod models;
pub mod sandwich;
pub mod summary;
pub mod utils;

// Re-export main command functions
pub use graph::execute_graph;
pub use models::{GraphArgs, SandwichArgs, SummaryArgs};
pub use sandwich::execute_sandwich;
pub use summary::{execute_render, execute_summary};
pub use utils::{display_version, load_container, load_profile, validate_profile_file};
