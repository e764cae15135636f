use std::path::PathBuf;

/// Arguments for the summary command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct SummaryArgs {
    /// Profile frame (JSON) or text diagram (.txt)
    pub input: PathBuf,

    /// Optional view configuration (TOML)
    pub config: Option<PathBuf>,

    /// Number of labels in the top table
    pub top_labels: usize,

    /// Optional path for a JSON forest report
    pub output: Option<PathBuf>,
}

impl Default for SummaryArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("profile.json"),
            config: None,
            top_labels: 10,
            output: None,
        }
    }
}

/// Arguments for the sandwich command
#[derive(Debug, Clone)]
pub struct SandwichArgs {
    pub input: PathBuf,

    /// Label whose callers and callees are merged
    pub label: String,

    /// Optional path for a JSON sandwich report
    pub output: Option<PathBuf>,
}

/// Arguments for the graph command
#[derive(Debug, Clone)]
pub struct GraphArgs {
    pub input: PathBuf,

    /// Optional view configuration (TOML); `[graph]` drives trimming
    pub config: Option<PathBuf>,

    /// Overrides `graph.max_nodes` from the config
    pub max_nodes: Option<usize>,

    /// Optional path for a JSON graph report
    pub output: Option<PathBuf>,
}
