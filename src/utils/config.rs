//! Configuration and constants for the flame graph views.
//!
//! Loads view settings from TOML and validates them before any
//! transform runs.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// A child carrying more than this share of its parent is folded into it
pub const DEFAULT_COLLAPSING_THRESHOLD: f64 = 0.99;

// Graph trimming defaults, as fractions of the profile total
pub const DEFAULT_NODE_CUTOFF_FRACTION: f64 = 0.005;
pub const DEFAULT_EDGE_CUTOFF_FRACTION: f64 = 0.001;
pub const DEFAULT_MAX_NODES: usize = 80;

/// Terminal width of the `render` command's diagram
pub const DEFAULT_DIAGRAM_WIDTH: usize = 120;

/// Widest diagram ever drawn; wider forests are scaled down
pub const MAX_DIAGRAM_COLUMNS: usize = 1000;

// Column names of the nested-set profile frame
pub const LEVEL_FIELD: &str = "level";
pub const VALUE_FIELD: &str = "value";
pub const SELF_FIELD: &str = "self";
pub const LABEL_FIELD: &str = "label";
pub const VALUE_RIGHT_FIELD: &str = "valueRight";
pub const SELF_RIGHT_FIELD: &str = "selfRight";

/// Complete view configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub collapsing: CollapsingConfig,

    #[serde(default)]
    pub graph: GraphTrimConfig,
}

/// Settings for folding single-child chains
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CollapsingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_collapsing_threshold")]
    pub threshold: f64,
}

impl Default for CollapsingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_COLLAPSING_THRESHOLD,
        }
    }
}

/// Which end of the score-sorted node list survives `max_nodes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimSelection {
    /// Drop the `max_nodes` best-scoring nodes and keep the rest.
    /// Matches what the graph view has always rendered.
    #[default]
    SkipTop,
    /// Keep only the `max_nodes` best-scoring nodes.
    KeepTop,
}

/// Settings for the trimmed call graph
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GraphTrimConfig {
    #[serde(default = "default_node_cutoff_fraction")]
    pub node_cutoff_fraction: f64,

    #[serde(default = "default_edge_cutoff_fraction")]
    pub edge_cutoff_fraction: f64,

    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,

    #[serde(default)]
    pub selection: TrimSelection,
}

impl Default for GraphTrimConfig {
    fn default() -> Self {
        Self {
            node_cutoff_fraction: DEFAULT_NODE_CUTOFF_FRACTION,
            edge_cutoff_fraction: DEFAULT_EDGE_CUTOFF_FRACTION,
            max_nodes: DEFAULT_MAX_NODES,
            selection: TrimSelection::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_collapsing_threshold() -> f64 {
    DEFAULT_COLLAPSING_THRESHOLD
}

fn default_node_cutoff_fraction() -> f64 {
    DEFAULT_NODE_CUTOFF_FRACTION
}

fn default_edge_cutoff_fraction() -> f64 {
    DEFAULT_EDGE_CUTOFF_FRACTION
}

fn default_max_nodes() -> usize {
    DEFAULT_MAX_NODES
}

impl ViewConfig {
    /// Reject settings the transforms cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.collapsing.threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "collapsing.threshold must be in (0, 1], got {}",
                threshold
            )));
        }

        for (name, fraction) in [
            ("graph.node_cutoff_fraction", self.graph.node_cutoff_fraction),
            ("graph.edge_cutoff_fraction", self.graph.edge_cutoff_fraction),
        ] {
            if !fraction.is_finite() || fraction < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, fraction
                )));
            }
        }

        Ok(())
    }
}

/// Load view configuration from a TOML file
///
/// # Errors
/// * `ConfigError::Io` - If file cannot be read
/// * `ConfigError::Toml` - If TOML is invalid
/// * `ConfigError::Invalid` - If values are out of range
///
/// # Example
/// ```ignore
/// let config = load_view_config("view.toml")?;
/// ```
pub fn load_view_config(path: impl AsRef<Path>) -> Result<ViewConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ViewConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ViewConfig::default();
        assert!(config.collapsing.enabled);
        assert_eq!(config.collapsing.threshold, 0.99);
        assert_eq!(config.graph.max_nodes, 80);
        assert_eq!(config.graph.selection, TrimSelection::SkipTop);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ViewConfig = toml::from_str(
            r#"
            [graph]
            max_nodes = 12
            selection = "keep_top"
            "#,
        )
        .unwrap();

        assert_eq!(config.graph.max_nodes, 12);
        assert_eq!(config.graph.selection, TrimSelection::KeepTop);
        assert_eq!(config.graph.node_cutoff_fraction, DEFAULT_NODE_CUTOFF_FRACTION);
        assert!(config.collapsing.enabled);
    }

    #[test]
    fn test_load_view_config_rejects_bad_threshold() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[collapsing]\nthreshold = 1.5").unwrap();

        let result = load_view_config(file.path());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_negative_fraction() {
        let mut config = ViewConfig::default();
        config.graph.edge_cutoff_fraction = -0.1;
        assert!(config.validate().is_err());
    }
}
