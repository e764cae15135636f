use crate::aggregator::FlameGraphData;
use crate::parser::{parse_text_diagram, read_profile_frame, validate_frame, ProfileData};
use crate::utils::config::{load_view_config, ViewConfig, REPORT_SCHEMA_VERSION};
use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

/// Read a profile from a JSON frame, or from a text diagram for `.txt` files
pub fn load_profile(path: &Path) -> Result<ProfileData> {
    let is_diagram = path.extension().is_some_and(|ext| ext == "txt");

    if is_diagram {
        debug!("Reading text diagram from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let frame = parse_text_diagram(&text).context("Failed to parse text diagram")?;
        return validate_frame(&frame).context("Text diagram is not a valid profile");
    }

    read_profile_frame(path).with_context(|| format!("Failed to read profile {}", path.display()))
}

/// Load the view configuration, falling back to defaults
pub fn load_config(path: Option<&Path>) -> Result<ViewConfig> {
    match path {
        Some(path) => load_view_config(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ViewConfig::default()),
    }
}

/// Profile plus configuration, ready for the views
pub fn load_container(input: &Path, config: Option<&Path>) -> Result<(FlameGraphData, ViewConfig)> {
    let config = load_config(config)?;
    let data = load_profile(input)?;
    Ok((FlameGraphData::new(data, &config), config))
}

/// Validate a profile file and print what it holds
pub fn validate_profile_file(path: &Path) -> Result<()> {
    println!("Validating profile: {}", path.display());

    let data = load_profile(path)?;

    println!("✓ Valid profile");
    println!("  Rows: {}", data.len());
    println!("  Distinct labels: {}", data.unique_labels().len());
    println!("  Diff profile: {}", if data.is_diff() { "yes" } else { "no" });

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("Flamegraph Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_load_profile_from_diagram() {
        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "[a///]\n[b/]").unwrap();

        let data = load_profile(file.path()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.label(1), "b");
    }

    #[test]
    fn test_load_profile_reports_schema_problems() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"fields":[{{"name":"level","values":[0]}}]}}"#).unwrap();

        let err = load_profile(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("missing fields"));
    }

    #[test]
    fn test_load_config_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, ViewConfig::default());
    }
}
