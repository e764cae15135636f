//! Output writers for reports and terminal views.
//!
//! This module handles:
//! - JSON reports of forests, sandwich views and call graphs
//! - Text diagrams and summaries for the terminal

pub mod json;
pub mod text;

// Re-export main functions
pub use json::{
    read_report, report_to_string, write_report, ForestReport, GraphEdgeReport, GraphNodeReport,
    GraphReport, NodeReport, SandwichReport,
};
pub use text::{
    render_graph, render_levels, render_summary, render_text_diagram,
    render_text_diagram_with_width,
};
