//! Profile parsing and schema definitions.
//!
//! This module handles:
//! - Defining the columnar nested-set input schema
//! - Validating frames and collecting schema problems
//! - Parsing text diagrams used as hand-written fixtures

pub mod frame;
pub mod schema;
pub mod text_diagram;

// Re-export main types
pub use frame::{parse_profile_frame, read_profile_frame, validate_frame};
pub use schema::{DataFrame, Field, ProfileData};
pub use text_diagram::parse_text_diagram;
