//! Error types for the entire library.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::fmt;
use thiserror::Error;

/// A column that exists but does not hold what the profile schema needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub name: String,
    pub expected: String,
    pub found: String,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (expected {}, found {})", self.name, self.expected, self.found)
    }
}

/// Every schema problem found in a profile frame, reported at once
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaError {
    pub missing_fields: Vec<String>,
    pub wrong_type_fields: Vec<FieldMismatch>,
}

impl SchemaError {
    pub fn is_empty(&self) -> bool {
        self.missing_fields.is_empty() && self.wrong_type_fields.is_empty()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing_fields.is_empty() {
            parts.push(format!("missing fields: {}", self.missing_fields.join(", ")));
        }
        if !self.wrong_type_fields.is_empty() {
            let mismatches: Vec<String> =
                self.wrong_type_fields.iter().map(|m| m.to_string()).collect();
            parts.push(format!("wrong field types: {}", mismatches.join(", ")));
        }
        write!(f, "Malformed profile data: {}", parts.join("; "))
    }
}

/// Errors that can occur while reading a profile frame
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid profile format: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur while loading view configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid view configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
