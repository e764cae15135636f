//! Input schema definitions for nested-set profiles.
//!
//! A profile arrives as a columnar frame: one row per stack frame
//! occurrence in depth-first pre-order, with an explicit `level` column.
//! `DataFrame` is the raw, untyped shape read from JSON; `ProfileData`
//! is the validated, typed view every transform works from.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Raw columnar frame as read from JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    pub fields: Vec<Field>,
}

/// A single named column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,

    pub values: Vec<Value>,

    /// Text table for enum-coded columns; `values` then hold indexes into it
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl Field {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
            enum_values: None,
        }
    }

    pub fn with_enum(mut self, text: Vec<String>) -> Self {
        self.enum_values = Some(text);
        self
    }
}

impl DataFrame {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Build a frame from already-typed columns
    pub fn from_columns(
        levels: &[usize],
        values: &[f64],
        selfs: &[f64],
        labels: &[String],
    ) -> Self {
        use crate::utils::config::{LABEL_FIELD, LEVEL_FIELD, SELF_FIELD, VALUE_FIELD};

        Self::new(vec![
            Field::new(LEVEL_FIELD, levels.iter().map(|l| Value::from(*l as u64)).collect()),
            Field::new(VALUE_FIELD, values.iter().map(|v| Value::from(*v)).collect()),
            Field::new(SELF_FIELD, selfs.iter().map(|v| Value::from(*v)).collect()),
            Field::new(LABEL_FIELD, labels.iter().map(|l| Value::from(l.as_str())).collect()),
        ])
    }

    /// First field with the given name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Comparison-side columns of a diff profile
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DiffColumns {
    pub(crate) value_right: Vec<f64>,
    pub(crate) self_right: Vec<f64>,
}

/// Validated profile rows
///
/// Built by `parser::frame::validate_frame`; all columns have equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileData {
    pub(crate) levels: Vec<usize>,
    pub(crate) values: Vec<f64>,
    pub(crate) selfs: Vec<f64>,
    pub(crate) labels: Vec<String>,
    pub(crate) diff: Option<DiffColumns>,
}

impl ProfileData {
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// True when the profile carries a comparison side
    pub fn is_diff(&self) -> bool {
        self.diff.is_some()
    }

    pub fn level(&self, index: usize) -> usize {
        self.levels[index]
    }

    pub fn label(&self, index: usize) -> &str {
        &self.labels[index]
    }

    /// Baseline value of a row
    pub fn value(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Baseline self of a row
    pub fn self_value(&self, index: usize) -> f64 {
        self.selfs[index]
    }

    /// Comparison value of a row, 0 outside diff mode
    pub fn value_right(&self, index: usize) -> f64 {
        self.diff.as_ref().map_or(0.0, |d| d.value_right[index])
    }

    /// Comparison self of a row, 0 outside diff mode
    pub fn self_right(&self, index: usize) -> f64 {
        self.diff.as_ref().map_or(0.0, |d| d.self_right[index])
    }

    pub fn values_sum(&self, indexes: &[usize]) -> f64 {
        indexes.iter().map(|&i| self.value(i)).sum()
    }

    pub fn self_sum(&self, indexes: &[usize]) -> f64 {
        indexes.iter().map(|&i| self.self_value(i)).sum()
    }

    pub fn value_right_sum(&self, indexes: &[usize]) -> f64 {
        indexes.iter().map(|&i| self.value_right(i)).sum()
    }

    pub fn self_right_sum(&self, indexes: &[usize]) -> f64 {
        indexes.iter().map(|&i| self.self_right(i)).sum()
    }

    /// Distinct labels in first-seen order
    pub fn unique_labels(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.labels
            .iter()
            .filter(|l| seen.insert(l.as_str()))
            .map(String::as_str)
            .collect()
    }
}
