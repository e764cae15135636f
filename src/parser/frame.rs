//! Profile frame validation and loading.
//!
//! Turns an untyped `DataFrame` into `ProfileData`. Validation never
//! stops at the first problem: every missing column and every column of
//! the wrong type is collected into one `SchemaError`, and nothing is
//! built unless the whole frame is sound.

use super::schema::{DataFrame, DiffColumns, Field, ProfileData};
use crate::utils::config::{
    LABEL_FIELD, LEVEL_FIELD, SELF_FIELD, SELF_RIGHT_FIELD, VALUE_FIELD, VALUE_RIGHT_FIELD,
};
use crate::utils::error::{FieldMismatch, ParseError, SchemaError};
use log::debug;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Validate a frame and extract typed rows
///
/// **Public** - the only way to obtain `ProfileData`
///
/// # Errors
/// * `SchemaError` - listing all missing and mistyped fields
pub fn validate_frame(frame: &DataFrame) -> Result<ProfileData, SchemaError> {
    let mut problems = SchemaError::default();

    let levels = required(frame, LEVEL_FIELD, &mut problems).and_then(|f| {
        typed_column(f, "non-negative integer", Value::as_u64, &mut problems)
            .map(|c| c.into_iter().map(|l| l as usize).collect::<Vec<_>>())
    });
    let values = required(frame, VALUE_FIELD, &mut problems)
        .and_then(|f| typed_column(f, "number", Value::as_f64, &mut problems));
    let selfs = required(frame, SELF_FIELD, &mut problems)
        .and_then(|f| typed_column(f, "number", Value::as_f64, &mut problems));
    let labels =
        required(frame, LABEL_FIELD, &mut problems).and_then(|f| label_column(f, &mut problems));

    let value_right = frame
        .field(VALUE_RIGHT_FIELD)
        .and_then(|f| typed_column(f, "number", Value::as_f64, &mut problems));
    let self_right = frame
        .field(SELF_RIGHT_FIELD)
        .and_then(|f| typed_column(f, "number", Value::as_f64, &mut problems));

    // Diff columns only make sense as a pair
    match (frame.field(VALUE_RIGHT_FIELD), frame.field(SELF_RIGHT_FIELD)) {
        (Some(_), None) => problems.missing_fields.push(SELF_RIGHT_FIELD.to_string()),
        (None, Some(_)) => problems.missing_fields.push(VALUE_RIGHT_FIELD.to_string()),
        _ => {}
    }

    check_lengths(frame, &mut problems);

    if !problems.is_empty() {
        return Err(problems);
    }

    match (levels, values, selfs, labels) {
        (Some(levels), Some(values), Some(selfs), Some(labels)) => {
            let diff = match (value_right, self_right) {
                (Some(value_right), Some(self_right)) => Some(DiffColumns {
                    value_right,
                    self_right,
                }),
                _ => None,
            };

            debug!(
                "Validated profile frame: {} rows, diff mode: {}",
                levels.len(),
                diff.is_some()
            );

            Ok(ProfileData {
                levels,
                values,
                selfs,
                labels,
                diff,
            })
        }
        // Every None above has already recorded a problem
        _ => Err(problems),
    }
}

/// Parse a profile frame from raw JSON
///
/// **Public** - used by commands and tests
///
/// # Errors
/// * `ParseError::JsonError` - JSON does not have the frame shape
/// * `ParseError::Schema` - Frame is missing or mistypes columns
pub fn parse_profile_frame(raw: &Value) -> Result<ProfileData, ParseError> {
    if !raw.is_object() {
        return Err(ParseError::InvalidFormat(
            "Profile must be a JSON object with a `fields` array".to_string(),
        ));
    }

    let frame: DataFrame = serde_json::from_value(raw.clone())?;
    Ok(validate_frame(&frame)?)
}

/// Read and validate a profile frame from a JSON file
///
/// **Public** - entry point for the CLI
pub fn read_profile_frame(input_path: impl AsRef<Path>) -> Result<ProfileData, ParseError> {
    let input_path = input_path.as_ref();

    debug!("Reading profile frame from: {}", input_path.display());

    let file = File::open(input_path)?;
    let frame: DataFrame = serde_json::from_reader(BufReader::new(file))?;

    Ok(validate_frame(&frame)?)
}

/// Look up a required field, recording it as missing if absent
///
/// **Private** - internal helper for validate_frame
fn required<'a>(
    frame: &'a DataFrame,
    name: &str,
    problems: &mut SchemaError,
) -> Option<&'a Field> {
    let field = frame.field(name);
    if field.is_none() {
        problems.missing_fields.push(name.to_string());
    }
    field
}

/// Convert every value of a column, recording the first offending value
///
/// **Private** - internal helper for validate_frame
fn typed_column<T>(
    field: &Field,
    expected: &str,
    convert: impl Fn(&Value) -> Option<T>,
    problems: &mut SchemaError,
) -> Option<Vec<T>> {
    let mut column = Vec::with_capacity(field.values.len());

    for (row, value) in field.values.iter().enumerate() {
        match convert(value) {
            Some(v) => column.push(v),
            None => {
                problems.wrong_type_fields.push(FieldMismatch {
                    name: field.name.clone(),
                    expected: expected.to_string(),
                    found: format!("{} at row {}", describe(value), row),
                });
                return None;
            }
        }
    }

    Some(column)
}

/// Labels are either plain strings or codes into the field's enum table
///
/// **Private** - internal helper for validate_frame
fn label_column(field: &Field, problems: &mut SchemaError) -> Option<Vec<String>> {
    match &field.enum_values {
        None => typed_column(
            field,
            "string",
            |v| v.as_str().map(str::to_string),
            problems,
        ),
        Some(text) => typed_column(
            field,
            "enum code",
            |v| {
                v.as_u64()
                    .and_then(|code| text.get(code as usize))
                    .cloned()
            },
            problems,
        ),
    }
}

/// Every present profile column must have as many rows as the first one
///
/// A column already reported as mistyped is not reported again.
///
/// **Private** - internal helper for validate_frame
fn check_lengths(frame: &DataFrame, problems: &mut SchemaError) {
    let names = [
        LEVEL_FIELD,
        VALUE_FIELD,
        SELF_FIELD,
        LABEL_FIELD,
        VALUE_RIGHT_FIELD,
        SELF_RIGHT_FIELD,
    ];
    let present: Vec<&Field> = names.iter().filter_map(|n| frame.field(n)).collect();

    let Some(first) = present.first() else {
        return;
    };
    let expected = first.values.len();

    for field in present.iter().skip(1) {
        let reported = problems
            .wrong_type_fields
            .iter()
            .any(|m| m.name == field.name);
        if field.values.len() != expected && !reported {
            problems.wrong_type_fields.push(FieldMismatch {
                name: field.name.clone(),
                expected: format!("{} values", expected),
                found: format!("{} values", field.values.len()),
            });
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(n) if n.is_i64() => "negative integer",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
