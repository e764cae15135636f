//! Text diagram parser for hand-written profiles.
//!
//! A diagram draws one line per level. Each frame is a box whose width
//! in characters is its value and whose column is its start offset:
//!
//! ```text
//! [0////////]
//! [1///][4/]
//! [2/]  [5]
//! ```
//!
//! The label is the box text up to the first `/`. A box hangs under the
//! box on the line above whose span covers its first column.

use super::schema::DataFrame;
use crate::utils::error::ParseError;
use log::debug;

struct DiagramBox {
    label: String,
    start: usize,
    width: usize,
    children: Vec<usize>,
}

/// Parse a text diagram into a pre-ordered profile frame
///
/// **Public** - fixture format for tests and the `render` command
///
/// # Errors
/// * `ParseError::InvalidFormat` - unterminated box, stray characters,
///   orphan box, or children wider than their parent
pub fn parse_text_diagram(text: &str) -> Result<DataFrame, ParseError> {
    let mut lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .skip_while(|l| l.is_empty())
        .collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let Some(first_line) = lines.first() else {
        return Ok(DataFrame::from_columns(&[], &[], &[], &[]));
    };
    let origin = first_line
        .chars()
        .position(|c| c == '[')
        .ok_or_else(|| ParseError::InvalidFormat("first line has no boxes".to_string()))?;

    let mut boxes: Vec<DiagramBox> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    let mut previous_line: Vec<usize> = Vec::new();

    for (line_no, line) in lines.iter().enumerate() {
        let chars: Vec<char> = line.chars().collect();
        let mut current_line = Vec::new();
        let mut col = 0;

        while col < chars.len() {
            match chars[col] {
                '[' => {
                    let end = chars[col..]
                        .iter()
                        .position(|&c| c == ']')
                        .map(|p| col + p)
                        .ok_or_else(|| {
                            ParseError::InvalidFormat(format!(
                                "unterminated box on line {}",
                                line_no + 1
                            ))
                        })?;
                    if col < origin {
                        return Err(ParseError::InvalidFormat(format!(
                            "box on line {} starts left of the first root",
                            line_no + 1
                        )));
                    }

                    let inner: String = chars[col + 1..end].iter().collect();
                    let label = inner.split('/').next().unwrap_or_default().to_string();
                    let start = col - origin;
                    let id = boxes.len();

                    if line_no == 0 {
                        roots.push(id);
                    } else {
                        let parent = previous_line
                            .iter()
                            .copied()
                            .find(|&p| boxes[p].start <= start && start < boxes[p].start + boxes[p].width)
                            .ok_or_else(|| {
                                ParseError::InvalidFormat(format!(
                                    "box `{}` on line {} has no parent",
                                    label,
                                    line_no + 1
                                ))
                            })?;
                        boxes[parent].children.push(id);
                    }

                    boxes.push(DiagramBox {
                        label,
                        start,
                        width: end - col + 1,
                        children: Vec::new(),
                    });
                    current_line.push(id);
                    col = end + 1;
                }
                c if c.is_whitespace() => col += 1,
                other => {
                    return Err(ParseError::InvalidFormat(format!(
                        "unexpected character `{}` on line {}",
                        other,
                        line_no + 1
                    )))
                }
            }
        }

        previous_line = current_line;
    }

    let mut levels = Vec::with_capacity(boxes.len());
    let mut values = Vec::with_capacity(boxes.len());
    let mut selfs = Vec::with_capacity(boxes.len());
    let mut labels = Vec::with_capacity(boxes.len());

    // Depth-first so rows come out in pre-order
    let mut stack: Vec<(usize, usize)> = roots.iter().rev().map(|&r| (r, 0)).collect();
    while let Some((id, level)) = stack.pop() {
        let diagram_box = &boxes[id];
        let children_width: usize = diagram_box.children.iter().map(|&c| boxes[c].width).sum();
        if children_width > diagram_box.width {
            return Err(ParseError::InvalidFormat(format!(
                "children of `{}` are wider than it",
                diagram_box.label
            )));
        }

        levels.push(level);
        values.push(diagram_box.width as f64);
        selfs.push((diagram_box.width - children_width) as f64);
        labels.push(diagram_box.label.clone());

        for &child in diagram_box.children.iter().rev() {
            stack.push((child, level + 1));
        }
    }

    debug!("Parsed text diagram: {} lines, {} frames", lines.len(), labels.len());

    Ok(DataFrame::from_columns(&levels, &values, &selfs, &labels))
}
