//! YOLO label-file parser
//!
//! One detection per line: `class_index cx cy width height`, space separated,
//! normalized coordinates. `--save-conf` appends a confidence column, which is
//! ignored. Blank lines are skipped; output order follows the file.

use std::path::Path;

use polycore::Label;
use thiserror::Error;

use crate::classes::ClassTable;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("failed to read label file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected at least 5 fields, found {found}")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: invalid {field} '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: class index {index} is not in the class table")]
    UnknownClass { line: usize, index: usize },
}

const FIELDS: [&str; 4] = ["cx", "cy", "width", "height"];

/// Parses label-file contents
pub fn parse_labels(contents: &str, classes: &ClassTable) -> Result<Vec<Label>, LabelError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| parse_line(i + 1, line, classes))
        .collect()
}

/// Reads and parses the label file at `path`
pub async fn read_labels(path: &Path, classes: &ClassTable) -> Result<Vec<Label>, LabelError> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|source| LabelError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_labels(&contents, classes)
}

fn parse_line(line: usize, text: &str, classes: &ClassTable) -> Result<Label, LabelError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() < 5 {
        return Err(LabelError::FieldCount {
            line,
            found: fields.len(),
        });
    }

    let index = fields[0].parse::<usize>().map_err(|_| LabelError::InvalidNumber {
        line,
        field: "class index",
        value: fields[0].to_string(),
    })?;
    let class_name = classes
        .name(index)
        .ok_or(LabelError::UnknownClass { line, index })?
        .to_string();

    let mut coords = [0.0f64; 4];
    for (slot, (field, value)) in coords.iter_mut().zip(FIELDS.iter().zip(&fields[1..5])) {
        *slot = value.parse::<f64>().map_err(|_| LabelError::InvalidNumber {
            line,
            field: *field,
            value: value.to_string(),
        })?;
    }
    let [cx, cy, width, height] = coords;

    Ok(Label {
        class_name,
        cx,
        cy,
        width,
        height,
    })
}
