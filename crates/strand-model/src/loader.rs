//! Plain-text matrix format.
//!
//! The first non-empty line holds the dimension `N`. It is followed by
//! `N` lines of `N` comma-separated weights. Blank lines are skipped and
//! a trailing comma at the end of a row is tolerated:
//!
//! ```text
//! 2
//! 0.9, 0.1,
//! 0.5, 0.5
//! ```

use std::fs;
use std::path::Path;

use strand_core::ValidationError;
use thiserror::Error;
use tracing::warn;

use crate::model::{InitialState, TransitionModel};

/// Why a matrix file could not be turned into a model.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read matrix file: {0}")]
    Io(#[from] std::io::Error),
    /// A line is not in the expected format.
    #[error("line {line}: {reason}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },
    /// The number of rows or columns disagrees with the header.
    #[error("declared dimension {declared} but found {found}")]
    DimensionMismatch {
        /// Dimension from the header line.
        declared: usize,
        /// Row count or row length actually found.
        found: usize,
    },
    /// The parsed matrix failed model validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Parse the text format into raw (unnormalized) rows.
pub fn parse_matrix(text: &str) -> Result<Vec<Vec<f64>>, LoadError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (header_line, header) = lines.next().ok_or_else(|| LoadError::Parse {
        line: 1,
        reason: "missing dimension header".into(),
    })?;
    let dimension: usize = header.parse().map_err(|_| LoadError::Parse {
        line: header_line,
        reason: format!("invalid dimension {header:?}"),
    })?;

    let mut rows = Vec::new();
    for (line, text) in lines {
        let row = parse_row(line, text)?;
        if row.len() != dimension {
            return Err(LoadError::DimensionMismatch {
                declared: dimension,
                found: row.len(),
            });
        }
        rows.push(row);
    }
    if rows.len() != dimension {
        return Err(LoadError::DimensionMismatch {
            declared: dimension,
            found: rows.len(),
        });
    }
    Ok(rows)
}

fn parse_row(line: usize, text: &str) -> Result<Vec<f64>, LoadError> {
    let text = text.strip_suffix(',').unwrap_or(text);
    text.split(',')
        .map(|field| {
            let field = field.trim();
            field.parse::<f64>().map_err(|_| LoadError::Parse {
                line,
                reason: format!("invalid weight {field:?}"),
            })
        })
        .collect()
}

/// Parse and validate a square model from text.
pub fn load_str(
    text: &str,
    initial: InitialState,
    seed: Option<u64>,
) -> Result<TransitionModel, LoadError> {
    let rows = parse_matrix(text)?;
    Ok(TransitionModel::new(&rows, initial, seed)?)
}

/// Read, parse and validate a square model from a file.
pub fn load_path(
    path: impl AsRef<Path>,
    initial: InitialState,
    seed: Option<u64>,
) -> Result<TransitionModel, LoadError> {
    let text = fs::read_to_string(path)?;
    load_str(&text, initial, seed)
}

/// [`load_path`], reporting failure as a warning instead of an error.
pub fn try_load_path(
    path: impl AsRef<Path>,
    initial: InitialState,
    seed: Option<u64>,
) -> Option<TransitionModel> {
    let path = path.as_ref();
    match load_path(path, initial, seed) {
        Ok(m) => Some(m),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "matrix file rejected");
            None
        }
    }
}
