//! Loader for system cell files.
//!
//! A cell file lists the three basis vectors of the simulation cell, one per
//! line:
//! ```text
//! # optional comment
//! ax ay az
//! bx by bz
//! cx cy cz
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. The vectors become
//! the columns of the returned matrix.

use std::path::Path;

use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Errors while reading a cell file.
#[derive(Debug, Error)]
pub enum CellError {
    #[error("Failed to read cell file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    FormatError { line: usize, message: String },

    #[error(
        "Cell file must contain 3 basis vectors (ax ay az / bx by bz / cx cy cz), found {found}"
    )]
    TooFewVectors { found: usize },
}

/// Parse the basis vectors of a cell from a string.
pub fn parse_basis(content: &str) -> Result<Matrix3<f64>, CellError> {
    let mut vectors: Vec<Vector3<f64>> = Vec::with_capacity(3);

    for (line_idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if vectors.len() == 3 {
            log::warn!(
                "Ignoring cell file content after the third basis vector (line {})",
                line_idx + 1
            );
            break;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(CellError::FormatError {
                line: line_idx + 1,
                message: format!("Expected 'x y z', got '{}'", line),
            });
        }

        let mut v = Vector3::zeros();
        for (k, axis) in ["x", "y", "z"].iter().enumerate() {
            let value: f64 = parts[k].parse().map_err(|_| CellError::FormatError {
                line: line_idx + 1,
                message: format!("Invalid {} component: {}", axis, parts[k]),
            })?;
            if !value.is_finite() {
                return Err(CellError::FormatError {
                    line: line_idx + 1,
                    message: format!("Non-finite {} component: {}", axis, parts[k]),
                });
            }
            v[k] = value;
        }
        vectors.push(v);
    }

    if vectors.len() < 3 {
        return Err(CellError::TooFewVectors {
            found: vectors.len(),
        });
    }

    Ok(Matrix3::from_columns(&vectors))
}

/// Read and parse a cell file.
pub fn load_basis(path: &Path) -> Result<Matrix3<f64>, CellError> {
    let content = std::fs::read_to_string(path)?;
    parse_basis(&content)
}
