//! Readers for flat position assets
//!
//! A position asset is an ordered sequence of floats, three per point. Two
//! encodings are accepted:
//! - JSON: either a flat number array or an array of `[x, y, z]` triplets
//! - delimited text (`.xyz`, `.txt`, `.csv`): numbers separated by
//!   whitespace and/or commas, with `#` starting a comment

use serde::Deserialize;
use std::path::Path;

use pointpick_core::{Error, PointDataset, Result};

use crate::error::IoError;

/// Supported position encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFormat {
    Json,
    Text,
}

impl PositionFormat {
    /// Pick the encoding from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "xyz" | "txt" | "csv" => Some(Self::Text),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonPositions {
    Flat(Vec<f32>),
    Triplets(Vec<[f32; 3]>),
}

/// Parse a JSON position array
pub fn parse_positions_json(source: &str) -> std::result::Result<Vec<f32>, IoError> {
    let parsed: JsonPositions = serde_json::from_str(source)?;
    Ok(match parsed {
        JsonPositions::Flat(values) => values,
        JsonPositions::Triplets(triplets) => triplets.into_iter().flatten().collect(),
    })
}

/// Parse whitespace/comma separated numbers
pub fn parse_positions_text(source: &str) -> std::result::Result<Vec<f32>, IoError> {
    let mut values = Vec::new();

    for line in source.lines() {
        let content = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };

        for token in content
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let value: f32 = token.parse().map_err(|_| IoError::ParseError {
                token: values.len(),
                message: format!("'{}' is not a number", token),
            })?;
            values.push(value);
        }
    }

    Ok(values)
}

/// Read a flat position sequence from disk, choosing the parser by extension
pub fn read_positions<P: AsRef<Path>>(path: P) -> Result<Vec<f32>> {
    let path = path.as_ref();
    let format = PositionFormat::from_path(path).ok_or_else(|| {
        Error::UnsupportedFormat(format!("Unsupported position format: {:?}", path.extension()))
    })?;

    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let source = std::fs::read_to_string(path)?;
    let values = match format {
        PositionFormat::Json => parse_positions_json(&source)?,
        PositionFormat::Text => parse_positions_text(&source)?,
    };

    log::info!("Read {} position values from {}", values.len(), path.display());
    Ok(values)
}

/// Read a position asset and build a dataset from it
pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<PointDataset> {
    PointDataset::load(read_positions(path)?)
}
