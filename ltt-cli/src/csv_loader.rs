//! CSV loader for batch land transfer tax quotes.
//!
//! ## CSV Format
//!
//! Column order does **not** matter (headers are matched by name). Header
//! names are case-sensitive.
//!
//! | Column             | Required | Type    | Notes                                        |
//! |--------------------|----------|---------|----------------------------------------------|
//! | `price`            | yes      | decimal | `$` and `,` are allowed, e.g. `"$1,250,000"` |
//! | `location`         | no       | string  | `toronto` (default) or `other`               |
//! | `first_time_buyer` | no       | bool    | `true` / `false`, empty means `false`        |
//!
//! ### Example
//!
//! ```csv
//! price,location,first_time_buyer
//! 400000,toronto,true
//! "$1,250,000",other,
//! ```
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use ltt_core::{CalculationInput, Jurisdiction};

use crate::utils::{ParsePriceError, parse_price};

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    price: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    first_time_buyer: Option<bool>,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or converting CSV data.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// The underlying CSV deserialisation failed (bad structure, missing
    /// required column, type mismatch, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A `price` cell is not a number.
    #[error("row {row}: {source}")]
    InvalidPrice {
        row: usize,
        #[source]
        source: ParsePriceError,
    },

    /// A `location` cell is not one of the recognised codes.
    #[error("unrecognised location '{location}' on row {row}")]
    InvalidLocation { location: String, row: usize },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

/// Convert a single CSV row into a CalculationInput.
///
/// row_number is 1-based (for error messages).
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<CalculationInput, CsvLoadError> {
    let price = parse_price(&row.price).map_err(|source| CsvLoadError::InvalidPrice {
        row: row_number,
        source,
    })?;

    let jurisdiction = match row.location.as_deref().map(str::trim) {
        None | Some("") => Jurisdiction::default(),
        Some(location) => {
            Jurisdiction::parse(location).ok_or_else(|| CsvLoadError::InvalidLocation {
                location: location.to_string(),
                row: row_number,
            })?
        }
    };

    Ok(CalculationInput {
        price,
        jurisdiction,
        first_time_buyer: row.first_time_buyer.unwrap_or(false),
    })
}

/// Parse CSV from any reader and return the quote requests in file order.
///
/// # Errors
///
/// * [CsvLoadError::Parse] – if the CSV is structurally invalid or a
///   required field cannot be deserialised.
/// * [CsvLoadError::InvalidPrice] / [CsvLoadError::InvalidLocation] – if a
///   row carries a value the calculator cannot accept.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<CalculationInput>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All) // tolerate whitespace around values
        .flexible(false) // strict column count
        .from_reader(reader);

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            let row_number = idx + 1; // 1-based for user-facing messages
            convert_row(row, row_number)
        })
        .collect()
}

/// Parse CSV text held in memory.
pub fn load_from_str(input: &str) -> Result<Vec<CalculationInput>, CsvLoadError> {
    load_from_reader(input.as_bytes())
}

/// Convenience wrapper: open a file on disk and delegate to [load_from_reader].
pub fn load_from_file(path: &Path) -> Result<Vec<CalculationInput>, CsvLoadError> {
    let file = std::fs::File::open(path).map_err(|source| CsvLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load_from_reader(file)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
