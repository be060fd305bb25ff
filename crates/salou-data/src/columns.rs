//! Shared helpers for reading text tables with polars.

use polars::prelude::*;
use salou_traits::{Date, Result, SalouError};
use std::path::Path;

/// Reads a delimited file with every column kept as text.
///
/// Type conversion is left to the caller so a single bad cell drops a row
/// instead of failing the whole read.
pub(crate) fn read_text_table(path: &Path, separator: u8) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Borrows a text column, mapping absence to [`SalouError::MissingColumn`].
pub(crate) fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    let column = df
        .column(name)
        .map_err(|_| SalouError::MissingColumn(name.to_string()))?;
    Ok(column.as_materialized_series().str()?)
}

pub(crate) fn parse_date(value: &str) -> Option<Date> {
    let value = value.trim();
    Date::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| Date::parse_from_str(value, "%Y%m%d"))
        .ok()
}

/// Parses a numeric cell. `nan` and `inf` spellings count as missing.
pub(crate) fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
