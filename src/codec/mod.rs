//! CSV and JSON codecs over [`Record`] sequences.
//!
//! Each codec is a pair of stateless functions. [`decode`] and [`encode`]
//! dispatch on [`Format`] so callers do not match on it themselves.

pub mod csv_codec;
pub mod json_codec;

use crate::domain::model::{CsvOptions, Format, Record};
use crate::utils::error::Result;
use serde_json::Value;

pub fn decode(bytes: &[u8], format: Format, options: &CsvOptions) -> Result<Vec<Record>> {
    match format {
        Format::Csv => csv_codec::decode(bytes, options),
        Format::Json => json_codec::decode(bytes),
    }
}

/// Encodes `records` as `format`. The header is returned for CSV output only.
pub fn encode(
    records: &[Record],
    format: Format,
    options: &CsvOptions,
) -> Result<(Option<Vec<String>>, String)> {
    match format {
        Format::Csv => {
            let (header, text) = csv_codec::encode(records, options)?;
            Ok((Some(header), text))
        }
        Format::Json => Ok((None, json_codec::encode(records)?)),
    }
}

/// Article-prefixed JSON type name for error messages, e.g. "a number".
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
