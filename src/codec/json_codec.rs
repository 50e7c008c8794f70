use crate::codec::json_type_name;
use crate::domain::model::{Format, Record};
use crate::utils::error::{ConvertError, Result};
use serde_json::Value;

/// Parses a JSON array of objects. Values and key order are kept verbatim.
pub fn decode(bytes: &[u8]) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_slice(bytes).map_err(ConvertError::JsonError)?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ConvertError::ParseError {
                format: Format::Json,
                message: format!(
                    "top-level value must be an array, found {}",
                    json_type_name(&other)
                ),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(data) => Ok(Record::from(data)),
            other => Err(ConvertError::ParseError {
                format: Format::Json,
                message: format!(
                    "element {} must be an object, found {}",
                    index,
                    json_type_name(&other)
                ),
            }),
        })
        .collect()
}

/// Pretty-prints records as a JSON array with 2-space indentation.
pub fn encode(records: &[Record]) -> Result<String> {
    serde_json::to_string_pretty(records).map_err(|e| ConvertError::SerializationError {
        message: e.to_string(),
    })
}
