use crate::utils::error::{ConvertError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ConvertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Parses a CSV delimiter: exactly one ASCII character that is not a quote
/// or a line break.
pub fn parse_delimiter(field_name: &str, value: &str) -> Result<u8> {
    let invalid = |reason: &str| ConvertError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    // a single UTF-8 byte is always ASCII
    let &[byte] = value.as_bytes() else {
        return Err(invalid("Delimiter must be exactly one ASCII character"));
    };

    if matches!(byte, b'"' | b'\r' | b'\n') {
        return Err(invalid("Delimiter cannot be a quote or a line break"));
    }

    Ok(byte)
}

pub fn validate_delimiter(field_name: &str, value: &str) -> Result<()> {
    parse_delimiter(field_name, value).map(|_| ())
}
