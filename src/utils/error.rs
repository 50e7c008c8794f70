use crate::domain::model::Format;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON parse error: {0}")]
    JsonError(serde_json::Error),

    #[error("Invalid {format} input: {message}")]
    ParseError { format: Format, message: String },

    #[error("Malformed row at line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Record {record}: field '{field}' is {found}, expected a string")]
    TypeError {
        record: usize,
        field: String,
        found: &'static str,
    },

    #[error("No record keys to derive a CSV header from")]
    EmptyInput,

    #[error("Record {record} does not match the header (missing: [{}], unexpected: [{}])", .missing.join(", "), .unexpected.join(", "))]
    SchemaMismatch {
        record: usize,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    #[error("Unsupported file extension: '{extension}'")]
    UnsupportedExtension { extension: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Input,
    Schema,
    Usage,
    Internal,
}

impl ConvertError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConvertError::IoError(_) => ErrorCategory::Io,
            ConvertError::CsvError(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                ErrorCategory::Io
            }
            ConvertError::CsvError(_)
            | ConvertError::JsonError(_)
            | ConvertError::ParseError { .. }
            | ConvertError::MalformedRow { .. } => ErrorCategory::Input,
            ConvertError::TypeError { .. }
            | ConvertError::EmptyInput
            | ConvertError::SchemaMismatch { .. } => ErrorCategory::Schema,
            ConvertError::UnsupportedExtension { .. }
            | ConvertError::ConfigError { .. }
            | ConvertError::InvalidConfigValueError { .. } => ErrorCategory::Usage,
            ConvertError::SerializationError { .. } => ErrorCategory::Internal,
        }
    }

    /// Process exit status for this error. Never zero.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Schema | ErrorCategory::Internal => 1,
            ErrorCategory::Usage => 2,
            ErrorCategory::Io => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ConvertError::IoError(e) => format!("Could not read or write a file: {}", e),
            ConvertError::EmptyInput => {
                "The JSON input holds no records with keys, so there is no header to write".to_string()
            }
            ConvertError::UnsupportedExtension { extension } if extension.is_empty() => {
                "The input file has no extension; expected .csv or .json".to_string()
            }
            ConvertError::UnsupportedExtension { extension } => {
                format!("unexpected file extension: .{}", extension)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ConvertError::IoError(_) => "Check that the path exists and is readable",
            ConvertError::CsvError(_) | ConvertError::MalformedRow { .. } => {
                "Make sure every row has the same number of fields as the header and quotes are balanced"
            }
            ConvertError::JsonError(_) | ConvertError::ParseError { .. } => {
                "The input must be a JSON array of flat objects"
            }
            ConvertError::TypeError { .. } => {
                "Quote numbers, booleans and nulls as JSON strings before converting to CSV"
            }
            ConvertError::EmptyInput => "Provide at least one record with at least one key",
            ConvertError::SchemaMismatch { .. } => {
                "Give every record the same keys, or pass --schema union"
            }
            ConvertError::UnsupportedExtension { .. } => {
                "Rename the file to .csv or .json, or pass --from"
            }
            ConvertError::ConfigError { .. } | ConvertError::InvalidConfigValueError { .. } => {
                "Check the command-line flags and profile"
            }
            ConvertError::SerializationError { .. } => "This is a bug; please report it",
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_error_exits_non_zero() {
        let errors = vec![
            ConvertError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
            ConvertError::MalformedRow {
                line: 2,
                expected: 3,
                found: 2,
            },
            ConvertError::EmptyInput,
            ConvertError::UnsupportedExtension {
                extension: "txt".to_string(),
            },
            ConvertError::SerializationError {
                message: "boom".to_string(),
            },
        ];

        for error in errors {
            assert_ne!(error.exit_code(), 0, "{} exited with 0", error);
        }
    }

    #[test]
    fn test_exit_codes_follow_category() {
        let io = ConvertError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(io.category(), ErrorCategory::Io);
        assert_eq!(io.exit_code(), 3);

        let usage = ConvertError::UnsupportedExtension {
            extension: "txt".to_string(),
        };
        assert_eq!(usage.category(), ErrorCategory::Usage);
        assert_eq!(usage.exit_code(), 2);

        let schema = ConvertError::TypeError {
            record: 0,
            field: "age".to_string(),
            found: "number",
        };
        assert_eq!(schema.category(), ErrorCategory::Schema);
        assert_eq!(schema.exit_code(), 1);
    }

    #[test]
    fn test_config_errors_are_usage_errors() {
        let errors = vec![
            ConvertError::ConfigError {
                message: "bad toml".to_string(),
            },
            ConvertError::InvalidConfigValueError {
                field: "csv.delimiter".to_string(),
                value: ";;".to_string(),
                reason: "too long".to_string(),
            },
        ];

        for error in errors {
            assert_eq!(error.category(), ErrorCategory::Usage);
            assert_eq!(error.exit_code(), 2);
            assert_eq!(
                error.recovery_suggestion(),
                "Check the command-line flags and profile"
            );
        }
    }

    #[test]
    fn test_schema_mismatch_message_lists_keys() {
        let error = ConvertError::SchemaMismatch {
            record: 1,
            missing: vec!["b".to_string()],
            unexpected: vec!["c".to_string(), "d".to_string()],
        };

        assert_eq!(
            error.to_string(),
            "Record 1 does not match the header (missing: [b], unexpected: [c, d])"
        );
    }

    #[test]
    fn test_unsupported_extension_message() {
        let error = ConvertError::UnsupportedExtension {
            extension: "txt".to_string(),
        };
        assert_eq!(error.user_friendly_message(), "unexpected file extension: .txt");

        let bare = ConvertError::UnsupportedExtension {
            extension: String::new(),
        };
        assert!(bare.user_friendly_message().contains("no extension"));
    }
}
