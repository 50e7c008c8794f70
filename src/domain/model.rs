use crate::utils::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// One row of a CSV file or one object of a JSON array.
///
/// Keys keep insertion order, so encoders reproduce the same key order the
/// decoder saw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.data.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    /// Picks the format from the file extension, ignoring case.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let extension = path
            .as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();

        if extension.eq_ignore_ascii_case("csv") {
            Ok(Format::Csv)
        } else if extension.eq_ignore_ascii_case("json") {
            Ok(Format::Json)
        } else {
            Err(ConvertError::UnsupportedExtension { extension })
        }
    }

    /// The format a file of this format is converted into.
    pub fn target(self) -> Self {
        match self {
            Format::Csv => Format::Json,
            Format::Json => Format::Csv,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Csv => write!(f, "CSV"),
            Format::Json => write!(f, "JSON"),
        }
    }
}

/// How the CSV encoder treats records whose key sets differ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SchemaPolicy {
    /// Header comes from the first record; every record must match it.
    #[default]
    Strict,
    /// Header is the union of all keys; absent keys become empty fields.
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub schema: SchemaPolicy,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            schema: SchemaPolicy::Strict,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversionOutput {
    pub source: Format,
    pub target: Format,
    pub records: usize,
    /// Column order of the CSV output; `None` when the target is JSON.
    pub header: Option<Vec<String>>,
    pub content: String,
}
