pub mod cli;
pub mod toml_config;

use crate::core::{ConfigProvider, CsvOptions, Format};
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};

#[cfg(feature = "cli")]
use crate::config::toml_config::ProfileConfig;
#[cfg(feature = "cli")]
use crate::core::SchemaPolicy;
#[cfg(feature = "cli")]
use crate::utils::validation::parse_delimiter;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "csvjson")]
#[command(about = "Convert CSV files to JSON and JSON files to CSV", version)]
pub struct CliConfig {
    /// File to convert: .csv becomes JSON, .json becomes CSV
    pub input: String,

    /// Source format, overriding the file extension
    #[arg(short = 'f', long = "from", value_enum)]
    pub from: Option<Format>,

    /// Write the result to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// CSV field delimiter [default: ,]
    #[arg(short, long)]
    pub delimiter: Option<String>,

    /// How JSON records with differing keys become CSV columns [default: strict]
    #[arg(long, value_enum)]
    pub schema: Option<SchemaPolicy>,

    /// TOML profile with conversion defaults
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Merges flags over the profile (if any) over built-in defaults.
    pub fn resolve(&self) -> Result<ConvertConfig> {
        let profile = match &self.config {
            Some(path) => {
                tracing::debug!("Loading profile from: {}", path);
                let profile = ProfileConfig::from_file(path)?;
                profile.validate()?;
                profile
            }
            None => ProfileConfig::default(),
        };

        let delimiter = match (&self.delimiter, profile.delimiter()) {
            (Some(flag), _) => parse_delimiter("--delimiter", flag)?,
            (None, Some(value)) => parse_delimiter("csv.delimiter", value)?,
            (None, None) => CsvOptions::default().delimiter,
        };

        Ok(ConvertConfig {
            input_path: self.input.clone(),
            output_path: self
                .output
                .clone()
                .or_else(|| profile.output_path().map(str::to_string)),
            format: self.from.or(profile.format()),
            csv: CsvOptions {
                delimiter,
                schema: self.schema.or(profile.schema()).unwrap_or_default(),
            },
        })
    }
}

/// Fully resolved settings for one conversion.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input_path: String,
    pub output_path: Option<String>,
    pub format: Option<Format>,
    pub csv: CsvOptions,
}

impl ConvertConfig {
    pub fn new(input_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: None,
            format: None,
            csv: CsvOptions::default(),
        }
    }
}

impl Validate for ConvertConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input_path)?;
        if let Some(output) = &self.output_path {
            validate_path("output", output)?;
        }
        Ok(())
    }
}

impl ConfigProvider for ConvertConfig {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }

    fn source_format(&self) -> Option<Format> {
        self.format
    }

    fn csv_options(&self) -> CsvOptions {
        self.csv
    }
}
