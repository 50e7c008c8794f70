//! Converts CSV files to JSON and JSON files to CSV.
//!
//! The codecs in [`codec`] are plain functions over [`Record`] sequences.
//! [`ConversionPipeline`] and [`ConvertEngine`] wire them to storage and
//! configuration for the `csvjson` binary.

pub mod codec;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, ConvertConfig};
pub use core::{engine::ConvertEngine, pipeline::ConversionPipeline};
pub use domain::model::{ConversionOutput, CsvOptions, Format, Record, SchemaPolicy};
pub use utils::error::{ConvertError, Result};
