use crate::codec;
use crate::core::{ConfigProvider, ConversionOutput, Format, Pipeline, Record, Storage};
use crate::utils::error::Result;

/// Destination label returned by [`Pipeline::load`] when writing to stdout.
pub const STDOUT: &str = "<stdout>";

/// Converts one file: CSV becomes JSON, JSON becomes CSV.
pub struct ConversionPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    source: Format,
}

impl<S: Storage, C: ConfigProvider> ConversionPipeline<S, C> {
    /// Fails with `UnsupportedExtension` when no format is configured and the
    /// input extension is neither `.csv` nor `.json`.
    pub fn new(storage: S, config: C) -> Result<Self> {
        let source = match config.source_format() {
            Some(format) => format,
            None => Format::from_path(config.input_path())?,
        };

        Ok(Self {
            storage,
            config,
            source,
        })
    }

    pub fn source_format(&self) -> Format {
        self.source
    }

    pub fn target_format(&self) -> Format {
        self.source.target()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ConversionPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let path = self.config.input_path();
        tracing::debug!("Reading {} input from: {}", self.source, path);

        let bytes = self.storage.read_file(path).await?;
        tracing::debug!("Read {} bytes", bytes.len());

        codec::decode(&bytes, self.source, &self.config.csv_options())
    }

    async fn transform(&self, data: Vec<Record>) -> Result<ConversionOutput> {
        let target = self.target_format();
        let (header, content) = codec::encode(&data, target, &self.config.csv_options())?;

        if let Some(columns) = &header {
            tracing::debug!("CSV header: {}", columns.join(","));
        }

        Ok(ConversionOutput {
            source: self.source,
            target,
            records: data.len(),
            header,
            content,
        })
    }

    /// Writes the converted text to the output file, or stdout when none is
    /// configured, and returns where it went.
    ///
    /// A trailing newline is appended only when the text does not already end
    /// with one, so CSV output never ends in a blank line.
    async fn load(&self, output: ConversionOutput) -> Result<String> {
        let mut data = output.content.into_bytes();
        if !data.ends_with(b"\n") {
            data.push(b'\n');
        }

        match self.config.output_path() {
            Some(path) => {
                tracing::debug!("Writing {} bytes to {}", data.len(), path);
                self.storage.write_file(path, &data).await?;
                Ok(path.to_string())
            }
            None => {
                self.storage.write_stdout(&data).await?;
                Ok(STDOUT.to_string())
            }
        }
    }
}
