use crate::domain::model::{ConversionOutput, CsvOptions, Format, Record};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Writes to the data output channel (stdout for the CLI).
    fn write_stdout(&self, data: &[u8]) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> Option<&str>;
    /// Explicit source format; `None` means sniff the input extension.
    fn source_format(&self) -> Option<Format>;
    fn csv_options(&self) -> CsvOptions;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Record>>;
    async fn transform(&self, data: Vec<Record>) -> Result<ConversionOutput>;
    async fn load(&self, output: ConversionOutput) -> Result<String>;
}
