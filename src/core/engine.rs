use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct ConvertEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ConvertEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load in order and returns where the
    /// output went. The first failing stage aborts the conversion.
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::debug!("Starting conversion");

        // Extract
        let records = self.pipeline.extract().await?;
        tracing::debug!("Decoded {} records", records.len());

        // Transform
        let output = self.pipeline.transform(records).await?;
        tracing::info!(
            "Converted {} records from {} to {}",
            output.records,
            output.source,
            output.target
        );

        // Load
        let destination = self.pipeline.load(output).await?;
        tracing::debug!("Output written to {} in {:?}", destination, started.elapsed());

        Ok(destination)
    }
}
