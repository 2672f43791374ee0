use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct RoundingEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> RoundingEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Fetching time entries");
        let raw = self.pipeline.extract().await?;
        tracing::info!("Fetched {} time entries", raw.len());

        let outcome = self.pipeline.transform(raw).await?;
        tracing::info!("Rounded {} entries", outcome.entries.len());
        if !outcome.rejected.is_empty() {
            tracing::warn!("Skipped {} invalid entries", outcome.rejected.len());
        }
        let reversed = outcome
            .entries
            .iter()
            .filter(|entry| entry.duration < 0)
            .count();
        if reversed > 0 {
            tracing::warn!(
                "{} entries stop before they start after rounding; check the source data",
                reversed
            );
        }
        if !outcome.filler.is_empty() {
            tracing::info!("Generated {} admin filler entries", outcome.filler.len());
        }

        let summary = self.pipeline.load(outcome).await?;
        tracing::info!("Update complete");

        Ok(summary)
    }
}
