use crate::core::store::{known_ids, merge};
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub new_records: usize,
    pub total_records: usize,
    pub output_path: String,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Nothing is written unless listing succeeds; per-bill problems never abort the run.
    pub async fn run(&self) -> Result<RunReport> {
        let existing = self.pipeline.existing().await?;
        let known = known_ids(&existing);
        tracing::info!("Store holds {} analysed bills", existing.len());

        let bills = self.pipeline.extract().await?;

        let fresh = self.pipeline.transform(bills, &known).await?;
        let new_records = fresh.len();

        let records = merge(existing, fresh);
        let total_records = records.len();
        let output_path = self.pipeline.load(records).await?;

        tracing::info!(
            "🎉 Done! Processed {} new bills. Total: {}",
            new_records,
            total_records
        );
        Ok(RunReport {
            new_records,
            total_records,
            output_path,
        })
    }
}
