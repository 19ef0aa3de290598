use crate::core::store::AnalysisStore;
use crate::domain::model::{Bill, BillAnalysis, ParliamentBill};
use crate::domain::ports::{Analyser, BillSource, ConfigProvider, Pipeline, Storage};
use crate::utils::error::Result;
use std::collections::HashSet;

/// Fetch → extract → analyse → store, one bill at a time.
pub struct BillPipeline<B: BillSource, A: Analyser, S: Storage, C: ConfigProvider> {
    source: B,
    analyser: A,
    store: AnalysisStore<S>,
    config: C,
}

impl<B: BillSource, A: Analyser, S: Storage, C: ConfigProvider> BillPipeline<B, A, S, C> {
    pub fn new(source: B, analyser: A, store: AnalysisStore<S>, config: C) -> Self {
        Self {
            source,
            analyser,
            store,
            config,
        }
    }

    /// Produces the single record for a bill that is not in the store yet.
    async fn process(&self, upstream: &ParliamentBill) -> (BillAnalysis, bool) {
        let bill = Bill::from_upstream(upstream, self.config.site_base());

        let Some(text) = self.source.bill_text(bill.bill_id).await else {
            tracing::warn!(
                "⚠️ No full text available for \"{}\", skipping analysis",
                bill.short_title
            );
            return (BillAnalysis::text_unavailable(bill), false);
        };

        tracing::info!("📄 Got bill text ({} chars)", text.chars().count());
        tracing::info!("🤖 Analysing...");

        match self.analyser.analyse(&bill.short_title, &text).await {
            Ok(result) => {
                tracing::info!("✅ Analysis complete");
                (BillAnalysis::analysed(bill, result), true)
            }
            Err(e) => {
                tracing::error!("❌ Analysis failed for bill {}: {}", bill.bill_id, e);
                (BillAnalysis::failed(bill), false)
            }
        }
    }
}

#[async_trait::async_trait]
impl<B, A, S, C> Pipeline for BillPipeline<B, A, S, C>
where
    B: BillSource,
    A: Analyser,
    S: Storage,
    C: ConfigProvider,
{
    async fn existing(&self) -> Result<Vec<BillAnalysis>> {
        Ok(self.store.load().await)
    }

    async fn extract(&self) -> Result<Vec<ParliamentBill>> {
        self.source.list_recent_bills(self.config.limit()).await
    }

    async fn transform(
        &self,
        bills: Vec<ParliamentBill>,
        known_ids: &HashSet<u32>,
    ) -> Result<Vec<BillAnalysis>> {
        let mut fresh = Vec::new();
        let mut seen = known_ids.clone();

        for upstream in bills {
            if !seen.insert(upstream.bill_id) {
                tracing::info!("⏭️ Skipping \"{}\" (already analysed)", upstream.short_title);
                continue;
            }

            tracing::info!("🔍 Processing: \"{}\"", upstream.short_title);
            let (record, analysed) = self.process(&upstream).await;
            fresh.push(record);

            // Pacing for the model provider; only successful calls count.
            if analysed && !self.config.analysis_delay().is_zero() {
                tokio::time::sleep(self.config.analysis_delay()).await;
            }
        }

        Ok(fresh)
    }

    async fn load(&self, records: Vec<BillAnalysis>) -> Result<String> {
        self.store.persist(&records).await?;
        Ok(self.config.output_path().to_string())
    }
}
