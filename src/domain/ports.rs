use crate::domain::model::{AnalysisResult, BillAnalysis, ParliamentBill};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn limit(&self) -> usize;
    fn site_base(&self) -> &str;
    fn analysis_delay(&self) -> Duration;
}

#[async_trait]
pub trait BillSource: Send + Sync {
    /// Most recently updated bills, withdrawn and defeated ones removed.
    async fn list_recent_bills(&self, limit: usize) -> Result<Vec<ParliamentBill>>;

    /// Plain text of the newest usable "Bill" publication, if any.
    async fn bill_text(&self, bill_id: u32) -> Option<String>;
}

#[async_trait]
pub trait Analyser: Send + Sync {
    async fn analyse(&self, title: &str, text: &str) -> Result<AnalysisResult>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn existing(&self) -> Result<Vec<BillAnalysis>>;
    async fn extract(&self) -> Result<Vec<ParliamentBill>>;
    async fn transform(
        &self,
        bills: Vec<ParliamentBill>,
        known_ids: &HashSet<u32>,
    ) -> Result<Vec<BillAnalysis>>;
    async fn load(&self, records: Vec<BillAnalysis>) -> Result<String>;
}
