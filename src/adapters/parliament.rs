use crate::domain::model::{
    ParliamentBill, ParliamentBillResponse, Publication, PublicationsResponse,
};
use crate::domain::ports::BillSource;
use crate::utils::error::{ImpactError, Result};
use crate::utils::html::extract_text;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::cmp::Reverse;

/// Stub documents (cover pages, "not yet available" notices) are shorter than this.
pub const MIN_TEXT_CHARS: usize = 500;

/// Client for the bills REST API.
pub struct BillsApiClient {
    client: Client,
    base_url: String,
}

impl BillsApiClient {
    /// `base_url` is the versioned API root, e.g. `https://bills-api.parliament.uk/api/v1`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn list_url(&self, limit: usize) -> String {
        format!(
            "{}/Bills?CurrentHouse=All&SortOrder=DateUpdatedDescending&Skip=0&Take={}",
            self.base_url, limit
        )
    }

    pub fn publications_url(&self, bill_id: u32) -> String {
        format!("{}/Bills/{}/Publications", self.base_url, bill_id)
    }

    pub fn download_url(&self, publication_id: u64, file_id: u64) -> String {
        format!(
            "{}/Publications/{}/Documents/{}/Download",
            self.base_url, publication_id, file_id
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImpactError::UpstreamStatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImpactError::UpstreamStatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// Downloads `url` and returns its text when it is long enough to be a real bill.
    async fn try_candidate(&self, url: &str) -> Option<String> {
        match self.get_text(url).await {
            Ok(html) => {
                let text = extract_text(&html);
                let chars = text.chars().count();
                if chars > MIN_TEXT_CHARS {
                    Some(text)
                } else {
                    tracing::debug!(url = %url, chars, "document too short, skipping");
                    None
                }
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "candidate download failed");
                None
            }
        }
    }

    async fn find_text(&self, bill_id: u32) -> Result<Option<String>> {
        let response: PublicationsResponse = self.get_json(&self.publications_url(bill_id)).await?;

        for publication in bill_publications_newest_first(response.publications) {
            if let Some(file) = publication.html_file() {
                let url = self.download_url(publication.id, file.id);
                if let Some(text) = self.try_candidate(&url).await {
                    return Ok(Some(text));
                }
            }

            if let Some(link) = publication.html_link() {
                if let Some(text) = self.try_candidate(&link.url).await {
                    return Ok(Some(text));
                }
            }
        }

        Ok(None)
    }
}

/// Keeps only "Bill" publications, newest display date first. Publications
/// with unreadable dates go last, in their original order.
pub fn bill_publications_newest_first(publications: Vec<Publication>) -> Vec<Publication> {
    let mut bills: Vec<Publication> = publications
        .into_iter()
        .filter(Publication::is_bill_text)
        .collect();
    bills.sort_by_key(|p| Reverse(p.display_timestamp()));
    bills
}

#[async_trait]
impl BillSource for BillsApiClient {
    async fn list_recent_bills(&self, limit: usize) -> Result<Vec<ParliamentBill>> {
        tracing::info!("📋 Fetching up to {} recent bills...", limit);

        let response: ParliamentBillResponse = self.get_json(&self.list_url(limit)).await?;
        let active: Vec<ParliamentBill> = response
            .items
            .into_iter()
            .filter(ParliamentBill::is_active)
            .collect();

        tracing::info!(
            "Found {} active bills (of {} total)",
            active.len(),
            response.total_results
        );
        Ok(active)
    }

    async fn bill_text(&self, bill_id: u32) -> Option<String> {
        match self.find_text(bill_id).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("⚠️ Error fetching publications for bill {}: {}", bill_id, e);
                None
            }
        }
    }
}
