use crate::domain::model::BillAnalysis;
use crate::domain::ports::Storage;
use crate::utils::error::{ImpactError, Result};
use std::collections::HashSet;

/// Flat JSON file of every analysed bill.
pub struct AnalysisStore<S: Storage> {
    storage: S,
    file_name: String,
}

impl<S: Storage> AnalysisStore<S> {
    pub fn new(storage: S, file_name: impl Into<String>) -> Self {
        Self {
            storage,
            file_name: file_name.into(),
        }
    }

    /// Loads every stored record. A missing file is an empty store, and so is
    /// a file that cannot be parsed.
    pub async fn load(&self) -> Vec<BillAnalysis> {
        let data = match self.storage.read_file(&self.file_name).await {
            Ok(data) => data,
            Err(ImpactError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No existing store at {}", self.file_name);
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not read {}: {}; starting empty", self.file_name, e);
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<BillAnalysis>>(&data) {
            Ok(records) => {
                tracing::debug!("Loaded {} stored analyses", records.len());
                records
            }
            Err(e) => {
                // TODO: move the unreadable file aside before the end of the run
                // overwrites it.
                tracing::warn!(
                    "⚠️ Existing store {} is malformed ({}); treating it as empty",
                    self.file_name,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Replaces the whole file with `records`.
    pub async fn persist(&self, records: &[BillAnalysis]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)?;
        tracing::debug!("Writing {} records ({} bytes)", records.len(), json.len());
        self.storage.write_file(&self.file_name, &json).await
    }

    pub async fn all(&self) -> Vec<BillAnalysis> {
        self.load().await
    }

    pub async fn find(&self, bill_id: u32) -> Option<BillAnalysis> {
        self.load()
            .await
            .into_iter()
            .find(|record| record.bill_id() == bill_id)
    }
}

pub fn known_ids(records: &[BillAnalysis]) -> HashSet<u32> {
    records.iter().map(BillAnalysis::bill_id).collect()
}

/// Appends `fresh` to `existing`, dropping any record whose id is already present.
pub fn merge(existing: Vec<BillAnalysis>, fresh: Vec<BillAnalysis>) -> Vec<BillAnalysis> {
    let mut seen = known_ids(&existing);
    let mut merged = existing;
    for record in fresh {
        if seen.insert(record.bill_id()) {
            merged.push(record);
        } else {
            tracing::debug!("Dropping duplicate record for bill {}", record.bill_id());
        }
    }
    merged
}
