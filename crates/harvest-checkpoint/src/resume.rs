//! Typed view of the resume layout.
//!
//! The engine reads the cursor once at startup and writes after every
//! seller; the CLI reads everything for `status`, `export` and `show`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

use harvest_protocols::{BreadcrumbStep, KeyValueStore, SellerRecord, StoreError};

/// Storage key names.
pub mod keys {
    pub const SELLER_DATA: &str = "sellerData";
    pub const CURRENT_SELLER_INDEX: &str = "currentSellerIndex";
    pub const TOTAL_SELLERS: &str = "totalSellers";
    pub const CATEGORY_NAME: &str = "categoryName";
    pub const BREADCRUMB_STEPS: &str = "breadcrumbSteps";
    pub const PREVIOUS_SELLER_ID: &str = "previousSellerId";
}

/// Everything the store holds, read in one go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSnapshot {
    pub seller_data: Vec<SellerRecord>,
    pub current_seller_index: usize,
    pub total_sellers: Option<usize>,
    pub category_name: Option<String>,
    pub breadcrumb_steps: Vec<BreadcrumbStep>,
    pub previous_seller_id: Option<String>,
}

impl ResumeSnapshot {
    /// Sellers still to process, when the total is known.
    pub fn remaining(&self) -> Option<usize> {
        self.total_sellers
            .map(|total| total.saturating_sub(self.current_seller_index))
    }
}

/// Resume store over any [`KeyValueStore`] backend.
///
/// The plain readers never fail: absent or unreadable values fall back to
/// their defaults, which is what the viewer wants. The `try_` readers are
/// for the engine, which rewrites `sellerData` from what it read and must not
/// start from an empty list when the stored one is merely unreadable.
/// Writes propagate backend errors.
#[derive(Clone)]
pub struct ResumeStore {
    backend: Arc<dyn KeyValueStore>,
}

impl ResumeStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = match self.backend.get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read '{}' from resume store: {}", key, e);
                return None;
            }
        };

        if value.is_null() {
            return None;
        }

        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Ignoring unreadable '{}' in resume store: {}", key, e);
                None
            }
        }
    }

    /// Absent or null is `Ok(None)`; present but undecodable is an error.
    async fn try_read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(value) = self.backend.get(key).await? else {
            return Ok(None);
        };
        if value.is_null() {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::InvalidData(format!("'{}': {}", key, e)))
    }

    fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Value, StoreError> {
        Ok(serde_json::to_value(value)?)
    }

    /// Accumulated records in processing order.
    pub async fn records(&self) -> Vec<SellerRecord> {
        self.read(keys::SELLER_DATA).await.unwrap_or_default()
    }

    /// Like [`records`](Self::records), but an unreadable list is an error.
    pub async fn try_records(&self) -> Result<Vec<SellerRecord>, StoreError> {
        Ok(self.try_read(keys::SELLER_DATA).await?.unwrap_or_default())
    }

    pub async fn save_records(&self, records: &[SellerRecord]) -> Result<(), StoreError> {
        self.backend
            .set(keys::SELLER_DATA, Self::encode(records)?)
            .await
    }

    /// Index of the next seller to process.
    pub async fn cursor(&self) -> usize {
        self.read(keys::CURRENT_SELLER_INDEX).await.unwrap_or(0)
    }

    /// Like [`cursor`](Self::cursor), but an unreadable cursor is an error.
    pub async fn try_cursor(&self) -> Result<usize, StoreError> {
        Ok(self.try_read(keys::CURRENT_SELLER_INDEX).await?.unwrap_or(0))
    }

    pub async fn save_cursor(&self, cursor: usize) -> Result<(), StoreError> {
        self.backend
            .set(keys::CURRENT_SELLER_INDEX, json!(cursor))
            .await
    }

    pub async fn total_sellers(&self) -> Option<usize> {
        self.read(keys::TOTAL_SELLERS).await
    }

    pub async fn save_total_sellers(&self, total: usize) -> Result<(), StoreError> {
        self.backend.set(keys::TOTAL_SELLERS, json!(total)).await
    }

    pub async fn category_name(&self) -> Option<String> {
        self.read(keys::CATEGORY_NAME).await
    }

    pub async fn save_category_name(&self, name: Option<&str>) -> Result<(), StoreError> {
        self.backend.set(keys::CATEGORY_NAME, json!(name)).await
    }

    pub async fn breadcrumbs(&self) -> Vec<BreadcrumbStep> {
        self.read(keys::BREADCRUMB_STEPS).await.unwrap_or_default()
    }

    pub async fn save_breadcrumbs(&self, steps: &[BreadcrumbStep]) -> Result<(), StoreError> {
        self.backend
            .set(keys::BREADCRUMB_STEPS, Self::encode(steps)?)
            .await
    }

    /// Facet id of the last processed seller.
    pub async fn previous_seller(&self) -> Option<String> {
        self.read(keys::PREVIOUS_SELLER_ID).await
    }

    pub async fn save_previous_seller(&self, seller_id: &str) -> Result<(), StoreError> {
        self.backend
            .set(keys::PREVIOUS_SELLER_ID, json!(seller_id))
            .await
    }

    /// Persist one finished seller: the record list, the advanced cursor and
    /// the seller id, in a single write.
    pub async fn commit_seller(
        &self,
        records: &[SellerRecord],
        next_cursor: usize,
        seller_id: &str,
    ) -> Result<(), StoreError> {
        self.backend
            .set_many(vec![
                (keys::SELLER_DATA.to_string(), Self::encode(records)?),
                (keys::CURRENT_SELLER_INDEX.to_string(), json!(next_cursor)),
                (keys::PREVIOUS_SELLER_ID.to_string(), json!(seller_id)),
            ])
            .await?;

        debug!(
            records = records.len(),
            cursor = next_cursor,
            seller = %seller_id,
            "Committed seller"
        );
        Ok(())
    }

    /// Rewind to the first seller after a completed run. Records are kept.
    pub async fn reset_progress(&self) -> Result<(), StoreError> {
        self.backend
            .set_many(vec![
                (keys::CURRENT_SELLER_INDEX.to_string(), json!(0)),
                (keys::PREVIOUS_SELLER_ID.to_string(), Value::Null),
            ])
            .await
    }

    pub async fn snapshot(&self) -> ResumeSnapshot {
        ResumeSnapshot {
            seller_data: self.records().await,
            current_seller_index: self.cursor().await,
            total_sellers: self.total_sellers().await,
            category_name: self.category_name().await,
            breadcrumb_steps: self.breadcrumbs().await,
            previous_seller_id: self.previous_seller().await,
        }
    }

    /// Drop collected records and progress. Category context is kept.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.backend
            .remove(&[
                keys::SELLER_DATA,
                keys::CURRENT_SELLER_INDEX,
                keys::PREVIOUS_SELLER_ID,
            ])
            .await
    }
}
