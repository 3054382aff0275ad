//! Storage collaborator seam. The pipeline only needs get-or-create
//! idempotence on brand and model names plus an ad-create operation; the real
//! schema lives elsewhere. `MemoryStore` backs tests and local runs.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use crate::models::Listing;

pub type BrandId = u64;
pub type ModelId = u64;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("duplicate ad url: {0}")]
    DuplicateUrl(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Persistence operations the ingestion job needs.
#[async_trait]
pub trait AdStore: Send + Sync {
    /// Idempotent on the brand name.
    async fn get_or_create_brand(&self, name: &str) -> Result<BrandId, StoreError>;

    /// Idempotent on the model name.
    async fn get_or_create_model(&self, name: &str, brand: BrandId) -> Result<ModelId, StoreError>;

    async fn create_ad(
        &self,
        listing: &Listing,
        brand: BrandId,
        model: ModelId,
    ) -> Result<(), StoreError>;
}

/// One persisted ad row.
#[derive(Debug, Clone)]
pub struct StoredAd {
    pub brand: BrandId,
    pub model: ModelId,
    pub listing: Listing,
}

#[derive(Default)]
struct StoreInner {
    brands: Vec<String>,
    models: Vec<(String, BrandId)>,
    ads: Vec<StoredAd>,
    seen_urls: HashSet<String>,
}

/// In-memory store. Rejects duplicate ad URLs, which doubles as the
/// downstream URL-uniqueness filter.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ads(&self) -> Vec<StoredAd> {
        self.inner.lock().ads.clone()
    }

    pub fn brand_count(&self) -> usize {
        self.inner.lock().brands.len()
    }

    pub fn model_count(&self) -> usize {
        self.inner.lock().models.len()
    }
}

#[async_trait]
impl AdStore for MemoryStore {
    async fn get_or_create_brand(&self, name: &str) -> Result<BrandId, StoreError> {
        let mut inner = self.inner.lock();
        if let Some(idx) = inner.brands.iter().position(|b| b == name) {
            return Ok(idx as BrandId);
        }
        inner.brands.push(name.to_string());
        Ok((inner.brands.len() - 1) as BrandId)
    }

    async fn get_or_create_model(&self, name: &str, brand: BrandId) -> Result<ModelId, StoreError> {
        let mut inner = self.inner.lock();
        if let Some(idx) = inner.models.iter().position(|(m, _)| m == name) {
            return Ok(idx as ModelId);
        }
        inner.models.push((name.to_string(), brand));
        Ok((inner.models.len() - 1) as ModelId)
    }

    async fn create_ad(
        &self,
        listing: &Listing,
        brand: BrandId,
        model: ModelId,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        if !inner.seen_urls.insert(listing.url.clone()) {
            return Err(StoreError::DuplicateUrl(listing.url.clone()));
        }
        inner.ads.push(StoredAd {
            brand,
            model,
            listing: listing.clone(),
        });
        Ok(())
    }
}
