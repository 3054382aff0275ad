//! Top-level job driver: scrape the configured page range in batches, then
//! persist the records that pass the domain filter.

use tracing::{error, info};

use crate::models::Listing;
use crate::scrapers::error::Result;
use crate::scrapers::{OlxScraper, ScrapeParams};
use crate::storage::{AdStore, StoreError};

/// Summary counters for one ingestion run.
#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    /// Records built across the whole page range.
    pub scraped: usize,
    /// Records that passed the filter and were persisted.
    pub created: usize,
}

pub struct IngestJob<S> {
    scraper: OlxScraper,
    store: S,
    params: ScrapeParams,
}

impl<S: AdStore> IngestJob<S> {
    pub fn new(params: ScrapeParams, store: S) -> Result<Self> {
        let scraper = OlxScraper::with_params(params.clone())?;
        Ok(Self {
            scraper,
            store,
            params,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs the full job. The accumulated records live in the returned vec
    /// (created at job start, handed off at job end) alongside the run
    /// counters.
    pub async fn run(&self) -> (Vec<Listing>, IngestReport) {
        info!("Begin scraping..");
        let listings = self.scrape_all().await;

        let mut created = 0usize;
        for listing in &listings {
            if !listing.is_cash_sale() {
                continue;
            }
            match self.persist(listing).await {
                Ok(()) => {
                    created += 1;
                    info!(
                        "{} - {} - {} added",
                        listing.brand.as_deref().unwrap_or("?"),
                        listing.model.as_deref().unwrap_or("?"),
                        listing.year.as_deref().unwrap_or("?")
                    );
                }
                Err(err) => {
                    // one bad record never aborts the batch
                    error!("{} couldn't be added: {}", listing.url, err);
                }
            }
        }

        let report = IngestReport {
            scraped: listings.len(),
            created,
        };
        info!("{} ads were scraped", report.scraped);
        info!("{} ads were added", report.created);
        info!("job complete");
        (listings, report)
    }

    /// Walks the page range in `batch_count`-page steps, logging progress
    /// every ten batches.
    async fn scrape_all(&self) -> Vec<Listing> {
        let mut listings = Vec::new();
        let step = self.params.batch_count.max(1);
        let mut batch_no = 0u32;
        let mut batch = self.params.start_page;
        while batch < self.params.end_page {
            let batch_end = (batch + step).min(self.params.end_page);
            let mut chunk = self.scraper.scrape_range(batch, batch_end).await;
            listings.append(&mut chunk);

            batch_no += 1;
            if batch_no % 10 == 0 {
                info!("{} batches completed", batch_no);
                info!("{} ads scraped", listings.len());
            }
            batch = batch_end;
        }
        listings
    }

    async fn persist(&self, listing: &Listing) -> std::result::Result<(), StoreError> {
        let brand_name = listing
            .brand
            .as_deref()
            .ok_or_else(|| StoreError::InvalidRecord("missing brand".to_string()))?;
        let model_name = listing
            .model
            .as_deref()
            .ok_or_else(|| StoreError::InvalidRecord("missing model".to_string()))?;

        let brand = self.store.get_or_create_brand(brand_name).await?;
        let model = self.store.get_or_create_model(model_name, brand).await?;
        self.store.create_ad(listing, brand, model).await
    }
}
