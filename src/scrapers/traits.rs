use crate::models::Listing;
use async_trait::async_trait;

use super::error::Result;

/// Common trait for all listing scrapers
/// This allows easy addition of new classifieds sources in the future
#[async_trait]
pub trait ScraperTrait: Send + Sync {
    /// Scrape listings across the source's configured page range
    async fn scrape(&self) -> Result<Vec<Listing>>;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}
