use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters for one scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeParams {
    /// Site root, e.g. `https://www.olx.com.eg`
    pub base_url: String,
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Transport-level retries per request
    pub max_retries: u32,
    /// Admission gate capacity: listing fetches in flight per page
    pub max_concurrent: usize,
    /// First results page (inclusive)
    pub start_page: u32,
    /// Last results page (exclusive)
    pub end_page: u32,
    /// Pages handed to the walker per job iteration
    pub batch_count: u32,
    /// Random one-second pause before roughly half the listing fetches,
    /// a politeness throttle against rate limiting
    pub listing_jitter: bool,
}

impl Default for ScrapeParams {
    fn default() -> Self {
        Self {
            base_url: "https://www.olx.com.eg".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            max_concurrent: 5,
            start_page: 1,
            end_page: 500,
            batch_count: 10,
            listing_jitter: true,
        }
    }
}

impl ScrapeParams {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_pages(mut self, start: u32, end: u32) -> Self {
        self.start_page = start;
        self.end_page = end;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_jitter(mut self, enabled: bool) -> Self {
        self.listing_jitter = enabled;
        self
    }

    /// URL of one cars-for-sale results page.
    pub fn results_page_url(&self, page: u32) -> String {
        format!("{}/vehicles/cars-for-sale/?page={}", self.base_url, page)
    }
}
