use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use scraper::{Html, Selector};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

use crate::models::Listing;

use super::build::build_listing;
use super::error::{Result, ScrapeError};
use super::fetch::Fetcher;
use super::traits::ScraperTrait;
use super::types::ScrapeParams;

/// Anchor selector for ad links on a results page.
const LISTING_LINK_SELECTOR: &str = ".ads__item__ad--title";

/// One discovered ad link and the results page it came from.
#[derive(Debug, Clone)]
pub struct ListingLink {
    pub url: String,
    pub page: u32,
}

/// OLX cars-for-sale scraper
pub struct OlxScraper {
    fetcher: Arc<Fetcher>,
    params: ScrapeParams,
}

impl OlxScraper {
    /// Create a new scraper with default parameters
    pub fn new() -> Result<Self> {
        Self::with_params(ScrapeParams::default())
    }

    /// Create a new scraper with custom parameters
    pub fn with_params(params: ScrapeParams) -> Result<Self> {
        let fetcher = Arc::new(Fetcher::new(&params)?);
        Ok(Self { fetcher, params })
    }

    /// Scrapes one results page: discover ad links, then run one gated worker
    /// per link. Returns only after every worker has finished; this is the
    /// page barrier of the run.
    pub async fn scrape_page(&self, page: u32) -> Result<Vec<Listing>> {
        let url = self.params.results_page_url(page);
        debug!("Fetching results page {}", url);

        let response = self.fetcher.get(&url).await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ScrapeError::BadStatus { status, url });
        }
        let body = response.text().await?;

        let links = discover_links(&body, page);
        info!("Page {}: found {} ad links", page, links.len());

        // One gate per page, shared by all of that page's workers.
        let gate = Arc::new(Semaphore::new(self.params.max_concurrent));
        let mut workers = JoinSet::new();
        for link in links {
            let fetcher = Arc::clone(&self.fetcher);
            let gate = Arc::clone(&gate);
            let jitter = self.params.listing_jitter;
            workers.spawn(scrape_listing(fetcher, gate, link, jitter));
        }

        let mut listings = Vec::new();
        let mut skipped = 0usize;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Some(listing)) => listings.push(listing),
                Ok(None) => skipped += 1,
                Err(err) => {
                    warn!("listing worker failed to join: {}", err);
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            info!("Page {}: skipped {} listings", page, skipped);
        }
        Ok(listings)
    }

    /// Walks the `[start, end)` page range, accumulating records. A failed
    /// results page is logged and skipped; it never ends the run.
    pub async fn scrape_range(&self, start: u32, end: u32) -> Vec<Listing> {
        let mut all = Vec::new();
        for page in start..end {
            match self.scrape_page(page).await {
                Ok(mut listings) => all.append(&mut listings),
                Err(err) => warn!("skipping results page {}: {}", page, err),
            }
        }
        all
    }
}

/// Extracts ad links from a results page body.
fn discover_links(body: &str, page: u32) -> Vec<ListingLink> {
    let document = Html::parse_document(body);
    let selector = Selector::parse(LISTING_LINK_SELECTOR).unwrap();
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(|href| ListingLink {
            url: href.to_string(),
            page,
        })
        .collect()
}

/// One listing worker: waits for a gate permit, optionally pauses for
/// politeness, fetches the ad page and builds the record.
///
/// The permit is blocking-acquired so the gate truly caps in-flight fetches,
/// and released on drop whether the listing succeeds or fails, so the gate
/// can never starve.
/// Every failure is logged and collapses to `None`; nothing a worker does can
/// affect its siblings or the page barrier.
async fn scrape_listing(
    fetcher: Arc<Fetcher>,
    gate: Arc<Semaphore>,
    link: ListingLink,
    jitter: bool,
) -> Option<Listing> {
    // The gate outlives every worker of its page, so acquire can't see a
    // closed semaphore.
    let _permit = gate.acquire_owned().await.ok()?;

    let pause = jitter && rand::thread_rng().gen_bool(0.5);
    if pause {
        sleep(Duration::from_secs(1)).await;
    }

    debug!("fetching {}", link.url);
    let response = match fetcher.get(&link.url).await {
        Ok(response) => response,
        Err(err) => {
            warn!("skipping {}: {}", link.url, err);
            return None;
        }
    };
    if response.status() != reqwest::StatusCode::OK {
        warn!(
            "skipping {} (page {}): status {}",
            link.url,
            link.page,
            response.status()
        );
        return None;
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            warn!("skipping {}: {}", link.url, err);
            return None;
        }
    };

    // The parsed document stays inside this block: it is worker-local and
    // must not live across an await.
    let built = {
        let document = Html::parse_document(&body);
        build_listing(&document, &link.url)
    };
    match built {
        Ok(listing) => Some(listing),
        Err(err) => {
            warn!("{} doesn't exist anymore: {}", link.url, err);
            None
        }
    }
}

#[async_trait]
impl ScraperTrait for OlxScraper {
    async fn scrape(&self) -> Result<Vec<Listing>> {
        info!(
            "Starting OLX scrape, pages {}..{}",
            self.params.start_page, self.params.end_page
        );
        Ok(self
            .scrape_range(self.params.start_page, self.params.end_page)
            .await)
    }

    fn source_name(&self) -> &'static str {
        "OLX"
    }
}
