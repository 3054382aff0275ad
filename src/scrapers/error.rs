use thiserror::Error;

/// Failure taxonomy for the scraping pipeline. Nothing here is fatal to a
/// run: page errors skip the page, listing errors skip the listing.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("retries exhausted for {url}: {source}")]
    RetriesExhausted {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} for {url}")]
    BadStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The one extraction failure that aborts a whole record. A listing with
    /// no description text has usually been removed from the site.
    #[error("listing at {url} has no description text")]
    MissingDescription { url: String },
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
