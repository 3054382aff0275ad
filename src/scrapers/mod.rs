pub mod build;
pub mod dates;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod olx;
pub mod traits;
pub mod types;

pub use error::ScrapeError;
pub use fetch::Fetcher;
pub use olx::{ListingLink, OlxScraper};
pub use traits::ScraperTrait;
pub use types::ScrapeParams;
