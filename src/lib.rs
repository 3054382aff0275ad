//! Car-classifieds scraping pipeline: fetch results pages, extract listing
//! fields from inconsistent ad layouts, and hand normalized records to a
//! storage collaborator.

pub mod ingest;
pub mod models;
pub mod scrapers;
pub mod storage;
